//! Built-in sample data for the Vendors and Chat sheets.

use crate::records::{CHAT_HEADERS, CHAT_SHEET, VENDORS_SHEET};
use crate::workbook::{CellValue, Sheet};

const VENDOR_HEADERS: [&str; 13] = [
    "Vendor ID",
    "Company Name",
    "Category",
    "Service Type",
    "Contact Person",
    "Phone",
    "Email",
    "Address",
    "Website",
    "Notes",
    "Rating",
    "Last Contact",
    "Status",
];

const VENDORS: [[&str; 13]; 6] = [
    [
        "V001",
        "Serenity Cremation Services",
        "Cremation",
        "Cremation & Memorial",
        "Sarah Johnson",
        "(555) 123-4567",
        "sarah@serenitycremation.com",
        "123 Peaceful Lane, Riverside, CA 92501",
        "www.serenitycremation.com",
        "Reliable service, good pricing",
        "4.8",
        "2024-01-15",
        "Active",
    ],
    [
        "V002",
        "Compassionate Care Pharmacies",
        "Pharmacy",
        "Hospice Medications",
        "Dr. Michael Chen",
        "(555) 234-5678",
        "mchen@compcarepharm.com",
        "456 Medical Plaza, Riverside, CA 92503",
        "www.compcarepharm.com",
        "Specializes in pain management meds",
        "4.9",
        "2024-01-20",
        "Active",
    ],
    [
        "V003",
        "Gentle Hands Doula Services",
        "Doula",
        "End-of-Life Support",
        "Maria Rodriguez",
        "(555) 345-6789",
        "maria@gentlehands.com",
        "789 Comfort Way, Riverside, CA 92505",
        "www.gentlehands.com",
        "Excellent bedside manner, 24/7 availability",
        "5.0",
        "2024-01-18",
        "Active",
    ],
    [
        "V004",
        "Eternal Rest Funeral Home",
        "Funeral Services",
        "Funeral & Memorial",
        "Robert Williams",
        "(555) 456-7890",
        "rwilliams@eternalrest.com",
        "321 Memorial Drive, Riverside, CA 92507",
        "www.eternalrest.com",
        "Traditional services, family-owned",
        "4.7",
        "2024-01-12",
        "Active",
    ],
    [
        "V005",
        "Hospice Equipment Supply Co.",
        "Medical Equipment",
        "Durable Medical Equipment",
        "Jennifer Davis",
        "(555) 567-8901",
        "jdavis@hospiceequipment.com",
        "654 Medical Supply Blvd, Riverside, CA 92509",
        "www.hospiceequipment.com",
        "Quick delivery, wide selection",
        "4.6",
        "2024-01-22",
        "Active",
    ],
    [
        "V006",
        "Peaceful Transitions Counseling",
        "Counseling",
        "Grief & Bereavement",
        "Dr. Lisa Thompson",
        "(555) 678-9012",
        "lthompson@peacefultransitions.com",
        "987 Healing Circle, Riverside, CA 92511",
        "www.peacefultransitions.com",
        "Licensed therapists, sliding scale fees",
        "4.9",
        "2024-01-16",
        "Active",
    ],
];

const TEAM: &str = "<Alyssa><Dr. Moore><Christa><Amber>";

const CHAT: [[&str; 7]; 13] = [
    ["20241201143000", "GM", TEAM, "Alyssa", "Hey team, where are we on the Johnson case?", "active", "patient-update"],
    ["20241201143100", "GM", TEAM, "Dr. Moore", "I just reviewed the medication list, all looks good", "active", "medical-review"],
    ["20241201143200", "DM", "<Alyssa><Christa>", "Christa", "Family meeting scheduled for tomorrow at 2pm", "active", "meeting"],
    ["20241201143300", "DM", "<Alyssa><Amber>", "Alyssa", "Hey Amber, can you prep the meeting notes?", "active", "task"],
    ["20241201143400", "GM", TEAM, "Amber", "Welcome Amber! Please connect with Alyssa on this new project", "active", "onboarding"],
    ["20241201143500", "DM", "<Dr. Moore><Christa>", "Dr. Moore", "Christa, can you review the Johnson medication schedule?", "active", "medical-task"],
    ["20241201143600", "GM", TEAM, "Alyssa", "Insurance approval came through for the Smith family!", "active", "good-news"],
    ["20241201143700", "DM", "<Alyssa><Donnie>", "Alyssa", "Hey Donnie, lets get Amber onboarded properly", "active", "onboarding"],
    ["20241201143800", "GM", "<Alyssa><Donnie><Amber>", "Donnie", "Welcome Amber! Please connect with Alyssa on this new project", "active", "welcome"],
    ["20241201143900", "NOTE", "<Alyssa>", "Alyssa", "Patient timeline updated - family meeting scheduled", "active", "patient-timeline"],
    ["20241201144000", "NOTE", "<Dr. Moore>", "Dr. Moore", "Medication review completed - no changes needed", "active", "medical-note"],
    ["20241201144100", "DM", "<Christa><Amber>", "Christa", "Amber, here are the key contacts for the Johnson case", "active", "contacts"],
    ["20241201144200", "GM", TEAM, "Amber", "Thanks everyone! Excited to be part of the team", "active", "introduction"],
];

fn text_rows<const N: usize>(headers: &[&str; N], rows: &[[&str; N]]) -> Vec<Vec<CellValue>> {
    std::iter::once(headers)
        .chain(rows.iter())
        .map(|row| row.iter().map(|c| CellValue::text(*c)).collect())
        .collect()
}

/// Vendor directory with six service partners.
pub fn vendors_sheet() -> Sheet {
    Sheet::with_rows(VENDORS_SHEET, text_rows(&VENDOR_HEADERS, &VENDORS))
}

/// Chat log with group messages, direct messages and notes.
pub fn chat_sheet() -> Sheet {
    Sheet::with_rows(CHAT_SHEET, text_rows(&CHAT_HEADERS, &CHAT))
}
