//! Typed records for the dashboard sheets
//!
//! The HTTP API hands raw row objects to the browser. The CLI and schema
//! checks go through these types instead, so a renamed or missing column is
//! reported once with every missing name rather than showing up as nulls.

use crate::error::{DashboardError, DashboardResult};
use crate::loader::{load_sheet, LoadOptions, RowObject};
use crate::workbook::{CellValue, Workbook};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

pub const ACTIVE_SHEET: &str = "Active";
pub const VENDORS_SHEET: &str = "Vendors";
pub const CHAT_SHEET: &str = "Chat";

/// Header row of the Chat sheet, in column order.
pub const CHAT_HEADERS: [&str; 7] = [
    "Timestamp",
    "Type",
    "Participants",
    "Sender",
    "Message",
    "Status",
    "Tags",
];

/// A record type that lives in one sheet.
pub trait SheetRecord: Sized {
    const SHEET: &'static str;
    const REQUIRED: &'static [&'static str];

    fn load_options() -> LoadOptions {
        LoadOptions::default()
    }

    fn from_row(row: &RowObject) -> Self;
}

/// Check that every required column of `R` is present in `headers`.
pub fn check_headers<R: SheetRecord>(headers: &[CellValue]) -> DashboardResult<()> {
    let labels: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    let missing: Vec<String> = R::REQUIRED
        .iter()
        .filter(|required| !labels.iter().any(|label| label == *required))
        .map(|required| required.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(DashboardError::Schema {
            sheet: R::SHEET.to_string(),
            missing,
        })
    }
}

/// Load every row of `R`'s sheet as a typed record.
pub fn load_records<R: SheetRecord>(workbook: &Workbook) -> DashboardResult<Vec<R>> {
    let rows = load_sheet(workbook, R::SHEET, &R::load_options())?;
    if let Some(headers) = workbook.sheet(R::SHEET).and_then(|s| s.headers()) {
        check_headers::<R>(headers)?;
    }
    Ok(rows.iter().map(R::from_row).collect())
}

//==============================================================================
// Field helpers
//==============================================================================

fn text(row: &RowObject, key: &str) -> Option<String> {
    row.get(key)
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .filter(|s| !s.trim().is_empty())
}

fn required_text(row: &RowObject, key: &str) -> String {
    text(row, key).unwrap_or_default()
}

fn number(row: &RowObject, key: &str) -> Option<f64> {
    match row.get(key)? {
        CellValue::Number(n) => Some(*n),
        CellValue::Text(s) => s.trim().trim_start_matches('$').parse().ok(),
        _ => None,
    }
}

fn timestamp(row: &RowObject, key: &str) -> Option<DateTime<Utc>> {
    row.get(key).and_then(CellValue::as_timestamp)
}

//==============================================================================
// Patient ("Active")
//==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Patient {
    pub name: String,
    pub age: Option<f64>,
    pub area: Option<String>,
    pub diagnosis: Option<String>,
    pub cp_doctor: Option<String>,
    pub hospice: Option<String>,
    pub status: Option<String>,
    pub paid: Option<String>,
    pub invoice_amount: Option<f64>,
    pub dob: Option<DateTime<Utc>>,
    pub cp_completed: Option<DateTime<Utc>>,
    pub prescription_submit: Option<DateTime<Utc>>,
    pub ingestion_date: Option<DateTime<Utc>>,
}

impl SheetRecord for Patient {
    const SHEET: &'static str = ACTIVE_SHEET;
    const REQUIRED: &'static [&'static str] = &["Patient Name"];

    fn load_options() -> LoadOptions {
        LoadOptions::active()
    }

    fn from_row(row: &RowObject) -> Self {
        Self {
            name: required_text(row, "Patient Name"),
            age: number(row, "Age"),
            area: text(row, "Area"),
            diagnosis: text(row, "Diagnosis"),
            cp_doctor: text(row, "CP Doctor"),
            hospice: text(row, "Hospice"),
            status: text(row, "Status"),
            paid: text(row, "PAID"),
            invoice_amount: number(row, "invoice amount"),
            dob: timestamp(row, "DOB"),
            cp_completed: timestamp(row, "CP Completed"),
            prescription_submit: timestamp(row, "Prescription Submit"),
            ingestion_date: timestamp(row, "Ingestion Date"),
        }
    }
}

//==============================================================================
// Vendor ("Vendors")
//==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vendor {
    pub vendor_id: String,
    pub company_name: String,
    pub category: Option<String>,
    pub service_type: Option<String>,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub website: Option<String>,
    pub notes: Option<String>,
    pub rating: Option<f64>,
    pub last_contact: Option<String>,
    pub status: Option<String>,
}

impl SheetRecord for Vendor {
    const SHEET: &'static str = VENDORS_SHEET;
    const REQUIRED: &'static [&'static str] = &["Vendor ID", "Company Name"];

    fn from_row(row: &RowObject) -> Self {
        Self {
            vendor_id: required_text(row, "Vendor ID"),
            company_name: required_text(row, "Company Name"),
            category: text(row, "Category"),
            service_type: text(row, "Service Type"),
            contact_person: text(row, "Contact Person"),
            phone: text(row, "Phone"),
            email: text(row, "Email"),
            address: text(row, "Address"),
            website: text(row, "Website"),
            notes: text(row, "Notes"),
            rating: number(row, "Rating"),
            last_contact: text(row, "Last Contact"),
            status: text(row, "Status"),
        }
    }
}

//==============================================================================
// ChatMessage ("Chat")
//==============================================================================

/// Chat message type from the `Type` column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ChatKind {
    /// `GM`
    Group,
    /// `DM`
    Direct,
    /// `NOTE`
    Note,
    Other(String),
}

impl ChatKind {
    pub fn parse(code: &str) -> Self {
        match code.trim() {
            "GM" => ChatKind::Group,
            "DM" => ChatKind::Direct,
            "NOTE" => ChatKind::Note,
            other => ChatKind::Other(other.to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            ChatKind::Group => "GM",
            ChatKind::Direct => "DM",
            ChatKind::Note => "NOTE",
            ChatKind::Other(code) => code,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    /// `YYYYMMDDHHMMSS`
    pub timestamp: String,
    pub kind: ChatKind,
    pub participants: Vec<String>,
    pub sender: String,
    pub message: String,
    pub status: String,
    pub tags: String,
}

impl ChatMessage {
    /// Row cells in [`CHAT_HEADERS`] order.
    pub fn to_row(&self) -> Vec<CellValue> {
        vec![
            CellValue::text(self.timestamp.clone()),
            CellValue::text(self.kind.code()),
            CellValue::text(encode_participants(&self.participants)),
            CellValue::text(self.sender.clone()),
            CellValue::text(self.message.clone()),
            CellValue::text(self.status.clone()),
            CellValue::text(self.tags.clone()),
        ]
    }

    pub fn includes(&self, user: &str) -> bool {
        self.participants.iter().any(|p| p == user)
    }
}

impl SheetRecord for ChatMessage {
    const SHEET: &'static str = CHAT_SHEET;
    const REQUIRED: &'static [&'static str] =
        &["Timestamp", "Type", "Participants", "Sender", "Message"];

    fn from_row(row: &RowObject) -> Self {
        Self {
            timestamp: required_text(row, "Timestamp"),
            kind: ChatKind::parse(&required_text(row, "Type")),
            participants: parse_participants(&required_text(row, "Participants")),
            sender: required_text(row, "Sender"),
            message: required_text(row, "Message"),
            status: text(row, "Status").unwrap_or_else(|| "active".to_string()),
            tags: required_text(row, "Tags"),
        }
    }
}

fn participant_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<([^>]+)>").expect("participant pattern is valid"))
}

/// Split `<Alyssa><Dr. Moore>` into names.
pub fn parse_participants(coded: &str) -> Vec<String> {
    participant_pattern()
        .captures_iter(coded)
        .map(|c| c[1].to_string())
        .collect()
}

/// Join names into the `<A><B>` coding.
pub fn encode_participants<S: AsRef<str>>(names: &[S]) -> String {
    names.iter().map(|n| format!("<{}>", n.as_ref())).collect()
}
