use crate::chat::{self, NewChat, Recipients};
use crate::error::{DashboardError, DashboardResult};
use crate::loader::{load_sheet, LoadOptions};
use crate::records::{
    check_headers, load_records, ChatMessage, Patient, SheetRecord, Vendor,
};
use crate::seed;
use crate::store::xlsx::{read_workbook, write_workbook};
use crate::store::{AccessToken, RemoteStore, SheetStore};
use crate::workbook::Workbook;
use chrono::Utc;
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Execute the sheets command
pub fn sheets(file: PathBuf) -> DashboardResult<()> {
    let workbook = read_workbook(&file)?;

    println!("{}", "📒 Workbook sheets".bold().green());
    println!("   File: {}\n", file.display());

    if workbook.sheets().is_empty() {
        println!("{}", "⚠️  Workbook has no sheets".yellow());
        return Ok(());
    }

    for sheet in workbook.sheets() {
        println!(
            "   {} ({} rows)",
            sheet.name.bright_blue().bold(),
            sheet.data_row_count()
        );
    }
    Ok(())
}

/// Execute the read command: print a sheet's row objects as JSON
pub fn read(
    file: PathBuf,
    sheet: String,
    date_fields: Vec<String>,
    active_dates: bool,
    optional: bool,
) -> DashboardResult<()> {
    let workbook = read_workbook(&file)?;

    let mut options = if active_dates {
        LoadOptions::active()
    } else {
        LoadOptions::default()
    };
    options = options.with_date_fields(date_fields);
    if optional {
        options = options.optional();
    }

    let rows = load_sheet(&workbook, &sheet, &options)?;
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

/// Execute the chat command
pub fn chat(file: PathBuf, user: Option<String>) -> DashboardResult<()> {
    let workbook = read_workbook(&file)?;
    let messages: Vec<ChatMessage> = load_records(&workbook)?;

    let visible: Vec<&ChatMessage> = match user.as_deref() {
        Some(user) => messages.iter().filter(|m| m.includes(user)).collect(),
        None => messages.iter().collect(),
    };

    println!("{}", "💬 Team chat".bold().green());
    if let Some(ref user) = user {
        println!("   User: {}", user.bright_yellow().bold());
    }
    println!("   {} messages\n", visible.len());

    for message in visible {
        println!(
            "   {} {} {} → {}",
            message.timestamp.dimmed(),
            format!("[{}]", message.kind.code()).cyan(),
            message.sender.bright_blue().bold(),
            message.participants.join(", ")
        );
        println!("      {}", message.message);
        if !message.tags.is_empty() {
            println!("      {}", format!("#{}", message.tags).yellow());
        }
    }
    Ok(())
}

/// Execute the post command: append one chat message
pub fn post(
    file: PathBuf,
    user: String,
    message: String,
    kind: Option<String>,
    recipients: Option<String>,
    tags: Option<String>,
) -> DashboardResult<()> {
    let mut workbook = read_workbook(&file)?;

    let draft = NewChat {
        sender: user,
        message,
        kind,
        recipients: recipients.map(Recipients::Text),
        tags,
    };
    let posted = chat::append_message(&mut workbook, &draft, Utc::now())?;
    write_workbook(&file, &workbook)?;

    println!("{}", "✅ Chat message added".bold().green());
    println!("   Timestamp:    {}", posted.timestamp);
    println!("   Participants: {}", posted.participants.join(", "));
    Ok(())
}

/// Execute the seed command: create or replace the sample Vendors/Chat sheets
pub fn seed(file: PathBuf, vendors: bool, chat: bool) -> DashboardResult<()> {
    let (vendors, chat) = if !vendors && !chat {
        (true, true)
    } else {
        (vendors, chat)
    };

    let mut workbook = match read_workbook(&file) {
        Ok(workbook) => workbook,
        Err(DashboardError::WorkbookNotFound(_)) => {
            println!("   Creating new workbook {}", file.display());
            Workbook::new()
        }
        Err(e) => return Err(e),
    };

    if vendors {
        workbook.upsert_sheet(seed::vendors_sheet());
        println!("   📋 Vendors: 6 sample service partners");
    }
    if chat {
        workbook.upsert_sheet(seed::chat_sheet());
        println!("   💬 Chat: sample group messages, direct messages and notes");
    }

    write_workbook(&file, &workbook)?;
    println!("{}", "✅ Sample data written".bold().green());
    Ok(())
}

/// Execute the check command: validate sheet headers against the record types
pub fn check(file: PathBuf) -> DashboardResult<()> {
    let workbook = read_workbook(&file)?;

    println!("{}", "✅ Checking workbook schema".bold().green());
    println!("   File: {}\n", file.display());

    let results = vec![
        check_sheet::<Patient>(&workbook),
        check_sheet::<Vendor>(&workbook),
        check_sheet::<ChatMessage>(&workbook),
    ];

    let mut first_error = None;
    for (sheet, result) in results {
        match result {
            Ok(rows) => println!("   ✅ {} ({} rows)", sheet.bright_blue().bold(), rows),
            Err(e) => {
                println!("   ❌ {}", e.to_string().red());
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        None => {
            println!("\n{}", "✅ All sheets match their schema".bold().green());
            Ok(())
        }
        Some(e) => Err(e),
    }
}

fn check_sheet<R: SheetRecord>(workbook: &Workbook) -> (&'static str, DashboardResult<usize>) {
    let result = match workbook.sheet(R::SHEET) {
        None => Err(DashboardError::SheetNotFound {
            sheet: R::SHEET.to_string(),
            available: workbook.sheet_names(),
        }),
        Some(sheet) => match sheet.headers() {
            None => Err(DashboardError::MissingHeader(R::SHEET.to_string())),
            Some(headers) => check_headers::<R>(headers).map(|_| sheet.data_row_count()),
        },
    };
    (R::SHEET, result)
}

/// Execute the push command: upload every sheet to the remote spreadsheet
pub fn push(file: PathBuf, spreadsheet_id: String, token_file: PathBuf) -> DashboardResult<()> {
    let workbook = read_workbook(&file)?;
    let token = AccessToken::from_file(&token_file)?;
    let store = RemoteStore::new(spreadsheet_id, token);

    println!("{}", "☁️  Pushing workbook".bold().green());
    println!("   File:   {}", file.display());
    println!("   Target: {}\n", store.describe());

    push_to(&store, &workbook)?;

    for sheet in workbook.sheets() {
        println!("   ✅ {} ({} rows)", sheet.name.bright_blue(), sheet.rows.len());
    }
    println!("\n{}", "✅ Push complete".bold().green());
    Ok(())
}

fn push_to(store: &dyn SheetStore, workbook: &Workbook) -> DashboardResult<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(store.save(workbook))
}

/// Resolve a workbook path argument, defaulting to the dashboard file.
pub fn workbook_path(file: Option<PathBuf>) -> PathBuf {
    file.unwrap_or_else(|| Path::new(crate::api::server::DEFAULT_WORKBOOK).to_path_buf())
}
