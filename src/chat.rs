//! Team chat: composing new messages and filtering by participant

use crate::error::{DashboardError, DashboardResult};
use crate::loader::{append_row, load_sheet, LoadOptions, RowObject};
use crate::records::{parse_participants, ChatKind, ChatMessage, CHAT_SHEET};
use crate::store::{self, SheetStore};
use crate::workbook::Workbook;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;

pub const DEFAULT_CHAT_TYPE: &str = "GM";

/// Who a new message goes to, as sent by the client.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Recipients {
    List(Vec<String>),
    Text(String),
}

/// A message about to be appended to the Chat sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewChat {
    pub sender: String,
    pub message: String,
    pub kind: Option<String>,
    pub recipients: Option<Recipients>,
    pub tags: Option<String>,
}

impl NewChat {
    pub fn new(sender: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            message: message.into(),
            kind: None,
            recipients: None,
            tags: None,
        }
    }

    /// Build the stored message. `existing` is the current Chat sheet, used to
    /// expand `all`.
    pub fn compose(&self, existing: &[RowObject], now: DateTime<Utc>) -> ChatMessage {
        let kind = self
            .kind
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .unwrap_or(DEFAULT_CHAT_TYPE);

        ChatMessage {
            timestamp: format_chat_timestamp(now),
            kind: ChatKind::parse(kind),
            participants: resolve_participants(&self.sender, self.recipients.as_ref(), existing),
            sender: self.sender.clone(),
            message: self.message.clone(),
            status: "active".to_string(),
            tags: self.tags.clone().unwrap_or_default(),
        }
    }
}

/// `YYYYMMDDHHMMSS` in UTC.
pub fn format_chat_timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y%m%d%H%M%S").to_string()
}

/// Sender first, then recipients, without duplicates.
pub fn resolve_participants(
    sender: &str,
    recipients: Option<&Recipients>,
    existing: &[RowObject],
) -> Vec<String> {
    let mut names = vec![sender.to_string()];

    let requested: Vec<String> = match recipients {
        None => Vec::new(),
        Some(Recipients::List(list)) => list.clone(),
        Some(Recipients::Text(text)) if text.trim().eq_ignore_ascii_case("all") => existing
            .iter()
            .filter_map(|row| row.get("Participants").and_then(|p| p.as_str()))
            .flat_map(parse_participants)
            .collect(),
        Some(Recipients::Text(text)) => split_recipients(text),
    };

    for name in requested {
        let name = strip_delimiters(&name);
        if !name.is_empty() && !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

/// Comma separated names, each optionally written as one or more `@Name`
/// mentions.
fn split_recipients(text: &str) -> Vec<String> {
    if text.contains('<') {
        return parse_participants(text);
    }
    text.split(',')
        .flat_map(|part| part.split('@'))
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

/// Names are stored inside `<..>`, so they cannot contain the delimiters.
pub fn is_valid_name(name: &str) -> bool {
    !name.trim().is_empty() && !name.contains(['<', '>'])
}

fn strip_delimiters(name: &str) -> String {
    name.replace(['<', '>'], "").trim().to_string()
}

/// True when the row's Participants text contains `<user>`.
pub fn visible_to(row: &RowObject, user: &str) -> bool {
    let needle = format!("<{}>", user);
    row.get("Participants")
        .and_then(|p| p.as_str())
        .is_some_and(|participants| participants.contains(&needle))
}

pub fn filter_for_user(rows: Vec<RowObject>, user: &str) -> Vec<RowObject> {
    rows.into_iter().filter(|row| visible_to(row, user)).collect()
}

/// Compose `draft` against the current Chat sheet and append it.
pub fn append_message(
    workbook: &mut Workbook,
    draft: &NewChat,
    now: DateTime<Utc>,
) -> DashboardResult<ChatMessage> {
    if !is_valid_name(&draft.sender) {
        return Err(DashboardError::InvalidName(draft.sender.clone()));
    }
    let existing = load_sheet(workbook, CHAT_SHEET, &LoadOptions::default())?;
    let message = draft.compose(&existing, now);
    append_row(workbook, CHAT_SHEET, message.to_row())?;
    Ok(message)
}

/// Read-modify-write of the whole workbook to add one chat message.
pub async fn post_message<S: SheetStore + ?Sized>(
    store: &S,
    draft: NewChat,
) -> DashboardResult<ChatMessage> {
    let now = Utc::now();
    let message = store::update(store, move |workbook| append_message(workbook, &draft, now)).await?;
    info!(
        "Chat message added by {} at {}",
        message.sender, message.timestamp
    );
    Ok(message)
}
