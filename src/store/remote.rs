//! Remote spreadsheet store (Google Sheets API v4, values endpoints).
//!
//! Uses an already-issued OAuth access token. Obtaining or refreshing the
//! token is outside this crate.

use super::SheetStore;
use crate::error::{DashboardError, DashboardResult};
use crate::workbook::{CellValue, Sheet, Workbook};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::Path;
use tracing::{debug, info};

pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com";

/// Bearer token read from a token file (`{"access_token": "..."}`).
#[derive(Clone, Deserialize)]
pub struct AccessToken {
    access_token: String,
}

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            access_token: token.into(),
        }
    }

    pub fn from_file(path: &Path) -> DashboardResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DashboardError::Remote(format!("cannot read token file {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            DashboardError::Remote(format!("invalid token file {}: {}", path.display(), e))
        })
    }

    fn secret(&self) -> &str {
        &self.access_token
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(..)")
    }
}

/// Workbook held in a remote spreadsheet.
#[derive(Debug, Clone)]
pub struct RemoteStore {
    client: Client,
    base_url: String,
    spreadsheet_id: String,
    token: AccessToken,
}

impl RemoteStore {
    pub fn new(spreadsheet_id: impl Into<String>, token: AccessToken) -> Self {
        Self::with_base_url(SHEETS_API_BASE, spreadsheet_id, token)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        spreadsheet_id: impl Into<String>,
        token: AccessToken,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            spreadsheet_id: spreadsheet_id.into(),
            token,
        }
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    fn url(&self, suffix: &str) -> String {
        format!(
            "{}/v4/spreadsheets/{}{}",
            self.base_url, self.spreadsheet_id, suffix
        )
    }

    async fn sheet_titles(&self) -> DashboardResult<Vec<String>> {
        let response = self
            .client
            .get(self.url(""))
            .bearer_auth(self.token.secret())
            .query(&[("fields", "sheets.properties.title")])
            .send()
            .await?;
        let meta: SpreadsheetMeta = checked(response).await?.json().await?;
        Ok(meta
            .sheets
            .into_iter()
            .map(|s| s.properties.title)
            .collect())
    }

    async fn add_sheets(&self, titles: &[String]) -> DashboardResult<()> {
        let requests: Vec<Value> = titles
            .iter()
            .map(|title| json!({ "addSheet": { "properties": { "title": title } } }))
            .collect();
        let response = self
            .client
            .post(self.url(":batchUpdate"))
            .bearer_auth(self.token.secret())
            .json(&json!({ "requests": requests }))
            .send()
            .await?;
        checked(response).await?;
        Ok(())
    }
}

#[async_trait]
impl SheetStore for RemoteStore {
    fn describe(&self) -> String {
        format!("remote spreadsheet {}", self.spreadsheet_id)
    }

    async fn load(&self) -> DashboardResult<Workbook> {
        let titles = self.sheet_titles().await?;
        if titles.is_empty() {
            return Ok(Workbook::new());
        }

        let mut query: Vec<(&str, String)> = titles
            .iter()
            .map(|title| ("ranges", a1_sheet(title)))
            .collect();
        query.push(("valueRenderOption", "UNFORMATTED_VALUE".to_string()));
        query.push(("majorDimension", "ROWS".to_string()));

        let response = self
            .client
            .get(self.url("/values:batchGet"))
            .bearer_auth(self.token.secret())
            .query(&query)
            .send()
            .await?;
        let batch: BatchGetResponse = checked(response).await?.json().await?;

        debug!("Loaded {} sheets from {}", titles.len(), self.describe());
        workbook_from_value_ranges(titles, batch)
    }

    async fn save(&self, workbook: &Workbook) -> DashboardResult<()> {
        let existing = self.sheet_titles().await?;
        let missing: Vec<String> = workbook
            .sheet_names()
            .into_iter()
            .filter(|name| !existing.contains(name))
            .collect();
        if !missing.is_empty() {
            info!("Adding sheets {:?} to {}", missing, self.describe());
            self.add_sheets(&missing).await?;
        }

        let ranges: Vec<String> = workbook.sheets().iter().map(|s| a1_sheet(&s.name)).collect();
        let response = self
            .client
            .post(self.url("/values:batchClear"))
            .bearer_auth(self.token.secret())
            .json(&json!({ "ranges": ranges }))
            .send()
            .await?;
        checked(response).await?;

        let body = BatchUpdateRequest {
            value_input_option: "RAW",
            data: workbook
                .sheets()
                .iter()
                .map(|sheet| ValueRange {
                    range: format!("{}!A1", a1_sheet(&sheet.name)),
                    values: sheet
                        .rows
                        .iter()
                        .map(|row| row.iter().map(cell_to_json).collect())
                        .collect(),
                })
                .collect(),
        };
        let response = self
            .client
            .post(self.url("/values:batchUpdate"))
            .bearer_auth(self.token.secret())
            .json(&body)
            .send()
            .await?;
        checked(response).await?;

        info!(
            "Saved {} sheets to {}",
            workbook.sheets().len(),
            self.describe()
        );
        Ok(())
    }
}

async fn checked(response: Response) -> DashboardResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(DashboardError::Remote(format!("{}: {}", status, body.trim())))
}

//==============================================================================
// Wire types
//==============================================================================

#[derive(Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Deserialize)]
struct BatchGetResponse {
    #[serde(default, rename = "valueRanges")]
    value_ranges: Vec<ValueRangeIn>,
}

#[derive(Deserialize)]
struct ValueRangeIn {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchUpdateRequest {
    value_input_option: &'static str,
    data: Vec<ValueRange>,
}

#[derive(Serialize)]
struct ValueRange {
    range: String,
    values: Vec<Vec<Value>>,
}

/// Quote a sheet title for A1 notation: `'Sheet ''1'''`.
fn a1_sheet(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

fn workbook_from_value_ranges(
    titles: Vec<String>,
    batch: BatchGetResponse,
) -> DashboardResult<Workbook> {
    if batch.value_ranges.len() != titles.len() {
        return Err(DashboardError::Remote(format!(
            "expected {} value ranges, got {}",
            titles.len(),
            batch.value_ranges.len()
        )));
    }

    let sheets = titles
        .into_iter()
        .zip(batch.value_ranges)
        .map(|(title, range)| {
            let rows = range
                .values
                .iter()
                .map(|row| row.iter().map(cell_from_json).collect())
                .collect();
            Sheet::with_rows(title, rows)
        })
        .collect();

    Ok(Workbook::from_sheets(sheets))
}

fn cell_from_json(value: &Value) -> CellValue {
    match value {
        Value::Null => CellValue::Empty,
        Value::String(s) if s.is_empty() => CellValue::Empty,
        Value::String(s) => CellValue::Text(s.clone()),
        Value::Number(n) => n.as_f64().map(CellValue::Number).unwrap_or_default(),
        Value::Bool(b) => CellValue::Bool(*b),
        other => CellValue::Text(other.to_string()),
    }
}

fn cell_to_json(cell: &CellValue) -> Value {
    match cell {
        CellValue::Empty => Value::String(String::new()),
        CellValue::Text(s) => Value::String(s.clone()),
        CellValue::Number(n) => serde_json::Number::from_f64(*n)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(n.to_string())),
        CellValue::Bool(b) => Value::Bool(*b),
        CellValue::Timestamp(_) => Value::String(cell.to_string()),
    }
}
