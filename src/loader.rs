//! Tabular sheet loader
//!
//! Turns a sheet grid into header-keyed row objects and appends rows to an
//! existing sheet. Pure transforms over an already materialized [`Workbook`];
//! reading and writing storage is the caller's job (see [`crate::store`]).

use crate::error::{DashboardError, DashboardResult};
use crate::workbook::{CellValue, Workbook};
use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeSet;

/// Days between the spreadsheet epoch (1899-12-30) and 1970-01-01.
pub const SPREADSHEET_EPOCH_OFFSET_DAYS: f64 = 25569.0;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Headers of the "Active" sheet whose serial numbers are dates.
pub const ACTIVE_DATE_FIELDS: [&str; 8] = [
    "Date",
    "DOB",
    "1st request",
    "2nd request",
    "CP Completed",
    "Prescription Submit",
    "Ingestion Date",
    "Physician follow up form",
];

//==============================================================================
// Row objects
//==============================================================================

/// One data row keyed by header label, in header order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RowObject {
    entries: Vec<(String, CellValue)>,
}

impl RowObject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field. An existing key keeps its position and takes the new value.
    pub fn insert(&mut self, key: impl Into<String>, value: CellValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut CellValue> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for RowObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

//==============================================================================
// Loading
//==============================================================================

/// Options for [`load_sheet`].
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub date_fields: BTreeSet<String>,
    /// Fail with `SheetNotFound` when the sheet is absent. Defaults to true.
    pub require_sheet: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            date_fields: BTreeSet::new(),
            require_sheet: true,
        }
    }
}

impl LoadOptions {
    pub fn with_date_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.date_fields.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn optional(mut self) -> Self {
        self.require_sheet = false;
        self
    }

    /// Options used for the "Active" (patients) sheet.
    pub fn active() -> Self {
        Self::default().with_date_fields(ACTIVE_DATE_FIELDS)
    }
}

/// Load `sheet_name` as row objects keyed by the header row.
pub fn load_sheet(
    workbook: &Workbook,
    sheet_name: &str,
    options: &LoadOptions,
) -> DashboardResult<Vec<RowObject>> {
    let sheet = match workbook.sheet(sheet_name) {
        Some(sheet) => sheet,
        None if options.require_sheet => {
            return Err(DashboardError::SheetNotFound {
                sheet: sheet_name.to_string(),
                available: workbook.sheet_names(),
            })
        }
        None => return Ok(Vec::new()),
    };

    let Some((header_row, data_rows)) = sheet.rows.split_first() else {
        return Ok(Vec::new());
    };

    // Empty header cells are not labels
    let headers: Vec<(usize, String)> = header_row
        .iter()
        .enumerate()
        .filter(|(_, cell)| !cell.is_empty())
        .map(|(idx, cell)| (idx, cell.to_string()))
        .collect();

    let rows = data_rows
        .iter()
        .map(|row| {
            let mut obj = RowObject::new();
            for (idx, header) in &headers {
                let value = row.get(*idx).cloned().unwrap_or_default();
                obj.insert(header.clone(), value);
            }
            normalize_dates(&mut obj, &options.date_fields);
            obj
        })
        .collect();

    Ok(rows)
}

fn normalize_dates(obj: &mut RowObject, date_fields: &BTreeSet<String>) {
    for field in date_fields {
        if let Some(cell) = obj.get_mut(field) {
            if let Some(ts) = cell.as_f64().and_then(serial_to_timestamp) {
                *cell = CellValue::Timestamp(ts);
            }
        }
    }
}

/// Convert a spreadsheet day serial to a UTC timestamp.
///
/// `None` for non-finite serials and ones outside chrono's range.
pub fn serial_to_timestamp(serial: f64) -> Option<DateTime<Utc>> {
    if !serial.is_finite() {
        return None;
    }
    let millis = ((serial - SPREADSHEET_EPOCH_OFFSET_DAYS) * MILLIS_PER_DAY).round();
    if millis < i64::MIN as f64 || millis > i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp_millis(millis as i64)
}

//==============================================================================
// Appending
//==============================================================================

/// Append `row` after the last row of `sheet_name`.
///
/// The sheet must exist and have a header row. The row is not checked
/// against the header count.
pub fn append_row(
    workbook: &mut Workbook,
    sheet_name: &str,
    row: Vec<CellValue>,
) -> DashboardResult<()> {
    let available = workbook.sheet_names();
    let sheet = workbook
        .sheet_mut(sheet_name)
        .ok_or_else(|| DashboardError::SheetNotFound {
            sheet: sheet_name.to_string(),
            available,
        })?;

    if sheet.rows.is_empty() {
        return Err(DashboardError::MissingHeader(sheet_name.to_string()));
    }

    sheet.rows.push(row);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workbook::Sheet;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<CellValue>> {
        rows.iter()
            .map(|r| r.iter().map(|c| CellValue::text(*c)).collect())
            .collect()
    }

    fn workbook_with(name: &str, rows: Vec<Vec<CellValue>>) -> Workbook {
        Workbook::from_sheets(vec![Sheet::with_rows(name, rows)])
    }

    #[test]
    fn test_row_count_and_keys_match_headers() {
        for n in 0..5 {
            let mut rows = grid(&[&["A", "B", "C"]]);
            for i in 0..n {
                rows.push(vec![CellValue::Number(i as f64)]);
            }
            let wb = workbook_with("S", rows);
            let objects = load_sheet(&wb, "S", &LoadOptions::default()).unwrap();

            assert_eq!(objects.len(), n);
            for obj in &objects {
                assert_eq!(obj.keys().collect::<Vec<_>>(), vec!["A", "B", "C"]);
            }
        }
    }

    #[test]
    fn test_short_row_fills_null() {
        let wb = workbook_with("S", grid(&[&["A", "B"], &["x"]]));
        let objects = load_sheet(&wb, "S", &LoadOptions::default()).unwrap();

        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].get("A"), Some(&CellValue::text("x")));
        assert_eq!(objects[0].get("B"), Some(&CellValue::Empty));
        assert_eq!(
            serde_json::to_string(&objects[0]).unwrap(),
            r#"{"A":"x","B":null}"#
        );
    }

    #[test]
    fn test_extra_cells_beyond_headers_are_dropped() {
        let wb = workbook_with("S", grid(&[&["A"], &["x", "overflow"]]));
        let objects = load_sheet(&wb, "S", &LoadOptions::default()).unwrap();
        assert_eq!(objects[0].len(), 1);
    }

    #[test]
    fn test_date_field_serial_conversion() {
        let wb = workbook_with(
            "Active",
            vec![
                vec!["Patient Name".into(), "DOB".into()],
                vec!["Johnson".into(), CellValue::Number(44562.0)],
            ],
        );
        let objects = load_sheet(&wb, "Active", &LoadOptions::active()).unwrap();

        let expected = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(objects[0].get("DOB"), Some(&CellValue::Timestamp(expected)));
        assert_eq!(
            expected.timestamp(),
            ((44562.0 - SPREADSHEET_EPOCH_OFFSET_DAYS) * 86400.0) as i64
        );
        // Non-date field untouched
        assert_eq!(objects[0].get("Patient Name"), Some(&CellValue::text("Johnson")));
    }

    #[test]
    fn test_date_field_non_numeric_passes_through() {
        let wb = workbook_with(
            "Active",
            vec![
                vec!["DOB".into(), "CP Completed".into(), "Date".into()],
                vec!["unknown".into(), CellValue::Empty, CellValue::Bool(true)],
            ],
        );
        let objects = load_sheet(&wb, "Active", &LoadOptions::active()).unwrap();

        assert_eq!(objects[0].get("DOB"), Some(&CellValue::text("unknown")));
        assert_eq!(objects[0].get("CP Completed"), Some(&CellValue::Empty));
        assert_eq!(objects[0].get("Date"), Some(&CellValue::Bool(true)));
    }

    #[test]
    fn test_numbers_outside_date_fields_stay_numbers() {
        let wb = workbook_with(
            "Active",
            vec![
                vec!["Age".into(), "DOB".into()],
                vec![CellValue::Number(44562.0), CellValue::Number(44562.0)],
            ],
        );
        let objects = load_sheet(&wb, "Active", &LoadOptions::active()).unwrap();
        assert_eq!(objects[0].get("Age"), Some(&CellValue::Number(44562.0)));
        assert!(objects[0].get("DOB").unwrap().as_timestamp().is_some());
    }

    #[test]
    fn test_serial_zero_is_spreadsheet_epoch() {
        let ts = serial_to_timestamp(0.0).unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(1899, 12, 30, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_serial_fraction_keeps_time_of_day() {
        let ts = serial_to_timestamp(44562.5).unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2022, 1, 1, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_serial_non_finite_is_none() {
        assert!(serial_to_timestamp(f64::NAN).is_none());
        assert!(serial_to_timestamp(f64::INFINITY).is_none());
        assert!(serial_to_timestamp(1e300).is_none());
    }

    #[test]
    fn test_missing_required_sheet_lists_available() {
        let wb = Workbook::from_sheets(vec![Sheet::new("Vendors"), Sheet::new("Chat")]);
        let err = load_sheet(&wb, "Active", &LoadOptions::default()).unwrap_err();

        assert!(err.is_not_found());
        let message = err.to_string();
        assert!(message.contains("Vendors"));
        assert!(message.contains("Chat"));
    }

    #[test]
    fn test_missing_optional_sheet_is_empty() {
        let wb = Workbook::from_sheets(vec![Sheet::new("Vendors")]);
        let objects = load_sheet(&wb, "Active", &LoadOptions::default().optional()).unwrap();
        assert!(objects.is_empty());
    }

    #[test]
    fn test_empty_sheet_is_empty_sequence() {
        let wb = Workbook::from_sheets(vec![Sheet::new("Chat")]);
        let objects = load_sheet(&wb, "Chat", &LoadOptions::default()).unwrap();
        assert!(objects.is_empty());
    }

    #[test]
    fn test_row_order_preserved() {
        let wb = workbook_with("S", grid(&[&["N"], &["c"], &["a"], &["b"]]));
        let objects = load_sheet(&wb, "S", &LoadOptions::default()).unwrap();
        let values: Vec<String> = objects
            .iter()
            .map(|o| o.get("N").unwrap().to_string())
            .collect();
        assert_eq!(values, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_empty_header_cells_produce_no_key() {
        let wb = workbook_with(
            "S",
            vec![
                vec!["A".into(), CellValue::Empty, "C".into()],
                vec!["1".into(), "2".into(), "3".into()],
            ],
        );
        let objects = load_sheet(&wb, "S", &LoadOptions::default()).unwrap();
        assert_eq!(objects[0].keys().collect::<Vec<_>>(), vec!["A", "C"]);
        assert_eq!(objects[0].get("C"), Some(&CellValue::text("3")));
    }

    #[test]
    fn test_duplicate_header_last_value_wins() {
        let wb = workbook_with("S", grid(&[&["A", "A"], &["first", "second"]]));
        let objects = load_sheet(&wb, "S", &LoadOptions::default()).unwrap();
        assert_eq!(objects[0].len(), 1);
        assert_eq!(objects[0].get("A"), Some(&CellValue::text("second")));
    }

    #[test]
    fn test_append_row_goes_last() {
        let mut wb = workbook_with("Chat", grid(&[&["Timestamp", "Message"], &["1", "hi"]]));
        append_row(&mut wb, "Chat", vec!["2".into(), "there".into()]).unwrap();

        let sheet = wb.sheet("Chat").unwrap();
        assert_eq!(sheet.rows.len(), 3);
        assert_eq!(sheet.rows[2][1], CellValue::text("there"));
    }

    #[test]
    fn test_append_row_does_not_check_width() {
        let mut wb = workbook_with("Chat", grid(&[&["Timestamp", "Message"]]));
        append_row(&mut wb, "Chat", vec!["1".into()]).unwrap();
        assert_eq!(wb.sheet("Chat").unwrap().rows[1].len(), 1);
    }

    #[test]
    fn test_append_row_missing_sheet() {
        let mut wb = Workbook::from_sheets(vec![Sheet::new("Active")]);
        let err = append_row(&mut wb, "Chat", vec!["x".into()]).unwrap_err();
        assert!(matches!(err, DashboardError::SheetNotFound { .. }));
    }

    #[test]
    fn test_append_row_requires_header() {
        let mut wb = Workbook::from_sheets(vec![Sheet::new("Chat")]);
        let err = append_row(&mut wb, "Chat", vec!["x".into()]).unwrap_err();
        assert!(matches!(err, DashboardError::MissingHeader(_)));
    }
}
