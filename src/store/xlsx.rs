//! Local `.xlsx` workbook store: calamine reads, rust_xlsxwriter writes.

use super::SheetStore;
use crate::error::{DashboardError, DashboardResult};
use crate::workbook::{CellValue, Sheet, Workbook};
use async_trait::async_trait;
use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Workbook persisted as one `.xlsx` file.
#[derive(Debug, Clone)]
pub struct XlsxStore {
    path: PathBuf,
}

impl XlsxStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SheetStore for XlsxStore {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn load(&self) -> DashboardResult<Workbook> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || read_workbook(&path))
            .await
            .map_err(|e| DashboardError::Read(format!("read task failed: {}", e)))?
    }

    async fn save(&self, workbook: &Workbook) -> DashboardResult<()> {
        let path = self.path.clone();
        let workbook = workbook.clone();
        tokio::task::spawn_blocking(move || write_workbook(&path, &workbook))
            .await
            .map_err(|e| DashboardError::Write(format!("write task failed: {}", e)))?
    }
}

//==============================================================================
// Reading
//==============================================================================

/// Read every sheet of an `.xlsx` file, in workbook order.
pub fn read_workbook(path: &Path) -> DashboardResult<Workbook> {
    match std::fs::metadata(path) {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(DashboardError::WorkbookNotFound(path.to_path_buf()))
        }
        Err(e) => return Err(e.into()),
    }

    let mut xlsx: Xlsx<_> = open_workbook(path)
        .map_err(|e| DashboardError::Read(format!("{}: {}", path.display(), e)))?;

    let sheet_names = xlsx.sheet_names().to_vec();
    debug!("Available sheets in {}: {:?}", path.display(), sheet_names);

    let mut sheets = Vec::with_capacity(sheet_names.len());
    for name in sheet_names {
        let range = xlsx
            .worksheet_range(&name)
            .map_err(|e| DashboardError::Read(format!("sheet {}: {}", name, e)))?;
        sheets.push(Sheet::with_rows(name, range_to_rows(&range)));
    }

    Ok(Workbook::from_sheets(sheets))
}

/// Grid rows anchored at column A, trailing empty cells dropped.
fn range_to_rows(range: &Range<Data>) -> Vec<Vec<CellValue>> {
    let Some((_, start_col)) = range.start() else {
        return Vec::new();
    };
    let lead = start_col as usize;

    range
        .rows()
        .map(|row| {
            let mut cells = vec![CellValue::Empty; lead];
            cells.extend(row.iter().map(cell_from_data));
            while cells.last().is_some_and(CellValue::is_empty) {
                cells.pop();
            }
            cells
        })
        .collect()
}

fn cell_from_data(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        // Date-formatted cells keep their serial, like any other number
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}

//==============================================================================
// Writing
//==============================================================================

/// Write the whole workbook to `path`, replacing the file atomically.
pub fn write_workbook(path: &Path, workbook: &Workbook) -> DashboardResult<()> {
    let bytes = to_xlsx_bytes(workbook)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(&bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| DashboardError::Io(e.error))?;

    debug!(
        "Wrote {} sheets to {}",
        workbook.sheets().len(),
        path.display()
    );
    Ok(())
}

fn to_xlsx_bytes(workbook: &Workbook) -> DashboardResult<Vec<u8>> {
    let mut book = rust_xlsxwriter::Workbook::new();

    for sheet in workbook.sheets() {
        let worksheet = book.add_worksheet();
        worksheet
            .set_name(&sheet.name)
            .map_err(|e| DashboardError::Write(format!("sheet name {}: {}", sheet.name, e)))?;

        for (row_idx, row) in sheet.rows.iter().enumerate() {
            let xl_row = u32::try_from(row_idx).map_err(|_| {
                DashboardError::Write(format!("{} has too many rows", sheet.name))
            })?;
            for (col_idx, cell) in row.iter().enumerate() {
                let xl_col = u16::try_from(col_idx).map_err(|_| {
                    DashboardError::Write(format!(
                        "{} row {} has too many columns ({})",
                        sheet.name,
                        row_idx + 1,
                        row.len()
                    ))
                })?;
                write_cell(worksheet, xl_row, xl_col, cell).map_err(|e| {
                    DashboardError::Write(format!(
                        "{} row {} column {}: {}",
                        sheet.name,
                        row_idx + 1,
                        col_idx + 1,
                        e
                    ))
                })?;
            }
        }
    }

    book.save_to_buffer()
        .map_err(|e| DashboardError::Write(e.to_string()))
}

fn write_cell(
    worksheet: &mut rust_xlsxwriter::Worksheet,
    row: u32,
    col: u16,
    cell: &CellValue,
) -> Result<(), rust_xlsxwriter::XlsxError> {
    match cell {
        CellValue::Empty => {}
        CellValue::Text(s) => {
            worksheet.write_string(row, col, s)?;
        }
        CellValue::Number(n) => {
            worksheet.write_number(row, col, *n)?;
        }
        CellValue::Bool(b) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        CellValue::Timestamp(_) => {
            worksheet.write_string(row, col, cell.to_string())?;
        }
    }
    Ok(())
}
