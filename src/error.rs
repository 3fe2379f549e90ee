use std::path::PathBuf;

use thiserror::Error;

pub type DashboardResult<T> = Result<T, DashboardError>;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Workbook not found: {}", .0.display())]
    WorkbookNotFound(PathBuf),

    #[error("{sheet} sheet not found. Available sheets: {}", .available.join(", "))]
    SheetNotFound {
        sheet: String,
        available: Vec<String>,
    },

    #[error("{0} sheet has no header row")]
    MissingHeader(String),

    #[error("{sheet} sheet is missing required columns: {}", .missing.join(", "))]
    Schema { sheet: String, missing: Vec<String> },

    #[error("Invalid participant name {0:?}: names cannot contain < or >")]
    InvalidName(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read workbook: {0}")]
    Read(String),

    #[error("Failed to write workbook: {0}")]
    Write(String),

    #[error("Remote spreadsheet error: {0}")]
    Remote(String),
}

/// Coarse classification used by the store fallback and the HTTP layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    IoFailure,
    Schema,
}

impl DashboardError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DashboardError::WorkbookNotFound(_) | DashboardError::SheetNotFound { .. } => {
                ErrorKind::NotFound
            }
            DashboardError::MissingHeader(_)
            | DashboardError::Schema { .. }
            | DashboardError::InvalidName(_) => ErrorKind::Schema,
            DashboardError::Io(_)
            | DashboardError::Json(_)
            | DashboardError::Read(_)
            | DashboardError::Write(_)
            | DashboardError::Remote(_) => ErrorKind::IoFailure,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

impl From<reqwest::Error> for DashboardError {
    fn from(err: reqwest::Error) -> Self {
        DashboardError::Remote(err.to_string())
    }
}
