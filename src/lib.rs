//! Hospice dashboard - workbook-backed sheets for the team dashboard
//!
//! This library turns the sheets of a workbook into JSON-ready row objects,
//! appends chat messages, and serves both over HTTP.
//!
//! # Features
//!
//! - Header-keyed row objects with day-serial date normalization
//! - Typed Active, Vendors and Chat records with header checks
//! - Local .xlsx storage with atomic rewrites and a remote spreadsheet fallback
//! - Axum API server used by the dashboard client
//!
//! # Example
//!
//! ```no_run
//! use hospice_dashboard::store::xlsx::read_workbook;
//! use hospice_dashboard::{load_sheet, LoadOptions};
//! use std::path::Path;
//!
//! let workbook = read_workbook(Path::new("Dashboard Clone.xlsx"))?;
//! let patients = load_sheet(&workbook, "Active", &LoadOptions::active())?;
//!
//! println!("Patients: {}", patients.len());
//! # Ok::<(), hospice_dashboard::error::DashboardError>(())
//! ```

pub mod api;
pub mod chat;
pub mod cli;
pub mod error;
pub mod loader;
pub mod records;
pub mod seed;
pub mod store;
pub mod workbook;

// Re-export commonly used types
pub use error::{DashboardError, DashboardResult};
pub use loader::{append_row, load_sheet, LoadOptions, RowObject};
pub use workbook::{CellValue, Sheet, Workbook};
