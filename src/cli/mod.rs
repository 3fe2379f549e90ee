//! CLI command handlers

pub mod commands;

pub use commands::{chat, check, post, push, read, seed, sheets, workbook_path};
