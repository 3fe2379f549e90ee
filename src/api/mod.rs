//! Dashboard API server module
//!
//! JSON over HTTP for the dashboard client: patients, vendors and chat.
//! Run with `dashboard-server`.

pub mod handlers;
pub mod server;

pub use server::{router, run_api_server, ApiConfig, AppState};
