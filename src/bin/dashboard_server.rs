//! Dashboard API Server binary
//!
//! Serves the hospice dashboard sheets over HTTP.

use clap::Parser;
use hospice_dashboard::api::{run_api_server, server::ApiConfig};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dashboard-server")]
#[command(version)]
#[command(about = "Dashboard API Server - sheet endpoints for the hospice team dashboard")]
#[command(long_about = r#"
Dashboard API Server

Sheet endpoints:
  - GET  /api/read-active?spreadsheetId=ID         - Active patients
  - GET  /api/read-vendors?spreadsheetId=ID        - Vendor directory
  - GET  /api/read-chat?spreadsheetId=ID[&user=U]  - Chat messages
  - POST /api/add-chat-message                     - Append a chat message

Additional endpoints:
  - GET  /health           - Health check
  - GET  /version          - Server version info
  - GET  /api              - API documentation

Any other path is served from the static directory.

Example usage:
  dashboard-server                             # Start on localhost:3000
  dashboard-server --workbook team.xlsx --port 8080

  curl "http://localhost:3000/api/read-chat?spreadsheetId=local&user=Christa"
"#)]
struct Args {
    /// Host address to bind to (use 0.0.0.0 for all interfaces)
    #[arg(short = 'H', long, default_value = "127.0.0.1", env = "DASHBOARD_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "3000", env = "DASHBOARD_PORT")]
    port: u16,

    /// Workbook file backing the sheet endpoints
    #[arg(short, long, default_value = "Dashboard Clone.xlsx", env = "DASHBOARD_WORKBOOK")]
    workbook: PathBuf,

    /// Directory of static client files
    #[arg(short, long, default_value = "public", env = "DASHBOARD_STATIC_DIR")]
    static_dir: PathBuf,

    /// Remote spreadsheet used when the workbook file is missing
    #[arg(long, env = "DASHBOARD_SPREADSHEET_ID")]
    spreadsheet_id: Option<String>,

    /// Access token file for the remote spreadsheet
    #[arg(long, env = "DASHBOARD_TOKEN_FILE")]
    token_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = ApiConfig {
        host: args.host,
        port: args.port,
        workbook: args.workbook,
        static_dir: Some(args.static_dir),
        spreadsheet_id: args.spreadsheet_id,
        token_file: args.token_file,
    };

    run_api_server(config).await
}
