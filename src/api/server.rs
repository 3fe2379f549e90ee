//! Dashboard API server implementation
//!
//! HTTP server using Axum. Serves the sheet endpoints the dashboard client
//! calls, plus health/version info and the static client files.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::handlers;
use crate::store::{AccessToken, FallbackStore, RemoteStore, SheetStore, XlsxStore};

pub const DEFAULT_WORKBOOK: &str = "Dashboard Clone.xlsx";

/// API Server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    /// Local workbook file.
    pub workbook: PathBuf,
    /// Directory served for paths no API route matches.
    pub static_dir: Option<PathBuf>,
    /// Remote spreadsheet used when the local workbook is missing.
    pub spreadsheet_id: Option<String>,
    pub token_file: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            workbook: PathBuf::from(DEFAULT_WORKBOOK),
            static_dir: Some(PathBuf::from("public")),
            spreadsheet_id: None,
            token_file: None,
        }
    }
}

/// Shared application state
pub struct AppState {
    pub version: String,
    pub store: Arc<dyn SheetStore>,
    /// Held across the read-modify-write of an append.
    pub append_lock: Mutex<()>,
}

impl AppState {
    pub fn new(store: Arc<dyn SheetStore>) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            store,
            append_lock: Mutex::new(()),
        }
    }
}

/// Local workbook store, wrapped with the remote fallback when configured.
pub fn build_store(config: &ApiConfig) -> Arc<dyn SheetStore> {
    let local = XlsxStore::new(&config.workbook);

    let (Some(spreadsheet_id), Some(token_file)) = (&config.spreadsheet_id, &config.token_file)
    else {
        return Arc::new(local);
    };

    match AccessToken::from_file(token_file) {
        Ok(token) => Arc::new(FallbackStore::new(
            Box::new(local),
            Box::new(RemoteStore::new(spreadsheet_id.clone(), token)),
        )),
        Err(e) => {
            warn!("Remote fallback disabled: {}", e);
            Arc::new(local)
        }
    }
}

/// Build the router with all endpoints.
pub fn router(state: Arc<AppState>, static_dir: Option<&Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = Router::new()
        // Health and info endpoints
        .route("/health", get(handlers::health))
        .route("/version", get(handlers::version))
        .route("/api", get(handlers::root))
        // Sheet endpoints
        .route("/api/read-active", get(handlers::read_active))
        .route("/api/read-vendors", get(handlers::read_vendors))
        .route("/api/read-chat", get(handlers::read_chat))
        .route("/api/add-chat-message", post(handlers::add_chat_message));

    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Run the API server
pub async fn run_api_server(config: ApiConfig) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "dashboard_server=info,hospice_dashboard=info,tower_http=info".into()
            }),
        )
        .init();

    let store = build_store(&config);
    info!("Workbook store: {}", store.describe());
    let state = Arc::new(AppState::new(store));
    let app = router(state, config.static_dir.as_deref());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Dashboard server running at http://{}", addr);
    info!("   Endpoints: /api/read-active, /api/read-vendors, /api/read-chat, /api/add-chat-message");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Dashboard server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, stopping server...");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 3000);
        assert_eq!(config.workbook, PathBuf::from("Dashboard Clone.xlsx"));
        assert!(config.spreadsheet_id.is_none());
    }

    #[test]
    fn test_config_address_format() {
        let config = ApiConfig {
            host: "0.0.0.0".to_string(),
            port: 9090,
            ..ApiConfig::default()
        };
        let addr: SocketAddr = format!("{}:{}", config.host, config.port)
            .parse()
            .unwrap();
        assert_eq!(addr.port(), 9090);
    }

    #[test]
    fn test_build_store_local_only() {
        let store = build_store(&ApiConfig::default());
        assert_eq!(store.describe(), "Dashboard Clone.xlsx");
    }

    #[test]
    fn test_build_store_with_fallback() {
        let dir = tempfile::TempDir::new().unwrap();
        let token_file = dir.path().join("token.json");
        std::fs::write(&token_file, r#"{"access_token":"ya29.test"}"#).unwrap();

        let config = ApiConfig {
            spreadsheet_id: Some("sheet-123".to_string()),
            token_file: Some(token_file),
            ..ApiConfig::default()
        };
        let store = build_store(&config);
        assert!(store.describe().contains("remote spreadsheet sheet-123"));
    }

    #[test]
    fn test_build_store_bad_token_stays_local() {
        let config = ApiConfig {
            spreadsheet_id: Some("sheet-123".to_string()),
            token_file: Some(PathBuf::from("/nonexistent/token.json")),
            ..ApiConfig::default()
        };
        let store = build_store(&config);
        assert_eq!(store.describe(), "Dashboard Clone.xlsx");
    }

    #[test]
    fn test_app_state_version() {
        let state = AppState::new(build_store(&ApiConfig::default()));
        assert_eq!(state.version, env!("CARGO_PKG_VERSION"));
    }
}
