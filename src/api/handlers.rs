//! API request handlers
//!
//! The sheet endpoints return bare JSON arrays/objects, the shape the
//! dashboard client consumes. Info endpoints use the [`ApiResponse`] wrapper.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use super::server::AppState;
use crate::chat::{self, NewChat, Recipients};
use crate::error::{DashboardError, DashboardResult};
use crate::loader::{load_sheet, LoadOptions, RowObject};
use crate::records::{ACTIVE_SHEET, CHAT_SHEET, VENDORS_SHEET};

//==============================================================================
// Errors
//==============================================================================

/// JSON error body: `{"error": "...", "request_id": "..."}`
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

#[derive(Debug)]
pub enum ApiError {
    /// Missing or malformed caller input.
    BadRequest(String),
    /// Anything that went wrong on our side. Only `message` reaches the client.
    Internal {
        message: &'static str,
        source: DashboardError,
    },
}

impl ApiError {
    fn internal(message: &'static str) -> impl FnOnce(DashboardError) -> ApiError {
        move |source| ApiError::Internal { message, source }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody {
                    error: message,
                    request_id: None,
                }),
            )
                .into_response(),
            ApiError::Internal { message, source } => {
                let request_id = Uuid::new_v4().to_string();
                error!("{} [{}]: {}", message, request_id, source);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody {
                        error: message.to_string(),
                        request_id: Some(request_id),
                    }),
                )
                    .into_response()
            }
        }
    }
}

//==============================================================================
// Sheet endpoints
//==============================================================================

/// Query string shared by the read endpoints
#[derive(Debug, Default, Deserialize)]
pub struct SheetQuery {
    #[serde(rename = "spreadsheetId")]
    pub spreadsheet_id: Option<String>,
    pub user: Option<String>,
}

impl SheetQuery {
    fn require_spreadsheet_id(&self) -> Result<(), ApiError> {
        match self.spreadsheet_id.as_deref() {
            Some(id) if !id.is_empty() => Ok(()),
            _ => Err(ApiError::BadRequest("spreadsheetId is required".to_string())),
        }
    }
}

async fn read_rows(
    state: &AppState,
    sheet: &str,
    options: &LoadOptions,
) -> DashboardResult<Vec<RowObject>> {
    let workbook = state.store.load().await?;
    let rows = load_sheet(&workbook, sheet, options)?;
    info!("Processed {} rows from {} sheet", rows.len(), sheet);
    Ok(rows)
}

/// GET /api/read-active - Patient rows with date fields normalized
pub async fn read_active(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SheetQuery>,
) -> Result<Json<Vec<RowObject>>, ApiError> {
    query.require_spreadsheet_id()?;
    let rows = read_rows(&state, ACTIVE_SHEET, &LoadOptions::active())
        .await
        .map_err(ApiError::internal("Failed to read data"))?;
    Ok(Json(rows))
}

/// GET /api/read-vendors - Vendor directory rows
pub async fn read_vendors(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SheetQuery>,
) -> Result<Json<Vec<RowObject>>, ApiError> {
    query.require_spreadsheet_id()?;
    let rows = read_rows(&state, VENDORS_SHEET, &LoadOptions::default())
        .await
        .map_err(ApiError::internal("Failed to read vendors"))?;
    Ok(Json(rows))
}

/// GET /api/read-chat - Chat rows, optionally only those `user` takes part in
pub async fn read_chat(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SheetQuery>,
) -> Result<Json<Vec<RowObject>>, ApiError> {
    query.require_spreadsheet_id()?;
    let rows = read_rows(&state, CHAT_SHEET, &LoadOptions::default())
        .await
        .map_err(ApiError::internal("Failed to read chat"))?;

    let rows = match query.user.as_deref().filter(|u| !u.is_empty()) {
        Some(user) => {
            let visible = chat::filter_for_user(rows, user);
            info!("{} chat messages visible to {}", visible.len(), user);
            visible
        }
        None => rows,
    };
    Ok(Json(rows))
}

/// Add chat message request
#[derive(Debug, Deserialize)]
pub struct AddChatRequest {
    pub user: Option<String>,
    pub message: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub recipients: Option<Recipients>,
    pub tags: Option<String>,
}

impl AddChatRequest {
    /// The sender is trimmed; the message is stored exactly as sent.
    fn into_draft(self) -> Result<NewChat, ApiError> {
        let user = self
            .user
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| required("user"))?
            .to_string();
        if !chat::is_valid_name(&user) {
            return Err(ApiError::BadRequest(
                "user cannot contain < or >".to_string(),
            ));
        }
        let message = self
            .message
            .filter(|m| !m.trim().is_empty())
            .ok_or_else(|| required("message"))?;
        Ok(NewChat {
            sender: user,
            message,
            kind: self.kind,
            recipients: self.recipients,
            tags: self.tags,
        })
    }
}

fn required(field: &str) -> ApiError {
    ApiError::BadRequest(format!("{} is required", field))
}

/// Add chat message response
#[derive(Debug, Serialize, Deserialize)]
pub struct AddChatResponse {
    pub success: bool,
    pub timestamp: String,
}

/// POST /api/add-chat-message - Append one message to the Chat sheet
pub async fn add_chat_message(
    State(state): State<Arc<AppState>>,
    body: Result<Json<AddChatRequest>, JsonRejection>,
) -> Result<Json<AddChatResponse>, ApiError> {
    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let draft = request.into_draft()?;

    let _guard = state.append_lock.lock().await;
    let message = chat::post_message(state.store.as_ref(), draft)
        .await
        .map_err(ApiError::internal("Failed to add chat message"))?;

    Ok(Json(AddChatResponse {
        success: true,
        timestamp: message.timestamp,
    }))
}

//==============================================================================
// Info endpoints
//==============================================================================

/// Standard API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub request_id: String,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            request_id: Uuid::new_v4().to_string(),
            data,
        }
    }
}

#[derive(Serialize)]
pub struct EndpointInfo {
    pub path: &'static str,
    pub method: &'static str,
    pub description: &'static str,
}

pub static ENDPOINTS: [EndpointInfo; 6] = [
    EndpointInfo {
        path: "/health",
        method: "GET",
        description: "Health check endpoint",
    },
    EndpointInfo {
        path: "/version",
        method: "GET",
        description: "Get server version",
    },
    EndpointInfo {
        path: "/api/read-active",
        method: "GET",
        description: "Patient records from the Active sheet",
    },
    EndpointInfo {
        path: "/api/read-vendors",
        method: "GET",
        description: "Vendor directory from the Vendors sheet",
    },
    EndpointInfo {
        path: "/api/read-chat",
        method: "GET",
        description: "Team chat log, optionally filtered by user",
    },
    EndpointInfo {
        path: "/api/add-chat-message",
        method: "POST",
        description: "Append a message to the Chat sheet",
    },
];

/// Root endpoint response
#[derive(Serialize)]
pub struct RootResponse {
    pub name: &'static str,
    pub version: String,
    pub store: String,
    pub endpoints: &'static [EndpointInfo],
}

/// GET /api - Server info and endpoint list
pub async fn root(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::ok(RootResponse {
        name: "Hospice Dashboard API",
        version: state.version.clone(),
        store: state.store.describe(),
        endpoints: &ENDPOINTS,
    }))
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// GET /health - Health check
pub async fn health() -> impl IntoResponse {
    Json(ApiResponse::ok(HealthResponse { status: "healthy" }))
}

/// Version response
#[derive(Serialize)]
pub struct VersionResponse {
    pub version: String,
}

/// GET /version - Server version
pub async fn version(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::ok(VersionResponse {
        version: state.version.clone(),
    }))
}
