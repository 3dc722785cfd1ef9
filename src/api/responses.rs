//! API response structures

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::TimerError,
    services::PermissionState,
    state::{TimerRecord, TimerView},
};

/// Timer collection with any load failure surfaced
#[derive(Debug, Clone, Serialize)]
pub struct TimerListResponse {
    pub timers: Vec<TimerView>,
    pub load_error: Option<String>,
}

/// Result of a delete request
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub id: String,
    pub deleted: bool,
    pub timer: Option<TimerRecord>,
}

/// Current notification permission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionResponse {
    pub permission: PermissionState,
    pub alarm_sounding: bool,
}

/// Overall service status
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub timers: usize,
    pub running: usize,
    pub ringing: usize,
    pub permission: PermissionState,
    pub alarm_sounding: bool,
    pub stopwatch_running: bool,
    pub load_error: Option<String>,
    pub uptime: String,
}

/// Error body returned with 4xx/5xx responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl IntoResponse for TimerError {
    fn into_response(self) -> Response {
        let status = match &self {
            TimerError::NotFound(_) => StatusCode::NOT_FOUND,
            e if e.is_invalid_input() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}
