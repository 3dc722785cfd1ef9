//! HTTP endpoint handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::{info, warn};

use super::responses::{
    DeleteResponse, HealthResponse, PermissionResponse, StatusResponse, TimerListResponse,
};
use crate::{
    error::TimerError,
    state::{AppState, NewTimer, Preset, StopwatchSnapshot, TimerPhase, TimerView, PRESETS},
};

/// Handle GET /timers - List timers, newest first
pub async fn list_timers_handler(State(state): State<Arc<AppState>>) -> Json<TimerListResponse> {
    Json(TimerListResponse {
        timers: state.list_timers(),
        load_error: state.load_error(),
    })
}

/// Handle POST /timers - Create an idle timer
pub async fn create_timer_handler(
    State(state): State<Arc<AppState>>,
    Json(input): Json<NewTimer>,
) -> Result<(StatusCode, Json<TimerView>), TimerError> {
    let record = state.create_timer(input).map_err(|e| {
        warn!("Rejected timer: {}", e);
        e
    })?;
    Ok((StatusCode::CREATED, Json(state.get_timer(&record.id)?)))
}

/// Handle GET /timers/:id - Fetch one timer
pub async fn get_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TimerView>, TimerError> {
    Ok(Json(state.get_timer(&id)?))
}

/// Handle POST /timers/:id/start - Start (or restart) the full countdown
pub async fn start_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TimerView>, TimerError> {
    state.start_timer(&id)?;
    info!("Start endpoint called for timer {}", id);
    Ok(Json(state.get_timer(&id)?))
}

/// Handle POST /timers/:id/pause - Stop the countdown
pub async fn pause_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TimerView>, TimerError> {
    state.pause_timer(&id)?;
    info!("Pause endpoint called for timer {}", id);
    Ok(Json(state.get_timer(&id)?))
}

/// Handle POST /timers/:id/reset - Return to idle and silence the alarm
pub async fn reset_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TimerView>, TimerError> {
    state.reset_timer(&id)?;
    info!("Reset endpoint called for timer {}", id);
    Ok(Json(state.get_timer(&id)?))
}

/// Handle POST /timers/:id/complete - Finish a timer now
pub async fn complete_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TimerView>, TimerError> {
    state.complete_timer(&id)?;
    info!("Complete endpoint called for timer {}", id);
    Ok(Json(state.get_timer(&id)?))
}

/// Handle POST /timers/:id/stop-alarm - Silence the alarm, keep the timer completed
pub async fn stop_alarm_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TimerView>, TimerError> {
    state.get_timer(&id)?;
    state.stop_alarm(&id);
    info!("Stop-alarm endpoint called for timer {}", id);
    Ok(Json(state.get_timer(&id)?))
}

/// Handle DELETE /timers/:id - Remove a timer; unknown ids are not an error
pub async fn delete_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Json<DeleteResponse> {
    let removed = state.delete_timer(&id);
    Json(DeleteResponse {
        deleted: removed.is_some(),
        timer: removed,
        id,
    })
}

/// Handle POST /timers/reload - Re-read timers from storage
pub async fn reload_timers_handler(State(state): State<Arc<AppState>>) -> Json<TimerListResponse> {
    let load_error = match state.reload_timers() {
        Ok(()) => state.load_error(),
        Err(e) => {
            warn!("Failed to reload timers, keeping the ones in memory: {}", e);
            Some(e.to_string())
        }
    };
    Json(TimerListResponse {
        timers: state.list_timers(),
        load_error,
    })
}

/// Handle GET /presets - Quick duration choices
pub async fn presets_handler() -> Json<Vec<Preset>> {
    Json(PRESETS.to_vec())
}

/// Handle GET /notifications - Current permission
pub async fn permission_handler(State(state): State<Arc<AppState>>) -> Json<PermissionResponse> {
    Json(PermissionResponse {
        permission: state.permission(),
        alarm_sounding: state.alerts().is_sounding(),
    })
}

/// Handle POST /notifications/permission - Ask the platform once
pub async fn request_permission_handler(
    State(state): State<Arc<AppState>>,
) -> Json<PermissionResponse> {
    let permission = state.request_permission().await;
    Json(PermissionResponse {
        permission,
        alarm_sounding: state.alerts().is_sounding(),
    })
}

/// Handle GET /stopwatch
pub async fn stopwatch_handler(State(state): State<Arc<AppState>>) -> Json<StopwatchSnapshot> {
    Json(state.stopwatch())
}

/// Handle POST /stopwatch/start
pub async fn stopwatch_start_handler(State(state): State<Arc<AppState>>) -> Json<StopwatchSnapshot> {
    Json(state.update_stopwatch("start", |s| s.start()))
}

/// Handle POST /stopwatch/pause
pub async fn stopwatch_pause_handler(State(state): State<Arc<AppState>>) -> Json<StopwatchSnapshot> {
    Json(state.update_stopwatch("pause", |s| s.pause()))
}

/// Handle POST /stopwatch/reset
pub async fn stopwatch_reset_handler(State(state): State<Arc<AppState>>) -> Json<StopwatchSnapshot> {
    Json(state.update_stopwatch("reset", |s| s.reset()))
}

/// Handle GET /status - Return current service status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let timers = state.list_timers();

    Json(StatusResponse {
        running: timers.iter().filter(|t| t.phase == TimerPhase::Running).count(),
        ringing: timers.iter().filter(|t| t.alarm_ringing).count(),
        timers: timers.len(),
        permission: state.permission(),
        alarm_sounding: state.alerts().is_sounding(),
        stopwatch_running: state.stopwatch().running,
        load_error: state.load_error(),
        uptime: state.get_uptime(),
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
