//! Completion handling background task

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;

use super::TimerEvent;
use crate::state::AppState;

/// Background task that turns countdown completions into store updates
/// and alerts
pub async fn completion_task(state: Arc<AppState>, mut events: mpsc::UnboundedReceiver<TimerEvent>) {
    info!("Starting completion task");

    while let Some(event) = events.recv().await {
        match event {
            TimerEvent::Completed { id, end_time } => {
                state.handle_completion(&id, end_time);
            }
        }
    }

    info!("Completion channel closed, stopping completion task");
}
