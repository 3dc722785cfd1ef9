//! Stopwatch ticker background task

use std::{sync::Arc, time::Duration};

use tokio::time::{interval, MissedTickBehavior};
use tracing::info;

use crate::state::AppState;

/// Interval between stopwatch ticks
pub const STOPWATCH_TICK: Duration = Duration::from_millis(100);

/// Background task that advances the stopwatch while it runs
pub async fn stopwatch_task(state: Arc<AppState>) {
    info!("Starting stopwatch task");

    let mut interval = interval(STOPWATCH_TICK);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        interval.tick().await;
        state.tick_stopwatch();
    }
}
