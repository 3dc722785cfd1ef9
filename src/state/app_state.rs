//! Main application state management

use std::{
    collections::HashSet,
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, Instant},
};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::{NewTimer, Palette, Stopwatch, StopwatchSnapshot, TimerPhase, TimerRecord};
use crate::{
    error::{StorageError, TimerError},
    services::{AlertCoordinator, PermissionState},
    store::TimerStore,
    tasks::{LifecycleEngine, TimerEvent},
    utils::{format_time, remaining_seconds, timer_progress, Clock},
};

/// Body of the completion notification
pub const COMPLETION_DETAIL: &str = "Your timer has finished.";

/// A timer record plus the values derived from it for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimerView {
    #[serde(flatten)]
    pub record: TimerRecord,
    pub phase: TimerPhase,
    pub remaining_seconds: u64,
    pub display: String,
    pub progress: f64,
    pub alarm_ringing: bool,
    pub palette: Palette,
}

/// Shared state: the Timer Store, its Lifecycle Engine, the Alert
/// Coordinator and the stopwatch
pub struct AppState {
    store: Mutex<TimerStore>,
    engine: LifecycleEngine,
    alerts: AlertCoordinator,
    clock: Arc<dyn Clock>,
    /// Timers whose completion raised a notification that is still ringing
    ringing: Mutex<HashSet<String>>,
    stopwatch: Mutex<Stopwatch>,
    pub start_time: Instant,
}

impl AppState {
    /// Create the state and the completion events its engine will emit
    pub fn new(
        store: TimerStore,
        clock: Arc<dyn Clock>,
        alerts: AlertCoordinator,
        cadence: Duration,
    ) -> (Arc<Self>, mpsc::UnboundedReceiver<TimerEvent>) {
        let (engine, events) = LifecycleEngine::new(Arc::clone(&clock), cadence);

        let state = Arc::new(Self {
            store: Mutex::new(store),
            engine,
            alerts,
            clock,
            ringing: Mutex::new(HashSet::new()),
            stopwatch: Mutex::new(Stopwatch::new()),
            start_time: Instant::now(),
        });

        (state, events)
    }

    fn lock_store(&self) -> MutexGuard<'_, TimerStore> {
        self.store.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_ringing(&self) -> MutexGuard<'_, HashSet<String>> {
        self.ringing.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_stopwatch(&self) -> MutexGuard<'_, Stopwatch> {
        self.stopwatch.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn alerts(&self) -> &AlertCoordinator {
        &self.alerts
    }

    pub fn engine(&self) -> &LifecycleEngine {
        &self.engine
    }

    /// Arm polls for every timer persisted as running.
    ///
    /// Timers whose end time passed while the process was down complete on
    /// their first poll.
    pub fn recover_running_timers(&self) -> usize {
        let store = self.lock_store();
        self.engine.sync(store.list());

        let running = store.list().iter().filter(|t| t.is_active).count();
        if running > 0 {
            info!("Recovered {} running timers", running);
        }
        running
    }

    /// Re-read timers from storage and reconcile the polls
    pub fn reload_timers(&self) -> Result<(), StorageError> {
        let mut store = self.lock_store();
        let result = store.reload();
        self.engine.sync(store.list());

        let ids: HashSet<String> = store.list().iter().map(|t| t.id.clone()).collect();
        self.lock_ringing().retain(|id| ids.contains(id));
        result
    }

    pub fn load_error(&self) -> Option<String> {
        self.lock_store().load_error().map(|e| e.to_string())
    }

    pub fn list_timers(&self) -> Vec<TimerView> {
        let store = self.lock_store();
        let ringing = self.lock_ringing();
        store.list().iter().map(|t| self.view(t, &ringing)).collect()
    }

    pub fn get_timer(&self, id: &str) -> Result<TimerView, TimerError> {
        let store = self.lock_store();
        let ringing = self.lock_ringing();
        store
            .get(id)
            .map(|t| self.view(t, &ringing))
            .ok_or_else(|| TimerError::NotFound(id.to_string()))
    }

    fn view(&self, record: &TimerRecord, ringing: &HashSet<String>) -> TimerView {
        let phase = record.phase();
        let remaining = match record.running_end_time() {
            Some(end_time) => self
                .engine
                .remaining(&record.id)
                .unwrap_or_else(|| remaining_seconds(end_time, self.clock.now())),
            None => record.duration_seconds,
        };
        let progress = match phase {
            TimerPhase::Running => timer_progress(record.duration_seconds, remaining),
            TimerPhase::Completed => 100.0,
            TimerPhase::Idle => 0.0,
        };

        TimerView {
            record: record.clone(),
            phase,
            remaining_seconds: remaining,
            display: format_time(remaining),
            progress,
            alarm_ringing: ringing.contains(&record.id),
            palette: record.color.palette(),
        }
    }

    pub fn create_timer(&self, input: NewTimer) -> Result<TimerRecord, TimerError> {
        self.lock_store().create(input)
    }

    pub fn start_timer(&self, id: &str) -> Result<TimerRecord, TimerError> {
        let mut store = self.lock_store();
        let record = store.start(id)?;
        self.engine.watch(&record);
        Ok(record)
    }

    pub fn pause_timer(&self, id: &str) -> Result<TimerRecord, TimerError> {
        let mut store = self.lock_store();
        let record = store.pause(id)?;
        self.engine.unwatch(id);
        Ok(record)
    }

    /// Reset a timer and silence its alarm
    pub fn reset_timer(&self, id: &str) -> Result<TimerRecord, TimerError> {
        let mut store = self.lock_store();
        let record = store.reset(id)?;
        self.engine.unwatch(id);
        self.stop_alarm(id);
        Ok(record)
    }

    /// Mark a timer completed and announce it
    pub fn complete_timer(&self, id: &str) -> Result<TimerRecord, TimerError> {
        let mut store = self.lock_store();
        let record = store.complete(id)?;
        self.engine.unwatch(id);
        self.announce_completion(&record);
        Ok(record)
    }

    /// React to a countdown reaching zero.
    ///
    /// Events for a timer that was paused, reset, restarted or deleted
    /// after the poll fired are ignored. The check, the transition and the
    /// alert happen under one store lock so no user action can interleave.
    pub fn handle_completion(&self, id: &str, end_time: DateTime<Utc>) {
        let mut store = self.lock_store();

        let current = store.get(id).and_then(|t| t.running_end_time());
        if current != Some(end_time) {
            debug!("Ignoring stale completion for timer {}", id);
            return;
        }

        match store.complete(id) {
            Ok(record) => {
                self.engine.unwatch(id);
                self.announce_completion(&record);
            }
            Err(e) => warn!("Failed to complete timer {}: {}", id, e),
        }
    }

    fn announce_completion(&self, record: &TimerRecord) {
        let title = format!("{} completed!", record.title);
        let tag = format!("timer-{}", record.id);
        match self.alerts.announce(&title, COMPLETION_DETAIL, &tag) {
            Some(_) => {
                self.lock_ringing().insert(record.id.clone());
            }
            None => debug!("Timer {} completed without a system notification", record.id),
        }
    }

    pub fn delete_timer(&self, id: &str) -> Option<TimerRecord> {
        let removed = self.lock_store().delete(id);
        self.engine.unwatch(id);
        self.lock_ringing().remove(id);
        removed
    }

    /// Silence the alarm on user request
    pub fn stop_alarm(&self, id: &str) {
        self.alerts.silence();
        self.lock_ringing().remove(id);
    }

    pub fn is_ringing(&self, id: &str) -> bool {
        self.lock_ringing().contains(id)
    }

    pub fn permission(&self) -> PermissionState {
        self.alerts.permission()
    }

    pub async fn request_permission(&self) -> PermissionState {
        self.alerts.request_permission().await
    }

    pub fn stopwatch(&self) -> StopwatchSnapshot {
        self.lock_stopwatch().snapshot()
    }

    pub fn update_stopwatch<F>(&self, action: &str, updater: F) -> StopwatchSnapshot
    where
        F: FnOnce(&mut Stopwatch),
    {
        let mut stopwatch = self.lock_stopwatch();
        updater(&mut stopwatch);
        debug!("Stopwatch {}: {} ticks", action, stopwatch.ticks());
        stopwatch.snapshot()
    }

    pub fn tick_stopwatch(&self) {
        self.lock_stopwatch().tick();
    }

    /// Stop every poll and the alarm
    pub fn shutdown(&self) {
        self.engine.shutdown();
        self.alerts.silence();
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }
}
