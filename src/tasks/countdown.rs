//! Lifecycle Engine: per-timer countdown polling
//!
//! Remaining time is always recomputed as `end_time - now` on each poll,
//! never decremented, so missed or delayed ticks cannot cause drift. Each
//! running timer gets its own tokio task that publishes the remaining
//! seconds on a `watch` channel and emits one `TimerEvent::Completed` when
//! the countdown reaches zero, then stops.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use chrono::{DateTime, Utc};
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
    time::MissedTickBehavior,
};
use tracing::{debug, info, warn};

use crate::{
    state::TimerRecord,
    utils::{remaining_seconds, Clock},
};

/// Poll cadence used when none is configured
pub const DEFAULT_CADENCE: Duration = Duration::from_millis(100);

/// Signals raised by running countdowns
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    /// The countdown armed for `end_time` reached zero
    Completed { id: String, end_time: DateTime<Utc> },
}

/// Outcome of one recomputation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Remaining(u64),
    /// Remaining time just reached zero; returned exactly once
    Completed,
    /// Completion already fired, nothing left to do
    Finished,
}

/// Derived countdown state for one running period
#[derive(Debug, Clone)]
pub struct Countdown {
    end_time: DateTime<Utc>,
    last_remaining: Option<u64>,
    fired: bool,
}

impl Countdown {
    pub fn new(end_time: DateTime<Utc>) -> Self {
        Self {
            end_time,
            last_remaining: None,
            fired: false,
        }
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }

    /// Recompute remaining time against `now`.
    ///
    /// The reported value never increases, even if the clock steps back.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Tick {
        if self.fired {
            return Tick::Finished;
        }

        let computed = remaining_seconds(self.end_time, now);
        let remaining = self.last_remaining.map_or(computed, |last| last.min(computed));
        self.last_remaining = Some(remaining);

        if remaining == 0 {
            self.fired = true;
            Tick::Completed
        } else {
            Tick::Remaining(remaining)
        }
    }
}

/// A live poll for one running timer; aborted when dropped
struct Watch {
    end_time: DateTime<Utc>,
    remaining: watch::Receiver<u64>,
    handle: JoinHandle<()>,
}

impl Drop for Watch {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Registry of independent countdown polls, keyed by timer id
pub struct LifecycleEngine {
    clock: Arc<dyn Clock>,
    cadence: Duration,
    events: mpsc::UnboundedSender<TimerEvent>,
    watches: Mutex<HashMap<String, Watch>>,
}

impl LifecycleEngine {
    /// Create an engine and the receiving end of its completion events
    pub fn new(
        clock: Arc<dyn Clock>,
        cadence: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<TimerEvent>) {
        let (events, events_rx) = mpsc::unbounded_channel();
        let engine = Self {
            clock,
            cadence,
            events,
            watches: Mutex::new(HashMap::new()),
        };
        (engine, events_rx)
    }

    fn lock_watches(&self) -> MutexGuard<'_, HashMap<String, Watch>> {
        self.watches.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Match the poll for `record` to its current state.
    ///
    /// Running records get a poll (kept while one for the same end time is
    /// still live, re-armed once it has finished); anything else has its
    /// poll stopped. A re-armed poll may report the same completion twice,
    /// so completion handling must drop events that no longer match.
    pub fn watch(&self, record: &TimerRecord) {
        let Some(end_time) = record.running_end_time() else {
            self.unwatch(&record.id);
            return;
        };

        let mut watches = self.lock_watches();
        if watches
            .get(&record.id)
            .is_some_and(|w| w.end_time == end_time && !w.handle.is_finished())
        {
            return;
        }

        let countdown = Countdown::new(end_time);
        let initial = remaining_seconds(end_time, self.clock.now());
        let (remaining_tx, remaining_rx) = watch::channel(initial);

        let handle = tokio::spawn(run_countdown(
            record.id.clone(),
            countdown,
            Arc::clone(&self.clock),
            self.cadence,
            remaining_tx,
            self.events.clone(),
        ));

        info!("Watching timer {} ({}s remaining)", record.id, initial);
        watches.insert(
            record.id.clone(),
            Watch {
                end_time,
                remaining: remaining_rx,
                handle,
            },
        );
    }

    /// Stop polling `id`; returns whether a poll existed
    pub fn unwatch(&self, id: &str) -> bool {
        let removed = self.lock_watches().remove(id).is_some();
        if removed {
            debug!("Stopped watching timer {}", id);
        }
        removed
    }

    /// Reconcile polls against a full collection
    pub fn sync(&self, records: &[TimerRecord]) {
        self.lock_watches()
            .retain(|id, _| records.iter().any(|r| &r.id == id && r.is_active));

        for record in records {
            self.watch(record);
        }
    }

    /// Latest remaining seconds published for a watched timer
    pub fn remaining(&self, id: &str) -> Option<u64> {
        self.lock_watches().get(id).map(|w| *w.remaining.borrow())
    }

    /// Stream of remaining seconds for a watched timer
    pub fn subscribe(&self, id: &str) -> Option<watch::Receiver<u64>> {
        self.lock_watches().get(id).map(|w| w.remaining.clone())
    }

    pub fn is_watching(&self, id: &str) -> bool {
        self.lock_watches().contains_key(id)
    }

    pub fn watched_count(&self) -> usize {
        self.lock_watches().len()
    }

    /// Stop every poll
    pub fn shutdown(&self) {
        let mut watches = self.lock_watches();
        if !watches.is_empty() {
            info!("Stopping {} countdown polls", watches.len());
        }
        watches.clear();
    }
}

async fn run_countdown(
    id: String,
    mut countdown: Countdown,
    clock: Arc<dyn Clock>,
    cadence: Duration,
    remaining_tx: watch::Sender<u64>,
    events: mpsc::UnboundedSender<TimerEvent>,
) {
    // First tick fires immediately, so a past-due timer completes at once
    let mut interval = tokio::time::interval(cadence);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        match countdown.tick(clock.now()) {
            Tick::Remaining(remaining) => {
                remaining_tx.send_replace(remaining);
            }
            Tick::Completed => {
                remaining_tx.send_replace(0);
                info!("Timer {} reached zero", id);

                let event = TimerEvent::Completed {
                    id: id.clone(),
                    end_time: countdown.end_time(),
                };
                if events.send(event).is_err() {
                    warn!("No completion listener for timer {}", id);
                }
                break;
            }
            Tick::Finished => break,
        }
    }
}
