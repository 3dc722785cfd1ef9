//! Timer Store: durable CRUD over the timer collection
//!
//! The in-memory collection is authoritative for the running session and
//! is mirrored in full to durable storage after every mutation. A failed
//! write is logged and never rolls back the in-memory change.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::storage::KeyValueStore;
use crate::{
    error::{StorageError, TimerError},
    state::{NewTimer, TimerRecord},
    utils::{parse_time_input, Clock},
};

/// Storage key holding the serialized timer collection
pub const STORAGE_KEY: &str = "timers_app";

/// Longest accepted countdown (one hundred years)
pub const MAX_DURATION_SECONDS: u64 = 100 * 365 * 24 * 3600;

/// Owns the timer collection, most recently created first
pub struct TimerStore {
    timers: Vec<TimerRecord>,
    storage: Box<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    load_error: Option<StorageError>,
}

impl TimerStore {
    /// Open the store and load whatever durable storage holds.
    ///
    /// A missing document yields an empty collection. A corrupt or
    /// unreadable one also yields an empty collection, with the failure
    /// kept in [`TimerStore::load_error`].
    pub fn open(storage: Box<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        let mut store = Self {
            timers: Vec::new(),
            storage,
            clock,
            load_error: None,
        };

        match store.read_document() {
            Ok(Some(timers)) => {
                info!("Loaded {} timers from storage", timers.len());
                store.timers = timers;
            }
            Ok(None) => debug!("No stored timers yet"),
            Err(e) => {
                warn!("Failed to load timers, starting empty: {}", e);
                store.load_error = Some(e);
            }
        }

        store
    }

    /// Error from the most recent load, if it failed
    pub fn load_error(&self) -> Option<&StorageError> {
        self.load_error.as_ref()
    }

    /// Re-read the collection from durable storage.
    ///
    /// A missing document or a failed read leaves the in-memory collection
    /// untouched; it stays authoritative for the session.
    pub fn reload(&mut self) -> Result<(), StorageError> {
        match self.read_document()? {
            Some(timers) => {
                info!("Loaded {} timers from storage", timers.len());
                self.timers = timers;
                self.load_error = None;
            }
            None => debug!("No stored timers, keeping {} in memory", self.timers.len()),
        }
        Ok(())
    }

    fn read_document(&self) -> Result<Option<Vec<TimerRecord>>, StorageError> {
        match self.storage.get(STORAGE_KEY)? {
            Some(text) => decode_timers(&text).map(Some),
            None => Ok(None),
        }
    }

    /// Current snapshot, most recently created first
    pub fn list(&self) -> &[TimerRecord] {
        &self.timers
    }

    pub fn get(&self, id: &str) -> Option<&TimerRecord> {
        self.timers.iter().find(|t| t.id == id)
    }

    /// Create an idle timer and put it at the front of the collection
    pub fn create(&mut self, input: NewTimer) -> Result<TimerRecord, TimerError> {
        if input.title.trim().is_empty() {
            return Err(TimerError::InvalidTitle);
        }

        let duration_seconds = parse_time_input(input.hours, input.minutes, input.seconds);
        if duration_seconds == 0 || duration_seconds > MAX_DURATION_SECONDS {
            return Err(TimerError::InvalidDuration);
        }

        let record = TimerRecord {
            id: Uuid::new_v4().to_string(),
            title: input.title,
            duration_seconds,
            created_at: self.clock.now(),
            completed_at: None,
            is_active: false,
            end_time: None,
            color: input.color,
        };

        info!("Created timer {} ({:?}, {}s)", record.id, record.title, duration_seconds);
        self.timers.insert(0, record.clone());
        self.persist();
        Ok(record)
    }

    /// Arm a full-duration countdown from now.
    ///
    /// Paused and completed timers also restart from their full duration;
    /// no remaining time is carried over.
    pub fn start(&mut self, id: &str) -> Result<TimerRecord, TimerError> {
        let now = self.clock.now();
        self.replace(id, |timer| {
            let end_time = i64::try_from(timer.duration_seconds)
                .ok()
                .and_then(Duration::try_seconds)
                .and_then(|d| now.checked_add_signed(d))
                .unwrap_or(DateTime::<Utc>::MAX_UTC);
            TimerRecord {
                is_active: true,
                end_time: Some(end_time),
                completed_at: None,
                ..timer.clone()
            }
        })
    }

    /// Stop observing the countdown; `end_time` is left as it was
    pub fn pause(&mut self, id: &str) -> Result<TimerRecord, TimerError> {
        self.replace(id, |timer| TimerRecord {
            is_active: false,
            ..timer.clone()
        })
    }

    pub fn complete(&mut self, id: &str) -> Result<TimerRecord, TimerError> {
        let now = self.clock.now();
        self.replace(id, |timer| TimerRecord {
            is_active: false,
            completed_at: Some(now),
            ..timer.clone()
        })
    }

    pub fn reset(&mut self, id: &str) -> Result<TimerRecord, TimerError> {
        self.replace(id, |timer| TimerRecord {
            is_active: false,
            end_time: None,
            completed_at: None,
            ..timer.clone()
        })
    }

    /// Remove a timer; deleting an unknown id is a no-op
    pub fn delete(&mut self, id: &str) -> Option<TimerRecord> {
        let index = self.timers.iter().position(|t| t.id == id);
        let removed = index.map(|i| self.timers.remove(i));

        match &removed {
            Some(timer) => info!("Deleted timer {} ({:?})", timer.id, timer.title),
            None => debug!("Delete of unknown timer {} ignored", id),
        }

        self.persist();
        removed
    }

    fn replace<F>(&mut self, id: &str, updater: F) -> Result<TimerRecord, TimerError>
    where
        F: FnOnce(&TimerRecord) -> TimerRecord,
    {
        let slot = self
            .timers
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| TimerError::NotFound(id.to_string()))?;

        let updated = updater(slot);
        *slot = updated.clone();
        debug!("Timer {} is now {:?}", id, updated.phase());

        self.persist();
        Ok(updated)
    }

    fn persist(&mut self) {
        let result = encode_timers(&self.timers)
            .and_then(|text| self.storage.set(STORAGE_KEY, &text));

        if let Err(e) = result {
            warn!("Failed to save timers, changes may not survive a restart: {}", e);
        }
    }
}

/// Serialize a collection into the stored document format
pub fn encode_timers(timers: &[TimerRecord]) -> Result<String, StorageError> {
    serde_json::to_string(timers).map_err(StorageError::Serialize)
}

/// Parse the stored document format
pub fn decode_timers(text: &str) -> Result<Vec<TimerRecord>, StorageError> {
    serde_json::from_str(text).map_err(StorageError::Corrupt)
}
