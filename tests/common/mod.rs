//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::{
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::mpsc;

use timekeeper::{
    error::StorageError,
    services::{
        AlarmSound, AlertCoordinator, AudioDevice, Notification, NotificationPlatform,
        PermissionState,
    },
    state::AppState,
    store::{KeyValueStore, MemoryStorage, TimerStore},
    tasks::{completion_task, TimerEvent},
    utils::ManualClock,
};

pub const FAST_CADENCE: Duration = Duration::from_millis(10);

/// Notification platform that records what it was asked to show
pub struct RecordingPlatform {
    permission: Mutex<PermissionState>,
    pub shown: Mutex<Vec<Notification>>,
}

impl RecordingPlatform {
    pub fn new(permission: PermissionState) -> Self {
        Self {
            permission: Mutex::new(permission),
            shown: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl NotificationPlatform for RecordingPlatform {
    fn permission(&self) -> PermissionState {
        *self.permission.lock().unwrap()
    }

    async fn request_permission(&self) -> PermissionState {
        *self.permission.lock().unwrap() = PermissionState::Granted;
        PermissionState::Granted
    }

    fn show(&self, notification: &Notification) -> Result<(), String> {
        self.shown.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

/// Audio device whose single sound only flips a flag
#[derive(Default)]
pub struct FlagAudio {
    pub loads: AtomicUsize,
    pub playing: Arc<AtomicBool>,
}

struct FlagSound(Arc<AtomicBool>);

impl AlarmSound for FlagSound {
    fn play(&mut self) -> Result<(), String> {
        self.0.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn pause(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }

    fn rewind(&mut self) {}

    fn is_playing(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

impl AudioDevice for FlagAudio {
    fn load(&self) -> Result<Box<dyn AlarmSound>, String> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FlagSound(Arc::clone(&self.playing))))
    }
}

/// Memory storage whose reads fail while `fail_reads` is set
#[derive(Default)]
pub struct SwitchableStorage {
    inner: MemoryStorage,
    pub fail_reads: Arc<AtomicBool>,
}

impl KeyValueStore for SwitchableStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("read failed".to_string()));
        }
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.inner.set(key, value)
    }
}

pub struct Harness {
    pub state: Arc<AppState>,
    pub clock: Arc<ManualClock>,
    pub platform: Arc<RecordingPlatform>,
    pub audio: Arc<FlagAudio>,
}

/// Build an app state over the given storage, handing back its completion events
pub fn harness_with(
    storage: Box<dyn KeyValueStore>,
    permission: PermissionState,
) -> (Harness, mpsc::UnboundedReceiver<TimerEvent>) {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let platform = Arc::new(RecordingPlatform::new(permission));
    let audio = Arc::new(FlagAudio::default());

    let store = TimerStore::open(storage, clock.clone());
    let alerts = AlertCoordinator::new(platform.clone(), audio.clone());
    let (state, events) = AppState::new(store, clock.clone(), alerts, FAST_CADENCE);

    (
        Harness {
            state,
            clock,
            platform,
            audio,
        },
        events,
    )
}

/// Harness with in-memory storage and a running completion task
pub fn harness(permission: PermissionState) -> Harness {
    let (harness, events) = harness_with(Box::new(MemoryStorage::new()), permission);
    tokio::spawn(completion_task(Arc::clone(&harness.state), events));
    harness
}

/// Poll `check` until it holds or a second passes
pub async fn eventually<F: Fn() -> bool>(check: F) -> bool {
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}
