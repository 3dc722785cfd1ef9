//! Alert Coordinator: turns a completed countdown into a notification
//! plus a looping alarm, and silences it again on request

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Notification permission as reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    #[default]
    Default,
    Granted,
    Denied,
}

/// A system notification to display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    /// Replaces an earlier notification carrying the same tag
    pub tag: String,
}

/// Returned when a notification was raised
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationHandle {
    pub tag: String,
    pub title: String,
}

/// Platform notification service
#[async_trait]
pub trait NotificationPlatform: Send + Sync {
    fn permission(&self) -> PermissionState;

    /// Ask for permission once; no retry on denial
    async fn request_permission(&self) -> PermissionState;

    /// Fire-and-forget display
    fn show(&self, notification: &Notification) -> Result<(), String>;
}

/// A loaded looping sound
pub trait AlarmSound: Send {
    fn play(&mut self) -> Result<(), String>;
    fn pause(&mut self);
    /// Move playback back to the beginning
    fn rewind(&mut self);
    fn is_playing(&self) -> bool;
}

/// Audio output able to construct the alarm sound
pub trait AudioDevice: Send + Sync {
    fn load(&self) -> Result<Box<dyn AlarmSound>, String>;
}

/// Owns the single process-wide alarm sound
pub struct AlertCoordinator {
    platform: Arc<dyn NotificationPlatform>,
    audio: Arc<dyn AudioDevice>,
    alarm: Mutex<Option<Box<dyn AlarmSound>>>,
}

impl AlertCoordinator {
    pub fn new(platform: Arc<dyn NotificationPlatform>, audio: Arc<dyn AudioDevice>) -> Self {
        Self {
            platform,
            audio,
            alarm: Mutex::new(None),
        }
    }

    fn lock_alarm(&self) -> MutexGuard<'_, Option<Box<dyn AlarmSound>>> {
        self.alarm.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn permission(&self) -> PermissionState {
        self.platform.permission()
    }

    pub async fn request_permission(&self) -> PermissionState {
        let result = self.platform.request_permission().await;
        info!("Notification permission: {:?}", result);
        result
    }

    /// Raise a notification and sound the alarm.
    ///
    /// Without granted permission nothing is raised and `None` comes back;
    /// callers still show their own completed state.
    pub fn announce(&self, title: &str, detail: &str, tag: &str) -> Option<NotificationHandle> {
        let permission = self.platform.permission();
        if permission != PermissionState::Granted {
            debug!("Skipping notification {:?}, permission is {:?}", title, permission);
            return None;
        }

        let notification = Notification {
            title: title.to_string(),
            body: detail.to_string(),
            tag: tag.to_string(),
        };
        if let Err(e) = self.platform.show(&notification) {
            warn!("Failed to show notification {:?}: {}", title, e);
        }

        self.sound_alarm();

        Some(NotificationHandle {
            tag: notification.tag,
            title: notification.title,
        })
    }

    fn sound_alarm(&self) {
        let mut alarm = self.lock_alarm();

        if alarm.is_none() {
            match self.audio.load() {
                Ok(sound) => *alarm = Some(sound),
                Err(e) => {
                    warn!("Failed to load alarm sound: {}", e);
                    return;
                }
            }
        }

        if let Some(sound) = alarm.as_mut() {
            if sound.is_playing() {
                sound.rewind();
            }
            if let Err(e) = sound.play() {
                warn!("Failed to play alarm sound: {}", e);
            }
        }
    }

    /// Stop and rewind the alarm; safe when nothing is playing
    pub fn silence(&self) {
        if let Some(sound) = self.lock_alarm().as_mut() {
            if sound.is_playing() {
                info!("Silencing alarm");
            }
            sound.pause();
            sound.rewind();
        }
    }

    pub fn is_sounding(&self) -> bool {
        self.lock_alarm().as_ref().is_some_and(|s| s.is_playing())
    }
}
