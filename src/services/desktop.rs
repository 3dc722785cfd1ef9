//! Desktop notification and audio backends driven through external commands

use std::{
    path::PathBuf,
    process::Stdio,
    sync::Mutex,
    time::Duration,
};

use async_trait::async_trait;
use tokio::{
    process::Command,
    runtime::Handle,
    task::JoinHandle,
    time::{sleep, Instant},
};
use tracing::{debug, info, warn};

use super::alerts::{AlarmSound, AudioDevice, Notification, NotificationPlatform, PermissionState};

const NOTIFY_SEND: &str = "notify-send";

/// Shortest gap between two starts of the alarm player
const MIN_REPLAY_INTERVAL: Duration = Duration::from_secs(1);

/// Notifications shown with `notify-send`
#[derive(Debug)]
pub struct DesktopNotifier {
    app_name: String,
    permission: Mutex<PermissionState>,
}

impl DesktopNotifier {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            permission: Mutex::new(PermissionState::Default),
        }
    }

    fn set_permission(&self, permission: PermissionState) {
        *self.permission.lock().unwrap_or_else(|e| e.into_inner()) = permission;
    }
}

/// Check whether `notify-send` can be executed
pub async fn check_notify_send_available() -> Result<(), String> {
    let output = Command::new(NOTIFY_SEND)
        .arg("--version")
        .output()
        .await
        .map_err(|e| format!("{} is not available: {}", NOTIFY_SEND, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("{} --version failed: {}", NOTIFY_SEND, stderr));
    }

    debug!("{} is available", NOTIFY_SEND);
    Ok(())
}

#[async_trait]
impl NotificationPlatform for DesktopNotifier {
    fn permission(&self) -> PermissionState {
        *self.permission.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn request_permission(&self) -> PermissionState {
        let permission = match check_notify_send_available().await {
            Ok(()) => PermissionState::Granted,
            Err(e) => {
                warn!("Desktop notifications unavailable: {}", e);
                PermissionState::Denied
            }
        };
        self.set_permission(permission);
        permission
    }

    fn show(&self, notification: &Notification) -> Result<(), String> {
        let runtime = Handle::try_current().map_err(|e| format!("No async runtime: {}", e))?;

        let mut command = Command::new(NOTIFY_SEND);
        command
            .args(["--app-name", self.app_name.as_str(), "--urgency", "critical"])
            .arg(format!("--hint=string:x-canonical-private-synchronous:{}", notification.tag))
            .arg(&notification.title)
            .arg(&notification.body)
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        let title = notification.title.clone();
        runtime.spawn(async move {
            match command.output().await {
                Ok(output) if output.status.success() => {
                    debug!("Notification {:?} shown", title);
                }
                Ok(output) => {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    warn!("{} failed: {}", NOTIFY_SEND, stderr);
                }
                Err(e) => warn!("Failed to execute {}: {}", NOTIFY_SEND, e),
            }
        });

        Ok(())
    }
}

/// Alarm sound played by an external player command
#[derive(Debug, Clone)]
pub struct CommandAudio {
    player: String,
    sound: PathBuf,
}

impl CommandAudio {
    pub fn new(player: impl Into<String>, sound: impl Into<PathBuf>) -> Self {
        Self {
            player: player.into(),
            sound: sound.into(),
        }
    }
}

impl AudioDevice for CommandAudio {
    fn load(&self) -> Result<Box<dyn AlarmSound>, String> {
        if !self.sound.exists() {
            return Err(format!("Sound file not found: {}", self.sound.display()));
        }

        info!("Loaded alarm sound {}", self.sound.display());
        Ok(Box::new(LoopingCommandSound {
            player: self.player.clone(),
            sound: self.sound.clone(),
            task: None,
        }))
    }
}

/// Replays the sound file until paused; each run starts from the beginning
pub struct LoopingCommandSound {
    player: String,
    sound: PathBuf,
    task: Option<JoinHandle<()>>,
}

impl LoopingCommandSound {
    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            // kill_on_drop terminates the running player
            task.abort();
        }
    }
}

impl AlarmSound for LoopingCommandSound {
    fn play(&mut self) -> Result<(), String> {
        if self.is_playing() {
            return Ok(());
        }

        let runtime = Handle::try_current().map_err(|e| format!("No async runtime: {}", e))?;
        let player = self.player.clone();
        let sound = self.sound.clone();

        self.task = Some(runtime.spawn(async move {
            loop {
                let started = Instant::now();
                let status = Command::new(&player)
                    .arg(&sound)
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .kill_on_drop(true)
                    .status()
                    .await;

                match status {
                    Ok(status) if status.success() => {
                        let elapsed = started.elapsed();
                        if elapsed < MIN_REPLAY_INTERVAL {
                            sleep(MIN_REPLAY_INTERVAL - elapsed).await;
                        }
                    }
                    Ok(status) => {
                        warn!("{} exited with {}, stopping alarm loop", player, status);
                        break;
                    }
                    Err(e) => {
                        warn!("Failed to execute {}: {}", player, e);
                        break;
                    }
                }
            }
        }));

        Ok(())
    }

    fn pause(&mut self) {
        self.stop();
    }

    fn rewind(&mut self) {
        if self.is_playing() {
            self.stop();
            if let Err(e) = self.play() {
                warn!("Failed to restart alarm sound: {}", e);
            }
        }
    }

    fn is_playing(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for LoopingCommandSound {
    fn drop(&mut self) {
        self.stop();
    }
}
