//! External collaborator module
//! 
//! Notification and audio interfaces, the Alert Coordinator built on them,
//! and the desktop command-line backends.

pub mod alerts;
pub mod desktop;

// Re-export main types
pub use alerts::{
    AlarmSound, AlertCoordinator, AudioDevice, Notification, NotificationHandle,
    NotificationPlatform, PermissionState,
};
pub use desktop::{check_notify_send_available, CommandAudio, DesktopNotifier};
