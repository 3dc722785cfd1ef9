//! Timekeeper - A local countdown timer and stopwatch service
//! 
//! This library provides named countdown timers that persist across
//! restarts, a per-timer countdown engine anchored to absolute end times,
//! completion alerts (desktop notification plus looping alarm) and a
//! simple stopwatch, all exposed over a small HTTP API.

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod state;
pub mod store;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use error::{StorageError, TimerError};
pub use state::AppState;
pub use store::TimerStore;
pub use utils::signals::shutdown_signal;
