//! Utility functions module
//! 
//! Clock access, time arithmetic and signal handling used throughout the application.

pub mod clock;
pub mod signals;
pub mod time;

// Re-export main functions
pub use clock::{Clock, ManualClock, SystemClock};
pub use signals::shutdown_signal;
pub use time::{format_time, parse_time_input, remaining_seconds, timer_progress};
