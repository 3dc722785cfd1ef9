//! Background tasks module
//! 
//! The Lifecycle Engine's countdown polls and the tasks that run alongside
//! the HTTP server.

pub mod completion;
pub mod countdown;
pub mod stopwatch_ticker;

// Re-export main types and functions
pub use completion::completion_task;
pub use countdown::{Countdown, LifecycleEngine, Tick, TimerEvent, DEFAULT_CADENCE};
pub use stopwatch_ticker::{stopwatch_task, STOPWATCH_TICK};
