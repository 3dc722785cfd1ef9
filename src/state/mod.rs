//! State management module
//! 
//! Timer records, the stopwatch and the shared application state.

pub mod app_state;
pub mod stopwatch;
pub mod timer_record;

// Re-export main types
pub use app_state::{AppState, TimerView, COMPLETION_DETAIL};
pub use stopwatch::{Stopwatch, StopwatchSnapshot};
pub use timer_record::{ColorTag, NewTimer, Palette, Preset, TimerPhase, TimerRecord, PRESETS};
