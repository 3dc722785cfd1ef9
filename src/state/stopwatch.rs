//! Stopwatch state (ephemeral, never persisted)

use serde::Serialize;

use crate::utils::format_time;

/// Ticks per displayed second
pub const TICKS_PER_SECOND: u64 = 10;

/// Elapsed tick count plus a running flag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stopwatch {
    ticks: u64,
    running: bool,
}

/// Snapshot handed to clients
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopwatchSnapshot {
    pub ticks: u64,
    pub running: bool,
    pub elapsed_seconds: u64,
    pub display: String,
    pub progress: f64,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Stop and zero the stopwatch
    pub fn reset(&mut self) {
        self.running = false;
        self.ticks = 0;
    }

    /// Advance by one tick if running
    pub fn tick(&mut self) {
        if self.running {
            self.ticks += 1;
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.ticks / TICKS_PER_SECOND
    }

    pub fn snapshot(&self) -> StopwatchSnapshot {
        StopwatchSnapshot {
            ticks: self.ticks,
            running: self.running,
            elapsed_seconds: self.elapsed_seconds(),
            display: format_time(self.elapsed_seconds()),
            progress: (self.ticks % 1000) as f64 / 10.0,
        }
    }
}
