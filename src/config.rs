//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};

use clap::Parser;

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "timekeeper")]
#[command(about = "A local countdown timer and stopwatch service")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Directory holding the persisted timers (defaults to the platform data dir)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Countdown poll cadence in milliseconds (1 to 1000)
    #[arg(long, default_value = "100", value_parser = clap::value_parser!(u64).range(1..=1000))]
    pub cadence_ms: u64,

    /// Alarm sound played in a loop when a timer completes
    #[arg(long, default_value = "/usr/share/sounds/freedesktop/stereo/alarm-clock-elapsed.oga")]
    pub sound: PathBuf,

    /// Command used to play the alarm sound
    #[arg(long, default_value = "paplay")]
    pub player: String,

    /// Do not request notification permission on startup
    #[arg(long)]
    pub no_notifications: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Poll cadence, kept between one millisecond and one second
    pub fn cadence(&self) -> Duration {
        Duration::from_millis(self.cadence_ms.clamp(1, 1000))
    }

    /// Directory for durable storage
    pub fn storage_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("timekeeper")
        })
    }
}
