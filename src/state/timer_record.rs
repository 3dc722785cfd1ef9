//! Timer record structure and its derived lifecycle phase

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Cosmetic color tag attached to a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTag {
    #[default]
    Blue,
    Green,
    Orange,
    Red,
    Pink,
}

/// Display colors for one tag, as hex strings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub background: &'static str,
    pub border: &'static str,
    pub text: &'static str,
    pub accent: &'static str,
}

impl ColorTag {
    pub const ALL: [ColorTag; 5] = [
        ColorTag::Blue,
        ColorTag::Green,
        ColorTag::Orange,
        ColorTag::Red,
        ColorTag::Pink,
    ];

    /// Parse a tag name, falling back to blue for anything unrecognized
    pub fn parse_or_default(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "blue" => Self::Blue,
            "green" => Self::Green,
            "orange" => Self::Orange,
            "red" => Self::Red,
            "pink" => Self::Pink,
            other => {
                tracing::debug!("Unknown color tag {:?}, using blue", other);
                Self::Blue
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Orange => "orange",
            Self::Red => "red",
            Self::Pink => "pink",
        }
    }

    pub fn palette(&self) -> Palette {
        match self {
            Self::Blue => Palette {
                background: "#eff6ff",
                border: "#bfdbfe",
                text: "#1e3a8a",
                accent: "#2563eb",
            },
            Self::Green => Palette {
                background: "#f0fdf4",
                border: "#bbf7d0",
                text: "#14532d",
                accent: "#16a34a",
            },
            Self::Orange => Palette {
                background: "#fff7ed",
                border: "#fed7aa",
                text: "#7c2d12",
                accent: "#ea580c",
            },
            Self::Red => Palette {
                background: "#fef2f2",
                border: "#fecaca",
                text: "#7f1d1d",
                accent: "#dc2626",
            },
            Self::Pink => Palette {
                background: "#fdf2f8",
                border: "#fbcfe8",
                text: "#831843",
                accent: "#db2777",
            },
        }
    }
}

impl<'de> Deserialize<'de> for ColorTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse_or_default(&raw))
    }
}

impl fmt::Display for ColorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One user-created countdown timer, as persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerRecord {
    pub id: String,
    pub title: String,
    #[serde(rename = "duration")]
    pub duration_seconds: u64,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    pub color: ColorTag,
}

/// Lifecycle phase derived from a record's fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerPhase {
    Idle,
    Running,
    Completed,
}

impl TimerRecord {
    pub fn phase(&self) -> TimerPhase {
        if self.is_active {
            TimerPhase::Running
        } else if self.completed_at.is_some() {
            TimerPhase::Completed
        } else {
            TimerPhase::Idle
        }
    }

    /// End instant to poll against, only while running
    pub fn running_end_time(&self) -> Option<DateTime<Utc>> {
        if self.is_active {
            self.end_time
        } else {
            None
        }
    }
}

/// Input for creating a timer
#[derive(Debug, Clone, Deserialize)]
pub struct NewTimer {
    pub title: String,
    #[serde(default)]
    pub hours: u32,
    #[serde(default)]
    pub minutes: u32,
    #[serde(default)]
    pub seconds: u32,
    #[serde(default)]
    pub color: ColorTag,
}

impl NewTimer {
    pub fn new(title: impl Into<String>, hours: u32, minutes: u32, seconds: u32, color: ColorTag) -> Self {
        Self {
            title: title.into(),
            hours,
            minutes,
            seconds,
            color,
        }
    }
}

/// Quick duration choices offered to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Preset {
    pub label: &'static str,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

pub const PRESETS: [Preset; 6] = [
    Preset { label: "1 min", hours: 0, minutes: 1, seconds: 0 },
    Preset { label: "5 min", hours: 0, minutes: 5, seconds: 0 },
    Preset { label: "10 min", hours: 0, minutes: 10, seconds: 0 },
    Preset { label: "15 min", hours: 0, minutes: 15, seconds: 0 },
    Preset { label: "30 min", hours: 0, minutes: 30, seconds: 0 },
    Preset { label: "1 hour", hours: 1, minutes: 0, seconds: 0 },
];
