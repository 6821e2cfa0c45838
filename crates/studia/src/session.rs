//! Session types and completed-session records
//!
//! A session is one timed interval: a work block, one of the two break
//! kinds, or a single-mode revision block. Completed sessions are recorded
//! immutably in the owning timer's history.

use chrono::Local;
use serde::{Deserialize, Serialize};

/// Timestamp format used for `completed_at` and `last_saved` fields
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Type of study session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    /// Focused work block in the pomodoro cycle
    Work,
    /// Short recovery break between work blocks
    ShortBreak,
    /// Long break after a full cycle of work blocks
    LongBreak,
    /// Single-mode revision block, no breaks
    Revision,
}

impl SessionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionType::Work => "work",
            SessionType::ShortBreak => "short_break",
            SessionType::LongBreak => "long_break",
            SessionType::Revision => "revision",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "work" => Some(SessionType::Work),
            "short_break" => Some(SessionType::ShortBreak),
            "long_break" => Some(SessionType::LongBreak),
            "revision" => Some(SessionType::Revision),
            _ => None,
        }
    }

    /// Human-readable label ("Work", "Short Break", ...)
    pub fn label(&self) -> &'static str {
        match self {
            SessionType::Work => "Work",
            SessionType::ShortBreak => "Short Break",
            SessionType::LongBreak => "Long Break",
            SessionType::Revision => "Revision",
        }
    }

    /// Whether completing a session of this type advances the session counters
    pub fn is_focus(&self) -> bool {
        matches!(self, SessionType::Work | SessionType::Revision)
    }
}

/// A completed session, immutable once recorded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Session type
    #[serde(rename = "type")]
    pub session_type: SessionType,
    /// Duration in minutes
    pub duration: u32,
    /// Local completion timestamp ("2026-08-06 14:30:00")
    pub completed_at: String,
    /// 1-based session number; break records inherit the current work count
    pub session_number: u32,
}

impl SessionRecord {
    /// Create a record stamped with the current local time
    pub fn new(session_type: SessionType, duration: u32, session_number: u32) -> Self {
        Self {
            session_type,
            duration,
            completed_at: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            session_number,
        }
    }
}
