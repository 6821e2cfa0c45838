//! Session statistics
//!
//! Aggregates a timer's completed-session history:
//! - Focus sessions (work or revision blocks)
//! - Total recorded time, breaks included
//! - Per-day focus minutes for the daily goal readout

use chrono::{NaiveDate, NaiveDateTime};

use crate::session::{SessionRecord, TIMESTAMP_FORMAT};

/// Aggregated timer statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimerStats {
    /// Completed work/revision sessions
    pub focus_sessions: u32,
    /// Sum of all recorded durations in minutes, breaks included
    pub total_minutes: u32,
    /// Total number of records, breaks included
    pub total_records: u32,
}

impl TimerStats {
    /// Calculate statistics from a session history; all zeros when empty
    pub fn from_records(records: &[SessionRecord]) -> Self {
        let focus_sessions = records.iter().filter(|r| r.session_type.is_focus()).count() as u32;
        let total_minutes = records.iter().map(|r| r.duration).sum();

        Self {
            focus_sessions,
            total_minutes,
            total_records: records.len() as u32,
        }
    }

    /// Total recorded time as (hours, minutes)
    pub fn total_time(&self) -> (u32, u32) {
        (self.total_minutes / 60, self.total_minutes % 60)
    }

    /// Average focus session length in minutes, zero when no focus sessions
    pub fn average_focus_minutes(&self, records: &[SessionRecord]) -> u32 {
        if self.focus_sessions == 0 {
            return 0;
        }
        let focus_minutes: u32 = records
            .iter()
            .filter(|r| r.session_type.is_focus())
            .map(|r| r.duration)
            .sum();
        focus_minutes / self.focus_sessions
    }
}

/// Focus minutes recorded on the given date.
///
/// Records with unparsable timestamps are skipped.
pub fn focus_minutes_on(records: &[SessionRecord], date: NaiveDate) -> u32 {
    records
        .iter()
        .filter(|r| r.session_type.is_focus())
        .filter(|r| {
            NaiveDateTime::parse_from_str(&r.completed_at, TIMESTAMP_FORMAT)
                .map(|ts| ts.date() == date)
                .unwrap_or(false)
        })
        .map(|r| r.duration)
        .sum()
}
