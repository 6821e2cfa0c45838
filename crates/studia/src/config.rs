//! Timer duration configuration
//!
//! Configs are plain values: an update merges a [`ConfigPatch`] into the
//! current value and yields a new one, so a rejected patch can never leave
//! a half-applied configuration behind.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::SessionType;

/// Configuration validation failure; the timer state is left unchanged
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} must be at least 1 minute")]
    NonPositive { field: &'static str },
    #[error("sessions_until_long_break must be at least 1")]
    EmptyCycle,
    #[error("revision config requires a positive duration")]
    MissingDuration,
}

/// Durations for the cyclic work/break timer, in minutes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PomodoroConfig {
    /// Work block length
    pub work_duration: u32,
    /// Short break length
    pub short_break: u32,
    /// Long break length
    pub long_break: u32,
    /// Work sessions per long-break cycle
    pub sessions_until_long_break: u32,
}

impl Default for PomodoroConfig {
    fn default() -> Self {
        Self {
            work_duration: 25,
            short_break: 5,
            long_break: 15,
            sessions_until_long_break: 4,
        }
    }
}

impl PomodoroConfig {
    /// Session length in minutes for the given type
    pub fn duration_for(&self, session_type: SessionType) -> u32 {
        match session_type {
            SessionType::Work => self.work_duration,
            SessionType::ShortBreak => self.short_break,
            SessionType::LongBreak => self.long_break,
            // Revision never occurs in the cycle; fall back to the work block
            SessionType::Revision => self.work_duration,
        }
    }

    /// Merge the supplied keys of a patch into this config.
    ///
    /// Rejects a zero `work_duration` or `short_break` and a zero
    /// `sessions_until_long_break`. `long_break` is accepted unchecked,
    /// matching the tool's historical behavior.
    pub fn merged(&self, patch: &ConfigPatch) -> Result<Self, ConfigError> {
        if patch.work_duration == Some(0) {
            return Err(ConfigError::NonPositive {
                field: "work_duration",
            });
        }
        if patch.short_break == Some(0) {
            return Err(ConfigError::NonPositive {
                field: "short_break",
            });
        }
        if patch.sessions_until_long_break == Some(0) {
            return Err(ConfigError::EmptyCycle);
        }

        Ok(Self {
            work_duration: patch.work_duration.unwrap_or(self.work_duration),
            short_break: patch.short_break.unwrap_or(self.short_break),
            long_break: patch.long_break.unwrap_or(self.long_break),
            sessions_until_long_break: patch
                .sessions_until_long_break
                .unwrap_or(self.sessions_until_long_break),
        })
    }
}

/// Duration for the single-mode revision timer, in minutes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionConfig {
    /// Revision block length
    pub duration: u32,
}

impl Default for RevisionConfig {
    fn default() -> Self {
        Self { duration: 60 }
    }
}

impl RevisionConfig {
    /// Merge a patch into this config; only `duration` is accepted and it
    /// must be supplied and positive.
    pub fn merged(&self, patch: &ConfigPatch) -> Result<Self, ConfigError> {
        match patch.duration {
            Some(duration) if duration > 0 => Ok(Self { duration }),
            _ => Err(ConfigError::MissingDuration),
        }
    }
}

/// Partial configuration update; unset keys keep their current values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfigPatch {
    pub work_duration: Option<u32>,
    pub short_break: Option<u32>,
    pub long_break: Option<u32>,
    pub sessions_until_long_break: Option<u32>,
    /// Revision timer only
    pub duration: Option<u32>,
}

impl ConfigPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
