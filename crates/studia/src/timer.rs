//! Timer state machines
//!
//! Two variants behind one enum: the cyclic pomodoro timer
//! (work -> short/long break -> work) and the single-mode revision timer.
//! Both carry the same capability set: start, pause, reset, tick, session
//! info, config updates, session completion, statistics, and snapshots.
//!
//! The countdown driver never touches these types; the presentation loop
//! applies one `tick()` per driver event, so the model has a single writer.

use chrono::Local;
use tracing::debug;

use crate::config::{ConfigError, ConfigPatch, PomodoroConfig, RevisionConfig};
use crate::session::{SessionRecord, SessionType, TIMESTAMP_FORMAT};
use crate::stats::TimerStats;
use crate::store::{ConfigSection, Snapshot};

/// Default daily focus goal in minutes
pub const DEFAULT_DAILY_GOAL_MINUTES: u32 = 120;

/// Read-only view of the live timer state; the presentation layer's sole
/// read path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionInfo {
    /// Current session type
    pub session_type: SessionType,
    /// Seconds left in the current session
    pub remaining_secs: u32,
    /// Completed focus sessions so far
    pub completed_sessions: u32,
}

/// Cyclic work/break timer with study notes and a daily goal
#[derive(Debug, Clone)]
pub struct PomodoroTimer {
    config: PomodoroConfig,
    current: SessionType,
    remaining_secs: u32,
    running: bool,
    /// Completed work sessions; drives the long-break cadence
    work_sessions: u32,
    /// Lifetime completed focus sessions
    total_sessions: u32,
    records: Vec<SessionRecord>,
    notes: Vec<String>,
    daily_goal_minutes: u32,
}

impl Default for PomodoroTimer {
    fn default() -> Self {
        Self::new(PomodoroConfig::default())
    }
}

impl PomodoroTimer {
    pub fn new(config: PomodoroConfig) -> Self {
        Self {
            config,
            current: SessionType::Work,
            remaining_secs: config.work_duration * 60,
            running: false,
            work_sessions: 0,
            total_sessions: 0,
            records: Vec::new(),
            notes: Vec::new(),
            daily_goal_minutes: DEFAULT_DAILY_GOAL_MINUTES,
        }
    }

    /// Mark the timer running; the caller owns launching a countdown
    pub fn start(&mut self) {
        self.running = true;
    }

    /// Stop without losing the remaining time
    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Consume one second of the current session while running
    pub fn tick(&mut self) {
        if self.running {
            self.remaining_secs = self.remaining_secs.saturating_sub(1);
        }
    }

    /// Rewind to a stopped work session at full duration. Counters and
    /// history are preserved.
    pub fn reset(&mut self) {
        self.running = false;
        self.current = SessionType::Work;
        self.remaining_secs = self.config.work_duration * 60;
    }

    pub fn config(&self) -> PomodoroConfig {
        self.config
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn session_info(&self) -> SessionInfo {
        SessionInfo {
            session_type: self.current,
            remaining_secs: self.remaining_secs,
            completed_sessions: self.work_sessions,
        }
    }

    pub fn records(&self) -> &[SessionRecord] {
        &self.records
    }

    pub fn total_sessions(&self) -> u32 {
        self.total_sessions
    }

    pub fn statistics(&self) -> TimerStats {
        TimerStats::from_records(&self.records)
    }

    /// The session type that follows the current one.
    ///
    /// From a work session the break is long exactly when the session being
    /// finished fills the cycle: `(work_sessions + 1) % cycle == 0` against
    /// the pre-increment counter. From any break the cycle returns to work.
    pub fn next_session_type(&self) -> SessionType {
        match self.current {
            SessionType::Work => {
                if (self.work_sessions + 1) % self.config.sessions_until_long_break == 0 {
                    SessionType::LongBreak
                } else {
                    SessionType::ShortBreak
                }
            }
            _ => SessionType::Work,
        }
    }

    /// Record the just-finished session and advance to the next one.
    ///
    /// Work sessions are numbered counter+1 and increment both counters;
    /// break records inherit the current counter and change nothing.
    pub fn complete_session(&mut self) -> SessionRecord {
        let finished = self.current;
        let next = self.next_session_type();

        let number = if finished == SessionType::Work {
            self.work_sessions + 1
        } else {
            self.work_sessions
        };
        let record = SessionRecord::new(finished, self.config.duration_for(finished), number);
        self.records.push(record.clone());

        if finished == SessionType::Work {
            self.work_sessions += 1;
            self.total_sessions += 1;
        }

        self.current = next;
        self.remaining_secs = self.config.duration_for(next) * 60;
        debug!(
            "completed {} session #{}, next: {}",
            finished.as_str(),
            number,
            next.as_str()
        );
        record
    }

    /// Merge a config patch; on success, a stopped timer is rewound to the
    /// (possibly new) work duration. A rejected patch changes nothing.
    pub fn update_config(&mut self, patch: &ConfigPatch) -> Result<(), ConfigError> {
        self.config = self.config.merged(patch)?;
        if !self.running {
            self.remaining_secs = self.config.work_duration * 60;
        }
        Ok(())
    }

    pub fn add_note(&mut self, note: &str) -> bool {
        let trimmed = note.trim();
        if trimmed.is_empty() {
            return false;
        }
        self.notes.push(trimmed.to_string());
        true
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    pub fn set_daily_goal(&mut self, minutes: u32) {
        self.daily_goal_minutes = minutes;
    }

    pub fn daily_goal_minutes(&self) -> u32 {
        self.daily_goal_minutes
    }

    /// Build the durable representation from the live state
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            timer_config: ConfigSection::Pomodoro(self.config),
            sessions_completed: self.total_sessions,
            completed_sessions: self.records.clone(),
            last_saved: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            study_notes: Some(self.notes.clone()),
            daily_goal_minutes: Some(self.daily_goal_minutes),
        }
    }

    /// Rebuild from a snapshot, at the start of a work session.
    ///
    /// The wire format only carries the lifetime total, so the work-cycle
    /// counter is derived by counting work records; the long-break cadence
    /// therefore continues where the history left off.
    pub fn from_snapshot(config: PomodoroConfig, snapshot: &Snapshot) -> Self {
        let mut timer = Self::new(config);
        timer.total_sessions = snapshot.sessions_completed;
        timer.records = snapshot.completed_sessions.clone();
        timer.work_sessions = timer
            .records
            .iter()
            .filter(|r| r.session_type == SessionType::Work)
            .count() as u32;
        if let Some(notes) = &snapshot.study_notes {
            timer.notes = notes.clone();
        }
        if let Some(goal) = snapshot.daily_goal_minutes {
            timer.daily_goal_minutes = goal;
        }
        timer
    }
}

/// Single-mode revision timer; one block type, repeated indefinitely
#[derive(Debug, Clone)]
pub struct RevisionTimer {
    config: RevisionConfig,
    remaining_secs: u32,
    running: bool,
    sessions_completed: u32,
    total_sessions: u32,
    records: Vec<SessionRecord>,
}

impl Default for RevisionTimer {
    fn default() -> Self {
        Self::new(RevisionConfig::default())
    }
}

impl RevisionTimer {
    pub fn new(config: RevisionConfig) -> Self {
        Self {
            config,
            remaining_secs: config.duration * 60,
            running: false,
            sessions_completed: 0,
            total_sessions: 0,
            records: Vec::new(),
        }
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn tick(&mut self) {
        if self.running {
            self.remaining_secs = self.remaining_secs.saturating_sub(1);
        }
    }

    /// Rewind to a stopped block at full duration
    pub fn reset(&mut self) {
        self.running = false;
        self.remaining_secs = self.config.duration * 60;
    }

    pub fn config(&self) -> RevisionConfig {
        self.config
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn session_info(&self) -> SessionInfo {
        SessionInfo {
            session_type: SessionType::Revision,
            remaining_secs: self.remaining_secs,
            completed_sessions: self.total_sessions,
        }
    }

    pub fn records(&self) -> &[SessionRecord] {
        &self.records
    }

    pub fn total_sessions(&self) -> u32 {
        self.total_sessions
    }

    pub fn statistics(&self) -> TimerStats {
        TimerStats::from_records(&self.records)
    }

    /// Revision mode never cycles
    pub fn next_session_type(&self) -> SessionType {
        SessionType::Revision
    }

    /// Record the finished block, bump both counters, rewind to a full block
    pub fn complete_session(&mut self) -> SessionRecord {
        let record = SessionRecord::new(
            SessionType::Revision,
            self.config.duration,
            self.sessions_completed + 1,
        );
        self.records.push(record.clone());

        self.sessions_completed += 1;
        self.total_sessions += 1;
        self.remaining_secs = self.config.duration * 60;
        debug!("completed revision session #{}", self.sessions_completed);
        record
    }

    pub fn update_config(&mut self, patch: &ConfigPatch) -> Result<(), ConfigError> {
        self.config = self.config.merged(patch)?;
        if !self.running {
            self.remaining_secs = self.config.duration * 60;
        }
        Ok(())
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            timer_config: ConfigSection::Revision(self.config),
            sessions_completed: self.total_sessions,
            completed_sessions: self.records.clone(),
            last_saved: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            study_notes: None,
            daily_goal_minutes: None,
        }
    }

    pub fn from_snapshot(config: RevisionConfig, snapshot: &Snapshot) -> Self {
        let mut timer = Self::new(config);
        timer.total_sessions = snapshot.sessions_completed;
        timer.sessions_completed = snapshot.sessions_completed;
        timer.records = snapshot.completed_sessions.clone();
        timer
    }
}

/// A study timer of either variant, dispatched by match
#[derive(Debug, Clone)]
pub enum Timer {
    Pomodoro(PomodoroTimer),
    Revision(RevisionTimer),
}

impl Timer {
    /// Rebuild the variant the snapshot's config section describes
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        match snapshot.timer_config {
            ConfigSection::Pomodoro(config) => {
                Timer::Pomodoro(PomodoroTimer::from_snapshot(config, snapshot))
            }
            ConfigSection::Revision(config) => {
                Timer::Revision(RevisionTimer::from_snapshot(config, snapshot))
            }
        }
    }

    pub fn start(&mut self) {
        match self {
            Timer::Pomodoro(t) => t.start(),
            Timer::Revision(t) => t.start(),
        }
    }

    pub fn pause(&mut self) {
        match self {
            Timer::Pomodoro(t) => t.pause(),
            Timer::Revision(t) => t.pause(),
        }
    }

    pub fn is_running(&self) -> bool {
        match self {
            Timer::Pomodoro(t) => t.is_running(),
            Timer::Revision(t) => t.is_running(),
        }
    }

    pub fn tick(&mut self) {
        match self {
            Timer::Pomodoro(t) => t.tick(),
            Timer::Revision(t) => t.tick(),
        }
    }

    pub fn reset(&mut self) {
        match self {
            Timer::Pomodoro(t) => t.reset(),
            Timer::Revision(t) => t.reset(),
        }
    }

    pub fn remaining_secs(&self) -> u32 {
        match self {
            Timer::Pomodoro(t) => t.remaining_secs(),
            Timer::Revision(t) => t.remaining_secs(),
        }
    }

    pub fn session_info(&self) -> SessionInfo {
        match self {
            Timer::Pomodoro(t) => t.session_info(),
            Timer::Revision(t) => t.session_info(),
        }
    }

    pub fn next_session_type(&self) -> SessionType {
        match self {
            Timer::Pomodoro(t) => t.next_session_type(),
            Timer::Revision(t) => t.next_session_type(),
        }
    }

    pub fn complete_session(&mut self) -> SessionRecord {
        match self {
            Timer::Pomodoro(t) => t.complete_session(),
            Timer::Revision(t) => t.complete_session(),
        }
    }

    pub fn update_config(&mut self, patch: &ConfigPatch) -> Result<(), ConfigError> {
        match self {
            Timer::Pomodoro(t) => t.update_config(patch),
            Timer::Revision(t) => t.update_config(patch),
        }
    }

    pub fn records(&self) -> &[SessionRecord] {
        match self {
            Timer::Pomodoro(t) => t.records(),
            Timer::Revision(t) => t.records(),
        }
    }

    pub fn total_sessions(&self) -> u32 {
        match self {
            Timer::Pomodoro(t) => t.total_sessions(),
            Timer::Revision(t) => t.total_sessions(),
        }
    }

    pub fn statistics(&self) -> TimerStats {
        TimerStats::from_records(self.records())
    }

    pub fn snapshot(&self) -> Snapshot {
        match self {
            Timer::Pomodoro(t) => t.snapshot(),
            Timer::Revision(t) => t.snapshot(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Drive a full session to completion
    fn finish_session(timer: &mut PomodoroTimer) -> SessionRecord {
        timer.start();
        timer.complete_session()
    }

    #[test]
    fn test_break_cadence_with_default_cycle() {
        let mut timer = PomodoroTimer::default();
        let mut breaks = Vec::new();

        // Four work sessions, each followed by its break
        for _ in 0..4 {
            assert_eq!(timer.session_info().session_type, SessionType::Work);
            finish_session(&mut timer);

            let break_record = finish_session(&mut timer);
            breaks.push(break_record.session_type);
        }

        assert_eq!(
            breaks,
            vec![
                SessionType::ShortBreak,
                SessionType::ShortBreak,
                SessionType::ShortBreak,
                SessionType::LongBreak,
            ]
        );
        // The cycle starts over
        assert_eq!(timer.session_info().session_type, SessionType::Work);
    }

    #[test]
    fn test_next_session_type_is_a_pure_query() {
        let mut timer = PomodoroTimer::default();
        assert_eq!(timer.next_session_type(), SessionType::ShortBreak);
        assert_eq!(timer.next_session_type(), SessionType::ShortBreak);

        // Three completed work sessions: the 4th fills the cycle
        for _ in 0..3 {
            finish_session(&mut timer); // work
            finish_session(&mut timer); // break
        }
        assert_eq!(timer.next_session_type(), SessionType::LongBreak);
    }

    #[test]
    fn test_breaks_do_not_move_counters() {
        let mut timer = PomodoroTimer::default();

        let work = finish_session(&mut timer);
        assert_eq!(work.session_number, 1);
        assert_eq!(timer.total_sessions(), 1);

        let brk = finish_session(&mut timer);
        assert_eq!(brk.session_type, SessionType::ShortBreak);
        // Break records inherit the current counter value
        assert_eq!(brk.session_number, 1);
        assert_eq!(timer.total_sessions(), 1);
        assert_eq!(timer.session_info().completed_sessions, 1);
    }

    #[test]
    fn test_complete_session_rewinds_to_next_duration() {
        let mut timer = PomodoroTimer::default();
        finish_session(&mut timer);

        let info = timer.session_info();
        assert_eq!(info.session_type, SessionType::ShortBreak);
        assert_eq!(info.remaining_secs, 5 * 60);
    }

    #[test]
    fn test_update_config_failure_changes_nothing() {
        let mut timer = PomodoroTimer::default();
        let before = timer.session_info();

        let result = timer.update_config(&ConfigPatch {
            work_duration: Some(0),
            ..Default::default()
        });

        assert!(result.is_err());
        assert_eq!(timer.session_info(), before);
        assert_eq!(timer.config(), PomodoroConfig::default());
    }

    #[test]
    fn test_update_config_rewinds_only_when_stopped() {
        let mut timer = PomodoroTimer::default();
        timer
            .update_config(&ConfigPatch {
                work_duration: Some(50),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(timer.remaining_secs(), 50 * 60);

        timer.start();
        timer.tick();
        timer
            .update_config(&ConfigPatch {
                work_duration: Some(30),
                ..Default::default()
            })
            .unwrap();
        // Running: remaining time is left alone
        assert_eq!(timer.remaining_secs(), 50 * 60 - 1);
    }

    #[test]
    fn test_tick_requires_running_and_saturates() {
        let mut timer = PomodoroTimer::default();
        timer.tick();
        assert_eq!(timer.remaining_secs(), 25 * 60);

        timer.start();
        timer.tick();
        assert_eq!(timer.remaining_secs(), 25 * 60 - 1);

        timer.pause();
        timer.tick();
        assert_eq!(timer.remaining_secs(), 25 * 60 - 1);

        timer.remaining_secs = 0;
        timer.start();
        timer.tick();
        assert_eq!(timer.remaining_secs(), 0);
    }

    #[test]
    fn test_reset_preserves_history() {
        let mut timer = PomodoroTimer::default();
        finish_session(&mut timer);
        timer.tick();

        timer.reset();
        let info = timer.session_info();
        assert!(!timer.is_running());
        assert_eq!(info.session_type, SessionType::Work);
        assert_eq!(info.remaining_secs, 25 * 60);
        assert_eq!(info.completed_sessions, 1);
        assert_eq!(timer.records().len(), 2);
    }

    #[test]
    fn test_revision_session_info_after_first_block() {
        let mut timer = RevisionTimer::default();
        timer.start();
        timer.complete_session();

        let info = timer.session_info();
        assert_eq!(info.session_type, SessionType::Revision);
        assert_eq!(info.remaining_secs, 3600);
        assert_eq!(info.completed_sessions, 1);
    }

    #[test]
    fn test_revision_counts_every_block() {
        let mut timer = RevisionTimer::default();
        for n in 1..=3 {
            timer.start();
            let record = timer.complete_session();
            assert_eq!(record.session_type, SessionType::Revision);
            assert_eq!(record.session_number, n);
        }
        assert_eq!(timer.total_sessions(), 3);
        assert_eq!(timer.next_session_type(), SessionType::Revision);
    }

    #[test]
    fn test_revision_config_update() {
        let mut timer = RevisionTimer::default();
        timer
            .update_config(&ConfigPatch {
                duration: Some(90),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(timer.remaining_secs(), 90 * 60);

        // Pomodoro keys are not accepted in revision mode
        assert!(timer
            .update_config(&ConfigPatch {
                work_duration: Some(25),
                ..Default::default()
            })
            .is_err());
    }

    #[test]
    fn test_statistics_counts_focus_and_all_records() {
        let mut timer = PomodoroTimer::default();
        assert_eq!(timer.statistics(), TimerStats::default());

        finish_session(&mut timer); // work
        finish_session(&mut timer); // short break

        let stats = timer.statistics();
        assert_eq!(stats.focus_sessions, 1);
        assert_eq!(stats.total_minutes, 30);
        assert_eq!(stats.total_records, 2);
    }

    #[test]
    fn test_snapshot_roundtrip_restores_cadence() {
        let mut timer = PomodoroTimer::default();
        // Three full work+break rounds: the next break must be the long one
        for _ in 0..3 {
            finish_session(&mut timer);
            finish_session(&mut timer);
        }
        timer.add_note("flashcards done");
        timer.set_daily_goal(150);

        let restored = match Timer::from_snapshot(&timer.snapshot()) {
            Timer::Pomodoro(t) => t,
            Timer::Revision(_) => panic!("expected pomodoro timer"),
        };
        assert_eq!(restored.total_sessions(), 3);
        assert_eq!(restored.records().len(), 6);
        assert_eq!(restored.next_session_type(), SessionType::LongBreak);
        assert!(!restored.is_running());
        assert_eq!(restored.remaining_secs(), 25 * 60);
        assert_eq!(restored.notes(), ["flashcards done"]);
        assert_eq!(restored.daily_goal_minutes(), 150);
    }

    #[test]
    fn test_revision_snapshot_roundtrip() {
        let mut timer = RevisionTimer::new(RevisionConfig { duration: 45 });
        timer.start();
        timer.complete_session();
        timer.complete_session();

        let snapshot = timer.snapshot();
        assert!(snapshot.study_notes.is_none());

        let mut restored = match Timer::from_snapshot(&snapshot) {
            Timer::Revision(t) => t,
            Timer::Pomodoro(_) => panic!("expected revision timer"),
        };
        assert_eq!(restored.total_sessions(), 2);
        assert_eq!(restored.remaining_secs(), 45 * 60);
        assert_eq!(restored.complete_session().session_number, 3);
    }

    #[test]
    fn test_blank_notes_are_dropped() {
        let mut timer = PomodoroTimer::default();
        assert!(!timer.add_note(""));
        assert!(!timer.add_note("   "));
        assert!(timer.add_note("  derivatives rules  "));
        assert_eq!(timer.notes(), ["derivatives rules"]);
    }

    #[test]
    fn test_enum_dispatch_matches_concrete_behavior() {
        let mut timer = Timer::Pomodoro(PomodoroTimer::default());
        timer.start();
        assert!(timer.is_running());
        timer.tick();
        assert_eq!(timer.remaining_secs(), 25 * 60 - 1);

        let record = timer.complete_session();
        assert_eq!(record.session_type, SessionType::Work);
        assert_eq!(timer.session_info().session_type, SessionType::ShortBreak);
        assert_eq!(timer.statistics().focus_sessions, 1);

        timer.reset();
        assert_eq!(timer.session_info().session_type, SessionType::Work);
        assert!(!timer.is_running());
    }
}
