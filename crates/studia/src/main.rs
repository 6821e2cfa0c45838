//! studia - Study pomodoro and revision timer
//!
//! "Show up, sit down, start the clock."
//!
//! Usage:
//!   studia run [--sessions N]    Run pomodoro sessions interactively
//!   studia run --revision        Run a single-mode revision block
//!   studia status                Show saved configuration and progress
//!   studia config [--work N]     Show or update timer durations
//!   studia stats                 Show session statistics
//!   studia note [TEXT]           Add or list study notes
//!   studia goal [MINUTES]        Set or show the daily focus goal

use std::io::{self, IsTerminal, Write};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use tracing_subscriber::EnvFilter;

use studia::config::ConfigPatch;
use studia::countdown::{Countdown, CountdownEvent};
use studia::session::SessionRecord;
use studia::stats::focus_minutes_on;
use studia::store::TimerStore;
use studia::timer::{PomodoroTimer, RevisionTimer, Timer};
use studia_core::{format, Paths};

/// studia - Study pomodoro and revision timer
#[derive(Parser)]
#[command(name = "studia")]
#[command(about = "Study pomodoro and revision timer with persistent session history")]
#[command(version)]
#[command(after_help = r#"MODES:
    pomodoro      Work/break cycle with a long break every 4th session
    --revision    One fixed revision block, repeated, nothing persisted

KEYS (during run):
    space         Pause / resume
    r             Reset to the start of the cycle
    q / esc       Quit

EXAMPLES:
    studia run                     # One 25-minute work session plus break
    studia run --sessions 4        # A full cycle ending in a long break
    studia run --revision --duration 90
    studia config --work 50 --short-break 10
    studia note "redo chapter 4 exercises"
    studia goal 180

Progress is saved automatically after every completed session.
"#)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run timer sessions interactively
    #[command(alias = "r")]
    Run {
        /// Number of focus sessions to complete before exiting
        #[arg(long, default_value = "1")]
        sessions: u32,

        /// Use the single-mode revision timer (not persisted)
        #[arg(long)]
        revision: bool,

        /// Revision block length in minutes
        #[arg(long, requires = "revision", value_name = "MINS")]
        duration: Option<u32>,
    },

    /// Show saved configuration and progress
    #[command(alias = "st")]
    Status,

    /// Show or update timer durations
    Config {
        /// Work block length in minutes
        #[arg(long, value_name = "MINS")]
        work: Option<u32>,

        /// Short break length in minutes
        #[arg(long, value_name = "MINS")]
        short_break: Option<u32>,

        /// Long break length in minutes
        #[arg(long, value_name = "MINS")]
        long_break: Option<u32>,

        /// Work sessions per long-break cycle
        #[arg(long, value_name = "N")]
        cycle: Option<u32>,
    },

    /// Show session statistics
    #[command(alias = "statistics")]
    Stats,

    /// Add a study note, or list notes
    Note {
        /// Note text; omit to list existing notes
        text: Option<String>,
    },

    /// Set or show the daily focus goal
    Goal {
        /// Goal in minutes; omit to show the current goal
        minutes: Option<u32>,
    },
}

// ANSI color codes
const GREEN: &str = "\x1b[0;32m";
const CYAN: &str = "\x1b[0;36m";
const MAGENTA: &str = "\x1b[0;35m";
const YELLOW: &str = "\x1b[0;33m";
const BOLD: &str = "\x1b[1m";
const NC: &str = "\x1b[0m";

/// Check if stdout is a TTY and colors should be used
fn use_colors() -> bool {
    io::stdout().is_terminal()
}

/// Conditionally apply color
fn color(code: &str, text: &str) -> String {
    if use_colors() {
        format!("{}{}{}", code, text, NC)
    } else {
        text.to_string()
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let paths = Paths::new();
    let store = TimerStore::new(&paths.state("timer"))?;

    match cli.command {
        Some(Commands::Run {
            sessions,
            revision,
            duration,
        }) => cmd_run(&store, sessions, revision, duration),
        Some(Commands::Status) => cmd_status(&store),
        Some(Commands::Config {
            work,
            short_break,
            long_break,
            cycle,
        }) => cmd_config(&store, work, short_break, long_break, cycle),
        Some(Commands::Stats) => cmd_stats(&store),
        Some(Commands::Note { text }) => cmd_note(&store, text),
        Some(Commands::Goal { minutes }) => cmd_goal(&store, minutes),
        None => cmd_status(&store),
    }
}

/// Load the saved pomodoro timer, or a fresh one.
///
/// A snapshot holding a revision config (only possible by hand-editing the
/// data file) is ignored rather than misread.
fn load_pomodoro(store: &TimerStore) -> PomodoroTimer {
    match store.load().map(|s| Timer::from_snapshot(&s)) {
        Some(Timer::Pomodoro(timer)) => timer,
        Some(Timer::Revision(_)) | None => PomodoroTimer::default(),
    }
}

/// Run timer sessions interactively
fn cmd_run(store: &TimerStore, sessions: u32, revision: bool, duration: Option<u32>) -> Result<()> {
    let mut timer = if revision {
        let mut timer = RevisionTimer::default();
        if let Some(mins) = duration {
            if let Err(e) = timer.update_config(&ConfigPatch {
                duration: Some(mins),
                ..Default::default()
            }) {
                println!("{} {}", color(YELLOW, "[error]"), e);
                return Ok(());
            }
        }
        Timer::Revision(timer)
    } else {
        Timer::Pomodoro(load_pomodoro(store))
    };

    let target = sessions.max(1);
    let info = timer.session_info();

    println!("{}", color(&format!("{}{}", BOLD, MAGENTA), "STUDY MODE"));
    println!();
    println!(
        "  {}   {}",
        color(CYAN, "Session:"),
        info.session_type.label()
    );
    println!(
        "  {} {}",
        color(CYAN, "Remaining:"),
        format::clock(info.remaining_secs)
    );
    if target > 1 {
        println!("  {}    {} focus sessions", color(CYAN, "Target:"), target);
    }
    println!();

    enable_raw_mode().context("Failed to enable raw terminal mode")?;
    let outcome = run_loop(store, &mut timer, target, revision);
    disable_raw_mode().ok();
    println!();

    let finished = outcome?;
    println!(
        "{} {} focus session{} completed this run",
        color(GREEN, "[ok]"),
        finished,
        if finished == 1 { "" } else { "s" }
    );
    Ok(())
}

/// Drive the countdown, applying one model tick per driver event.
///
/// This loop is the timer's only writer; the worker just reports.
fn run_loop(store: &TimerStore, timer: &mut Timer, target: u32, ephemeral: bool) -> Result<u32> {
    timer.start();
    let (mut countdown, mut events) = Countdown::start(timer.remaining_secs());
    let mut paused = false;
    let mut finished: u32 = 0;

    draw_status(timer, paused)?;

    loop {
        match events.recv_timeout(Duration::from_millis(50)) {
            Ok(CountdownEvent::Tick { .. }) => {
                timer.tick();
                draw_status(timer, paused)?;
            }
            Ok(CountdownEvent::Completed) => {
                let record = timer.complete_session();
                announce(&record, timer)?;
                if record.session_type.is_focus() {
                    finished += 1;
                }
                if !ephemeral {
                    if let Err(e) = store.save(&timer.snapshot()) {
                        write_line(&format!(
                            "{} progress not saved: {}",
                            color(YELLOW, "[warn]"),
                            e
                        ))?;
                    }
                }
                if finished >= target {
                    timer.pause();
                    return Ok(finished);
                }
                let (next, rx) = Countdown::start(timer.remaining_secs());
                countdown = next;
                events = rx;
                draw_status(timer, paused)?;
            }
            Err(RecvTimeoutError::Timeout) => {}
            // Worker already gone (paused); keep polling keys at a walk
            Err(RecvTimeoutError::Disconnected) => {
                std::thread::sleep(Duration::from_millis(50));
            }
        }

        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Char(' ') => {
                        if paused {
                            timer.start();
                            let (next, rx) = Countdown::start(timer.remaining_secs());
                            countdown = next;
                            events = rx;
                            paused = false;
                        } else {
                            countdown.stop();
                            drain_ticks(&events, timer);
                            timer.pause();
                            paused = true;
                        }
                        draw_status(timer, paused)?;
                    }
                    KeyCode::Char('r') => {
                        countdown.stop();
                        timer.reset();
                        paused = true;
                        draw_status(timer, paused)?;
                    }
                    KeyCode::Char('q') | KeyCode::Esc => {
                        countdown.stop();
                        timer.pause();
                        return Ok(finished);
                    }
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        countdown.stop();
                        timer.pause();
                        return Ok(finished);
                    }
                    _ => {}
                }
            }
        }
    }
}

/// Apply ticks already in flight when a pause is requested, so the shown
/// time matches where the countdown actually stopped
fn drain_ticks(events: &Receiver<CountdownEvent>, timer: &mut Timer) {
    while let Ok(event) = events.try_recv() {
        if let CountdownEvent::Tick { .. } = event {
            timer.tick();
        }
    }
}

/// Redraw the single status line
fn draw_status(timer: &Timer, paused: bool) -> Result<()> {
    let info = timer.session_info();
    let state = if paused { "paused " } else { "running" };
    let line = format!(
        "  {} {}  [{}]  sessions: {}",
        color(CYAN, info.session_type.label()),
        color(BOLD, &format::clock(info.remaining_secs)),
        state,
        info.completed_sessions,
    );

    let mut stdout = io::stdout();
    write!(stdout, "\r\x1b[K{}", line)?;
    stdout.flush()?;
    Ok(())
}

/// Print a full line from inside the raw-mode loop
fn write_line(text: &str) -> Result<()> {
    let mut stdout = io::stdout();
    write!(stdout, "\r\x1b[K{}\r\n", text)?;
    stdout.flush()?;
    Ok(())
}

/// Announce a completed session: terminal bell plus a summary line
fn announce(record: &SessionRecord, timer: &Timer) -> Result<()> {
    let next = timer.session_info().session_type;
    write_line(&format!(
        "\x07{} {} session #{} complete. Next: {}",
        color(GREEN, "[done]"),
        record.session_type.label(),
        record.session_number,
        next.label()
    ))
}

/// Show saved configuration and progress
fn cmd_status(store: &TimerStore) -> Result<()> {
    let timer = load_pomodoro(store);
    let config = timer.config();
    let stats = timer.statistics();

    println!("{}", color(BOLD, "Study Timer"));
    println!();
    println!(
        "  {}    work {}m, short break {}m, long break {}m, cycle of {}",
        color(CYAN, "Config:"),
        config.work_duration,
        config.short_break,
        config.long_break,
        config.sessions_until_long_break
    );
    println!(
        "  {}  {} work sessions, {} records in total",
        color(CYAN, "Lifetime:"),
        stats.focus_sessions,
        stats.total_records
    );
    println!(
        "  {}      {} ({}m), then {}",
        color(CYAN, "Next:"),
        timer.session_info().session_type.label(),
        config.work_duration,
        timer.next_session_type().label()
    );

    let today = focus_minutes_on(timer.records(), chrono::Local::now().date_naive());
    println!(
        "  {}     {} of {} goal",
        color(CYAN, "Today:"),
        format::duration_minutes(today),
        format::duration_minutes(timer.daily_goal_minutes())
    );
    if !timer.notes().is_empty() {
        println!("  {}     {}", color(CYAN, "Notes:"), timer.notes().len());
    }
    println!();
    println!("Run 'studia run' to start the next session");

    Ok(())
}

/// Show or update timer durations
fn cmd_config(
    store: &TimerStore,
    work: Option<u32>,
    short_break: Option<u32>,
    long_break: Option<u32>,
    cycle: Option<u32>,
) -> Result<()> {
    let mut timer = load_pomodoro(store);

    let patch = ConfigPatch {
        work_duration: work,
        short_break,
        long_break,
        sessions_until_long_break: cycle,
        duration: None,
    };

    if patch.is_empty() {
        let config = timer.config();
        println!("{}", color(BOLD, "Timer configuration"));
        println!("  work duration:             {} minutes", config.work_duration);
        println!("  short break:               {} minutes", config.short_break);
        println!("  long break:                {} minutes", config.long_break);
        println!(
            "  sessions until long break: {}",
            config.sessions_until_long_break
        );
        return Ok(());
    }

    if let Err(e) = timer.update_config(&patch) {
        println!("{} {}", color(YELLOW, "[error]"), e);
        return Ok(());
    }

    store.save(&timer.snapshot())?;
    println!("{} Configuration updated", color(GREEN, "[ok]"));
    Ok(())
}

/// Show session statistics
fn cmd_stats(store: &TimerStore) -> Result<()> {
    let timer = load_pomodoro(store);
    let records = timer.records();
    let stats = timer.statistics();

    println!("{}", color(BOLD, "Study Statistics"));
    println!();

    if stats.total_records == 0 {
        println!("  No sessions completed yet.");
        println!();
        println!("Start your first one with: studia run");
        return Ok(());
    }

    let (hours, mins) = stats.total_time();
    println!(
        "  {}   {}",
        color(CYAN, "Focus sessions:"),
        stats.focus_sessions
    );
    println!(
        "  {}       {}h {}m across {} records",
        color(CYAN, "Total time:"),
        hours,
        mins,
        stats.total_records
    );
    println!(
        "  {}    {} minutes",
        color(CYAN, "Average focus:"),
        stats.average_focus_minutes(records)
    );

    let today = focus_minutes_on(records, chrono::Local::now().date_naive());
    println!(
        "  {}            {} of {} goal",
        color(CYAN, "Today:"),
        format::duration_minutes(today),
        format::duration_minutes(timer.daily_goal_minutes())
    );

    println!();
    println!("{}", color(BOLD, "Recent activity"));
    for (i, record) in records.iter().rev().take(5).enumerate() {
        println!(
            "  {}. {} ({} min) at {}",
            i + 1,
            record.session_type.label(),
            record.duration,
            record.completed_at
        );
    }

    Ok(())
}

/// Add a study note, or list notes
fn cmd_note(store: &TimerStore, text: Option<String>) -> Result<()> {
    let mut timer = load_pomodoro(store);

    match text {
        Some(text) => {
            if !timer.add_note(&text) {
                println!("{} Empty note ignored", color(YELLOW, "[warn]"));
                return Ok(());
            }
            store.save(&timer.snapshot())?;
            println!("{} Note added", color(GREEN, "[ok]"));
        }
        None => {
            if timer.notes().is_empty() {
                println!("No study notes yet. Add one with: studia note \"...\"");
                return Ok(());
            }
            println!("{}", color(BOLD, "Study notes"));
            for (i, note) in timer.notes().iter().enumerate() {
                println!("  {}. {}", i + 1, note);
            }
        }
    }

    Ok(())
}

/// Set or show the daily focus goal
fn cmd_goal(store: &TimerStore, minutes: Option<u32>) -> Result<()> {
    let mut timer = load_pomodoro(store);

    match minutes {
        Some(minutes) => {
            timer.set_daily_goal(minutes);
            store.save(&timer.snapshot())?;
            println!(
                "{} Daily goal set to {}",
                color(GREEN, "[ok]"),
                format::duration_minutes(minutes)
            );
        }
        None => {
            let today = focus_minutes_on(timer.records(), chrono::Local::now().date_naive());
            println!(
                "Daily goal: {} ({} done today)",
                format::duration_minutes(timer.daily_goal_minutes()),
                format::duration_minutes(today)
            );
        }
    }

    Ok(())
}
