//! Background countdown driver
//!
//! One worker thread per active countdown. The worker holds no timer state:
//! it is launched with the current remaining seconds, counts its own copy
//! down once per interval, and reports over an mpsc channel. The receiving
//! loop stays the sole writer of the timer model, applying one tick per
//! event.
//!
//! The shared active flag is the stop token. Clearing it makes the worker
//! exit at its next wake-up without emitting, so a paused countdown leaves
//! the remaining time exactly where it stopped; worst-case stop latency is
//! one interval. Completion is signalled exactly once and the worker does
//! not repeat. Never run two drivers against the same timer; hold at most
//! one `Countdown` handle per timer instance.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::debug;

/// Production tick interval
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Event sent from the countdown worker to the presentation loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownEvent {
    /// One second elapsed; the model should consume one tick
    Tick { remaining_secs: u32 },
    /// The countdown reached zero while active; sent exactly once
    Completed,
}

/// Handle to a running countdown worker
pub struct Countdown {
    active: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Countdown {
    /// Launch a worker counting down from `remaining_secs` at one tick per
    /// second
    pub fn start(remaining_secs: u32) -> (Self, Receiver<CountdownEvent>) {
        Self::with_interval(remaining_secs, TICK_INTERVAL)
    }

    /// Launch a worker with an injectable interval
    pub fn with_interval(
        remaining_secs: u32,
        interval: Duration,
    ) -> (Self, Receiver<CountdownEvent>) {
        let active = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&active);
        let (tx, rx) = channel();

        let handle = thread::spawn(move || {
            let mut remaining = remaining_secs;
            debug!("countdown started at {}s", remaining);

            while remaining > 0 && flag.load(Ordering::SeqCst) {
                thread::sleep(interval);
                // Re-check after every wait so a pause never loses a second
                if !flag.load(Ordering::SeqCst) {
                    debug!("countdown stopped with {}s left", remaining);
                    return;
                }
                remaining -= 1;
                if tx
                    .send(CountdownEvent::Tick {
                        remaining_secs: remaining,
                    })
                    .is_err()
                {
                    // Receiver gone; nothing left to drive
                    flag.store(false, Ordering::SeqCst);
                    return;
                }
            }

            // Exactly-once completion; a concurrent stop() wins the swap
            if remaining == 0 && flag.swap(false, Ordering::SeqCst) {
                debug!("countdown completed");
                let _ = tx.send(CountdownEvent::Completed);
            }
        });

        (
            Self {
                active,
                handle: Some(handle),
            },
            rx,
        )
    }

    /// Whether the worker is still counting
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Request a stop; the worker observes it at its next wake-up
    pub fn stop(&self) {
        self.active.store(false, Ordering::SeqCst);
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.active.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
