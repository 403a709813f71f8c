//! Time sources for the [`Scheduler`](super::scheduler::Scheduler).
//!
//! Time is expressed as a logical instant: the [`Duration`] elapsed since the
//! clock was created. The scheduler never reads the wall clock directly, so a
//! [`VirtualClock`] can make a one second timer fire without any waiting.

use core::time::Duration;
use std::{
    sync::Mutex,
    thread,
    time::Instant,
};

pub trait Clock: Send + Sync {
    /// The current logical instant.
    fn now(&self) -> Duration;

    /// Block (or pretend to) until `now() >= deadline`.
    fn advance_to(&self, deadline: Duration);
}

/// A clock which only moves when the scheduler asks it to.
#[derive(Debug, Default)]
pub struct VirtualClock {
    now: Mutex<Duration>,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for VirtualClock {
    fn now(&self) -> Duration {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn advance_to(&self, deadline: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        // time never runs backwards
        if deadline > *now {
            *now = deadline;
        }
    }
}

/// Wall clock time. Advancing puts the calling thread to sleep.
#[derive(Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn advance_to(&self, deadline: Duration) {
        let now = self.now();
        if deadline > now {
            thread::sleep(deadline - now);
        }
    }
}
