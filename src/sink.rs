//! Where consumers write their human readable progress lines.

use core::time::Duration;
use std::sync::{Arc, Mutex};

use crate::basics::scheduler::Scheduler;

pub trait Sink: Send + Sync {
    fn line(&self, line: &str);
}

/// Prints every line to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct Stdout;

impl Sink for Stdout {
    fn line(&self, line: &str) {
        println!("{line}");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Logical instant the line was written at.
    pub at: Duration,
    pub text: String,
}

/// Records lines along with the scheduler time they were written at.
#[derive(Clone)]
pub struct Transcript {
    scheduler: Scheduler,
    lines: Arc<Mutex<Vec<Line>>>,
}

impl Transcript {
    pub fn new(scheduler: &Scheduler) -> Self {
        Self {
            scheduler: scheduler.clone(),
            lines: Arc::default(),
        }
    }

    pub fn lines(&self) -> Vec<Line> {
        self.lines.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.lines().into_iter().map(|line| line.text).collect()
    }
}

impl Sink for Transcript {
    fn line(&self, line: &str) {
        let at = self.scheduler.now();
        tracing::trace!(at_ms = at.as_millis(), line, "transcript line");
        self.lines
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Line {
                at,
                text: line.to_owned(),
            });
    }
}
