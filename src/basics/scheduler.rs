//! A single-threaded cooperative scheduler.
//!
//! Everything runs on the thread that calls [`Scheduler::run`]: plain
//! callbacks, continuations of [`Deferred`](crate::Deferred) values and
//! polls of spawned tasks all go through one FIFO ready queue. Timers live in
//! a separate queue and are moved onto the ready queue once the clock reaches
//! their deadline.
//!
//! State sits behind `Arc<Mutex<_>>` only because a [`Waker`] has to be
//! `Send + Sync`. No two jobs ever run at the same time.
//!
//! There is no separate high-priority queue for continuations. A continuation
//! queues behind every job that is already ready, including timers that fired
//! at the same instant.
//!
//! Only [`Scheduler`] handles keep the queues alive. Deferred values, settlers
//! and task wakers hold a `WeakScheduler`, so dropping the last handle frees
//! any work still queued.

use core::{
    cmp::Ordering,
    future::Future,
    task::{Context, Waker},
    time::Duration,
};
use std::{
    collections::{BinaryHeap, VecDeque},
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering as AtomicOrdering},
        Arc, Mutex, MutexGuard, Weak,
    },
    task::Wake,
};

use futures_lite::{future::Boxed, FutureExt};
use thiserror::Error;

use super::clock::{Clock, SystemClock, VirtualClock};
use crate::error::UnhandledRejection;

type Job = Box<dyn FnOnce() + Send>;

/// Returns a description of the rejection if nobody observed it.
pub(crate) type RejectionCheck = Box<dyn FnOnce() -> Option<String> + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SchedulerError {
    #[error("gave up after advancing the clock {ticks} times")]
    TickLimitExceeded { ticks: usize },
}

struct TimerEntry {
    deadline: Duration,
    /// Breaks ties between equal deadlines in scheduling order.
    seq: u64,
    job: Job,
}

impl Eq for TimerEntry {}

impl PartialEq for TimerEntry {
    fn eq(&self, other: &Self) -> bool {
        (self.deadline, self.seq) == (other.deadline, other.seq)
    }
}

impl Ord for TimerEntry {
    /// Reversed so that `BinaryHeap` pops the earliest entry first.
    fn cmp(&self, other: &Self) -> Ordering {
        (other.deadline, other.seq).cmp(&(self.deadline, self.seq))
    }
}

impl PartialOrd for TimerEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Default)]
struct Queues {
    ready: VecDeque<Job>,
    timers: BinaryHeap<TimerEntry>,
    next_seq: u64,
    rejection_checks: Vec<RejectionCheck>,
    unhandled: Vec<UnhandledRejection>,
}

struct Shared {
    queues: Mutex<Queues>,
    clock: Arc<dyn Clock>,
    max_ticks: Option<usize>,
    next_task_id: AtomicU64,
}

/// Handle to a cooperative scheduler. Cloning is cheap and every clone drives
/// the same queues.
#[derive(Clone)]
pub struct Scheduler {
    shared: Arc<Shared>,
}

/// A handle which does not keep the scheduler alive.
#[derive(Clone)]
pub(crate) struct WeakScheduler {
    shared: Weak<Shared>,
}

impl WeakScheduler {
    pub(crate) fn upgrade(&self) -> Option<Scheduler> {
        self.shared.upgrade().map(|shared| Scheduler { shared })
    }

    /// Queue `f` if the scheduler is still around, otherwise drop it.
    pub(crate) fn defer<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        match self.upgrade() {
            Some(scheduler) => scheduler.defer(f),
            None => tracing::debug!("scheduler dropped, discarding job"),
        }
    }
}

impl Scheduler {
    /// A scheduler on a [`VirtualClock`].
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> SchedulerBuilder {
        SchedulerBuilder::new()
    }

    pub(crate) fn downgrade(&self) -> WeakScheduler {
        WeakScheduler {
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// The current logical instant.
    pub fn now(&self) -> Duration {
        self.shared.clock.now()
    }

    /// Run `f` once, no earlier than `duration` from now.
    pub fn after<F>(&self, duration: Duration, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let deadline = self.now() + duration;
        let mut queues = self.queues();
        let seq = queues.next_seq;
        queues.next_seq += 1;
        queues.timers.push(TimerEntry {
            deadline,
            seq,
            job: Box::new(f),
        });
        tracing::debug!(deadline_ms = deadline.as_millis(), seq, "timer scheduled");
    }

    /// Queue `f` behind every job that is already ready.
    pub fn defer<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.queues().ready.push_back(Box::new(f));
    }

    /// Run `future` as a cooperative task. Its first poll is queued like any
    /// other job and it is requeued each time its waker fires.
    pub fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let id = self.shared.next_task_id.fetch_add(1, AtomicOrdering::Relaxed);
        let task = Arc::new(Task {
            id,
            future: Mutex::new(Some(future.boxed())),
            queued: AtomicBool::new(false),
            scheduler: self.downgrade(),
        });
        tracing::debug!(task = id, "task spawned");
        task.schedule();
    }

    /// Drive every queued job and timer until nothing is left.
    pub fn run(&self) -> Result<(), SchedulerError> {
        self.run_inner(None)
    }

    /// Like [`run`](Self::run), but stop before firing any timer whose
    /// deadline lies past `limit`. The clock is left at `limit`, even when no
    /// timers are pending.
    pub fn run_until(&self, limit: Duration) -> Result<(), SchedulerError> {
        self.run_inner(Some(limit))
    }

    /// Every rejection that was reported unhandled so far.
    pub fn unhandled_rejections(&self) -> Vec<UnhandledRejection> {
        self.queues().unhandled.clone()
    }

    pub(crate) fn watch_rejection(&self, check: RejectionCheck) {
        self.queues().rejection_checks.push(check);
    }

    fn run_inner(&self, limit: Option<Duration>) -> Result<(), SchedulerError> {
        let mut ticks = 0;
        loop {
            self.drain_ready();
            self.report_unhandled();

            let Some(deadline) = self.queues().timers.peek().map(|t| t.deadline) else {
                if let Some(limit) = limit {
                    self.shared.clock.advance_to(limit);
                }
                return Ok(());
            };
            if let Some(limit) = limit {
                if deadline > limit {
                    self.shared.clock.advance_to(limit);
                    return Ok(());
                }
            }
            if let Some(max) = self.shared.max_ticks {
                if ticks >= max {
                    return Err(SchedulerError::TickLimitExceeded { ticks });
                }
            }
            ticks += 1;

            self.shared.clock.advance_to(deadline);
            self.fire_due_timers();
        }
    }

    fn drain_ready(&self) {
        // the lock must be released before the job runs, jobs schedule more jobs
        loop {
            let Some(job) = self.queues().ready.pop_front() else {
                return;
            };
            job();
        }
    }

    fn fire_due_timers(&self) {
        let now = self.now();
        let mut queues = self.queues();
        while queues.timers.peek().is_some_and(|t| t.deadline <= now) {
            let Some(entry) = queues.timers.pop() else {
                break;
            };
            tracing::debug!(
                deadline_ms = entry.deadline.as_millis(),
                seq = entry.seq,
                "timer fired"
            );
            queues.ready.push_back(entry.job);
        }
    }

    fn report_unhandled(&self) {
        let checks = std::mem::take(&mut self.queues().rejection_checks);
        if checks.is_empty() {
            return;
        }

        let at = self.now();
        let found: Vec<_> = checks
            .into_iter()
            .filter_map(|check| check())
            .map(|description| {
                tracing::error!(%description, at_ms = at.as_millis(), "unhandled rejection");
                UnhandledRejection { description, at }
            })
            .collect();
        self.queues().unhandled.extend(found);
    }

    fn queues(&self) -> MutexGuard<'_, Queues> {
        self.shared.queues.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

struct Task {
    id: u64,
    future: Mutex<Option<Boxed<()>>>,
    /// Set while a poll of this task sits in the ready queue.
    queued: AtomicBool,
    scheduler: WeakScheduler,
}

impl Task {
    fn schedule(self: &Arc<Self>) {
        if self.queued.swap(true, AtomicOrdering::AcqRel) {
            return;
        }
        let task = Arc::clone(self);
        self.scheduler.defer(move || task.poll());
    }

    fn poll(self: Arc<Self>) {
        self.queued.store(false, AtomicOrdering::Release);

        let mut slot = self.future.lock().unwrap_or_else(|e| e.into_inner());
        let Some(future) = slot.as_mut() else {
            return;
        };

        let waker = Waker::from(Arc::clone(&self));
        let mut cx = Context::from_waker(&waker);
        if future.as_mut().poll(&mut cx).is_ready() {
            *slot = None;
            tracing::debug!(task = self.id, "task finished");
        }
    }
}

impl Wake for Task {
    fn wake(self: Arc<Self>) {
        self.schedule();
    }

    fn wake_by_ref(self: &Arc<Self>) {
        self.schedule();
    }
}

/// Configures a [`Scheduler`] before it is created.
///
/// ```
/// use deferred_intuition::Scheduler;
///
/// let scheduler = Scheduler::builder().system_clock().max_ticks(16).build();
/// scheduler.run().unwrap();
/// ```
pub struct SchedulerBuilder {
    clock: Arc<dyn Clock>,
    max_ticks: Option<usize>,
}

impl SchedulerBuilder {
    pub fn new() -> Self {
        Self {
            clock: Arc::new(VirtualClock::new()),
            max_ticks: None,
        }
    }

    /// Timers fire immediately in logical time. This is the default.
    pub fn virtual_clock(self) -> Self {
        self.clock(Arc::new(VirtualClock::new()))
    }

    /// Timers fire after real wall clock delays.
    pub fn system_clock(self) -> Self {
        self.clock(Arc::new(SystemClock::new()))
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Make [`Scheduler::run`] fail once it has advanced the clock `n` times.
    pub fn max_ticks(mut self, n: usize) -> Self {
        self.max_ticks = Some(n);
        self
    }

    pub fn build(self) -> Scheduler {
        Scheduler {
            shared: Arc::new(Shared {
                queues: Mutex::new(Queues::default()),
                clock: self.clock,
                max_ticks: self.max_ticks,
                next_task_id: AtomicU64::new(0),
            }),
        }
    }
}

impl Default for SchedulerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
