//! A value that becomes available exactly once, asynchronously.
//!
//! A producer creates a [`Deferred`] together with its [`Settler`], arranges
//! for the settler to be called later (usually from a timer), and hands the
//! [`Deferred`] to consumers. Consumers either register continuations
//! ([`Deferred::then`] and friends) or `.await` it from inside a task spawned
//! on the [`Scheduler`].
//!
//! ```
//! use std::{convert::Infallible, time::Duration};
//!
//! use deferred_intuition::{Deferred, Scheduler};
//!
//! let scheduler = Scheduler::new();
//! let promise: Deferred<&str, Infallible> = Deferred::new(&scheduler, |settler| {
//!     scheduler.after(Duration::from_millis(1000), move || {
//!         let _ = settler.resolve("Success!");
//!     });
//! });
//! let greeting = promise.then(|value| format!("Yay! {value}"));
//!
//! scheduler.run().unwrap();
//! assert_eq!(greeting.state().resolved(), Some("Yay! Success!".to_owned()));
//! ```

use core::{
    fmt,
    future::{Future, IntoFuture},
    pin::Pin,
    task::{ready, Context, Poll, Waker},
};
use std::sync::{Arc, Mutex, MutexGuard};

use pin_project::pin_project;

use crate::{
    basics::scheduler::{Scheduler, WeakScheduler},
    error::{Rejection, SettleError},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State<T, E> {
    Pending,
    Resolved(T),
    Rejected(E),
}

impl<T, E> State<T, E> {
    pub fn resolved(self) -> Option<T> {
        match self {
            State::Resolved(value) => Some(value),
            _ => None,
        }
    }

    pub fn rejected(self) -> Option<E> {
        match self {
            State::Rejected(error) => Some(error),
            _ => None,
        }
    }
}

type Continuation<T, E> = Box<dyn FnOnce(Result<T, E>) + Send>;

struct Inner<T, E> {
    state: State<T, E>,
    continuations: Vec<Continuation<T, E>>,
    /// A slot is cleared when its `Settled` future is dropped unfinished.
    wakers: Vec<Option<Waker>>,
    /// Whether anyone has registered interest in the outcome.
    observed: bool,
    /// Live `Settler` handles. At zero a pending deferred can never settle.
    settlers: usize,
}

/// Consumer side: observe the outcome.
///
/// Neither side keeps the [`Scheduler`] alive. Once every scheduler handle is
/// dropped, continuations are discarded instead of queued.
pub struct Deferred<T, E> {
    inner: Arc<Mutex<Inner<T, E>>>,
    scheduler: WeakScheduler,
}

/// Producer side: the write-once capability to settle a [`Deferred`].
pub struct Settler<T, E> {
    inner: Arc<Mutex<Inner<T, E>>>,
    scheduler: WeakScheduler,
}

fn lock<T, E>(inner: &Mutex<Inner<T, E>>) -> MutexGuard<'_, Inner<T, E>> {
    inner.lock().unwrap_or_else(|e| e.into_inner())
}

impl<T, E> Clone for Deferred<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            scheduler: self.scheduler.clone(),
        }
    }
}

impl<T, E> Clone for Settler<T, E> {
    fn clone(&self) -> Self {
        lock(&self.inner).settlers += 1;
        Self {
            inner: Arc::clone(&self.inner),
            scheduler: self.scheduler.clone(),
        }
    }
}

impl<T, E> fmt::Debug for Deferred<T, E>
where
    T: fmt::Debug,
    E: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("state", &lock(&self.inner).state)
            .finish_non_exhaustive()
    }
}

impl<T, E> Deferred<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + fmt::Debug + Send + 'static,
{
    /// Create a pending deferred and run `producer` right away with its
    /// settler.
    pub fn new<P>(scheduler: &Scheduler, producer: P) -> Self
    where
        P: FnOnce(Settler<T, E>),
    {
        let (deferred, settler) = Self::pending(scheduler);
        producer(settler);
        deferred
    }

    /// A pending deferred and the settler that completes it.
    pub fn pending(scheduler: &Scheduler) -> (Self, Settler<T, E>) {
        Self::pending_on(scheduler.downgrade())
    }

    fn pending_on(scheduler: WeakScheduler) -> (Self, Settler<T, E>) {
        let inner = Arc::new(Mutex::new(Inner {
            state: State::Pending,
            continuations: Vec::new(),
            wakers: Vec::new(),
            observed: false,
            settlers: 1,
        }));
        let deferred = Self {
            inner: Arc::clone(&inner),
            scheduler: scheduler.clone(),
        };
        let settler = Settler { inner, scheduler };
        (deferred, settler)
    }

    pub fn resolved(scheduler: &Scheduler, value: T) -> Self {
        Self::new(scheduler, |settler| {
            let _ = settler.resolve(value);
        })
    }

    pub fn rejected(scheduler: &Scheduler, error: E) -> Self {
        Self::new(scheduler, |settler| {
            let _ = settler.reject(error);
        })
    }

    /// A snapshot of the current state.
    pub fn state(&self) -> State<T, E> {
        lock(&self.inner).state.clone()
    }

    pub fn is_pending(&self) -> bool {
        matches!(lock(&self.inner).state, State::Pending)
    }

    /// Run `continuation` with the outcome once settled.
    ///
    /// The continuation always goes through the scheduler's ready queue, even
    /// when the deferred is already settled.
    pub fn on_settled<F>(&self, continuation: F)
    where
        F: FnOnce(Result<T, E>) + Send + 'static,
    {
        let outcome = {
            let mut guard = lock(&self.inner);
            let inner = &mut *guard;
            inner.observed = true;
            match &inner.state {
                State::Pending => {
                    inner.continuations.push(Box::new(continuation));
                    return;
                }
                State::Resolved(value) => Ok(value.clone()),
                State::Rejected(error) => Err(error.clone()),
            }
        };
        self.scheduler.defer(move || continuation(outcome));
    }

    /// Chain a step handling both outcomes. Either handler may resolve
    /// (`Ok`) or reject (`Err`) the returned deferred.
    pub fn register<U, F, R>(&self, on_resolved: F, on_rejected: R) -> Deferred<U, E>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> Result<U, E> + Send + 'static,
        R: FnOnce(E) -> Result<U, E> + Send + 'static,
    {
        let (next, settler) = Deferred::pending_on(self.scheduler.clone());
        self.on_settled(move |outcome| {
            let result = match outcome {
                Ok(value) => on_resolved(value),
                Err(error) => on_rejected(error),
            };
            // nothing else holds this settler
            let _ = settler.settle(result);
        });
        next
    }

    /// Map the resolved value. Rejections pass through untouched.
    pub fn then<U, F>(&self, f: F) -> Deferred<U, E>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        self.register(move |value| Ok(f(value)), Err)
    }

    /// Chain a step that itself produces a deferred value, and adopt its
    /// outcome.
    pub fn and_then<U, F>(&self, f: F) -> Deferred<U, E>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> Deferred<U, E> + Send + 'static,
    {
        let (next, settler) = Deferred::pending_on(self.scheduler.clone());
        self.on_settled(move |outcome| match outcome {
            Ok(value) => f(value).on_settled(move |adopted| {
                let _ = settler.settle(adopted);
            }),
            Err(error) => {
                let _ = settler.reject(error);
            }
        });
        next
    }

    /// Intercept a rejection. Resolved values pass through untouched.
    pub fn catch<F>(&self, f: F) -> Deferred<T, E>
    where
        F: FnOnce(E) -> Result<T, E> + Send + 'static,
    {
        self.register(Ok, f)
    }

    /// A future resolving with the outcome. Awaiting the deferred directly
    /// does the same thing.
    pub fn value(&self) -> Settled<T, E> {
        Settled {
            deferred: self.clone(),
            waker_slot: None,
        }
    }
}

impl<T, E> IntoFuture for Deferred<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + fmt::Debug + Send + 'static,
{
    type Output = Result<T, Rejection<E>>;
    type IntoFuture = Settled<T, E>;

    fn into_future(self) -> Self::IntoFuture {
        Settled {
            deferred: self,
            waker_slot: None,
        }
    }
}

impl<T, E> Settler<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + fmt::Debug + Send + 'static,
{
    pub fn resolve(&self, value: T) -> Result<(), SettleError> {
        self.settle(Ok(value))
    }

    pub fn reject(&self, error: E) -> Result<(), SettleError> {
        self.settle(Err(error))
    }

    /// Settle with `outcome`. Only the first call on a deferred has any
    /// effect.
    pub fn settle(&self, outcome: Result<T, E>) -> Result<(), SettleError> {
        let (continuations, wakers, observed) = {
            let mut inner = lock(&self.inner);
            if !matches!(inner.state, State::Pending) {
                tracing::warn!("ignoring second settlement of a deferred value");
                return Err(SettleError::AlreadySettled);
            }
            inner.state = match &outcome {
                Ok(value) => State::Resolved(value.clone()),
                Err(error) => State::Rejected(error.clone()),
            };
            (
                std::mem::take(&mut inner.continuations),
                std::mem::take(&mut inner.wakers),
                inner.observed,
            )
        };

        if let Err(error) = &outcome {
            if !observed {
                self.watch_unhandled(error);
            }
        }
        for continuation in continuations {
            let outcome = outcome.clone();
            self.scheduler.defer(move || continuation(outcome));
        }
        for waker in wakers.into_iter().flatten() {
            waker.wake();
        }
        Ok(())
    }

    fn watch_unhandled(&self, error: &E) {
        let inner = Arc::clone(&self.inner);
        let Some(scheduler) = self.scheduler.upgrade() else {
            tracing::error!(?error, "rejected after its scheduler was dropped");
            return;
        };
        let description = format!("{error:?}");
        scheduler.watch_rejection(Box::new(move || {
            if lock(&inner).observed {
                None
            } else {
                Some(description)
            }
        }));
    }
}

impl<T, E> Drop for Settler<T, E> {
    /// Once the last settler is gone a pending deferred stays pending forever,
    /// so its continuations and wakers are released.
    fn drop(&mut self) {
        let (continuations, wakers) = {
            let mut inner = lock(&self.inner);
            inner.settlers -= 1;
            if inner.settlers > 0 || !matches!(inner.state, State::Pending) {
                return;
            }
            (
                std::mem::take(&mut inner.continuations),
                std::mem::take(&mut inner.wakers),
            )
        };
        if !continuations.is_empty() || wakers.iter().any(Option::is_some) {
            tracing::debug!(
                continuations = continuations.len(),
                "deferred value abandoned before settlement"
            );
        }
        // dropped outside the lock, a waker may own a future awaiting us
        drop(continuations);
        drop(wakers);
    }
}

/// Future returned by [`Deferred::value`] and by awaiting a [`Deferred`].
pub struct Settled<T, E> {
    deferred: Deferred<T, E>,
    /// Index of our waker in the deferred's waker list while pending.
    waker_slot: Option<usize>,
}

impl<T, E> Future for Settled<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + fmt::Debug + Send + 'static,
{
    type Output = Result<T, Rejection<E>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let mut guard = lock(&this.deferred.inner);
        let inner = &mut *guard;
        inner.observed = true;

        match &inner.state {
            State::Resolved(value) => Poll::Ready(Ok(value.clone())),
            State::Rejected(error) => Poll::Ready(Err(Rejection(error.clone()))),
            State::Pending => {
                // the list is emptied when the last settler goes away
                match this.waker_slot.and_then(|slot| inner.wakers.get_mut(slot)) {
                    Some(Some(waker)) => waker.clone_from(cx.waker()),
                    Some(empty) => *empty = Some(cx.waker().clone()),
                    None => {
                        this.waker_slot = Some(inner.wakers.len());
                        inner.wakers.push(Some(cx.waker().clone()));
                    }
                }
                Poll::Pending
            }
        }
    }
}

impl<T, E> Drop for Settled<T, E> {
    /// Release the waker of a future given up on before settlement, so a
    /// deferred that never settles does not pin the waiting task.
    fn drop(&mut self) {
        let Some(slot) = self.waker_slot else {
            return;
        };
        let mut inner = lock(&self.deferred.inner);
        if let Some(waker) = inner.wakers.get_mut(slot) {
            *waker = None;
        }
    }
}

impl Scheduler {
    /// Run `future` as a task and expose its result as a deferred value, the
    /// way calling an `async fn` hands back a promise.
    pub fn spawn_deferred<T, E, F>(&self, future: F) -> Deferred<T, E>
    where
        T: Clone + Send + 'static,
        E: Clone + fmt::Debug + Send + 'static,
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        let (deferred, settler) = Deferred::pending(self);
        self.spawn(SettleWith {
            future,
            settler: Some(settler),
        });
        deferred
    }
}

#[pin_project]
struct SettleWith<F, T, E> {
    #[pin]
    future: F,
    settler: Option<Settler<T, E>>,
}

impl<F, T, E> Future for SettleWith<F, T, E>
where
    F: Future<Output = Result<T, E>>,
    T: Clone + Send + 'static,
    E: Clone + fmt::Debug + Send + 'static,
{
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        let outcome = ready!(this.future.poll(cx));
        if let Some(settler) = this.settler.take() {
            let _ = settler.settle(outcome);
        }
        Poll::Ready(())
    }
}

#[cfg(test)]
mod tests {
    use core::time::Duration;
    use std::{
        convert::Infallible,
        sync::atomic::{AtomicUsize, Ordering},
    };

    use futures_lite::future::{block_on, poll_once, yield_now};

    use super::*;
    use crate::basics::{
        scheduler::SchedulerError,
        sleep::{resolve_after, sleep},
    };

    type Log = Arc<Mutex<Vec<String>>>;

    fn log() -> Log {
        Arc::new(Mutex::new(Vec::new()))
    }

    fn push(log: &Log, line: impl Into<String>) {
        log.lock().unwrap().push(line.into());
    }

    fn lines(log: &Log) -> Vec<String> {
        log.lock().unwrap().clone()
    }

    fn resolve_later<T>(scheduler: &Scheduler, ms: u64, value: T) -> Deferred<T, String>
    where
        T: Clone + Send + 'static,
    {
        Deferred::new(scheduler, |settler| {
            scheduler.after(Duration::from_millis(ms), move || {
                settler.resolve(value).unwrap();
            });
        })
    }

    #[test]
    fn only_the_first_settlement_counts() {
        let scheduler = Scheduler::new();
        let (deferred, settler) = Deferred::<u32, String>::pending(&scheduler);

        assert_eq!(settler.resolve(1), Ok(()));
        assert_eq!(settler.resolve(2), Err(SettleError::AlreadySettled));
        assert_eq!(
            settler.reject("late".to_owned()),
            Err(SettleError::AlreadySettled)
        );
        assert_eq!(deferred.state(), State::Resolved(1));

        let seen = log();
        let sink = Arc::clone(&seen);
        deferred.then(move |v| push(&sink, v.to_string()));
        scheduler.run().unwrap();
        assert_eq!(lines(&seen), ["1"]);
    }

    #[test]
    fn continuations_run_after_settlement_in_registration_order() {
        let scheduler = Scheduler::new();
        let deferred = resolve_later(&scheduler, 1000, 7);
        let seen = log();

        for name in ["first", "second"] {
            let seen = Arc::clone(&seen);
            let observed = deferred.clone();
            let scheduler = scheduler.clone();
            deferred.then(move |v| {
                assert_eq!(observed.state(), State::Resolved(v));
                assert_eq!(scheduler.now(), Duration::from_millis(1000));
                push(&seen, format!("{name} {v}"));
            });
        }

        scheduler.run_until(Duration::from_millis(999)).unwrap();
        assert!(deferred.is_pending());
        assert!(lines(&seen).is_empty());

        scheduler.run().unwrap();
        assert_eq!(lines(&seen), ["first 7", "second 7"]);
    }

    #[test]
    fn late_continuation_still_runs_but_never_inline() {
        let scheduler = Scheduler::new();
        let deferred = Deferred::<&str, Infallible>::resolved(&scheduler, "done");
        let seen = log();

        let sink = Arc::clone(&seen);
        deferred.then(move |v| push(&sink, v));
        push(&seen, "registered");

        scheduler.run().unwrap();
        assert_eq!(lines(&seen), ["registered", "done"]);
    }

    #[test]
    fn rejection_skips_handlers_and_is_reported_once() {
        let scheduler = Scheduler::new();
        let (deferred, settler) = Deferred::<u32, String>::pending(&scheduler);
        let seen = log();

        let (f_log, g_log) = (Arc::clone(&seen), Arc::clone(&seen));
        let end = deferred
            .then(move |v| {
                push(&f_log, "f");
                v + 1
            })
            .then(move |v| {
                push(&g_log, "g");
                v * 2
            });
        scheduler.after(Duration::from_millis(5), move || {
            settler.reject("boom".to_owned()).unwrap();
        });
        scheduler.run().unwrap();

        assert!(lines(&seen).is_empty());
        assert_eq!(end.state(), State::Rejected("boom".to_owned()));
        let unhandled = scheduler.unhandled_rejections();
        assert_eq!(unhandled.len(), 1);
        assert_eq!(unhandled[0].description, "\"boom\"");
        assert_eq!(unhandled[0].at, Duration::from_millis(5));
    }

    #[test]
    fn catch_intercepts_a_rejection() {
        let scheduler = Scheduler::new();
        let recovered = Deferred::<u32, String>::rejected(&scheduler, "boom".to_owned())
            .then(|v| v + 1)
            .catch(|error| Ok(error.len() as u32))
            .then(|v| v * 10);

        scheduler.run().unwrap();
        assert_eq!(recovered.state(), State::Resolved(40));
        assert!(scheduler.unhandled_rejections().is_empty());
    }

    #[test]
    fn register_can_turn_a_value_into_a_rejection() {
        let scheduler = Scheduler::new();
        let checked = resolve_later(&scheduler, 10, 3).register(
            |v: u32| if v > 2 { Err(format!("{v} too big")) } else { Ok(v) },
            Err,
        );
        let handled = checked.catch(|e| Ok(e.len() as u32));

        scheduler.run().unwrap();
        assert_eq!(checked.state(), State::Rejected("3 too big".to_owned()));
        assert_eq!(handled.state(), State::Resolved(9));
        assert!(scheduler.unhandled_rejections().is_empty());
    }

    #[test]
    fn and_then_adopts_the_inner_deferred() {
        let scheduler = Scheduler::new();
        let inner_scheduler = scheduler.clone();
        let chained = resolve_later(&scheduler, 100, 1)
            .and_then(move |v| resolve_later(&inner_scheduler, 200, v + 1));

        scheduler.run_until(Duration::from_millis(150)).unwrap();
        assert!(chained.is_pending());

        scheduler.run().unwrap();
        assert_eq!(chained.state(), State::Resolved(2));
        assert_eq!(scheduler.now(), Duration::from_millis(300));
    }

    #[test]
    fn awaiting_suspends_until_settlement() {
        let scheduler = Scheduler::new();
        let deferred = resolve_later(&scheduler, 1000, "Success!");
        let seen = log();

        let sink = Arc::clone(&seen);
        let clock = scheduler.clone();
        scheduler.spawn(async move {
            push(&sink, "before");
            let value = deferred.await.unwrap();
            push(&sink, format!("{value} at {}", clock.now().as_millis()));
        });

        scheduler.run().unwrap();
        assert_eq!(lines(&seen), ["before", "Success! at 1000"]);
    }

    #[test]
    fn awaiting_a_rejection_raises_it_in_the_task() {
        let scheduler = Scheduler::new();
        let deferred = Deferred::<u32, String>::rejected(&scheduler, "boom".to_owned());
        let seen = log();

        let sink = Arc::clone(&seen);
        scheduler.spawn(async move {
            match deferred.value().await {
                Ok(v) => push(&sink, format!("value {v}")),
                Err(rejection) => push(&sink, format!("caught {}", rejection.into_inner())),
            }
        });

        scheduler.run().unwrap();
        assert_eq!(lines(&seen), ["caught boom"]);
        assert!(scheduler.unhandled_rejections().is_empty());
    }

    #[test]
    fn spawn_deferred_exposes_the_task_result() {
        let scheduler = Scheduler::new();
        let first = resolve_later(&scheduler, 10, 20);
        let second = resolve_later(&scheduler, 20, 22);

        let sum = scheduler.spawn_deferred(async move {
            let a = first.await.map_err(Rejection::into_inner)?;
            yield_now().await;
            let b = second.await.map_err(Rejection::into_inner)?;
            Ok::<_, String>(a + b)
        });
        let doubled = sum.then(|v| v * 2);

        scheduler.run().unwrap();
        assert_eq!(sum.state(), State::Resolved(42));
        assert_eq!(doubled.state(), State::Resolved(84));
    }

    #[test]
    fn both_styles_see_the_same_value_at_the_same_time() {
        let scheduler = Scheduler::new();
        let deferred = resolve_later(&scheduler, 1000, 5);
        let seen = log();

        let (cb_log, cb_clock) = (Arc::clone(&seen), scheduler.clone());
        deferred.then(move |v| push(&cb_log, format!("callback {v} @{:?}", cb_clock.now())));

        let (task_log, task_clock, awaited) = (Arc::clone(&seen), scheduler.clone(), deferred.clone());
        scheduler.spawn(async move {
            let v = awaited.await.unwrap();
            push(&task_log, format!("await {v} @{:?}", task_clock.now()));
        });

        scheduler.run().unwrap();
        assert_eq!(lines(&seen), ["callback 5 @1s", "await 5 @1s"]);
    }

    #[test]
    fn unhandled_rejection_does_not_stop_other_work() {
        let scheduler = Scheduler::new();
        let seen = log();

        let rejected = Deferred::<u32, String>::new(&scheduler, |settler| {
            scheduler.after(Duration::from_millis(10), move || {
                settler.reject("boom".to_owned()).unwrap();
            });
        });
        let ignored = rejected.then(|v| v + 1);

        let (task_log, clock) = (Arc::clone(&seen), scheduler.clone());
        scheduler.spawn(async move {
            push(&task_log, "task started");
            let _ = sleep(&clock, Duration::from_millis(20)).await;
            push(&task_log, format!("task resumed at {}", clock.now().as_millis()));
        });
        let timer_log = Arc::clone(&seen);
        scheduler.after(Duration::from_millis(30), move || push(&timer_log, "timer fired"));

        scheduler.run().unwrap();
        assert_eq!(
            lines(&seen),
            ["task started", "task resumed at 20", "timer fired"]
        );
        assert_eq!(ignored.state(), State::Rejected("boom".to_owned()));
        let unhandled = scheduler.unhandled_rejections();
        assert_eq!(unhandled.len(), 1);
        assert_eq!(unhandled[0].at, Duration::from_millis(10));
    }

    #[derive(Clone)]
    struct Counted(Arc<AtomicUsize>);

    impl Drop for Counted {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn abandoned_scheduler_frees_pending_work() {
        let drops = Arc::new(AtomicUsize::new(0));
        let scheduler = Scheduler::builder().max_ticks(0).build();
        let deferred = resolve_after::<_, String>(
            &scheduler,
            Duration::from_millis(10),
            Counted(Arc::clone(&drops)),
        );
        deferred.then(|_| ());

        let (waiting, held) = (deferred.clone(), Counted(Arc::clone(&drops)));
        scheduler.spawn(async move {
            let _held = held;
            let _ = waiting.await;
        });

        assert_eq!(
            scheduler.run(),
            Err(SchedulerError::TickLimitExceeded { ticks: 0 })
        );
        assert_eq!(drops.load(Ordering::SeqCst), 0);

        drop(scheduler);
        // the timer's value and the task waiting on it
        assert_eq!(drops.load(Ordering::SeqCst), 2);
        assert!(deferred.is_pending());
    }

    #[test]
    fn dropping_an_unfinished_await_releases_its_waker() {
        let scheduler = Scheduler::new();
        let (deferred, settler) = Deferred::<u32, String>::pending(&scheduler);

        assert_eq!(block_on(poll_once(deferred.value())), None);
        assert!(lock(&deferred.inner).wakers.iter().all(Option::is_none));

        settler.resolve(1).unwrap();
        assert_eq!(block_on(deferred.value()), Ok(1));
    }
}
