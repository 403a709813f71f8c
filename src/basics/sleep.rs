use core::{convert::Infallible, fmt, time::Duration};

use crate::{basics::scheduler::Scheduler, deferred::Deferred};

/// A deferred value which resolves with `value` once `duration` has passed on
/// the scheduler's clock.
///
/// This is the "resolve after timeout" pattern: the timer stands in for any
/// asynchronous I/O whose completion settles the value.
pub fn resolve_after<T, E>(scheduler: &Scheduler, duration: Duration, value: T) -> Deferred<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + fmt::Debug + Send + 'static,
{
    Deferred::new(scheduler, |settler| {
        scheduler.after(duration, move || {
            // the timer is the only thing holding this settler
            let _ = settler.resolve(value);
        });
    })
}

/// Resolves once `duration` has passed. Await it to pause a task.
pub fn sleep(scheduler: &Scheduler, duration: Duration) -> Deferred<(), Infallible> {
    resolve_after(scheduler, duration, ())
}
