use core::{convert::Infallible, time::Duration};

use crate::{basics::scheduler::Scheduler, deferred::Deferred};

pub const DELAY: Duration = Duration::from_millis(1000);

/// Resolves with `"Success!"` one second from now.
pub fn my_first_promise(scheduler: &Scheduler) -> Deferred<String, Infallible> {
    Deferred::new(scheduler, |settler| {
        // setting the value from a timer simulates async work finishing
        scheduler.after(DELAY, move || {
            let _ = settler.resolve("Success!".to_owned());
        });
    })
}

pub mod callback {
    use std::sync::Arc;

    use super::my_first_promise;
    use crate::{basics::scheduler::Scheduler, sink::Sink};

    pub fn run(scheduler: &Scheduler, sink: Arc<dyn Sink>) {
        my_first_promise(scheduler).then(move |value| sink.line(&format!("Yay! {value}")));
    }
}

pub mod sequential {
    use std::sync::Arc;

    use super::my_first_promise;
    use crate::{basics::scheduler::Scheduler, error::Rejection, sink::Sink};

    pub fn run(scheduler: &Scheduler, sink: Arc<dyn Sink>) {
        let promise = my_first_promise(scheduler);
        scheduler.spawn(async move {
            match promise.await {
                Ok(value) => sink.line(&format!("Yay! {value}")),
                Err(Rejection(never)) => match never {},
            }
        });
    }
}
