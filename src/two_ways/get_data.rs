use core::{convert::Infallible, time::Duration};
use std::sync::Arc;

use serde::Serialize;

use crate::{basics::scheduler::Scheduler, deferred::Deferred, sink::Sink};

pub const FETCH_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Person {
    pub name: String,
}

impl Person {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Pretends to download a list of people.
pub fn get_data(scheduler: &Scheduler, sink: Arc<dyn Sink>) -> Deferred<Vec<Person>, Infallible> {
    sink.line("2. Getting data from internet, please wait.");
    Deferred::new(scheduler, |settler| {
        scheduler.after(FETCH_DELAY, move || {
            sink.line("3. Returning data from internet.");
            let _ = settler.resolve(vec![Person::new("Avi"), Person::new("Grace")]);
        });
    })
}

fn report(sink: &dyn Sink, data: &[Person]) {
    let json = serde_json::to_string(data).unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to serialize people");
        String::from("<unserializable>")
    });
    sink.line(&format!("4. Data is currently {json}"));
    sink.line("5. Script Ended");
}

pub mod callback {
    use std::sync::Arc;

    use super::{get_data, report};
    use crate::{basics::scheduler::Scheduler, sink::Sink};

    /// Everything depending on the data has to live inside the continuation.
    pub fn run(scheduler: &Scheduler, sink: Arc<dyn Sink>) {
        sink.line("1. Starting Script");
        get_data(scheduler, Arc::clone(&sink)).then(move |data| report(sink.as_ref(), &data));
    }
}

pub mod sequential {
    use std::sync::Arc;

    use super::{get_data, report};
    use crate::{basics::scheduler::Scheduler, error::Rejection, sink::Sink};

    pub fn run(scheduler: &Scheduler, sink: Arc<dyn Sink>) {
        let scheduler_handle = scheduler.clone();
        scheduler.spawn(async move {
            sink.line("1. Starting Script");
            let data = match get_data(&scheduler_handle, Arc::clone(&sink)).await {
                Ok(data) => data,
                Err(Rejection(never)) => match never {},
            };
            report(sink.as_ref(), &data);
        });
    }
}
