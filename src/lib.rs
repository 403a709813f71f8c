//! A minimal promise, a cooperative scheduler to run it on, and the two ways
//! of consuming it: chaining callbacks, or suspending a task with `.await`.
//!
//! Start with [`deferred`] for the value itself and [`basics::scheduler`] for
//! how continuations and tasks get run. [`two_ways`] shows the same scenarios
//! written in both styles.

pub mod basics;
pub mod deferred;
pub mod error;
pub mod sink;
pub mod two_ways;

pub use basics::{
    clock::{Clock, SystemClock, VirtualClock},
    scheduler::{Scheduler, SchedulerBuilder, SchedulerError},
    sleep::{resolve_after, sleep},
};
pub use deferred::{Deferred, Settled, Settler, State};
pub use error::{Rejection, SettleError, UnhandledRejection};
pub use sink::{Line, Sink, Stdout, Transcript};
