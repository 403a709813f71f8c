//! The building blocks everything else runs on: a clock, a cooperative
//! scheduler, and timer-backed deferred values.

pub mod clock;
pub mod scheduler;
pub mod sleep;
