use core::time::Duration;

use thiserror::Error;

/// The producer of a [`Deferred`](crate::Deferred) rejected it.
///
/// This is the only failure a consumer ever observes. The payload is whatever
/// the producer passed to [`Settler::reject`](crate::Settler::reject).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("deferred value rejected: {0:?}")]
pub struct Rejection<E>(pub E);

impl<E> Rejection<E> {
    pub fn into_inner(self) -> E {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SettleError {
    #[error("deferred value was already settled")]
    AlreadySettled,
}

/// A rejection nobody observed before the ready queue drained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnhandledRejection {
    pub description: String,
    /// Logical instant at which the rejection was reported.
    pub at: Duration,
}
