//! Machine construction and runtime errors.

use crate::machine::context::BoxError;
use thiserror::Error;

/// Construction-time errors. Always fatal and raised synchronously from
/// `build()` — never deferred to first use.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("reserved phase '{0}' is not registered")]
    MissingReservedPhase(String),

    #[error("initial phase '{0}' is not registered")]
    UnknownInitialPhase(String),
}

/// Runtime errors surfaced by the machine.
///
/// `UnknownPhase`, `TransitionInProgress` and `NotRunning` are returned
/// directly from the public API. `InvalidTransition` and `Handler` arise
/// inside a transition chain and are routed to the error router instead of
/// escaping the executor.
#[derive(Debug, Error)]
pub enum MachineError {
    #[error("phase '{0}' is not registered")]
    UnknownPhase(String),

    #[error("invalid transition from '{from}' to '{to}'. Allowed next phases are: {}", allowed.join(", "))]
    InvalidTransition {
        from: String,
        to: String,
        allowed: Vec<String>,
    },

    #[error("a transition is already in progress")]
    TransitionInProgress,

    #[error("cannot transition when the machine is not running")]
    NotRunning,

    #[error("error executing phase '{phase}': {source}")]
    Handler {
        phase: String,
        #[source]
        source: BoxError,
    },
}
