//! Registration errors for the phase registry.

use thiserror::Error;

/// Errors raised while registering phases.
///
/// Registration errors are always fatal: a registry that rejected a
/// registration is in the same state as before the call, and the caller is
/// expected to fix the phase graph rather than recover at runtime.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("phase '{0}' declares itself as a next phase")]
    SelfTransition(String),

    #[error("phase '{0}' is already registered")]
    DuplicatePhase(String),
}
