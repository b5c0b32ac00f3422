//! Handler context bundle and handler type aliases.
//!
//! Every phase handler receives a [`PhaseContext`]: mutable access to the
//! machine's context object, the identifier of the phase being executed,
//! and the scoped resource helpers (`add_disposer`, `set_timeout`). The
//! handler returns the next phase, or `None` to leave the machine parked in
//! the current phase.

use crate::core::Phase;
use crate::machine::scope::{PhaseScope, TimerId};
use futures_util::future::BoxFuture;
use std::sync::Arc;
use std::time::Duration;

/// Boxed error type handlers may fail with.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result of one handler invocation: the next phase, terminal (`None`), or
/// an error routed to the machine's error router.
pub type PhaseResult<P> = Result<Option<P>, BoxError>;

/// Shared handler function stored in the registry.
pub type PhaseHandler<P, C> =
    Arc<dyn for<'a> Fn(PhaseContext<'a, P, C>) -> BoxFuture<'a, PhaseResult<P>> + Send + Sync>;

/// Context bundle passed to each phase handler.
///
/// # Example
///
/// ```rust
/// use phasic::machine::context::{PhaseContext, PhaseResult};
/// use phasic::phase_enum;
/// use futures_util::future::BoxFuture;
/// use std::time::Duration;
///
/// phase_enum! {
///     enum LoaderPhase {
///         Init,
///         Loading,
///         Ready,
///         Error,
///     }
///     init: Init
///     error: Error
/// }
///
/// struct Loader {
///     attempts: u32,
/// }
///
/// fn loading(mut cx: PhaseContext<'_, LoaderPhase, Loader>) -> BoxFuture<'_, PhaseResult<LoaderPhase>> {
///     Box::pin(async move {
///         cx.context.attempts += 1;
///         cx.add_disposer(|| println!("connection closed"));
///         cx.set_timeout(Duration::from_secs(30), || println!("load timed out"));
///         Ok(Some(LoaderPhase::Ready))
///     })
/// }
/// ```
pub struct PhaseContext<'a, P: Phase, C> {
    /// The machine's context object. The machine does not interpret it;
    /// handlers read and write it freely.
    pub context: &'a mut C,
    /// The phase whose handler is running.
    pub phase: P,
    scope: &'a mut PhaseScope,
}

impl<'a, P: Phase, C> PhaseContext<'a, P, C> {
    pub(crate) fn new(phase: P, context: &'a mut C, scope: &'a mut PhaseScope) -> Self {
        Self {
            context,
            phase,
            scope,
        }
    }

    /// Register a cleanup callback scoped to the current phase.
    ///
    /// Disposers run in reverse-registration order when the phase exits,
    /// before the next phase's handler is invoked.
    pub fn add_disposer(&mut self, disposer: impl FnOnce() + Send + 'static) {
        self.scope.add_disposer(Box::new(disposer));
    }

    /// Schedule `handler` to run after `after`, scoped to the current phase.
    ///
    /// The timer is cancelled automatically when the phase exits; it can
    /// never fire after its owning phase has been torn down. Returns a
    /// cancellation handle for diagnostics.
    pub fn set_timeout(
        &mut self,
        after: Duration,
        handler: impl FnOnce() + Send + 'static,
    ) -> TimerId {
        self.scope.set_timeout(after, Box::new(handler))
    }
}
