//! Builder for constructing phase machines.

use crate::core::Phase;
use crate::machine::error::{BuildError, MachineError};
use crate::machine::PhaseMachine;
use crate::registry::PhaseRegistry;

type ErrorCallback = Box<dyn Fn(&MachineError) + Send + Sync>;

/// Builder for [`PhaseMachine`] instances.
///
/// Construction validates the registry: the reserved `init` and `error`
/// phases must be registered, and the configured initial phase must exist.
/// Validation failures are fatal and raised synchronously from `build()`.
///
/// # Example
///
/// ```rust
/// use phasic::machine::context::{PhaseContext, PhaseResult};
/// use phasic::machine::PhaseMachine;
/// use phasic::registry::{PhaseOptions, PhaseRegistry};
/// use phasic::phase_enum;
/// use futures_util::future::BoxFuture;
///
/// phase_enum! {
///     enum AppPhase {
///         Init,
///         Error,
///     }
///     init: Init
///     error: Error
/// }
///
/// fn parked(_cx: PhaseContext<'_, AppPhase, ()>) -> BoxFuture<'_, PhaseResult<AppPhase>> {
///     Box::pin(async move { Ok(None) })
/// }
///
/// let mut registry = PhaseRegistry::new();
/// registry.register(AppPhase::Init, PhaseOptions::default(), [], parked).unwrap();
/// registry.register(AppPhase::Error, PhaseOptions::default(), [AppPhase::Init], parked).unwrap();
///
/// let machine = PhaseMachine::builder(registry, ())
///     .on_error(|err| eprintln!("machine error: {err}"))
///     .build()
///     .unwrap();
/// assert!(!machine.is_running());
/// ```
pub struct PhaseMachineBuilder<P: Phase, C> {
    registry: PhaseRegistry<P, C>,
    context: C,
    initial: P,
    skip_mode: bool,
    error_handler: Option<ErrorCallback>,
}

impl<P: Phase, C> PhaseMachineBuilder<P, C> {
    /// Create a builder from a registry and a context object.
    pub fn new(registry: PhaseRegistry<P, C>, context: C) -> Self {
        Self {
            registry,
            context,
            initial: P::init(),
            skip_mode: false,
            error_handler: None,
        }
    }

    /// Override the initial phase (defaults to the reserved `init` phase).
    pub fn initial(mut self, phase: P) -> Self {
        self.initial = phase;
        self
    }

    /// Start with skip mode enabled.
    pub fn skip_mode(mut self, enabled: bool) -> Self {
        self.skip_mode = enabled;
        self
    }

    /// Set a callback invoked with every routed error, before the machine
    /// transitions into the reserved error phase.
    pub fn on_error(mut self, callback: impl Fn(&MachineError) + Send + Sync + 'static) -> Self {
        self.error_handler = Some(Box::new(callback));
        self
    }

    /// Validate the registry and build the machine.
    pub fn build(self) -> Result<PhaseMachine<P, C>, BuildError> {
        for reserved in [P::init(), P::error()] {
            if !self.registry.contains(&reserved) {
                return Err(BuildError::MissingReservedPhase(
                    reserved.name().to_string(),
                ));
            }
        }
        if !self.registry.contains(&self.initial) {
            return Err(BuildError::UnknownInitialPhase(
                self.initial.name().to_string(),
            ));
        }

        Ok(PhaseMachine::from_parts(
            self.registry,
            self.context,
            self.initial,
            self.skip_mode,
            self.error_handler,
        ))
    }
}
