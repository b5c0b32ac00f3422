//! Phase registry: per-machine mapping from phase identifier to handler
//! metadata.
//!
//! A registry is built once, up front, by explicit `register` calls — one
//! per phase, each naming the handler, its options and the set of phases it
//! may return. The registry is then handed to the machine builder and shared
//! read-only (via `Arc`) by every instance of that machine.
//!
//! Registration order is preserved so that registry enumeration (and the
//! flowchart export built on it) is deterministic.

pub mod error;

pub use error::RegistryError;

use crate::core::Phase;
use crate::machine::context::{PhaseContext, PhaseHandler, PhaseResult};
use futures_util::future::BoxFuture;
use std::collections::HashMap;
use std::sync::Arc;

/// Options controlling how a phase executes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PhaseOptions {
    /// Whether this phase's ceremony (enter/exit events, scope drain) may be
    /// elided when the machine's skip mode is enabled. The handler itself
    /// still runs exactly once.
    pub skippable: bool,
}

impl PhaseOptions {
    /// Options for a skippable phase.
    pub fn skippable() -> Self {
        Self { skippable: true }
    }
}

/// Metadata for one registered phase.
///
/// Created once at registration time and immutable thereafter.
pub struct PhaseMetadata<P: Phase, C> {
    /// The phase this metadata describes.
    pub phase: P,
    /// Execution options.
    pub options: PhaseOptions,
    /// The phases this phase's handler is allowed to return.
    pub declared_next: Vec<P>,
    /// The handler invoked when the phase becomes active.
    pub handler: PhaseHandler<P, C>,
}

/// Registry of phases for one machine type.
///
/// # Example
///
/// ```rust
/// use phasic::machine::context::{PhaseContext, PhaseResult};
/// use phasic::registry::{PhaseOptions, PhaseRegistry};
/// use phasic::phase_enum;
/// use futures_util::future::BoxFuture;
///
/// phase_enum! {
///     enum Ping {
///         Init,
///         Pong,
///         Error,
///     }
///     init: Init
///     error: Error
/// }
///
/// fn init(_cx: PhaseContext<'_, Ping, ()>) -> BoxFuture<'_, PhaseResult<Ping>> {
///     Box::pin(async move { Ok(Some(Ping::Pong)) })
/// }
///
/// fn pong(_cx: PhaseContext<'_, Ping, ()>) -> BoxFuture<'_, PhaseResult<Ping>> {
///     Box::pin(async move { Ok(None) })
/// }
///
/// fn err(_cx: PhaseContext<'_, Ping, ()>) -> BoxFuture<'_, PhaseResult<Ping>> {
///     Box::pin(async move { Ok(None) })
/// }
///
/// let mut registry = PhaseRegistry::new();
/// registry.register(Ping::Init, PhaseOptions::default(), [Ping::Pong], init).unwrap();
/// registry.register(Ping::Pong, PhaseOptions::default(), [], pong).unwrap();
/// registry.register(Ping::Error, PhaseOptions::default(), [Ping::Init], err).unwrap();
///
/// assert_eq!(registry.len(), 3);
/// assert_eq!(registry.next_phases(&Ping::Init), Some(&[Ping::Pong][..]));
/// ```
pub struct PhaseRegistry<P: Phase, C> {
    phases: HashMap<P, PhaseMetadata<P, C>>,
    order: Vec<P>,
}

impl<P: Phase, C> PhaseRegistry<P, C> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            phases: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Register a phase with its handler, options and declared next phases.
    ///
    /// Fails fast if the phase lists itself among its next phases (a phase
    /// returning itself would be a zero-progress loop) or if the phase is
    /// already registered.
    pub fn register<H, I>(
        &mut self,
        phase: P,
        options: PhaseOptions,
        declared_next: I,
        handler: H,
    ) -> Result<(), RegistryError>
    where
        I: IntoIterator<Item = P>,
        H: for<'a> Fn(PhaseContext<'a, P, C>) -> BoxFuture<'a, PhaseResult<P>>
            + Send
            + Sync
            + 'static,
    {
        let declared_next: Vec<P> = declared_next.into_iter().collect();

        if declared_next.contains(&phase) {
            return Err(RegistryError::SelfTransition(phase.name().to_string()));
        }
        if self.phases.contains_key(&phase) {
            return Err(RegistryError::DuplicatePhase(phase.name().to_string()));
        }

        self.order.push(phase.clone());
        self.phases.insert(
            phase.clone(),
            PhaseMetadata {
                phase,
                options,
                declared_next,
                handler: Arc::new(handler),
            },
        );
        Ok(())
    }

    /// Look up metadata for a phase.
    pub fn lookup(&self, phase: &P) -> Option<&PhaseMetadata<P, C>> {
        self.phases.get(phase)
    }

    /// Whether a phase is registered.
    pub fn contains(&self, phase: &P) -> bool {
        self.phases.contains_key(phase)
    }

    /// All registered phases, in registration order.
    pub fn phases(&self) -> impl Iterator<Item = &P> {
        self.order.iter()
    }

    /// The declared next phases for one phase, in declaration order.
    pub fn next_phases(&self, phase: &P) -> Option<&[P]> {
        self.phases.get(phase).map(|m| m.declared_next.as_slice())
    }

    /// Number of registered phases.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl<P: Phase, C> Default for PhaseRegistry<P, C> {
    fn default() -> Self {
        Self::new()
    }
}
