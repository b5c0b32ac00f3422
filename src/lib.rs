//! Phasic: a declarative phase-driven state machine runtime.
//!
//! A machine is declared as a closed set of phases, each with a handler,
//! options and the set of phases it may transition to. The runtime drives
//! execution: it invokes the current phase's handler, interprets the
//! returned next-phase value, performs the transition and repeats — with
//! scoped cleanup (disposers and timers torn down on every phase exit),
//! lifecycle events, skip logic and cycle bounding.
//!
//! # Core Concepts
//!
//! - **Phase**: a named state, declared via the [`Phase`] trait (or the
//!   `phase_enum!` macro). Every machine carries the reserved `init` and
//!   `error` phases.
//! - **Registry**: explicit, up-front registration of `(phase, options,
//!   declared next phases, handler)` tuples, shared read-only by instances.
//! - **Machine**: the transition executor. Handler failures never escape
//!   it; they are logged, reported and routed into the `error` phase.
//! - **Scope**: disposers and timers registered by a handler live exactly
//!   as long as that phase is active.
//!
//! # Example
//!
//! ```rust
//! use phasic::machine::context::{PhaseContext, PhaseResult};
//! use phasic::machine::PhaseMachine;
//! use phasic::registry::{PhaseOptions, PhaseRegistry};
//! use phasic::phase_enum;
//! use futures_util::future::BoxFuture;
//!
//! phase_enum! {
//!     enum JobPhase {
//!         Init,
//!         Working,
//!         Done,
//!         Error,
//!     }
//!     init: Init
//!     error: Error
//! }
//!
//! struct Job {
//!     steps: u32,
//! }
//!
//! fn init(_cx: PhaseContext<'_, JobPhase, Job>) -> BoxFuture<'_, PhaseResult<JobPhase>> {
//!     Box::pin(async move { Ok(Some(JobPhase::Working)) })
//! }
//!
//! fn working(cx: PhaseContext<'_, JobPhase, Job>) -> BoxFuture<'_, PhaseResult<JobPhase>> {
//!     Box::pin(async move {
//!         cx.context.steps += 1;
//!         Ok(Some(JobPhase::Done))
//!     })
//! }
//!
//! fn done(_cx: PhaseContext<'_, JobPhase, Job>) -> BoxFuture<'_, PhaseResult<JobPhase>> {
//!     Box::pin(async move { Ok(None) })
//! }
//!
//! fn failed(_cx: PhaseContext<'_, JobPhase, Job>) -> BoxFuture<'_, PhaseResult<JobPhase>> {
//!     Box::pin(async move { Ok(None) })
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let mut registry = PhaseRegistry::new();
//! registry.register(JobPhase::Init, PhaseOptions::default(), [JobPhase::Working], init).unwrap();
//! registry.register(JobPhase::Working, PhaseOptions::default(), [JobPhase::Done], working).unwrap();
//! registry.register(JobPhase::Done, PhaseOptions::default(), [], done).unwrap();
//! registry.register(JobPhase::Error, PhaseOptions::default(), [JobPhase::Init], failed).unwrap();
//!
//! let machine = PhaseMachine::builder(registry, Job { steps: 0 }).build().unwrap();
//! machine.start().await.unwrap();
//!
//! assert_eq!(machine.current_phase(), Some(JobPhase::Done));
//! # }
//! ```

pub mod core;
pub mod flowchart;
pub mod machine;
pub mod registry;

// Re-export commonly used types
pub use crate::core::Phase;
pub use crate::machine::context::{BoxError, PhaseContext, PhaseResult};
pub use crate::machine::{
    BuildError, MachineError, PhaseMachine, PhaseMachineBuilder, PhaseStats, TimerId,
};
pub use crate::registry::{PhaseOptions, PhaseRegistry, RegistryError};
