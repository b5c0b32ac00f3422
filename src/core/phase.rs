//! Core Phase trait for phase machine identifiers.
//!
//! Every machine declares its phases as a closed enum implementing this
//! trait. The two reserved phases (`init` and `error`) are surfaced as
//! trait constructors so the runtime can start and route failures without
//! string lookups.

use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

/// Trait for phase identifiers.
///
/// Phases are plain enum values that name the states of one machine. The
/// runtime only ever inspects them through this trait; all business logic
/// lives in the handlers registered for each phase.
///
/// # Required Traits
///
/// - `Clone` + `Eq` + `Hash`: phases key the registry and the visited set
/// - `Debug`: phases must be debuggable for diagnostics
/// - `Serialize` + `Deserialize`: phases must be serializable so hosts can
///   snapshot or report the current phase
///
/// # Reserved Phases
///
/// Every machine must register handlers for [`Phase::init`] (the entry
/// phase) and [`Phase::error`] (the failure sink). Construction fails if
/// either is missing from the registry.
///
/// # Example
///
/// ```rust
/// use phasic::core::Phase;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
/// enum GamePhase {
///     Init,
///     Playing,
///     GameOver,
///     Error,
/// }
///
/// impl Phase for GamePhase {
///     fn name(&self) -> &str {
///         match self {
///             Self::Init => "Init",
///             Self::Playing => "Playing",
///             Self::GameOver => "GameOver",
///             Self::Error => "Error",
///         }
///     }
///
///     fn init() -> Self {
///         Self::Init
///     }
///
///     fn error() -> Self {
///         Self::Error
///     }
/// }
/// ```
pub trait Phase:
    Clone + Eq + Hash + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Get the phase's name for display/logging.
    ///
    /// Returns a static string reference for zero-cost naming.
    fn name(&self) -> &str;

    /// The reserved entry phase. Machines start here unless the builder
    /// overrides the initial phase.
    fn init() -> Self;

    /// The reserved failure-sink phase. The error router transitions the
    /// machine here when a handler fails.
    fn error() -> Self;
}
