//! Mermaid diagram export over registry edges.
//!
//! A pure function over registry enumeration: one `source --> target` line
//! per declared edge, prefixed by the `stateDiagram-v2` header. Rendering
//! is the host's concern; this module has no drawing dependencies.

use crate::core::Phase;
use crate::registry::PhaseRegistry;
use std::fmt::Write;

/// Generate a Mermaid `stateDiagram-v2` string from a registry.
///
/// Edges appear in registration order, then declaration order within each
/// phase, so output is deterministic.
///
/// # Example
///
/// ```rust
/// use phasic::flowchart;
/// use phasic::machine::context::{PhaseContext, PhaseResult};
/// use phasic::registry::{PhaseOptions, PhaseRegistry};
/// use phasic::phase_enum;
/// use futures_util::future::BoxFuture;
///
/// phase_enum! {
///     enum Phase {
///         Init,
///         Error,
///     }
///     init: Init
///     error: Error
/// }
///
/// fn parked(_cx: PhaseContext<'_, Phase, ()>) -> BoxFuture<'_, PhaseResult<Phase>> {
///     Box::pin(async move { Ok(None) })
/// }
///
/// let mut registry = PhaseRegistry::new();
/// registry.register(Phase::Init, PhaseOptions::default(), [Phase::Error], parked).unwrap();
/// registry.register(Phase::Error, PhaseOptions::default(), [Phase::Init], parked).unwrap();
///
/// let diagram = flowchart::mermaid(&registry);
/// assert_eq!(diagram, "stateDiagram-v2\n    Init --> Error\n    Error --> Init\n");
/// ```
pub fn mermaid<P: Phase, C>(registry: &PhaseRegistry<P, C>) -> String {
    let mut diagram = String::from("stateDiagram-v2\n");

    for phase in registry.phases() {
        for next in registry.next_phases(phase).unwrap_or(&[]) {
            // String formatting into a String cannot fail.
            let _ = writeln!(diagram, "    {} --> {}", phase.name(), next.name());
        }
    }

    diagram
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::context::{PhaseContext, PhaseResult};
    use crate::phase_enum;
    use crate::registry::PhaseOptions;
    use futures_util::future::BoxFuture;

    phase_enum! {
        enum RingPhase {
            A,
            B,
            C,
            Init,
            Error,
        }
        init: Init
        error: Error
    }

    fn noop(_cx: PhaseContext<'_, RingPhase, ()>) -> BoxFuture<'_, PhaseResult<RingPhase>> {
        Box::pin(async move { Ok(None) })
    }

    #[test]
    fn exports_exactly_the_declared_edges() {
        let mut registry: PhaseRegistry<RingPhase, ()> = PhaseRegistry::new();
        registry
            .register(RingPhase::A, PhaseOptions::default(), [RingPhase::B], noop)
            .unwrap();
        registry
            .register(RingPhase::B, PhaseOptions::default(), [RingPhase::C], noop)
            .unwrap();
        registry
            .register(RingPhase::C, PhaseOptions::default(), [RingPhase::A], noop)
            .unwrap();

        let diagram = mermaid(&registry);
        let lines: Vec<&str> = diagram.lines().collect();

        assert_eq!(
            lines,
            vec![
                "stateDiagram-v2",
                "    A --> B",
                "    B --> C",
                "    C --> A",
            ]
        );
    }

    #[test]
    fn empty_registry_exports_header_only() {
        let registry: PhaseRegistry<RingPhase, ()> = PhaseRegistry::new();
        assert_eq!(mermaid(&registry), "stateDiagram-v2\n");
    }

    #[test]
    fn terminal_phases_contribute_no_edges() {
        let mut registry: PhaseRegistry<RingPhase, ()> = PhaseRegistry::new();
        registry
            .register(RingPhase::A, PhaseOptions::default(), [RingPhase::B], noop)
            .unwrap();
        registry
            .register(RingPhase::B, PhaseOptions::default(), [], noop)
            .unwrap();

        let diagram = mermaid(&registry);
        assert_eq!(diagram, "stateDiagram-v2\n    A --> B\n");
    }
}
