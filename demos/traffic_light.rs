//! Traffic Light
//!
//! A timed signal controller: each colour phase parks, schedules a scoped
//! timer, and lets the timer advance the machine. Also prints the Mermaid
//! diagram for the declared phase graph.
//!
//! Run with: cargo run --example traffic_light

use futures_util::future::BoxFuture;
use phasic::machine::context::{PhaseContext, PhaseResult};
use phasic::machine::PhaseMachine;
use phasic::phase_enum;
use phasic::registry::{PhaseOptions, PhaseRegistry};
use phasic::{flowchart, Phase};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

phase_enum! {
    enum LightPhase {
        Init,
        Green,
        Yellow,
        Red,
        Off,
        Error,
    }
    init: Init
    error: Error
}

struct Intersection {
    cycles_remaining: u32,
    tick: Arc<Notify>,
}

fn init(_cx: PhaseContext<'_, LightPhase, Intersection>) -> BoxFuture<'_, PhaseResult<LightPhase>> {
    Box::pin(async move {
        println!("Controller powering on");
        Ok(Some(LightPhase::Green))
    })
}

/// Hold the colour for `hold`, using a scoped timer as the clock. The timer
/// is cancelled automatically if the phase is torn down early.
fn hold_then(
    mut cx: PhaseContext<'_, LightPhase, Intersection>,
    hold: Duration,
    next: LightPhase,
) -> BoxFuture<'_, PhaseResult<LightPhase>> {
    Box::pin(async move {
        println!("{}", cx.phase.name().to_uppercase());

        let tick = Arc::clone(&cx.context.tick);
        cx.set_timeout(hold, move || tick.notify_one());
        cx.context.tick.notified().await;

        Ok(Some(next))
    })
}

fn green(cx: PhaseContext<'_, LightPhase, Intersection>) -> BoxFuture<'_, PhaseResult<LightPhase>> {
    hold_then(cx, Duration::from_millis(400), LightPhase::Yellow)
}

fn yellow(cx: PhaseContext<'_, LightPhase, Intersection>) -> BoxFuture<'_, PhaseResult<LightPhase>> {
    hold_then(cx, Duration::from_millis(150), LightPhase::Red)
}

fn red(cx: PhaseContext<'_, LightPhase, Intersection>) -> BoxFuture<'_, PhaseResult<LightPhase>> {
    Box::pin(async move {
        if cx.context.cycles_remaining == 0 {
            return Ok(Some(LightPhase::Off));
        }
        cx.context.cycles_remaining -= 1;
        hold_then(cx, Duration::from_millis(400), LightPhase::Green).await
    })
}

fn off(_cx: PhaseContext<'_, LightPhase, Intersection>) -> BoxFuture<'_, PhaseResult<LightPhase>> {
    Box::pin(async move {
        println!("Controller shut down");
        Ok(None)
    })
}

fn fault(_cx: PhaseContext<'_, LightPhase, Intersection>) -> BoxFuture<'_, PhaseResult<LightPhase>> {
    Box::pin(async move {
        println!("Fault: flashing red");
        Ok(Some(LightPhase::Off))
    })
}

fn registry() -> PhaseRegistry<LightPhase, Intersection> {
    let mut registry = PhaseRegistry::new();
    registry
        .register(
            LightPhase::Init,
            PhaseOptions::default(),
            [LightPhase::Green],
            init,
        )
        .unwrap();
    registry
        .register(
            LightPhase::Green,
            PhaseOptions::default(),
            [LightPhase::Yellow],
            green,
        )
        .unwrap();
    registry
        .register(
            LightPhase::Yellow,
            PhaseOptions::default(),
            [LightPhase::Red],
            yellow,
        )
        .unwrap();
    registry
        .register(
            LightPhase::Red,
            PhaseOptions::default(),
            [LightPhase::Green, LightPhase::Off],
            red,
        )
        .unwrap();
    registry
        .register(LightPhase::Off, PhaseOptions::default(), [], off)
        .unwrap();
    registry
        .register(
            LightPhase::Error,
            PhaseOptions::default(),
            [LightPhase::Off],
            fault,
        )
        .unwrap();
    registry
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let registry = registry();
    println!("{}", flowchart::mermaid(&registry));

    let context = Intersection {
        cycles_remaining: 2,
        tick: Arc::new(Notify::new()),
    };

    let machine = PhaseMachine::builder(registry, context)
        .on_error(|err| eprintln!("controller fault: {err}"))
        .build()
        .expect("reserved phases are registered");

    machine.start().await.expect("controller starts");

    assert_eq!(machine.current_phase(), Some(LightPhase::Off));
}
