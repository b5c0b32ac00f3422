//! Slot Machine
//!
//! A small game loop built on the phase machine runtime: the machine walks
//! idle -> betting -> spinning -> evaluating -> paying until the player
//! runs out of credits or spins. The machine runs in skip mode, so the
//! skippable spinning phase executes without ceremony: no enter/exit
//! events, and it never shows up in the transition log.
//!
//! Run with: cargo run --example slot_machine

use futures_util::future::BoxFuture;
use phasic::machine::context::{PhaseContext, PhaseResult};
use phasic::machine::PhaseMachine;
use phasic::phase_enum;
use phasic::registry::{PhaseOptions, PhaseRegistry};
use phasic::Phase;
use std::time::Duration;

phase_enum! {
    enum SlotPhase {
        Init,
        Idle,
        Betting,
        Spinning,
        Evaluating,
        Paying,
        GameOver,
        Error,
    }
    init: Init
    error: Error
}

struct SlotContext {
    credits: i64,
    bet: i64,
    reels: [u8; 3],
    win: i64,
    spin_count: u32,
    max_spins: u32,
}

fn init(_cx: PhaseContext<'_, SlotPhase, SlotContext>) -> BoxFuture<'_, PhaseResult<SlotPhase>> {
    Box::pin(async move {
        println!("Welcome to the slot machine!");
        Ok(Some(SlotPhase::Idle))
    })
}

fn idle(cx: PhaseContext<'_, SlotPhase, SlotContext>) -> BoxFuture<'_, PhaseResult<SlotPhase>> {
    Box::pin(async move {
        if cx.context.credits <= 0 || cx.context.spin_count >= cx.context.max_spins {
            return Ok(Some(SlotPhase::GameOver));
        }
        Ok(Some(SlotPhase::Betting))
    })
}

fn betting(cx: PhaseContext<'_, SlotPhase, SlotContext>) -> BoxFuture<'_, PhaseResult<SlotPhase>> {
    Box::pin(async move {
        cx.context.bet = cx.context.credits.min(10);
        cx.context.credits -= cx.context.bet;
        println!("Bet placed: {} credits", cx.context.bet);
        Ok(Some(SlotPhase::Spinning))
    })
}

fn spinning(
    mut cx: PhaseContext<'_, SlotPhase, SlotContext>,
) -> BoxFuture<'_, PhaseResult<SlotPhase>> {
    Box::pin(async move {
        cx.add_disposer(|| println!("  (reel animation stopped)"));
        cx.context.spin_count += 1;

        // Deterministic "random" reels so the demo is reproducible.
        let seed = cx.context.spin_count.wrapping_mul(2_654_435_761);
        cx.context.reels = [
            (seed % 4) as u8,
            (seed / 4 % 4) as u8,
            (seed / 16 % 4) as u8,
        ];

        tokio::time::sleep(Duration::from_millis(100)).await;
        println!("Reels: {:?}", cx.context.reels);
        Ok(Some(SlotPhase::Evaluating))
    })
}

fn evaluating(
    cx: PhaseContext<'_, SlotPhase, SlotContext>,
) -> BoxFuture<'_, PhaseResult<SlotPhase>> {
    Box::pin(async move {
        let [a, b, c] = cx.context.reels;
        cx.context.win = if a == b && b == c {
            cx.context.bet * 10
        } else if a == b || b == c {
            cx.context.bet * 2
        } else {
            0
        };

        if cx.context.win > 0 {
            Ok(Some(SlotPhase::Paying))
        } else {
            println!("No win this time");
            Ok(Some(SlotPhase::Idle))
        }
    })
}

fn paying(cx: PhaseContext<'_, SlotPhase, SlotContext>) -> BoxFuture<'_, PhaseResult<SlotPhase>> {
    Box::pin(async move {
        cx.context.credits += cx.context.win;
        println!("You won {} credits!", cx.context.win);
        Ok(Some(SlotPhase::Idle))
    })
}

fn game_over(cx: PhaseContext<'_, SlotPhase, SlotContext>) -> BoxFuture<'_, PhaseResult<SlotPhase>> {
    Box::pin(async move {
        println!(
            "Game over after {} spins with {} credits left",
            cx.context.spin_count, cx.context.credits
        );
        Ok(None)
    })
}

fn on_error(_cx: PhaseContext<'_, SlotPhase, SlotContext>) -> BoxFuture<'_, PhaseResult<SlotPhase>> {
    Box::pin(async move {
        println!("Something went wrong; returning to the lobby");
        Ok(None)
    })
}

fn registry() -> PhaseRegistry<SlotPhase, SlotContext> {
    let mut registry = PhaseRegistry::new();
    registry
        .register(
            SlotPhase::Init,
            PhaseOptions::default(),
            [SlotPhase::Idle],
            init,
        )
        .unwrap();
    registry
        .register(
            SlotPhase::Idle,
            PhaseOptions::default(),
            [SlotPhase::Betting, SlotPhase::GameOver],
            idle,
        )
        .unwrap();
    registry
        .register(
            SlotPhase::Betting,
            PhaseOptions::default(),
            [SlotPhase::Spinning],
            betting,
        )
        .unwrap();
    registry
        .register(
            SlotPhase::Spinning,
            PhaseOptions::skippable(),
            [SlotPhase::Evaluating],
            spinning,
        )
        .unwrap();
    registry
        .register(
            SlotPhase::Evaluating,
            PhaseOptions::default(),
            [SlotPhase::Paying, SlotPhase::Idle],
            evaluating,
        )
        .unwrap();
    registry
        .register(
            SlotPhase::Paying,
            PhaseOptions::default(),
            [SlotPhase::Idle],
            paying,
        )
        .unwrap();
    registry
        .register(SlotPhase::GameOver, PhaseOptions::default(), [], game_over)
        .unwrap();
    registry
        .register(
            SlotPhase::Error,
            PhaseOptions::default(),
            [SlotPhase::Init],
            on_error,
        )
        .unwrap();
    registry
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let context = SlotContext {
        credits: 100,
        bet: 0,
        reels: [0; 3],
        win: 0,
        spin_count: 0,
        max_spins: 5,
    };

    let machine = PhaseMachine::builder(registry(), context)
        .skip_mode(true)
        .on_error(|err| eprintln!("machine error: {err}"))
        .build()
        .expect("reserved phases are registered");

    machine.on_transition(|from, to, _| {
        println!("  [{} -> {}]", from.name(), to.name());
    });

    machine.start().await.expect("machine starts");

    println!(
        "Final phase: {:?}",
        machine.current_phase().map(|p| p.name().to_string())
    );
}
