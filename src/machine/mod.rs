//! The phase machine proper: the transition executor.
//!
//! A [`PhaseMachine`] drives execution through the phases of its registry:
//! it invokes the current phase's handler, interprets the returned
//! next-phase value, performs the transition (exit events, scope drain,
//! phase set, enter events, transition events — always in that order) and
//! repeats until a handler returns `None` or an external caller intervenes.
//!
//! Handler failures never escape the executor: they are wrapped, logged,
//! handed to the configured error callback, and the machine transitions
//! into the reserved `error` phase. From there the error handler decides
//! where to go next — typically back to `init`.

pub mod builder;
pub mod context;
pub mod error;

mod events;
mod scope;

pub use builder::PhaseMachineBuilder;
pub use error::{BuildError, MachineError};
pub use scope::{PhaseStats, TimerId};

use crate::core::Phase;
use crate::machine::context::PhaseContext;
use crate::machine::events::EventHandlers;
use crate::machine::scope::PhaseScope;
use crate::registry::PhaseRegistry;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use tracing::{debug, warn};

/// Ceiling on consecutive automatic transitions within one externally
/// triggered call. Exceeding it logs a warning and halts the chain instead
/// of erroring, so a buggy phase graph cannot recurse without bound.
pub const MAX_AUTO_TRANSITIONS: usize = 100;

type ErrorCallback = Box<dyn Fn(&MachineError) + Send + Sync>;

struct Shared<P: Phase> {
    current: RwLock<Option<P>>,
    running: AtomicBool,
    skip: AtomicBool,
    stats: Mutex<HashMap<P, PhaseStats>>,
}

struct ExecState<C> {
    context: C,
    scope: PhaseScope,
}

/// A running phase machine instance.
///
/// Built from a [`PhaseRegistry`] and a context object via
/// [`PhaseMachine::builder`]. The machine owns its context; handlers access
/// it through the [`PhaseContext`] bundle. Hosts that need to observe the
/// context from outside should store a shared handle (e.g. `Arc<Mutex<..>>`)
/// inside it.
///
/// All methods take `&self`; the machine is safe to share behind an `Arc`.
/// Only one transition chain may be in flight at a time — concurrent
/// attempts are rejected with [`MachineError::TransitionInProgress`].
pub struct PhaseMachine<P: Phase, C> {
    registry: Arc<PhaseRegistry<P, C>>,
    initial: P,
    shared: Shared<P>,
    exec: tokio::sync::Mutex<ExecState<C>>,
    events: EventHandlers<P, C>,
    error_handler: Option<ErrorCallback>,
}

impl<P: Phase, C> PhaseMachine<P, C> {
    /// Start building a machine from a registry and a context object.
    pub fn builder(registry: PhaseRegistry<P, C>, context: C) -> PhaseMachineBuilder<P, C> {
        PhaseMachineBuilder::new(registry, context)
    }

    pub(crate) fn from_parts(
        registry: PhaseRegistry<P, C>,
        context: C,
        initial: P,
        skip: bool,
        error_handler: Option<ErrorCallback>,
    ) -> Self {
        Self {
            registry: Arc::new(registry),
            initial,
            shared: Shared {
                current: RwLock::new(None),
                running: AtomicBool::new(false),
                skip: AtomicBool::new(skip),
                stats: Mutex::new(HashMap::new()),
            },
            exec: tokio::sync::Mutex::new(ExecState {
                context,
                scope: PhaseScope::new(),
            }),
            events: EventHandlers::new(),
            error_handler,
        }
    }

    /// Start the machine at its configured initial phase.
    ///
    /// A no-op (with a debug log) if the machine is already running.
    pub async fn start(&self) -> Result<(), MachineError> {
        let mut exec = self
            .exec
            .try_lock()
            .map_err(|_| MachineError::TransitionInProgress)?;

        if self.shared.running.swap(true, Ordering::SeqCst) {
            debug!("phase machine is already running");
            return Ok(());
        }

        debug!(phase = %self.initial.name(), "starting phase machine");
        self.run_chain(&mut exec, self.initial.clone()).await;
        Ok(())
    }

    /// Force a jump to `phase` and run the resulting transition chain.
    ///
    /// Unlike automatic transitions, a forced jump is not validated against
    /// any declared-next-phase set — only against registry membership.
    pub async fn transition(&self, phase: P) -> Result<(), MachineError> {
        if !self.is_running() {
            return Err(MachineError::NotRunning);
        }
        if !self.registry.contains(&phase) {
            return Err(MachineError::UnknownPhase(phase.name().to_string()));
        }

        let mut exec = self
            .exec
            .try_lock()
            .map_err(|_| MachineError::TransitionInProgress)?;

        self.run_chain(&mut exec, phase).await;
        Ok(())
    }

    /// Stop the machine: drain the active phase's scope, clear the current
    /// phase and flip the running flag off.
    pub fn stop(&self) -> Result<(), MachineError> {
        let mut exec = self
            .exec
            .try_lock()
            .map_err(|_| MachineError::TransitionInProgress)?;

        if !self.shared.running.swap(false, Ordering::SeqCst) {
            return Ok(());
        }

        exec.scope.drain();
        self.set_current(None);
        debug!("phase machine stopped");
        Ok(())
    }

    /// Stop and, if the machine was running, start again from the initial
    /// phase. No disposers or timers survive the reset.
    pub async fn reset(&self) -> Result<(), MachineError> {
        let was_running = self.is_running();
        self.stop()?;
        if was_running {
            self.start().await?;
        }
        Ok(())
    }

    /// The currently active phase, or `None` when stopped.
    pub fn current_phase(&self) -> Option<P> {
        self.shared
            .current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Whether the machine is running.
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    /// Whether skip mode is enabled.
    pub fn skip_mode(&self) -> bool {
        self.shared.skip.load(Ordering::SeqCst)
    }

    /// Enable or disable skip mode. While enabled, skippable phases run
    /// their handler without ceremony (no events, no phase set).
    pub fn set_skip_mode(&self, enabled: bool) {
        self.shared.skip.store(enabled, Ordering::SeqCst);
    }

    /// Runtime statistics for the most recent activation of `phase`.
    pub fn stats(&self, phase: &P) -> Option<PhaseStats> {
        self.shared
            .stats
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(phase)
            .cloned()
    }

    /// The registry this machine executes. Supports enumeration for
    /// diagram export and host introspection.
    pub fn registry(&self) -> &PhaseRegistry<P, C> {
        &self.registry
    }

    /// Observe entry into `phase`. Observers fire synchronously, in
    /// registration order, after the phase becomes current.
    pub fn on_enter(&self, phase: P, observer: impl Fn(&C) + Send + Sync + 'static) {
        self.events.on_enter(phase, observer);
    }

    /// Observe exit from `phase`. Observers fire before the phase's scope
    /// is drained.
    pub fn on_exit(&self, phase: P, observer: impl Fn(&C) + Send + Sync + 'static) {
        self.events.on_exit(phase, observer);
    }

    /// Observe every transition as `(from, to, context)`. Fires after the
    /// enter observers of the new phase. Not fired for the first entry
    /// after `start()` (there is no previous phase).
    pub fn on_transition(&self, observer: impl Fn(&P, &P, &C) + Send + Sync + 'static) {
        self.events.on_transition(observer);
    }

    /// Execute the transition chain beginning at `first`.
    ///
    /// Holds the execution lock for the whole chain: handlers never overlap
    /// and reentrant transitions are rejected at the `try_lock` above.
    async fn run_chain(&self, exec: &mut ExecState<C>, first: P) {
        let mut target = first;
        let mut hops = 0usize;
        let mut visited: HashSet<P> = HashSet::new();
        visited.insert(target.clone());

        loop {
            let meta = match self.registry.lookup(&target) {
                Some(meta) => meta,
                None => {
                    let err = MachineError::UnknownPhase(target.name().to_string());
                    match self.route_error(err, &target) {
                        Some(next) => {
                            target = next;
                            continue;
                        }
                        None => break,
                    }
                }
            };

            let skipping = meta.options.skippable && self.skip_mode();
            if skipping {
                debug!(phase = %target.name(), "skip mode: running handler without ceremony");
            } else {
                let prev = self.current_phase();
                if let Some(prev) = &prev {
                    self.events.fire_exit(prev, &exec.context);
                }
                exec.scope.drain();
                exec.scope.begin();
                self.set_current(Some(target.clone()));
                debug!(phase = %target.name(), "entering phase");
                self.events.fire_enter(&target, &exec.context);
                if let Some(prev) = &prev {
                    self.events.fire_transition(prev, &target, &exec.context);
                }
            }

            let handler = Arc::clone(&meta.handler);
            let result = {
                let ExecState { context, scope } = exec;
                handler(PhaseContext::new(target.clone(), context, scope)).await
            };

            if !skipping {
                self.shared
                    .stats
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .insert(target.clone(), exec.scope.stats());
            }

            match result {
                Ok(Some(next)) => {
                    if !meta.declared_next.contains(&next) {
                        let err = MachineError::InvalidTransition {
                            from: target.name().to_string(),
                            to: next.name().to_string(),
                            allowed: meta
                                .declared_next
                                .iter()
                                .map(|p| p.name().to_string())
                                .collect(),
                        };
                        match self.route_error(err, &target) {
                            Some(next) => {
                                target = next;
                                continue;
                            }
                            None => break,
                        }
                    }

                    hops += 1;
                    if hops >= MAX_AUTO_TRANSITIONS {
                        warn!(
                            limit = MAX_AUTO_TRANSITIONS,
                            "automatic transition ceiling reached; halting chain"
                        );
                        break;
                    }
                    if !visited.insert(next.clone()) {
                        warn!(phase = %next.name(), "phase revisited within one transition chain");
                    }

                    debug!(from = %target.name(), to = %next.name(), "transitioning");
                    target = next;
                }
                Ok(None) => break,
                Err(source) => {
                    let err = MachineError::Handler {
                        phase: target.name().to_string(),
                        source,
                    };
                    match self.route_error(err, &target) {
                        Some(next) => {
                            target = next;
                            continue;
                        }
                        None => break,
                    }
                }
            }
        }
    }

    /// Error router: log, invoke the configured callback, then direct the
    /// chain into the reserved error phase. Returns `None` when the failure
    /// happened in the error phase itself, halting the chain instead of
    /// ping-ponging.
    fn route_error(&self, err: MachineError, at: &P) -> Option<P> {
        tracing::error!(error = %err, "phase machine error");
        if let Some(callback) = &self.error_handler {
            callback(&err);
        }

        if *at == P::error() {
            tracing::error!("error raised while executing the error phase; halting chain");
            None
        } else {
            Some(P::error())
        }
    }

    fn set_current(&self, phase: Option<P>) {
        *self
            .shared
            .current
            .write()
            .unwrap_or_else(|e| e.into_inner()) = phase;
    }
}
