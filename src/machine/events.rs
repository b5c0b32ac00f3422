//! Enter/exit/transition observer lists.
//!
//! Observers fire synchronously, in registration order, at fixed points in
//! every transition: exit handlers for the old phase, enter handlers for
//! the new phase, then the generic transition handlers. Observer panics are
//! isolated and logged, matching the disposer policy, so a misbehaving
//! observer cannot corrupt the transition sequence.

use crate::core::Phase;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Mutex;
use tracing::warn;

type ObserverFn<C> = Box<dyn Fn(&C) + Send + Sync>;
type TransitionFn<P, C> = Box<dyn Fn(&P, &P, &C) + Send + Sync>;

pub(crate) struct EventHandlers<P: Phase, C> {
    enter: Mutex<HashMap<P, Vec<ObserverFn<C>>>>,
    exit: Mutex<HashMap<P, Vec<ObserverFn<C>>>>,
    transition: Mutex<Vec<TransitionFn<P, C>>>,
}

impl<P: Phase, C> EventHandlers<P, C> {
    pub(crate) fn new() -> Self {
        Self {
            enter: Mutex::new(HashMap::new()),
            exit: Mutex::new(HashMap::new()),
            transition: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn on_enter(&self, phase: P, observer: impl Fn(&C) + Send + Sync + 'static) {
        self.enter
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(phase)
            .or_default()
            .push(Box::new(observer));
    }

    pub(crate) fn on_exit(&self, phase: P, observer: impl Fn(&C) + Send + Sync + 'static) {
        self.exit
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(phase)
            .or_default()
            .push(Box::new(observer));
    }

    pub(crate) fn on_transition(&self, observer: impl Fn(&P, &P, &C) + Send + Sync + 'static) {
        self.transition
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Box::new(observer));
    }

    pub(crate) fn fire_enter(&self, phase: &P, context: &C) {
        let observers = self.enter.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(list) = observers.get(phase) {
            for observer in list {
                if catch_unwind(AssertUnwindSafe(|| observer(context))).is_err() {
                    warn!(phase = %phase.name(), "enter observer panicked");
                }
            }
        }
    }

    pub(crate) fn fire_exit(&self, phase: &P, context: &C) {
        let observers = self.exit.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(list) = observers.get(phase) {
            for observer in list {
                if catch_unwind(AssertUnwindSafe(|| observer(context))).is_err() {
                    warn!(phase = %phase.name(), "exit observer panicked");
                }
            }
        }
    }

    pub(crate) fn fire_transition(&self, from: &P, to: &P, context: &C) {
        let observers = self.transition.lock().unwrap_or_else(|e| e.into_inner());
        for observer in observers.iter() {
            if catch_unwind(AssertUnwindSafe(|| observer(from, to, context))).is_err() {
                warn!(from = %from.name(), to = %to.name(), "transition observer panicked");
            }
        }
    }
}
