//! The synchronous store driving a reducer.
//!
//! The store owns a reducer's state and environment. `send` applies one
//! action, executes the returned effects inline, and feeds any actions the
//! effects produce back through the reducer until the queue drains. By the
//! time `send` returns, the state reflects every downstream consequence of
//! the action, including persistence outcomes.

use std::collections::VecDeque;

use crate::effect::Effect;
use crate::reducer::Reducer;

/// Owns state, reducer, and environment; applies actions to completion.
pub struct Store<R: Reducer> {
    state: R::State,
    reducer: R,
    environment: R::Environment,
}

impl<R: Reducer> Store<R> {
    /// Create a store from initial state, a reducer, and its environment.
    pub const fn new(initial_state: R::State, reducer: R, environment: R::Environment) -> Self {
        Self {
            state: initial_state,
            reducer,
            environment,
        }
    }

    /// The current state.
    pub const fn state(&self) -> &R::State {
        &self.state
    }

    /// The injected environment.
    pub const fn environment(&self) -> &R::Environment {
        &self.environment
    }

    /// Consume the store, returning the final state.
    pub fn into_state(self) -> R::State {
        self.state
    }

    /// Apply an action and run its effects to quiescence.
    ///
    /// Actions produced by effects are queued and reduced in FIFO order, so
    /// one `send` may pass through the reducer several times. Effects run on
    /// the calling thread; there is nothing to await.
    pub fn send(&mut self, action: R::Action) {
        let mut queue = VecDeque::new();
        queue.push_back(action);

        while let Some(action) = queue.pop_front() {
            metrics::counter!("store.actions.processed").increment(1);
            let effects = self
                .reducer
                .reduce(&mut self.state, action, &self.environment);
            tracing::trace!(effects = effects.len(), "reduced action");
            for effect in effects {
                Self::run_effect(effect, &mut queue);
            }
        }
    }

    fn run_effect(effect: Effect<R::Action>, queue: &mut VecDeque<R::Action>) {
        match effect {
            Effect::None => {
                metrics::counter!("store.effects.executed", "type" => "none").increment(1);
            },
            Effect::Task(task) => {
                metrics::counter!("store.effects.executed", "type" => "task").increment(1);
                if let Some(action) = task() {
                    queue.push_back(action);
                }
            },
            Effect::Sequential(effects) => {
                metrics::counter!("store.effects.executed", "type" => "sequential").increment(1);
                for inner in effects {
                    Self::run_effect(inner, queue);
                }
            },
        }
    }
}
