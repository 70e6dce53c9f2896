//! # Shopkeeper Core
//!
//! Core traits and types for the shopkeeper engine.
//!
//! This crate provides the fundamental abstractions for building interactive,
//! state-machine-driven systems using the Reducer pattern:
//!
//! - **State**: domain state for a feature
//! - **Action**: all possible inputs to a reducer (commands and events)
//! - **Reducer**: pure function `(State, Action, Environment) → Effects`
//! - **Effect**: side effect descriptions (not execution)
//! - **Environment**: injected dependencies via traits
//! - **Store**: the synchronous driver that applies actions and runs effects
//!
//! ## Execution model
//!
//! Everything is synchronous. `Store::send` applies one action to completion,
//! executes the returned effects inline, and feeds any actions those effects
//! produce back through the reducer until the queue drains. There is no
//! background work, no timers, and no concurrent waits; suspension happens
//! only at the caller's own input points, outside the store.
//!
//! ## Example
//!
//! ```ignore
//! use shopkeeper_core::{smallvec, Effect, Reducer, SmallVec, Store};
//!
//! struct CounterReducer;
//!
//! impl Reducer for CounterReducer {
//!     type State = i64;
//!     type Action = CounterAction;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut i64,
//!         action: CounterAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<CounterAction>; 4]> {
//!         match action {
//!             CounterAction::Increment => *state += 1,
//!             CounterAction::Decrement => *state -= 1,
//!         }
//!         smallvec![Effect::None]
//!     }
//! }
//! ```

pub mod effect;
pub mod environment;
pub mod reducer;
pub mod store;

pub use effect::Effect;
pub use environment::{Clock, SystemClock};
pub use reducer::Reducer;
pub use store::Store;

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use smallvec::{SmallVec, smallvec};
