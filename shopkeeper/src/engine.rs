//! The engine: one state, one action space, one reducer.
//!
//! Every aggregate hangs off [`EngineState`] and every action arrives as an
//! [`EngineAction`]. The [`EngineReducer`] routes each action to its
//! aggregate's reducer; checkout is handed the whole state because it spans
//! the others. The engine is single-actor and synchronous: a `send` returns
//! only after the action, its effects, and any feedback actions have all
//! been processed.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shopkeeper_core::{Clock, Effect, Reducer, SmallVec};

use crate::aggregates::cart::{CartAction, CartReducer, CartState};
use crate::aggregates::checkout::{CheckoutAction, CheckoutReducer, CheckoutState};
use crate::aggregates::inventory::{InventoryAction, InventoryReducer, InventoryState};
use crate::aggregates::ledger::LedgerState;
use crate::aggregates::roster::{RosterAction, RosterReducer, RosterState};
use crate::persistence::LedgerStore;

// ============================================================================
// State
// ============================================================================

/// The whole engine state
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EngineState {
    /// Product arena and indexes
    pub inventory: InventoryState,
    /// Per-actor carts
    pub carts: CartState,
    /// Checkout state machine
    pub checkout: CheckoutState,
    /// Per-actor transaction books
    pub ledger: LedgerState,
    /// Accounts and admin requests
    pub roster: RosterState,
}

impl EngineState {
    /// Creates an empty engine state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

// ============================================================================
// Actions
// ============================================================================

/// Every action the engine can process
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum EngineAction {
    /// Inventory aggregate action
    Inventory(InventoryAction),
    /// Cart aggregate action
    Cart(CartAction),
    /// Checkout aggregate action
    Checkout(CheckoutAction),
    /// Roster aggregate action
    Roster(RosterAction),
}

impl EngineAction {
    /// `true` when the wrapped action is a command
    #[must_use]
    pub const fn is_command(&self) -> bool {
        match self {
            Self::Inventory(action) => action.is_command(),
            Self::Cart(action) => action.is_command(),
            Self::Checkout(action) => action.is_command(),
            Self::Roster(action) => action.is_command(),
        }
    }

    /// `true` when the wrapped action is an event
    #[must_use]
    pub const fn is_event(&self) -> bool {
        match self {
            Self::Inventory(action) => action.is_event(),
            Self::Cart(action) => action.is_event(),
            Self::Checkout(action) => action.is_event(),
            Self::Roster(action) => action.is_event(),
        }
    }

    /// The wrapped action's variant name
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Inventory(action) => action.name(),
            Self::Cart(action) => action.name(),
            Self::Checkout(action) => action.name(),
            Self::Roster(action) => action.name(),
        }
    }
}

impl From<InventoryAction> for EngineAction {
    fn from(action: InventoryAction) -> Self {
        Self::Inventory(action)
    }
}

impl From<CartAction> for EngineAction {
    fn from(action: CartAction) -> Self {
        Self::Cart(action)
    }
}

impl From<CheckoutAction> for EngineAction {
    fn from(action: CheckoutAction) -> Self {
        Self::Checkout(action)
    }
}

impl From<RosterAction> for EngineAction {
    fn from(action: RosterAction) -> Self {
        Self::Roster(action)
    }
}

// ============================================================================
// Environment
// ============================================================================

/// Dependencies the reducers need from the outside world
#[derive(Clone)]
pub struct EngineEnvironment {
    /// Time source
    pub clock: Arc<dyn Clock>,
    /// Where committed ledger books are persisted
    pub ledger: Arc<dyn LedgerStore>,
}

impl EngineEnvironment {
    /// Creates a new environment
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, ledger: Arc<dyn LedgerStore>) -> Self {
        Self { clock, ledger }
    }
}

// ============================================================================
// Reducer
// ============================================================================

/// Routes engine actions to their aggregate reducers
#[derive(Clone, Copy, Debug, Default)]
pub struct EngineReducer;

impl EngineReducer {
    /// Creates a new engine reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for EngineReducer {
    type State = EngineState;
    type Action = EngineAction;
    type Environment = EngineEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        tracing::debug!(
            action = action.name(),
            command = action.is_command(),
            "engine action"
        );
        match action {
            EngineAction::Inventory(action) => {
                InventoryReducer::reduce(&mut state.inventory, action, env)
            },
            EngineAction::Cart(action) => {
                CartReducer::reduce(&mut state.carts, &state.inventory, action, env)
            },
            EngineAction::Checkout(action) => CheckoutReducer::reduce(state, action, env),
            EngineAction::Roster(action) => RosterReducer::reduce(&mut state.roster, action, env),
        }
    }
}
