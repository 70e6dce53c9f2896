//! Domain aggregates.
//!
//! Each aggregate owns one slice of the engine state and follows the same
//! shape: a state struct, an action enum split into commands and events, and
//! a reducer that validates commands, creates events, and applies them.
//!
//! - `inventory`: the product arena with name and placement indexes
//! - `cart`: per-actor carts with accumulate/overwrite semantics
//! - `checkout`: the validation, resolution, and commit state machine
//! - `ledger`: append-only per-actor transaction books
//! - `roster`: accounts, authentication, and admin approval

pub mod cart;
pub mod checkout;
pub mod inventory;
pub mod ledger;
pub mod roster;

pub use cart::{Cart, CartAction, CartReducer, CartState};
pub use checkout::{
    CheckoutAction, CheckoutFailure, CheckoutPhase, CheckoutReducer, CheckoutState,
    apply_resolution, compute_shortages,
};
pub use inventory::{InventoryAction, InventoryReducer, InventoryState};
pub use ledger::{LedgerBook, LedgerScope, LedgerState, LedgerSummary};
pub use roster::{RosterAction, RosterReducer, RosterState};
