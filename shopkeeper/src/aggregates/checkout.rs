//! Checkout aggregate: validation, shortage resolution, and atomic commit.
//!
//! A checkout walks a fixed state machine. Validation scans the whole cart
//! and reports every shortage at once instead of failing on the first one.
//! The actor then resolves shortages one at a time (reduce, remove, or
//! abort), and every resolution triggers a fresh full scan. A clean scan
//! deducts stock, stages the transaction, and persists the owning actor's
//! ledger book before anything is acknowledged: the in-memory append, cart
//! clear, and spend credit all happen only once the write succeeded, and a
//! failed write restocks every deducted unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shopkeeper_core::{Effect, SmallVec};
use shopkeeper_macros::Action;
use thiserror::Error;

use crate::aggregates::cart::Cart;
use crate::aggregates::inventory::InventoryState;
use crate::engine::{EngineAction, EngineEnvironment, EngineState};
use crate::types::{
    ActorId, Money, ProductId, Resolution, Shortage, Size, Tier, Transaction, TransactionItem,
};

// ============================================================================
// Failures
// ============================================================================

/// Why a checkout attempt failed after validation passed
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum CheckoutFailure {
    /// Stock changed between validation and commit; every deduction was rolled back
    #[error("stock changed during commit: {0}")]
    CommitRace(String),
    /// The ledger write failed; the transaction was not acknowledged
    #[error("could not persist the transaction: {0}")]
    Persistence(String),
    /// A total overflowed during staging
    #[error("amount arithmetic overflowed: {0}")]
    Arithmetic(String),
}

// ============================================================================
// State
// ============================================================================

/// Where a checkout currently stands
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum CheckoutPhase {
    /// No checkout in progress
    #[default]
    Idle,
    /// Validation found shortages; the actor must resolve them
    AwaitingResolution {
        /// The actor checking out
        actor_id: ActorId,
        /// Every shortage the scan found, cart order
        shortages: Vec<Shortage>,
    },
    /// Stock is deducted and the ledger write is in flight
    Committing {
        /// The staged transaction
        transaction: Transaction,
    },
    /// The checkout committed
    Done {
        /// The committed transaction
        transaction: Transaction,
    },
    /// The checkout ended without committing; the cart is preserved
    Cancelled {
        /// Why it ended
        reason: String,
    },
}

/// Checkout state
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CheckoutState {
    /// Current phase of the (single) checkout flow
    pub phase: CheckoutPhase,
    /// Last validation error or failure message, if any
    pub last_error: Option<String>,
}

// ============================================================================
// Decision core
// ============================================================================

/// Scans a whole cart against current stock and reports every shortage.
///
/// A product that no longer exists shows up as a shortage with zero available
/// for each of its requested slots, it never aborts the scan.
#[must_use]
pub fn compute_shortages(cart: &Cart, inventory: &InventoryState) -> Vec<Shortage> {
    let mut shortages = Vec::new();
    for (&product_id, quantities) in cart.lines() {
        let product = inventory.product(product_id);
        for size in Size::ALL {
            let requested = quantities[size.index()];
            if requested == 0 {
                continue;
            }
            let available = product.map_or(0, |p| p.stock.available(size));
            if requested > available {
                shortages.push(Shortage { product_id, size, requested, available });
            }
        }
    }
    shortages
}

/// Applies one resolution choice to a cart.
///
/// Reductions clamp the requested quantity to what is currently available;
/// removal drops the whole line. [`Resolution::Abort`] is handled by the
/// reducer, not here.
pub fn apply_resolution(cart: &mut Cart, inventory: &InventoryState, resolution: &Resolution) {
    match resolution {
        Resolution::ReduceToAvailable { product_id, size } => {
            let requested = cart.quantity(*product_id, *size);
            let available = inventory
                .product(*product_id)
                .map_or(0, |p| p.stock.available(*size));
            cart.overwrite(*product_id, *size, requested.min(available));
        },
        Resolution::RemoveItem { product_id } => {
            cart.remove(*product_id);
        },
        Resolution::Abort => {},
    }
}

/// Snapshots every cart line against current product data.
///
/// Returns the items and their raw total. Prices, names, and placements are
/// copied so later edits never alter the record.
fn snapshot_items(
    inventory: &InventoryState,
    cart: &Cart,
) -> Result<(Vec<TransactionItem>, Money), CheckoutFailure> {
    let mut items = Vec::with_capacity(cart.len());
    let mut raw_total = Money::ZERO;
    for (&product_id, &quantities) in cart.lines() {
        let Some(product) = inventory.product(product_id) else {
            return Err(CheckoutFailure::CommitRace(format!(
                "product {product_id} disappeared after validation"
            )));
        };
        let item = TransactionItem::snapshot(product, quantities)
            .map_err(CheckoutFailure::Arithmetic)?;
        raw_total = raw_total
            .checked_add(item.subtotal)
            .ok_or_else(|| CheckoutFailure::Arithmetic("raw total overflows".to_string()))?;
        items.push(item);
    }
    Ok((items, raw_total))
}

/// Deducts every staged quantity from stock, all-or-nothing.
///
/// On any failure the deductions already made are restocked before the error
/// is returned, leaving stock exactly as it was.
fn execute_deductions(
    inventory: &mut InventoryState,
    items: &[TransactionItem],
) -> Result<(), CheckoutFailure> {
    let mut deducted: Vec<(ProductId, Size, u32)> = Vec::new();
    for item in items {
        for size in Size::ALL {
            let quantity = item.quantities[size.index()];
            if quantity == 0 {
                continue;
            }
            if let Err(reason) = inventory.deduct(item.product_id, size, quantity) {
                for &(product_id, size, quantity) in deducted.iter().rev() {
                    inventory.restock(product_id, size, quantity);
                }
                return Err(CheckoutFailure::CommitRace(reason));
            }
            deducted.push((item.product_id, size, quantity));
        }
    }
    Ok(())
}

// ============================================================================
// Actions
// ============================================================================

/// Actions handled by the checkout aggregate
#[derive(Action, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CheckoutAction {
    // ========== Commands ==========
    /// Command: start a checkout for the actor's cart
    #[command]
    BeginCheckout {
        /// The actor checking out
        actor_id: ActorId,
    },
    /// Command: resolve one reported shortage, or abort
    #[command]
    Resolve {
        /// The actor checking out
        actor_id: ActorId,
        /// The chosen resolution
        resolution: Resolution,
    },

    // ========== Events ==========
    /// Event: validation found shortages
    #[event]
    ShortagesFound {
        /// The actor checking out
        actor_id: ActorId,
        /// Every shortage, cart order
        shortages: Vec<Shortage>,
        /// When the scan ran
        timestamp: DateTime<Utc>,
    },
    /// Event: a resolution choice was applied to the cart
    #[event]
    ResolutionApplied {
        /// The actor checking out
        actor_id: ActorId,
        /// The applied resolution
        resolution: Resolution,
        /// When it was applied
        timestamp: DateTime<Utc>,
    },
    /// Event: stock is deducted and the ledger write is in flight
    #[event]
    CommitStarted {
        /// The staged transaction
        transaction: Transaction,
        /// When the commit started
        timestamp: DateTime<Utc>,
    },
    /// Event: the ledger write succeeded and the checkout is final
    #[event]
    CheckoutCommitted {
        /// When the commit started
        timestamp: DateTime<Utc>,
        /// The committed transaction
        transaction: Transaction,
    },
    /// Event: the checkout ended without committing
    #[event]
    CheckoutCancelled {
        /// Why it ended
        reason: String,
        /// When it ended
        timestamp: DateTime<Utc>,
    },
    /// Event: the checkout failed after validation; state was rolled back
    #[event]
    CheckoutFailed {
        /// What failed
        failure: CheckoutFailure,
        /// When it failed
        timestamp: DateTime<Utc>,
    },
    /// Event: a command failed validation
    #[event]
    ValidationFailed {
        /// What went wrong
        error: String,
    },
}

// ============================================================================
// Reducer
// ============================================================================

/// Reducer for the checkout aggregate.
///
/// Checkout is the one aggregate that spans the others: it reads carts and
/// the roster, deducts inventory, and appends to the ledger, so it reduces
/// over the whole engine state.
#[derive(Clone, Copy, Debug, Default)]
pub struct CheckoutReducer;

impl CheckoutReducer {
    /// Creates a new checkout reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn fail(state: &mut EngineState, error: String) -> SmallVec<[Effect<EngineAction>; 4]> {
        Self::apply_event(state, &CheckoutAction::ValidationFailed { error });
        SmallVec::new()
    }

    /// Runs one validation pass and either parks on shortages, cancels an
    /// empty cart, or stages the commit
    fn run_checkout_pass(
        state: &mut EngineState,
        actor_id: ActorId,
        env: &EngineEnvironment,
    ) -> SmallVec<[Effect<EngineAction>; 4]> {
        let cart = state.carts.cart(actor_id).cloned().unwrap_or_default();
        if cart.is_empty() {
            Self::apply_event(state, &CheckoutAction::CheckoutCancelled {
                reason: "cart is empty".to_string(),
                timestamp: env.clock.now(),
            });
            return SmallVec::new();
        }

        let shortages = compute_shortages(&cart, &state.inventory);
        if !shortages.is_empty() {
            Self::apply_event(state, &CheckoutAction::ShortagesFound {
                actor_id,
                shortages,
                timestamp: env.clock.now(),
            });
            return SmallVec::new();
        }

        // Stage the transaction from current product data
        let (items, raw_total) = match snapshot_items(&state.inventory, &cart) {
            Ok(staged) => staged,
            Err(failure) => {
                Self::apply_event(state, &CheckoutAction::CheckoutFailed {
                    failure,
                    timestamp: env.clock.now(),
                });
                return SmallVec::new();
            },
        };
        if let Err(failure) = execute_deductions(&mut state.inventory, &items) {
            Self::apply_event(state, &CheckoutAction::CheckoutFailed {
                failure,
                timestamp: env.clock.now(),
            });
            return SmallVec::new();
        }

        let tier = state.roster.actor(actor_id).map_or(Tier::Silver, |record| record.tier);
        let discount_rate = tier.discount_rate();
        let transaction = Transaction {
            id: state.ledger.next_id(actor_id),
            actor_id,
            items,
            raw_total,
            discount_rate,
            final_total: discount_rate.apply(raw_total),
            timestamp: env.clock.now(),
            tier,
        };

        Self::apply_event(state, &CheckoutAction::CommitStarted {
            transaction: transaction.clone(),
            timestamp: transaction.timestamp,
        });

        // Persist the owning actor's book before acknowledging anything
        let staged_book = state.ledger.staged_book(actor_id, &transaction);
        let store = env.ledger.clone();
        let effect = Effect::task(move || {
            match store.persist(transaction.actor_id, &staged_book) {
                Ok(()) => Some(EngineAction::Checkout(CheckoutAction::CheckoutCommitted {
                    timestamp: transaction.timestamp,
                    transaction,
                })),
                Err(error) => {
                    tracing::error!(%error, "ledger write failed, rolling back checkout");
                    Some(EngineAction::Checkout(CheckoutAction::CheckoutFailed {
                        failure: CheckoutFailure::Persistence(error.to_string()),
                        timestamp: transaction.timestamp,
                    }))
                },
            }
        });

        let mut effects = SmallVec::new();
        effects.push(effect);
        effects
    }

    /// Processes one checkout action against the engine state
    pub(crate) fn reduce(
        state: &mut EngineState,
        action: CheckoutAction,
        env: &EngineEnvironment,
    ) -> SmallVec<[Effect<EngineAction>; 4]> {
        match action {
            CheckoutAction::BeginCheckout { actor_id } => {
                // Validate command: only one checkout at a time
                match &state.checkout.phase {
                    CheckoutPhase::Idle
                    | CheckoutPhase::Done { .. }
                    | CheckoutPhase::Cancelled { .. } => {},
                    CheckoutPhase::AwaitingResolution { .. } | CheckoutPhase::Committing { .. } => {
                        return Self::fail(state, "a checkout is already in progress".to_string());
                    },
                }

                Self::run_checkout_pass(state, actor_id, env)
            },

            CheckoutAction::Resolve { actor_id, resolution } => {
                // Validate command: must be parked on shortages, and a
                // reduction must target one of them
                let shortages = match &state.checkout.phase {
                    CheckoutPhase::AwaitingResolution { actor_id: waiting, shortages }
                        if *waiting == actor_id =>
                    {
                        shortages.clone()
                    },
                    CheckoutPhase::AwaitingResolution { .. } => {
                        return Self::fail(
                            state,
                            "another actor's checkout is awaiting resolution".to_string(),
                        );
                    },
                    _ => {
                        return Self::fail(state, "no checkout is awaiting resolution".to_string());
                    },
                };
                match &resolution {
                    Resolution::ReduceToAvailable { product_id, size } => {
                        let listed = shortages
                            .iter()
                            .any(|s| s.product_id == *product_id && s.size == *size);
                        if !listed {
                            return Self::fail(
                                state,
                                format!("no shortage reported for {product_id} size {size}"),
                            );
                        }
                    },
                    Resolution::RemoveItem { product_id } => {
                        let in_cart = state
                            .carts
                            .cart(actor_id)
                            .is_some_and(|cart| cart.lines().contains_key(product_id));
                        if !in_cart {
                            return Self::fail(
                                state,
                                format!("product {product_id} is not in the cart"),
                            );
                        }
                    },
                    Resolution::Abort => {
                        Self::apply_event(state, &CheckoutAction::CheckoutCancelled {
                            reason: "cancelled by actor".to_string(),
                            timestamp: env.clock.now(),
                        });
                        return SmallVec::new();
                    },
                }

                // Apply the resolution, then rescan from scratch
                Self::apply_event(state, &CheckoutAction::ResolutionApplied {
                    actor_id,
                    resolution,
                    timestamp: env.clock.now(),
                });
                if state.carts.is_empty(actor_id) {
                    Self::apply_event(state, &CheckoutAction::CheckoutCancelled {
                        reason: "cart emptied during resolution".to_string(),
                        timestamp: env.clock.now(),
                    });
                    return SmallVec::new();
                }
                Self::run_checkout_pass(state, actor_id, env)
            },

            // Events are applied (for replay or external events)
            CheckoutAction::ShortagesFound { .. }
            | CheckoutAction::ResolutionApplied { .. }
            | CheckoutAction::CommitStarted { .. }
            | CheckoutAction::CheckoutCommitted { .. }
            | CheckoutAction::CheckoutCancelled { .. }
            | CheckoutAction::CheckoutFailed { .. }
            | CheckoutAction::ValidationFailed { .. } => {
                Self::apply_event(state, &action);
                SmallVec::new()
            },
        }
    }

    /// Applies an event to the state
    fn apply_event(state: &mut EngineState, action: &CheckoutAction) {
        match action {
            CheckoutAction::ShortagesFound { actor_id, shortages, .. } => {
                state.checkout.last_error = None;
                state.checkout.phase = CheckoutPhase::AwaitingResolution {
                    actor_id: *actor_id,
                    shortages: shortages.clone(),
                };
            },
            CheckoutAction::ResolutionApplied { actor_id, resolution, .. } => {
                state.checkout.last_error = None;
                let (carts, inventory) = (&mut state.carts, &state.inventory);
                apply_resolution(carts.cart_mut(*actor_id), inventory, resolution);
            },
            CheckoutAction::CommitStarted { transaction, .. } => {
                state.checkout.last_error = None;
                state.checkout.phase = CheckoutPhase::Committing {
                    transaction: transaction.clone(),
                };
            },
            CheckoutAction::CheckoutCommitted { transaction, .. } => {
                let staged = matches!(
                    &state.checkout.phase,
                    CheckoutPhase::Committing { transaction: t }
                        if t.id == transaction.id && t.actor_id == transaction.actor_id
                );
                if !staged {
                    tracing::warn!(
                        transaction = %transaction.id,
                        "commit acknowledged without a staged transaction, ignored"
                    );
                    return;
                }
                state.ledger.append(transaction.clone());
                state.carts.clear(transaction.actor_id);
                state.roster.record_spend(transaction.actor_id, transaction.final_total);
                state.checkout.last_error = None;
                state.checkout.phase = CheckoutPhase::Done {
                    transaction: transaction.clone(),
                };
                metrics::counter!("checkout.committed").increment(1);
                tracing::info!(
                    actor = %transaction.actor_id,
                    transaction = %transaction.id,
                    total = %transaction.final_total,
                    "checkout committed"
                );
            },
            CheckoutAction::CheckoutCancelled { reason, .. } => {
                state.checkout.last_error = None;
                state.checkout.phase = CheckoutPhase::Cancelled { reason: reason.clone() };
                metrics::counter!("checkout.cancelled").increment(1);
            },
            CheckoutAction::CheckoutFailed { failure, .. } => {
                // A failure after CommitStarted means stock was deducted for
                // a transaction that never happened; put every unit back
                if let CheckoutPhase::Committing { transaction } = &state.checkout.phase {
                    let transaction = transaction.clone();
                    for item in &transaction.items {
                        for size in Size::ALL {
                            let quantity = item.quantities[size.index()];
                            if quantity > 0 {
                                state.inventory.restock(item.product_id, size, quantity);
                            }
                        }
                    }
                }
                state.checkout.phase = CheckoutPhase::Idle;
                state.checkout.last_error = Some(failure.to_string());
                metrics::counter!("checkout.failed").increment(1);
                tracing::warn!(%failure, "checkout failed");
            },
            CheckoutAction::ValidationFailed { error } => {
                state.checkout.last_error = Some(error.clone());
            },
            _ => {
                // Commands are not applied to state
            },
        }
    }
}
