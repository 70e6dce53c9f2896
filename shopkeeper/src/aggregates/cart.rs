//! Cart aggregate: per-actor shopping carts.
//!
//! A cart line maps a product to a per-size quantity vector. Validation at
//! add/update time is advisory, it checks the requested quantity against
//! current stock so obvious mistakes fail fast, but stock is only reserved at
//! checkout commit. `AddItem` accumulates onto existing quantities while
//! `UpdateItem` overwrites them.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shopkeeper_core::{Effect, SmallVec};
use shopkeeper_macros::Action;

use crate::aggregates::inventory::InventoryState;
use crate::engine::{EngineAction, EngineEnvironment};
use crate::types::{ActorId, Money, ProductId, Size};

// ============================================================================
// Cart value type
// ============================================================================

/// One actor's cart: product lines with per-size quantities
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: BTreeMap<ProductId, [u32; 6]>,
}

impl Cart {
    /// Creates an empty cart
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: BTreeMap::new() }
    }

    /// Rebuilds a cart from persisted lines, dropping all-zero rows
    #[must_use]
    pub fn from_lines(lines: Vec<(ProductId, [u32; 6])>) -> Self {
        let mut cart = Self::new();
        for (product_id, quantities) in lines {
            if quantities.iter().any(|&q| q != 0) {
                cart.lines.insert(product_id, quantities);
            }
        }
        cart
    }

    /// `true` when the cart holds no lines
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of product lines
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// The cart lines in product id order
    #[must_use]
    pub const fn lines(&self) -> &BTreeMap<ProductId, [u32; 6]> {
        &self.lines
    }

    /// Requested quantity for one (product, size)
    #[must_use]
    pub fn quantity(&self, product_id: ProductId, size: Size) -> u32 {
        self.lines
            .get(&product_id)
            .map_or(0, |quantities| quantities[size.index()])
    }

    /// Adds onto the existing quantity for one (product, size)
    pub fn accumulate(&mut self, product_id: ProductId, size: Size, quantity: u32) {
        if quantity == 0 {
            return;
        }
        let line = self.lines.entry(product_id).or_default();
        let slot = &mut line[size.index()];
        *slot = slot.saturating_add(quantity);
    }

    /// Overwrites the quantity for one (product, size); a line that becomes
    /// all-zero is dropped
    pub fn overwrite(&mut self, product_id: ProductId, size: Size, quantity: u32) {
        let line = self.lines.entry(product_id).or_default();
        line[size.index()] = quantity;
        if line.iter().all(|&q| q == 0) {
            self.lines.remove(&product_id);
        }
    }

    /// Removes a whole product line; `true` if it existed
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        self.lines.remove(&product_id).is_some()
    }

    /// Cart total against current prices, skipping products that no longer
    /// exist; saturates instead of overflowing
    #[must_use]
    pub fn total(&self, inventory: &InventoryState) -> Money {
        let mut total = Money::ZERO;
        for (product_id, quantities) in &self.lines {
            let Some(product) = inventory.product(*product_id) else {
                continue;
            };
            let units: u64 = quantities.iter().map(|&q| u64::from(q)).sum();
            let subtotal = product
                .price
                .checked_multiply(units)
                .unwrap_or(Money::from_cents(u64::MAX));
            total = total
                .checked_add(subtotal)
                .unwrap_or(Money::from_cents(u64::MAX));
        }
        total
    }
}

// ============================================================================
// State
// ============================================================================

/// Cart state: one cart per actor
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CartState {
    /// Carts keyed by actor
    carts: HashMap<ActorId, Cart>,
    /// Last validation error, if any
    pub last_error: Option<String>,
}

impl CartState {
    /// Creates an empty cart state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The actor's cart, if they have one
    #[must_use]
    pub fn cart(&self, actor_id: ActorId) -> Option<&Cart> {
        self.carts.get(&actor_id)
    }

    /// `true` when the actor has no cart or an empty one
    #[must_use]
    pub fn is_empty(&self, actor_id: ActorId) -> bool {
        self.carts.get(&actor_id).is_none_or(Cart::is_empty)
    }

    /// Mutable access for checkout resolution, creating an empty cart if absent
    pub(crate) fn cart_mut(&mut self, actor_id: ActorId) -> &mut Cart {
        self.carts.entry(actor_id).or_default()
    }

    /// Drops the actor's cart after a committed checkout
    pub(crate) fn clear(&mut self, actor_id: ActorId) {
        self.carts.remove(&actor_id);
    }
}

// ============================================================================
// Actions
// ============================================================================

/// Actions handled by the cart aggregate
#[derive(Action, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CartAction {
    // ========== Commands ==========
    /// Command: add quantity for a (product, size), accumulating onto any
    /// existing quantity
    #[command]
    AddItem {
        /// Owning actor
        actor_id: ActorId,
        /// Product to add
        product_id: ProductId,
        /// Size slot, must match the product's mode
        size: Size,
        /// Quantity to add, must be positive
        quantity: u32,
    },
    /// Command: overwrite the quantity for a (product, size); zero clears the slot
    #[command]
    UpdateItem {
        /// Owning actor
        actor_id: ActorId,
        /// Product to update
        product_id: ProductId,
        /// Size slot, must match the product's mode
        size: Size,
        /// Replacement quantity
        quantity: u32,
    },
    /// Command: remove a whole product line
    #[command]
    RemoveItem {
        /// Owning actor
        actor_id: ActorId,
        /// Product line to remove
        product_id: ProductId,
    },
    /// Command: install a cart loaded from disk at login
    #[command]
    RestoreCart {
        /// Owning actor
        actor_id: ActorId,
        /// The persisted cart
        cart: Cart,
    },

    // ========== Events ==========
    /// Event: quantity was accumulated onto a line
    #[event]
    ItemAdded {
        /// Owning actor
        actor_id: ActorId,
        /// Product added
        product_id: ProductId,
        /// Size slot
        size: Size,
        /// Quantity added
        quantity: u32,
        /// When it was added
        timestamp: DateTime<Utc>,
    },
    /// Event: a line's quantity was overwritten
    #[event]
    ItemUpdated {
        /// Owning actor
        actor_id: ActorId,
        /// Product updated
        product_id: ProductId,
        /// Size slot
        size: Size,
        /// Replacement quantity
        quantity: u32,
        /// When it was updated
        timestamp: DateTime<Utc>,
    },
    /// Event: a whole product line was removed
    #[event]
    ItemRemoved {
        /// Owning actor
        actor_id: ActorId,
        /// Product removed
        product_id: ProductId,
        /// When it was removed
        timestamp: DateTime<Utc>,
    },
    /// Event: a persisted cart was installed
    #[event]
    CartRestored {
        /// Owning actor
        actor_id: ActorId,
        /// The restored cart
        cart: Cart,
        /// When it was restored
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

/// Reducer for the cart aggregate
#[derive(Clone, Copy, Debug, Default)]
pub struct CartReducer;

impl CartReducer {
    /// Creates a new cart reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Advisory stock check for one requested (product, size, quantity)
    fn validate_request(
        inventory: &InventoryState,
        product_id: ProductId,
        size: Size,
        quantity: u32,
    ) -> Result<(), String> {
        let product = inventory
            .product(product_id)
            .ok_or_else(|| format!("product {product_id} not found"))?;
        if !product.stock.is_legal(size) {
            if product.has_size() {
                return Err(format!("{} is sized, pick one of XS..XL", product.name));
            }
            return Err(format!("{} has no sizes", product.name));
        }
        let available = product.stock.available(size);
        if quantity > available {
            return Err(format!(
                "only {available} of {} available for size {size}, requested {quantity}",
                product.name
            ));
        }
        Ok(())
    }

    fn fail(state: &mut CartState, error: String) -> SmallVec<[Effect<EngineAction>; 4]> {
        Self::apply_event(state, &CartAction::ValidationFailed { error });
        SmallVec::new()
    }

    /// Processes one cart action against the state
    pub(crate) fn reduce(
        state: &mut CartState,
        inventory: &InventoryState,
        action: CartAction,
        env: &EngineEnvironment,
    ) -> SmallVec<[Effect<EngineAction>; 4]> {
        match action {
            CartAction::AddItem { actor_id, product_id, size, quantity } => {
                // Validate command
                if quantity == 0 {
                    return Self::fail(state, "quantity must be positive".to_string());
                }
                if let Err(error) = Self::validate_request(inventory, product_id, size, quantity) {
                    return Self::fail(state, error);
                }

                // Create event
                let event = CartAction::ItemAdded {
                    actor_id,
                    product_id,
                    size,
                    quantity,
                    timestamp: env.clock.now(),
                };

                // Apply event to state
                Self::apply_event(state, &event);
                SmallVec::new()
            },

            CartAction::UpdateItem { actor_id, product_id, size, quantity } => {
                // Validate command
                if let Err(error) = Self::validate_request(inventory, product_id, size, quantity) {
                    return Self::fail(state, error);
                }

                // Create event
                let event = CartAction::ItemUpdated {
                    actor_id,
                    product_id,
                    size,
                    quantity,
                    timestamp: env.clock.now(),
                };

                // Apply event to state
                Self::apply_event(state, &event);
                SmallVec::new()
            },

            CartAction::RemoveItem { actor_id, product_id } => {
                // Validate command
                let in_cart = state
                    .cart(actor_id)
                    .is_some_and(|cart| cart.lines().contains_key(&product_id));
                if !in_cart {
                    return Self::fail(state, format!("product {product_id} is not in the cart"));
                }

                // Create event
                let event = CartAction::ItemRemoved {
                    actor_id,
                    product_id,
                    timestamp: env.clock.now(),
                };

                // Apply event to state
                Self::apply_event(state, &event);
                SmallVec::new()
            },

            CartAction::RestoreCart { actor_id, cart } => {
                // Create event
                let event = CartAction::CartRestored {
                    actor_id,
                    cart,
                    timestamp: env.clock.now(),
                };

                // Apply event to state
                Self::apply_event(state, &event);
                SmallVec::new()
            },

            // Events are applied (for replay or external events)
            CartAction::ItemAdded { .. }
            | CartAction::ItemUpdated { .. }
            | CartAction::ItemRemoved { .. }
            | CartAction::CartRestored { .. }
            | CartAction::ValidationFailed { .. } => {
                Self::apply_event(state, &action);
                SmallVec::new()
            },
        }
    }

    /// Applies an event to the state
    fn apply_event(state: &mut CartState, action: &CartAction) {
        match action {
            CartAction::ItemAdded { actor_id, product_id, size, quantity, .. } => {
                state.last_error = None;
                state.cart_mut(*actor_id).accumulate(*product_id, *size, *quantity);
            },
            CartAction::ItemUpdated { actor_id, product_id, size, quantity, .. } => {
                state.last_error = None;
                state.cart_mut(*actor_id).overwrite(*product_id, *size, *quantity);
            },
            CartAction::ItemRemoved { actor_id, product_id, .. } => {
                state.last_error = None;
                state.cart_mut(*actor_id).remove(*product_id);
            },
            CartAction::CartRestored { actor_id, cart, .. } => {
                state.last_error = None;
                state.carts.insert(*actor_id, cart.clone());
            },
            CartAction::ValidationFailed { error } => {
                state.last_error = Some(error.clone());
            },
            _ => {
                // Commands are not applied to state
            },
        }
    }
}
