//! Inventory aggregate: the product arena and its lookup indexes.
//!
//! Products live in an id-keyed arena. A name index and per-placement buckets
//! are maintained transactionally: every index mutation happens inside
//! [`InventoryReducer::apply_event`], so a validation failure can never leave
//! the indexes half-updated.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shopkeeper_core::{Effect, SmallVec};
use shopkeeper_macros::Action;

use crate::engine::{EngineAction, EngineEnvironment};
use crate::types::{
    Category, Money, Placement, Product, ProductId, Section, Size, SizeStock, StockInit,
};

// ============================================================================
// State
// ============================================================================

/// Inventory state: the arena plus its derived indexes
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InventoryState {
    /// Arena of products keyed by id
    products: HashMap<ProductId, Product>,
    /// Name → id lookup; names are unique
    by_name: HashMap<String, ProductId>,
    /// Placement buckets in category/section order, ids sorted within each
    buckets: BTreeMap<Placement, BTreeSet<ProductId>>,
    /// Next id to assign; ids are never reused
    next_id: u32,
    /// Last validation error, if any
    pub last_error: Option<String>,
}

impl Default for InventoryState {
    fn default() -> Self {
        Self::new()
    }
}

impl InventoryState {
    /// Creates an empty inventory; ids start at 1
    #[must_use]
    pub fn new() -> Self {
        Self {
            products: HashMap::new(),
            by_name: HashMap::new(),
            buckets: BTreeMap::new(),
            next_id: 1,
            last_error: None,
        }
    }

    /// Rebuilds an inventory from persisted parts.
    ///
    /// Indexes are derived from scratch. A product whose id or name collides
    /// with an earlier one is dropped with a warning rather than clobbering
    /// the index.
    #[must_use]
    pub fn from_parts(next_id: u32, products: Vec<Product>) -> Self {
        let mut state = Self::new();
        let mut highest = 0;
        for product in products {
            if state.products.contains_key(&product.id) {
                tracing::warn!(id = %product.id, "duplicate product id in data, dropped");
                continue;
            }
            if state.by_name.contains_key(&product.name) {
                tracing::warn!(name = %product.name, "duplicate product name in data, dropped");
                continue;
            }
            highest = highest.max(product.id.value());
            state.index_product(product);
        }
        state.next_id = next_id.max(highest + 1);
        state
    }

    /// The id the next added product will receive
    #[must_use]
    pub const fn next_id(&self) -> ProductId {
        ProductId::new(self.next_id)
    }

    /// Looks up a product by id
    #[must_use]
    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.get(&id)
    }

    /// Looks up a product id by exact name
    #[must_use]
    pub fn id_by_name(&self, name: &str) -> Option<ProductId> {
        self.by_name.get(name).copied()
    }

    /// Number of products
    #[must_use]
    pub fn count(&self) -> usize {
        self.products.len()
    }

    /// `true` when no products exist
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// All products in placement order, ids ascending within a placement
    #[must_use]
    pub fn list_all(&self) -> Vec<&Product> {
        self.buckets
            .values()
            .flat_map(|ids| ids.iter())
            .filter_map(|id| self.products.get(id))
            .collect()
    }

    /// Products in one category, section order then id order
    #[must_use]
    pub fn list_by_category(&self, category: Category) -> Vec<&Product> {
        self.buckets
            .iter()
            .filter(|(placement, _)| placement.category() == category)
            .flat_map(|(_, ids)| ids.iter())
            .filter_map(|id| self.products.get(id))
            .collect()
    }

    /// Products in one placement bucket, id order
    #[must_use]
    pub fn list_in(&self, placement: Placement) -> Vec<&Product> {
        self.buckets
            .get(&placement)
            .into_iter()
            .flat_map(|ids| ids.iter())
            .filter_map(|id| self.products.get(id))
            .collect()
    }

    /// Deducts stock for a committing checkout, all-or-nothing per slot
    pub(crate) fn deduct(
        &mut self,
        id: ProductId,
        size: Size,
        quantity: u32,
    ) -> Result<(), String> {
        let product = self
            .products
            .get_mut(&id)
            .ok_or_else(|| format!("product {id} not found"))?;
        product.stock.deduct(size, quantity)
    }

    /// Returns previously deducted stock when a commit is rolled back
    pub(crate) fn restock(&mut self, id: ProductId, size: Size, quantity: u32) {
        if let Some(product) = self.products.get_mut(&id) {
            product.stock.restock(size, quantity);
        }
    }

    fn index_product(&mut self, product: Product) {
        self.by_name.insert(product.name.clone(), product.id);
        self.buckets
            .entry(product.placement)
            .or_default()
            .insert(product.id);
        self.products.insert(product.id, product);
    }

    fn unindex_product(&mut self, id: ProductId) -> Option<Product> {
        let product = self.products.remove(&id)?;
        self.by_name.remove(&product.name);
        if let Some(ids) = self.buckets.get_mut(&product.placement) {
            ids.remove(&id);
            if ids.is_empty() {
                self.buckets.remove(&product.placement);
            }
        }
        Some(product)
    }
}

// ============================================================================
// Actions
// ============================================================================

/// Actions handled by the inventory aggregate
#[derive(Action, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum InventoryAction {
    // ========== Commands ==========
    /// Command: add a product; the stock shape fixes its size mode forever
    #[command]
    AddProduct {
        /// Unique product name
        name: String,
        /// Requested category
        category: Category,
        /// Requested section, validated against the category
        section: Section,
        /// Unit price
        price: Money,
        /// Initial stock
        stock: StockInit,
    },
    /// Command: remove a product; its id is never reused
    #[command]
    RemoveProduct {
        /// Product to remove
        id: ProductId,
    },
    /// Command: set one size slot to an absolute quantity
    #[command]
    SetStock {
        /// Product to update
        id: ProductId,
        /// Size slot, must match the product's mode
        size: Size,
        /// New absolute quantity
        quantity: u32,
    },
    /// Command: adjust one size slot by a signed delta, rejected if it would go negative
    #[command]
    AdjustStock {
        /// Product to update
        id: ProductId,
        /// Size slot, must match the product's mode
        size: Size,
        /// Signed change
        delta: i64,
    },
    /// Command: change a product's unit price
    #[command]
    SetPrice {
        /// Product to update
        id: ProductId,
        /// New unit price
        price: Money,
    },
    /// Command: rename a product, keeping names unique
    #[command]
    RenameProduct {
        /// Product to rename
        id: ProductId,
        /// New name
        name: String,
    },
    /// Command: move a product to another category/section
    #[command]
    MoveProduct {
        /// Product to move
        id: ProductId,
        /// New category
        category: Category,
        /// New section, validated against the category
        section: Section,
    },

    // ========== Events ==========
    /// Event: a product was added
    #[event]
    ProductAdded {
        /// The product as created
        product: Product,
        /// When it was added
        timestamp: DateTime<Utc>,
    },
    /// Event: a product was removed
    #[event]
    ProductRemoved {
        /// The removed product's id
        id: ProductId,
        /// When it was removed
        timestamp: DateTime<Utc>,
    },
    /// Event: a size slot now holds a new absolute quantity
    #[event]
    StockUpdated {
        /// The updated product
        id: ProductId,
        /// The updated slot
        size: Size,
        /// The resulting absolute quantity
        quantity: u32,
        /// When it changed
        timestamp: DateTime<Utc>,
    },
    /// Event: a product's price changed
    #[event]
    PriceUpdated {
        /// The updated product
        id: ProductId,
        /// The new unit price
        price: Money,
        /// When it changed
        timestamp: DateTime<Utc>,
    },
    /// Event: a product was renamed
    #[event]
    ProductRenamed {
        /// The renamed product
        id: ProductId,
        /// The new name
        name: String,
        /// When it changed
        timestamp: DateTime<Utc>,
    },
    /// Event: a product moved to another placement
    #[event]
    ProductMoved {
        /// The moved product
        id: ProductId,
        /// The validated new placement
        placement: Placement,
        /// When it moved
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

/// Reducer for the inventory aggregate
#[derive(Clone, Copy, Debug, Default)]
pub struct InventoryReducer;

impl InventoryReducer {
    /// Creates a new inventory reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn validate_new_name(
        state: &InventoryState,
        name: &str,
        exempt: Option<ProductId>,
    ) -> Result<(), String> {
        if name.is_empty() {
            return Err("product name cannot be empty".to_string());
        }
        if name.contains(',') || name.contains('|') {
            return Err(format!("product name cannot contain ',' or '|': {name}"));
        }
        match state.by_name.get(name) {
            Some(&holder) if Some(holder) != exempt => {
                Err(format!("product name already in use: {name}"))
            },
            _ => Ok(()),
        }
    }

    fn validate_exists(state: &InventoryState, id: ProductId) -> Result<(), String> {
        if state.products.contains_key(&id) {
            Ok(())
        } else {
            Err(format!("product {id} not found"))
        }
    }

    fn validate_slot(state: &InventoryState, id: ProductId, size: Size) -> Result<(), String> {
        Self::validate_exists(state, id)?;
        let product = &state.products[&id];
        if product.stock.is_legal(size) {
            Ok(())
        } else if product.has_size() {
            Err(format!("product {id} is sized, pick one of XS..XL"))
        } else {
            Err(format!("product {id} has no sizes"))
        }
    }

    fn fail(state: &mut InventoryState, error: String) -> SmallVec<[Effect<EngineAction>; 4]> {
        Self::apply_event(state, &InventoryAction::ValidationFailed { error });
        SmallVec::new()
    }

    /// Processes one inventory action against the state
    pub(crate) fn reduce(
        state: &mut InventoryState,
        action: InventoryAction,
        env: &EngineEnvironment,
    ) -> SmallVec<[Effect<EngineAction>; 4]> {
        match action {
            InventoryAction::AddProduct {
                name,
                category,
                section,
                price,
                stock,
            } => {
                // Validate command
                let name = name.trim().to_string();
                if let Err(error) = Self::validate_new_name(state, &name, None) {
                    return Self::fail(state, error);
                }
                let placement = match Placement::resolve(category, section) {
                    Ok(placement) => placement,
                    Err(error) => return Self::fail(state, error),
                };

                // Create event
                let product = Product::new(
                    state.next_id(),
                    name,
                    placement,
                    price,
                    SizeStock::from(stock),
                );
                let event = InventoryAction::ProductAdded {
                    product,
                    timestamp: env.clock.now(),
                };

                // Apply event to state
                Self::apply_event(state, &event);
                SmallVec::new()
            },

            InventoryAction::RemoveProduct { id } => {
                // Validate command
                if let Err(error) = Self::validate_exists(state, id) {
                    return Self::fail(state, error);
                }

                // Create event
                let event = InventoryAction::ProductRemoved {
                    id,
                    timestamp: env.clock.now(),
                };

                // Apply event to state
                Self::apply_event(state, &event);
                SmallVec::new()
            },

            InventoryAction::SetStock { id, size, quantity } => {
                // Validate command
                if let Err(error) = Self::validate_slot(state, id, size) {
                    return Self::fail(state, error);
                }

                // Create event
                let event = InventoryAction::StockUpdated {
                    id,
                    size,
                    quantity,
                    timestamp: env.clock.now(),
                };

                // Apply event to state
                Self::apply_event(state, &event);
                SmallVec::new()
            },

            InventoryAction::AdjustStock { id, size, delta } => {
                // Validate command
                if let Err(error) = Self::validate_slot(state, id, size) {
                    return Self::fail(state, error);
                }
                let current = state.products[&id].stock.available(size);
                let adjusted = i64::from(current) + delta;
                let Ok(quantity) = u32::try_from(adjusted) else {
                    return Self::fail(
                        state,
                        format!(
                            "stock for {id} size {size} cannot change by {delta} from {current}"
                        ),
                    );
                };

                // Create event
                let event = InventoryAction::StockUpdated {
                    id,
                    size,
                    quantity,
                    timestamp: env.clock.now(),
                };

                // Apply event to state
                Self::apply_event(state, &event);
                SmallVec::new()
            },

            InventoryAction::SetPrice { id, price } => {
                // Validate command
                if let Err(error) = Self::validate_exists(state, id) {
                    return Self::fail(state, error);
                }

                // Create event
                let event = InventoryAction::PriceUpdated {
                    id,
                    price,
                    timestamp: env.clock.now(),
                };

                // Apply event to state
                Self::apply_event(state, &event);
                SmallVec::new()
            },

            InventoryAction::RenameProduct { id, name } => {
                // Validate command
                let name = name.trim().to_string();
                if let Err(error) = Self::validate_exists(state, id) {
                    return Self::fail(state, error);
                }
                if let Err(error) = Self::validate_new_name(state, &name, Some(id)) {
                    return Self::fail(state, error);
                }

                // Create event
                let event = InventoryAction::ProductRenamed {
                    id,
                    name,
                    timestamp: env.clock.now(),
                };

                // Apply event to state
                Self::apply_event(state, &event);
                SmallVec::new()
            },

            InventoryAction::MoveProduct { id, category, section } => {
                // Validate command
                if let Err(error) = Self::validate_exists(state, id) {
                    return Self::fail(state, error);
                }
                let placement = match Placement::resolve(category, section) {
                    Ok(placement) => placement,
                    Err(error) => return Self::fail(state, error),
                };

                // Create event
                let event = InventoryAction::ProductMoved {
                    id,
                    placement,
                    timestamp: env.clock.now(),
                };

                // Apply event to state
                Self::apply_event(state, &event);
                SmallVec::new()
            },

            // Events are applied (for replay or external events)
            InventoryAction::ProductAdded { .. }
            | InventoryAction::ProductRemoved { .. }
            | InventoryAction::StockUpdated { .. }
            | InventoryAction::PriceUpdated { .. }
            | InventoryAction::ProductRenamed { .. }
            | InventoryAction::ProductMoved { .. }
            | InventoryAction::ValidationFailed { .. } => {
                Self::apply_event(state, &action);
                SmallVec::new()
            },
        }
    }

    /// Applies an event to the state; the only place indexes are mutated
    fn apply_event(state: &mut InventoryState, action: &InventoryAction) {
        match action {
            InventoryAction::ProductAdded { product, .. } => {
                state.last_error = None;
                state.next_id = state.next_id.max(product.id.value() + 1);
                state.index_product(product.clone());
            },
            InventoryAction::ProductRemoved { id, .. } => {
                state.last_error = None;
                state.unindex_product(*id);
            },
            InventoryAction::StockUpdated { id, size, quantity, .. } => {
                state.last_error = None;
                if let Some(product) = state.products.get_mut(id) {
                    if let Err(error) = product.stock.set(*size, *quantity) {
                        tracing::error!(%id, %error, "stock event contradicts size mode");
                    }
                }
            },
            InventoryAction::PriceUpdated { id, price, .. } => {
                state.last_error = None;
                if let Some(product) = state.products.get_mut(id) {
                    product.price = *price;
                }
            },
            InventoryAction::ProductRenamed { id, name, .. } => {
                state.last_error = None;
                if let Some(product) = state.products.get_mut(id) {
                    state.by_name.remove(&product.name);
                    product.name.clone_from(name);
                    state.by_name.insert(name.clone(), *id);
                }
            },
            InventoryAction::ProductMoved { id, placement, .. } => {
                state.last_error = None;
                if let Some(product) = state.unindex_product(*id) {
                    let moved = Product { placement: *placement, ..product };
                    state.index_product(moved);
                }
            },
            InventoryAction::ValidationFailed { error } => {
                state.last_error = Some(error.clone());
            },
            _ => {
                // Commands are not applied to state
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use shopkeeper_testing::{ReducerTest, assertions, test_clock};

    use super::*;
    use crate::engine::{EngineReducer, EngineState};
    use crate::persistence::MemoryLedgerStore;

    fn create_test_env() -> EngineEnvironment {
        EngineEnvironment::new(Arc::new(test_clock()), Arc::new(MemoryLedgerStore::new()))
    }

    fn add_product_action(name: &str) -> EngineAction {
        EngineAction::Inventory(InventoryAction::AddProduct {
            name: name.to_string(),
            category: Category::Men,
            section: Section::Eastern,
            price: Money::from_dollars(100),
            stock: StockInit::Sized { xs: 0, s: 5, m: 0, l: 0, xl: 0 },
        })
    }

    fn state_with_shirt() -> EngineState {
        let mut state = EngineState::default();
        InventoryReducer::reduce(
            &mut state.inventory,
            InventoryAction::AddProduct {
                name: "Shirt".to_string(),
                category: Category::Men,
                section: Section::Eastern,
                price: Money::from_dollars(100),
                stock: StockInit::Sized { xs: 0, s: 5, m: 0, l: 0, xl: 0 },
            },
            &create_test_env(),
        );
        state
    }

    #[test]
    fn add_product_assigns_sequential_ids() {
        ReducerTest::new(EngineReducer::new())
            .with_env(create_test_env())
            .given_state(EngineState::default())
            .when_action(add_product_action("Shirt"))
            .then_state(|state| {
                let id = state.inventory.id_by_name("Shirt").unwrap();
                assert_eq!(id, ProductId::new(1));
                assert_eq!(state.inventory.next_id(), ProductId::new(2));
                assert_eq!(state.inventory.last_error, None);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn duplicate_name_is_rejected() {
        ReducerTest::new(EngineReducer::new())
            .with_env(create_test_env())
            .given_state(state_with_shirt())
            .when_action(add_product_action("Shirt"))
            .then_state(|state| {
                assert_eq!(state.inventory.count(), 1);
                assert!(state.inventory.last_error.as_deref().unwrap().contains("already in use"));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn name_with_delimiter_is_rejected() {
        ReducerTest::new(EngineReducer::new())
            .with_env(create_test_env())
            .given_state(EngineState::default())
            .when_action(add_product_action("a,b"))
            .then_state(|state| {
                assert!(state.inventory.is_empty());
                assert!(state.inventory.last_error.is_some());
            })
            .run();
    }

    #[test]
    fn removed_id_is_never_reused() {
        let mut state = state_with_shirt();
        let env = create_test_env();
        InventoryReducer::reduce(
            &mut state.inventory,
            InventoryAction::RemoveProduct { id: ProductId::new(1) },
            &env,
        );
        assert!(state.inventory.is_empty());
        InventoryReducer::reduce(
            &mut state.inventory,
            InventoryAction::AddProduct {
                name: "Scarf".to_string(),
                category: Category::Other,
                section: Section::Other,
                price: Money::from_dollars(5),
                stock: StockInit::Sizeless { quantity: 3 },
            },
            &env,
        );
        assert_eq!(state.inventory.id_by_name("Scarf"), Some(ProductId::new(2)));
    }

    #[test]
    fn set_stock_rejects_wrong_mode_slot() {
        ReducerTest::new(EngineReducer::new())
            .with_env(create_test_env())
            .given_state(state_with_shirt())
            .when_action(EngineAction::Inventory(InventoryAction::SetStock {
                id: ProductId::new(1),
                size: Size::None,
                quantity: 9,
            }))
            .then_state(|state| {
                let product = state.inventory.product(ProductId::new(1)).unwrap();
                assert_eq!(product.stock.available(Size::None), 0);
                assert!(state.inventory.last_error.is_some());
            })
            .run();
    }

    #[test]
    fn adjust_stock_rejects_negative_result() {
        let mut state = state_with_shirt();
        let env = create_test_env();
        InventoryReducer::reduce(
            &mut state.inventory,
            InventoryAction::AdjustStock { id: ProductId::new(1), size: Size::S, delta: -6 },
            &env,
        );
        let product = state.inventory.product(ProductId::new(1)).unwrap();
        assert_eq!(
            product.stock.available(Size::S),
            5,
            "rejected adjustment must not change stock"
        );
        assert!(state.inventory.last_error.is_some());

        InventoryReducer::reduce(
            &mut state.inventory,
            InventoryAction::AdjustStock { id: ProductId::new(1), size: Size::S, delta: -5 },
            &env,
        );
        let product = state.inventory.product(ProductId::new(1)).unwrap();
        assert_eq!(product.stock.available(Size::S), 0);
        assert_eq!(state.inventory.last_error, None);
    }

    #[test]
    fn rename_rejects_duplicate_but_allows_own_name() {
        let mut state = state_with_shirt();
        let env = create_test_env();
        InventoryReducer::reduce(
            &mut state.inventory,
            InventoryAction::AddProduct {
                name: "Coat".to_string(),
                category: Category::Men,
                section: Section::Western,
                price: Money::from_dollars(250),
                stock: StockInit::Sized { xs: 1, s: 1, m: 1, l: 1, xl: 1 },
            },
            &env,
        );

        InventoryReducer::reduce(
            &mut state.inventory,
            InventoryAction::RenameProduct { id: ProductId::new(2), name: "Shirt".to_string() },
            &env,
        );
        assert!(state.inventory.last_error.is_some());
        assert_eq!(state.inventory.id_by_name("Coat"), Some(ProductId::new(2)));

        InventoryReducer::reduce(
            &mut state.inventory,
            InventoryAction::RenameProduct { id: ProductId::new(2), name: "Coat".to_string() },
            &env,
        );
        assert_eq!(state.inventory.last_error, None);

        InventoryReducer::reduce(
            &mut state.inventory,
            InventoryAction::RenameProduct { id: ProductId::new(2), name: "Jacket".to_string() },
            &env,
        );
        assert_eq!(state.inventory.id_by_name("Jacket"), Some(ProductId::new(2)));
        assert_eq!(state.inventory.id_by_name("Coat"), None);
    }

    #[test]
    fn move_relocates_placement_bucket() {
        let mut state = state_with_shirt();
        let env = create_test_env();
        InventoryReducer::reduce(
            &mut state.inventory,
            InventoryAction::MoveProduct {
                id: ProductId::new(1),
                category: Category::Women,
                section: Section::Western,
            },
            &env,
        );
        let placement = Placement::resolve(Category::Women, Section::Western).unwrap();
        assert_eq!(state.inventory.list_in(placement).len(), 1);
        assert_eq!(
            state
                .inventory
                .list_in(Placement::resolve(Category::Men, Section::Eastern).unwrap())
                .len(),
            0
        );
        assert_eq!(state.inventory.product(ProductId::new(1)).unwrap().placement, placement);
    }

    #[test]
    fn move_rejects_invalid_pair_and_keeps_bucket() {
        let mut state = state_with_shirt();
        let env = create_test_env();
        InventoryReducer::reduce(
            &mut state.inventory,
            InventoryAction::MoveProduct {
                id: ProductId::new(1),
                category: Category::Kids,
                section: Section::Eastern,
            },
            &env,
        );
        assert!(state.inventory.last_error.is_some());
        let original = Placement::resolve(Category::Men, Section::Eastern).unwrap();
        assert_eq!(state.inventory.list_in(original).len(), 1);
    }

    #[test]
    fn listings_follow_placement_order() {
        let mut state = EngineState::default();
        let env = create_test_env();
        for (name, category, section) in [
            ("Zipper", Category::Other, Section::Other),
            ("Dress", Category::Women, Section::Eastern),
            ("Cap", Category::Kids, Section::Boys),
            ("Shirt", Category::Men, Section::Eastern),
        ] {
            InventoryReducer::reduce(
                &mut state.inventory,
                InventoryAction::AddProduct {
                    name: name.to_string(),
                    category,
                    section,
                    price: Money::from_dollars(10),
                    stock: StockInit::Sizeless { quantity: 1 },
                },
                &env,
            );
        }
        let names: Vec<&str> = state.inventory.list_all().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Shirt", "Dress", "Cap", "Zipper"]);
        let women: Vec<&str> = state
            .inventory
            .list_by_category(Category::Women)
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(women, vec!["Dress"]);
    }

    #[test]
    fn from_parts_skips_colliding_rows_and_advances_next_id() {
        let placement = Placement::resolve(Category::Men, Section::Eastern).unwrap();
        let product = |id: u32, name: &str| {
            Product::new(
                ProductId::new(id),
                name.to_string(),
                placement,
                Money::from_dollars(10),
                SizeStock::new_sized(1, 1, 1, 1, 1),
            )
        };
        let state = InventoryState::from_parts(
            2,
            vec![product(1, "Shirt"), product(1, "Clone"), product(7, "Shirt"), product(7, "Coat")],
        );
        assert_eq!(state.count(), 2, "duplicate id and duplicate name rows are dropped");
        assert_eq!(state.next_id(), ProductId::new(8));
        assert_eq!(state.id_by_name("Shirt"), Some(ProductId::new(1)));
        assert_eq!(state.id_by_name("Coat"), Some(ProductId::new(7)));
    }
}
