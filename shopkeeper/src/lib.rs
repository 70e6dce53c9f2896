//! Single-tenant retail inventory and checkout engine.
//!
//! State lives in one [`EngineState`](engine::EngineState) and changes only
//! through actions sent to a [`Store`](shopkeeper_core::Store) running the
//! [`EngineReducer`](engine::EngineReducer). Commands validate against
//! current state and emit events; events are the only thing that mutates
//! state, so every aggregate can be replayed or tested in isolation.
//!
//! The aggregates:
//!
//! - [`aggregates::inventory`]: the product catalog with sized (XS to XL)
//!   and one-size stock, bucketed by category and section
//! - [`aggregates::cart`]: per-actor carts with accumulate and overwrite
//!   semantics
//! - [`aggregates::checkout`]: the shortage-scan, resolve, commit state
//!   machine; the only place stock is deducted
//! - [`aggregates::ledger`]: per-actor transaction books with an oversight
//!   view across all of them
//! - [`aggregates::roster`]: accounts, admin approval, and loyalty tiers
//!
//! Persistence is plain line-oriented text under a data directory; see
//! [`persistence`] for the file formats and the [`persistence::LedgerStore`]
//! seam the checkout commit writes through.
//!
//! ```
//! use std::sync::Arc;
//!
//! use shopkeeper::aggregates::inventory::InventoryAction;
//! use shopkeeper::engine::{EngineAction, EngineEnvironment, EngineReducer, EngineState};
//! use shopkeeper::persistence::MemoryLedgerStore;
//! use shopkeeper::types::{Category, Money, Section, StockInit};
//! use shopkeeper_core::{Store, SystemClock};
//!
//! let env = EngineEnvironment::new(Arc::new(SystemClock), Arc::new(MemoryLedgerStore::new()));
//! let mut store = Store::new(EngineState::new(), EngineReducer::new(), env);
//! store.send(EngineAction::Inventory(InventoryAction::AddProduct {
//!     name: "Shirt".to_string(),
//!     category: Category::Men,
//!     section: Section::Eastern,
//!     price: Money::from_dollars(100),
//!     stock: StockInit::Sized { xs: 0, s: 5, m: 2, l: 0, xl: 0 },
//! }));
//! assert_eq!(store.state().inventory.count(), 1);
//! ```

pub mod aggregates;
pub mod config;
pub mod engine;
pub mod persistence;
pub mod shell;
pub mod types;

pub use config::Config;
pub use engine::{EngineAction, EngineEnvironment, EngineReducer, EngineState};
