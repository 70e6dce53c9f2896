//! The core trait for business logic.
//!
//! Reducers contain all business logic. They validate the incoming action,
//! update state in place, and return effect descriptions; they never perform
//! I/O themselves, which keeps them deterministic and testable without any
//! console or filesystem.

use smallvec::SmallVec;

use crate::effect::Effect;

/// The Reducer trait - core abstraction for business logic.
///
/// # Example
///
/// ```ignore
/// impl Reducer for InventoryReducer {
///     type State = InventoryState;
///     type Action = InventoryAction;
///     type Environment = EngineEnvironment;
///
///     fn reduce(
///         &self,
///         state: &mut InventoryState,
///         action: InventoryAction,
///         env: &EngineEnvironment,
///     ) -> SmallVec<[Effect<InventoryAction>; 4]> {
///         match action {
///             InventoryAction::AddProduct { .. } => {
///                 // validate, apply the resulting event, return effects
///                 SmallVec::new()
///             }
///             _ => SmallVec::new(),
///         }
///     }
/// }
/// ```
pub trait Reducer {
    /// The state type this reducer operates on
    type State;

    /// The action type this reducer processes
    type Action;

    /// The environment type with injected dependencies
    type Environment;

    /// Reduce an action into state changes and effects.
    ///
    /// 1. Validates the action
    /// 2. Updates state in place
    /// 3. Returns effect descriptions to be executed by the store
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]>;
}
