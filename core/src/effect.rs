//! Side effect descriptions.
//!
//! Effects are NOT executed immediately. They are descriptions of what should
//! happen, returned from reducers and executed by the [`Store`](crate::Store)
//! after the state transition. An effect's outcome re-enters the store as
//! another action, so reducers stay pure while still driving persistence.

/// A deferred side effect produced by a reducer.
///
/// # Type Parameters
///
/// - `Action`: the action type an effect can produce (feedback loop)
pub enum Effect<Action> {
    /// No-op effect
    None,

    /// A blocking computation run by the store after the state transition.
    ///
    /// Returns `Option<Action>` - if `Some`, the action is fed back into the
    /// reducer.
    Task(Box<dyn FnOnce() -> Option<Action> + Send>),

    /// Run effects sequentially, in order
    Sequential(Vec<Effect<Action>>),
}

impl<Action> Effect<Action> {
    /// Wrap a blocking computation whose result feeds back into the store.
    pub fn task<F>(f: F) -> Self
    where
        F: FnOnce() -> Option<Action> + Send + 'static,
    {
        Self::Task(Box::new(f))
    }

    /// Chain effects to run sequentially
    #[must_use]
    pub const fn chain(effects: Vec<Self>) -> Self {
        Self::Sequential(effects)
    }

    /// `true` when this effect performs no work
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

// Manual Debug implementation since Task closures don't implement Debug
impl<Action> std::fmt::Debug for Effect<Action>
where
    Action: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "Effect::None"),
            Self::Task(_) => write!(f, "Effect::Task(<task>)"),
            Self::Sequential(effects) => {
                f.debug_tuple("Effect::Sequential").field(effects).finish()
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn task_produces_feedback_action() {
        let effect: Effect<u32> = Effect::task(|| Some(7));
        let Effect::Task(task) = effect else {
            panic!("expected a task effect");
        };
        assert_eq!(task(), Some(7));
    }

    #[test]
    fn task_may_produce_nothing() {
        let effect: Effect<u32> = Effect::task(|| None);
        let Effect::Task(task) = effect else {
            panic!("expected a task effect");
        };
        assert_eq!(task(), None);
    }

    #[test]
    fn chain_preserves_order() {
        let effect: Effect<u32> = Effect::chain(vec![Effect::None, Effect::task(|| Some(1))]);
        let Effect::Sequential(effects) = effect else {
            panic!("expected a sequential effect");
        };
        assert_eq!(effects.len(), 2);
        assert!(effects[0].is_none());
        assert!(!effects[1].is_none());
    }

    #[test]
    fn debug_hides_task_internals() {
        let effect: Effect<u32> = Effect::task(|| None);
        assert_eq!(format!("{effect:?}"), "Effect::Task(<task>)");
        let none: Effect<u32> = Effect::None;
        assert_eq!(format!("{none:?}"), "Effect::None");
    }
}
