//! Reducers hold all business logic.
//!
//! A reducer validates an action against the current state, mutates the state
//! in place and returns the effects the runtime should execute next.

use crate::effect::Effect;
use smallvec::SmallVec;

/// Inline-allocated list of effects returned from a single reduction.
///
/// Most reductions produce zero or one effect, so four inline slots avoid a
/// heap allocation on the hot path.
pub type Effects<Action> = SmallVec<[Effect<Action>; 4]>;

/// The Reducer trait
///
/// # Type Parameters
///
/// - `State`: The domain state this reducer operates on
/// - `Action`: The action type this reducer processes
/// - `Environment`: The injected dependencies this reducer needs
pub trait Reducer {
    /// The state type this reducer operates on
    type State;

    /// The action type this reducer processes
    type Action;

    /// The environment type with injected dependencies
    type Environment;

    /// Reduce an action into state changes and effects
    ///
    /// Implementations must be deterministic for a given state, action and
    /// environment: any time or I/O they need comes through `env`.
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> Effects<Self::Action>;
}
