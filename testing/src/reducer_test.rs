//! Ergonomic testing utilities for reducers
//!
//! A fluent Given-When-Then API. `run` checks a single reduction and the
//! effect descriptions it returns; `run_with_feedback` also executes those
//! effects through a [`Store`] and checks the actions they fed back.

#![allow(clippy::module_name_repetitions)] // ReducerTest is the natural name

use innkeep_core::{effect::Effect, reducer::Reducer};
use innkeep_runtime::Store;

/// Type alias for state assertion functions
type StateAssertion<S> = Box<dyn FnOnce(&S)>;

/// Type alias for effect assertion functions
type EffectAssertion<A> = Box<dyn FnOnce(&[Effect<A>])>;

/// Type alias for feedback assertion functions
type FeedbackAssertion<A> = Box<dyn FnOnce(&[A])>;

/// Fluent API for testing reducers with Given-When-Then syntax
///
/// # Example
///
/// ```ignore
/// ReducerTest::new(BookingReducer::default())
///     .with_env(environment())
///     .given_state(BookingState::with_booking(pending))
///     .when_action(BookingAction::CompleteBooking { session, booking_id })
///     .then_state(|state| assert!(state.last_error.is_some()))
///     .then_effects(assertions::assert_has_future_effect)
///     .run();
/// ```
pub struct ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    reducer: R,
    environment: Option<E>,
    initial_state: Option<S>,
    action: Option<A>,
    state_assertions: Vec<StateAssertion<S>>,
    effect_assertions: Vec<EffectAssertion<A>>,
    feedback_assertions: Vec<FeedbackAssertion<A>>,
}

impl<R, S, A, E> ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    /// Create a new reducer test with the given reducer
    #[must_use]
    pub const fn new(reducer: R) -> Self {
        Self {
            reducer,
            environment: None,
            initial_state: None,
            action: None,
            state_assertions: Vec::new(),
            effect_assertions: Vec::new(),
            feedback_assertions: Vec::new(),
        }
    }

    /// Set the environment for the test
    #[must_use]
    pub fn with_env(mut self, env: E) -> Self {
        self.environment = Some(env);
        self
    }

    /// Set the initial state (Given)
    #[must_use]
    pub fn given_state(mut self, state: S) -> Self {
        self.initial_state = Some(state);
        self
    }

    /// Set the action to test (When)
    #[must_use]
    pub fn when_action(mut self, action: A) -> Self {
        self.action = Some(action);
        self
    }

    /// Add an assertion about the resulting state (Then)
    #[must_use]
    pub fn then_state<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&S) + 'static,
    {
        self.state_assertions.push(Box::new(assertion));
        self
    }

    /// Add an assertion about the effects of the reduction (Then)
    ///
    /// Only checked by [`ReducerTest::run`].
    #[must_use]
    pub fn then_effects<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&[Effect<A>]) + 'static,
    {
        self.effect_assertions.push(Box::new(assertion));
        self
    }

    /// Add an assertion about the actions fed back by executed effects (Then)
    ///
    /// Only checked by [`ReducerTest::run_with_feedback`].
    #[must_use]
    pub fn then_feedback<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&[A]) + 'static,
    {
        self.feedback_assertions.push(Box::new(assertion));
        self
    }

    /// Run one reduction and execute state and effect assertions
    ///
    /// # Panics
    ///
    /// Panics if initial state, action, or environment is not set,
    /// or if any assertions fail.
    #[allow(clippy::expect_used)] // Test code can use expect
    pub fn run(self) {
        let mut state = self
            .initial_state
            .expect("Initial state must be set with given_state()");
        let action = self.action.expect("Action must be set with when_action()");
        let env = self
            .environment
            .expect("Environment must be set with with_env()");

        let effects = self.reducer.reduce(&mut state, action, &env);

        for assertion in self.state_assertions {
            assertion(&state);
        }
        for assertion in self.effect_assertions {
            assertion(&effects);
        }
    }
}

impl<R, S, A, E> ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E> + Send + Sync,
    A: Send + Clone + std::fmt::Debug + 'static,
    S: Send + Sync,
    E: Send + Sync,
{
    /// Run the action through a [`Store`], executing effects and reducing
    /// feedback, then execute state and feedback assertions
    ///
    /// # Panics
    ///
    /// Panics if initial state, action, or environment is not set, if the
    /// store reports an error, or if any assertions fail.
    #[allow(clippy::expect_used)] // Test code can use expect
    pub async fn run_with_feedback(self) {
        let state = self
            .initial_state
            .expect("Initial state must be set with given_state()");
        let action = self.action.expect("Action must be set with when_action()");
        let env = self
            .environment
            .expect("Environment must be set with with_env()");

        let store = Store::new(state, self.reducer, env);
        let feedback = store
            .send(action)
            .await
            .expect("store should drive the feedback loop to completion");

        let state_assertions = self.state_assertions;
        store
            .state(move |state| {
                for assertion in state_assertions {
                    assertion(state);
                }
            })
            .await;
        for assertion in self.feedback_assertions {
            assertion(&feedback);
        }
    }
}

/// Helper assertions for effects
pub mod assertions {
    use innkeep_core::effect::Effect;

    /// Assert that there are no effects
    ///
    /// # Panics
    ///
    /// Panics if any effect would do something when executed.
    pub fn assert_no_effects<A: std::fmt::Debug>(effects: &[Effect<A>]) {
        assert!(
            effects.iter().all(Effect::is_none),
            "Expected no effects, but found {}: {:?}",
            effects.len(),
            effects
        );
    }

    /// Assert the number of effects
    ///
    /// # Panics
    ///
    /// Panics if the number of effects doesn't match expected.
    pub fn assert_effects_count<A>(effects: &[Effect<A>], expected: usize) {
        assert_eq!(
            effects.len(),
            expected,
            "Expected {} effects, but found {}",
            expected,
            effects.len()
        );
    }

    /// Assert that effects contain at least one Future effect
    ///
    /// # Panics
    ///
    /// Panics if no Future effect is found.
    pub fn assert_has_future_effect<A>(effects: &[Effect<A>]) {
        assert!(
            effects.iter().any(|e| matches!(e, Effect::Future(_))),
            "Expected at least one Future effect, but none found"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use innkeep_core::{smallvec, Effects};

    #[derive(Clone, Debug)]
    struct RoomState {
        occupied: bool,
    }

    #[derive(Clone, Debug, PartialEq)]
    enum RoomAction {
        Occupy,
        Release,
        RequestRelease,
    }

    struct RoomReducer;

    impl Reducer for RoomReducer {
        type State = RoomState;
        type Action = RoomAction;
        type Environment = ();

        fn reduce(&self, state: &mut RoomState, action: RoomAction, _env: &()) -> Effects<RoomAction> {
            match action {
                RoomAction::Occupy => {
                    state.occupied = true;
                    smallvec![Effect::None]
                },
                RoomAction::Release => {
                    state.occupied = false;
                    smallvec![Effect::None]
                },
                RoomAction::RequestRelease => smallvec![Effect::send(RoomAction::Release)],
            }
        }
    }

    #[test]
    fn single_reduction_updates_state() {
        ReducerTest::new(RoomReducer)
            .with_env(())
            .given_state(RoomState { occupied: false })
            .when_action(RoomAction::Occupy)
            .then_state(|state| assert!(state.occupied))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn effects_are_described_not_run() {
        ReducerTest::new(RoomReducer)
            .with_env(())
            .given_state(RoomState { occupied: true })
            .when_action(RoomAction::RequestRelease)
            .then_state(|state| assert!(state.occupied))
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[tokio::test]
    async fn feedback_runs_through_the_store() {
        ReducerTest::new(RoomReducer)
            .with_env(())
            .given_state(RoomState { occupied: true })
            .when_action(RoomAction::RequestRelease)
            .then_state(|state| assert!(!state.occupied))
            .then_feedback(|actions| assert_eq!(actions, [RoomAction::Release]))
            .run_with_feedback()
            .await;
    }
}
