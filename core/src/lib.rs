//! # Innkeep Core
//!
//! The small set of abstractions every Innkeep feature is written against.
//!
//! ## Core Concepts
//!
//! - **State**: owned, cloneable domain state for a feature
//! - **Action**: every input to a reducer (commands from callers, events fed back from effects)
//! - **Reducer**: deterministic `(State, Action, Environment) → Effects`
//! - **Effect**: a description of I/O to perform, never the I/O itself
//! - **Environment**: collaborators injected through traits (`Clock`, persistence APIs, ...)
//!
//! The reducer decides; the runtime (`innkeep-runtime`) executes. Because every
//! side effect is a value returned from `reduce`, business rules can be tested
//! without a network, a database or a wall clock.
//!
//! ## Example
//!
//! ```
//! use innkeep_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
//!
//! #[derive(Clone, Debug, Default)]
//! struct NightCounter {
//!     nights: u32,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum NightAction {
//!     Extend(u32),
//! }
//!
//! struct NightReducer;
//!
//! impl Reducer for NightReducer {
//!     type State = NightCounter;
//!     type Action = NightAction;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut NightCounter,
//!         action: NightAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<NightAction>; 4]> {
//!         match action {
//!             NightAction::Extend(by) => state.nights += by,
//!         }
//!         smallvec![Effect::None]
//!     }
//! }
//!
//! let mut state = NightCounter::default();
//! let effects = NightReducer.reduce(&mut state, NightAction::Extend(2), &());
//! assert_eq!(state.nights, 2);
//! assert_eq!(effects.len(), 1);
//! ```

pub use chrono::{DateTime, NaiveDate, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{smallvec, SmallVec};

/// Effect descriptions returned by reducers
pub mod effect;

/// Injected dependencies shared by every feature
pub mod environment;

/// The `Reducer` trait
pub mod reducer;

pub use effect::Effect;
pub use environment::{Clock, SystemClock};
pub use reducer::{Effects, Reducer};
