//! # Innkeep Runtime
//!
//! The Store coordinates reducer execution and effect handling.
//!
//! ## Core Components
//!
//! - **Store**: owns the state, runs the reducer, executes effects
//! - **Feedback loop**: actions produced by effects are reduced in turn until
//!   no effect produces anything further
//!
//! Reductions are serialized behind a write lock; the lock is released while
//! effects run, so readers never wait on I/O.
//!
//! ## Example
//!
//! ```ignore
//! use innkeep_runtime::Store;
//!
//! let store = Store::new(BookingState::default(), reducer, environment);
//!
//! // Every action produced by effects while handling the command
//! let outcome = store.send(BookingAction::ConfirmBooking { .. }).await?;
//!
//! // Read state
//! let count = store.state(|s| s.len()).await;
//! ```

use futures::future::BoxFuture;
use innkeep_core::{effect::Effect, reducer::Reducer};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;

pub use error::StoreError;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// Effects kept feeding actions back beyond the configured bound
        ///
        /// Almost always a reducer bug: an event that re-triggers the command
        /// that produced it.
        #[error("Feedback loop exceeded {limit} reductions for a single send")]
        FeedbackLimitExceeded {
            /// Configured maximum number of reductions per `send`
            limit: usize,
        },
    }
}

/// Store configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Maximum reductions (initial action plus feedback) per `send`
    pub max_reductions_per_send: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_reductions_per_send: 64,
        }
    }
}

/// Store implementation
pub mod store {
    use super::{Arc, BoxFuture, Effect, Reducer, RwLock, StoreConfig, StoreError, VecDeque};

    /// The Store - runtime coordinator for a reducer
    ///
    /// # Type Parameters
    ///
    /// - `S`: State type
    /// - `A`: Action type
    /// - `E`: Environment type
    /// - `R`: Reducer implementation
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: R,
        environment: E,
        config: StoreConfig,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync,
        A: Send + Clone + std::fmt::Debug + 'static,
        S: Send + Sync,
        E: Send + Sync,
    {
        /// Create a new store with initial state, reducer, and environment
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self::with_config(initial_state, reducer, environment, StoreConfig::default())
        }

        /// Create a new store with an explicit configuration
        #[must_use]
        pub fn with_config(
            initial_state: S,
            reducer: R,
            environment: E,
            config: StoreConfig,
        ) -> Self {
            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer,
                environment,
                config,
            }
        }

        /// Injected dependencies
        #[must_use]
        pub const fn environment(&self) -> &E {
            &self.environment
        }

        /// Send an action and drive the feedback loop to completion
        ///
        /// The action is reduced, its effects are executed, and every action
        /// they produce is reduced in turn. Effects are awaited before `send`
        /// returns; there is no fire-and-forget path.
        ///
        /// # Returns
        ///
        /// Every action produced by effects, in the order it was reduced. The
        /// initial action is not included.
        ///
        /// # Errors
        ///
        /// [`StoreError::FeedbackLimitExceeded`] if more than
        /// `max_reductions_per_send` reductions are needed.
        #[tracing::instrument(skip_all, name = "store_send")]
        pub async fn send(&self, action: A) -> Result<Vec<A>, StoreError> {
            let mut queue = VecDeque::from([action]);
            let mut produced = Vec::new();
            let mut reductions = 0_usize;

            while let Some(next) = queue.pop_front() {
                reductions += 1;
                if reductions > self.config.max_reductions_per_send {
                    tracing::error!(
                        limit = self.config.max_reductions_per_send,
                        "Feedback loop limit exceeded"
                    );
                    return Err(StoreError::FeedbackLimitExceeded {
                        limit: self.config.max_reductions_per_send,
                    });
                }

                tracing::debug!(action = ?next, "Reducing action");
                let effects = {
                    let mut state = self.state.write().await;
                    self.reducer.reduce(&mut state, next, &self.environment)
                };
                metrics::counter!("store.actions.processed").increment(1);

                for effect in effects {
                    for feedback in execute(effect).await {
                        produced.push(feedback.clone());
                        queue.push_back(feedback);
                    }
                }
            }

            Ok(produced)
        }

        /// Read current state via a closure
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&*state)
        }
    }

    /// Execute an effect and collect the actions it feeds back
    fn execute<A>(effect: Effect<A>) -> BoxFuture<'static, Vec<A>>
    where
        A: Send + 'static,
    {
        Box::pin(async move {
            match effect {
                Effect::None => Vec::new(),
                Effect::Future(future) => future.await.into_iter().collect(),
                Effect::Sequential(effects) => {
                    let mut actions = Vec::new();
                    for effect in effects {
                        actions.extend(execute(effect).await);
                    }
                    actions
                },
                Effect::Parallel(effects) => {
                    futures::future::join_all(effects.into_iter().map(execute))
                        .await
                        .into_iter()
                        .flatten()
                        .collect()
                },
            }
        })
    }
}

pub use store::Store;
