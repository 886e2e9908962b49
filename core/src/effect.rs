//! Side effect descriptions.
//!
//! Effects are NOT executed by the reducer that returns them. They are values
//! handed to the `Store`, which runs them and feeds any resulting action back
//! into the reducer.

use std::future::Future;
use std::pin::Pin;

/// Boxed future produced by an [`Effect::Future`].
pub type EffectFuture<Action> = Pin<Box<dyn Future<Output = Option<Action>> + Send>>;

/// Effect type - describes a side effect to be executed
///
/// # Type Parameters
///
/// - `Action`: The action type that effects can produce (feedback loop)
pub enum Effect<Action> {
    /// No-op effect
    None,

    /// Run effects concurrently; feedback is collected in declaration order
    Parallel(Vec<Effect<Action>>),

    /// Run effects one after another
    Sequential(Vec<Effect<Action>>),

    /// Arbitrary async computation
    ///
    /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
    Future(EffectFuture<Action>),
}

impl<Action> std::fmt::Debug for Effect<Action>
where
    Action: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Effect::None => write!(f, "Effect::None"),
            Effect::Parallel(effects) => f.debug_tuple("Effect::Parallel").field(effects).finish(),
            Effect::Sequential(effects) => {
                f.debug_tuple("Effect::Sequential").field(effects).finish()
            },
            Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
        }
    }
}

impl<Action> Effect<Action>
where
    Action: Send + 'static,
{
    /// Wrap an async computation whose output is fed back to the reducer
    #[must_use]
    pub fn future<F>(future: F) -> Self
    where
        F: Future<Output = Option<Action>> + Send + 'static,
    {
        Effect::Future(Box::pin(future))
    }

    /// Feed `action` straight back into the reducer on the next turn
    ///
    /// Used to report outcomes (for example a rejected command) through the
    /// same channel as I/O results, so callers observe them uniformly.
    #[must_use]
    pub fn send(action: Action) -> Self {
        Effect::Future(Box::pin(async move { Some(action) }))
    }

    /// Lift an effect into a parent action type
    #[must_use]
    pub fn map<Parent, F>(self, f: F) -> Effect<Parent>
    where
        Parent: Send + 'static,
        F: Fn(Action) -> Parent + Send + Sync + Clone + 'static,
    {
        match self {
            Effect::None => Effect::None,
            Effect::Parallel(effects) => {
                Effect::Parallel(effects.into_iter().map(|e| e.map(f.clone())).collect())
            },
            Effect::Sequential(effects) => {
                Effect::Sequential(effects.into_iter().map(|e| e.map(f.clone())).collect())
            },
            Effect::Future(future) => {
                Effect::Future(Box::pin(async move { future.await.map(f) }))
            },
        }
    }
}

impl<Action> Effect<Action> {
    /// Combine effects to run in parallel
    #[must_use]
    pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
        Effect::Parallel(effects)
    }

    /// Chain effects to run sequentially
    #[must_use]
    pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
        Effect::Sequential(effects)
    }

    /// Whether this effect does nothing when executed
    #[must_use]
    pub fn is_none(&self) -> bool {
        match self {
            Effect::None => true,
            Effect::Parallel(effects) | Effect::Sequential(effects) => {
                effects.iter().all(Effect::is_none)
            },
            Effect::Future(_) => false,
        }
    }
}
