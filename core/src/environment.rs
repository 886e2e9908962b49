//! Dependency injection traits.
//!
//! Feature-specific collaborators (persistence APIs, notifiers) live with the
//! feature; only the ones every feature needs are defined here.

use chrono::{DateTime, NaiveDate, Utc};

/// Clock trait - abstracts time operations for testability
///
/// # Examples
///
/// ```
/// use innkeep_core::environment::{Clock, SystemClock};
///
/// let clock = SystemClock;
/// assert!(clock.today() <= clock.now().date_naive());
/// ```
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Utc>;

    /// The current calendar date in UTC
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Production clock backed by the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
