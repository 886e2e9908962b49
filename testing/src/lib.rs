//! # Innkeep Testing
//!
//! Testing utilities for Innkeep reducers.
//!
//! This crate provides:
//! - `FixedClock`, a deterministic `Clock`
//! - `ReducerTest`, a Given/When/Then harness for reducers
//! - Effect assertion helpers
//!
//! ## Example
//!
//! ```ignore
//! use innkeep_testing::{test_clock, ReducerTest};
//!
//! ReducerTest::new(BookingReducer::default())
//!     .with_env(environment(test_clock()))
//!     .given_state(BookingState::default())
//!     .when_action(BookingAction::ConfirmBooking { session, booking_id })
//!     .then_state(|state| assert!(state.last_error.is_some()))
//!     .run();
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use innkeep_core::environment::Clock;

/// Ergonomic Given/When/Then reducer tests
pub mod reducer_test;

pub use reducer_test::{assertions, ReducerTest};

/// Mock implementations of core Environment traits
pub mod mocks {
    use super::{Clock, DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// # Example
    ///
    /// ```
    /// use innkeep_testing::mocks::FixedClock;
    /// use innkeep_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone, Copy)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }

        /// A clock frozen at midnight UTC on `date`
        #[must_use]
        pub fn on(date: NaiveDate) -> Self {
            let midnight = NaiveDateTime::new(date, chrono::NaiveTime::default());
            Self::new(Utc.from_utc_datetime(&midnight))
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2024-04-15 09:00:00 UTC)
    ///
    /// # Panics
    ///
    /// Panics if the hardcoded timestamp fails to parse, which cannot happen.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2024-04-15T09:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

/// Install a test-friendly `tracing` subscriber
///
/// Honours `RUST_LOG`; safe to call from every test since only the first
/// call installs anything.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .try_init();
}

pub use mocks::{test_clock, FixedClock};
