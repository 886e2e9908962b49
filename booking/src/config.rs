//! Configuration management for the booking desk.
//!
//! Loads configuration from environment variables with sensible defaults.
//! Unknown or malformed values fall back to the default.

use crate::capacity::CapacityPolicy;
use crate::lifecycle::{BookingLifecycle, GuestManagement};
use crate::pricing::{PriceCalculator, RateMode};
use serde::{Deserialize, Serialize};
use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Booking rules
    pub lifecycle: LifecycleConfig,
    /// Tracing filter directive used when `RUST_LOG` is not set
    pub log_level: String,
}

/// Business-rule variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleConfig {
    /// How the nightly rate scales (`BOOKING_RATE_MODE`: `per_room` | `per_guest`)
    pub rate_mode: RateMode,
    /// When guests may be managed (`BOOKING_GUEST_MANAGEMENT`: `confirmed_only` | `open`)
    pub guest_management: GuestManagement,
    /// Active bookings per account (`BOOKING_MAX_ACTIVE_PER_USER`, unset = unlimited)
    pub max_active_bookings_per_user: Option<usize>,
}

impl Config {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup` instead of the process environment.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            lifecycle: LifecycleConfig {
                rate_mode: lookup("BOOKING_RATE_MODE")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_default(),
                guest_management: lookup("BOOKING_GUEST_MANAGEMENT")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_default(),
                max_active_bookings_per_user: lookup("BOOKING_MAX_ACTIVE_PER_USER")
                    .and_then(|s| s.parse().ok()),
            },
            log_level: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl LifecycleConfig {
    /// Lifecycle enforcing these rules
    #[must_use]
    pub fn build(&self) -> BookingLifecycle {
        let capacity = match self.max_active_bookings_per_user {
            Some(limit) => CapacityPolicy::new().with_max_active_bookings(limit),
            None => CapacityPolicy::new(),
        };
        BookingLifecycle::new(capacity, PriceCalculator::new(self.rate_mode), self.guest_management)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults_are_canonical_rules() {
        let config = Config::default();
        assert_eq!(config.lifecycle.rate_mode, RateMode::PerRoom);
        assert_eq!(config.lifecycle.guest_management, GuestManagement::ConfirmedOnly);
        assert_eq!(config.lifecycle.max_active_bookings_per_user, None);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.lifecycle.build(), BookingLifecycle::default());
    }

    #[test]
    fn variants_are_read_from_the_environment() {
        let config = Config::from_lookup(lookup(&[
            ("BOOKING_RATE_MODE", "per_guest"),
            ("BOOKING_GUEST_MANAGEMENT", "open"),
            ("BOOKING_MAX_ACTIVE_PER_USER", "3"),
            ("RUST_LOG", "innkeep_booking=debug"),
        ]));
        let lifecycle = config.lifecycle.build();
        assert_eq!(lifecycle.pricing().mode(), RateMode::PerGuest);
        assert_eq!(lifecycle.guest_management(), GuestManagement::OpenBookings);
        assert_eq!(lifecycle.capacity().max_active_bookings(), Some(3));
        assert_eq!(config.log_level, "innkeep_booking=debug");
    }

    #[test]
    fn malformed_values_fall_back_to_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("BOOKING_RATE_MODE", "per_night"),
            ("BOOKING_MAX_ACTIVE_PER_USER", "many"),
        ]));
        assert_eq!(config.lifecycle.rate_mode, RateMode::PerRoom);
        assert_eq!(config.lifecycle.max_active_bookings_per_user, None);
    }
}
