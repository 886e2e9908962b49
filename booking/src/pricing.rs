//! Total price computation.

use crate::error::{BookingError, Result};
use crate::types::Money;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the nightly rate scales with the party
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateMode {
    /// The rate is for the room, whoever sleeps in it
    #[default]
    PerRoom,
    /// The rate is charged for every guest
    PerGuest,
}

impl FromStr for RateMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "per_room" | "room" => Ok(Self::PerRoom),
            "per_guest" | "guest" => Ok(Self::PerGuest),
            other => Err(format!("unknown rate mode: {other}")),
        }
    }
}

impl fmt::Display for RateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PerRoom => "per_room",
            Self::PerGuest => "per_guest",
        })
    }
}

/// Computes booking totals
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceCalculator {
    mode: RateMode,
}

impl PriceCalculator {
    /// Calculator for the given mode
    #[must_use]
    pub const fn new(mode: RateMode) -> Self {
        Self { mode }
    }

    /// Configured mode
    #[must_use]
    pub const fn mode(&self) -> RateMode {
        self.mode
    }

    /// `nights × rate`, times the guest count in [`RateMode::PerGuest`]
    ///
    /// Zero nights are billed as one.
    ///
    /// # Errors
    ///
    /// [`BookingError::PriceOverflow`] if the total does not fit in [`Money`].
    pub fn compute(&self, nights: u32, rate_per_night: Money, guest_count: u32) -> Result<Money> {
        let nights = nights.max(1);
        let multiplier = match self.mode {
            RateMode::PerRoom => 1,
            RateMode::PerGuest => guest_count.max(1),
        };
        rate_per_night
            .checked_mul(u64::from(nights))
            .and_then(|total| total.checked_mul(u64::from(multiplier)))
            .ok_or(BookingError::PriceOverflow { nights })
    }
}
