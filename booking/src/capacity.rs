//! Occupancy rules.

use crate::error::{BookingError, Result};
use crate::types::Room;
use serde::{Deserialize, Serialize};

/// Guest-count and per-account booking limits
///
/// Room capacity is a strict upper bound: a party exactly the size of the room
/// fits. The optional account quota is a separate rule and counts bookings,
/// not guests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityPolicy {
    max_active_bookings: Option<usize>,
}

impl CapacityPolicy {
    /// Policy without an account quota
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_active_bookings: None,
        }
    }

    /// Caps the number of non-terminal bookings one account may hold
    #[must_use]
    pub const fn with_max_active_bookings(mut self, limit: usize) -> Self {
        self.max_active_bookings = Some(limit);
        self
    }

    /// Configured account quota
    #[must_use]
    pub const fn max_active_bookings(&self) -> Option<usize> {
        self.max_active_bookings
    }

    /// Checks a requested guest count against a room
    ///
    /// Returns the count as an unsigned value once accepted.
    ///
    /// # Errors
    ///
    /// - [`BookingError::InvalidGuestCount`] if `guest_count <= 0`
    /// - [`BookingError::CapacityExceeded`] if `guest_count > room_capacity`
    pub fn validate(&self, guest_count: i64, room_capacity: u32) -> Result<u32> {
        if guest_count <= 0 {
            return Err(BookingError::InvalidGuestCount { value: guest_count });
        }
        if guest_count > i64::from(room_capacity) {
            return Err(BookingError::CapacityExceeded {
                guest_count,
                capacity: room_capacity,
            });
        }
        u32::try_from(guest_count).map_err(|_| BookingError::CapacityExceeded {
            guest_count,
            capacity: room_capacity,
        })
    }

    /// Checks the account quota before another booking is created
    ///
    /// # Errors
    ///
    /// [`BookingError::BookingLimitReached`] if `active >= limit`.
    pub fn check_quota(&self, active: usize) -> Result<()> {
        match self.max_active_bookings {
            Some(limit) if active >= limit => Err(BookingError::BookingLimitReached { active, limit }),
            _ => Ok(()),
        }
    }

    /// Rooms open for booking that can hold `guest_count` people
    #[must_use]
    pub fn rooms_for_party<'a>(&self, rooms: &'a [Room], guest_count: u32) -> Vec<&'a Room> {
        rooms
            .iter()
            .filter(|room| room.is_bookable() && room.capacity >= guest_count)
            .collect()
    }
}
