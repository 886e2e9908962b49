//! Error types for the booking workflow.
//!
//! Validation failures ([`BookingError`]) and collaborator failures
//! ([`PersistenceError`]) are kept apart: the first is always the caller's to
//! fix, the second is reported unchanged and never retried here.
//! [`DeskError`] is what the booking desk hands back to its callers.

use crate::lifecycle::LifecycleEvent;
use crate::types::{BookingId, BookingStatus, GuestId, Role, RoomId};
use innkeep_runtime::StoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for booking validation.
pub type Result<T> = std::result::Result<T, BookingError>;

/// Validation failures raised by the booking lifecycle.
///
/// Every variant carries the offending value so a caller can render a message
/// next to the right form field (see [`BookingError::field`]). None is fatal.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingError {
    // ═══════════════════════════════════════════════════════════
    // Dates and occupancy
    // ═══════════════════════════════════════════════════════════

    /// Check-out not after check-in, or a date that is not a calendar date.
    #[error("Invalid date range {check_in} → {check_out}: {reason}")]
    InvalidRange {
        /// Check-in value as received
        check_in: String,
        /// Check-out value as received
        check_out: String,
        /// The side of the range at fault, `check_in` or `check_out`
        field: String,
        /// What is wrong with it
        reason: String,
    },

    /// More guests than the room holds.
    #[error("{guest_count} guests exceed the room capacity of {capacity}")]
    CapacityExceeded {
        /// Requested guests
        guest_count: i64,
        /// Room capacity
        capacity: u32,
    },

    /// Zero or negative guest count.
    #[error("Guest count must be a positive integer, got {value}")]
    InvalidGuestCount {
        /// Value as received
        value: i64,
    },

    /// Too many active bookings for one account.
    #[error("Active booking limit reached ({active} of {limit})")]
    BookingLimitReached {
        /// Active bookings
        active: usize,
        /// Configured limit
        limit: usize,
    },

    // ═══════════════════════════════════════════════════════════
    // Guest manifest
    // ═══════════════════════════════════════════════════════════

    /// Manifest size request that cannot be honoured.
    #[error("Guest manifest cannot hold {requested} entries: {reason}")]
    ManifestSize {
        /// Requested size
        requested: i64,
        /// Why it was refused
        reason: String,
    },

    /// Guest id not present in the manifest.
    #[error("Guest {guest_id} is not registered on this booking")]
    GuestNotFound {
        /// Missing guest
        guest_id: GuestId,
    },

    /// Manifest position out of range.
    #[error("Guest slot {index} does not exist (manifest has {len} entries)")]
    IndexOutOfRange {
        /// Requested position
        index: usize,
        /// Manifest length
        len: usize,
    },

    // ═══════════════════════════════════════════════════════════
    // Lifecycle
    // ═══════════════════════════════════════════════════════════

    /// Event not permitted in the booking's current status.
    #[error("Cannot {event} a {from} booking")]
    InvalidTransition {
        /// Current status
        from: BookingStatus,
        /// Rejected event
        event: LifecycleEvent,
    },

    /// Session role may not perform the event on this booking.
    #[error("A {role} may not {event} this booking")]
    Forbidden {
        /// Caller's role
        role: Role,
        /// Rejected event
        event: LifecycleEvent,
    },

    /// Booking not known locally.
    #[error("Booking {booking_id} not found")]
    BookingNotFound {
        /// Missing booking
        booking_id: BookingId,
    },

    /// Room unavailable or soft-deleted.
    #[error("Room {room_id} is not available for booking")]
    RoomUnavailable {
        /// Rejected room
        room_id: RoomId,
    },

    // ═══════════════════════════════════════════════════════════
    // Records
    // ═══════════════════════════════════════════════════════════

    /// A record failed boundary validation.
    #[error("Invalid {entity} {field}: {reason}")]
    InvalidRecord {
        /// Entity kind (room, guest, ...)
        entity: String,
        /// Offending field
        field: String,
        /// What is wrong with it
        reason: String,
    },

    /// Total price does not fit the money type.
    #[error("Total price overflows for {nights} nights")]
    PriceOverflow {
        /// Nights in the stay
        nights: u32,
    },
}

impl BookingError {
    /// Shorthand for [`BookingError::InvalidRecord`]
    #[must_use]
    pub fn invalid_record(entity: &str, field: &str, reason: &str) -> Self {
        Self::InvalidRecord {
            entity: entity.to_string(),
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }

    /// The input field this error belongs to
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::InvalidRecord { field, .. } | Self::InvalidRange { field, .. } => field,
            Self::CapacityExceeded { .. }
            | Self::InvalidGuestCount { .. }
            | Self::ManifestSize { .. } => "guest_count",
            Self::BookingLimitReached { .. } => "user_id",
            Self::GuestNotFound { .. } | Self::IndexOutOfRange { .. } => "guests",
            Self::InvalidTransition { .. } | Self::Forbidden { .. } => "status",
            Self::BookingNotFound { .. } => "id",
            Self::RoomUnavailable { .. } => "room_id",
            Self::PriceOverflow { .. } => "total_price",
        }
    }
}

/// Failures reported by persistence collaborators.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PersistenceError {
    /// The request never got an answer.
    #[error("Transport failure: {message}")]
    Transport {
        /// Transport detail
        message: String,
    },

    /// The backend refused the request.
    #[error("Backend rejected the request ({status}): {message}")]
    Rejected {
        /// HTTP-like status code
        status: u16,
        /// Backend message
        message: String,
    },

    /// The addressed record does not exist.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Entity kind
        entity: String,
        /// Requested id
        id: u64,
    },

    /// A concurrent write won.
    #[error("Conflicting update: {message}")]
    Conflict {
        /// Backend message
        message: String,
    },
}

impl PersistenceError {
    /// Shorthand for [`PersistenceError::NotFound`]
    #[must_use]
    pub fn not_found(entity: &str, id: u64) -> Self {
        Self::NotFound {
            entity: entity.to_string(),
            id,
        }
    }
}

/// Errors reported by [`crate::app::BookingDesk`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeskError {
    /// The command broke a lifecycle rule; nothing was sent to the backend.
    #[error(transparent)]
    Validation(#[from] BookingError),

    /// The backend did not accept the request.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// The room catalog could not provide the room.
    #[error("Room catalog failure: {0}")]
    Catalog(PersistenceError),

    /// The store could not process the command.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The command finished without reporting an outcome.
    #[error("Command finished without an outcome")]
    Unsettled,
}
