//! Domain types for room bookings.
//!
//! Plain typed records for every entity the booking workflow touches. Field
//! names follow the backend's `snake_case` payloads so the records can be
//! exchanged as-is by whatever transport sits behind the provider traits.

use crate::error::BookingError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Identifiers
// ============================================================================

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Wraps a backend-assigned identifier
            #[must_use]
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// The raw identifier
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(
    /// Unique identifier for a room
    RoomId
);
numeric_id!(
    /// Unique identifier for a booking
    BookingId
);
numeric_id!(
    /// Unique identifier for a guest record
    GuestId
);
numeric_id!(
    /// Unique identifier for a user account
    UserId
);

// ============================================================================
// Money
// ============================================================================

/// Amount of money in minor units (cents)
///
/// Integer arithmetic keeps price totals exact.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    /// Creates a `Money` value from cents
    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Creates a `Money` value from whole currency units
    #[must_use]
    #[allow(clippy::cast_lossless)] // u64::from is not const
    pub const fn from_units(units: u32) -> Self {
        Self(units as u64 * 100)
    }

    /// Returns the amount in cents
    #[must_use]
    pub const fn cents(self) -> u64 {
        self.0
    }

    /// Checks if the amount is zero
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Multiplies with overflow checking
    #[must_use]
    pub const fn checked_mul(self, factor: u64) -> Option<Self> {
        match self.0.checked_mul(factor) {
            Some(cents) => Some(Self(cents)),
            None => None,
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

// ============================================================================
// Rooms
// ============================================================================

/// A bookable room from the admin catalog
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Room ID
    pub id: RoomId,
    /// Display name
    pub name: String,
    /// Optional marketing description
    #[serde(default)]
    pub description: Option<String>,
    /// Maximum occupants
    pub capacity: u32,
    /// Nightly rate
    pub price_per_night: Money,
    /// Whether the room is open for new bookings
    pub is_available: bool,
    /// Soft-delete marker
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Room {
    /// Creates an available room
    #[must_use]
    pub fn new(id: RoomId, name: impl Into<String>, capacity: u32, price_per_night: Money) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            capacity,
            price_per_night,
            is_available: true,
            deleted_at: None,
        }
    }

    /// Checks the record received from the catalog
    ///
    /// # Errors
    ///
    /// [`BookingError::InvalidRecord`] for an empty name, zero capacity or a
    /// zero nightly rate.
    pub fn validate(&self) -> Result<(), BookingError> {
        if self.name.trim().is_empty() {
            return Err(BookingError::invalid_record("room", "name", "must not be empty"));
        }
        if self.capacity == 0 {
            return Err(BookingError::invalid_record("room", "capacity", "must be positive"));
        }
        if self.price_per_night.is_zero() {
            return Err(BookingError::invalid_record("room", "price_per_night", "must be positive"));
        }
        Ok(())
    }

    /// Available and not soft-deleted
    #[must_use]
    pub const fn is_bookable(&self) -> bool {
        self.is_available && self.deleted_at.is_none()
    }
}

// ============================================================================
// Bookings
// ============================================================================

/// Booking lifecycle status
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Requested, awaiting staff confirmation
    #[default]
    Pending,
    /// Accepted by staff; guest details may be registered
    Confirmed,
    /// Stay finished
    Completed,
    /// Withdrawn
    Cancelled,
}

impl BookingStatus {
    /// No transition leaves a terminal status
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment state of a booking
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Not yet paid
    #[default]
    Unpaid,
    /// Paid in full
    Paid,
}

/// Booking channel
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingType {
    /// Regular room booking
    #[default]
    Standard,
    /// Anything else (events, staff holds)
    Other,
}

/// A reservation of a room by a user for a date range
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    /// Booking ID, assigned by the backend
    pub id: Option<BookingId>,
    /// Reserved room
    pub room_id: RoomId,
    /// Owning account; `None` for walk-in bookings pending registration
    pub user_id: Option<UserId>,
    /// First night
    pub check_in: NaiveDate,
    /// Departure day (exclusive)
    pub check_out: NaiveDate,
    /// Number of occupants
    pub guest_count: u32,
    /// Lifecycle status
    pub status: BookingStatus,
    /// Payment status
    pub payment_status: PaymentStatus,
    /// Cached total, recomputed on every date or guest-count change
    pub total_price: Money,
    /// Booking channel
    pub booking_type: BookingType,
    /// Contact name captured at the desk
    #[serde(default)]
    pub guest_name: Option<String>,
    /// Contact email captured at the desk
    #[serde(default)]
    pub guest_email: Option<String>,
    /// Contact phone captured at the desk
    #[serde(default)]
    pub guest_phone: Option<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Whether `user_id` owns this booking
    #[must_use]
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == Some(user_id)
    }
}

/// A new booking as submitted by a booking form
///
/// Dates and guest count are raw form values; the lifecycle validates them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    /// Room to reserve
    pub room_id: RoomId,
    /// Owning account
    pub user_id: Option<UserId>,
    /// `YYYY-MM-DD`
    pub check_in: String,
    /// `YYYY-MM-DD`
    pub check_out: String,
    /// Requested occupants
    pub guest_count: i64,
    /// Booking channel
    #[serde(default)]
    pub booking_type: BookingType,
    /// Contact name
    #[serde(default)]
    pub guest_name: Option<String>,
    /// Contact email
    #[serde(default)]
    pub guest_email: Option<String>,
    /// Contact phone
    #[serde(default)]
    pub guest_phone: Option<String>,
}

/// Edits to an existing booking
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingChanges {
    /// Room to move to (same room to keep it)
    pub room_id: RoomId,
    /// `YYYY-MM-DD`
    pub check_in: String,
    /// `YYYY-MM-DD`
    pub check_out: String,
    /// Requested occupants
    pub guest_count: i64,
    /// Payment status, staff only
    #[serde(default)]
    pub payment_status: Option<PaymentStatus>,
}

impl BookingChanges {
    /// Changes that keep everything about `booking` as it is
    #[must_use]
    pub fn from_booking(booking: &Booking) -> Self {
        Self {
            room_id: booking.room_id,
            check_in: booking.check_in.format("%Y-%m-%d").to_string(),
            check_out: booking.check_out.format("%Y-%m-%d").to_string(),
            guest_count: i64::from(booking.guest_count),
            payment_status: None,
        }
    }
}

/// A booking together with its persisted guest records
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingSnapshot {
    /// The booking
    pub booking: Booking,
    /// Guests registered on it
    #[serde(default)]
    pub guests: Vec<Guest>,
}

// ============================================================================
// Guests
// ============================================================================

/// Postal address of a guest
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Country
    pub country: String,
    /// Postal code
    pub postal_code: String,
    /// City
    pub city: String,
    /// Street and number
    pub street: String,
}

/// A named occupant registered on a booking
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guest {
    /// Guest ID, assigned by the backend
    #[serde(default)]
    pub id: Option<GuestId>,
    /// Parent booking, assigned by the backend
    #[serde(default)]
    pub booking_id: Option<BookingId>,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Date of birth
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    /// Identity document kind (passport, id card, ...)
    #[serde(default)]
    pub document_type: String,
    /// Identity document number
    #[serde(default)]
    pub document_number: String,
    /// Nationality
    #[serde(default)]
    pub nationality: String,
    /// Address
    #[serde(default)]
    pub address: Address,
}

impl Guest {
    /// A guest with the given names
    #[must_use]
    pub fn named(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            ..Self::default()
        }
    }

    /// Empty row standing in for a guest yet to be registered
    #[must_use]
    pub fn placeholder() -> Self {
        Self::default()
    }

    /// Carries a backend id
    #[must_use]
    pub const fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Nothing has been entered
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.id.is_none() && *self == Self::default()
    }

    /// Checks the fields required to register a guest
    ///
    /// # Errors
    ///
    /// [`BookingError::InvalidRecord`] for a missing first or last name.
    pub fn validate(&self) -> Result<(), BookingError> {
        if self.first_name.trim().is_empty() {
            return Err(BookingError::invalid_record("guest", "first_name", "is required"));
        }
        if self.last_name.trim().is_empty() {
            return Err(BookingError::invalid_record("guest", "last_name", "is required"));
        }
        Ok(())
    }
}

// ============================================================================
// Users
// ============================================================================

/// Account role
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access, including staff management
    SuperAdmin,
    /// Hotel administrator
    Admin,
    /// Front desk
    Receptionist,
    /// Registered guest
    Customer,
}

impl Role {
    /// Hotel staff may act on any booking
    #[must_use]
    pub const fn is_staff(self) -> bool {
        !matches!(self, Self::Customer)
    }

    /// Wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SuperAdmin => "superadmin",
            Self::Admin => "admin",
            Self::Receptionist => "receptionist",
            Self::Customer => "customer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contact details on a user account
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Postal address
    #[serde(default)]
    pub address: Option<String>,
    /// Phone number
    #[serde(default)]
    pub phone: Option<String>,
}

/// A user account, referenced by bookings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User ID
    pub id: UserId,
    /// Display name
    pub name: String,
    /// Login email
    pub email: String,
    /// Role
    pub role: Role,
    /// Deactivated accounts cannot sign in
    pub is_active: bool,
    /// Soft-delete marker
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
    /// Contact details
    #[serde(default)]
    pub profile: Profile,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn money_formats_with_two_decimals() {
        assert_eq!(Money::from_units(200).to_string(), "200.00");
        assert_eq!(Money::from_cents(105).to_string(), "1.05");
        assert_eq!(Money::from_cents(u64::MAX).checked_mul(2), None);
    }

    #[test]
    fn room_validation_rejects_zero_capacity_and_rate() {
        let room = Room::new(RoomId::new(1), "Garden", 0, Money::from_units(80));
        assert_eq!(room.validate().unwrap_err().field(), "capacity");

        let room = Room::new(RoomId::new(1), "Garden", 2, Money::from_cents(0));
        assert_eq!(room.validate().unwrap_err().field(), "price_per_night");
    }

    #[test]
    fn soft_deleted_room_is_not_bookable() {
        let mut room = Room::new(RoomId::new(1), "Garden", 2, Money::from_units(80));
        assert!(room.is_bookable());
        room.deleted_at = Some(Utc::now());
        assert!(!room.is_bookable());
    }

    #[test]
    fn placeholder_guest_is_blank_until_edited() {
        let mut guest = Guest::placeholder();
        assert!(guest.is_blank());
        guest.nationality = "HU".to_string();
        assert!(!guest.is_blank());
        assert!(guest.validate().is_err());
        assert!(Guest::named("Anna", "Kovacs").validate().is_ok());
    }

    #[test]
    fn statuses_use_backend_wire_names() {
        let json = serde_json::to_string(&BookingStatus::Cancelled).unwrap();
        assert_eq!(json, "\"cancelled\"");
        let role: Role = serde_json::from_str("\"superadmin\"").unwrap();
        assert_eq!(role, Role::SuperAdmin);
        assert!(role.is_staff());
        assert!(!Role::Customer.is_staff());
    }
}
