//! Booking state machine.
//!
//! ```text
//! pending ──confirm──▶ confirmed ──complete──▶ completed
//!    │                     │
//!    └──────cancel─────────┴──────────────────▶ cancelled
//! ```
//!
//! `edit` keeps the status of a pending or confirmed booking; guest
//! management is a confirmed-booking activity unless configured otherwise.
//! Completed and cancelled bookings are final.
//!
//! Every operation is a pure function of its inputs: it returns the updated
//! booking or a [`BookingError`] and never touches the booking it was given.

use crate::capacity::CapacityPolicy;
use crate::date_range::DateRange;
use crate::error::{BookingError, Result};
use crate::manifest::GuestManifest;
use crate::pricing::PriceCalculator;
use crate::session::Session;
use crate::types::{Booking, BookingChanges, BookingRequest, BookingStatus, PaymentStatus, Room, RoomId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Something a caller asks to happen to a booking
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleEvent {
    /// Book a room
    Create,
    /// Staff accepts a pending booking
    Confirm,
    /// Change dates, room or party size
    Edit,
    /// Staff closes a finished stay
    Complete,
    /// Withdraw the booking
    Cancel,
    /// Register, edit or delete guest records
    ManageGuests,
}

impl LifecycleEvent {
    /// Every event, in lifecycle order
    pub const ALL: [Self; 6] = [
        Self::Create,
        Self::Confirm,
        Self::Edit,
        Self::Complete,
        Self::Cancel,
        Self::ManageGuests,
    ];

    /// Wire and metrics name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Confirm => "confirm",
            Self::Edit => "edit",
            Self::Complete => "complete",
            Self::Cancel => "cancel",
            Self::ManageGuests => "manage_guests",
        }
    }
}

/// Reads as the verb of a sentence: "Cannot {event} a confirmed booking"
impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ManageGuests => f.write_str("manage guests of"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// When guest records may be managed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuestManagement {
    /// Only on confirmed bookings
    #[default]
    ConfirmedOnly,
    /// On pending and confirmed bookings
    OpenBookings,
}

impl FromStr for GuestManagement {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "confirmed_only" | "confirmed" => Ok(Self::ConfirmedOnly),
            "open" | "open_bookings" => Ok(Self::OpenBookings),
            other => Err(format!("unknown guest management mode: {other}")),
        }
    }
}

/// Validates and applies lifecycle events
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BookingLifecycle {
    capacity: CapacityPolicy,
    pricing: PriceCalculator,
    guest_management: GuestManagement,
}

impl BookingLifecycle {
    /// Lifecycle with the given rules
    #[must_use]
    pub const fn new(capacity: CapacityPolicy, pricing: PriceCalculator, guest_management: GuestManagement) -> Self {
        Self {
            capacity,
            pricing,
            guest_management,
        }
    }

    /// Occupancy rules
    #[must_use]
    pub const fn capacity(&self) -> &CapacityPolicy {
        &self.capacity
    }

    /// Price rules
    #[must_use]
    pub const fn pricing(&self) -> &PriceCalculator {
        &self.pricing
    }

    /// Guest management rule
    #[must_use]
    pub const fn guest_management(&self) -> GuestManagement {
        self.guest_management
    }

    /// Whether guests may be managed on a booking in `status`
    #[must_use]
    pub const fn allows_guest_management(&self, status: BookingStatus) -> bool {
        match status {
            BookingStatus::Confirmed => true,
            BookingStatus::Pending => matches!(self.guest_management, GuestManagement::OpenBookings),
            BookingStatus::Completed | BookingStatus::Cancelled => false,
        }
    }

    /// Status a booking in `from` moves to on `event`
    ///
    /// # Errors
    ///
    /// [`BookingError::InvalidTransition`] if `event` is not allowed in `from`.
    pub fn next_status(&self, from: BookingStatus, event: LifecycleEvent) -> Result<BookingStatus> {
        use BookingStatus::{Cancelled, Completed, Confirmed, Pending};

        let to = match (from, event) {
            (Pending, LifecycleEvent::Confirm) => Some(Confirmed),
            (Pending | Confirmed, LifecycleEvent::Edit) => Some(from),
            (Confirmed, LifecycleEvent::Complete) => Some(Completed),
            (Pending | Confirmed, LifecycleEvent::Cancel) => Some(Cancelled),
            (_, LifecycleEvent::ManageGuests) if self.allows_guest_management(from) => Some(from),
            _ => None,
        };
        to.ok_or(BookingError::InvalidTransition { from, event })
    }

    /// Applies a status-only event
    ///
    /// Permission is checked before the status.
    ///
    /// # Errors
    ///
    /// [`BookingError::Forbidden`] or [`BookingError::InvalidTransition`].
    pub fn transition(
        &self,
        session: &Session,
        booking: &Booking,
        event: LifecycleEvent,
        now: DateTime<Utc>,
    ) -> Result<Booking> {
        session.authorize(event, booking.user_id)?;
        let status = self.next_status(booking.status, event)?;
        Ok(Booking {
            status,
            updated_at: now,
            ..booking.clone()
        })
    }

    /// `pending → confirmed`
    ///
    /// # Errors
    ///
    /// See [`BookingLifecycle::transition`].
    pub fn confirm(&self, session: &Session, booking: &Booking, now: DateTime<Utc>) -> Result<Booking> {
        self.transition(session, booking, LifecycleEvent::Confirm, now)
    }

    /// `confirmed → completed`
    ///
    /// # Errors
    ///
    /// See [`BookingLifecycle::transition`].
    pub fn complete(&self, session: &Session, booking: &Booking, now: DateTime<Utc>) -> Result<Booking> {
        self.transition(session, booking, LifecycleEvent::Complete, now)
    }

    /// `pending | confirmed → cancelled`
    ///
    /// # Errors
    ///
    /// See [`BookingLifecycle::transition`].
    pub fn cancel(&self, session: &Session, booking: &Booking, now: DateTime<Utc>) -> Result<Booking> {
        self.transition(session, booking, LifecycleEvent::Cancel, now)
    }

    /// Checks that `session` may manage guests of `booking` now
    ///
    /// # Errors
    ///
    /// [`BookingError::Forbidden`] or [`BookingError::InvalidTransition`].
    pub fn authorize_guest_management(&self, session: &Session, booking: &Booking) -> Result<()> {
        session.authorize(LifecycleEvent::ManageGuests, booking.user_id)?;
        self.next_status(booking.status, LifecycleEvent::ManageGuests)
            .map(|_| ())
    }

    /// Builds a pending booking from a form submission
    ///
    /// A customer's request without an owner is booked for the customer.
    /// `active_bookings` is the owner's count of non-terminal bookings.
    ///
    /// # Errors
    ///
    /// Fails with the first violated rule: [`BookingError::Forbidden`],
    /// [`BookingError::InvalidRecord`], [`BookingError::RoomUnavailable`],
    /// [`BookingError::InvalidRange`], [`BookingError::InvalidGuestCount`],
    /// [`BookingError::CapacityExceeded`], [`BookingError::BookingLimitReached`]
    /// or [`BookingError::PriceOverflow`].
    pub fn create(
        &self,
        session: &Session,
        room: &Room,
        request: &BookingRequest,
        active_bookings: usize,
        now: DateTime<Utc>,
    ) -> Result<Booking> {
        let owner = session.booking_owner(request.user_id);
        session.authorize(LifecycleEvent::Create, owner)?;

        check_room(room, request.room_id)?;
        if !room.is_bookable() {
            return Err(BookingError::RoomUnavailable { room_id: room.id });
        }

        let range = DateRange::parse(&request.check_in, &request.check_out)?;

        let guest_count = self.capacity.validate(request.guest_count, room.capacity)?;
        if owner.is_some() {
            self.capacity.check_quota(active_bookings)?;
        }
        let total_price = self
            .pricing
            .compute(range.nights(), room.price_per_night, guest_count)?;

        Ok(Booking {
            id: None,
            room_id: room.id,
            user_id: owner,
            check_in: range.check_in(),
            check_out: range.check_out(),
            guest_count,
            status: BookingStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            total_price,
            booking_type: request.booking_type,
            guest_name: request.guest_name.clone(),
            guest_email: request.guest_email.clone(),
            guest_phone: request.guest_phone.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Applies new dates, room or party size and recomputes the price
    ///
    /// `room` is the room the booking will be in after the edit. Moving to
    /// another room requires it to be bookable. The guest count may not drop
    /// below the number of guests already registered in `manifest`; only
    /// staff may change the payment status.
    ///
    /// # Errors
    ///
    /// [`BookingError::Forbidden`], [`BookingError::InvalidTransition`], any
    /// validation error of [`BookingLifecycle::create`], or
    /// [`BookingError::ManifestSize`] when registered guests would not fit.
    pub fn edit(
        &self,
        session: &Session,
        booking: &Booking,
        manifest: &GuestManifest,
        room: &Room,
        changes: &BookingChanges,
        now: DateTime<Utc>,
    ) -> Result<Booking> {
        session.authorize(LifecycleEvent::Edit, booking.user_id)?;
        let status = self.next_status(booking.status, LifecycleEvent::Edit)?;

        check_room(room, changes.room_id)?;
        if room.id != booking.room_id && !room.is_bookable() {
            return Err(BookingError::RoomUnavailable { room_id: room.id });
        }

        let range = DateRange::parse(&changes.check_in, &changes.check_out)?;
        let guest_count = self.capacity.validate(changes.guest_count, room.capacity)?;

        let registered = manifest.persisted_count();
        if usize::try_from(guest_count).unwrap_or(usize::MAX) < registered {
            return Err(BookingError::ManifestSize {
                requested: changes.guest_count,
                reason: format!("{registered} guests are already registered"),
            });
        }

        let payment_status = match changes.payment_status {
            Some(payment) if payment != booking.payment_status => {
                if !session.is_staff() {
                    return Err(BookingError::Forbidden {
                        role: session.role,
                        event: LifecycleEvent::Edit,
                    });
                }
                payment
            },
            _ => booking.payment_status,
        };

        let total_price = self
            .pricing
            .compute(range.nights(), room.price_per_night, guest_count)?;

        Ok(Booking {
            room_id: room.id,
            check_in: range.check_in(),
            check_out: range.check_out(),
            guest_count,
            status,
            payment_status,
            total_price,
            updated_at: now,
            ..booking.clone()
        })
    }
}

fn check_room(room: &Room, requested: RoomId) -> Result<()> {
    if room.id != requested {
        return Err(BookingError::invalid_record(
            "booking",
            "room_id",
            "does not match the room supplied",
        ));
    }
    room.validate()
}
