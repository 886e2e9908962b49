//! Guest persistence trait.

use crate::error::PersistenceError;
use crate::session::Session;
use crate::types::{BookingId, Guest, GuestId};
use std::future::Future;

/// Persistence backend for the guests registered on a booking
pub trait GuestApi: Send + Sync {
    /// Registers a guest and returns it with its assigned id
    ///
    /// # Errors
    ///
    /// Returns error if the booking does not exist or the guest is rejected.
    fn add_guest(
        &self,
        session: &Session,
        booking_id: BookingId,
        guest: &Guest,
    ) -> impl Future<Output = Result<Guest, PersistenceError>> + Send;

    /// Replaces a registered guest's details
    ///
    /// # Errors
    ///
    /// Returns error if the guest does not exist or the update is rejected.
    fn edit_guest(
        &self,
        session: &Session,
        booking_id: BookingId,
        guest_id: GuestId,
        guest: &Guest,
    ) -> impl Future<Output = Result<Guest, PersistenceError>> + Send;

    /// Deletes a registered guest
    ///
    /// # Errors
    ///
    /// Returns error if the guest does not exist or the backend refuses.
    fn delete_guest(
        &self,
        session: &Session,
        booking_id: BookingId,
        guest_id: GuestId,
    ) -> impl Future<Output = Result<(), PersistenceError>> + Send;
}
