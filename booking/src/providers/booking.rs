//! Booking persistence trait.

use crate::error::PersistenceError;
use crate::filter::BookingFilter;
use crate::session::Session;
use crate::types::{Booking, BookingId, BookingSnapshot};
use std::future::Future;

/// Persistence backend for bookings
///
/// Status changes go through dedicated calls so the backend can apply its own
/// side effects (mails, invoices) on the transition.
pub trait BookingApi: Send + Sync {
    /// Bookings visible to `session` that match `filter`, with their guests
    ///
    /// # Errors
    ///
    /// Returns error if the backend cannot be reached or refuses the query.
    fn list(
        &self,
        session: &Session,
        filter: &BookingFilter,
    ) -> impl Future<Output = Result<Vec<BookingSnapshot>, PersistenceError>> + Send;

    /// Stores a new booking and returns it with its assigned id
    ///
    /// # Errors
    ///
    /// Returns error if the backend rejects the booking.
    fn create(
        &self,
        session: &Session,
        booking: &Booking,
    ) -> impl Future<Output = Result<Booking, PersistenceError>> + Send;

    /// Replaces a booking's editable fields
    ///
    /// # Errors
    ///
    /// Returns error if the booking does not exist or the update is rejected.
    fn update(
        &self,
        session: &Session,
        id: BookingId,
        booking: &Booking,
    ) -> impl Future<Output = Result<Booking, PersistenceError>> + Send;

    /// Marks a booking confirmed
    ///
    /// # Errors
    ///
    /// Returns error if the booking does not exist or the backend refuses.
    fn confirm(
        &self,
        session: &Session,
        id: BookingId,
    ) -> impl Future<Output = Result<Booking, PersistenceError>> + Send;

    /// Marks a booking completed
    ///
    /// # Errors
    ///
    /// Returns error if the booking does not exist or the backend refuses.
    fn complete(
        &self,
        session: &Session,
        id: BookingId,
    ) -> impl Future<Output = Result<Booking, PersistenceError>> + Send;

    /// Marks a booking cancelled
    ///
    /// # Errors
    ///
    /// Returns error if the booking does not exist or the backend refuses.
    fn cancel(
        &self,
        session: &Session,
        id: BookingId,
    ) -> impl Future<Output = Result<Booking, PersistenceError>> + Send;
}
