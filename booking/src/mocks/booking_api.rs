//! In-memory booking backend.

use crate::error::PersistenceError;
use crate::filter::BookingFilter;
use crate::providers::{BookingApi, GuestApi};
use crate::session::Session;
use crate::types::{Booking, BookingId, BookingSnapshot, BookingStatus, Guest, GuestId};
use std::collections::{BTreeMap, VecDeque};
use std::future::Future;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct Backend {
    bookings: BTreeMap<BookingId, Booking>,
    guests: BTreeMap<GuestId, Guest>,
    last_booking_id: u64,
    last_guest_id: u64,
    failures: VecDeque<PersistenceError>,
    requests: usize,
}

impl Backend {
    /// Counts the request and hands out a scripted failure, if any
    fn begin(&mut self) -> Result<(), PersistenceError> {
        self.requests += 1;
        self.failures.pop_front().map_or(Ok(()), Err)
    }

    fn visible(&self, session: &Session, id: BookingId) -> Result<&Booking, PersistenceError> {
        let booking = self
            .bookings
            .get(&id)
            .ok_or_else(|| PersistenceError::not_found("booking", id.get()))?;
        if session.is_staff() || booking.is_owned_by(session.user_id) {
            Ok(booking)
        } else {
            Err(PersistenceError::Rejected {
                status: 403,
                message: "booking belongs to another account".to_string(),
            })
        }
    }

    fn set_status(&mut self, session: &Session, id: BookingId, status: BookingStatus) -> Result<Booking, PersistenceError> {
        self.begin()?;
        self.visible(session, id)?;
        let booking = self
            .bookings
            .get_mut(&id)
            .ok_or_else(|| PersistenceError::not_found("booking", id.get()))?;
        booking.status = status;
        Ok(booking.clone())
    }

    fn snapshot(&self, booking: &Booking) -> BookingSnapshot {
        let guests = self
            .guests
            .values()
            .filter(|guest| guest.booking_id.is_some() && guest.booking_id == booking.id)
            .cloned()
            .collect();
        BookingSnapshot {
            booking: booking.clone(),
            guests,
        }
    }
}

/// Booking and guest backend kept in memory
///
/// Ids are assigned sequentially starting at 1. Customers only see and touch
/// their own bookings; staff see everything.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBookingApi {
    backend: Arc<Mutex<Backend>>,
}

fn poisoned() -> PersistenceError {
    PersistenceError::Transport {
        message: "booking backend lock poisoned".to_string(),
    }
}

impl InMemoryBookingApi {
    /// Empty backend
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next request fail with `error` instead of being served
    pub fn fail_next(&self, error: PersistenceError) {
        if let Ok(mut backend) = self.backend.lock() {
            backend.failures.push_back(error);
        }
    }

    /// Number of requests served or failed so far
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.backend.lock().map(|backend| backend.requests).unwrap_or_default()
    }

    /// Stored booking, bypassing access checks
    #[must_use]
    pub fn stored_booking(&self, id: BookingId) -> Option<Booking> {
        self.backend.lock().ok()?.bookings.get(&id).cloned()
    }

    /// Stored guests of a booking, bypassing access checks
    #[must_use]
    pub fn stored_guests(&self, booking_id: BookingId) -> Vec<Guest> {
        self.backend
            .lock()
            .map(|backend| {
                backend
                    .guests
                    .values()
                    .filter(|guest| guest.booking_id == Some(booking_id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn with_backend<T>(
        &self,
        f: impl FnOnce(&mut Backend) -> Result<T, PersistenceError> + Send + 'static,
    ) -> impl Future<Output = Result<T, PersistenceError>> + Send + 'static
    where
        T: Send + 'static,
    {
        let backend = Arc::clone(&self.backend);

        async move {
            let mut backend = backend.lock().map_err(|_| poisoned())?;
            f(&mut backend)
        }
    }
}

impl BookingApi for InMemoryBookingApi {
    fn list(
        &self,
        session: &Session,
        filter: &BookingFilter,
    ) -> impl Future<Output = Result<Vec<BookingSnapshot>, PersistenceError>> + Send {
        let mut filter = filter.clone();
        if !session.is_staff() {
            filter.user_id = Some(session.user_id);
        }

        self.with_backend(move |backend| {
            backend.begin()?;
            Ok(backend
                .bookings
                .values()
                .filter(|booking| filter.matches(booking))
                .map(|booking| backend.snapshot(booking))
                .collect())
        })
    }

    fn create(
        &self,
        session: &Session,
        booking: &Booking,
    ) -> impl Future<Output = Result<Booking, PersistenceError>> + Send {
        let session = session.clone();
        let mut booking = booking.clone();

        self.with_backend(move |backend| {
            backend.begin()?;
            if !session.is_staff() && !booking.is_owned_by(session.user_id) {
                return Err(PersistenceError::Rejected {
                    status: 403,
                    message: "customers book for themselves only".to_string(),
                });
            }
            backend.last_booking_id += 1;
            let id = BookingId::new(backend.last_booking_id);
            booking.id = Some(id);
            backend.bookings.insert(id, booking.clone());
            Ok(booking)
        })
    }

    fn update(
        &self,
        session: &Session,
        id: BookingId,
        booking: &Booking,
    ) -> impl Future<Output = Result<Booking, PersistenceError>> + Send {
        let session = session.clone();
        let mut booking = booking.clone();

        self.with_backend(move |backend| {
            backend.begin()?;
            backend.visible(&session, id)?;
            booking.id = Some(id);
            backend.bookings.insert(id, booking.clone());
            Ok(booking)
        })
    }

    fn confirm(&self, session: &Session, id: BookingId) -> impl Future<Output = Result<Booking, PersistenceError>> + Send {
        let session = session.clone();
        self.with_backend(move |backend| backend.set_status(&session, id, BookingStatus::Confirmed))
    }

    fn complete(&self, session: &Session, id: BookingId) -> impl Future<Output = Result<Booking, PersistenceError>> + Send {
        let session = session.clone();
        self.with_backend(move |backend| backend.set_status(&session, id, BookingStatus::Completed))
    }

    fn cancel(&self, session: &Session, id: BookingId) -> impl Future<Output = Result<Booking, PersistenceError>> + Send {
        let session = session.clone();
        self.with_backend(move |backend| backend.set_status(&session, id, BookingStatus::Cancelled))
    }
}

impl GuestApi for InMemoryBookingApi {
    fn add_guest(
        &self,
        session: &Session,
        booking_id: BookingId,
        guest: &Guest,
    ) -> impl Future<Output = Result<Guest, PersistenceError>> + Send {
        let session = session.clone();
        let mut guest = guest.clone();

        self.with_backend(move |backend| {
            backend.begin()?;
            backend.visible(&session, booking_id)?;
            backend.last_guest_id += 1;
            let id = GuestId::new(backend.last_guest_id);
            guest.id = Some(id);
            guest.booking_id = Some(booking_id);
            backend.guests.insert(id, guest.clone());
            Ok(guest)
        })
    }

    fn edit_guest(
        &self,
        session: &Session,
        booking_id: BookingId,
        guest_id: GuestId,
        guest: &Guest,
    ) -> impl Future<Output = Result<Guest, PersistenceError>> + Send {
        let session = session.clone();
        let mut guest = guest.clone();

        self.with_backend(move |backend| {
            backend.begin()?;
            backend.visible(&session, booking_id)?;
            let stored = backend
                .guests
                .get_mut(&guest_id)
                .filter(|stored| stored.booking_id == Some(booking_id))
                .ok_or_else(|| PersistenceError::not_found("guest", guest_id.get()))?;
            guest.id = Some(guest_id);
            guest.booking_id = Some(booking_id);
            *stored = guest.clone();
            Ok(guest)
        })
    }

    fn delete_guest(
        &self,
        session: &Session,
        booking_id: BookingId,
        guest_id: GuestId,
    ) -> impl Future<Output = Result<(), PersistenceError>> + Send {
        let session = session.clone();

        self.with_backend(move |backend| {
            backend.begin()?;
            backend.visible(&session, booking_id)?;
            match backend.guests.get(&guest_id) {
                Some(guest) if guest.booking_id == Some(booking_id) => {
                    backend.guests.remove(&guest_id);
                    Ok(())
                },
                _ => Err(PersistenceError::not_found("guest", guest_id.get())),
            }
        })
    }
}
