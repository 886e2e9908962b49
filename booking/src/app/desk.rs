//! Booking desk: the entry point the booking screens talk to.
//!
//! The desk owns the [`Store`] running the booking aggregate and adds what a
//! screen needs around a command: rooms are read from the catalog, the user
//! is asked before irreversible steps, and every outcome is shown through the
//! [`Notifier`], logged, and counted.

use crate::aggregates::{BookingAction, BookingEnvironment, BookingReducer, BookingState};
use crate::error::DeskError;
use crate::filter::{sort_bookings, BookingFilter, BookingSort};
use crate::lifecycle::BookingLifecycle;
use crate::manifest::GuestManifest;
use crate::providers::{BookingApi, ConfirmationPrompt, GuestApi, Notifier, RoomCatalog};
use crate::session::Session;
use crate::types::{Booking, BookingChanges, BookingId, BookingRequest, Guest, Room, RoomId};
use innkeep_runtime::Store;
use std::sync::Arc;

/// Message shown when the backend fails
pub const FAILURE_MESSAGE: &str = "Oops, something went wrong";

/// Result type for desk operations
pub type DeskResult<T> = Result<T, DeskError>;

type BookingStore<B, G> = Store<BookingState, BookingAction, BookingEnvironment<B, G>, BookingReducer<B, G>>;

/// Coordinates booking commands for a user interface
pub struct BookingDesk<B, G, C, N>
where
    B: BookingApi + 'static,
    G: GuestApi + 'static,
{
    store: BookingStore<B, G>,
    lifecycle: BookingLifecycle,
    catalog: Arc<C>,
    notifier: Arc<N>,
}

impl<B, G, C, N> BookingDesk<B, G, C, N>
where
    B: BookingApi + 'static,
    G: GuestApi + 'static,
    C: RoomCatalog,
    N: Notifier,
{
    /// Creates a desk with no bookings loaded
    #[must_use]
    pub fn new(
        lifecycle: BookingLifecycle,
        environment: BookingEnvironment<B, G>,
        catalog: Arc<C>,
        notifier: Arc<N>,
    ) -> Self {
        Self {
            store: Store::new(BookingState::new(), BookingReducer::new(lifecycle), environment),
            lifecycle,
            catalog,
            notifier,
        }
    }

    /// Rules the desk enforces
    #[must_use]
    pub const fn lifecycle(&self) -> &BookingLifecycle {
        &self.lifecycle
    }

    // ========== Queries ==========

    /// Loads the bookings `session` may see that match `filter`
    ///
    /// Returns how many bookings were loaded.
    ///
    /// # Errors
    ///
    /// [`DeskError::Persistence`] if the backend fails.
    pub async fn load_bookings(&self, session: &Session, filter: BookingFilter) -> DeskResult<usize> {
        let action = BookingAction::LoadBookings {
            session: session.clone(),
            filter,
        };
        match self.dispatch("load", action, None).await? {
            BookingAction::BookingsLoaded { snapshots } => Ok(snapshots.len()),
            _ => Err(DeskError::Unsettled),
        }
    }

    /// Bookable rooms that fit a party of `guest_count`
    ///
    /// # Errors
    ///
    /// [`DeskError::Catalog`] if the catalog fails.
    pub async fn search_rooms(&self, guest_count: u32) -> DeskResult<Vec<Room>> {
        let rooms = self.catalog.list().await.map_err(DeskError::Catalog)?;
        Ok(self
            .lifecycle
            .capacity()
            .rooms_for_party(&rooms, guest_count)
            .into_iter()
            .cloned()
            .collect())
    }

    /// A loaded booking
    pub async fn booking(&self, booking_id: BookingId) -> Option<Booking> {
        self.store.state(|state| state.booking(booking_id).cloned()).await
    }

    /// Guest rows of a loaded booking
    pub async fn manifest(&self, booking_id: BookingId) -> Option<GuestManifest> {
        self.store.state(|state| state.manifest(booking_id).cloned()).await
    }

    /// Loaded bookings matching `filter`, sorted by `sort`
    pub async fn bookings(&self, filter: &BookingFilter, sort: BookingSort, descending: bool) -> Vec<Booking> {
        let mut bookings: Vec<Booking> = self
            .store
            .state(|state| {
                state
                    .bookings
                    .values()
                    .map(|entry| &entry.booking)
                    .filter(|booking| filter.matches(booking))
                    .cloned()
                    .collect()
            })
            .await;
        sort_bookings(&mut bookings, sort, descending);
        bookings
    }

    // ========== Lifecycle ==========

    /// Books a room
    ///
    /// # Errors
    ///
    /// [`DeskError::Catalog`] if the room cannot be read,
    /// [`DeskError::Validation`] if a rule is broken, or
    /// [`DeskError::Persistence`] if the backend fails.
    pub async fn create_booking(&self, session: &Session, request: BookingRequest) -> DeskResult<Booking> {
        let room = self.room(request.room_id).await?;
        let action = BookingAction::CreateBooking {
            session: session.clone(),
            room,
            request,
        };
        match self.dispatch("create", action, Some("Booking has been added")).await? {
            BookingAction::BookingCreated { booking } => Ok(booking),
            _ => Err(DeskError::Unsettled),
        }
    }

    /// Changes dates, room or party size of a booking
    ///
    /// # Errors
    ///
    /// As [`BookingDesk::create_booking`].
    pub async fn edit_booking(
        &self,
        session: &Session,
        booking_id: BookingId,
        changes: BookingChanges,
    ) -> DeskResult<Booking> {
        let room = self.room(changes.room_id).await?;
        let action = BookingAction::EditBooking {
            session: session.clone(),
            booking_id,
            room,
            changes,
        };
        match self.dispatch("edit", action, Some("Booking has been updated")).await? {
            BookingAction::BookingUpdated { booking } => Ok(booking),
            _ => Err(DeskError::Unsettled),
        }
    }

    /// Confirms a pending booking
    ///
    /// # Errors
    ///
    /// [`DeskError::Validation`] or [`DeskError::Persistence`].
    pub async fn confirm_booking(&self, session: &Session, booking_id: BookingId) -> DeskResult<Booking> {
        let action = BookingAction::ConfirmBooking {
            session: session.clone(),
            booking_id,
        };
        match self.dispatch("confirm", action, Some("Booking has been confirmed")).await? {
            BookingAction::BookingConfirmed { booking } => Ok(booking),
            _ => Err(DeskError::Unsettled),
        }
    }

    /// Closes a stay after the user confirms
    ///
    /// Returns `None` if the user declined.
    ///
    /// # Errors
    ///
    /// [`DeskError::Validation`] or [`DeskError::Persistence`].
    pub async fn complete_booking(&self, session: &Session, booking_id: BookingId) -> DeskResult<Option<Booking>> {
        if !self.notifier.confirm(&ConfirmationPrompt::complete_booking()).await {
            tracing::debug!(%booking_id, "Completion declined");
            return Ok(None);
        }
        let action = BookingAction::CompleteBooking {
            session: session.clone(),
            booking_id,
        };
        match self.dispatch("complete", action, Some("Booking has been completed")).await? {
            BookingAction::BookingCompleted { booking } => Ok(Some(booking)),
            _ => Err(DeskError::Unsettled),
        }
    }

    /// Cancels a booking after the user confirms
    ///
    /// Returns `None` if the user declined.
    ///
    /// # Errors
    ///
    /// [`DeskError::Validation`] or [`DeskError::Persistence`].
    pub async fn cancel_booking(&self, session: &Session, booking_id: BookingId) -> DeskResult<Option<Booking>> {
        if !self.notifier.confirm(&ConfirmationPrompt::cancel_booking()).await {
            tracing::debug!(%booking_id, "Cancellation declined");
            return Ok(None);
        }
        let action = BookingAction::CancelBooking {
            session: session.clone(),
            booking_id,
        };
        match self.dispatch("cancel", action, Some("Booking has been cancelled")).await? {
            BookingAction::BookingCancelled { booking } => Ok(Some(booking)),
            _ => Err(DeskError::Unsettled),
        }
    }

    // ========== Guests ==========

    /// Registers a guest in row `slot`, or updates a registered guest
    ///
    /// # Errors
    ///
    /// [`DeskError::Validation`] or [`DeskError::Persistence`].
    pub async fn save_guest(
        &self,
        session: &Session,
        booking_id: BookingId,
        slot: usize,
        guest: Guest,
    ) -> DeskResult<Guest> {
        let action = BookingAction::SaveGuest {
            session: session.clone(),
            booking_id,
            slot,
            guest,
        };
        match self.dispatch("save_guest", action, Some("Guest has been saved")).await? {
            BookingAction::GuestSaved { guest, .. } => Ok(guest),
            _ => Err(DeskError::Unsettled),
        }
    }

    /// Clears row `slot`; a registered guest is deleted after the user confirms
    ///
    /// Returns `false` if the user declined.
    ///
    /// # Errors
    ///
    /// [`DeskError::Validation`] or [`DeskError::Persistence`].
    pub async fn remove_guest(&self, session: &Session, booking_id: BookingId, slot: usize) -> DeskResult<bool> {
        let registered = self
            .store
            .state(|state| {
                state
                    .manifest(booking_id)
                    .and_then(|manifest| manifest.get(slot))
                    .is_some_and(Guest::is_persisted)
            })
            .await;
        if registered && !self.notifier.confirm(&ConfirmationPrompt::delete_guest()).await {
            tracing::debug!(%booking_id, slot, "Guest deletion declined");
            return Ok(false);
        }

        let action = BookingAction::RemoveGuest {
            session: session.clone(),
            booking_id,
            slot,
        };
        let message = registered.then_some("Guest has been deleted");
        match self.dispatch("remove_guest", action, message).await? {
            BookingAction::GuestRemoved { .. } => Ok(true),
            _ => Err(DeskError::Unsettled),
        }
    }

    // ========== Internals ==========

    async fn room(&self, room_id: RoomId) -> DeskResult<Room> {
        self.catalog.get(room_id).await.map_err(|error| {
            tracing::warn!(%room_id, %error, "Room lookup failed");
            DeskError::Catalog(error)
        })
    }

    /// Sends `action` and turns the event it produced into the outcome
    async fn dispatch(
        &self,
        operation: &'static str,
        action: BookingAction,
        success_message: Option<&str>,
    ) -> DeskResult<BookingAction> {
        let feedback = match self.store.send(action).await {
            Ok(feedback) => feedback,
            Err(error) => {
                tracing::error!(operation, %error, "Store failed");
                record(operation, "error");
                self.notifier.failure(FAILURE_MESSAGE).await;
                return Err(error.into());
            },
        };

        match feedback.into_iter().rev().find(BookingAction::is_event) {
            Some(BookingAction::CommandRejected { error }) => {
                tracing::info!(operation, field = error.field(), %error, "Command rejected");
                record(operation, "rejected");
                self.notifier.failure(&error.to_string()).await;
                Err(error.into())
            },
            Some(BookingAction::PersistenceFailed { booking_id, error }) => {
                tracing::warn!(operation, ?booking_id, %error, "Backend request failed");
                record(operation, "failed");
                self.notifier.failure(FAILURE_MESSAGE).await;
                Err(error.into())
            },
            Some(event) => {
                if let Some(booking) = event_booking(&event) {
                    tracing::info!(operation, booking_id = ?booking.id, status = %booking.status, "Booking updated");
                } else {
                    tracing::debug!(operation, "Command settled");
                }
                record(operation, "ok");
                if let Some(message) = success_message {
                    self.notifier.success(message).await;
                }
                Ok(event)
            },
            None => {
                tracing::error!(operation, "Command produced no outcome");
                record(operation, "error");
                Err(DeskError::Unsettled)
            },
        }
    }
}

fn event_booking(event: &BookingAction) -> Option<&Booking> {
    match event {
        BookingAction::BookingCreated { booking }
        | BookingAction::BookingUpdated { booking }
        | BookingAction::BookingConfirmed { booking }
        | BookingAction::BookingCompleted { booking }
        | BookingAction::BookingCancelled { booking } => Some(booking),
        _ => None,
    }
}

fn record(operation: &'static str, outcome: &'static str) {
    metrics::counter!("booking.transition", "operation" => operation, "outcome" => outcome).increment(1);
}
