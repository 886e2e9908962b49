//! Booking aggregate.
//!
//! Holds the locally known bookings with their guest manifests and drives
//! every lifecycle command:
//! 1. Validate the command against the lifecycle rules (no I/O)
//! 2. On failure, feed back `CommandRejected`; no booking changes
//! 3. On success, issue exactly one persistence request
//! 4. Apply the backend's answer when it is fed back as an event
//!
//! Local state only changes through events, so a booking never shows a
//! status the backend has not accepted.

use crate::error::{BookingError, PersistenceError};
use crate::filter::BookingFilter;
use crate::lifecycle::BookingLifecycle;
use crate::manifest::GuestManifest;
use crate::providers::{BookingApi, GuestApi};
use crate::session::Session;
use crate::types::{
    Booking, BookingChanges, BookingId, BookingRequest, BookingSnapshot, Guest, GuestId, Room, UserId,
};
use innkeep_core::{effect::Effect, environment::Clock, reducer::Reducer, smallvec, Effects, SmallVec};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::Arc;

// ============================================================================
// State
// ============================================================================

/// A booking with its guest rows
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingEntry {
    /// The booking as last accepted by the backend
    pub booking: Booking,
    /// Guest rows, padded with placeholders while guests can be registered
    pub manifest: GuestManifest,
}

/// Locally known bookings
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingState {
    /// Bookings by id
    pub bookings: BTreeMap<BookingId, BookingEntry>,
    /// Why the last command was rejected
    pub last_error: Option<BookingError>,
    /// Why the last persistence request failed
    pub last_persistence_error: Option<PersistenceError>,
}

impl BookingState {
    /// No bookings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry for `booking_id`
    #[must_use]
    pub fn get(&self, booking_id: BookingId) -> Option<&BookingEntry> {
        self.bookings.get(&booking_id)
    }

    /// Booking for `booking_id`
    #[must_use]
    pub fn booking(&self, booking_id: BookingId) -> Option<&Booking> {
        self.get(booking_id).map(|entry| &entry.booking)
    }

    /// Guest manifest for `booking_id`
    #[must_use]
    pub fn manifest(&self, booking_id: BookingId) -> Option<&GuestManifest> {
        self.get(booking_id).map(|entry| &entry.manifest)
    }

    /// Number of known bookings
    #[must_use]
    pub fn count(&self) -> usize {
        self.bookings.len()
    }

    /// Non-terminal bookings owned by `user_id`
    #[must_use]
    pub fn active_bookings_of(&self, user_id: UserId) -> usize {
        self.bookings
            .values()
            .filter(|entry| entry.booking.is_owned_by(user_id) && !entry.booking.status.is_terminal())
            .count()
    }
}

// ============================================================================
// Actions (Commands + Events)
// ============================================================================

/// Actions for the booking aggregate
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingAction {
    // Commands
    /// Fetch bookings visible to the session
    LoadBookings {
        /// Caller
        session: Session,
        /// Which bookings
        filter: BookingFilter,
    },

    /// Book a room
    CreateBooking {
        /// Caller
        session: Session,
        /// Room as read from the catalog
        room: Room,
        /// Form values
        request: BookingRequest,
    },

    /// Change dates, room or party size
    EditBooking {
        /// Caller
        session: Session,
        /// Booking to edit
        booking_id: BookingId,
        /// Room the booking will be in, as read from the catalog
        room: Room,
        /// Form values
        changes: BookingChanges,
    },

    /// Accept a pending booking
    ConfirmBooking {
        /// Caller
        session: Session,
        /// Booking to confirm
        booking_id: BookingId,
    },

    /// Close a finished stay
    CompleteBooking {
        /// Caller
        session: Session,
        /// Booking to complete
        booking_id: BookingId,
    },

    /// Withdraw a booking
    CancelBooking {
        /// Caller
        session: Session,
        /// Booking to cancel
        booking_id: BookingId,
    },

    /// Register a guest in a manifest row, or update a registered one
    SaveGuest {
        /// Caller
        session: Session,
        /// Parent booking
        booking_id: BookingId,
        /// Manifest row being filled
        slot: usize,
        /// Guest details; carries an id when updating
        guest: Guest,
    },

    /// Clear a manifest row, deleting the registered guest if there is one
    RemoveGuest {
        /// Caller
        session: Session,
        /// Parent booking
        booking_id: BookingId,
        /// Manifest row to clear
        slot: usize,
    },

    // Events
    /// Bookings returned by the backend
    BookingsLoaded {
        /// Bookings with their guests
        snapshots: Vec<BookingSnapshot>,
    },

    /// A new booking was stored
    BookingCreated {
        /// Stored booking, with its id
        booking: Booking,
    },

    /// An edit was stored
    BookingUpdated {
        /// Stored booking
        booking: Booking,
    },

    /// The booking is confirmed
    BookingConfirmed {
        /// Stored booking
        booking: Booking,
    },

    /// The stay is closed
    BookingCompleted {
        /// Stored booking
        booking: Booking,
    },

    /// The booking is cancelled
    BookingCancelled {
        /// Stored booking
        booking: Booking,
    },

    /// A guest was stored
    GuestSaved {
        /// Parent booking
        booking_id: BookingId,
        /// Row the guest was entered in
        slot: usize,
        /// Stored guest, with its id
        guest: Guest,
    },

    /// A manifest row was cleared
    GuestRemoved {
        /// Parent booking
        booking_id: BookingId,
        /// Row that was cleared
        slot: usize,
        /// Deleted guest, if the row held a registered one
        guest_id: Option<GuestId>,
    },

    /// A command broke a lifecycle rule
    CommandRejected {
        /// The broken rule
        error: BookingError,
    },

    /// The backend did not accept a request
    PersistenceFailed {
        /// Booking the request was about, if it had one
        booking_id: Option<BookingId>,
        /// Backend failure
        error: PersistenceError,
    },
}

impl BookingAction {
    /// Whether this action reports an outcome rather than asking for one
    #[must_use]
    pub const fn is_event(&self) -> bool {
        !matches!(
            self,
            Self::LoadBookings { .. }
                | Self::CreateBooking { .. }
                | Self::EditBooking { .. }
                | Self::ConfirmBooking { .. }
                | Self::CompleteBooking { .. }
                | Self::CancelBooking { .. }
                | Self::SaveGuest { .. }
                | Self::RemoveGuest { .. }
        )
    }
}

// ============================================================================
// Environment
// ============================================================================

/// Collaborators of the booking aggregate
pub struct BookingEnvironment<B, G> {
    /// Booking backend
    pub bookings: Arc<B>,
    /// Guest backend
    pub guests: Arc<G>,
    /// Clock for `created_at` and `updated_at`
    pub clock: Arc<dyn Clock>,
}

impl<B, G> BookingEnvironment<B, G> {
    /// Creates a new `BookingEnvironment`
    #[must_use]
    pub fn new(bookings: Arc<B>, guests: Arc<G>, clock: Arc<dyn Clock>) -> Self {
        Self { bookings, guests, clock }
    }
}

impl<B, G> Clone for BookingEnvironment<B, G> {
    fn clone(&self) -> Self {
        Self {
            bookings: Arc::clone(&self.bookings),
            guests: Arc::clone(&self.guests),
            clock: Arc::clone(&self.clock),
        }
    }
}

// ============================================================================
// Reducer
// ============================================================================

/// Reducer for the booking aggregate
pub struct BookingReducer<B, G> {
    lifecycle: BookingLifecycle,
    providers: PhantomData<fn() -> (B, G)>,
}

impl<B, G> BookingReducer<B, G> {
    /// Reducer enforcing `lifecycle`
    #[must_use]
    pub const fn new(lifecycle: BookingLifecycle) -> Self {
        Self {
            lifecycle,
            providers: PhantomData,
        }
    }

    /// Rules this reducer enforces
    #[must_use]
    pub const fn lifecycle(&self) -> &BookingLifecycle {
        &self.lifecycle
    }

    fn entry(state: &BookingState, booking_id: BookingId) -> Result<&BookingEntry, BookingError> {
        state
            .get(booking_id)
            .ok_or(BookingError::BookingNotFound { booking_id })
    }

    /// Checks that `guest` can be saved into row `slot`
    fn validate_guest_slot(manifest: &GuestManifest, slot: usize, guest: &Guest) -> Result<(), BookingError> {
        guest.validate()?;
        if let Some(guest_id) = guest.id {
            return if manifest.guests().iter().any(|row| row.id == Some(guest_id)) {
                Ok(())
            } else {
                Err(BookingError::GuestNotFound { guest_id })
            };
        }

        match manifest.get(slot) {
            Some(row) if row.is_persisted() => Err(BookingError::ManifestSize {
                requested: i64::try_from(manifest.persisted_count() + 1).unwrap_or(i64::MAX),
                reason: format!("row {slot} already holds a registered guest"),
            }),
            Some(_) => Ok(()),
            None if slot == manifest.len() && manifest.len() < manifest.limit() => Ok(()),
            None if slot == manifest.len() => Err(BookingError::ManifestSize {
                requested: i64::try_from(slot + 1).unwrap_or(i64::MAX),
                reason: format!("booking allows {} guests", manifest.limit()),
            }),
            None => Err(BookingError::IndexOutOfRange {
                index: slot,
                len: manifest.len(),
            }),
        }
    }

    /// Brings the manifest in line with its booking's guest count and status
    ///
    /// Rows with content move to the front. While guests can be managed the
    /// manifest is padded to the guest count; otherwise placeholders go.
    /// Registered guests are never dropped.
    fn sync_manifest(&self, entry: &mut BookingEntry) {
        let manifest = &mut entry.manifest;
        manifest.compact();
        manifest.trim_placeholders();

        let guest_count = usize::try_from(entry.booking.guest_count).unwrap_or(usize::MAX);
        let target = guest_count.max(manifest.len());
        let synced = if self.lifecycle.allows_guest_management(entry.booking.status) {
            manifest.ensure_size(i64::try_from(target).unwrap_or(i64::MAX))
        } else {
            manifest.set_limit(target)
        };
        if let Err(error) = synced {
            tracing::warn!(booking_id = ?entry.booking.id, %error, "Guest manifest out of sync");
        }
    }

    /// Stores `booking`, keeping the manifest of a known booking
    fn store_booking(&self, state: &mut BookingState, booking: &Booking) {
        let Some(booking_id) = booking.id else {
            tracing::warn!("Backend returned a booking without an id");
            return;
        };
        let guest_count = usize::try_from(booking.guest_count).unwrap_or(usize::MAX);
        let entry = state.bookings.entry(booking_id).or_insert_with(|| BookingEntry {
            booking: booking.clone(),
            manifest: GuestManifest::new(guest_count),
        });
        entry.booking = booking.clone();
        self.sync_manifest(entry);
    }

    fn apply_event(&self, state: &mut BookingState, action: &BookingAction) {
        match action {
            BookingAction::BookingsLoaded { snapshots } => {
                for snapshot in snapshots {
                    let Some(booking_id) = snapshot.booking.id else {
                        continue;
                    };
                    let guest_count = usize::try_from(snapshot.booking.guest_count).unwrap_or(usize::MAX);
                    if snapshot.guests.len() > guest_count {
                        tracing::warn!(
                            %booking_id,
                            guest_count,
                            stored = snapshot.guests.len(),
                            "Backend lists more guests than the booking holds"
                        );
                    }
                    let mut entry = BookingEntry {
                        booking: snapshot.booking.clone(),
                        manifest: GuestManifest::with_stored(guest_count, snapshot.guests.clone()),
                    };
                    self.sync_manifest(&mut entry);
                    state.bookings.insert(booking_id, entry);
                }
            },

            BookingAction::BookingCreated { booking }
            | BookingAction::BookingUpdated { booking }
            | BookingAction::BookingConfirmed { booking }
            | BookingAction::BookingCompleted { booking }
            | BookingAction::BookingCancelled { booking } => {
                self.store_booking(state, booking);
            },

            BookingAction::GuestSaved {
                booking_id,
                slot,
                guest,
            } => {
                let Some(entry) = state.bookings.get_mut(booking_id) else {
                    return;
                };
                let known = guest
                    .id
                    .is_some_and(|id| entry.manifest.guests().iter().any(|row| row.id == Some(id)));
                let open_row = entry.manifest.get(*slot).is_some_and(|row| !row.is_persisted());
                let saved = if known {
                    entry.manifest.upsert(guest.clone()).map(|_| ())
                } else if open_row {
                    entry.manifest.set(*slot, guest.clone())
                } else {
                    entry.manifest.add(guest.clone()).map(|_| ())
                };
                if let Err(error) = saved {
                    tracing::warn!(%booking_id, %error, "Stored guest does not fit the manifest");
                }
            },

            BookingAction::GuestRemoved {
                booking_id,
                slot,
                guest_id,
            } => {
                let Some(entry) = state.bookings.get_mut(booking_id) else {
                    return;
                };
                let index = match guest_id {
                    Some(id) => entry.manifest.guests().iter().position(|row| row.id == Some(*id)),
                    None => Some(*slot),
                };
                if let Some(index) = index {
                    if let Err(error) = entry.manifest.remove(index) {
                        tracing::warn!(%booking_id, %error, "Removed guest row is gone");
                    }
                }
                self.sync_manifest(entry);
            },

            BookingAction::CommandRejected { error } => {
                state.last_error = Some(error.clone());
            },

            BookingAction::PersistenceFailed { error, .. } => {
                state.last_persistence_error = Some(error.clone());
            },

            // Commands are not applied
            _ => {},
        }
    }

    fn reject(error: BookingError) -> Effects<BookingAction> {
        smallvec![Effect::send(BookingAction::CommandRejected { error })]
    }
}

impl<B, G> Default for BookingReducer<B, G> {
    fn default() -> Self {
        Self::new(BookingLifecycle::default())
    }
}

impl<B, G> Clone for BookingReducer<B, G> {
    fn clone(&self) -> Self {
        Self::new(self.lifecycle)
    }
}

/// Feeds the backend's answer back as `on_success`, or as `PersistenceFailed`
fn report<T>(
    booking_id: Option<BookingId>,
    result: Result<T, PersistenceError>,
    on_success: impl FnOnce(T) -> BookingAction,
) -> Option<BookingAction> {
    Some(match result {
        Ok(value) => on_success(value),
        Err(error) => BookingAction::PersistenceFailed { booking_id, error },
    })
}

impl<B, G> Reducer for BookingReducer<B, G>
where
    B: BookingApi + 'static,
    G: GuestApi + 'static,
{
    type State = BookingState;
    type Action = BookingAction;
    type Environment = BookingEnvironment<B, G>;

    #[allow(clippy::too_many_lines)] // One arm per command and event
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        if !action.is_event() {
            state.last_error = None;
            state.last_persistence_error = None;
        }

        match action {
            // ========== Queries ==========
            BookingAction::LoadBookings { session, filter } => {
                let api = Arc::clone(&env.bookings);
                smallvec![Effect::future(async move {
                    let result = api.list(&session, &filter).await;
                    report(None, result, |snapshots| BookingAction::BookingsLoaded { snapshots })
                })]
            },

            // ========== Lifecycle commands ==========
            BookingAction::CreateBooking {
                session,
                room,
                request,
            } => {
                let active = session
                    .booking_owner(request.user_id)
                    .map_or(0, |owner| state.active_bookings_of(owner));
                let booking = match self
                    .lifecycle
                    .create(&session, &room, &request, active, env.clock.now())
                {
                    Ok(booking) => booking,
                    Err(error) => return Self::reject(error),
                };

                let api = Arc::clone(&env.bookings);
                smallvec![Effect::future(async move {
                    let result = api.create(&session, &booking).await;
                    report(None, result, |booking| BookingAction::BookingCreated { booking })
                })]
            },

            BookingAction::EditBooking {
                session,
                booking_id,
                room,
                changes,
            } => {
                let edited = Self::entry(state, booking_id).and_then(|entry| {
                    self.lifecycle.edit(
                        &session,
                        &entry.booking,
                        &entry.manifest,
                        &room,
                        &changes,
                        env.clock.now(),
                    )
                });
                let booking = match edited {
                    Ok(booking) => booking,
                    Err(error) => return Self::reject(error),
                };

                let api = Arc::clone(&env.bookings);
                smallvec![Effect::future(async move {
                    let result = api.update(&session, booking_id, &booking).await;
                    report(Some(booking_id), result, |booking| BookingAction::BookingUpdated { booking })
                })]
            },

            BookingAction::ConfirmBooking { session, booking_id } => {
                let checked = Self::entry(state, booking_id)
                    .and_then(|entry| self.lifecycle.confirm(&session, &entry.booking, env.clock.now()));
                if let Err(error) = checked {
                    return Self::reject(error);
                }

                let api = Arc::clone(&env.bookings);
                smallvec![Effect::future(async move {
                    let result = api.confirm(&session, booking_id).await;
                    report(Some(booking_id), result, |booking| BookingAction::BookingConfirmed { booking })
                })]
            },

            BookingAction::CompleteBooking { session, booking_id } => {
                let checked = Self::entry(state, booking_id)
                    .and_then(|entry| self.lifecycle.complete(&session, &entry.booking, env.clock.now()));
                if let Err(error) = checked {
                    return Self::reject(error);
                }

                let api = Arc::clone(&env.bookings);
                smallvec![Effect::future(async move {
                    let result = api.complete(&session, booking_id).await;
                    report(Some(booking_id), result, |booking| BookingAction::BookingCompleted { booking })
                })]
            },

            BookingAction::CancelBooking { session, booking_id } => {
                let checked = Self::entry(state, booking_id)
                    .and_then(|entry| self.lifecycle.cancel(&session, &entry.booking, env.clock.now()));
                if let Err(error) = checked {
                    return Self::reject(error);
                }

                let api = Arc::clone(&env.bookings);
                smallvec![Effect::future(async move {
                    let result = api.cancel(&session, booking_id).await;
                    report(Some(booking_id), result, |booking| BookingAction::BookingCancelled { booking })
                })]
            },

            // ========== Guest commands ==========
            BookingAction::SaveGuest {
                session,
                booking_id,
                slot,
                guest,
            } => {
                let checked = Self::entry(state, booking_id).and_then(|entry| {
                    self.lifecycle
                        .authorize_guest_management(&session, &entry.booking)?;
                    Self::validate_guest_slot(&entry.manifest, slot, &guest)
                });
                if let Err(error) = checked {
                    return Self::reject(error);
                }

                let api = Arc::clone(&env.guests);
                smallvec![Effect::future(async move {
                    let result = match guest.id {
                        Some(guest_id) => api.edit_guest(&session, booking_id, guest_id, &guest).await,
                        None => api.add_guest(&session, booking_id, &guest).await,
                    };
                    report(Some(booking_id), result, |guest| BookingAction::GuestSaved {
                        booking_id,
                        slot,
                        guest,
                    })
                })]
            },

            BookingAction::RemoveGuest {
                session,
                booking_id,
                slot,
            } => {
                let row = Self::entry(state, booking_id).and_then(|entry| {
                    self.lifecycle
                        .authorize_guest_management(&session, &entry.booking)?;
                    entry
                        .manifest
                        .get(slot)
                        .map(|row| row.id)
                        .ok_or(BookingError::IndexOutOfRange {
                            index: slot,
                            len: entry.manifest.len(),
                        })
                });
                let guest_id = match row {
                    Ok(guest_id) => guest_id,
                    Err(error) => return Self::reject(error),
                };

                let Some(guest_id) = guest_id else {
                    // Placeholder rows were never stored
                    return smallvec![Effect::send(BookingAction::GuestRemoved {
                        booking_id,
                        slot,
                        guest_id: None,
                    })];
                };

                let api = Arc::clone(&env.guests);
                smallvec![Effect::future(async move {
                    let result = api.delete_guest(&session, booking_id, guest_id).await;
                    report(Some(booking_id), result, |()| BookingAction::GuestRemoved {
                        booking_id,
                        slot,
                        guest_id: Some(guest_id),
                    })
                })]
            },

            // ========== Events ==========
            event => {
                self.apply_event(state, &event);
                SmallVec::new()
            },
        }
    }
}
