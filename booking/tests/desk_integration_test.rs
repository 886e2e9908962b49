//! Booking desk integration tests.
//!
//! Drives the desk end to end against the in-memory backend, catalog and
//! notifier: validation, persistence, prompts and notifications together.
//!
//! Run with: `cargo test --test desk_integration_test`

#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]

use innkeep_booking::app::FAILURE_MESSAGE;
use innkeep_booking::mocks::{InMemoryBookingApi, InMemoryRoomCatalog, Notification, RecordingNotifier};
use innkeep_booking::{
    BookingChanges, BookingDesk, BookingEnvironment, BookingError, BookingFilter, BookingId, BookingLifecycle,
    BookingRequest, BookingSort, BookingStatus, CapacityPolicy, DeskError, Guest, GuestManagement, LifecycleEvent,
    Money, PersistenceError, PriceCalculator, Role, Room, RoomId, Session, UserId,
};
use innkeep_testing::{init_test_tracing, test_clock};
use std::sync::Arc;

type Desk = BookingDesk<InMemoryBookingApi, InMemoryBookingApi, InMemoryRoomCatalog, RecordingNotifier>;

struct Harness {
    desk: Desk,
    api: InMemoryBookingApi,
    notifier: Arc<RecordingNotifier>,
}

fn catalog() -> InMemoryRoomCatalog {
    InMemoryRoomCatalog::new()
        .with_room(Room::new(RoomId::new(1), "Lake View", 4, Money::from_units(100)))
        .with_room(Room::new(RoomId::new(2), "Garden Single", 1, Money::from_units(60)))
}

fn harness_with(lifecycle: BookingLifecycle, api: InMemoryBookingApi, notifier: RecordingNotifier) -> Harness {
    init_test_tracing();
    let notifier = Arc::new(notifier);
    let environment = BookingEnvironment::new(
        Arc::new(api.clone()),
        Arc::new(api.clone()),
        Arc::new(test_clock()),
    );
    Harness {
        desk: BookingDesk::new(lifecycle, environment, Arc::new(catalog()), Arc::clone(&notifier)),
        api,
        notifier,
    }
}

fn harness() -> Harness {
    harness_with(BookingLifecycle::default(), InMemoryBookingApi::new(), RecordingNotifier::new())
}

fn admin() -> Session {
    Session::new(UserId::new(1), Role::Admin)
}

fn customer() -> Session {
    Session::new(UserId::new(42), Role::Customer)
}

fn request(guest_count: i64) -> BookingRequest {
    BookingRequest {
        room_id: RoomId::new(1),
        user_id: Some(UserId::new(42)),
        check_in: "2024-05-01".to_string(),
        check_out: "2024-05-03".to_string(),
        guest_count,
        guest_name: Some("Ada Lovelace".to_string()),
        ..BookingRequest::default()
    }
}

async fn confirmed_booking(harness: &Harness, guest_count: i64) -> BookingId {
    let booking = harness.desk.create_booking(&admin(), request(guest_count)).await.unwrap();
    let booking_id = booking.id.unwrap();
    harness.desk.confirm_booking(&admin(), booking_id).await.unwrap();
    booking_id
}

/// A valid request is priced, stored once and announced.
#[tokio::test]
async fn test_create_booking_prices_the_stay() {
    let harness = harness();

    let booking = harness.desk.create_booking(&admin(), request(2)).await.unwrap();

    assert_eq!(booking.id, Some(BookingId::new(1)));
    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(booking.total_price, Money::from_units(200));
    assert_eq!(booking.user_id, Some(UserId::new(42)));
    assert_eq!(harness.api.request_count(), 1);
    assert_eq!(harness.notifier.successes(), vec!["Booking has been added"]);
    assert_eq!(harness.desk.booking(BookingId::new(1)).await, Some(booking));
}

/// Per-guest pricing multiplies by the party size.
#[tokio::test]
async fn test_per_guest_pricing() {
    let lifecycle = BookingLifecycle::new(
        CapacityPolicy::new(),
        PriceCalculator::new(innkeep_booking::RateMode::PerGuest),
        GuestManagement::ConfirmedOnly,
    );
    let harness = harness_with(lifecycle, InMemoryBookingApi::new(), RecordingNotifier::new());

    let booking = harness.desk.create_booking(&admin(), request(3)).await.unwrap();

    assert_eq!(booking.total_price, Money::from_units(600));
}

/// Too many guests never reach the backend.
#[tokio::test]
async fn test_oversized_party_is_rejected() {
    let harness = harness();

    let error = harness.desk.create_booking(&admin(), request(5)).await.unwrap_err();

    let expected = BookingError::CapacityExceeded {
        guest_count: 5,
        capacity: 4,
    };
    assert_eq!(harness.notifier.failures(), vec![expected.to_string()]);
    assert_eq!(error, DeskError::Validation(expected));
    assert_eq!(harness.api.request_count(), 0);
    assert!(harness.desk.bookings(&BookingFilter::new(), BookingSort::Id, false).await.is_empty());
}

/// Check-out on the check-in day is not a stay.
#[tokio::test]
async fn test_empty_range_is_rejected() {
    let harness = harness();
    let mut request = request(2);
    request.check_out = request.check_in.clone();

    let error = harness.desk.create_booking(&admin(), request).await.unwrap_err();

    assert!(matches!(error, DeskError::Validation(BookingError::InvalidRange { .. })));
    assert_eq!(harness.api.request_count(), 0);
}

/// An unknown room fails at the catalog, before any validation.
#[tokio::test]
async fn test_unknown_room_is_a_catalog_failure() {
    let harness = harness();
    let mut request = request(2);
    request.room_id = RoomId::new(99);

    let error = harness.desk.create_booking(&admin(), request).await.unwrap_err();

    assert!(matches!(error, DeskError::Catalog(PersistenceError::NotFound { .. })));
    assert_eq!(harness.api.request_count(), 0);
}

/// Confirming opens the guest manifest with one placeholder per guest.
#[tokio::test]
async fn test_confirm_opens_the_guest_manifest() {
    let harness = harness();
    let booking_id = confirmed_booking(&harness, 2).await;

    let booking = harness.desk.booking(booking_id).await.unwrap();
    assert_eq!(booking.status, BookingStatus::Confirmed);

    let manifest = harness.desk.manifest(booking_id).await.unwrap();
    assert_eq!(manifest.len(), 2);
    assert!(!manifest.has_persisted_guests());
    assert_eq!(
        harness.notifier.successes(),
        vec!["Booking has been added", "Booking has been confirmed"]
    );
}

/// A cancelled booking can no longer be edited.
#[tokio::test]
async fn test_cancelled_booking_cannot_be_edited() {
    let harness = harness();
    let booking_id = confirmed_booking(&harness, 2).await;

    let cancelled = harness.desk.cancel_booking(&admin(), booking_id).await.unwrap().unwrap();
    assert_eq!(cancelled.status, BookingStatus::Cancelled);
    assert!(harness.desk.manifest(booking_id).await.unwrap().is_empty());

    let changes = BookingChanges::from_booking(&cancelled);
    let error = harness.desk.edit_booking(&admin(), booking_id, changes).await.unwrap_err();

    assert_eq!(
        error,
        DeskError::Validation(BookingError::InvalidTransition {
            from: BookingStatus::Cancelled,
            event: LifecycleEvent::Edit,
        })
    );
}

/// A stay cannot be closed before it is confirmed.
#[tokio::test]
async fn test_pending_booking_cannot_be_completed() {
    let harness = harness();
    let booking = harness.desk.create_booking(&admin(), request(2)).await.unwrap();
    let booking_id = booking.id.unwrap();
    let requests = harness.api.request_count();

    let error = harness.desk.complete_booking(&admin(), booking_id).await.unwrap_err();

    assert_eq!(
        error,
        DeskError::Validation(BookingError::InvalidTransition {
            from: BookingStatus::Pending,
            event: LifecycleEvent::Complete,
        })
    );
    assert_eq!(harness.api.request_count(), requests);
    assert_eq!(
        harness.desk.booking(booking_id).await.unwrap().status,
        BookingStatus::Pending
    );
}

/// Declining the prompt leaves everything as it was.
#[tokio::test]
async fn test_declined_cancellation_changes_nothing() {
    let harness = harness_with(
        BookingLifecycle::default(),
        InMemoryBookingApi::new(),
        RecordingNotifier::declining(),
    );
    let booking = harness.desk.create_booking(&admin(), request(2)).await.unwrap();
    let booking_id = booking.id.unwrap();

    let outcome = harness.desk.cancel_booking(&admin(), booking_id).await.unwrap();

    assert_eq!(outcome, None);
    assert_eq!(harness.api.request_count(), 1);
    assert_eq!(
        harness.desk.booking(booking_id).await.unwrap().status,
        BookingStatus::Pending
    );
    assert!(matches!(
        harness.notifier.notifications().last(),
        Some(Notification::Prompt(prompt)) if prompt.confirm_label == "Yes, cancel it!"
    ));
}

/// A backend failure shows the generic message and keeps the old status.
#[tokio::test]
async fn test_backend_failure_keeps_the_booking() {
    let harness = harness();
    let booking = harness.desk.create_booking(&admin(), request(2)).await.unwrap();
    let booking_id = booking.id.unwrap();
    harness.api.fail_next(PersistenceError::Rejected {
        status: 500,
        message: "internal error".to_string(),
    });

    let error = harness.desk.confirm_booking(&admin(), booking_id).await.unwrap_err();

    assert!(matches!(error, DeskError::Persistence(PersistenceError::Rejected { status: 500, .. })));
    assert_eq!(harness.notifier.failures(), vec![FAILURE_MESSAGE]);
    assert_eq!(
        harness.desk.booking(booking_id).await.unwrap().status,
        BookingStatus::Pending
    );
    assert_eq!(
        harness.api.stored_booking(booking_id).unwrap().status,
        BookingStatus::Pending
    );
}

/// Customers cannot confirm, even their own booking.
#[tokio::test]
async fn test_customer_cannot_confirm() {
    let harness = harness();
    let booking = harness.desk.create_booking(&customer(), request(2)).await.unwrap();
    let booking_id = booking.id.unwrap();

    let error = harness.desk.confirm_booking(&customer(), booking_id).await.unwrap_err();

    assert_eq!(
        error,
        DeskError::Validation(BookingError::Forbidden {
            role: Role::Customer,
            event: LifecycleEvent::Confirm,
        })
    );
    assert_eq!(harness.notifier.failures(), vec!["A customer may not confirm this booking"]);
}

/// A customer may not book for somebody else.
#[tokio::test]
async fn test_customer_cannot_book_for_another_account() {
    let harness = harness();
    let mut request = request(2);
    request.user_id = Some(UserId::new(7));

    let error = harness.desk.create_booking(&customer(), request).await.unwrap_err();

    assert!(matches!(
        error,
        DeskError::Validation(BookingError::Forbidden {
            role: Role::Customer,
            event: LifecycleEvent::Create,
        })
    ));
    assert_eq!(harness.api.request_count(), 0);
}

/// Guests fill placeholder rows; deleting one brings the placeholder back.
#[tokio::test]
async fn test_guest_registration_round() {
    let harness = harness();
    let booking_id = confirmed_booking(&harness, 2).await;

    let guest = harness
        .desk
        .save_guest(&customer(), booking_id, 0, Guest::named("Ada", "Lovelace"))
        .await
        .unwrap();
    assert!(guest.is_persisted());
    assert_eq!(guest.booking_id, Some(booking_id));

    let manifest = harness.desk.manifest(booking_id).await.unwrap();
    assert_eq!(manifest.len(), 2);
    assert_eq!(manifest.persisted_count(), 1);
    assert_eq!(harness.api.stored_guests(booking_id).len(), 1);

    assert!(harness.desk.remove_guest(&admin(), booking_id, 0).await.unwrap());

    let manifest = harness.desk.manifest(booking_id).await.unwrap();
    assert_eq!(manifest.len(), 2);
    assert!(!manifest.has_persisted_guests());
    assert!(harness.api.stored_guests(booking_id).is_empty());
    assert!(harness.notifier.successes().contains(&"Guest has been deleted".to_string()));
}

/// Placeholder rows are cleared without asking or calling the backend.
#[tokio::test]
async fn test_placeholder_removal_needs_no_prompt() {
    let harness = harness();
    let booking_id = confirmed_booking(&harness, 2).await;
    let requests = harness.api.request_count();

    assert!(harness.desk.remove_guest(&admin(), booking_id, 1).await.unwrap());

    assert_eq!(harness.api.request_count(), requests);
    assert!(!harness
        .notifier
        .notifications()
        .iter()
        .any(|notification| matches!(notification, Notification::Prompt(_))));
    assert_eq!(harness.desk.manifest(booking_id).await.unwrap().len(), 2);
}

/// Guests cannot be registered before the booking is confirmed.
#[tokio::test]
async fn test_guests_wait_for_confirmation() {
    let harness = harness();
    let booking = harness.desk.create_booking(&admin(), request(2)).await.unwrap();
    let booking_id = booking.id.unwrap();

    let error = harness
        .desk
        .save_guest(&admin(), booking_id, 0, Guest::named("Ada", "Lovelace"))
        .await
        .unwrap_err();

    assert!(matches!(error, DeskError::Validation(BookingError::InvalidTransition { .. })));
    assert!(harness.api.stored_guests(booking_id).is_empty());
}

/// The party cannot shrink below the guests already registered.
#[tokio::test]
async fn test_party_cannot_shrink_below_registered_guests() {
    let harness = harness();
    let booking_id = confirmed_booking(&harness, 2).await;
    for (slot, name) in ["Ada", "Ben"].into_iter().enumerate() {
        harness
            .desk
            .save_guest(&admin(), booking_id, slot, Guest::named(name, "Tester"))
            .await
            .unwrap();
    }

    let booking = harness.desk.booking(booking_id).await.unwrap();
    let mut changes = BookingChanges::from_booking(&booking);
    changes.guest_count = 1;
    let error = harness.desk.edit_booking(&admin(), booking_id, changes).await.unwrap_err();

    assert!(matches!(error, DeskError::Validation(BookingError::ManifestSize { requested: 1, .. })));
    assert!(harness.desk.manifest(booking_id).await.unwrap().is_complete());
}

/// Editing the stay recomputes the total.
#[tokio::test]
async fn test_edit_recomputes_the_total() {
    let harness = harness();
    let booking = harness.desk.create_booking(&admin(), request(2)).await.unwrap();
    let booking_id = booking.id.unwrap();

    let mut changes = BookingChanges::from_booking(&booking);
    changes.check_out = "2024-05-05".to_string();
    let edited = harness.desk.edit_booking(&admin(), booking_id, changes).await.unwrap();

    assert_eq!(edited.total_price, Money::from_units(400));
    assert_eq!(
        harness.api.stored_booking(booking_id).unwrap().total_price,
        Money::from_units(400)
    );
}

/// The active-booking quota counts pending and confirmed bookings.
#[tokio::test]
async fn test_active_booking_quota() {
    let lifecycle = BookingLifecycle::new(
        CapacityPolicy::new().with_max_active_bookings(1),
        PriceCalculator::default(),
        GuestManagement::ConfirmedOnly,
    );
    let harness = harness_with(lifecycle, InMemoryBookingApi::new(), RecordingNotifier::new());
    harness.desk.create_booking(&admin(), request(2)).await.unwrap();

    let error = harness.desk.create_booking(&admin(), request(2)).await.unwrap_err();

    assert_eq!(
        error,
        DeskError::Validation(BookingError::BookingLimitReached { active: 1, limit: 1 })
    );
}

/// Customers only load their own bookings.
#[tokio::test]
async fn test_customers_load_their_own_bookings() {
    let api = InMemoryBookingApi::new();
    let staff = harness_with(BookingLifecycle::default(), api.clone(), RecordingNotifier::new());
    staff.desk.create_booking(&admin(), request(2)).await.unwrap();
    let mut other = request(1);
    other.user_id = Some(UserId::new(7));
    staff.desk.create_booking(&admin(), other).await.unwrap();

    let guest_desk = harness_with(BookingLifecycle::default(), api, RecordingNotifier::new());
    let loaded = guest_desk.desk.load_bookings(&customer(), BookingFilter::new()).await.unwrap();

    assert_eq!(loaded, 1);
    let bookings = guest_desk.desk.bookings(&BookingFilter::new(), BookingSort::Id, false).await;
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0].user_id, Some(UserId::new(42)));
}

/// Room search only offers rooms large enough for the party.
#[tokio::test]
async fn test_room_search_fits_the_party() {
    let harness = harness();

    let rooms = harness.desk.search_rooms(2).await.unwrap();

    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0].id, RoomId::new(1));
    assert_eq!(harness.desk.search_rooms(1).await.unwrap().len(), 2);
}
