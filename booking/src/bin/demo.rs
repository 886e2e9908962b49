//! Booking desk walkthrough against in-memory collaborators.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin innkeep-demo
//!
//! # Per-guest pricing, guests manageable on pending bookings
//! BOOKING_RATE_MODE=per_guest BOOKING_GUEST_MANAGEMENT=open cargo run --bin innkeep-demo
//! ```

use chrono::{Days, Utc};
use innkeep_booking::mocks::{InMemoryBookingApi, InMemoryRoomCatalog, RecordingNotifier};
use innkeep_booking::{
    BookingChanges, BookingDesk, BookingEnvironment, BookingFilter, BookingId, BookingRequest, BookingSort, Config,
    Guest, Money, Role, Room, RoomId, Session, UserId,
};
use innkeep_core::environment::SystemClock;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

type Desk = BookingDesk<InMemoryBookingApi, InMemoryBookingApi, InMemoryRoomCatalog, RecordingNotifier>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_level.clone().into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        rate_mode = %config.lifecycle.rate_mode,
        guest_management = ?config.lifecycle.guest_management,
        "Starting booking desk"
    );

    let api = Arc::new(InMemoryBookingApi::new());
    let catalog = Arc::new(
        InMemoryRoomCatalog::new()
            .with_room(Room::new(RoomId::new(1), "Lake View", 4, Money::from_units(100)))
            .with_room(Room::new(RoomId::new(2), "Garden Single", 1, Money::from_units(60))),
    );
    let notifier = Arc::new(RecordingNotifier::new());
    let environment = BookingEnvironment::new(Arc::clone(&api), Arc::clone(&api), Arc::new(SystemClock));
    let desk: Desk = BookingDesk::new(config.lifecycle.build(), environment, catalog, Arc::clone(&notifier));

    let receptionist = Session::new(UserId::new(1), Role::Receptionist);
    let customer = Session::new(UserId::new(42), Role::Customer);

    let rooms = desk.search_rooms(2).await?;
    info!(count = rooms.len(), "Rooms for a party of two");

    let stay = stay_with_guests(&desk, &receptionist, &customer).await?;
    let withdrawn = withdrawn_stay(&desk, &customer).await?;

    for booking in desk.bookings(&BookingFilter::new(), BookingSort::CheckIn, false).await {
        info!(
            booking_id = ?booking.id,
            status = %booking.status,
            total_cents = booking.total_price.cents(),
            "Booking"
        );
    }
    info!(
        ?stay,
        ?withdrawn,
        requests = api.request_count(),
        notifications = notifier.notifications().len(),
        "Done"
    );
    Ok(())
}

/// Create, confirm, register every guest, then complete
async fn stay_with_guests(desk: &Desk, receptionist: &Session, customer: &Session) -> anyhow::Result<BookingId> {
    let today = Utc::now().date_naive();
    let check_in = today + Days::new(7);
    let request = BookingRequest {
        room_id: RoomId::new(1),
        check_in: check_in.format("%Y-%m-%d").to_string(),
        check_out: (check_in + Days::new(3)).format("%Y-%m-%d").to_string(),
        guest_count: 2,
        guest_name: Some("Ada Lovelace".to_string()),
        ..BookingRequest::default()
    };

    let booking = desk.create_booking(customer, request).await?;
    let booking_id = booking
        .id
        .ok_or_else(|| anyhow::anyhow!("backend returned a booking without an id"))?;
    info!(%booking_id, total_cents = booking.total_price.cents(), "Booking requested");

    desk.confirm_booking(receptionist, booking_id).await?;
    for (slot, (first_name, last_name)) in [("Ada", "Lovelace"), ("Charles", "Babbage")].into_iter().enumerate() {
        let guest = desk
            .save_guest(customer, booking_id, slot, Guest::named(first_name, last_name))
            .await?;
        info!(%booking_id, slot, guest_id = ?guest.id, "Guest registered");
    }

    let complete = desk
        .manifest(booking_id)
        .await
        .is_some_and(|manifest| manifest.is_complete());
    info!(%booking_id, complete, "Guest manifest");

    desk.complete_booking(receptionist, booking_id).await?;
    Ok(booking_id)
}

/// Create, then cancel; a customer may withdraw their own booking
async fn withdrawn_stay(desk: &Desk, customer: &Session) -> anyhow::Result<BookingId> {
    let check_in = Utc::now().date_naive() + Days::new(30);
    let request = BookingRequest {
        room_id: RoomId::new(2),
        check_in: check_in.format("%Y-%m-%d").to_string(),
        check_out: (check_in + Days::new(1)).format("%Y-%m-%d").to_string(),
        guest_count: 1,
        ..BookingRequest::default()
    };

    let booking = desk.create_booking(customer, request).await?;
    let booking_id = booking
        .id
        .ok_or_else(|| anyhow::anyhow!("backend returned a booking without an id"))?;

    // A second guest does not fit a single room
    let mut changes = BookingChanges::from_booking(&booking);
    changes.guest_count = 2;
    if let Err(error) = desk.edit_booking(customer, booking_id, changes).await {
        info!(%booking_id, %error, "Edit rejected");
    }

    desk.cancel_booking(customer, booking_id).await?;
    Ok(booking_id)
}
