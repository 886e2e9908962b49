//! # Innkeep Booking
//!
//! Booking lifecycle and guest-manifest reconciliation for hotel room
//! bookings.
//!
//! - **Validation**: [`DateRange`] and [`CapacityPolicy`] check dates and
//!   party size; [`PriceCalculator`] derives the total
//! - **Lifecycle**: [`BookingLifecycle`] is the status state machine, with
//!   role checks through [`Session`]
//! - **Guests**: [`GuestManifest`] keeps one row per expected occupant
//! - **Orchestration**: the [`BookingReducer`] turns commands into one
//!   persistence request each; the [`BookingDesk`] wraps it for a user
//!   interface (catalog lookups, confirmation prompts, notifications)
//!
//! # Architecture
//!
//! ```text
//! BookingDesk ── command ──▶ Store ──▶ BookingReducer ── validate (BookingLifecycle)
//!      ▲                                    │
//!      │                             Effect::Future
//!      │                                    ▼
//!      └──── outcome event ◀──────── BookingApi / GuestApi
//! ```
//!
//! Validation never performs I/O. A rejected command changes nothing; an
//! accepted one changes local state only once the backend has answered.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod aggregates;
pub mod app;
pub mod capacity;
pub mod config;
pub mod date_range;
pub mod error;
pub mod filter;
pub mod lifecycle;
pub mod manifest;
pub mod mocks;
pub mod pricing;
pub mod providers;
pub mod session;
pub mod types;

pub use aggregates::{BookingAction, BookingEntry, BookingEnvironment, BookingReducer, BookingState};
pub use app::BookingDesk;
pub use capacity::CapacityPolicy;
pub use config::Config;
pub use date_range::DateRange;
pub use error::{BookingError, DeskError, PersistenceError};
pub use filter::{BookingFilter, BookingSort};
pub use lifecycle::{BookingLifecycle, GuestManagement, LifecycleEvent};
pub use manifest::GuestManifest;
pub use pricing::{PriceCalculator, RateMode};
pub use session::Session;
pub use types::{
    Address, Booking, BookingChanges, BookingId, BookingRequest, BookingSnapshot, BookingStatus, BookingType,
    Guest, GuestId, Money, PaymentStatus, Profile, Role, Room, RoomId, User, UserId,
};
