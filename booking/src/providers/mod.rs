//! Booking collaborators.
//!
//! Everything the booking workflow needs from the outside world is a trait
//! here: the persistence backend for bookings and guests, the room catalog,
//! and the notification surface that shows messages and asks for
//! confirmation. The reducer and the desk depend on these traits only;
//! [`crate::mocks`] has in-memory implementations.
//!
//! Every call takes the caller's [`crate::Session`] explicitly. Failures are
//! reported as [`crate::PersistenceError`] and are never retried here.

pub mod booking;
pub mod guest;
pub mod notifier;
pub mod room;

pub use booking::BookingApi;
pub use guest::GuestApi;
pub use notifier::{ConfirmationPrompt, Notifier};
pub use room::RoomCatalog;
