//! In-memory collaborators for tests and the demo.
//!
//! Writes are last-write-wins; none of these check business rules, that is
//! the lifecycle's job.

pub mod booking_api;
pub mod notifier;
pub mod room_catalog;

pub use booking_api::InMemoryBookingApi;
pub use notifier::{Notification, RecordingNotifier};
pub use room_catalog::InMemoryRoomCatalog;
