//! Application layer.

pub mod desk;

pub use desk::{BookingDesk, DeskResult, FAILURE_MESSAGE};
