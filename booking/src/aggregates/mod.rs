//! Aggregates driven by the store.

pub mod booking;

pub use booking::{BookingAction, BookingEntry, BookingEnvironment, BookingReducer, BookingState};
