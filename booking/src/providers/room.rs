//! Room catalog trait.

use crate::error::PersistenceError;
use crate::types::{Room, RoomId};
use std::future::Future;

/// Read access to the rooms that can be booked
pub trait RoomCatalog: Send + Sync {
    /// One room, including soft-deleted ones
    ///
    /// # Errors
    ///
    /// [`PersistenceError::NotFound`] for an unknown id.
    fn get(&self, room_id: RoomId) -> impl Future<Output = Result<Room, PersistenceError>> + Send;

    /// Every room that is not soft-deleted
    ///
    /// # Errors
    ///
    /// Returns error if the catalog cannot be reached.
    fn list(&self) -> impl Future<Output = Result<Vec<Room>, PersistenceError>> + Send;
}
