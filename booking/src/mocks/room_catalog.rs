//! In-memory room catalog.

use crate::error::PersistenceError;
use crate::providers::RoomCatalog;
use crate::types::{Room, RoomId};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

/// Room catalog backed by a map
#[derive(Debug, Clone, Default)]
pub struct InMemoryRoomCatalog {
    rooms: Arc<Mutex<BTreeMap<RoomId, Room>>>,
}

impl InMemoryRoomCatalog {
    /// Empty catalog
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a room while building the catalog
    #[must_use]
    pub fn with_room(self, room: Room) -> Self {
        self.insert(room);
        self
    }

    /// Adds or replaces a room
    pub fn insert(&self, room: Room) {
        if let Ok(mut rooms) = self.rooms.lock() {
            rooms.insert(room.id, room);
        }
    }
}

fn poisoned() -> PersistenceError {
    PersistenceError::Transport {
        message: "room catalog lock poisoned".to_string(),
    }
}

impl RoomCatalog for InMemoryRoomCatalog {
    fn get(&self, room_id: RoomId) -> impl Future<Output = Result<Room, PersistenceError>> + Send {
        let rooms = Arc::clone(&self.rooms);

        async move {
            rooms
                .lock()
                .map_err(|_| poisoned())?
                .get(&room_id)
                .cloned()
                .ok_or_else(|| PersistenceError::not_found("room", room_id.get()))
        }
    }

    fn list(&self) -> impl Future<Output = Result<Vec<Room>, PersistenceError>> + Send {
        let rooms = Arc::clone(&self.rooms);

        async move {
            Ok(rooms
                .lock()
                .map_err(|_| poisoned())?
                .values()
                .filter(|room| room.deleted_at.is_none())
                .cloned()
                .collect())
        }
    }
}
