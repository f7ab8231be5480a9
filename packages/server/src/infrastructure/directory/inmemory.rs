//! In-memory RoomDirectory implementation.
//!
//! Stands in for the external room CRUD service. The server binary runs an
//! open directory (every room id is accepted, rooms spring into existence on
//! first join); tests construct a closed directory with a fixed room set to
//! exercise the rejection path.

use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{DirectoryError, RoomDirectory, RoomId};

pub struct InMemoryRoomDirectory {
    /// When `true`, every room id is treated as existing
    open: bool,
    rooms: RwLock<HashSet<RoomId>>,
}

impl InMemoryRoomDirectory {
    /// Directory that accepts every room id
    pub fn open() -> Self {
        Self {
            open: true,
            rooms: RwLock::new(HashSet::new()),
        }
    }

    /// Directory that only knows the given room ids
    pub fn with_rooms(rooms: impl IntoIterator<Item = RoomId>) -> Self {
        Self {
            open: false,
            rooms: RwLock::new(rooms.into_iter().collect()),
        }
    }

    /// Add a room to a closed directory
    pub async fn insert(&self, room_id: RoomId) {
        let mut rooms = self.rooms.write().await;
        rooms.insert(room_id);
    }
}

#[async_trait]
impl RoomDirectory for InMemoryRoomDirectory {
    async fn room_exists(&self, room_id: &RoomId) -> Result<bool, DirectoryError> {
        if self.open {
            return Ok(true);
        }
        let rooms = self.rooms.read().await;
        Ok(rooms.contains(room_id))
    }
}
