//! RoomDirectory trait: lookup against the external room records.
//!
//! Room CRUD lives in a separate service; the relay only asks whether a
//! room id is known before admitting the first join. If the directory is
//! unreachable the join is rejected and no state is mutated.

use async_trait::async_trait;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

use super::room::RoomId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("room directory unavailable: {0}")]
    Unavailable(String),
}

/// Read-only view of the external room records
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RoomDirectory: Send + Sync {
    /// Whether a room with this id exists upstream
    async fn room_exists(&self, room_id: &RoomId) -> Result<bool, DirectoryError>;
}
