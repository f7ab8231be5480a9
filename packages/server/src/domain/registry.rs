//! SessionRegistry trait: the single owner of connection and room state.
//!
//! The registry is the only shared mutable resource in the relay. Callers
//! never clone or cache its tables; they always re-query through these
//! accessors, and every compound operation (notably `join_room`) is atomic
//! with respect to all the others.

use async_trait::async_trait;
use serde::Serialize;

use super::connection::{Connection, ConnectionId, UserInfo};
use super::error::RegistryError;
use super::room::RoomId;

/// Read-only view of the registry for debugging endpoints
#[derive(Debug, Serialize)]
pub struct PresenceSnapshot {
    pub connections: Vec<Connection>,
    pub rooms: Vec<RoomSnapshot>,
}

#[derive(Debug, Serialize)]
pub struct RoomSnapshot {
    pub room_id: RoomId,
    pub members: Vec<ConnectionId>,
}

/// Process-wide presence and membership state.
///
/// Implementations must serialize all mutations: events from different
/// connections may interleave between calls, but no two calls may observe
/// each other's partial effects.
#[async_trait]
pub trait SessionRegistry: Send + Sync {
    /// Create an entry for a fresh connection; duplicate ids are a no-op
    async fn register(&self, connection_id: ConnectionId);

    /// Attach announced identity; returns `false` for an unknown id
    async fn announce(&self, connection_id: &ConnectionId, user_info: UserInfo) -> bool;

    /// Remove and return the entry; `None` when already removed
    async fn unregister(&self, connection_id: &ConnectionId) -> Option<Connection>;

    async fn is_registered(&self, connection_id: &ConnectionId) -> bool;

    async fn user_info_of(&self, connection_id: &ConnectionId) -> Option<UserInfo>;

    /// Every live connection id, a snapshot at call time
    async fn all_connection_ids(&self) -> Vec<ConnectionId>;

    /// Insert the connection into the room and report the members that were
    /// present before the join, in one atomic step.
    async fn join_room(
        &self,
        room_id: RoomId,
        connection_id: &ConnectionId,
    ) -> Result<Vec<ConnectionId>, RegistryError>;

    /// Remove the connection from one room; idempotent. Returns whether the
    /// connection actually was a member, so callers can skip spurious
    /// `user-left` notifications on a repeated leave.
    async fn leave_room(&self, room_id: &RoomId, connection_id: &ConnectionId) -> bool;

    /// Current members of a room; empty for an unknown room
    async fn members_of(&self, room_id: &RoomId) -> Vec<ConnectionId>;

    /// Remove the connection from every room, returning the affected rooms
    async fn remove_everywhere(&self, connection_id: &ConnectionId) -> Vec<RoomId>;

    /// Full registry snapshot for the debug endpoint
    async fn snapshot(&self) -> PresenceSnapshot;
}
