//! Connection identity and the process-wide connection table.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::room::RoomId;

/// Opaque identifier for one live transport session.
///
/// Assigned by the server at connect time and never reused after the
/// connection is destroyed. Routing is always addressed by `ConnectionId`,
/// never by user identity: one user may hold several connections (one per
/// browser tab), and peer negotiation is inherently per transport session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(String);

impl ConnectionId {
    /// Wrap an existing identifier (used by tests and deserialization)
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Factory for server-assigned connection identifiers
pub struct ConnectionIdFactory;

impl ConnectionIdFactory {
    /// Generate a fresh, unique `ConnectionId`
    pub fn generate() -> ConnectionId {
        ConnectionId(Uuid::new_v4().to_string())
    }
}

/// Identity a client announces for itself after connecting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    /// Stable user identifier from the upstream account system
    pub user_id: String,
    /// Name shown to other participants
    pub display_name: String,
}

/// One live transport session as the registry sees it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Connection {
    pub id: ConnectionId,
    /// Absent until the client announces itself
    pub user_info: Option<UserInfo>,
    /// Rooms this connection currently belongs to, cached for O(1) cleanup
    pub joined_rooms: HashSet<RoomId>,
}

impl Connection {
    pub fn new(id: ConnectionId) -> Self {
        Self {
            id,
            user_info: None,
            joined_rooms: HashSet::new(),
        }
    }
}

/// Process-wide table of live connections.
///
/// Mutated only by connect/announce/disconnect events. Every operation is
/// idempotent: the transport may deliver connect or disconnect more than once.
#[derive(Debug, Default)]
pub struct ConnectionTable {
    connections: HashMap<ConnectionId, Connection>,
}

impl ConnectionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an entry with empty user info and no room memberships.
    ///
    /// Returns `false` (no-op) if the id is already present; transport layers
    /// guarantee uniqueness, so a duplicate is only logged by the caller.
    pub fn register(&mut self, connection_id: ConnectionId) -> bool {
        if self.connections.contains_key(&connection_id) {
            return false;
        }
        self.connections
            .insert(connection_id.clone(), Connection::new(connection_id));
        true
    }

    /// Attach identity to an existing connection.
    ///
    /// Returns `false` if the id is unknown (stale announce, logged not fatal).
    pub fn announce(&mut self, connection_id: &ConnectionId, user_info: UserInfo) -> bool {
        match self.connections.get_mut(connection_id) {
            Some(connection) => {
                connection.user_info = Some(user_info);
                true
            }
            None => false,
        }
    }

    /// Remove and return the entry; `None` if already removed.
    pub fn unregister(&mut self, connection_id: &ConnectionId) -> Option<Connection> {
        self.connections.remove(connection_id)
    }

    pub fn contains(&self, connection_id: &ConnectionId) -> bool {
        self.connections.contains_key(connection_id)
    }

    pub fn get(&self, connection_id: &ConnectionId) -> Option<&Connection> {
        self.connections.get(connection_id)
    }

    pub fn user_info_of(&self, connection_id: &ConnectionId) -> Option<UserInfo> {
        self.connections
            .get(connection_id)
            .and_then(|c| c.user_info.clone())
    }

    /// Snapshot of all live connection ids
    pub fn ids(&self) -> Vec<ConnectionId> {
        self.connections.keys().cloned().collect()
    }

    pub fn all(&self) -> Vec<Connection> {
        self.connections.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Record a room membership in the connection's cached set
    pub fn note_joined(&mut self, connection_id: &ConnectionId, room_id: RoomId) {
        if let Some(connection) = self.connections.get_mut(connection_id) {
            connection.joined_rooms.insert(room_id);
        }
    }

    /// Drop a room membership from the connection's cached set
    pub fn note_left(&mut self, connection_id: &ConnectionId, room_id: &RoomId) {
        if let Some(connection) = self.connections.get_mut(connection_id) {
            connection.joined_rooms.remove(room_id);
        }
    }

    /// Clear the cached membership set, returning what it held
    pub fn clear_joined(&mut self, connection_id: &ConnectionId) -> HashSet<RoomId> {
        match self.connections.get_mut(connection_id) {
            Some(connection) => std::mem::take(&mut connection.joined_rooms),
            None => HashSet::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str) -> UserInfo {
        UserInfo {
            user_id: format!("user-{name}"),
            display_name: name.to_string(),
        }
    }

    #[test]
    fn test_generated_connection_ids_are_unique() {
        // テスト項目: 生成される ConnectionId が一意である
        // given (前提条件):

        // when (操作):
        let a = ConnectionIdFactory::generate();
        let b = ConnectionIdFactory::generate();

        // then (期待する結果):
        assert_ne!(a, b);
        assert!(!a.as_str().is_empty());
    }

    #[test]
    fn test_register_creates_empty_entry() {
        // テスト項目: register で空の userInfo と空の joinedRooms を持つエントリが作られる
        // given (前提条件):
        let mut table = ConnectionTable::new();
        let id = ConnectionId::new("c1");

        // when (操作):
        let registered = table.register(id.clone());

        // then (期待する結果):
        assert!(registered);
        let connection = table.get(&id).unwrap();
        assert_eq!(connection.user_info, None);
        assert!(connection.joined_rooms.is_empty());
    }

    #[test]
    fn test_register_duplicate_is_noop() {
        // テスト項目: 同じ ConnectionId の二重 register は no-op になる
        // given (前提条件):
        let mut table = ConnectionTable::new();
        let id = ConnectionId::new("c1");
        table.register(id.clone());
        table.announce(&id, user("alice"));

        // when (操作):
        let registered_again = table.register(id.clone());

        // then (期待する結果): 既存エントリは上書きされない
        assert!(!registered_again);
        assert_eq!(table.user_info_of(&id), Some(user("alice")));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_announce_attaches_identity() {
        // テスト項目: announce で既存の接続に identity が付与される
        // given (前提条件):
        let mut table = ConnectionTable::new();
        let id = ConnectionId::new("c1");
        table.register(id.clone());

        // when (操作):
        let announced = table.announce(&id, user("alice"));

        // then (期待する結果):
        assert!(announced);
        assert_eq!(table.user_info_of(&id), Some(user("alice")));
    }

    #[test]
    fn test_announce_unknown_connection_fails_silently() {
        // テスト項目: 未登録の ConnectionId への announce は false を返すだけで失敗する
        // given (前提条件):
        let mut table = ConnectionTable::new();

        // when (操作):
        let announced = table.announce(&ConnectionId::new("ghost"), user("alice"));

        // then (期待する結果):
        assert!(!announced);
        assert!(table.is_empty());
    }

    #[test]
    fn test_unregister_returns_entry_then_none() {
        // テスト項目: unregister はエントリを返し、二回目は None（冪等性）
        // given (前提条件):
        let mut table = ConnectionTable::new();
        let id = ConnectionId::new("c1");
        table.register(id.clone());
        table.announce(&id, user("alice"));

        // when (操作):
        let first = table.unregister(&id);
        let second = table.unregister(&id);

        // then (期待する結果):
        assert_eq!(first.unwrap().user_info, Some(user("alice")));
        assert_eq!(second, None);
    }

    #[test]
    fn test_joined_rooms_cache_tracks_membership() {
        // テスト項目: joined_rooms キャッシュが join/leave を追跡する
        // given (前提条件):
        let mut table = ConnectionTable::new();
        let id = ConnectionId::new("c1");
        table.register(id.clone());
        let study = RoomId::new("study-1");
        let lounge = RoomId::new("lounge");

        // when (操作):
        table.note_joined(&id, study.clone());
        table.note_joined(&id, lounge.clone());
        table.note_left(&id, &lounge);

        // then (期待する結果):
        let joined = &table.get(&id).unwrap().joined_rooms;
        assert!(joined.contains(&study));
        assert!(!joined.contains(&lounge));

        let cleared = table.clear_joined(&id);
        assert_eq!(cleared.len(), 1);
        assert!(table.get(&id).unwrap().joined_rooms.is_empty());
    }
}
