//! Room identity and the room membership table.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::connection::ConnectionId;

/// Externally supplied, opaque identifier for a logical study room
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
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

impl std::fmt::Display for RoomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Maps a room to the set of connections currently joined.
///
/// Rooms are created implicitly on first join and dropped when their last
/// member leaves; absence is equivalent to emptiness, so `members_of` on an
/// unknown room returns the empty set rather than an error.
#[derive(Debug, Default)]
pub struct RoomTable {
    rooms: HashMap<RoomId, HashSet<ConnectionId>>,
}

impl RoomTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection to a room, returning the members present *before*
    /// this join (never including the joiner itself).
    ///
    /// Idempotent: joining twice has no additional effect and reports the
    /// same peer set both times. The snapshot and the insert happen in one
    /// call so a concurrent joiner can never be missed by either side.
    pub fn join(&mut self, room_id: RoomId, connection_id: ConnectionId) -> Vec<ConnectionId> {
        let members = self.rooms.entry(room_id).or_default();
        let existing: Vec<ConnectionId> = members
            .iter()
            .filter(|id| **id != connection_id)
            .cloned()
            .collect();
        members.insert(connection_id);
        existing
    }

    /// Remove a connection from a room; idempotent. Empty rooms are dropped.
    pub fn leave(&mut self, room_id: &RoomId, connection_id: &ConnectionId) -> bool {
        let Some(members) = self.rooms.get_mut(room_id) else {
            return false;
        };
        let removed = members.remove(connection_id);
        if members.is_empty() {
            self.rooms.remove(room_id);
        }
        removed
    }

    /// Current members of a room; empty for an unknown room
    pub fn members_of(&self, room_id: &RoomId) -> Vec<ConnectionId> {
        self.rooms
            .get(room_id)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Remove a connection from every room it belongs to, returning the
    /// affected room ids so remaining members can be notified.
    pub fn remove_everywhere(&mut self, connection_id: &ConnectionId) -> Vec<RoomId> {
        let mut affected = Vec::new();
        self.rooms.retain(|room_id, members| {
            if members.remove(connection_id) {
                affected.push(room_id.clone());
            }
            !members.is_empty()
        });
        affected
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Snapshot of every room and its member set
    pub fn all(&self) -> Vec<(RoomId, Vec<ConnectionId>)> {
        self.rooms
            .iter()
            .map(|(room_id, members)| (room_id.clone(), members.iter().cloned().collect()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn(id: &str) -> ConnectionId {
        ConnectionId::new(id)
    }

    #[test]
    fn test_first_join_reports_no_existing_members() {
        // テスト項目: 最初の join では既存メンバーが空で返される
        // given (前提条件):
        let mut table = RoomTable::new();

        // when (操作):
        let existing = table.join(RoomId::new("study-1"), conn("a"));

        // then (期待する結果):
        assert!(existing.is_empty());
        assert_eq!(table.members_of(&RoomId::new("study-1")), vec![conn("a")]);
    }

    #[test]
    fn test_second_join_reports_prior_members() {
        // テスト項目: 2人目の join で先にいたメンバーが返される
        // given (前提条件):
        let mut table = RoomTable::new();
        let room = RoomId::new("study-1");
        table.join(room.clone(), conn("a"));

        // when (操作):
        let existing = table.join(room.clone(), conn("b"));

        // then (期待する結果):
        assert_eq!(existing, vec![conn("a")]);
        let mut members = table.members_of(&room);
        members.sort_by(|x, y| x.as_str().cmp(y.as_str()));
        assert_eq!(members, vec![conn("a"), conn("b")]);
    }

    #[test]
    fn test_join_is_idempotent() {
        // テスト項目: 同じ接続の二重 join は追加の効果を持たず、同じ既存セットを返す
        // given (前提条件):
        let mut table = RoomTable::new();
        let room = RoomId::new("study-1");
        table.join(room.clone(), conn("a"));
        let first = table.join(room.clone(), conn("b"));

        // when (操作):
        let second = table.join(room.clone(), conn("b"));

        // then (期待する結果):
        assert_eq!(first, second);
        assert_eq!(table.members_of(&room).len(), 2);
    }

    #[test]
    fn test_leave_is_idempotent_and_drops_empty_room() {
        // テスト項目: leave は冪等で、空になった部屋はテーブルから消える
        // given (前提条件):
        let mut table = RoomTable::new();
        let room = RoomId::new("study-1");
        table.join(room.clone(), conn("a"));

        // when (操作):
        let first = table.leave(&room, &conn("a"));
        let second = table.leave(&room, &conn("a"));

        // then (期待する結果):
        assert!(first);
        assert!(!second);
        assert_eq!(table.room_count(), 0);
        assert!(table.members_of(&room).is_empty());
    }

    #[test]
    fn test_members_of_unknown_room_is_empty_not_error() {
        // テスト項目: 未知の部屋の members_of は空集合を返す
        // given (前提条件):
        let table = RoomTable::new();

        // when (操作):
        let members = table.members_of(&RoomId::new("nowhere"));

        // then (期待する結果):
        assert!(members.is_empty());
    }

    #[test]
    fn test_remove_everywhere_reports_affected_rooms() {
        // テスト項目: remove_everywhere が所属していた全部屋を返し、どこにも残らない
        // given (前提条件):
        let mut table = RoomTable::new();
        let r1 = RoomId::new("study-1");
        let r2 = RoomId::new("study-2");
        let r3 = RoomId::new("study-3");
        table.join(r1.clone(), conn("a"));
        table.join(r1.clone(), conn("b"));
        table.join(r2.clone(), conn("a"));
        table.join(r3.clone(), conn("b"));

        // when (操作):
        let mut affected = table.remove_everywhere(&conn("a"));

        // then (期待する結果): a がいた部屋だけが返される
        affected.sort_by(|x, y| x.as_str().cmp(y.as_str()));
        assert_eq!(affected, vec![r1.clone(), r2.clone()]);
        assert_eq!(table.members_of(&r1), vec![conn("b")]);
        // a しかいなかった部屋は消えている
        assert!(table.members_of(&r2).is_empty());
        assert_eq!(table.members_of(&r3), vec![conn("b")]);
    }

    #[test]
    fn test_remove_everywhere_for_unknown_connection_is_noop() {
        // テスト項目: どの部屋にもいない接続の remove_everywhere は空を返す
        // given (前提条件):
        let mut table = RoomTable::new();
        table.join(RoomId::new("study-1"), conn("a"));

        // when (操作):
        let affected = table.remove_everywhere(&conn("ghost"));

        // then (期待する結果):
        assert!(affected.is_empty());
        assert_eq!(table.members_of(&RoomId::new("study-1")).len(), 1);
    }
}
