//! In-memory SessionRegistry implementation.
//!
//! ## 責務
//!
//! - 接続テーブルと部屋テーブルを一つのロックの下で保持する
//! - 複合操作（join の「既存メンバー取得 + 自分の追加」など）を
//!   1 回のロック取得で実行し、イベント間の順序を直列化する
//!
//! ## 設計ノート
//!
//! 両テーブルを別々のロックにすると、join と disconnect の競合で
//! 「部屋には残っているが接続テーブルにはいない」状態が観測できて
//! しまう。単一の Mutex がこの不変条件を守る。状態はプロセス内のみで、
//! 再起動時には空から再構築される（永続化しない）。

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    Connection, ConnectionId, ConnectionTable, PresenceSnapshot, RegistryError, RoomId,
    RoomSnapshot, RoomTable, SessionRegistry, UserInfo,
};

#[derive(Debug, Default)]
struct SessionTables {
    connections: ConnectionTable,
    rooms: RoomTable,
}

/// インメモリ SessionRegistry 実装
pub struct InMemorySessionRegistry {
    tables: Mutex<SessionTables>,
}

impl InMemorySessionRegistry {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(SessionTables::default()),
        }
    }
}

impl Default for InMemorySessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionRegistry for InMemorySessionRegistry {
    async fn register(&self, connection_id: ConnectionId) {
        let mut tables = self.tables.lock().await;
        if !tables.connections.register(connection_id.clone()) {
            tracing::warn!(
                "Connection '{}' already registered, ignoring duplicate",
                connection_id
            );
        }
    }

    async fn announce(&self, connection_id: &ConnectionId, user_info: UserInfo) -> bool {
        let mut tables = self.tables.lock().await;
        let announced = tables.connections.announce(connection_id, user_info);
        if !announced {
            tracing::warn!(
                "Announce for unknown connection '{}', ignoring",
                connection_id
            );
        }
        announced
    }

    async fn unregister(&self, connection_id: &ConnectionId) -> Option<Connection> {
        let mut tables = self.tables.lock().await;
        tables.connections.unregister(connection_id)
    }

    async fn is_registered(&self, connection_id: &ConnectionId) -> bool {
        let tables = self.tables.lock().await;
        tables.connections.contains(connection_id)
    }

    async fn user_info_of(&self, connection_id: &ConnectionId) -> Option<UserInfo> {
        let tables = self.tables.lock().await;
        tables.connections.user_info_of(connection_id)
    }

    async fn all_connection_ids(&self) -> Vec<ConnectionId> {
        let tables = self.tables.lock().await;
        tables.connections.ids()
    }

    async fn join_room(
        &self,
        room_id: RoomId,
        connection_id: &ConnectionId,
    ) -> Result<Vec<ConnectionId>, RegistryError> {
        let mut tables = self.tables.lock().await;
        // 部屋のメンバーは必ず接続テーブルに存在していなければならない
        if !tables.connections.contains(connection_id) {
            return Err(RegistryError::StaleConnection(
                connection_id.as_str().to_string(),
            ));
        }
        let existing = tables.rooms.join(room_id.clone(), connection_id.clone());
        tables.connections.note_joined(connection_id, room_id);
        Ok(existing)
    }

    async fn leave_room(&self, room_id: &RoomId, connection_id: &ConnectionId) -> bool {
        let mut tables = self.tables.lock().await;
        let was_member = tables.rooms.leave(room_id, connection_id);
        tables.connections.note_left(connection_id, room_id);
        was_member
    }

    async fn members_of(&self, room_id: &RoomId) -> Vec<ConnectionId> {
        let tables = self.tables.lock().await;
        tables.rooms.members_of(room_id)
    }

    async fn remove_everywhere(&self, connection_id: &ConnectionId) -> Vec<RoomId> {
        let mut tables = self.tables.lock().await;
        let affected = tables.rooms.remove_everywhere(connection_id);
        tables.connections.clear_joined(connection_id);
        affected
    }

    async fn snapshot(&self) -> PresenceSnapshot {
        let tables = self.tables.lock().await;
        PresenceSnapshot {
            connections: tables.connections.all(),
            rooms: tables
                .rooms
                .all()
                .into_iter()
                .map(|(room_id, members)| RoomSnapshot { room_id, members })
                .collect(),
        }
    }
}
