//! UseCase: 切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectUseCase::execute() メソッド
//! - 全部屋からの退出、user-left 通知対象の選定、オフライン通知
//!
//! ### なぜこのテストが必要か
//! - ビジネスロジックの検証：切断後どの部屋にも membership が残らない
//! - 影響を受けた各部屋の残メンバーがちょうど 1 回 user-left を受け取る
//! - 二重切断が no-op であること（オフライン通知の重複なし）を保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：複数部屋に参加中の接続の切断
//! - エッジケース：announce していない接続の切断（オフライン通知なし）
//! - 異常系：transport が切断イベントを二度発火する場合

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, RoomId, SessionRegistry, UserInfo};

/// 切断時に通知すべき相手の一覧
#[derive(Debug, Default, PartialEq)]
pub struct DisconnectOutcome {
    /// 影響を受けた部屋ごとの、user-left を受け取る残メンバー
    pub room_notifications: Vec<(RoomId, Vec<ConnectionId>)>,
    /// announce 済みだった場合のみ: identity と user-offline の配送対象
    pub offline: Option<(UserInfo, Vec<ConnectionId>)>,
}

/// 切断のユースケース
///
/// 切断は唯一のキャンセルシグナルであり、この処理は常に「勝つ」：
/// 実行後は registry にも membership にも接続の痕跡が残らない。
pub struct DisconnectUseCase {
    /// SessionRegistry（プレゼンス状態の抽象化）
    registry: Arc<dyn SessionRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl DisconnectUseCase {
    /// 新しい DisconnectUseCase を作成
    pub fn new(registry: Arc<dyn SessionRegistry>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    /// 切断を実行
    ///
    /// 手順：全部屋から退出 → 各部屋の残メンバーを記録 → registry から
    /// 削除 → pusher から登録解除 → announce 済みならオフライン通知対象を
    /// 選定。どの手順も冪等なので、transport が切断を二度通知しても
    /// 二度目は空の Outcome を返すだけになる。
    pub async fn execute(&self, connection_id: &ConnectionId) -> DisconnectOutcome {
        // 1. 全部屋から退出し、影響を受けた部屋を取得
        let affected_rooms = self.registry.remove_everywhere(connection_id).await;

        // 2. 各部屋の残メンバー（user-left の配送対象）を記録
        let mut room_notifications = Vec::with_capacity(affected_rooms.len());
        for room_id in affected_rooms {
            let remaining = self.registry.members_of(&room_id).await;
            room_notifications.push((room_id, remaining));
        }

        // 3. registry から削除（二度目は None）
        let removed = self.registry.unregister(connection_id).await;

        // 4. pusher から登録解除
        self.message_pusher.unregister_connection(connection_id).await;

        // 5. announce 済みだった場合のみオフライン通知
        let offline = match removed.and_then(|connection| connection.user_info) {
            Some(user_info) => {
                let targets = self.registry.all_connection_ids().await;
                Some((user_info, targets))
            }
            None => None,
        };

        DisconnectOutcome {
            room_notifications,
            offline,
        }
    }

    /// user-left / user-offline を配送対象にブロードキャスト
    pub async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        message: &str,
    ) -> Result<(), String> {
        self.message_pusher
            .broadcast(targets, message)
            .await
            .map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{InMemorySessionRegistry, WebSocketMessagePusher};

    fn conn(id: &str) -> ConnectionId {
        ConnectionId::new(id)
    }

    fn user(name: &str) -> UserInfo {
        UserInfo {
            user_id: format!("user-{name}"),
            display_name: name.to_string(),
        }
    }

    async fn setup() -> (Arc<InMemorySessionRegistry>, DisconnectUseCase) {
        let registry = Arc::new(InMemorySessionRegistry::new());
        let usecase =
            DisconnectUseCase::new(registry.clone(), Arc::new(WebSocketMessagePusher::new()));
        (registry, usecase)
    }

    #[tokio::test]
    async fn test_disconnect_removes_from_every_room() {
        // テスト項目: 切断後、参加していた全部屋から接続が消え、各部屋の残メンバーが通知対象になる
        // given (前提条件): a は study-1, study-2, study-3 に参加
        let (registry, usecase) = setup().await;
        for id in ["a", "b", "c"] {
            registry.register(conn(id)).await;
        }
        let r1 = RoomId::new("study-1");
        let r2 = RoomId::new("study-2");
        let r3 = RoomId::new("study-3");
        registry.join_room(r1.clone(), &conn("a")).await.unwrap();
        registry.join_room(r1.clone(), &conn("b")).await.unwrap();
        registry.join_room(r2.clone(), &conn("a")).await.unwrap();
        registry.join_room(r2.clone(), &conn("c")).await.unwrap();
        registry.join_room(r3.clone(), &conn("a")).await.unwrap();

        // when (操作):
        let outcome = usecase.execute(&conn("a")).await;

        // then (期待する結果): 3 部屋すべてが影響を受け、残メンバーだけが対象
        assert_eq!(outcome.room_notifications.len(), 3);
        for (room_id, remaining) in &outcome.room_notifications {
            assert!(registry.members_of(room_id).await.iter().all(|m| m != &conn("a")));
            assert!(!remaining.contains(&conn("a")));
        }
        let r1_notification = outcome
            .room_notifications
            .iter()
            .find(|(room_id, _)| room_id == &r1)
            .unwrap();
        assert_eq!(r1_notification.1, vec![conn("b")]);
    }

    #[tokio::test]
    async fn test_disconnect_of_announced_connection_reports_offline() {
        // テスト項目: announce 済みの接続の切断でオフライン通知対象が返される
        // given (前提条件):
        let (registry, usecase) = setup().await;
        registry.register(conn("a")).await;
        registry.register(conn("b")).await;
        registry.announce(&conn("a"), user("alice")).await;

        // when (操作):
        let outcome = usecase.execute(&conn("a")).await;

        // then (期待する結果):
        let (user_info, targets) = outcome.offline.unwrap();
        assert_eq!(user_info, user("alice"));
        assert_eq!(targets, vec![conn("b")]);
        assert!(!registry.is_registered(&conn("a")).await);
    }

    #[tokio::test]
    async fn test_disconnect_of_unannounced_connection_has_no_offline() {
        // テスト項目: announce していない接続の切断ではオフライン通知が出ない
        // given (前提条件):
        let (registry, usecase) = setup().await;
        registry.register(conn("a")).await;
        registry.register(conn("b")).await;

        // when (操作):
        let outcome = usecase.execute(&conn("a")).await;

        // then (期待する結果):
        assert_eq!(outcome.offline, None);
        assert!(outcome.room_notifications.is_empty());
    }

    #[tokio::test]
    async fn test_double_disconnect_is_noop() {
        // テスト項目: 二重切断の二度目が空の Outcome を返す（通知の重複なし）
        // given (前提条件):
        let (registry, usecase) = setup().await;
        registry.register(conn("a")).await;
        registry.register(conn("b")).await;
        registry.announce(&conn("a"), user("alice")).await;
        registry.join_room(RoomId::new("study-1"), &conn("a")).await.unwrap();
        let first = usecase.execute(&conn("a")).await;
        assert!(first.offline.is_some());

        // when (操作):
        let second = usecase.execute(&conn("a")).await;

        // then (期待する結果):
        assert_eq!(second, DisconnectOutcome::default());
    }
}
