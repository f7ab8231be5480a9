//! UseCase: 部屋退出処理

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, RoomId, SessionRegistry};

/// 部屋退出のユースケース
pub struct LeaveRoomUseCase {
    /// SessionRegistry（プレゼンス状態の抽象化）
    registry: Arc<dyn SessionRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl LeaveRoomUseCase {
    /// 新しい LeaveRoomUseCase を作成
    pub fn new(registry: Arc<dyn SessionRegistry>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    /// 部屋退出を実行
    ///
    /// # Returns
    ///
    /// * `Some(remaining)` - 退出した。remaining は user-left を受け取る残メンバー
    /// * `None` - もともとメンバーではなかった（冪等な no-op、通知なし）
    pub async fn execute(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
    ) -> Option<Vec<ConnectionId>> {
        if !self.registry.leave_room(room_id, connection_id).await {
            return None;
        }
        Some(self.registry.members_of(room_id).await)
    }

    /// user-left を残りのメンバーにブロードキャスト
    pub async fn broadcast_user_left(
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
