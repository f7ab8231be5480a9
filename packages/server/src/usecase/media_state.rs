//! UseCase: メディア状態変更の通知処理

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, RoomId, SessionRegistry};

/// メディア状態変更（video / audio / screen-share トグル）のユースケース
///
/// トグルの種類と enabled フラグは DTO 層で検証済み。ここでは同室の
/// 他メンバーという配送対象の解決だけを行う。
pub struct MediaStateUseCase {
    /// SessionRegistry（プレゼンス状態の抽象化）
    registry: Arc<dyn SessionRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl MediaStateUseCase {
    /// 新しい MediaStateUseCase を作成
    pub fn new(registry: Arc<dyn SessionRegistry>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    /// 配送対象の解決を実行
    ///
    /// # Returns
    ///
    /// * `Some(targets)` - 送信者を除く同室メンバー
    /// * `None` - 送信者がその部屋のメンバーではない（silent drop）
    pub async fn execute(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
    ) -> Option<Vec<ConnectionId>> {
        let members = self.registry.members_of(room_id).await;
        if !members.contains(connection_id) {
            tracing::debug!(
                "Dropping media-state-change from '{}' for room '{}' it is not a member of",
                connection_id,
                room_id
            );
            return None;
        }

        Some(
            members
                .into_iter()
                .filter(|id| id != connection_id)
                .collect(),
        )
    }

    /// media-state-change を同室メンバーにブロードキャスト
    pub async fn broadcast_media_state(
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
