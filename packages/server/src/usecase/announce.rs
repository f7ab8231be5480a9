//! UseCase: プレゼンス通知（announce）処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - AnnounceUseCase::execute() メソッド
//! - identity の付与とオンライン通知対象の選定
//!
//! ### なぜこのテストが必要か
//! - ビジネスロジックの検証：本人以外の全接続に user-online が届く
//! - 未登録の接続への announce が無視されることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：identity の付与とブロードキャスト対象の選定
//! - 異常系：未登録（切断済み）接続からの announce
//! - エッジケース：他に誰も接続していない場合（通知対象なし）

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, SessionRegistry, UserInfo};

/// プレゼンス通知のユースケース
pub struct AnnounceUseCase {
    /// SessionRegistry（プレゼンス状態の抽象化）
    registry: Arc<dyn SessionRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl AnnounceUseCase {
    /// 新しい AnnounceUseCase を作成
    pub fn new(registry: Arc<dyn SessionRegistry>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    /// announce を実行
    ///
    /// # Returns
    ///
    /// * `Some(targets)` - identity が付与された。targets は user-online を
    ///   受け取るべき接続（本人を除く、呼び出し時点のスナップショット）
    /// * `None` - 接続が未登録（stale）。状態は変化しない
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        user_info: UserInfo,
    ) -> Option<Vec<ConnectionId>> {
        if !self.registry.announce(connection_id, user_info).await {
            return None;
        }

        let targets = self
            .registry
            .all_connection_ids()
            .await
            .into_iter()
            .filter(|id| id != connection_id)
            .collect();
        Some(targets)
    }

    /// user-online を他の接続にブロードキャスト
    pub async fn broadcast_user_online(
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
