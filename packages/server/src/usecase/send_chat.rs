//! UseCase: チャット送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendChatUseCase::execute() メソッド
//! - 部屋内ブロードキャスト対象の選定、送信者情報とタイムスタンプの付与
//!
//! ### なぜこのテストが必要か
//! - ビジネスロジックの検証：送信者以外の同室メンバーだけに届く
//! - identity 未設定の送信者でもチャットできること（sender は absent）を保証
//! - タイムスタンプがサーバー側で付与されることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：複数メンバーの部屋でのチャット
//! - 異常系：メンバーでない部屋へのチャット（silent drop）
//! - エッジケース：announce 前の送信者、他の部屋のメンバーへの非配送

use std::sync::Arc;

use studyhub_shared::time::Clock;

use crate::domain::{ConnectionId, MessagePusher, RoomId, SessionRegistry, UserInfo};

/// チャットのブロードキャスト内容
#[derive(Debug, PartialEq)]
pub struct ChatOutcome {
    /// 配送対象（送信者を除く同室メンバー）
    pub targets: Vec<ConnectionId>,
    /// 送信者の announce 済み identity（未設定なら None）
    pub sender: Option<UserInfo>,
    /// サーバーが付与した Unix ミリ秒
    pub timestamp: i64,
}

/// チャット送信のユースケース
pub struct SendChatUseCase {
    /// SessionRegistry（プレゼンス状態の抽象化）
    registry: Arc<dyn SessionRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    /// Clock（タイムスタンプ付与の抽象化）
    clock: Arc<dyn Clock>,
}

impl SendChatUseCase {
    /// 新しい SendChatUseCase を作成
    pub fn new(
        registry: Arc<dyn SessionRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            message_pusher,
            clock,
        }
    }

    /// チャット送信を実行
    ///
    /// # Returns
    ///
    /// * `Some(ChatOutcome)` - 配送対象と付与された送信者情報・タイムスタンプ。
    ///   relay は送信者自身には echo しない
    /// * `None` - 送信者がその部屋のメンバーではない（silent drop）
    pub async fn execute(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
    ) -> Option<ChatOutcome> {
        let members = self.registry.members_of(room_id).await;
        if !members.contains(connection_id) {
            tracing::debug!(
                "Dropping chat from '{}' for room '{}' it is not a member of",
                connection_id,
                room_id
            );
            return None;
        }

        let targets = members
            .into_iter()
            .filter(|id| id != connection_id)
            .collect();
        let sender = self.registry.user_info_of(connection_id).await;

        Some(ChatOutcome {
            targets,
            sender,
            timestamp: self.clock.now_millis(),
        })
    }

    /// chat を同室メンバーにブロードキャスト
    pub async fn broadcast_chat(
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
