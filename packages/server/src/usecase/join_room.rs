//! UseCase: 部屋参加処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() メソッド
//! - 外部ディレクトリによる roomId の検証と、既存メンバーの報告
//!
//! ### なぜこのテストが必要か
//! - ビジネスロジックの検証：未知の部屋への join は拒否され、状態が変化しない
//! - 「既存メンバーの取得」と「自分の追加」が 1 ステップで行われることを保証
//! - ディレクトリ障害時に join が安全に失敗することを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：既知の部屋への join（1人目・2人目）
//! - 異常系：未知の部屋、ディレクトリ到達不能、切断済み接続
//! - エッジケース：同じ接続の二重 join（冪等性）

use std::sync::Arc;

use crate::domain::{
    ConnectionId, DirectoryError, MessagePusher, RoomDirectory, RoomId, SessionRegistry,
};

use super::error::JoinRoomError;

/// 部屋参加のユースケース
pub struct JoinRoomUseCase {
    /// SessionRegistry（プレゼンス状態の抽象化）
    registry: Arc<dyn SessionRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    /// RoomDirectory（外部の部屋レコードへの参照）
    directory: Arc<dyn RoomDirectory>,
}

impl JoinRoomUseCase {
    /// 新しい JoinRoomUseCase を作成
    pub fn new(
        registry: Arc<dyn SessionRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        directory: Arc<dyn RoomDirectory>,
    ) -> Self {
        Self {
            registry,
            message_pusher,
            directory,
        }
    }

    /// 部屋参加を実行
    ///
    /// # Returns
    ///
    /// * `Ok(existing)` - 参加成功。existing は join 前からいた他のメンバー
    /// * `Err(JoinRoomError)` - 拒否。registry/membership は変化しない
    pub async fn execute(
        &self,
        room_id: RoomId,
        connection_id: &ConnectionId,
    ) -> Result<Vec<ConnectionId>, JoinRoomError> {
        // 1. 外部ディレクトリで部屋の存在を検証（join の前、状態変更なし）
        match self.directory.room_exists(&room_id).await {
            Ok(true) => {}
            Ok(false) => {
                return Err(JoinRoomError::UnknownRoom(room_id.into_string()));
            }
            Err(DirectoryError::Unavailable(reason)) => {
                return Err(JoinRoomError::DirectoryUnavailable(reason));
            }
        }

        // 2. 既存メンバーの取得と自分の追加を 1 回の複合操作で行う
        self.registry
            .join_room(room_id, connection_id)
            .await
            .map_err(|_| JoinRoomError::StaleConnection)
    }

    /// user-joined を既存メンバーにブロードキャスト
    pub async fn broadcast_user_joined(
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
