//! UseCase: ネゴシエーションメッセージの中継処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - RelaySignalUseCase::execute() メソッド
//! - offer / answer / candidate の unicast 配送と drop ポリシー
//!
//! ### なぜこのテストが必要か
//! - 宛先が切断済みでもエラーにならないこと（silent drop）を保証
//! - ネゴシエーション中の相手切断が relay を壊さないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：登録済みの宛先への unicast
//! - 異常系：未登録・切断済みの宛先（配送なし、エラーなし）

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePushError, MessagePusher};

/// ネゴシエーションメッセージ中継のユースケース
///
/// offer / answer / candidate のペイロードは relay にとって不透明で、
/// ここでは宛先の解決と配送だけを行う。
pub struct RelaySignalUseCase {
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl RelaySignalUseCase {
    /// 新しい RelaySignalUseCase を作成
    pub fn new(message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self { message_pusher }
    }

    /// unicast 配送を実行
    ///
    /// # Returns
    ///
    /// * `true` - 配送された
    /// * `false` - 宛先が存在しない（ネゴシエーション中に切断した等）。
    ///   呼び出し側にエラーは返さない（silent drop）
    pub async fn execute(&self, target: &ConnectionId, message: &str) -> bool {
        match self.message_pusher.push_to(target, message).await {
            Ok(()) => true,
            Err(MessagePushError::ConnectionNotFound(id)) => {
                tracing::debug!("Dropping signal for unknown connection '{}'", id);
                false
            }
            Err(MessagePushError::PushFailed(reason)) => {
                tracing::warn!(
                    "Failed to push signal to connection '{}': {}",
                    target.as_str(),
                    reason
                );
                false
            }
        }
    }
}
