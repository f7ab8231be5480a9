//! UseCase: 接続受付処理

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, PusherChannel, SessionRegistry};

/// 接続受付のユースケース
pub struct ConnectUseCase {
    /// SessionRegistry（プレゼンス状態の抽象化）
    registry: Arc<dyn SessionRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl ConnectUseCase {
    /// 新しい ConnectUseCase を作成
    pub fn new(registry: Arc<dyn SessionRegistry>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    /// 接続受付を実行
    ///
    /// Registers the connection in the registry (state CONNECTED, no
    /// identity, no rooms) and wires its outbound channel into the pusher.
    pub async fn execute(&self, connection_id: ConnectionId, sender: PusherChannel) {
        self.registry.register(connection_id.clone()).await;
        self.message_pusher
            .register_connection(connection_id, sender)
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{InMemorySessionRegistry, WebSocketMessagePusher};

    #[tokio::test]
    async fn test_connect_registers_connection_and_channel() {
        // テスト項目: 接続が registry と pusher の両方に登録される
        // given (前提条件):
        let registry = Arc::new(InMemorySessionRegistry::new());
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let usecase = ConnectUseCase::new(registry.clone(), pusher.clone());
        let id = ConnectionId::new("c1");
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        // when (操作):
        usecase.execute(id.clone(), tx).await;

        // then (期待する結果):
        assert!(registry.is_registered(&id).await);
        assert!(pusher.push_to(&id, "ping").await.is_ok());
        assert_eq!(rx.recv().await, Some("ping".to_string()));
    }
}
