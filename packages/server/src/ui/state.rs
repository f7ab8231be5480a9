//! Server state shared across handlers.

use std::sync::Arc;

use crate::domain::SessionRegistry;
use crate::usecase::{
    AnnounceUseCase, ConnectUseCase, DisconnectUseCase, JoinRoomUseCase, LeaveRoomUseCase,
    MediaStateUseCase, RelaySignalUseCase, SendChatUseCase,
};

/// Shared application state
pub struct AppState {
    /// ConnectUseCase（接続受付のユースケース）
    pub connect_usecase: Arc<ConnectUseCase>,
    /// AnnounceUseCase（プレゼンス通知のユースケース）
    pub announce_usecase: Arc<AnnounceUseCase>,
    /// JoinRoomUseCase（部屋参加のユースケース）
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    /// LeaveRoomUseCase（部屋退出のユースケース）
    pub leave_room_usecase: Arc<LeaveRoomUseCase>,
    /// RelaySignalUseCase（ネゴシエーション中継のユースケース）
    pub relay_signal_usecase: Arc<RelaySignalUseCase>,
    /// SendChatUseCase（チャット送信のユースケース）
    pub send_chat_usecase: Arc<SendChatUseCase>,
    /// MediaStateUseCase（メディア状態変更のユースケース）
    pub media_state_usecase: Arc<MediaStateUseCase>,
    /// DisconnectUseCase（切断のユースケース）
    pub disconnect_usecase: Arc<DisconnectUseCase>,
    /// SessionRegistry（デバッグ用スナップショットの取得元）
    pub registry: Arc<dyn SessionRegistry>,
}
