//! Server execution logic.

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::domain::SessionRegistry;
use crate::usecase::{
    AnnounceUseCase, ConnectUseCase, DisconnectUseCase, JoinRoomUseCase, LeaveRoomUseCase,
    MediaStateUseCase, RelaySignalUseCase, SendChatUseCase,
};

use super::{
    handler::{debug_presence, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// WebSocket signaling server
///
/// This struct encapsulates the server configuration and provides methods to run the server.
///
/// # Example
///
/// ```ignore
/// let server = Server::new(
///     connect_usecase,
///     announce_usecase,
///     join_room_usecase,
///     leave_room_usecase,
///     relay_signal_usecase,
///     send_chat_usecase,
///     media_state_usecase,
///     disconnect_usecase,
///     registry,
/// );
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    connect_usecase: Arc<ConnectUseCase>,
    announce_usecase: Arc<AnnounceUseCase>,
    join_room_usecase: Arc<JoinRoomUseCase>,
    leave_room_usecase: Arc<LeaveRoomUseCase>,
    relay_signal_usecase: Arc<RelaySignalUseCase>,
    send_chat_usecase: Arc<SendChatUseCase>,
    media_state_usecase: Arc<MediaStateUseCase>,
    disconnect_usecase: Arc<DisconnectUseCase>,
    registry: Arc<dyn SessionRegistry>,
}

impl Server {
    /// Create a new Server instance
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        connect_usecase: Arc<ConnectUseCase>,
        announce_usecase: Arc<AnnounceUseCase>,
        join_room_usecase: Arc<JoinRoomUseCase>,
        leave_room_usecase: Arc<LeaveRoomUseCase>,
        relay_signal_usecase: Arc<RelaySignalUseCase>,
        send_chat_usecase: Arc<SendChatUseCase>,
        media_state_usecase: Arc<MediaStateUseCase>,
        disconnect_usecase: Arc<DisconnectUseCase>,
        registry: Arc<dyn SessionRegistry>,
    ) -> Self {
        Self {
            connect_usecase,
            announce_usecase,
            join_room_usecase,
            leave_room_usecase,
            relay_signal_usecase,
            send_chat_usecase,
            media_state_usecase,
            disconnect_usecase,
            registry,
        }
    }

    /// Run the WebSocket signaling server
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 8080)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let app_state = Arc::new(AppState {
            connect_usecase: self.connect_usecase,
            announce_usecase: self.announce_usecase,
            join_room_usecase: self.join_room_usecase,
            leave_room_usecase: self.leave_room_usecase,
            relay_signal_usecase: self.relay_signal_usecase,
            send_chat_usecase: self.send_chat_usecase,
            media_state_usecase: self.media_state_usecase,
            disconnect_usecase: self.disconnect_usecase,
            registry: self.registry,
        });

        // Define handlers
        let app = Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/debug/presence", get(debug_presence))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state);

        // Bind the server to the host and port
        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        // Start the server
        tracing::info!(
            "WebSocket signaling server listening on {}",
            listener.local_addr()?
        );
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        // Set up graceful shutdown signal handler
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
