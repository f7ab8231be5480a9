//! StudyHub signaling server binary.
//!
//! Accepts WebSocket connections from study-room clients and relays
//! presence, room membership, and peer negotiation events between them.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin studyhub-server
//! cargo run --bin studyhub-server -- --host 0.0.0.0 --port 3000
//! ```

use std::sync::Arc;

use clap::Parser;
use studyhub_server::{
    infrastructure::{InMemoryRoomDirectory, InMemorySessionRegistry, WebSocketMessagePusher},
    ui::Server,
    usecase::{
        AnnounceUseCase, ConnectUseCase, DisconnectUseCase, JoinRoomUseCase, LeaveRoomUseCase,
        MediaStateUseCase, RelaySignalUseCase, SendChatUseCase,
    },
};
use studyhub_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "studyhub-server")]
#[command(about = "WebSocket signaling server for StudyHub video study rooms", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    // Initialize dependencies in order:
    // 1. Registry
    // 2. MessagePusher / RoomDirectory
    // 3. UseCases
    // 4. Server

    // 1. Create SessionRegistry (in-memory, rebuilt empty on every restart)
    let registry = Arc::new(InMemorySessionRegistry::new());

    // 2. Create MessagePusher (WebSocket implementation) and RoomDirectory.
    //    The open directory admits every room id; swap in a closed one when
    //    the external room service wires in.
    let message_pusher = Arc::new(WebSocketMessagePusher::new());
    let directory = Arc::new(InMemoryRoomDirectory::open());
    let clock = Arc::new(SystemClock);

    // 3. Create UseCases
    let connect_usecase = Arc::new(ConnectUseCase::new(
        registry.clone(),
        message_pusher.clone(),
    ));
    let announce_usecase = Arc::new(AnnounceUseCase::new(
        registry.clone(),
        message_pusher.clone(),
    ));
    let join_room_usecase = Arc::new(JoinRoomUseCase::new(
        registry.clone(),
        message_pusher.clone(),
        directory.clone(),
    ));
    let leave_room_usecase = Arc::new(LeaveRoomUseCase::new(
        registry.clone(),
        message_pusher.clone(),
    ));
    let relay_signal_usecase = Arc::new(RelaySignalUseCase::new(message_pusher.clone()));
    let send_chat_usecase = Arc::new(SendChatUseCase::new(
        registry.clone(),
        message_pusher.clone(),
        clock,
    ));
    let media_state_usecase = Arc::new(MediaStateUseCase::new(
        registry.clone(),
        message_pusher.clone(),
    ));
    let disconnect_usecase = Arc::new(DisconnectUseCase::new(
        registry.clone(),
        message_pusher.clone(),
    ));

    // 4. Create and run the server
    let server = Server::new(
        connect_usecase,
        announce_usecase,
        join_room_usecase,
        leave_room_usecase,
        relay_signal_usecase,
        send_chat_usecase,
        media_state_usecase,
        disconnect_usecase,
        registry,
    );
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
