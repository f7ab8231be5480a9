//! WebSocket connection handlers.
//!
//! This is the lifecycle coordinator: it registers a connection when the
//! transport opens, dispatches every inbound event to its usecase, and runs
//! the cleanup sequence when the transport closes. Events from one connection
//! are processed in arrival order by its socket task; the registry serializes
//! mutations across connections.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{
    domain::{ConnectionId, ConnectionIdFactory},
    infrastructure::dto::websocket::{ClientEvent, ServerEvent},
    ui::state::AppState,
    usecase::JoinRoomError,
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    // The server assigns the connection id; clients learn it from the
    // welcome frame. Ids are never reused, so a late frame carrying an old
    // id can only miss.
    let connection_id = ConnectionIdFactory::generate();

    // Create a channel for this connection to receive messages
    let (tx, rx) = mpsc::unbounded_channel();

    // Register with the registry and the pusher before the upgrade completes
    state.connect_usecase.execute(connection_id.clone(), tx).await;
    tracing::info!("Connection '{}' registered", connection_id);

    ws.on_upgrade(move |socket| handle_socket(socket, state, connection_id, rx))
}

/// Spawns a task that receives messages from the rx channel and pushes them to the WebSocket sender.
///
/// This function handles the outbound message flow: messages routed to this
/// connection (via rx channel) are sent to its WebSocket.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            // Send the message to this connection
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    connection_id: ConnectionId,
    rx: mpsc::UnboundedReceiver<String>,
) {
    let (mut sender, mut receiver) = socket.split();

    // First frame: tell the client its server-assigned connection id
    {
        let welcome = ServerEvent::Welcome {
            connection_id: connection_id.clone(),
        };
        let welcome_json = serde_json::to_string(&welcome).unwrap();
        if let Err(e) = sender.send(Message::Text(welcome_json.into())).await {
            tracing::error!("Failed to send welcome to '{}': {}", connection_id, e);
            // The socket never became usable; unwind the registration
            state.disconnect_usecase.execute(&connection_id).await;
            return;
        }
        tracing::info!("Sent welcome to '{}'", connection_id);
    }

    let connection_id_clone = connection_id.clone();
    let state_clone = state.clone();

    // Spawn a task to receive messages from this connection
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("WebSocket error: {}", e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    // Parse the incoming event envelope
                    match serde_json::from_str::<ClientEvent>(&text) {
                        Ok(event) => {
                            dispatch_event(&state_clone, &connection_id_clone, event).await;
                        }
                        Err(e) => {
                            tracing::warn!(
                                "Malformed frame from '{}': {}",
                                connection_id_clone,
                                e
                            );
                            reply_error(
                                &state_clone,
                                &connection_id_clone,
                                "malformed message envelope",
                            )
                            .await;
                        }
                    }
                }
                Message::Ping(_) => {
                    tracing::debug!("Received ping");
                    // Ping/pong is handled automatically by the WebSocket protocol
                }
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", connection_id_clone);
                    break;
                }
                _ => {}
            }
        }
    });

    // Spawn a task to receive routed messages and send to this connection
    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    // Transport disconnect: remove from every room, then unregister.
    // Both steps are idempotent, so a duplicate disconnect signal is a no-op.
    let outcome = state.disconnect_usecase.execute(&connection_id).await;

    let left_json = serde_json::to_string(&ServerEvent::UserLeft {
        connection_id: connection_id.clone(),
    })
    .unwrap();
    for (room_id, remaining) in outcome.room_notifications {
        if let Err(e) = state.disconnect_usecase.broadcast(remaining, &left_json).await {
            tracing::warn!(
                "Failed to broadcast user-left for room '{}': {}",
                room_id,
                e
            );
        }
    }

    if let Some((user_info, targets)) = outcome.offline {
        let offline_json = serde_json::to_string(&ServerEvent::UserOffline { user_info }).unwrap();
        if let Err(e) = state.disconnect_usecase.broadcast(targets, &offline_json).await {
            tracing::warn!("Failed to broadcast user-offline: {}", e);
        }
    }

    tracing::info!("Connection '{}' disconnected and cleaned up", connection_id);
}

/// Route one inbound event to its usecase.
///
/// Exhaustive over every `ClientEvent` kind: adding a variant without a
/// routing rule is a compile error.
async fn dispatch_event(state: &Arc<AppState>, connection_id: &ConnectionId, event: ClientEvent) {
    match event {
        ClientEvent::Announce { user_info } => {
            let online = ServerEvent::UserOnline {
                user_info: user_info.clone(),
            };
            match state.announce_usecase.execute(connection_id, user_info).await {
                Some(targets) => {
                    let online_json = serde_json::to_string(&online).unwrap();
                    if let Err(e) = state
                        .announce_usecase
                        .broadcast_user_online(targets, &online_json)
                        .await
                    {
                        tracing::warn!("Failed to broadcast user-online: {}", e);
                    }
                }
                None => {
                    tracing::debug!("Ignoring announce from stale connection '{}'", connection_id);
                }
            }
        }

        ClientEvent::JoinRoom { room_id, user_info } => {
            match state
                .join_room_usecase
                .execute(room_id.clone(), connection_id)
                .await
            {
                Ok(existing) => {
                    // Membership was updated atomically inside the usecase,
                    // so `existing` can never miss a concurrent joiner.
                    let joined_json = serde_json::to_string(&ServerEvent::UserJoined {
                        connection_id: connection_id.clone(),
                        user_info,
                    })
                    .unwrap();
                    if let Err(e) = state
                        .join_room_usecase
                        .broadcast_user_joined(existing.clone(), &joined_json)
                        .await
                    {
                        tracing::warn!("Failed to broadcast user-joined: {}", e);
                    }

                    let reply = ServerEvent::ExistingUsers { users: existing };
                    push_to_self(state, connection_id, &reply).await;
                    tracing::info!("Connection '{}' joined room '{}'", connection_id, room_id);
                }
                Err(JoinRoomError::StaleConnection) => {
                    tracing::debug!(
                        "Ignoring join-room from stale connection '{}'",
                        connection_id
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        "Rejected join of room '{}' by '{}': {}",
                        room_id,
                        connection_id,
                        e
                    );
                    reply_error(state, connection_id, &e.to_string()).await;
                }
            }
        }

        ClientEvent::NegotiationOffer {
            offer,
            target_connection_id,
        } => {
            let forwarded = ServerEvent::NegotiationOffer {
                offer,
                sender_connection_id: connection_id.clone(),
            };
            relay_to(state, &target_connection_id, &forwarded).await;
        }

        ClientEvent::NegotiationAnswer {
            answer,
            caller_connection_id,
        } => {
            let forwarded = ServerEvent::NegotiationAnswer {
                answer,
                sender_connection_id: connection_id.clone(),
            };
            relay_to(state, &caller_connection_id, &forwarded).await;
        }

        ClientEvent::ConnectivityCandidate {
            candidate,
            target_connection_id,
        } => {
            let forwarded = ServerEvent::ConnectivityCandidate {
                candidate,
                sender_connection_id: connection_id.clone(),
            };
            relay_to(state, &target_connection_id, &forwarded).await;
        }

        ClientEvent::Chat { room_id, message } => {
            if let Some(outcome) = state.send_chat_usecase.execute(&room_id, connection_id).await {
                let chat_json = serde_json::to_string(&ServerEvent::Chat {
                    message,
                    sender: outcome.sender,
                    timestamp: outcome.timestamp,
                })
                .unwrap();
                if let Err(e) = state
                    .send_chat_usecase
                    .broadcast_chat(outcome.targets, &chat_json)
                    .await
                {
                    tracing::warn!("Failed to broadcast chat: {}", e);
                }
            }
        }

        ClientEvent::MediaStateChange {
            room_id,
            media,
            enabled,
        } => {
            if let Some(targets) = state
                .media_state_usecase
                .execute(&room_id, connection_id)
                .await
            {
                let toggle_json = serde_json::to_string(&ServerEvent::MediaStateChange {
                    connection_id: connection_id.clone(),
                    media,
                    enabled,
                })
                .unwrap();
                if let Err(e) = state
                    .media_state_usecase
                    .broadcast_media_state(targets, &toggle_json)
                    .await
                {
                    tracing::warn!("Failed to broadcast media-state-change: {}", e);
                }
            }
        }

        ClientEvent::LeaveRoom { room_id } => {
            if let Some(remaining) = state
                .leave_room_usecase
                .execute(&room_id, connection_id)
                .await
            {
                let left_json = serde_json::to_string(&ServerEvent::UserLeft {
                    connection_id: connection_id.clone(),
                })
                .unwrap();
                if let Err(e) = state
                    .leave_room_usecase
                    .broadcast_user_left(remaining, &left_json)
                    .await
                {
                    tracing::warn!("Failed to broadcast user-left: {}", e);
                }
            }
        }
    }
}

/// Unicast a derived event; missing targets are dropped silently
async fn relay_to(state: &Arc<AppState>, target: &ConnectionId, event: &ServerEvent) {
    let json = serde_json::to_string(event).unwrap();
    state.relay_signal_usecase.execute(target, &json).await;
}

/// Reply to the sender itself (existing-users, error events)
async fn push_to_self(state: &Arc<AppState>, connection_id: &ConnectionId, event: &ServerEvent) {
    let json = serde_json::to_string(event).unwrap();
    state.relay_signal_usecase.execute(connection_id, &json).await;
}

async fn reply_error(state: &Arc<AppState>, connection_id: &ConnectionId, message: &str) {
    let event = ServerEvent::Error {
        message: message.to_string(),
    };
    push_to_self(state, connection_id, &event).await;
}
