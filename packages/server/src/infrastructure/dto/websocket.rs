//! Wire envelope for the signaling channel.
//!
//! Every frame is a JSON object tagged by `kind`. Negotiation payloads
//! (`offer`, `answer`, `candidate`) are opaque to the relay: they are carried
//! as raw JSON values and never inspected beyond the routing fields.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{ConnectionId, RoomId, UserInfo};

/// Which media track a state change refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MediaKind {
    Video,
    Audio,
    ScreenShare,
}

/// Events a client sends to the relay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ClientEvent {
    /// Attach identity to this connection; triggers presence-online
    Announce { user_info: UserInfo },
    /// Enter a room; the optional user info is echoed to existing members
    JoinRoom {
        room_id: RoomId,
        user_info: Option<UserInfo>,
    },
    /// Start a peer negotiation with another connection
    NegotiationOffer {
        offer: Value,
        target_connection_id: ConnectionId,
    },
    /// Answer a previously relayed offer; routed back to the caller
    NegotiationAnswer {
        answer: Value,
        caller_connection_id: ConnectionId,
    },
    /// Connectivity candidate for an in-flight negotiation
    ConnectivityCandidate {
        candidate: Value,
        target_connection_id: ConnectionId,
    },
    /// Room-wide text message
    Chat { room_id: RoomId, message: String },
    /// Toggle of the sender's video/audio/screen-share track
    MediaStateChange {
        room_id: RoomId,
        media: MediaKind,
        enabled: bool,
    },
    /// Leave a room without disconnecting
    LeaveRoom { room_id: RoomId },
}

/// Events the relay sends to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// First frame on every connection: the server-assigned id the client
    /// must use to interpret negotiation routing
    Welcome { connection_id: ConnectionId },
    UserOnline { user_info: UserInfo },
    UserOffline { user_info: UserInfo },
    /// Reply to a join: the other members already in the room
    ExistingUsers { users: Vec<ConnectionId> },
    UserJoined {
        connection_id: ConnectionId,
        user_info: Option<UserInfo>,
    },
    UserLeft { connection_id: ConnectionId },
    NegotiationOffer {
        offer: Value,
        sender_connection_id: ConnectionId,
    },
    NegotiationAnswer {
        answer: Value,
        sender_connection_id: ConnectionId,
    },
    ConnectivityCandidate {
        candidate: Value,
        sender_connection_id: ConnectionId,
    },
    Chat {
        message: String,
        /// Absent when the sender never announced identity
        #[serde(skip_serializing_if = "Option::is_none")]
        sender: Option<UserInfo>,
        /// Server-assigned Unix milliseconds
        timestamp: i64,
    },
    MediaStateChange {
        connection_id: ConnectionId,
        media: MediaKind,
        enabled: bool,
    },
    /// Explicit rejection (unknown room, malformed frame)
    Error { message: String },
}
