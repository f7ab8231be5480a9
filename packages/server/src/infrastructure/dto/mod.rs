//! Data Transfer Objects (DTOs) for the signaling server.
//!
//! DTOs are organized by protocol:
//! - `websocket`: the signaling wire envelope (kind-tagged events)

pub mod websocket;
