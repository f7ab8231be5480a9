//! Request handlers for the WebSocket and HTTP endpoints.

mod http;
mod websocket;

pub use http::{debug_presence, health_check};
pub use websocket::websocket_handler;
