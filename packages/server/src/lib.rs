//! StudyHub signaling server library.
//!
//! Realtime presence and signaling relay for a group video-study
//! application: tracks live connections and room membership in memory, and
//! brokers the peer negotiation handshakes (offer / answer / candidate) and
//! in-room events between participants over WebSocket. Media itself flows
//! peer-to-peer; this server only carries the control plane.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
