//! UseCase layer: one usecase per inbound signaling event kind.
//!
//! Each usecase depends only on the domain traits (`SessionRegistry`,
//! `MessagePusher`, `RoomDirectory`) and decides *who* is affected; the UI
//! layer serializes the outbound DTOs and hands them back for delivery.

mod announce;
mod connect;
mod disconnect;
mod error;
mod join_room;
mod leave_room;
mod media_state;
mod relay_signal;
mod send_chat;

pub use announce::AnnounceUseCase;
pub use connect::ConnectUseCase;
pub use disconnect::{DisconnectOutcome, DisconnectUseCase};
pub use error::JoinRoomError;
pub use join_room::JoinRoomUseCase;
pub use leave_room::LeaveRoomUseCase;
pub use media_state::MediaStateUseCase;
pub use relay_signal::RelaySignalUseCase;
pub use send_chat::{ChatOutcome, SendChatUseCase};
