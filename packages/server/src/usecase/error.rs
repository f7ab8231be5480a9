//! UseCase-level error types.

use thiserror::Error;

/// Why a join-room request was rejected.
///
/// Rejections are surfaced to the sender as an explicit error event; no
/// registry or membership state is mutated on any of these paths.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum JoinRoomError {
    #[error("room '{0}' does not exist")]
    UnknownRoom(String),
    #[error("room directory unavailable: {0}")]
    DirectoryUnavailable(String),
    /// The connection disconnected before the join was processed
    #[error("connection is no longer registered")]
    StaleConnection,
}
