//! Domain layer: pure models and the trait seams the usecases depend on.
//!
//! Nothing in this module performs I/O. The connection and room tables are
//! plain data structures; the async traits are implemented by the
//! infrastructure layer (dependency inversion).

mod connection;
mod directory;
mod error;
mod pusher;
mod registry;
mod room;

pub use connection::{Connection, ConnectionId, ConnectionIdFactory, ConnectionTable, UserInfo};
pub use directory::{DirectoryError, RoomDirectory};
pub use error::RegistryError;
pub use pusher::{MessagePushError, MessagePusher, PusherChannel};
pub use registry::{PresenceSnapshot, RoomSnapshot, SessionRegistry};
pub use room::{RoomId, RoomTable};

#[cfg(test)]
pub use directory::MockRoomDirectory;
