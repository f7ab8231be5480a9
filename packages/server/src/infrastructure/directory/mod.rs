//! RoomDirectory implementations.

mod inmemory;

pub use inmemory::InMemoryRoomDirectory;
