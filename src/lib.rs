//! A multi-room chat relay.
//!
//! [`RoomManager`] is the core: it owns the rooms, tracks which room each
//! user is in, and hands every joined client a [`RoomStream`] that replays
//! the room's history before switching to live traffic. [`server`] puts it
//! behind a newline-delimited JSON protocol over TCP.

pub mod command;
pub mod config;
pub mod directory;
pub mod error;
pub mod mailbox;
pub mod manager;
pub mod message;
pub mod protocol;
pub mod registry;
pub mod room;
pub mod server;
pub mod types;

pub use error::{ChatError, Result};
pub use manager::{RoomManager, RoomStream};
pub use message::Message;
