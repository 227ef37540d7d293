use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{ChatError, Result};
use crate::room::{Room, SharedRoom};

/// Room name → room state. Rooms are never removed.
///
/// The registry itself is not synchronised; the manager wraps it in its own
/// lock, separate from the per-room locks.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<String, SharedRoom>,
    order: Vec<String>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_room(&mut self, name: &str) -> Result<()> {
        if self.rooms.contains_key(name) {
            return Err(ChatError::AlreadyExists(name.to_string()));
        }
        self.rooms.insert(name.to_string(), Room::shared());
        self.order.push(name.to_string());
        Ok(())
    }

    pub fn get_room(&self, name: &str) -> Result<SharedRoom> {
        self.rooms
            .get(name)
            .map(Arc::clone)
            .ok_or_else(|| ChatError::RoomNotFound(name.to_string()))
    }

    /// Room names in creation order.
    pub fn list_rooms(&self) -> Vec<String> {
        self.order.clone()
    }
}
