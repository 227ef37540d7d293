use std::collections::HashMap;

use crate::types::SessionId;

/// Where a user currently sits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seat {
    pub room: String,
    pub session: SessionId,
}

/// Username → the one room that user is in. No entry means no room.
#[derive(Debug, Default)]
pub struct SessionDirectory {
    seats: HashMap<String, Seat>,
}

impl SessionDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_room(&self, username: &str) -> Option<&Seat> {
        self.seats.get(username)
    }

    /// Overwrite the user's entry, returning the previous one.
    pub fn set_room(&mut self, username: &str, seat: Option<Seat>) -> Option<Seat> {
        match seat {
            Some(seat) => self.seats.insert(username.to_string(), seat),
            None => self.seats.remove(username),
        }
    }
}
