use std::fmt;

use serde::{Deserialize, Serialize};

/// Username carried by notices the relay itself emits.
pub const SERVER_USERNAME: &str = "Server";

/// A chat message posted to a room.
///
/// Wire format: `{"roomName": "general", "username": "bob", "msg": "hi"}`
/// Display format: `[general] bob: hi`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub room_name: String,
    pub username: String,
    #[serde(rename = "msg")]
    pub text: String,
}

impl Message {
    pub fn new(
        room_name: impl Into<String>,
        username: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            room_name: room_name.into(),
            username: username.into(),
            text: text.into(),
        }
    }

    /// A notice from the relay: no room name, sent as "Server".
    pub fn system(text: impl Into<String>) -> Self {
        Self::new("", SERVER_USERNAME, text)
    }

    pub fn is_system(&self) -> bool {
        self.username == SERVER_USERNAME && self.room_name.is_empty()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.room_name, self.username, self.text)
    }
}

impl From<Message> for String {
    fn from(msg: Message) -> Self {
        msg.to_string()
    }
}
