use serde::{Deserialize, Serialize};

use crate::error::{ChatError, Result};
use crate::message::Message;

/// Wire protocol: newline-delimited JSON in both directions.
///
/// Requests carry the acting username and an `arg` naming the operation:
///
///   {"username":"alice","arg":"CREATEROOM","room":"general"}
///   {"username":"alice","arg":"LISTROOMS"}
///   {"username":"alice","arg":"JOINROOM","room":"general"}
///   {"username":"alice","arg":"SENDMSG","msg":"hi"}
///   {"username":"alice","arg":"QUIT"}
///
/// Responses are tagged by `kind`. Chat messages streamed from a joined room
/// arrive as `{"kind":"chat","roomName":..,"username":..,"msg":..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub username: String,
    #[serde(flatten)]
    pub action: Action,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "arg", rename_all = "UPPERCASE")]
pub enum Action {
    CreateRoom {
        room: String,
    },
    ListRooms,
    JoinRoom {
        room: String,
    },
    /// `room` defaults to the sender's current room.
    SendMsg {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        room: Option<String>,
        msg: String,
    },
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Response {
    Ok { message: String },
    Rooms { rooms: Vec<String> },
    Joined { room: String },
    Chat(Message),
    Error { error: String },
}

impl Response {
    pub fn ok(message: impl Into<String>) -> Self {
        Response::Ok {
            message: message.into(),
        }
    }

    pub fn error(err: &ChatError) -> Self {
        Response::Error {
            error: err.to_string(),
        }
    }
}

pub fn decode_request(line: &str) -> Result<Request> {
    let line = line.trim();
    if line.is_empty() {
        return Err(ChatError::Parse("empty request".into()));
    }
    Ok(serde_json::from_str(line)?)
}

pub fn decode_response(line: &str) -> Result<Response> {
    Ok(serde_json::from_str(line.trim())?)
}

/// Serialise one frame, newline included.
pub fn encode_line<T: Serialize>(frame: &T) -> Result<String> {
    let mut line = serde_json::to_string(frame)?;
    line.push('\n');
    Ok(line)
}
