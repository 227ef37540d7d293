use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChatError>;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("network error: {0}")]
    Network(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("room already exists: {0}")]
    AlreadyExists(String),

    #[error("room not found: {0}")]
    RoomNotFound(String),

    /// Sending without naming a room while not joined to one.
    #[error("{0} is not in a room, join one first")]
    NotInRoom(String),
}
