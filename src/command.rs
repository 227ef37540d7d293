use crate::error::ChatError;
use crate::protocol::Action;

/// A line typed at the client prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    CreateRoom { room: String },
    ListRooms,
    JoinRoom { room: String },
    SendMsg { text: String },
    Quit,
}

pub const USAGE: &str =
    "Commands: CREATEROOM <name>, LISTROOMS, JOINROOM <name>, SENDMSG <message>, QUIT";

impl Command {
    /// Parse `KEYWORD [argument]`. The keyword is case-insensitive; the
    /// argument is everything after the first space.
    pub fn parse(input: &str) -> Result<Self, ChatError> {
        let input = input.trim();
        let (cmd, args) = input
            .split_once(' ')
            .map(|(c, a)| (c, a.trim()))
            .unwrap_or((input, ""));

        match cmd.to_ascii_uppercase().as_str() {
            "CREATEROOM" => {
                if args.is_empty() {
                    return Err(ChatError::Parse("Usage: CREATEROOM <name>".into()));
                }
                Ok(Command::CreateRoom {
                    room: args.to_string(),
                })
            }
            "LISTROOMS" => Ok(Command::ListRooms),
            "JOINROOM" => {
                if args.is_empty() {
                    return Err(ChatError::Parse("Usage: JOINROOM <name>".into()));
                }
                Ok(Command::JoinRoom {
                    room: args.to_string(),
                })
            }
            "SENDMSG" => {
                if args.is_empty() {
                    return Err(ChatError::Parse("Usage: SENDMSG <message>".into()));
                }
                Ok(Command::SendMsg {
                    text: args.to_string(),
                })
            }
            "QUIT" => Ok(Command::Quit),
            _ => Err(ChatError::Parse(USAGE.into())),
        }
    }

    /// The request body to put on the wire.
    pub fn into_action(self) -> Action {
        match self {
            Command::CreateRoom { room } => Action::CreateRoom { room },
            Command::ListRooms => Action::ListRooms,
            Command::JoinRoom { room } => Action::JoinRoom { room },
            Command::SendMsg { text } => Action::SendMsg {
                room: None,
                msg: text,
            },
            Command::Quit => Action::Quit,
        }
    }
}
