use std::sync::{Arc, Mutex};

use crate::mailbox::Mailbox;
use crate::message::Message;
use crate::types::SessionId;

/// A room shared between the registry and every operation touching it.
/// The mutex is the per-room lock: join, leave, send and broadcast on the
/// same room are mutually exclusive, different rooms proceed in parallel.
pub type SharedRoom = Arc<Mutex<Room>>;

/// A chat room: its message log and the mailboxes of the users in it.
#[derive(Debug, Default)]
pub struct Room {
    log: Vec<Message>,
    members: Vec<Mailbox>,
}

impl Room {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedRoom {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Register a mailbox and return the log as it stands.
    ///
    /// Both happen under the caller's single lock on the room, so every
    /// message is either in the returned history or delivered to the
    /// mailbox afterwards, never both and never neither.
    pub fn admit(&mut self, mailbox: Mailbox) -> Vec<Message> {
        self.members.push(mailbox);
        self.log.clone()
    }

    /// Remove the mailbox belonging to `session`. Dropping the returned
    /// mailbox closes its stream.
    pub fn evict(&mut self, session: SessionId) -> Option<Mailbox> {
        let idx = self.members.iter().position(|m| m.session() == session)?;
        Some(self.members.remove(idx))
    }

    /// Append to the log and fan out to every member.
    pub fn append(&mut self, msg: Message) {
        self.broadcast(&msg);
        self.log.push(msg);
    }

    /// Fan out without logging. Closed mailboxes are skipped.
    pub fn broadcast(&self, msg: &Message) {
        for mailbox in &self.members {
            if mailbox.is_open() {
                mailbox.deliver(msg.clone());
            }
        }
    }

    /// Broadcast a relay notice such as "alice joined".
    pub fn notify(&self, text: impl Into<String>) {
        self.broadcast(&Message::system(text));
    }

    pub fn log(&self) -> &[Message] {
        &self.log
    }

    pub fn member_names(&self) -> Vec<String> {
        self.members.iter().map(|m| m.owner().to_string()).collect()
    }
}
