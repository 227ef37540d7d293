use tokio::sync::mpsc;

use crate::message::Message;
use crate::types::SessionId;

/// The sending half of a client's delivery queue, owned by the room the
/// client is in.
///
/// Unbounded so a broadcast never waits on a slow reader. The sender is not
/// `Clone`: the room holds the only one, so evicting (dropping) the mailbox
/// closes the queue and the reader sees end-of-stream once it has drained
/// what was already queued.
#[derive(Debug)]
pub struct Mailbox {
    owner: String,
    session: SessionId,
    tx: mpsc::UnboundedSender<Message>,
}

/// The receiving half, drained by the owner's stream.
pub type MailboxReceiver = mpsc::UnboundedReceiver<Message>;

impl Mailbox {
    pub fn open(owner: impl Into<String>, session: SessionId) -> (Self, MailboxReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mailbox = Self {
            owner: owner.into(),
            session,
            tx,
        };
        (mailbox, rx)
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    /// False once the reader has gone away.
    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }

    /// Best-effort push. Returns whether the message was queued.
    pub fn deliver(&self, msg: Message) -> bool {
        self.tx.send(msg).is_ok()
    }
}
