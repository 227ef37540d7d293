use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use tracing::{debug, info};

use crate::directory::{Seat, SessionDirectory};
use crate::error::Result;
use crate::mailbox::{Mailbox, MailboxReceiver};
use crate::message::Message;
use crate::registry::RoomRegistry;
use crate::room::SharedRoom;
use crate::types::{SessionCounter, SessionId};

/// Owns every room and every user's seat, and hands out room streams.
///
/// Cloning is cheap and every clone talks to the same state.
///
/// Lock order is directory → registry → one room. The registry lock is
/// only held long enough to look a room up, and a room switch releases the
/// old room before touching the new one, so no path ever holds two room
/// locks at once.
///
/// Sends take only their room's lock, so traffic in different rooms runs in
/// parallel. Joins and leaves are coarser: they hold the directory lock for
/// the whole transition, so membership changes in unrelated rooms queue
/// behind each other. That keeps the directory and every room's member list
/// in agreement for any reader, and each transition is a few pushes and
/// removals under that lock.
#[derive(Debug, Clone, Default)]
pub struct RoomManager {
    shared: Arc<Shared>,
}

#[derive(Debug, Default)]
struct Shared {
    registry: RwLock<RoomRegistry>,
    directory: Mutex<SessionDirectory>,
    sessions: SessionCounter,
}

// Critical sections never panic halfway through a mutation, so the data
// behind a poisoned lock is still consistent.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Shared {
    fn room(&self, name: &str) -> Result<SharedRoom> {
        self.registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get_room(name)
    }

    /// Take `username` out of their room. With `only` set, do nothing
    /// unless the seat still belongs to that session.
    fn leave_locked(
        &self,
        directory: &mut SessionDirectory,
        username: &str,
        only: Option<SessionId>,
    ) -> Option<String> {
        let current = directory.current_room(username)?.session;
        if only.is_some_and(|session| session != current) {
            return None;
        }
        let seat = directory.set_room(username, None)?;

        if let Ok(room) = self.room(&seat.room) {
            let mut room = lock(&room);
            // Dropping the evicted mailbox ends the user's stream.
            drop(room.evict(seat.session));
            room.notify(format!("{username} has left."));
        }

        info!(username, room = %seat.room, session = %seat.session, "left room");
        Some(seat.room)
    }
}

impl RoomManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_room(&self, name: &str) -> Result<()> {
        self.shared
            .registry
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .create_room(name)?;
        info!(room = name, "room created");
        Ok(())
    }

    pub fn list_rooms(&self) -> Vec<String> {
        self.shared
            .registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .list_rooms()
    }

    /// Put `username` in `room_name`, leaving whatever room they were in.
    ///
    /// Fails with `RoomNotFound` before touching any state. On success the
    /// returned stream yields the room's history, then the "joined" notice,
    /// then live traffic.
    pub fn join(&self, username: &str, room_name: &str) -> Result<RoomStream> {
        let room = self.shared.room(room_name)?;

        let mut directory = lock(&self.shared.directory);
        if let Some(old) = self.shared.leave_locked(&mut directory, username, None) {
            debug!(username, from = %old, to = room_name, "switching rooms");
        }

        let session = self.shared.sessions.next();
        let (mailbox, rx) = Mailbox::open(username, session);
        let history = {
            let mut room = lock(&room);
            let history = room.admit(mailbox);
            room.notify(format!("{username} joined"));
            history
        };
        directory.set_room(
            username,
            Some(Seat {
                room: room_name.to_string(),
                session,
            }),
        );
        drop(directory);

        info!(username, room = room_name, %session, history = history.len(), "joined room");

        Ok(RoomStream {
            username: username.to_string(),
            room: room_name.to_string(),
            session,
            history: history.into(),
            rx,
            shared: Arc::clone(&self.shared),
        })
    }

    /// Take `username` out of their current room. Returns the room left,
    /// or `None` if they were not in one.
    pub fn leave(&self, username: &str) -> Option<String> {
        let mut directory = lock(&self.shared.directory);
        self.shared.leave_locked(&mut directory, username, None)
    }

    /// Log `text` in `room_name` and fan it out to the room's members.
    /// Posting does not require being a member.
    pub fn send(&self, username: &str, room_name: &str, text: &str) -> Result<()> {
        let room = self.shared.room(room_name)?;
        lock(&room).append(Message::new(room_name, username, text));
        debug!(username, room = room_name, "message sent");
        Ok(())
    }

    pub fn current_room(&self, username: &str) -> Option<String> {
        lock(&self.shared.directory)
            .current_room(username)
            .map(|seat| seat.room.clone())
    }

    /// Usernames with a live mailbox in `room_name`, in join order.
    pub fn members(&self, room_name: &str) -> Result<Vec<String>> {
        let room = self.shared.room(room_name)?;
        let _directory = lock(&self.shared.directory);
        let names = lock(&room).member_names();
        Ok(names)
    }
}

/// One user's view of one room: history first, then live messages.
///
/// Dropping the stream is the disconnect hook. It takes the user out of the
/// room exactly once, and not at all if a later join already moved them.
#[derive(Debug)]
pub struct RoomStream {
    username: String,
    room: String,
    session: SessionId,
    history: VecDeque<Message>,
    rx: MailboxReceiver,
    shared: Arc<Shared>,
}

impl RoomStream {
    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn room(&self) -> &str {
        &self.room
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Next message for this client. `None` once the user has switched
    /// rooms or been removed and everything queued has been read.
    pub async fn recv(&mut self) -> Option<Message> {
        if let Some(msg) = self.history.pop_front() {
            return Some(msg);
        }
        self.rx.recv().await
    }
}

impl Drop for RoomStream {
    fn drop(&mut self) {
        let mut directory = lock(&self.shared.directory);
        self.shared
            .leave_locked(&mut directory, &self.username, Some(self.session));
    }
}
