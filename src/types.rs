use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Ticket minted for every successful join.
///
/// A username can join, switch and rejoin many times; the session id tells
/// the manager which of those joins a later disconnect belongs to, so a
/// stale stream never evicts the membership that replaced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

impl SessionId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session#{}", self.0)
    }
}

/// Monotonic source of session ids.
#[derive(Debug, Default)]
pub struct SessionCounter(AtomicU64);

impl SessionCounter {
    pub fn next(&self) -> SessionId {
        SessionId::new(self.0.fetch_add(1, Ordering::Relaxed))
    }
}
