/// Connection registry - every live socket in a room, keyed by its handle
use std::collections::HashMap;
use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Transient handle for one live connection. Never reused, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Outbound half of a connection: serialized frames are pushed here and the
/// socket task forwards them to the wire.
pub type FrameSender = mpsc::UnboundedSender<String>;

#[derive(Debug)]
struct ConnectionEntry {
    sender: FrameSender,
    connected_at: Instant,
}

/// Per-room registry of connected sockets
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    entries: HashMap<ConnectionId, ConnectionEntry>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, id: ConnectionId, sender: FrameSender) {
        self.entries.insert(
            id,
            ConnectionEntry {
                sender,
                connected_at: Instant::now(),
            },
        );
    }

    /// Drops the connection. Returns how long it was connected, if it was known.
    pub fn remove(&mut self, id: ConnectionId) -> Option<std::time::Duration> {
        self.entries
            .remove(&id)
            .map(|entry| entry.connected_at.elapsed())
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Send a frame to one connection. Returns false if the connection is gone.
    pub fn send_to(&self, id: ConnectionId, frame: &str) -> bool {
        match self.entries.get(&id) {
            // errors if the socket task already exited; the disconnect is on its way
            Some(entry) => entry.sender.send(frame.to_string()).is_ok(),
            None => false,
        }
    }

    /// Send a frame to every connection in the room.
    pub fn broadcast(&self, frame: &str) {
        for entry in self.entries.values() {
            let _ = entry.sender.send(frame.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcast_reaches_every_connection() {
        let mut registry = ConnectionRegistry::new();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        registry.add(ConnectionId::new(), tx_a);
        registry.add(ConnectionId::new(), tx_b);

        registry.broadcast("hello");

        assert_eq!(rx_a.try_recv().unwrap(), "hello");
        assert_eq!(rx_b.try_recv().unwrap(), "hello");
    }

    #[test]
    fn send_to_unknown_connection_fails() {
        let registry = ConnectionRegistry::new();
        assert!(!registry.send_to(ConnectionId::new(), "x"));
    }

    #[test]
    fn removed_connection_no_longer_receives() {
        let mut registry = ConnectionRegistry::new();
        let id = ConnectionId::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        registry.add(id, tx);

        assert!(registry.remove(id).is_some());
        registry.broadcast("late");

        assert!(registry.is_empty());
        assert!(rx.try_recv().is_err());
    }
}
