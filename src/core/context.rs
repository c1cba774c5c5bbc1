/// Broadcast/notification buffer handed to every room handler.
///
/// Handlers never touch sockets. They record what should be sent and what
/// should be scheduled, and the coordinator delivers it once the handler
/// has returned, so a handler always runs to completion against one
/// consistent state.
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::core::connection::ConnectionId;

/// Who receives an outgoing event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Only this connection
    Conn(ConnectionId),
    /// Every connection in the room
    All,
}

/// A deferred callback into the room, fired after `delay` unless `token` is cancelled first.
#[derive(Debug)]
pub struct Scheduled<T> {
    pub delay: Duration,
    pub timer: T,
    pub token: CancellationToken,
}

#[derive(Debug)]
pub struct RoomContext<E, T> {
    outbox: Vec<(Target, E)>,
    scheduled: Vec<Scheduled<T>>,
}

impl<E, T> Default for RoomContext<E, T> {
    fn default() -> Self {
        Self {
            outbox: Vec::new(),
            scheduled: Vec::new(),
        }
    }
}

impl<E, T> RoomContext<E, T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an event for a single connection
    pub fn emit_to(&mut self, conn: ConnectionId, event: E) {
        self.outbox.push((Target::Conn(conn), event));
    }

    /// Queue an event for the whole room
    pub fn broadcast(&mut self, event: E) {
        self.outbox.push((Target::All, event));
    }

    /// Schedule `timer` to be fed back into the room after `delay`.
    ///
    /// The returned token cancels the timer. Cancelling after it already fired
    /// is harmless, so rooms should still check that a fired timer is the one
    /// they are waiting for.
    pub fn schedule(&mut self, delay: Duration, timer: T) -> CancellationToken {
        let token = CancellationToken::new();
        self.scheduled.push(Scheduled {
            delay,
            timer,
            token: token.clone(),
        });
        token
    }

    pub fn events(&self) -> &[(Target, E)] {
        &self.outbox
    }

    pub fn scheduled(&self) -> &[Scheduled<T>] {
        &self.scheduled
    }

    pub fn is_empty(&self) -> bool {
        self.outbox.is_empty() && self.scheduled.is_empty()
    }

    pub fn into_parts(self) -> (Vec<(Target, E)>, Vec<Scheduled<T>>) {
        (self.outbox, self.scheduled)
    }
}
