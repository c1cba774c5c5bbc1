/// Room coordinator - one actor per namespace, sole owner of that room's state.
///
/// Every connect, input, disconnect and fired timer goes through one queue and
/// is handled to completion before the next, so a room never observes a
/// half-applied mutation.
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::core::connection::{ConnectionId, ConnectionRegistry, FrameSender};
use crate::core::context::{Scheduled, Target};
use crate::core::game::{Ctx, Frame, GameMetadata, RoomGame};

#[derive(Debug, Error)]
pub enum RoomError {
    #[error("no room is registered under '/{0}'")]
    UnknownNamespace(String),
    #[error("room '{0}' is no longer running")]
    Closed(String),
}

/// A command received by a [`RoomCoordinator`].
#[derive(Debug)]
enum Command {
    Connect {
        conn: ConnectionId,
        sender: FrameSender,
    },
    Input {
        conn: ConnectionId,
        frame: Frame,
    },
    Disconnect {
        conn: ConnectionId,
    },
}

/// Cloneable front door to a running room. Not generic, so rooms of every
/// game type can sit in the same directory.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    namespace: String,
    metadata: GameMetadata,
    cmd_tx: mpsc::UnboundedSender<Command>,
}

impl RoomHandle {
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn metadata(&self) -> &GameMetadata {
        &self.metadata
    }

    pub fn connect(&self, conn: ConnectionId, sender: FrameSender) -> Result<(), RoomError> {
        self.send(Command::Connect { conn, sender })
    }

    pub fn input(&self, conn: ConnectionId, frame: Frame) -> Result<(), RoomError> {
        self.send(Command::Input { conn, frame })
    }

    pub fn disconnect(&self, conn: ConnectionId) -> Result<(), RoomError> {
        self.send(Command::Disconnect { conn })
    }

    fn send(&self, cmd: Command) -> Result<(), RoomError> {
        self.cmd_tx
            .send(cmd)
            .map_err(|_| RoomError::Closed(self.namespace.clone()))
    }
}

pub struct RoomCoordinator<G: RoomGame> {
    namespace: String,
    game: G,
    connections: ConnectionRegistry,
    cmd_rx: mpsc::UnboundedReceiver<Command>,
    timer_tx: mpsc::UnboundedSender<G::Timer>,
    timer_rx: mpsc::UnboundedReceiver<G::Timer>,
}

impl<G: RoomGame> RoomCoordinator<G> {
    /// Wrap `game` in a coordinator. Call and spawn [`run`](Self::run) to start
    /// processing commands.
    pub fn new(namespace: impl Into<String>, game: G) -> (Self, RoomHandle) {
        let namespace = namespace.into();
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (timer_tx, timer_rx) = mpsc::unbounded_channel();

        let handle = RoomHandle {
            namespace: namespace.clone(),
            metadata: game.metadata(),
            cmd_tx,
        };

        (
            Self {
                namespace,
                game,
                connections: ConnectionRegistry::new(),
                cmd_rx,
                timer_tx,
                timer_rx,
            },
            handle,
        )
    }

    /// Build the coordinator and run it on the current tokio runtime
    pub fn spawn(namespace: impl Into<String>, game: G) -> RoomHandle {
        let (coordinator, handle) = Self::new(namespace, game);
        tokio::spawn(coordinator.run());
        handle
    }

    /// Process commands until every [`RoomHandle`] is dropped
    pub async fn run(mut self) {
        debug!(room = %self.namespace, "room coordinator started");

        loop {
            tokio::select! {
                cmd = self.cmd_rx.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd),
                    None => break,
                },
                Some(timer) = self.timer_rx.recv() => {
                    let mut ctx = Ctx::<G>::new();
                    self.game.on_timer(timer, &mut ctx);
                    self.dispatch(ctx);
                }
            }
        }

        debug!(room = %self.namespace, "room coordinator stopped");
    }

    fn handle_command(&mut self, cmd: Command) {
        let mut ctx = Ctx::<G>::new();

        match cmd {
            Command::Connect { conn, sender } => {
                self.connections.add(conn, sender);
                info!(room = %self.namespace, %conn, online = self.connections.len(), "connected");
                self.game.on_connect(conn, &mut ctx);
            }
            Command::Input { conn, frame } => {
                if !self.connections.contains(conn) {
                    debug!(room = %self.namespace, %conn, "input from unknown connection dropped");
                    return;
                }
                match G::parse_input(&frame) {
                    Some(input) => self.game.handle_input(conn, input, &mut ctx),
                    None => {
                        debug!(room = %self.namespace, %conn, event = %frame.event, "unrecognized frame dropped");
                    }
                }
            }
            Command::Disconnect { conn } => {
                let Some(session) = self.connections.remove(conn) else {
                    return;
                };
                info!(
                    room = %self.namespace,
                    %conn,
                    online = self.connections.len(),
                    session_secs = session.as_secs(),
                    "disconnected"
                );
                self.game.on_disconnect(conn, &mut ctx);
            }
        }

        self.dispatch(ctx);
    }

    /// Deliver everything a handler queued, then arm its timers
    fn dispatch(&mut self, ctx: Ctx<G>) {
        let (outbox, scheduled) = ctx.into_parts();

        for (target, event) in outbox {
            let frame = match serde_json::to_string(&event) {
                Ok(frame) => frame,
                Err(e) => {
                    warn!(room = %self.namespace, "failed to serialize event: {e}");
                    continue;
                }
            };
            match target {
                Target::Conn(conn) => {
                    if !self.connections.send_to(conn, &frame) {
                        debug!(room = %self.namespace, %conn, "dropped event for closed connection");
                    }
                }
                Target::All => self.connections.broadcast(&frame),
            }
        }

        for Scheduled { delay, timer, token } in scheduled {
            let timer_tx = self.timer_tx.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = token.cancelled() => {}
                    _ = tokio::time::sleep(delay) => {
                        let _ = timer_tx.send(timer);
                    }
                }
            });
        }
    }
}
