/// Core room interface for the gamerooms server
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::core::connection::ConnectionId;
use crate::core::context::RoomContext;

/// Inbound message envelope: `{"event": "...", "data": ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub event: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl Frame {
    pub fn new(event: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }

    /// Frame without a payload
    pub fn bare(event: impl Into<String>) -> Self {
        Self::new(event, serde_json::Value::Null)
    }

    /// Decode the payload into `T`, `None` if the shape doesn't fit
    pub fn data_as<T: DeserializeOwned>(&self) -> Option<T> {
        serde_json::from_value(self.data.clone()).ok()
    }
}

/// Static description of a room, shown by `gamerooms list`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameMetadata {
    pub name: &'static str,
    pub description: &'static str,
    pub min_players: usize,
    /// `None` means no seat limit
    pub max_players: Option<usize>,
}

/// Shorthand for the context type a room's handlers receive
pub type Ctx<G> = RoomContext<<G as RoomGame>::Event, <G as RoomGame>::Timer>;

/// Main room trait that every game implements.
///
/// A room owns its whole state. The coordinator calls exactly one handler at
/// a time, so handlers may mutate freely; everything they want sent or
/// scheduled goes through the context.
pub trait RoomGame: Send + 'static {
    /// Parsed client input
    type Input: Send + 'static;

    /// Server -> client events, serialized as `{"event", "data"}` frames
    type Event: Serialize + Send + 'static;

    /// Deferred callbacks the room schedules for itself
    type Timer: Send + 'static;

    fn metadata(&self) -> GameMetadata;

    /// Game controls its own input parsing. `None` drops the frame.
    fn parse_input(frame: &Frame) -> Option<Self::Input>;

    fn on_connect(&mut self, _conn: ConnectionId, _ctx: &mut Ctx<Self>) {}

    fn handle_input(&mut self, conn: ConnectionId, input: Self::Input, ctx: &mut Ctx<Self>);

    fn on_disconnect(&mut self, conn: ConnectionId, ctx: &mut Ctx<Self>);

    fn on_timer(&mut self, _timer: Self::Timer, _ctx: &mut Ctx<Self>) {}
}
