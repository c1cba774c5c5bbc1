use std::collections::BTreeMap;

use crate::core::coordinator::{RoomCoordinator, RoomError, RoomHandle};
use crate::core::game::{GameMetadata, RoomGame};

/// Directory of running rooms, one per namespace
#[derive(Debug, Clone, Default)]
pub struct RoomDirectory {
    rooms: BTreeMap<String, RoomHandle>,
}

impl RoomDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a coordinator for `game` and publish it under `namespace`.
    /// A later registration for the same namespace replaces the earlier one.
    pub fn register<G: RoomGame>(&mut self, namespace: &str, game: G) -> RoomHandle {
        let handle = RoomCoordinator::spawn(namespace, game);
        self.rooms.insert(namespace.to_string(), handle.clone());
        handle
    }

    /// Look a room up by namespace; leading/trailing slashes are ignored
    pub fn get(&self, namespace: &str) -> Result<&RoomHandle, RoomError> {
        let key = namespace.trim_matches('/');
        self.rooms
            .get(key)
            .ok_or_else(|| RoomError::UnknownNamespace(key.to_string()))
    }

    pub fn has_room(&self, namespace: &str) -> bool {
        self.get(namespace).is_ok()
    }

    /// All rooms with their metadata, ordered by namespace
    pub fn list_rooms(&self) -> Vec<(&str, &GameMetadata)> {
        self.rooms
            .iter()
            .map(|(namespace, handle)| (namespace.as_str(), handle.metadata()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
