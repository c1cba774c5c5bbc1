pub mod cli;
pub mod config;
pub mod core;
pub mod games;

// Re-export for convenience
pub use crate::core::coordinator::{RoomCoordinator, RoomError, RoomHandle};
pub use crate::core::game::{Ctx, Frame, GameMetadata, RoomGame};
pub use crate::core::registry::RoomDirectory;
