/// Checkers room
pub mod game;
pub mod rules;

pub use game::{CheckersEvent, CheckersInput, CheckersRoom, MoveRequest};
pub use rules::{CheckersRejection, CheckersState, MoveOutcome, Piece, Role, Side};
