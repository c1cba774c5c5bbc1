/// Tic-tac-toe room
pub mod game;
pub mod rules;

pub use game::{TicTacToeEvent, TicTacToeInput, TicTacToeRoom};
pub use rules::{Mark, Outcome, Role, TicTacToeRejection, TicTacToeState};
