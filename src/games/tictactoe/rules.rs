use serde::Serialize;
use thiserror::Error;

pub const CELLS: usize = 9;

/// Every three-in-a-row: 3 rows, 3 columns, 2 diagonals
pub const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    pub fn other(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

/// What a connection is in this room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Role {
    X,
    O,
    #[serde(rename = "spectator")]
    Spectator,
}

impl Role {
    pub fn mark(self) -> Option<Mark> {
        match self {
            Role::X => Some(Mark::X),
            Role::O => Some(Mark::O),
            Role::Spectator => None,
        }
    }
}

pub type Board = [Option<Mark>; CELLS];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Win(Mark),
    Draw,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TicTacToeRejection {
    #[error("spectators cannot move")]
    Spectator,
    #[error("not this player's turn")]
    NotYourTurn,
    #[error("cell {0} is off the board")]
    OutOfRange(usize),
    #[error("cell {0} is already taken")]
    Occupied(usize),
    #[error("game is over")]
    GameOver,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicTacToeState {
    pub board: Board,
    pub turn: Mark,
    pub outcome: Outcome,
}

impl Default for TicTacToeState {
    fn default() -> Self {
        Self {
            board: [None; CELLS],
            turn: Mark::X,
            outcome: Outcome::Continue,
        }
    }
}

impl TicTacToeState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place `role`'s mark on `cell`. On success the turn has already
    /// flipped, unless the move ended the game.
    pub fn apply_move(&mut self, role: Role, cell: usize) -> Result<Outcome, TicTacToeRejection> {
        if self.outcome != Outcome::Continue {
            return Err(TicTacToeRejection::GameOver);
        }
        let mark = role.mark().ok_or(TicTacToeRejection::Spectator)?;
        if mark != self.turn {
            return Err(TicTacToeRejection::NotYourTurn);
        }
        let slot = self
            .board
            .get_mut(cell)
            .ok_or(TicTacToeRejection::OutOfRange(cell))?;
        if slot.is_some() {
            return Err(TicTacToeRejection::Occupied(cell));
        }
        *slot = Some(mark);

        self.outcome = evaluate(&self.board);
        if self.outcome == Outcome::Continue {
            self.turn = self.turn.other();
        }
        Ok(self.outcome)
    }
}

pub fn winner(board: &Board) -> Option<Mark> {
    LINES.iter().find_map(|[a, b, c]| match (board[*a], board[*b], board[*c]) {
        (Some(x), Some(y), Some(z)) if x == y && y == z => Some(x),
        _ => None,
    })
}

pub fn evaluate(board: &Board) -> Outcome {
    match winner(board) {
        Some(mark) => Outcome::Win(mark),
        None if board.iter().all(Option::is_some) => Outcome::Draw,
        None => Outcome::Continue,
    }
}
