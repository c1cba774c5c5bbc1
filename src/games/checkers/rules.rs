//! Simplified checkers: single steps and single captures, no chains, no forced jumps.
//!
//! The board is 64 cells in row-major order (`index = row * 8 + col`). Red
//! starts at the bottom (rows 5-7) and moves up toward row 0; white starts at
//! the top (rows 0-2) and moves down toward row 7. Pieces only ever sit on
//! cells where `row + col` is odd, but that is a property of the starting
//! layout, not something move validation checks.

use serde::Serialize;
use thiserror::Error;

pub const SIZE: usize = 8;
pub const CELLS: usize = SIZE * SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Red,
    White,
}

impl Side {
    pub fn other(self) -> Self {
        match self {
            Side::Red => Side::White,
            Side::White => Side::Red,
        }
    }

    /// Row delta of a forward step for an uncrowned piece
    fn forward(self) -> i32 {
        match self {
            Side::Red => -1,
            Side::White => 1,
        }
    }

    /// Row on which this side's pieces are crowned
    pub fn crowning_row(self) -> usize {
        match self {
            Side::Red => 0,
            Side::White => SIZE - 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Piece {
    pub color: Side,
    pub is_king: bool,
}

impl Piece {
    pub fn man(color: Side) -> Self {
        Self {
            color,
            is_king: false,
        }
    }
}

/// Role of a connection in the checkers room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Red,
    White,
    Spectator,
}

impl Role {
    pub fn side(self) -> Option<Side> {
        match self {
            Role::Red => Some(Side::Red),
            Role::White => Some(Side::White),
            Role::Spectator => None,
        }
    }
}

/// What an accepted request did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// `to` held the mover's own piece: it becomes the selection, board untouched
    Selected(usize),
    Moved {
        captured: Option<usize>,
        promoted: bool,
        winner: Option<Side>,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckersRejection {
    #[error("spectators cannot move")]
    Spectator,
    #[error("not this player's turn")]
    NotYourTurn,
    #[error("cell {0} is off the board")]
    OutOfRange(usize),
    #[error("no piece of the mover's at {0}")]
    NotOwnPiece(usize),
    #[error("destination {0} is occupied")]
    Occupied(usize),
    #[error("uncrowned pieces only move forward")]
    WrongDirection,
    #[error("not a diagonal step or capture")]
    IllegalShape,
    #[error("no opposing piece to capture")]
    NothingToCapture,
}

pub type Board = [Option<Piece>; CELLS];

pub fn row_col(index: usize) -> (usize, usize) {
    (index / SIZE, index % SIZE)
}

pub fn index(row: usize, col: usize) -> usize {
    row * SIZE + col
}

/// Standard opening: three rows each, dark squares only
pub fn initial_board() -> Board {
    let mut board: Board = [None; CELLS];
    for (i, cell) in board.iter_mut().enumerate() {
        let (row, col) = row_col(i);
        if (row + col) % 2 == 0 {
            continue;
        }
        *cell = match row {
            0..=2 => Some(Piece::man(Side::White)),
            5..=7 => Some(Piece::man(Side::Red)),
            _ => None,
        };
    }
    board
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckersState {
    pub board: Board,
    pub turn: Side,
}

impl Default for CheckersState {
    fn default() -> Self {
        Self {
            board: initial_board(),
            turn: Side::Red,
        }
    }
}

impl CheckersState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, side: Side) -> usize {
        self.board
            .iter()
            .flatten()
            .filter(|p| p.color == side)
            .count()
    }

    /// Whether `role` may pick up the piece at `cell` right now
    pub fn can_select(&self, role: Role, cell: usize) -> bool {
        match (role.side(), self.board.get(cell)) {
            (Some(side), Some(Some(piece))) => side == self.turn && piece.color == side,
            _ => false,
        }
    }

    pub fn apply_move(
        &mut self,
        role: Role,
        from: usize,
        to: usize,
    ) -> Result<MoveOutcome, CheckersRejection> {
        let side = role.side().ok_or(CheckersRejection::Spectator)?;
        if side != self.turn {
            return Err(CheckersRejection::NotYourTurn);
        }
        for cell in [from, to] {
            if cell >= CELLS {
                return Err(CheckersRejection::OutOfRange(cell));
            }
        }

        let piece = match self.board[from] {
            Some(p) if p.color == side => p,
            _ => return Err(CheckersRejection::NotOwnPiece(from)),
        };
        match self.board[to] {
            Some(p) if p.color == side => return Ok(MoveOutcome::Selected(to)),
            Some(_) => return Err(CheckersRejection::Occupied(to)),
            None => {}
        }

        let (from_row, from_col) = row_col(from);
        let (to_row, to_col) = row_col(to);
        let dr = to_row as i32 - from_row as i32;
        let dc = to_col as i32 - from_col as i32;

        if !piece.is_king && dr.signum() != side.forward() {
            return Err(CheckersRejection::WrongDirection);
        }

        let captured = match (dr.abs(), dc.abs()) {
            (1, 1) => None,
            (2, 2) => {
                let mid = (from + to) / 2;
                match self.board[mid] {
                    Some(p) if p.color != side => Some(mid),
                    _ => return Err(CheckersRejection::NothingToCapture),
                }
            }
            _ => return Err(CheckersRejection::IllegalShape),
        };

        if let Some(mid) = captured {
            self.board[mid] = None;
        }
        self.board[from] = None;

        let promoted = !piece.is_king && to_row == side.crowning_row();
        self.board[to] = Some(Piece {
            color: side,
            is_king: piece.is_king || promoted,
        });

        self.turn = side.other();
        let winner = (self.count(side.other()) == 0).then_some(side);

        Ok(MoveOutcome::Moved {
            captured,
            promoted,
            winner,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty() -> CheckersState {
        CheckersState {
            board: [None; CELLS],
            turn: Side::Red,
        }
    }

    #[test]
    fn opening_layout() {
        let state = CheckersState::new();
        assert_eq!(state.count(Side::Red), 12);
        assert_eq!(state.count(Side::White), 12);
        for (i, cell) in state.board.iter().enumerate() {
            let (row, col) = row_col(i);
            if cell.is_some() {
                assert_eq!((row + col) % 2, 1, "piece on light square {i}");
            }
        }
        assert_eq!(state.turn, Side::Red);
    }

    #[test]
    fn single_step_never_captures() {
        let mut state = CheckersState::new();
        // red (5,0) -> (4,1)
        let outcome = state.apply_move(Role::Red, index(5, 0), index(4, 1)).unwrap();
        assert_eq!(
            outcome,
            MoveOutcome::Moved {
                captured: None,
                promoted: false,
                winner: None
            }
        );
        assert_eq!(state.count(Side::White), 12);
        assert_eq!(state.turn, Side::White);
    }

    #[test]
    fn double_step_captures_only_over_opponent() {
        let mut state = empty();
        state.board[index(5, 2)] = Some(Piece::man(Side::Red));
        state.board[index(4, 3)] = Some(Piece::man(Side::White));
        state.board[index(0, 7)] = Some(Piece::man(Side::White));

        let outcome = state.apply_move(Role::Red, index(5, 2), index(3, 4)).unwrap();
        assert_eq!(
            outcome,
            MoveOutcome::Moved {
                captured: Some(index(4, 3)),
                promoted: false,
                winner: None
            }
        );
        assert!(state.board[index(4, 3)].is_none());
        assert_eq!(state.count(Side::White), 1);
    }

    #[test]
    fn double_step_over_empty_or_own_is_rejected() {
        let mut state = empty();
        state.board[index(5, 2)] = Some(Piece::man(Side::Red));
        let before = state.clone();
        assert_eq!(
            state.apply_move(Role::Red, index(5, 2), index(3, 4)),
            Err(CheckersRejection::NothingToCapture)
        );

        state.board[index(4, 3)] = Some(Piece::man(Side::Red));
        assert_eq!(
            state.apply_move(Role::Red, index(5, 2), index(3, 4)),
            Err(CheckersRejection::NothingToCapture)
        );
        state.board[index(4, 3)] = None;
        assert_eq!(state, before);
    }

    #[test]
    fn men_cannot_move_backward_but_kings_can() {
        let mut state = empty();
        state.board[index(4, 3)] = Some(Piece::man(Side::Red));
        state.board[index(0, 1)] = Some(Piece::man(Side::White));
        assert_eq!(
            state.apply_move(Role::Red, index(4, 3), index(5, 4)),
            Err(CheckersRejection::WrongDirection)
        );

        state.board[index(4, 3)] = Some(Piece {
            color: Side::Red,
            is_king: true,
        });
        assert!(state.apply_move(Role::Red, index(4, 3), index(5, 4)).is_ok());
    }

    #[test]
    fn reaching_back_row_crowns_immediately() {
        let mut state = empty();
        state.board[index(1, 2)] = Some(Piece::man(Side::Red));
        state.board[index(7, 0)] = Some(Piece::man(Side::White));

        let outcome = state.apply_move(Role::Red, index(1, 2), index(0, 1)).unwrap();
        assert!(matches!(outcome, MoveOutcome::Moved { promoted: true, .. }));
        assert_eq!(
            state.board[index(0, 1)],
            Some(Piece {
                color: Side::Red,
                is_king: true
            })
        );

        // white crowns on row 7
        let mut state = empty();
        state.turn = Side::White;
        state.board[index(6, 1)] = Some(Piece::man(Side::White));
        state.board[index(0, 1)] = Some(Piece::man(Side::Red));
        let outcome = state.apply_move(Role::White, index(6, 1), index(7, 2)).unwrap();
        assert!(matches!(outcome, MoveOutcome::Moved { promoted: true, .. }));
    }

    #[test]
    fn targeting_own_piece_is_a_selection() {
        let mut state = CheckersState::new();
        let before = state.clone();
        assert_eq!(
            state.apply_move(Role::Red, index(5, 0), index(6, 1)),
            Ok(MoveOutcome::Selected(index(6, 1)))
        );
        assert_eq!(state, before);
    }

    #[test]
    fn turn_and_ownership_are_enforced() {
        let mut state = CheckersState::new();
        assert_eq!(
            state.apply_move(Role::White, index(2, 1), index(3, 0)),
            Err(CheckersRejection::NotYourTurn)
        );
        assert_eq!(
            state.apply_move(Role::Red, index(4, 1), index(3, 0)),
            Err(CheckersRejection::NotOwnPiece(index(4, 1)))
        );
        assert_eq!(
            state.apply_move(Role::Spectator, index(5, 0), index(4, 1)),
            Err(CheckersRejection::Spectator)
        );
        assert_eq!(
            state.apply_move(Role::Red, index(5, 0), 64),
            Err(CheckersRejection::OutOfRange(64))
        );
        assert_eq!(
            state.apply_move(Role::Red, index(5, 0), index(3, 0)),
            Err(CheckersRejection::IllegalShape)
        );
    }

    #[test]
    fn capturing_last_piece_wins() {
        let mut state = empty();
        state.board[index(5, 2)] = Some(Piece::man(Side::Red));
        state.board[index(4, 3)] = Some(Piece::man(Side::White));

        let outcome = state.apply_move(Role::Red, index(5, 2), index(3, 4)).unwrap();
        assert!(matches!(
            outcome,
            MoveOutcome::Moved {
                winner: Some(Side::Red),
                ..
            }
        ));
    }

    #[test]
    fn selection_requires_turn_and_ownership() {
        let state = CheckersState::new();
        assert!(state.can_select(Role::Red, index(5, 0)));
        assert!(!state.can_select(Role::Red, index(2, 1)));
        assert!(!state.can_select(Role::White, index(2, 1)));
        assert!(!state.can_select(Role::Red, 99));
    }
}
