use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info};

use crate::core::connection::ConnectionId;
use crate::core::game::{Ctx, Frame, GameMetadata, RoomGame};
use crate::games::tictactoe::rules::{Board, Mark, Outcome, Role, TicTacToeState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicTacToeInput {
    MakeMove(usize),
    ResetGame,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum TicTacToeEvent {
    AssignRole(Role),
    UpdateBoard {
        board: Board,
        turn: Mark,
    },
    GameOver {
        #[serde(skip_serializing_if = "Option::is_none")]
        winner: Option<Mark>,
        #[serde(skip_serializing_if = "std::ops::Not::not")]
        draw: bool,
    },
    GameReset,
}

/// Two seats, everyone else watches. Seats are first come, first served.
#[derive(Debug, Default)]
pub struct TicTacToeRoom {
    state: TicTacToeState,
    roles: HashMap<ConnectionId, Role>,
    x_seat: Option<ConnectionId>,
    o_seat: Option<ConnectionId>,
}

impl TicTacToeRoom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &TicTacToeState {
        &self.state
    }

    pub fn role_of(&self, conn: ConnectionId) -> Option<Role> {
        self.roles.get(&conn).copied()
    }

    fn board_update(&self) -> TicTacToeEvent {
        TicTacToeEvent::UpdateBoard {
            board: self.state.board,
            turn: self.state.turn,
        }
    }

    fn make_move(&mut self, conn: ConnectionId, cell: usize, ctx: &mut Ctx<Self>) {
        let role = self.role_of(conn).unwrap_or(Role::Spectator);

        match self.state.apply_move(role, cell) {
            Ok(outcome) => {
                ctx.broadcast(self.board_update());
                match outcome {
                    Outcome::Continue => {}
                    Outcome::Win(mark) => {
                        info!(winner = ?mark, "tic-tac-toe won");
                        ctx.broadcast(TicTacToeEvent::GameOver {
                            winner: Some(mark),
                            draw: false,
                        });
                    }
                    Outcome::Draw => {
                        info!("tic-tac-toe drawn");
                        ctx.broadcast(TicTacToeEvent::GameOver {
                            winner: None,
                            draw: true,
                        });
                    }
                }
            }
            Err(e) => debug!(%conn, "tic-tac-toe move rejected: {e}"),
        }
    }

    /// Fresh board, X to move. Seats are kept.
    pub fn reset(&mut self, ctx: &mut Ctx<Self>) {
        self.state = TicTacToeState::new();
        ctx.broadcast(TicTacToeEvent::GameReset);
        ctx.broadcast(self.board_update());
    }
}

impl RoomGame for TicTacToeRoom {
    type Input = TicTacToeInput;
    type Event = TicTacToeEvent;
    type Timer = ();

    fn metadata(&self) -> GameMetadata {
        GameMetadata {
            name: "Tic-Tac-Toe",
            description: "Three in a row; late arrivals spectate",
            min_players: 2,
            max_players: Some(2),
        }
    }

    fn parse_input(frame: &Frame) -> Option<Self::Input> {
        match frame.event.as_str() {
            "makeMove" => frame.data_as::<usize>().map(TicTacToeInput::MakeMove),
            "resetGame" => Some(TicTacToeInput::ResetGame),
            _ => None,
        }
    }

    fn on_connect(&mut self, conn: ConnectionId, ctx: &mut Ctx<Self>) {
        let role = if self.x_seat.is_none() {
            self.x_seat = Some(conn);
            Role::X
        } else if self.o_seat.is_none() {
            self.o_seat = Some(conn);
            Role::O
        } else {
            Role::Spectator
        };
        self.roles.insert(conn, role);
        debug!(%conn, ?role, "tic-tac-toe role assigned");

        ctx.emit_to(conn, TicTacToeEvent::AssignRole(role));
        ctx.emit_to(conn, self.board_update());
    }

    fn handle_input(&mut self, conn: ConnectionId, input: Self::Input, ctx: &mut Ctx<Self>) {
        match input {
            TicTacToeInput::MakeMove(cell) => self.make_move(conn, cell, ctx),
            TicTacToeInput::ResetGame => self.reset(ctx),
        }
    }

    fn on_disconnect(&mut self, conn: ConnectionId, _ctx: &mut Ctx<Self>) {
        self.roles.remove(&conn);
        // the seat stays empty until a new connection claims it
        if self.x_seat == Some(conn) {
            self.x_seat = None;
        }
        if self.o_seat == Some(conn) {
            self.o_seat = None;
        }
    }
}
