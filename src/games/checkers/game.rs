use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::connection::ConnectionId;
use crate::core::game::{Ctx, Frame, GameMetadata, RoomGame};
use crate::games::checkers::rules::{CheckersState, MoveOutcome, Piece, Role, Side};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct MoveRequest {
    pub from: usize,
    pub to: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckersInput {
    SelectPiece(usize),
    MakeMove(MoveRequest),
    ResetGame,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum CheckersEvent {
    AssignRole(Role),
    UpdateBoard {
        board: Vec<Option<Piece>>,
        turn: Side,
    },
    PieceSelected(usize),
    GameOver { winner: Side },
    GameReset,
}

#[derive(Debug, Default)]
pub struct CheckersRoom {
    state: CheckersState,
    roles: HashMap<ConnectionId, Role>,
    red_seat: Option<ConnectionId>,
    white_seat: Option<ConnectionId>,
}

impl CheckersRoom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &CheckersState {
        &self.state
    }

    pub fn role_of(&self, conn: ConnectionId) -> Option<Role> {
        self.roles.get(&conn).copied()
    }

    fn board_update(&self) -> CheckersEvent {
        CheckersEvent::UpdateBoard {
            board: self.state.board.to_vec(),
            turn: self.state.turn,
        }
    }

    fn role(&self, conn: ConnectionId) -> Role {
        self.role_of(conn).unwrap_or(Role::Spectator)
    }

    fn select(&mut self, conn: ConnectionId, cell: usize, ctx: &mut Ctx<Self>) {
        if self.state.can_select(self.role(conn), cell) {
            ctx.emit_to(conn, CheckersEvent::PieceSelected(cell));
        } else {
            debug!(%conn, cell, "checkers selection ignored");
        }
    }

    fn make_move(&mut self, conn: ConnectionId, req: MoveRequest, ctx: &mut Ctx<Self>) {
        let role = self.role(conn);

        match self.state.apply_move(role, req.from, req.to) {
            Ok(MoveOutcome::Selected(cell)) => ctx.emit_to(conn, CheckersEvent::PieceSelected(cell)),
            Ok(MoveOutcome::Moved {
                captured, winner, ..
            }) => {
                if let Some(cell) = captured {
                    debug!(%conn, cell, "checkers capture");
                }
                ctx.broadcast(self.board_update());

                if let Some(winner) = winner {
                    info!(?winner, "checkers won");
                    ctx.broadcast(CheckersEvent::GameOver { winner });
                    self.reset(ctx);
                }
            }
            Err(e) => debug!(%conn, "checkers move rejected: {e}"),
        }
    }

    /// Opening position, red to move. Seats are kept.
    pub fn reset(&mut self, ctx: &mut Ctx<Self>) {
        self.state = CheckersState::new();
        ctx.broadcast(CheckersEvent::GameReset);
        ctx.broadcast(self.board_update());
    }
}

impl RoomGame for CheckersRoom {
    type Input = CheckersInput;
    type Event = CheckersEvent;
    type Timer = ();

    fn metadata(&self) -> GameMetadata {
        GameMetadata {
            name: "Checkers",
            description: "Simplified checkers: single jumps, kings on the back row",
            min_players: 2,
            max_players: Some(2),
        }
    }

    fn parse_input(frame: &Frame) -> Option<Self::Input> {
        match frame.event.as_str() {
            "selectPiece" => frame.data_as::<usize>().map(CheckersInput::SelectPiece),
            "makeMove" => frame.data_as::<MoveRequest>().map(CheckersInput::MakeMove),
            "resetGame" => Some(CheckersInput::ResetGame),
            _ => None,
        }
    }

    fn on_connect(&mut self, conn: ConnectionId, ctx: &mut Ctx<Self>) {
        let role = if self.red_seat.is_none() {
            self.red_seat = Some(conn);
            Role::Red
        } else if self.white_seat.is_none() {
            self.white_seat = Some(conn);
            Role::White
        } else {
            Role::Spectator
        };
        self.roles.insert(conn, role);
        debug!(%conn, ?role, "checkers role assigned");

        ctx.emit_to(conn, CheckersEvent::AssignRole(role));
        ctx.emit_to(conn, self.board_update());
    }

    fn handle_input(&mut self, conn: ConnectionId, input: Self::Input, ctx: &mut Ctx<Self>) {
        match input {
            CheckersInput::SelectPiece(cell) => self.select(conn, cell, ctx),
            CheckersInput::MakeMove(req) => self.make_move(conn, req, ctx),
            CheckersInput::ResetGame => self.reset(ctx),
        }
    }

    fn on_disconnect(&mut self, conn: ConnectionId, _ctx: &mut Ctx<Self>) {
        self.roles.remove(&conn);
        if self.red_seat == Some(conn) {
            self.red_seat = None;
        }
        if self.white_seat == Some(conn) {
            self.white_seat = None;
        }
    }
}
