use serde::Serialize;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::RaceTiming;
use crate::core::connection::ConnectionId;
use crate::core::game::{Ctx, Frame, GameMetadata, RoomGame};
use crate::games::race::rules::{plan_move, Dice, JumpKind, RandomDice, FINISH_POS, START_POS};

/// Seat colours, handed out in join order and wrapping around
pub const COLORS: [&str; 6] = ["#ff3838", "#ff9f43", "#f368e0", "#0abde3", "#10ac84", "#5f27cd"];

pub const MIN_PLAYERS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RacePlayer {
    pub id: ConnectionId,
    pub name: String,
    pub color: &'static str,
    pub pos: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RaceInput {
    JoinGame(Option<String>),
    StartGame,
    RollDice,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum RaceEvent {
    LoginSuccess,
    #[serde(rename_all = "camelCase")]
    LobbyUpdate {
        players: Vec<RacePlayer>,
        host_id: Option<ConnectionId>,
    },
    GameStarted,
    #[serde(rename_all = "camelCase")]
    UpdateState {
        players: Vec<RacePlayer>,
        current_turn: Option<ConnectionId>,
        moving_player_id: Option<ConnectionId>,
    },
    #[serde(rename_all = "camelCase")]
    AnimateTurn {
        player_id: ConnectionId,
        dice: u8,
        start_pos: u32,
        mid_pos: u32,
        final_pos: u32,
        jump_type: Option<JumpKind>,
        msg: String,
    },
    GameOver {
        winner: String,
    },
    GameReset,
    Notification(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaceTimer {
    /// Apply the announced move with this sequence number
    Commit { seq: u64 },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RaceRejection {
    #[error("game already started")]
    AlreadyStarted,
    #[error("connection already has a seat")]
    AlreadyJoined,
    #[error("need at least two players")]
    NotEnoughPlayers,
    #[error("only the host can start the game")]
    NotHost,
    #[error("game has not started")]
    NotStarted,
    #[error("not this player's turn")]
    NotYourTurn,
    #[error("previous move is still being committed")]
    MoveInFlight,
}

/// A move that has been announced but not yet applied
#[derive(Debug)]
struct PendingCommit {
    seq: u64,
    player: ConnectionId,
    end: u32,
    token: CancellationToken,
}

/// Ladders & chutes room: ordered seats, host-started, one roll per turn
pub struct RaceRoom {
    players: Vec<RacePlayer>,
    started: bool,
    turn_index: usize,
    pending: Option<PendingCommit>,
    next_seq: u64,
    dice: Box<dyn Dice>,
    timing: RaceTiming,
}

impl RaceRoom {
    pub fn new(timing: RaceTiming) -> Self {
        Self::with_dice(timing, RandomDice::new())
    }

    pub fn with_dice(timing: RaceTiming, dice: impl Dice) -> Self {
        Self {
            players: Vec::new(),
            started: false,
            turn_index: 0,
            pending: None,
            next_seq: 0,
            dice: Box::new(dice),
            timing,
        }
    }

    pub fn players(&self) -> &[RacePlayer] {
        &self.players
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn has_pending_commit(&self) -> bool {
        self.pending.is_some()
    }

    /// First joined player
    pub fn host_id(&self) -> Option<ConnectionId> {
        self.players.first().map(|p| p.id)
    }

    /// Seat whose turn it is. The index is read modulo the current seat count,
    /// so a departure can shift the turn onto someone else.
    pub fn current_player(&self) -> Option<&RacePlayer> {
        if self.players.is_empty() {
            return None;
        }
        self.players.get(self.turn_index % self.players.len())
    }

    fn lobby_update(&self) -> RaceEvent {
        RaceEvent::LobbyUpdate {
            players: self.players.clone(),
            host_id: self.host_id(),
        }
    }

    fn state_update(&self, moving: Option<ConnectionId>) -> RaceEvent {
        RaceEvent::UpdateState {
            players: self.players.clone(),
            current_turn: self.current_player().map(|p| p.id),
            moving_player_id: moving,
        }
    }

    pub fn join(
        &mut self,
        conn: ConnectionId,
        name: Option<String>,
        ctx: &mut Ctx<Self>,
    ) -> Result<(), RaceRejection> {
        if self.started {
            ctx.emit_to(conn, RaceEvent::Notification("Game already started!".to_string()));
            return Err(RaceRejection::AlreadyStarted);
        }
        if self.players.iter().any(|p| p.id == conn) {
            return Err(RaceRejection::AlreadyJoined);
        }

        let seat = self.players.len();
        let name = name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| format!("Player {}", seat + 1));

        info!(%conn, %name, "race player joined");
        self.players.push(RacePlayer {
            id: conn,
            name,
            color: COLORS[seat % COLORS.len()],
            pos: START_POS,
        });

        ctx.emit_to(conn, RaceEvent::LoginSuccess);
        ctx.broadcast(self.lobby_update());
        Ok(())
    }

    pub fn start(&mut self, conn: ConnectionId, ctx: &mut Ctx<Self>) -> Result<(), RaceRejection> {
        if self.started {
            return Err(RaceRejection::AlreadyStarted);
        }
        if self.players.len() < MIN_PLAYERS {
            return Err(RaceRejection::NotEnoughPlayers);
        }
        if self.host_id() != Some(conn) {
            return Err(RaceRejection::NotHost);
        }

        self.started = true;
        self.turn_index = 0;
        info!(players = self.players.len(), "race started");

        ctx.broadcast(RaceEvent::GameStarted);
        ctx.broadcast(self.state_update(None));
        Ok(())
    }

    /// Roll for the current player and announce the move. The position change
    /// and turn advance land later, in [`commit`](Self::commit).
    pub fn roll(&mut self, conn: ConnectionId, ctx: &mut Ctx<Self>) -> Result<(), RaceRejection> {
        if !self.started {
            return Err(RaceRejection::NotStarted);
        }
        if self.pending.is_some() {
            return Err(RaceRejection::MoveInFlight);
        }
        let (start, name) = match self.current_player() {
            Some(p) if p.id == conn => (p.pos, p.name.clone()),
            _ => return Err(RaceRejection::NotYourTurn),
        };

        let dice = self.dice.roll();
        let plan = plan_move(start, dice);

        let mut msg = format!("{name} rolled {dice}");
        match plan.jump {
            Some(JumpKind::Ladder) => msg.push_str(" (ladder!)"),
            Some(JumpKind::Chute) => msg.push_str(" (chute!)"),
            None => {}
        }

        ctx.broadcast(RaceEvent::AnimateTurn {
            player_id: conn,
            dice,
            start_pos: plan.start,
            mid_pos: plan.mid,
            final_pos: plan.end,
            jump_type: plan.jump,
            msg,
        });

        let delay = if plan.jump.is_some() {
            self.timing.jump_delay
        } else {
            self.timing.step_delay
        };
        let seq = self.next_seq;
        self.next_seq += 1;
        let token = ctx.schedule(delay, RaceTimer::Commit { seq });

        self.pending = Some(PendingCommit {
            seq,
            player: conn,
            end: plan.end,
            token,
        });
        Ok(())
    }

    /// Apply the move announced under `seq`
    pub fn commit(&mut self, seq: u64, ctx: &mut Ctx<Self>) {
        if !matches!(&self.pending, Some(p) if p.seq == seq) {
            debug!(seq, "stale race commit ignored");
            return;
        }
        let Some(pending) = self.pending.take() else {
            return;
        };

        let Some(player) = self.players.iter_mut().find(|p| p.id == pending.player) else {
            return;
        };
        player.pos = pending.end;

        if pending.end == FINISH_POS {
            let winner = player.name.clone();
            info!(%winner, "race won");
            ctx.broadcast(RaceEvent::GameOver { winner });
            self.reset(ctx);
            return;
        }

        self.turn_index = (self.turn_index + 1) % self.players.len();
        ctx.broadcast(self.state_update(Some(pending.player)));
    }

    /// Back to the lobby: seats are kept, positions and turn order start over
    pub fn reset(&mut self, ctx: &mut Ctx<Self>) {
        self.cancel_pending();
        self.started = false;
        self.turn_index = 0;
        for player in &mut self.players {
            player.pos = START_POS;
        }

        ctx.broadcast(RaceEvent::GameReset);
        if !self.players.is_empty() {
            ctx.broadcast(self.lobby_update());
        }
    }

    fn cancel_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.token.cancel();
            debug!(seq = pending.seq, "pending race commit cancelled");
        }
    }
}

impl RoomGame for RaceRoom {
    type Input = RaceInput;
    type Event = RaceEvent;
    type Timer = RaceTimer;

    fn metadata(&self) -> GameMetadata {
        GameMetadata {
            name: "Ladders & Chutes",
            description: "Race to square 100; ladders lift you, chutes drop you",
            min_players: MIN_PLAYERS,
            max_players: None,
        }
    }

    fn parse_input(frame: &Frame) -> Option<Self::Input> {
        match frame.event.as_str() {
            "joinGame" => Some(RaceInput::JoinGame(frame.data_as::<String>())),
            "startGame" => Some(RaceInput::StartGame),
            "rollDice" => Some(RaceInput::RollDice),
            _ => None,
        }
    }

    fn handle_input(&mut self, conn: ConnectionId, input: Self::Input, ctx: &mut Ctx<Self>) {
        let result = match input {
            RaceInput::JoinGame(name) => self.join(conn, name, ctx),
            RaceInput::StartGame => self.start(conn, ctx),
            RaceInput::RollDice => self.roll(conn, ctx),
        };
        if let Err(e) = result {
            debug!(%conn, "race input rejected: {e}");
        }
    }

    fn on_disconnect(&mut self, conn: ConnectionId, ctx: &mut Ctx<Self>) {
        let Some(seat) = self.players.iter().position(|p| p.id == conn) else {
            return;
        };
        self.players.remove(seat);

        // seats shifted, so an announced move no longer matches the turn order
        self.cancel_pending();

        if self.players.is_empty() {
            self.reset(ctx);
        } else if !self.started {
            ctx.broadcast(self.lobby_update());
        }
    }

    fn on_timer(&mut self, timer: Self::Timer, ctx: &mut Ctx<Self>) {
        match timer {
            RaceTimer::Commit { seq } => self.commit(seq, ctx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::context::Target;
    use crate::games::race::rules::ScriptedDice;
    use pretty_assertions::assert_eq;

    fn room(rolls: impl IntoIterator<Item = u8>) -> RaceRoom {
        RaceRoom::with_dice(RaceTiming::default(), ScriptedDice::new(rolls))
    }

    fn seat_two(room: &mut RaceRoom) -> (ConnectionId, ConnectionId) {
        let ann = ConnectionId::new();
        let bo = ConnectionId::new();
        let mut ctx = Ctx::<RaceRoom>::new();
        room.join(ann, Some("Ann".into()), &mut ctx).unwrap();
        room.join(bo, Some("Bo".into()), &mut ctx).unwrap();
        (ann, bo)
    }

    /// Roll and immediately fire the scheduled commit
    fn roll_and_commit(room: &mut RaceRoom, conn: ConnectionId) -> Ctx<RaceRoom> {
        let mut ctx = Ctx::<RaceRoom>::new();
        room.roll(conn, &mut ctx).unwrap();
        let (_, scheduled) = ctx.into_parts();
        let mut ctx = Ctx::<RaceRoom>::new();
        for s in scheduled {
            room.on_timer(s.timer, &mut ctx);
        }
        ctx
    }

    #[test]
    fn join_assigns_colors_and_host() {
        let mut room = room([]);
        let (ann, bo) = seat_two(&mut room);

        assert_eq!(room.host_id(), Some(ann));
        assert_eq!(room.players()[0].color, COLORS[0]);
        assert_eq!(room.players()[1].color, COLORS[1]);
        assert_eq!(room.players()[1].id, bo);
        assert!(room.players().iter().all(|p| p.pos == START_POS));
    }

    #[test]
    fn colors_wrap_around_palette() {
        let mut room = room([]);
        let mut ctx = Ctx::<RaceRoom>::new();
        for _ in 0..7 {
            room.join(ConnectionId::new(), None, &mut ctx).unwrap();
        }
        assert_eq!(room.players()[6].color, COLORS[0]);
        assert_eq!(room.players()[6].name, "Player 7");
    }

    #[test]
    fn join_emits_login_and_lobby() {
        let mut room = room([]);
        let ann = ConnectionId::new();
        let mut ctx = Ctx::<RaceRoom>::new();
        room.join(ann, Some("Ann".into()), &mut ctx).unwrap();

        let events = ctx.events();
        assert_eq!(events[0], (Target::Conn(ann), RaceEvent::LoginSuccess));
        assert!(matches!(
            &events[1],
            (Target::All, RaceEvent::LobbyUpdate { host_id: Some(h), players }) if *h == ann && players.len() == 1
        ));
    }

    #[test]
    fn join_after_start_is_refused_with_notification() {
        let mut room = room([]);
        let (ann, _) = seat_two(&mut room);
        room.start(ann, &mut Ctx::<RaceRoom>::new()).unwrap();

        let late = ConnectionId::new();
        let mut ctx = Ctx::<RaceRoom>::new();
        assert_eq!(
            room.join(late, Some("Cy".into()), &mut ctx),
            Err(RaceRejection::AlreadyStarted)
        );
        assert!(matches!(
            ctx.events(),
            [(Target::Conn(c), RaceEvent::Notification(_))] if *c == late
        ));
        assert_eq!(room.players().len(), 2);
    }

    #[test]
    fn only_host_with_two_players_can_start() {
        let mut room = room([]);
        let ann = ConnectionId::new();
        let mut ctx = Ctx::<RaceRoom>::new();
        room.join(ann, None, &mut ctx).unwrap();
        assert_eq!(room.start(ann, &mut ctx), Err(RaceRejection::NotEnoughPlayers));

        let bo = ConnectionId::new();
        room.join(bo, None, &mut ctx).unwrap();
        assert_eq!(room.start(bo, &mut ctx), Err(RaceRejection::NotHost));

        let mut ctx = Ctx::<RaceRoom>::new();
        room.start(ann, &mut ctx).unwrap();
        assert!(room.is_started());
        assert_eq!(ctx.events()[0].1, RaceEvent::GameStarted);
        assert!(matches!(
            &ctx.events()[1].1,
            RaceEvent::UpdateState { current_turn: Some(t), moving_player_id: None, .. } if *t == ann
        ));
    }

    #[test]
    fn roll_is_rejected_out_of_turn_and_before_start() {
        let mut room = room([3]);
        let (ann, bo) = seat_two(&mut room);
        let mut ctx = Ctx::<RaceRoom>::new();

        assert_eq!(room.roll(ann, &mut ctx), Err(RaceRejection::NotStarted));
        room.start(ann, &mut ctx).unwrap();
        let mut ctx = Ctx::<RaceRoom>::new();
        assert_eq!(room.roll(bo, &mut ctx), Err(RaceRejection::NotYourTurn));
        assert!(ctx.is_empty());
    }

    #[test]
    fn ladder_on_eight_reports_twelve_then_passes_turn() {
        // Ann 1 -> 4, Bo 1 -> 3, Ann 4 -> 8 (ladder to 12)
        let mut room = room([3, 2, 4]);
        let (ann, bo) = seat_two(&mut room);
        room.start(ann, &mut Ctx::<RaceRoom>::new()).unwrap();
        roll_and_commit(&mut room, ann);
        roll_and_commit(&mut room, bo);

        let mut ctx = Ctx::<RaceRoom>::new();
        room.roll(ann, &mut ctx).unwrap();
        assert_eq!(
            ctx.events()[0].1,
            RaceEvent::AnimateTurn {
                player_id: ann,
                dice: 4,
                start_pos: 4,
                mid_pos: 8,
                final_pos: 12,
                jump_type: Some(JumpKind::Ladder),
                msg: "Ann rolled 4 (ladder!)".to_string(),
            }
        );
        let scheduled = ctx.scheduled();
        assert_eq!(scheduled.len(), 1);
        assert_eq!(scheduled[0].delay, RaceTiming::default().jump_delay);

        // position and turn don't move until the commit fires
        assert_eq!(room.players()[0].pos, 4);
        assert_eq!(room.current_player().unwrap().id, ann);

        let (_, scheduled) = ctx.into_parts();
        let mut ctx = Ctx::<RaceRoom>::new();
        room.on_timer(scheduled.into_iter().next().unwrap().timer, &mut ctx);

        assert_eq!(room.players()[0].pos, 12);
        assert_eq!(room.current_player().unwrap().id, bo);
        assert!(matches!(
            &ctx.events()[0].1,
            RaceEvent::UpdateState { current_turn: Some(t), moving_player_id: Some(m), .. } if *t == bo && *m == ann
        ));
    }

    #[test]
    fn plain_move_uses_step_delay() {
        let mut room = room([3]);
        let (ann, _) = seat_two(&mut room);
        room.start(ann, &mut Ctx::<RaceRoom>::new()).unwrap();

        let mut ctx = Ctx::<RaceRoom>::new();
        room.roll(ann, &mut ctx).unwrap();
        assert_eq!(ctx.scheduled()[0].delay, RaceTiming::default().step_delay);
    }

    #[test]
    fn second_roll_while_pending_is_rejected() {
        let mut room = room([3, 3]);
        let (ann, _) = seat_two(&mut room);
        room.start(ann, &mut Ctx::<RaceRoom>::new()).unwrap();

        let mut ctx = Ctx::<RaceRoom>::new();
        room.roll(ann, &mut ctx).unwrap();
        assert_eq!(room.roll(ann, &mut ctx), Err(RaceRejection::MoveInFlight));
    }

    #[test]
    fn reaching_finish_announces_winner_and_resets() {
        let mut room = room([6]);
        let (ann, bo) = seat_two(&mut room);
        room.start(ann, &mut Ctx::<RaceRoom>::new()).unwrap();
        room.players[0].pos = 95;

        let ctx = roll_and_commit(&mut room, ann);
        let events: Vec<_> = ctx.events().iter().map(|(_, e)| e.clone()).collect();
        assert_eq!(events[0], RaceEvent::GameOver { winner: "Ann".to_string() });
        assert_eq!(events[1], RaceEvent::GameReset);

        assert!(!room.is_started());
        assert!(room.players().iter().all(|p| p.pos == START_POS));
        assert_eq!(room.current_player().unwrap().id, ann);
        assert!(room.players().iter().any(|p| p.id == bo));
    }

    #[test]
    fn mover_disconnect_cancels_pending_commit() {
        let mut room = room([3]);
        let (ann, bo) = seat_two(&mut room);
        room.start(ann, &mut Ctx::<RaceRoom>::new()).unwrap();

        let mut ctx = Ctx::<RaceRoom>::new();
        room.roll(ann, &mut ctx).unwrap();
        let (_, scheduled) = ctx.into_parts();
        let scheduled = scheduled.into_iter().next().unwrap();

        room.on_disconnect(ann, &mut Ctx::<RaceRoom>::new());
        assert!(scheduled.token.is_cancelled());
        assert!(!room.has_pending_commit());

        // a commit that slipped through anyway is ignored
        let mut ctx = Ctx::<RaceRoom>::new();
        room.on_timer(scheduled.timer, &mut ctx);
        assert!(ctx.is_empty());
        assert_eq!(room.players().len(), 1);
        assert_eq!(room.players()[0].id, bo);
    }

    #[test]
    fn bystander_disconnect_cancels_pending_commit() {
        let mut room = room([3]);
        let mut ctx = Ctx::<RaceRoom>::new();
        let ids: Vec<_> = (0..3).map(|_| ConnectionId::new()).collect();
        for id in &ids {
            room.join(*id, None, &mut ctx).unwrap();
        }
        room.start(ids[0], &mut ctx).unwrap();
        room.turn_index = 1;

        let mut ctx = Ctx::<RaceRoom>::new();
        room.roll(ids[1], &mut ctx).unwrap();
        let (_, scheduled) = ctx.into_parts();
        let scheduled = scheduled.into_iter().next().unwrap();

        room.on_disconnect(ids[0], &mut Ctx::<RaceRoom>::new());
        assert!(scheduled.token.is_cancelled());
        assert!(!room.has_pending_commit());

        let mut ctx = Ctx::<RaceRoom>::new();
        room.on_timer(scheduled.timer, &mut ctx);
        assert!(ctx.is_empty());
        // the roller does not get to go again, the next seat is up
        assert_eq!(room.current_player().unwrap().id, ids[2]);
        assert!(room.players().iter().all(|p| p.pos == START_POS));
    }

    #[test]
    fn departure_keeps_turn_index_modulo_remaining() {
        let mut room = room([]);
        let mut ctx = Ctx::<RaceRoom>::new();
        let ids: Vec<_> = (0..3).map(|_| ConnectionId::new()).collect();
        for id in &ids {
            room.join(*id, None, &mut ctx).unwrap();
        }
        room.start(ids[0], &mut ctx).unwrap();
        room.turn_index = 2;

        room.on_disconnect(ids[1], &mut Ctx::<RaceRoom>::new());
        // index 2 over two seats wraps to the host
        assert_eq!(room.current_player().unwrap().id, ids[0]);
    }

    #[test]
    fn lobby_departure_broadcasts_and_empty_room_resets() {
        let mut room = room([]);
        let (ann, bo) = seat_two(&mut room);

        let mut ctx = Ctx::<RaceRoom>::new();
        room.on_disconnect(ann, &mut ctx);
        assert!(matches!(
            &ctx.events()[0].1,
            RaceEvent::LobbyUpdate { host_id: Some(h), .. } if *h == bo
        ));

        let mut ctx = Ctx::<RaceRoom>::new();
        room.on_disconnect(bo, &mut ctx);
        assert_eq!(ctx.events()[0].1, RaceEvent::GameReset);
        assert!(room.players().is_empty());
    }

    #[test]
    fn parses_client_frames() {
        let join = Frame::new("joinGame", serde_json::json!("Ann"));
        assert_eq!(RaceRoom::parse_input(&join), Some(RaceInput::JoinGame(Some("Ann".into()))));
        assert_eq!(
            RaceRoom::parse_input(&Frame::bare("joinGame")),
            Some(RaceInput::JoinGame(None))
        );
        assert_eq!(RaceRoom::parse_input(&Frame::bare("rollDice")), Some(RaceInput::RollDice));
        assert_eq!(RaceRoom::parse_input(&Frame::bare("fly")), None);
    }

    #[test]
    fn animate_turn_serializes_camel_case() {
        let id = ConnectionId::new();
        let event = RaceEvent::AnimateTurn {
            player_id: id,
            dice: 1,
            start_pos: 1,
            mid_pos: 2,
            final_pos: 23,
            jump_type: Some(JumpKind::Ladder),
            msg: "x".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "animateTurn");
        assert_eq!(json["data"]["finalPos"], 23);
        assert_eq!(json["data"]["jumpType"], "ladder");
        assert_eq!(json["data"]["playerId"], id.to_string());
    }
}
