use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::core::connection::ConnectionId;
use crate::core::game::{Ctx, Frame, GameMetadata, RoomGame};

pub type ScoreMap = BTreeMap<ConnectionId, f64>;

/// How a reported value is folded into the stored one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScorePolicy {
    /// Overwrite with whatever was reported
    Latest,
    /// Keep the best value ever reported
    Highest,
}

/// The arcade games that only track a number per connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreKind {
    Clicker,
    Typing,
    Game2048,
    Breakout,
    Ragdoll,
}

impl ScoreKind {
    pub const ALL: [ScoreKind; 5] = [
        ScoreKind::Clicker,
        ScoreKind::Typing,
        ScoreKind::Game2048,
        ScoreKind::Breakout,
        ScoreKind::Ragdoll,
    ];

    pub fn namespace(self) -> &'static str {
        match self {
            ScoreKind::Clicker => "clicker",
            ScoreKind::Typing => "typing",
            ScoreKind::Game2048 => "2048",
            ScoreKind::Breakout => "breakout",
            ScoreKind::Ragdoll => "ragdoll",
        }
    }

    pub fn policy(self) -> ScorePolicy {
        match self {
            ScoreKind::Clicker | ScoreKind::Typing => ScorePolicy::Latest,
            ScoreKind::Game2048 | ScoreKind::Breakout | ScoreKind::Ragdoll => ScorePolicy::Highest,
        }
    }

    fn accepts(self, input: &LeaderboardInput) -> bool {
        matches!(
            (self, input),
            (ScoreKind::Clicker, LeaderboardInput::Click)
                | (ScoreKind::Typing | ScoreKind::Game2048 | ScoreKind::Breakout, LeaderboardInput::Score(_))
                | (ScoreKind::Ragdoll, LeaderboardInput::Level(_))
        )
    }

    fn announce(self, scores: &ScoreMap) -> LeaderboardEvent {
        match self {
            ScoreKind::Clicker => LeaderboardEvent::Update(scores.clone()),
            _ => LeaderboardEvent::UpdateLeaderboard(scores.clone()),
        }
    }

    fn metadata(self) -> GameMetadata {
        let (name, description) = match self {
            ScoreKind::Clicker => ("Clicker", "Click as fast as you can"),
            ScoreKind::Typing => ("Typing", "Typing speed leaderboard"),
            ScoreKind::Game2048 => ("2048", "Best 2048 score per player"),
            ScoreKind::Breakout => ("Breakout", "Best breakout score per player"),
            ScoreKind::Ragdoll => ("Ragdoll", "Highest level reached per player"),
        };
        GameMetadata {
            name,
            description,
            min_players: 1,
            max_players: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LeaderboardInput {
    Click,
    Score(f64),
    Level(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum LeaderboardEvent {
    Update(ScoreMap),
    UpdateLeaderboard(ScoreMap),
}

#[derive(Debug, Error, PartialEq)]
pub enum ScoreRejection {
    #[error("{0} is not a valid score")]
    Invalid(f64),
    #[error("{reported} does not beat {best}")]
    NotHigher { reported: f64, best: f64 },
    #[error("input not used by this game")]
    WrongInput,
}

/// Per-connection score table with no turns and no rules beyond the policy
#[derive(Debug)]
pub struct LeaderboardRoom {
    kind: ScoreKind,
    scores: ScoreMap,
}

impl LeaderboardRoom {
    pub fn new(kind: ScoreKind) -> Self {
        Self {
            kind,
            scores: ScoreMap::new(),
        }
    }

    pub fn kind(&self) -> ScoreKind {
        self.kind
    }

    pub fn scores(&self) -> &ScoreMap {
        &self.scores
    }

    /// Fold one report into the table. `Ok` means the table changed.
    pub fn record(&mut self, conn: ConnectionId, input: LeaderboardInput) -> Result<f64, ScoreRejection> {
        if !self.kind.accepts(&input) {
            return Err(ScoreRejection::WrongInput);
        }
        let value = match input {
            LeaderboardInput::Click => self.scores.get(&conn).copied().unwrap_or(0.0) + 1.0,
            LeaderboardInput::Score(v) | LeaderboardInput::Level(v) => v,
        };
        if !value.is_finite() || value < 0.0 {
            return Err(ScoreRejection::Invalid(value));
        }

        if self.kind.policy() == ScorePolicy::Highest {
            if let Some(&best) = self.scores.get(&conn) {
                if value <= best {
                    return Err(ScoreRejection::NotHigher { reported: value, best });
                }
            }
        }
        self.scores.insert(conn, value);
        Ok(value)
    }
}

impl RoomGame for LeaderboardRoom {
    type Input = LeaderboardInput;
    type Event = LeaderboardEvent;
    type Timer = ();

    fn metadata(&self) -> GameMetadata {
        self.kind.metadata()
    }

    fn parse_input(frame: &Frame) -> Option<Self::Input> {
        match frame.event.as_str() {
            "click" => Some(LeaderboardInput::Click),
            "updateScore" => frame.data_as::<f64>().map(LeaderboardInput::Score),
            "updateLevel" => frame.data_as::<f64>().map(LeaderboardInput::Level),
            _ => None,
        }
    }

    fn on_connect(&mut self, conn: ConnectionId, ctx: &mut Ctx<Self>) {
        ctx.emit_to(conn, self.kind.announce(&self.scores));
    }

    fn handle_input(&mut self, conn: ConnectionId, input: Self::Input, ctx: &mut Ctx<Self>) {
        match self.record(conn, input) {
            Ok(_) => ctx.broadcast(self.kind.announce(&self.scores)),
            Err(e) => debug!(%conn, game = self.kind.namespace(), "score ignored: {e}"),
        }
    }

    fn on_disconnect(&mut self, conn: ConnectionId, ctx: &mut Ctx<Self>) {
        if self.scores.remove(&conn).is_some() {
            ctx.broadcast(self.kind.announce(&self.scores));
        }
    }
}
