use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, info};

use crate::core::connection::ConnectionId;
use crate::core::game::{Ctx, Frame, GameMetadata, RoomGame};
use crate::games::hangman::session::{HangmanSession, Status};
use crate::games::hangman::words;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HangmanInput {
    Guess(char),
    NewGame,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum HangmanEvent {
    #[serde(rename_all = "camelCase")]
    UpdateGame {
        display_word: String,
        wrong_guesses: u8,
        max_lives: u8,
        category: String,
        is_game_over: bool,
        win: bool,
        /// Only revealed once the game is over
        #[serde(skip_serializing_if = "Option::is_none")]
        full_word: Option<String>,
    },
    GuessResult { letter: char, correct: bool },
}

impl From<&HangmanSession> for HangmanEvent {
    fn from(session: &HangmanSession) -> Self {
        HangmanEvent::UpdateGame {
            display_word: session.display_word(),
            wrong_guesses: session.wrong_guesses(),
            max_lives: session.max_lives(),
            category: session.category().to_string(),
            is_game_over: session.is_over(),
            win: session.status() == Status::Won,
            full_word: session.is_over().then(|| session.secret()),
        }
    }
}

/// Everyone plays their own word; nothing is shared between connections.
pub struct HangmanRoom {
    sessions: HashMap<ConnectionId, HangmanSession>,
    rng: StdRng,
}

impl Default for HangmanRoom {
    fn default() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }
}

impl HangmanRoom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            sessions: HashMap::new(),
            rng,
        }
    }

    pub fn session(&self, conn: ConnectionId) -> Option<&HangmanSession> {
        self.sessions.get(&conn)
    }

    fn deal(&mut self, conn: ConnectionId, ctx: &mut Ctx<Self>) {
        let (word, category) = words::pick(&mut self.rng);
        let session = HangmanSession::new(word, category);
        debug!(%conn, category, "hangman word dealt");
        ctx.emit_to(conn, HangmanEvent::from(&session));
        self.sessions.insert(conn, session);
    }

    fn guess(&mut self, conn: ConnectionId, letter: char, ctx: &mut Ctx<Self>) {
        let Some(session) = self.sessions.get_mut(&conn) else {
            return;
        };
        let Some(correct) = session.guess(letter) else {
            debug!(%conn, %letter, "hangman guess ignored");
            return;
        };

        ctx.emit_to(
            conn,
            HangmanEvent::GuessResult {
                letter: letter.to_ascii_uppercase(),
                correct,
            },
        );
        ctx.emit_to(conn, HangmanEvent::from(&*session));
        if session.is_over() {
            info!(%conn, status = ?session.status(), "hangman finished");
        }
    }
}

impl RoomGame for HangmanRoom {
    type Input = HangmanInput;
    type Event = HangmanEvent;
    type Timer = ();

    fn metadata(&self) -> GameMetadata {
        GameMetadata {
            name: "Hangman",
            description: "Guess the word one letter at a time, six lives",
            min_players: 1,
            max_players: None,
        }
    }

    fn parse_input(frame: &Frame) -> Option<Self::Input> {
        match frame.event.as_str() {
            "guess" => frame
                .data_as::<String>()
                .and_then(|s| s.chars().next())
                .map(HangmanInput::Guess),
            "newGame" => Some(HangmanInput::NewGame),
            _ => None,
        }
    }

    fn on_connect(&mut self, conn: ConnectionId, ctx: &mut Ctx<Self>) {
        self.deal(conn, ctx);
    }

    fn handle_input(&mut self, conn: ConnectionId, input: Self::Input, ctx: &mut Ctx<Self>) {
        match input {
            HangmanInput::Guess(letter) => self.guess(conn, letter, ctx),
            HangmanInput::NewGame => self.deal(conn, ctx),
        }
    }

    fn on_disconnect(&mut self, conn: ConnectionId, _ctx: &mut Ctx<Self>) {
        self.sessions.remove(&conn);
    }
}
