pub mod checkers;
pub mod hangman;
pub mod leaderboard;
pub mod race;
pub mod tictactoe;

use tracing::debug;

use crate::config::Config;
use crate::core::game::{GameMetadata, RoomGame};
use crate::core::registry::RoomDirectory;

use self::checkers::CheckersRoom;
use self::hangman::HangmanRoom;
use self::leaderboard::{LeaderboardRoom, ScoreKind};
use self::race::RaceRoom;
use self::tictactoe::TicTacToeRoom;

/// Spawn one room per game and publish it under its namespace.
/// Add new games here.
pub fn create_default_directory(config: &Config) -> RoomDirectory {
    let mut directory = RoomDirectory::new();

    directory.register("race", RaceRoom::new(config.race));
    directory.register("tictactoe", TicTacToeRoom::new());
    directory.register("checkers", CheckersRoom::new());
    directory.register("hangman", HangmanRoom::new());
    for kind in ScoreKind::ALL {
        directory.register(kind.namespace(), LeaderboardRoom::new(kind));
    }

    debug!(rooms = directory.len(), "room directory ready");
    directory
}

/// Namespaces and metadata of every room, without starting any of them
pub fn room_catalog(config: &Config) -> Vec<(&'static str, GameMetadata)> {
    let mut rooms = vec![
        ("race", RaceRoom::new(config.race).metadata()),
        ("tictactoe", TicTacToeRoom::new().metadata()),
        ("checkers", CheckersRoom::new().metadata()),
        ("hangman", HangmanRoom::new().metadata()),
    ];
    rooms.extend(
        ScoreKind::ALL
            .into_iter()
            .map(|kind| (kind.namespace(), LeaderboardRoom::new(kind).metadata())),
    );
    rooms.sort_by_key(|(namespace, _)| *namespace);
    rooms
}
