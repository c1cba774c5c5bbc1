/// Score-echo rooms for the arcade games
pub mod game;

pub use game::{LeaderboardEvent, LeaderboardInput, LeaderboardRoom, ScoreKind, ScoreMap, ScorePolicy, ScoreRejection};
