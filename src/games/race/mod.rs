/// Ladders & chutes race room
pub mod game;
pub mod rules;

pub use game::{RaceEvent, RaceInput, RacePlayer, RaceRejection, RaceRoom, RaceTimer};
pub use rules::{Dice, JumpKind, MovePlan, RandomDice, ScriptedDice};
