//! Ladders & chutes movement rules. Pure functions, no room state.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

pub const START_POS: u32 = 1;
pub const FINISH_POS: u32 = 100;

/// Position remaps: destination above the key is a ladder, below is a chute.
pub const JUMPS: &[(u32, u32)] = &[
    // ladders
    (2, 23),
    (8, 12),
    (17, 93),
    (29, 54),
    (32, 51),
    (39, 80),
    (70, 89),
    (75, 96),
    // chutes
    (99, 4),
    (92, 76),
    (85, 6),
    (73, 15),
    (61, 18),
    (55, 24),
    (42, 10),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JumpKind {
    Ladder,
    Chute,
}

/// Everything a roll decides, announced before it is committed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovePlan {
    pub dice: u8,
    pub start: u32,
    pub mid: u32,
    pub end: u32,
    pub jump: Option<JumpKind>,
}

impl MovePlan {
    pub fn is_win(&self) -> bool {
        self.end == FINISH_POS
    }
}

pub fn jump_destination(pos: u32) -> Option<u32> {
    JUMPS
        .iter()
        .find(|(key, _)| *key == pos)
        .map(|(_, dest)| *dest)
}

/// Resolve a roll from `start`. Overshooting the finish clamps to it.
pub fn plan_move(start: u32, dice: u8) -> MovePlan {
    let mid = start + u32::from(dice);

    if mid >= FINISH_POS {
        return MovePlan {
            dice,
            start,
            mid: FINISH_POS,
            end: FINISH_POS,
            jump: None,
        };
    }

    let (end, jump) = match jump_destination(mid) {
        Some(dest) if dest > mid => (dest, Some(JumpKind::Ladder)),
        Some(dest) => (dest, Some(JumpKind::Chute)),
        None => (mid, None),
    };

    MovePlan {
        dice,
        start,
        mid,
        end,
        jump,
    }
}

/// Source of die rolls. Always server-side; clients never supply a value.
pub trait Dice: Send + 'static {
    /// Uniform in 1..=6
    fn roll(&mut self) -> u8;
}

/// OS-seeded uniform dice
pub struct RandomDice {
    rng: StdRng,
}

impl RandomDice {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }
}

impl Default for RandomDice {
    fn default() -> Self {
        Self::new()
    }
}

impl Dice for RandomDice {
    fn roll(&mut self) -> u8 {
        self.rng.random_range(1..=6)
    }
}

/// Replays a fixed sequence of rolls, then keeps returning 1
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    rolls: VecDeque<u8>,
}

impl ScriptedDice {
    pub fn new(rolls: impl IntoIterator<Item = u8>) -> Self {
        Self {
            rolls: rolls.into_iter().collect(),
        }
    }
}

impl Dice for ScriptedDice {
    fn roll(&mut self) -> u8 {
        self.rolls.pop_front().unwrap_or(1)
    }
}
