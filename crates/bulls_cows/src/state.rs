//! Game state machine.

use serde::{Deserialize, Serialize};

use crate::evaluator::Score;

/// Guesses allowed per game.
pub const MAX_ATTEMPTS: u32 = 10;

/// Lifecycle of one game. `Won` and `Lost` are terminal.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GameState {
    /// Still accepting guesses.
    Active,
    /// The secret was matched.
    Won,
    /// The attempt budget ran out.
    Lost,
}

impl GameState {
    /// True for `Won` and `Lost`.
    pub fn is_finished(self) -> bool {
        !matches!(self, Self::Active)
    }

    /// State after an accepted guess, given its score and the attempt count
    /// including that guess.
    ///
    /// Terminal states never change.
    pub fn after_guess(self, score: Score, attempts: u32) -> Self {
        match self {
            Self::Active if score.is_exact() => Self::Won,
            Self::Active if attempts >= MAX_ATTEMPTS => Self::Lost,
            other => other,
        }
    }
}
