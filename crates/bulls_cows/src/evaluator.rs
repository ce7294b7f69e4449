//! Scoring a guess against a secret.

use serde::{Deserialize, Serialize};

use crate::digits::{CODE_LEN, Digits};

/// Result of one guess: `A` exact hits and `B` misplaced hits.
///
/// Serializes as `{"A": a, "B": b}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Score {
    #[serde(rename = "A")]
    a: u8,
    #[serde(rename = "B")]
    b: u8,
}

impl Score {
    /// Digits right in value and position.
    pub fn a(&self) -> u8 {
        self.a
    }

    /// Digits right in value but at another position.
    pub fn b(&self) -> u8 {
        self.b
    }

    /// True when every position matched.
    pub fn is_exact(&self) -> bool {
        usize::from(self.a) == CODE_LEN
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}A{}B", self.a, self.b)
    }
}

/// Scores `guess` against `secret`.
///
/// `B` is the size of the multiset intersection minus `A`, so the result stays
/// within `A + B <= 4` even for unvalidated input with repeated digits. Values
/// above 9 never count toward `B`.
pub fn evaluate(secret: &Digits, guess: &Digits) -> Score {
    let a = secret
        .iter()
        .zip(guess.iter())
        .filter(|(s, g)| s == g)
        .count();

    let mut remaining = [0u8; 10];
    for &d in secret {
        if let Some(n) = remaining.get_mut(usize::from(d)) {
            *n += 1;
        }
    }
    let mut common: usize = 0;
    for &d in guess {
        match remaining.get_mut(usize::from(d)) {
            Some(n) if *n > 0 => {
                *n -= 1;
                common += 1;
            }
            _ => {}
        }
    }

    Score {
        a: a as u8,
        b: common.saturating_sub(a) as u8,
    }
}
