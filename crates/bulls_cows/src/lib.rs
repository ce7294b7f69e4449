//! Pure game logic for 1A2B, the four-digit "bulls and cows" guessing game.
//!
//! A hidden [`Secret`] of four distinct digits is guessed one [`Guess`] at a
//! time. Every guess is answered with a [`Score`]: `A` digits are right and in
//! the right place, `B` digits are right but misplaced.
//!
//! # Example
//!
//! ```
//! use bulls_cows::{Guess, Secret, evaluate};
//!
//! let secret: Secret = "1234".parse().unwrap();
//! let guess: Guess = "1243".parse().unwrap();
//! let score = evaluate(secret.digits(), guess.digits());
//! assert_eq!((score.a(), score.b()), (2, 2));
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod digits;
mod evaluator;
mod generator;
mod state;

pub use digits::{CODE_LEN, Digits, Guess, GuessError, Secret};
pub use evaluator::{Score, evaluate};
pub use generator::{RandomSecrets, SecretSource, generate};
pub use state::{GameState, MAX_ATTEMPTS};
