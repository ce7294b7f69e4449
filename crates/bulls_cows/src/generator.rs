//! Secret generation.

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{instrument, trace};

use crate::digits::{CODE_LEN, Digits, Secret};

/// Draws a secret uniformly from all 5040 ordered picks of four distinct digits.
#[instrument(skip(rng))]
pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Secret {
    let mut pool: [u8; 10] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9];
    let (picked, _) = pool.partial_shuffle(rng, CODE_LEN);
    let mut digits: Digits = [0; CODE_LEN];
    digits.copy_from_slice(picked);
    trace!("Secret drawn");
    Secret::from_valid(digits)
}

/// Anything that can hand out fresh secrets.
///
/// The session store takes one of these so tests can pin the answer.
pub trait SecretSource: Send + Sync {
    /// Returns the secret for a new game.
    fn next_secret(&self) -> Secret;
}

/// Secrets drawn from the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSecrets;

impl SecretSource for RandomSecrets {
    fn next_secret(&self) -> Secret {
        generate(&mut rand::thread_rng())
    }
}

impl<F> SecretSource for F
where
    F: Fn() -> Secret + Send + Sync,
{
    fn next_secret(&self) -> Secret {
        self()
    }
}
