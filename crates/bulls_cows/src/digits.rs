//! Secrets and guesses: four-digit codes with validation.

use std::fmt;
use std::str::FromStr;

use tracing::instrument;

/// Number of digits in every code.
pub const CODE_LEN: usize = 4;

/// Raw digits of a code, most significant first.
pub type Digits = [u8; CODE_LEN];

/// Why a string or digit array is not a valid code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum GuessError {
    /// The input does not have exactly four characters.
    #[display("Guess must be exactly 4 digits, got {}", _0)]
    WrongLength(usize),

    /// A character is not an ASCII decimal digit.
    #[display("Guess may only contain digits, found {:?}", _0)]
    NotADigit(char),

    /// A raw digit value is greater than 9.
    #[display("Digit {} is out of range 0-9", _0)]
    DigitOutOfRange(u8),

    /// A digit appears more than once.
    #[display("Digits must not repeat, {} appears more than once", _0)]
    RepeatedDigit(u8),
}

impl std::error::Error for GuessError {}

/// Checks range and pairwise distinctness.
fn check_digits(digits: &Digits) -> Result<(), GuessError> {
    let mut seen = [false; 10];
    for &d in digits {
        let slot = seen
            .get_mut(usize::from(d))
            .ok_or(GuessError::DigitOutOfRange(d))?;
        if *slot {
            return Err(GuessError::RepeatedDigit(d));
        }
        *slot = true;
    }
    Ok(())
}

fn parse_digits(s: &str) -> Result<Digits, GuessError> {
    let count = s.chars().count();
    if count != CODE_LEN {
        return Err(GuessError::WrongLength(count));
    }
    let mut digits = [0u8; CODE_LEN];
    for (slot, c) in digits.iter_mut().zip(s.chars()) {
        // ASCII only; `char::is_numeric` would admit other scripts.
        let value = c.to_digit(10).ok_or(GuessError::NotADigit(c))?;
        *slot = value as u8;
    }
    Ok(digits)
}

fn write_digits(digits: &Digits, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for d in digits {
        write!(f, "{}", d)?;
    }
    Ok(())
}

/// The hidden answer of one game.
///
/// Always four pairwise-distinct digits in `0..=9`. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Secret(Digits);

impl Secret {
    /// Builds a secret from raw digits.
    ///
    /// # Errors
    ///
    /// Returns [`GuessError`] if a digit is out of range or repeated.
    #[instrument(skip(digits))]
    pub fn new(digits: Digits) -> Result<Self, GuessError> {
        check_digits(&digits)?;
        Ok(Self(digits))
    }

    /// Wraps digits that are already known to be valid.
    pub(crate) fn from_valid(digits: Digits) -> Self {
        debug_assert!(check_digits(&digits).is_ok());
        Self(digits)
    }

    /// Returns the digits of the secret.
    pub fn digits(&self) -> &Digits {
        &self.0
    }
}

impl FromStr for Secret {
    type Err = GuessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(parse_digits(s)?)
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_digits(&self.0, f)
    }
}

/// A validated player guess.
///
/// Same shape as a [`Secret`]: four pairwise-distinct digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Guess(Digits);

impl Guess {
    /// Builds a guess from raw digits.
    ///
    /// # Errors
    ///
    /// Returns [`GuessError`] if a digit is out of range or repeated.
    #[instrument]
    pub fn new(digits: Digits) -> Result<Self, GuessError> {
        check_digits(&digits)?;
        Ok(Self(digits))
    }

    /// Parses user input such as `"0123"`.
    ///
    /// # Errors
    ///
    /// Returns [`GuessError`] for wrong length, non-digit characters or
    /// repeated digits.
    #[instrument(skip(input), fields(len = input.len()))]
    pub fn parse(input: &str) -> Result<Self, GuessError> {
        Self::new(parse_digits(input)?)
    }

    /// Returns the digits of the guess.
    pub fn digits(&self) -> &Digits {
        &self.0
    }

    /// True if the guess matches the secret digit for digit.
    pub fn matches(&self, secret: &Secret) -> bool {
        self.0 == secret.0
    }
}

impl FromStr for Guess {
    type Err = GuessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Guess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_digits(&self.0, f)
    }
}
