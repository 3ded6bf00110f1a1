//! Input Capture and Validation
//!
//! The only human action is "choose a number 1 through 6". Anything outside
//! that range is rejected here and never reaches the match engine.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Deserialize};
use thiserror::Error;

/// Errors produced while turning raw input into a [`HandMove`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// Number outside 1..=6.
    #[error("move must be between 1 and 6, got {0}")]
    OutOfRange(u8),
    /// Input was not a number at all.
    #[error("not a move: {0:?}")]
    NotADigit(String),
}

/// A validated hand: always in 1..=6.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct HandMove(u8);

impl HandMove {
    /// Smallest legal hand.
    pub const MIN: u8 = 1;
    /// Largest legal hand.
    pub const MAX: u8 = 6;

    /// Validate a raw number.
    pub fn new(value: u8) -> Result<Self, InputError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(InputError::OutOfRange(value))
        }
    }

    /// Map a key press to a hand. Only the digit keys 1-6 count.
    pub fn from_key(key: char) -> Option<Self> {
        let digit = key.to_digit(10)?;
        Self::new(digit as u8).ok()
    }

    /// Raw value in 1..=6.
    #[inline]
    pub fn value(self) -> u8 {
        self.0
    }

    /// The next hand, wrapping 6 back to 1.
    ///
    /// Always differs from `self`.
    #[inline]
    pub fn next_wrapping(self) -> Self {
        Self(self.0 % Self::MAX + 1)
    }

    /// All six hands in ascending order.
    pub fn all() -> impl Iterator<Item = HandMove> {
        (Self::MIN..=Self::MAX).map(HandMove)
    }
}

impl TryFrom<u8> for HandMove {
    type Error = InputError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<HandMove> for u8 {
    fn from(value: HandMove) -> Self {
        value.0
    }
}

impl FromStr for HandMove {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let value: u8 = trimmed
            .parse()
            .map_err(|_| InputError::NotADigit(trimmed.to_string()))?;
        Self::new(value)
    }
}

impl fmt::Display for HandMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
