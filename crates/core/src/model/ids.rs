use serde::{Deserialize, Serialize};
use std::fmt;

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("day numbers start at 1, got {0}")]
pub struct InvalidDayNumber(pub u32);

/// One-based lesson day number.
///
/// Zero is unrepresentable, so a persisted or authored `0` fails to
/// deserialize instead of leaking into progress arithmetic.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct DayNumber(u32);

impl DayNumber {
    pub const FIRST: Self = Self(1);

    /// Creates a `DayNumber`, rejecting zero.
    #[must_use]
    pub fn new(day: u32) -> Option<Self> {
        (day >= 1).then_some(Self(day))
    }

    /// Returns the underlying u32 value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// The day after this one, saturating at `u32::MAX`.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl Default for DayNumber {
    fn default() -> Self {
        Self::FIRST
    }
}

impl TryFrom<u32> for DayNumber {
    type Error = InvalidDayNumber;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(InvalidDayNumber(value))
    }
}

impl From<DayNumber> for u32 {
    fn from(day: DayNumber) -> Self {
        day.0
    }
}

impl fmt::Debug for DayNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DayNumber({})", self.0)
    }
}

impl fmt::Display for DayNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Composite key addressing one listening question across segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ListeningKey {
    pub segment: usize,
    pub question: usize,
}

impl ListeningKey {
    #[must_use]
    pub fn new(segment: usize, question: usize) -> Self {
        Self { segment, question }
    }
}

impl fmt::Display for ListeningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.segment, self.question)
    }
}
