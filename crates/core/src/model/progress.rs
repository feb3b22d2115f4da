use serde::{Deserialize, Serialize};

use crate::model::DayNumber;

/// Which view of the active day the learner is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Learn,
    Quiz,
}

/// Persisted per-learner progress.
///
/// `current_day` may exceed `max_unlocked_day` only if the persisted payload
/// was edited by hand; `active_day` clamps it on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    current_day: DayNumber,
    max_unlocked_day: DayNumber,
    mode: Mode,
}

impl Progress {
    #[must_use]
    pub fn new(current_day: DayNumber, max_unlocked_day: DayNumber, mode: Mode) -> Self {
        Self {
            current_day,
            max_unlocked_day,
            mode,
        }
    }

    #[must_use]
    pub fn current_day(&self) -> DayNumber {
        self.current_day
    }

    #[must_use]
    pub fn max_unlocked_day(&self) -> DayNumber {
        self.max_unlocked_day
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The day actually rendered: `min(current_day, max_unlocked_day)`.
    #[must_use]
    pub fn active_day(&self) -> DayNumber {
        self.current_day.min(self.max_unlocked_day)
    }

    #[must_use]
    pub fn with_mode(self, mode: Mode) -> Self {
        Self { mode, ..self }
    }

    /// Snapshot after navigating to `day`, or `None` if the day is locked.
    ///
    /// Entering a day always lands on the learn view.
    #[must_use]
    pub fn navigated_to(self, day: u32) -> Option<Self> {
        let day = DayNumber::new(day)?;
        (day <= self.max_unlocked_day).then_some(Self {
            current_day: day,
            mode: Mode::Learn,
            ..self
        })
    }

    /// Snapshot after passing `day`: the next day is unlocked and opened.
    #[must_use]
    pub fn advanced_past(self, day: DayNumber) -> Self {
        let next = day.next();
        Self {
            current_day: next,
            max_unlocked_day: self.max_unlocked_day.max(next),
            mode: Mode::Learn,
        }
    }
}
