use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SpeechError {
    #[error("speech engine error: {0}")]
    Engine(String),
}

/// A voice offered by the host engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    pub name: String,
    /// BCP 47 language tag, e.g. `de-DE`.
    pub lang: String,
}

impl Voice {
    #[must_use]
    pub fn new(name: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lang: lang.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UtteranceRole {
    /// Zero-length utterance spoken during a hard reset.
    Flush,
    /// The `index`-th chunk handed to the engine by one `play` call.
    Queued { index: usize },
}

/// Identity attached to every utterance and echoed back in its events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UtteranceToken {
    pub epoch: u64,
    pub role: UtteranceRole,
}

impl UtteranceToken {
    #[must_use]
    pub fn flush(epoch: u64) -> Self {
        Self {
            epoch,
            role: UtteranceRole::Flush,
        }
    }

    #[must_use]
    pub fn queued(epoch: u64, index: usize) -> Self {
        Self {
            epoch,
            role: UtteranceRole::Queued { index },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub voice: Option<String>,
    pub lang: String,
    pub rate: f32,
    pub pitch: f32,
    pub token: UtteranceToken,
}

/// Callback delivered by the host, in whatever order the engine produces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEvent {
    Started(UtteranceToken),
    Ended(UtteranceToken),
    Failed {
        token: UtteranceToken,
        reason: String,
    },
    /// The delay requested through `SpeechEngine::schedule_fallback` elapsed.
    FallbackElapsed { epoch: u64 },
}

impl SpeechEvent {
    #[must_use]
    pub fn epoch(&self) -> u64 {
        match self {
            Self::Started(token) | Self::Ended(token) | Self::Failed { token, .. } => token.epoch,
            Self::FallbackElapsed { epoch } => *epoch,
        }
    }
}

/// Playback primitives of the host speech synthesizer.
///
/// Implementations report progress of every spoken utterance back to the
/// controller as `SpeechEvent`s carrying the utterance's token. Nothing is
/// assumed about timing: events may arrive late, twice, or after a cancel.
pub trait SpeechEngine {
    fn is_supported(&self) -> bool;

    /// Voices currently known to the engine; may be empty until the host
    /// finishes populating them.
    fn voices(&self) -> Vec<Voice>;

    /// Queue an utterance for playback.
    ///
    /// # Errors
    ///
    /// Returns `SpeechError` if the engine refuses the utterance outright.
    fn speak(&mut self, utterance: Utterance) -> Result<(), SpeechError>;

    /// # Errors
    ///
    /// Returns `SpeechError` if the engine rejects the request.
    fn cancel(&mut self) -> Result<(), SpeechError>;

    /// # Errors
    ///
    /// Returns `SpeechError` if the engine rejects the request.
    fn pause(&mut self) -> Result<(), SpeechError>;

    /// Arrange for `SpeechEvent::FallbackElapsed { epoch }` after `delay`.
    ///
    /// # Errors
    ///
    /// Returns `SpeechError` if the host has no timer available; the
    /// controller then cancels immediately instead of waiting.
    fn schedule_fallback(&mut self, delay: Duration, epoch: u64) -> Result<(), SpeechError>;
}
