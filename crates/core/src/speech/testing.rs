//! In-memory `SpeechEngine` that records every call, for tests.

use std::time::Duration;

use crate::speech::{SpeechEngine, SpeechError, Utterance, UtteranceRole, UtteranceToken, Voice};

#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Pause,
    Cancel,
    Speak(Utterance),
    ScheduleFallback { delay: Duration, epoch: u64 },
}

#[derive(Debug, Clone, Default)]
pub struct RecordingEngine {
    pub supported: bool,
    pub voices: Vec<Voice>,
    pub calls: Vec<EngineCall>,
    /// Queued texts the engine refuses to speak.
    pub reject_texts: Vec<String>,
    /// Makes pause, cancel, flush and fallback scheduling fail.
    pub fail_resets: bool,
    /// Host without a timer: fallback scheduling fails, everything else works.
    pub no_timer: bool,
}

impl RecordingEngine {
    #[must_use]
    pub fn new() -> Self {
        Self {
            supported: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn unsupported() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_voices(mut self, voices: Vec<Voice>) -> Self {
        self.voices = voices;
        self
    }

    fn queued(&self) -> impl Iterator<Item = &Utterance> {
        self.calls.iter().filter_map(|call| match call {
            EngineCall::Speak(u) if matches!(u.token.role, UtteranceRole::Queued { .. }) => Some(u),
            _ => None,
        })
    }

    /// Texts of every queued (non-flush) utterance, in dispatch order.
    #[must_use]
    pub fn spoken_texts(&self) -> Vec<String> {
        self.queued().map(|u| u.text.clone()).collect()
    }

    #[must_use]
    pub fn last_queued(&self) -> Option<&Utterance> {
        self.queued().last()
    }

    #[must_use]
    pub fn last_queued_token(&self) -> Option<UtteranceToken> {
        self.last_queued().map(|u| u.token)
    }

    #[must_use]
    pub fn last_flush_token(&self) -> Option<UtteranceToken> {
        self.calls.iter().rev().find_map(|call| match call {
            EngineCall::Speak(u) if u.token.role == UtteranceRole::Flush => Some(u.token),
            _ => None,
        })
    }

    #[must_use]
    pub fn cancel_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| **call == EngineCall::Cancel)
            .count()
    }

    fn reset_result(&self) -> Result<(), SpeechError> {
        if self.fail_resets {
            Err(SpeechError::Engine("reset refused".into()))
        } else {
            Ok(())
        }
    }
}

impl SpeechEngine for RecordingEngine {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn voices(&self) -> Vec<Voice> {
        self.voices.clone()
    }

    fn speak(&mut self, utterance: Utterance) -> Result<(), SpeechError> {
        if utterance.token.role == UtteranceRole::Flush {
            self.reset_result()?;
        } else if self.reject_texts.contains(&utterance.text) {
            return Err(SpeechError::Engine(format!("refused {:?}", utterance.text)));
        }
        self.calls.push(EngineCall::Speak(utterance));
        Ok(())
    }

    fn cancel(&mut self) -> Result<(), SpeechError> {
        self.calls.push(EngineCall::Cancel);
        self.reset_result()
    }

    fn pause(&mut self) -> Result<(), SpeechError> {
        self.calls.push(EngineCall::Pause);
        self.reset_result()
    }

    fn schedule_fallback(&mut self, delay: Duration, epoch: u64) -> Result<(), SpeechError> {
        self.reset_result()?;
        if self.no_timer {
            return Err(SpeechError::Engine("no timer available".into()));
        }
        self.calls.push(EngineCall::ScheduleFallback { delay, epoch });
        Ok(())
    }
}
