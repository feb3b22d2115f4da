//! Narration over the host speech synthesizer.

mod controller;
mod engine;
mod voices;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use controller::{FLUSH_FALLBACK_DELAY, SpeechQueueController, SpeechState};
pub use engine::{
    SpeechEngine, SpeechError, SpeechEvent, Utterance, UtteranceRole, UtteranceToken, Voice,
};
pub use voices::{VoiceCatalog, default_voice};
