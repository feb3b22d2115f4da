use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::model::SpeechSettings;
use crate::speech::{
    SpeechEngine, SpeechError, SpeechEvent, Utterance, UtteranceRole, UtteranceToken, Voice,
    VoiceCatalog,
};

/// Delay after which a hard reset issues its backstop cancel.
pub const FLUSH_FALLBACK_DELAY: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechState {
    Idle,
    Playing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    /// Hard reset in flight; the queue starts once the flush completes.
    Flushing,
    Speaking { index: usize },
}

//
// ─── CONTROLLER ────────────────────────────────────────────────────────────────
//

/// Sequential, cancellable narration over an unreliable `SpeechEngine`.
///
/// Every `play` and `stop` opens a new epoch. Engine events carry the epoch
/// of the utterance they belong to and are dropped unless it is still the
/// live one, so a superseded call can never advance the current queue.
pub struct SpeechQueueController<E> {
    engine: E,
    supported: bool,
    epoch: u64,
    phase: Phase,
    queue: VecDeque<String>,
    next_index: usize,
    speaking: bool,
    language: String,
    settings: SpeechSettings,
    voices: VoiceCatalog,
}

impl<E: SpeechEngine> SpeechQueueController<E> {
    /// Wrap `engine`, narrating in `language` (a BCP 47 tag or prefix).
    pub fn new(engine: E, language: impl Into<String>) -> Self {
        let supported = engine.is_supported();
        let language = language.into();
        let mut voices = VoiceCatalog::default();
        if supported {
            voices.refresh(engine.voices(), &language);
        } else {
            debug!("speech engine unsupported; narration disabled");
        }
        Self {
            engine,
            supported,
            epoch: 0,
            phase: Phase::Idle,
            queue: VecDeque::new(),
            next_index: 0,
            speaking: false,
            language,
            settings: SpeechSettings::default(),
            voices,
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: SpeechSettings) -> Self {
        self.set_settings(settings);
        self
    }

    /// Apply new rate, pitch and voice. Settings without a voice keep the
    /// learner's current pick.
    pub fn set_settings(&mut self, settings: SpeechSettings) {
        if let Some(name) = settings.voice_name() {
            self.voices.prefer(name);
        }
        let voice_name = self.voices.preferred().map(str::to_owned);
        self.settings = settings.with_voice_name(voice_name);
        self.refresh_voices();
    }

    /// Switch the narration language; re-applies default voice selection
    /// unless the learner picked a voice that is still offered.
    pub fn set_language(&mut self, language: impl Into<String>) {
        self.language = language.into();
        self.voices.reselect(&self.language);
    }

    /// Re-read the engine's voice list, for hosts that populate it late.
    pub fn refresh_voices(&mut self) {
        if self.supported {
            self.voices.refresh(self.engine.voices(), &self.language);
        }
    }

    /// Pick a voice by name and record it in the settings.
    pub fn select_voice(&mut self, name: &str) -> bool {
        if !self.voices.select(name) {
            return false;
        }
        self.settings = self.settings.clone().with_voice_name(Some(name.to_owned()));
        true
    }

    #[must_use]
    pub fn selected_voice(&self) -> Option<&Voice> {
        self.voices.selected()
    }

    #[must_use]
    pub fn voices(&self) -> &[Voice] {
        self.voices.voices()
    }

    #[must_use]
    pub fn settings(&self) -> &SpeechSettings {
        &self.settings
    }

    #[must_use]
    pub fn is_supported(&self) -> bool {
        self.supported
    }

    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    #[must_use]
    pub fn state(&self) -> SpeechState {
        if matches!(self.phase, Phase::Speaking { .. }) || !self.queue.is_empty() {
            SpeechState::Playing
        } else {
            SpeechState::Idle
        }
    }

    #[must_use]
    pub fn is_speaking(&self) -> bool {
        self.speaking
    }

    /// Chunks not yet handed to the engine.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Replace whatever is playing with `texts`, narrated one after another.
    ///
    /// Blank entries are skipped; if nothing is left the controller stays idle.
    pub fn play<I, S>(&mut self, texts: I) -> SpeechState
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let chunks: VecDeque<String> = texts
            .into_iter()
            .map(Into::into)
            .filter(|text| !text.trim().is_empty())
            .collect();

        self.supersede();

        if chunks.is_empty() || !self.supported {
            debug!(epoch = self.epoch, "nothing to narrate");
            return self.state();
        }

        debug!(epoch = self.epoch, chunks = chunks.len(), "narration queued");
        self.queue = chunks;
        if self.phase != Phase::Flushing {
            self.speak_next();
        }
        self.state()
    }

    /// Stop narration and invalidate every outstanding engine event.
    pub fn stop(&mut self) {
        self.supersede();
        debug!(epoch = self.epoch, "narration stopped");
    }

    /// Apply an engine event. Returns `false` when the event was stale or
    /// irrelevant and nothing changed.
    pub fn handle_event(&mut self, event: SpeechEvent) -> bool {
        if event.epoch() != self.epoch {
            trace!(
                event_epoch = event.epoch(),
                live_epoch = self.epoch,
                "dropping stale speech event"
            );
            return false;
        }

        match event {
            SpeechEvent::FallbackElapsed { .. } => self.complete_flush(),
            SpeechEvent::Started(token) => match token.role {
                UtteranceRole::Queued { index } if self.phase == (Phase::Speaking { index }) => {
                    self.speaking = true;
                    true
                }
                _ => false,
            },
            SpeechEvent::Ended(token) => self.utterance_finished(token),
            SpeechEvent::Failed { token, reason } => {
                warn!(epoch = token.epoch, role = ?token.role, %reason, "utterance failed; skipping");
                self.utterance_finished(token)
            }
        }
    }

    fn utterance_finished(&mut self, token: UtteranceToken) -> bool {
        match token.role {
            UtteranceRole::Flush => self.complete_flush(),
            UtteranceRole::Queued { index } if self.phase == (Phase::Speaking { index }) => {
                self.speak_next();
                true
            }
            UtteranceRole::Queued { .. } => false,
        }
    }

    /// Open a new epoch, forget the queue, and hard-reset the engine.
    fn supersede(&mut self) {
        self.epoch += 1;
        self.queue.clear();
        self.next_index = 0;
        self.speaking = false;
        self.phase = Phase::Idle;
        debug!(epoch = self.epoch, "speech epoch advanced");
        self.hard_reset();
    }

    /// Pause, cancel, then speak a zero-length flush utterance whose end (or
    /// the fallback timer, whichever comes first) triggers a second cancel.
    ///
    /// Without an armed timer nothing guarantees a wake-up, so the second
    /// cancel is issued at once even if the flush was accepted.
    fn hard_reset(&mut self) {
        if !self.supported {
            return;
        }
        let epoch = self.epoch;
        self.guarded("pause", |engine| engine.pause());
        self.guarded("cancel", |engine| engine.cancel());

        let flush = self.utterance(String::new(), UtteranceToken::flush(epoch));
        self.guarded("speak flush", |engine| engine.speak(flush));
        let timed = self.guarded("schedule fallback", |engine| {
            engine.schedule_fallback(FLUSH_FALLBACK_DELAY, epoch)
        });

        if timed {
            self.phase = Phase::Flushing;
        } else {
            self.finish_reset();
        }
    }

    fn complete_flush(&mut self) -> bool {
        if self.phase != Phase::Flushing {
            return false;
        }
        self.finish_reset();
        true
    }

    /// Second cancel of a hard reset; starts the queue if one is waiting.
    fn finish_reset(&mut self) {
        self.guarded("cancel", |engine| engine.cancel());
        self.phase = Phase::Idle;
        if !self.queue.is_empty() {
            self.speak_next();
        }
    }

    fn speak_next(&mut self) {
        while let Some(text) = self.queue.pop_front() {
            let index = self.next_index;
            self.next_index += 1;
            let utterance = self.utterance(text, UtteranceToken::queued(self.epoch, index));
            match self.engine.speak(utterance) {
                Ok(()) => {
                    trace!(epoch = self.epoch, index, "utterance dispatched");
                    self.phase = Phase::Speaking { index };
                    return;
                }
                Err(err) => {
                    warn!(epoch = self.epoch, index, error = %err, "engine rejected utterance; skipping");
                }
            }
        }
        debug!(epoch = self.epoch, "narration queue drained");
        self.phase = Phase::Idle;
        self.speaking = false;
    }

    fn utterance(&self, text: String, token: UtteranceToken) -> Utterance {
        let voice = self.voices.selected();
        Utterance {
            text,
            voice: voice.map(|v| v.name.clone()),
            lang: voice.map_or_else(|| self.language.clone(), |v| v.lang.clone()),
            rate: self.settings.rate(),
            pitch: self.settings.pitch(),
            token,
        }
    }

    /// Run one engine primitive, logging and swallowing its failure.
    fn guarded(
        &mut self,
        op: &'static str,
        call: impl FnOnce(&mut E) -> Result<(), SpeechError>,
    ) -> bool {
        match call(&mut self.engine) {
            Ok(()) => true,
            Err(err) => {
                warn!(epoch = self.epoch, op, error = %err, "speech engine call failed");
                false
            }
        }
    }
}

impl<E> fmt::Debug for SpeechQueueController<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpeechQueueController")
            .field("supported", &self.supported)
            .field("epoch", &self.epoch)
            .field("phase", &self.phase)
            .field("queue_len", &self.queue.len())
            .field("speaking", &self.speaking)
            .field("language", &self.language)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::testing::{EngineCall, RecordingEngine};

    fn controller() -> SpeechQueueController<RecordingEngine> {
        let engine = RecordingEngine::new().with_voices(vec![
            Voice::new("Samantha", "en-US"),
            Voice::new("Anna", "de-DE"),
        ]);
        SpeechQueueController::new(engine, "de")
    }

    fn end_flush(c: &mut SpeechQueueController<RecordingEngine>) {
        let token = c.engine().last_flush_token().expect("flush spoken");
        assert!(c.handle_event(SpeechEvent::Ended(token)));
    }

    fn current(c: &SpeechQueueController<RecordingEngine>) -> UtteranceToken {
        c.engine().last_queued_token().expect("utterance dispatched")
    }

    #[test]
    fn hard_reset_precedes_playback() {
        let mut c = controller();
        assert_eq!(c.play(["a", "b"]), SpeechState::Playing);

        let calls = &c.engine().calls;
        assert_eq!(calls[0], EngineCall::Pause);
        assert_eq!(calls[1], EngineCall::Cancel);
        assert!(matches!(&calls[2], EngineCall::Speak(u) if u.text.is_empty()));
        assert_eq!(
            calls[3],
            EngineCall::ScheduleFallback {
                delay: FLUSH_FALLBACK_DELAY,
                epoch: 1
            }
        );
        assert!(c.engine().spoken_texts().is_empty());

        end_flush(&mut c);
        assert_eq!(c.engine().cancel_count(), 2);
        assert_eq!(c.engine().spoken_texts(), vec!["a"]);
    }

    #[test]
    fn plays_queue_sequentially_until_drained() {
        let mut c = controller();
        c.play(["a", "  ", "b"]);
        end_flush(&mut c);

        let first = current(&c);
        assert!(!c.is_speaking());
        assert!(c.handle_event(SpeechEvent::Started(first)));
        assert!(c.is_speaking());
        assert_eq!(c.pending(), 1);

        assert!(c.handle_event(SpeechEvent::Ended(first)));
        assert_eq!(c.engine().spoken_texts(), vec!["a", "b"]);

        let second = current(&c);
        assert!(c.handle_event(SpeechEvent::Ended(second)));
        assert_eq!(c.state(), SpeechState::Idle);
        assert!(!c.is_speaking());
    }

    #[test]
    fn fallback_timer_starts_queue_when_flush_never_ends() {
        let mut c = controller();
        c.play(["a"]);
        assert!(c.handle_event(SpeechEvent::FallbackElapsed { epoch: c.epoch() }));
        assert_eq!(c.engine().spoken_texts(), vec!["a"]);

        // A flush end arriving after the fallback must not cancel "a".
        let cancels = c.engine().cancel_count();
        let flush = c.engine().last_flush_token().unwrap();
        assert!(!c.handle_event(SpeechEvent::Ended(flush)));
        assert_eq!(c.engine().cancel_count(), cancels);
        assert_eq!(c.state(), SpeechState::Playing);
    }

    #[test]
    fn late_completion_after_stop_is_ignored() {
        let mut c = controller();
        c.play(["a", "b"]);
        end_flush(&mut c);
        let a = current(&c);
        c.handle_event(SpeechEvent::Started(a));

        c.stop();
        assert!(!c.handle_event(SpeechEvent::Ended(a)));

        assert_eq!(c.state(), SpeechState::Idle);
        assert!(!c.is_speaking());
        assert_eq!(c.engine().spoken_texts(), vec!["a"]);
    }

    #[test]
    fn new_play_supersedes_old_callbacks() {
        let mut c = controller();
        c.play(["a", "b"]);
        end_flush(&mut c);
        let a = current(&c);

        c.play(["x"]);
        let old_flush = UtteranceToken::flush(1);
        assert!(!c.handle_event(SpeechEvent::Ended(old_flush)));
        assert!(!c.handle_event(SpeechEvent::Ended(a)));
        assert!(!c.handle_event(SpeechEvent::FallbackElapsed { epoch: 1 }));

        end_flush(&mut c);
        assert_eq!(c.engine().spoken_texts(), vec!["a", "x"]);
    }

    #[test]
    fn failed_utterance_skips_forward() {
        let mut c = controller();
        c.play(["a", "b", "c"]);
        end_flush(&mut c);
        let a = current(&c);

        assert!(c.handle_event(SpeechEvent::Failed {
            token: a,
            reason: "interrupted".into(),
        }));
        assert_eq!(c.engine().spoken_texts(), vec!["a", "b"]);
    }

    #[test]
    fn rejected_utterance_is_skipped_synchronously() {
        let mut engine = RecordingEngine::new();
        engine.reject_texts.push("a".into());
        let mut c = SpeechQueueController::new(engine, "de");

        c.play(["a", "b"]);
        end_flush(&mut c);
        assert_eq!(c.engine().spoken_texts(), vec!["b"]);
    }

    #[test]
    fn duplicate_end_event_advances_once() {
        let mut c = controller();
        c.play(["a", "b", "c"]);
        end_flush(&mut c);
        let a = current(&c);

        assert!(c.handle_event(SpeechEvent::Ended(a)));
        assert!(!c.handle_event(SpeechEvent::Ended(a)));
        assert_eq!(c.engine().spoken_texts(), vec!["a", "b"]);
    }

    #[test]
    fn blank_only_play_stays_idle_but_resets_engine() {
        let mut c = controller();
        assert_eq!(c.play(["", "   "]), SpeechState::Idle);
        assert_eq!(c.epoch(), 1);
        assert_eq!(c.engine().cancel_count(), 1);
        assert!(c.engine().spoken_texts().is_empty());
    }

    #[test]
    fn unsupported_engine_is_a_safe_no_op() {
        let mut c = SpeechQueueController::new(RecordingEngine::unsupported(), "de");
        assert_eq!(c.play(["a"]), SpeechState::Idle);
        c.stop();

        assert!(c.engine().calls.is_empty());
        assert_eq!(c.epoch(), 2);
        assert_eq!(c.state(), SpeechState::Idle);
    }

    #[test]
    fn engine_failures_during_reset_never_escape() {
        let mut engine = RecordingEngine::new();
        engine.fail_resets = true;
        let mut c = SpeechQueueController::new(engine, "de");

        assert_eq!(c.play(["a"]), SpeechState::Playing);
        assert_eq!(c.engine().spoken_texts(), vec!["a"]);
    }

    #[test]
    fn queue_starts_at_once_when_no_fallback_timer_is_armed() {
        let mut engine = RecordingEngine::new();
        engine.no_timer = true;
        let mut c = SpeechQueueController::new(engine, "de");

        assert_eq!(c.play(["a", "b"]), SpeechState::Playing);
        assert!(c.engine().last_flush_token().is_some());
        assert_eq!(c.engine().cancel_count(), 2);
        assert_eq!(c.engine().spoken_texts(), vec!["a"]);
        assert_eq!(c.pending(), 1);

        let flush = c.engine().last_flush_token().unwrap();
        assert!(!c.handle_event(SpeechEvent::Ended(flush)));
        assert_eq!(c.engine().spoken_texts(), vec!["a"]);

        let first = current(&c);
        assert!(c.handle_event(SpeechEvent::Ended(first)));
        assert_eq!(c.engine().spoken_texts(), vec!["a", "b"]);
    }

    #[test]
    fn voice_pick_survives_settings_change() {
        let mut c = controller();
        assert!(c.select_voice("Samantha"));
        assert_eq!(c.settings().voice_name(), Some("Samantha"));

        let faster = c.settings().clone().with_voice_name(None).with_rate(1.2);
        c.set_settings(faster);

        assert_eq!(c.selected_voice().map(|v| v.name.as_str()), Some("Samantha"));
        assert_eq!(c.settings().voice_name(), Some("Samantha"));
        assert_eq!(c.settings().rate(), 1.2);

        c.set_settings(SpeechSettings::default().with_voice_name(Some("Anna".into())));
        assert_eq!(c.selected_voice().map(|v| v.name.as_str()), Some("Anna"));
    }

    #[test]
    fn utterances_use_selected_voice_and_clamped_settings() {
        let mut c = controller().with_settings(
            SpeechSettings::default().with_rate(2.0).with_pitch(0.2),
        );
        c.play(["Hallo"]);
        end_flush(&mut c);

        let spoken = c.engine().last_queued().unwrap();
        assert_eq!(spoken.voice.as_deref(), Some("Anna"));
        assert_eq!(spoken.lang, "de-DE");
        assert_eq!(spoken.rate, 1.4);
        assert_eq!(spoken.pitch, 0.6);
    }

    #[test]
    fn late_voice_population_is_picked_up_on_refresh() {
        let mut c = SpeechQueueController::new(RecordingEngine::new(), "de");
        assert!(c.selected_voice().is_none());

        c.engine_mut().voices = vec![Voice::new("Anna", "de-DE")];
        c.refresh_voices();
        assert_eq!(c.selected_voice().map(|v| v.name.as_str()), Some("Anna"));
    }
}
