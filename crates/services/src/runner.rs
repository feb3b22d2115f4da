use std::sync::Arc;

use lesson_core::assessment::{AnswerOutcome, DayQuizzes, OutputReport, evaluate_output};
use lesson_core::model::{DayNumber, DayPlan, ListeningKey, Mode, Progress, SpeechSettings};
use lesson_core::speech::{SpeechEngine, SpeechEvent, SpeechQueueController, SpeechState};
use tracing::{debug, warn};

use crate::content::LessonContentProvider;
use crate::gate::{DayGate, DayVerdict};
use crate::progress_store::{ProgressStore, ProgressUpdate};

/// One learner's lesson session: progress, the active day's quizzes and
/// free text, and narration.
///
/// Whenever the active day changes the quizzes and free text are rebuilt for
/// the new day and narration is force-stopped.
pub struct LessonRunner<E> {
    store: ProgressStore,
    content: Arc<dyn LessonContentProvider>,
    gate: DayGate,
    plan: Option<Arc<DayPlan>>,
    quizzes: DayQuizzes,
    output_text: String,
    speech: SpeechQueueController<E>,
}

impl<E: SpeechEngine> LessonRunner<E> {
    /// Start a session on the store's active day.
    pub fn open(
        store: ProgressStore,
        content: Arc<dyn LessonContentProvider>,
        gate: DayGate,
        speech: SpeechQueueController<E>,
    ) -> Self {
        let mut runner = Self {
            store,
            content,
            gate,
            plan: None,
            quizzes: DayQuizzes::default(),
            output_text: String::new(),
            speech,
        };
        runner.enter_active_day();
        runner
    }

    //
    // ─── READS ─────────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn progress(&self) -> Progress {
        self.store.progress()
    }

    #[must_use]
    pub fn active_day(&self) -> DayNumber {
        self.store.active_day()
    }

    /// Content for the active day; `None` renders as "no content".
    #[must_use]
    pub fn plan(&self) -> Option<&DayPlan> {
        self.plan.as_deref()
    }

    #[must_use]
    pub fn quizzes(&self) -> &DayQuizzes {
        &self.quizzes
    }

    #[must_use]
    pub fn output_text(&self) -> &str {
        &self.output_text
    }

    #[must_use]
    pub fn speech(&self) -> &SpeechQueueController<E> {
        &self.speech
    }

    pub fn speech_mut(&mut self) -> &mut SpeechQueueController<E> {
        &mut self.speech
    }

    //
    // ─── PROGRESS ──────────────────────────────────────────────────────────────
    //

    /// Navigate to `day`; `None` when the day is locked or below 1.
    pub async fn go_to_day(&mut self, day: u32) -> Option<ProgressUpdate> {
        let before = self.active_day();
        let update = self.store.go_to_day(day).await?;
        if self.active_day() != before {
            self.enter_active_day();
        }
        Some(update)
    }

    pub async fn set_mode(&mut self, mode: Mode) -> ProgressUpdate {
        self.store.set_mode(mode).await
    }

    /// Forget all progress and start over at day 1.
    pub async fn reset_progress(&mut self) -> ProgressUpdate {
        let update = self.store.reset().await;
        self.enter_active_day();
        update
    }

    //
    // ─── QUIZZES AND OUTPUT ────────────────────────────────────────────────────
    //

    pub fn answer_vocab(&mut self, index: usize, choice: impl Into<String>) -> AnswerOutcome {
        self.quizzes.answer_vocabulary(index, choice)
    }

    pub fn answer_grammar(&mut self, index: usize, choice: impl Into<String>) -> AnswerOutcome {
        self.quizzes.answer_grammar(index, choice)
    }

    pub fn answer_listening(
        &mut self,
        segment: usize,
        question: usize,
        choice: impl Into<String>,
    ) -> AnswerOutcome {
        self.quizzes
            .answer_listening(ListeningKey::new(segment, question), choice)
    }

    pub fn set_output_text(&mut self, text: impl Into<String>) {
        self.output_text = text.into();
    }

    /// Evaluate the current free text without touching progress.
    #[must_use]
    pub fn check_output(&self) -> Option<OutputReport> {
        let plan = self.plan.as_deref()?;
        Some(evaluate_output(
            &self.output_text,
            &plan.output_rules,
            &plan.pass_rules,
            &plan.vocabulary,
        ))
    }

    /// Score the active day and unlock the next one if it passed.
    ///
    /// Returns `None` when the active day has no content.
    pub async fn evaluate_and_advance(&mut self) -> Option<DayVerdict> {
        let plan = Arc::clone(self.plan.as_ref()?);
        let before = self.active_day();
        let verdict = self
            .gate
            .evaluate_and_advance(&mut self.store, &plan, &self.quizzes, &self.output_text)
            .await;
        if self.active_day() != before {
            self.enter_active_day();
        }
        Some(verdict)
    }

    //
    // ─── NARRATION ─────────────────────────────────────────────────────────────
    //

    /// Narrate one listening segment, repeated its configured number of times.
    pub fn play_segment(&mut self, segment: usize) -> SpeechState {
        let chunks = self
            .plan
            .as_deref()
            .and_then(|plan| plan.listening.segment(segment))
            .map(|segment| segment.narration_chunks());
        match chunks {
            Some(chunks) => self.speech.play(chunks),
            None => {
                warn!(day = %self.active_day(), segment, "no such listening segment");
                self.speech.state()
            }
        }
    }

    /// Narrate every listening segment in order.
    pub fn play_lesson(&mut self) -> SpeechState {
        let chunks = self
            .plan
            .as_deref()
            .map(|plan| plan.listening.narration_chunks())
            .unwrap_or_default();
        self.speech.play(chunks)
    }

    pub fn stop_speech(&mut self) {
        self.speech.stop();
    }

    /// Entry point for engine callbacks.
    pub fn speech_event(&mut self, event: SpeechEvent) -> bool {
        self.speech.handle_event(event)
    }

    pub fn refresh_voices(&mut self) {
        self.speech.refresh_voices();
    }

    pub fn select_voice(&mut self, name: &str) -> bool {
        self.speech.select_voice(name)
    }

    pub fn set_speech_settings(&mut self, settings: SpeechSettings) {
        self.speech.set_settings(settings);
    }

    fn enter_active_day(&mut self) {
        let day = self.active_day();
        self.speech.stop();
        self.plan = self.content.day_plan(day);
        self.output_text.clear();
        match self.plan.as_deref() {
            Some(plan) => {
                self.quizzes = DayQuizzes::from_plan(plan);
                self.speech.set_language(plan.target_language.clone());
                debug!(%day, topic = %plan.topic, "entered lesson day");
            }
            None => {
                self.quizzes = DayQuizzes::default();
                debug!(%day, "no content for day");
            }
        }
    }
}

impl<E> std::fmt::Debug for LessonRunner<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LessonRunner")
            .field("store", &self.store)
            .field("day", &self.plan.as_ref().map(|plan| plan.day))
            .field("speech", &self.speech)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use lesson_core::speech::Voice;
    use lesson_core::speech::testing::RecordingEngine;
    use lesson_core::time::fixed_clock;
    use storage::repository::InMemoryRepository;

    use crate::content::StaticContentProvider;
    use crate::progress_store::DEFAULT_PROGRESS_KEY;
    use crate::seed::seed_days;

    const DAY_ONE_TEXT: &str = "Ich bin in der Schule. Der Lehrer ist nett.";

    async fn runner() -> LessonRunner<RecordingEngine> {
        let store =
            ProgressStore::open(Arc::new(InMemoryRepository::new()), DEFAULT_PROGRESS_KEY).await;
        let content = StaticContentProvider::new(seed_days()).unwrap();
        let engine = RecordingEngine::new().with_voices(vec![
            Voice::new("Samantha", "en-US"),
            Voice::new("Anna", "de-DE"),
        ]);
        LessonRunner::open(
            store,
            Arc::new(content),
            DayGate::new(fixed_clock()),
            SpeechQueueController::new(engine, "en"),
        )
    }

    fn pass_day_one(runner: &mut LessonRunner<RecordingEngine>) {
        let plan = runner.plan().unwrap().clone();
        for (index, question) in plan.vocab_quiz.iter().enumerate() {
            runner.answer_vocab(index, question.correct_choice.clone());
        }
        for (index, question) in plan.grammar.quiz.iter().enumerate() {
            runner.answer_grammar(index, question.correct_choice.clone());
        }
        for item in plan.listening.flattened() {
            runner.answer_listening(
                item.key.segment,
                item.key.question,
                item.question.correct_choice.clone(),
            );
        }
        runner.set_output_text(DAY_ONE_TEXT);
    }

    #[tokio::test]
    async fn open_selects_lesson_language_voice() {
        let runner = runner().await;
        assert_eq!(runner.active_day(), DayNumber::FIRST);
        assert_eq!(runner.plan().unwrap().topic, "In der Schule");
        assert_eq!(
            runner.speech().selected_voice().map(|v| v.name.as_str()),
            Some("Anna")
        );
    }

    #[tokio::test]
    async fn voice_pick_outlives_rate_change_and_day_change() {
        let mut runner = runner().await;
        assert!(runner.select_voice("Samantha"));

        runner.set_speech_settings(SpeechSettings::default().with_rate(1.2));
        pass_day_one(&mut runner);
        runner.evaluate_and_advance().await.unwrap();

        let speech = runner.speech();
        assert_eq!(speech.selected_voice().map(|v| v.name.as_str()), Some("Samantha"));
        assert_eq!(speech.settings().rate(), 1.2);
    }

    #[tokio::test]
    async fn passing_a_day_resets_state_and_stops_narration() {
        let mut runner = runner().await;
        pass_day_one(&mut runner);
        assert_eq!(runner.play_lesson(), SpeechState::Playing);
        let epoch = runner.speech().epoch();

        let verdict = runner.evaluate_and_advance().await.unwrap();

        assert!(verdict.passed, "{verdict:?}");
        assert_eq!(runner.active_day().value(), 2);
        assert_eq!(runner.plan().unwrap().day.value(), 2);
        assert!(runner.output_text().is_empty());
        assert_eq!(runner.quizzes().vocabulary().answered_count(), 0);
        assert!(runner.speech().epoch() > epoch);
        assert_eq!(runner.speech().state(), SpeechState::Idle);
    }

    #[tokio::test]
    async fn failed_evaluation_keeps_answers() {
        let mut runner = runner().await;
        runner.answer_vocab(0, "Straße");
        runner.set_output_text("zu kurz");

        let verdict = runner.evaluate_and_advance().await.unwrap();

        assert!(!verdict.passed);
        assert_eq!(runner.active_day(), DayNumber::FIRST);
        assert_eq!(runner.quizzes().vocabulary().answered_count(), 1);
        assert_eq!(runner.output_text(), "zu kurz");
    }

    #[tokio::test]
    async fn navigation_to_same_day_keeps_answers() {
        let mut runner = runner().await;
        runner.answer_vocab(0, "Schule");
        runner.set_mode(Mode::Quiz).await;

        let update = runner.go_to_day(1).await.unwrap();

        assert_eq!(update.progress.mode(), Mode::Learn);
        assert_eq!(runner.quizzes().vocabulary().answered_count(), 1);
        assert!(runner.go_to_day(2).await.is_none());
    }

    #[tokio::test]
    async fn unlocked_day_without_content_has_no_plan() {
        let mut runner = runner().await;
        pass_day_one(&mut runner);
        runner.evaluate_and_advance().await.unwrap();
        runner.set_output_text("Ich lerne Deutsch, weil es Spaß macht. Das ist gut.");
        let plan = runner.plan().unwrap().clone();
        for (index, question) in plan.vocab_quiz.iter().enumerate() {
            runner.answer_vocab(index, question.correct_choice.clone());
        }
        for (index, question) in plan.grammar.quiz.iter().enumerate() {
            runner.answer_grammar(index, question.correct_choice.clone());
        }
        for item in plan.listening.flattened() {
            runner.answer_listening(
                item.key.segment,
                item.key.question,
                item.question.correct_choice.clone(),
            );
        }

        let verdict = runner.evaluate_and_advance().await.unwrap();

        assert!(verdict.passed, "{verdict:?}");
        assert_eq!(runner.active_day().value(), 3);
        assert!(runner.plan().is_none());
        assert!(runner.check_output().is_none());
        assert!(runner.evaluate_and_advance().await.is_none());
        assert_eq!(runner.play_lesson(), SpeechState::Idle);
    }

    #[tokio::test]
    async fn play_segment_repeats_and_rejects_unknown_segments() {
        let mut runner = runner().await;
        let segment = runner.plan().unwrap().listening.segments[0].clone();

        runner.play_segment(0);
        let flush = runner.speech().engine().last_flush_token().unwrap();
        runner.speech_event(SpeechEvent::Ended(flush));
        assert_eq!(runner.speech().engine().spoken_texts(), vec![segment.text.clone()]);
        assert_eq!(runner.speech().pending(), segment.plays() as usize - 1);

        let epoch = runner.speech().epoch();
        runner.play_segment(99);
        assert_eq!(runner.speech().epoch(), epoch);
    }

    #[tokio::test]
    async fn reset_returns_to_day_one() {
        let mut runner = runner().await;
        pass_day_one(&mut runner);
        runner.evaluate_and_advance().await.unwrap();

        let update = runner.reset_progress().await;

        assert_eq!(update.progress, Progress::default());
        assert_eq!(runner.plan().unwrap().day, DayNumber::FIRST);
    }
}
