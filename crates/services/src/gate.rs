use chrono::{DateTime, Utc};
use lesson_core::assessment::{DayQuizzes, OutputReport, evaluate_output};
use lesson_core::model::{DayNumber, DayPlan, Progress};

use crate::Clock;
use crate::progress_store::ProgressStore;

/// Outcome of one `evaluate_and_advance` call.
#[derive(Debug, Clone, PartialEq)]
pub struct DayVerdict {
    pub day: DayNumber,
    pub vocab_score: f64,
    pub grammar_score: f64,
    pub listening_score: f64,
    pub output: OutputReport,
    pub output_ok: bool,
    pub passed: bool,
    /// Progress after the call; unchanged when the day was not passed.
    pub progress: Progress,
    /// `false` only if the unlock could not be written to storage.
    pub persisted: bool,
    pub evaluated_at: DateTime<Utc>,
}

/// Combines quiz scores and the output check into a pass verdict and
/// advances progress when the day is passed.
#[derive(Debug, Clone, Copy, Default)]
pub struct DayGate {
    clock: Clock,
}

impl DayGate {
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self { clock }
    }

    /// Score the active day and, if every threshold is met, unlock and open
    /// the next day in one write. A failed evaluation leaves progress alone.
    pub async fn evaluate_and_advance(
        &self,
        store: &mut ProgressStore,
        plan: &DayPlan,
        quizzes: &DayQuizzes,
        output_text: &str,
    ) -> DayVerdict {
        let day = store.active_day();
        let scores = quizzes.scores();
        let output = evaluate_output(
            output_text,
            &plan.output_rules,
            &plan.pass_rules,
            &plan.vocabulary,
        );
        let output_ok = output.passed;

        let rules = &plan.pass_rules;
        let passed = scores.vocabulary >= rules.min_vocab_quiz_ratio
            && scores.grammar >= rules.min_grammar_quiz_ratio
            && scores.listening >= rules.min_listening_quiz_ratio
            && output_ok;

        let (progress, persisted) = if passed {
            let update = store.advance_past(day).await;
            (update.progress, update.persisted)
        } else {
            tracing::debug!(
                %day,
                vocab = scores.vocabulary,
                grammar = scores.grammar,
                listening = scores.listening,
                output_ok,
                "day not passed"
            );
            (store.progress(), true)
        };

        DayVerdict {
            day,
            vocab_score: scores.vocabulary,
            grammar_score: scores.grammar,
            listening_score: scores.listening,
            output,
            output_ok,
            passed,
            progress,
            persisted,
            evaluated_at: self.clock.now(),
        }
    }
}
