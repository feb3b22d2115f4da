use crate::assessment::{AnswerOutcome, QuizSet};
use crate::model::{DayPlan, ListeningKey, QuizQuestion};

/// Current ratio of each quiz set for a day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuizScores {
    pub vocabulary: f64,
    pub grammar: f64,
    pub listening: f64,
}

/// The three independent quiz sets of one lesson day.
#[derive(Debug, Clone, Default)]
pub struct DayQuizzes {
    vocabulary: QuizSet<usize>,
    grammar: QuizSet<usize>,
    listening: QuizSet<ListeningKey>,
}

fn indexed(quiz: &[QuizQuestion]) -> QuizSet<usize> {
    QuizSet::new(
        quiz.iter()
            .enumerate()
            .map(|(index, q)| (index, q.correct_choice.clone())),
    )
}

impl DayQuizzes {
    #[must_use]
    pub fn from_plan(plan: &DayPlan) -> Self {
        Self {
            vocabulary: indexed(&plan.vocab_quiz),
            grammar: indexed(&plan.grammar.quiz),
            listening: QuizSet::new(
                plan.listening
                    .flattened()
                    .into_iter()
                    .map(|q| (q.key, q.question.correct_choice.clone())),
            ),
        }
    }

    pub fn answer_vocabulary(&mut self, index: usize, choice: impl Into<String>) -> AnswerOutcome {
        self.vocabulary.record_answer(index, choice)
    }

    pub fn answer_grammar(&mut self, index: usize, choice: impl Into<String>) -> AnswerOutcome {
        self.grammar.record_answer(index, choice)
    }

    pub fn answer_listening(
        &mut self,
        key: ListeningKey,
        choice: impl Into<String>,
    ) -> AnswerOutcome {
        self.listening.record_answer(key, choice)
    }

    #[must_use]
    pub fn scores(&self) -> QuizScores {
        QuizScores {
            vocabulary: self.vocabulary.score(),
            grammar: self.grammar.score(),
            listening: self.listening.score(),
        }
    }

    #[must_use]
    pub fn vocabulary(&self) -> &QuizSet<usize> {
        &self.vocabulary
    }

    #[must_use]
    pub fn grammar(&self) -> &QuizSet<usize> {
        &self.grammar
    }

    #[must_use]
    pub fn listening(&self) -> &QuizSet<ListeningKey> {
        &self.listening
    }

    pub fn reset(&mut self) {
        self.vocabulary.reset();
        self.grammar.reset();
        self.listening.reset();
    }
}
