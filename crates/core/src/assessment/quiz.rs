use std::collections::HashMap;
use std::hash::Hash;

/// Result of a single `record_answer` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    Correct,
    Incorrect,
    /// The key already has an answer; nothing changed.
    AlreadyAnswered,
    /// The key does not address a question in this set; nothing changed.
    UnknownQuestion,
}

impl AnswerOutcome {
    #[must_use]
    pub fn is_recorded(self) -> bool {
        matches!(self, Self::Correct | Self::Incorrect)
    }
}

/// One-shot multiple-choice scoring over a fixed question set.
///
/// Each key accepts exactly one answer for the lifetime of the set; later
/// answers for the same key are rejected without touching the score.
#[derive(Debug, Clone)]
pub struct QuizSet<K> {
    expected: HashMap<K, String>,
    answers: HashMap<K, String>,
    correct: usize,
}

impl<K> Default for QuizSet<K> {
    fn default() -> Self {
        Self {
            expected: HashMap::new(),
            answers: HashMap::new(),
            correct: 0,
        }
    }
}

impl<K: Eq + Hash + Copy> QuizSet<K> {
    /// Build a set from `(key, correct choice)` pairs.
    pub fn new<I, S>(questions: I) -> Self
    where
        I: IntoIterator<Item = (K, S)>,
        S: Into<String>,
    {
        Self {
            expected: questions
                .into_iter()
                .map(|(key, correct)| (key, correct.into()))
                .collect(),
            answers: HashMap::new(),
            correct: 0,
        }
    }

    pub fn record_answer(&mut self, key: K, choice: impl Into<String>) -> AnswerOutcome {
        let Some(expected) = self.expected.get(&key) else {
            return AnswerOutcome::UnknownQuestion;
        };
        if self.answers.contains_key(&key) {
            return AnswerOutcome::AlreadyAnswered;
        }

        let choice = choice.into();
        let is_correct = *expected == choice;
        self.answers.insert(key, choice);
        if is_correct {
            self.correct += 1;
            AnswerOutcome::Correct
        } else {
            AnswerOutcome::Incorrect
        }
    }

    /// `correct / total`, or exactly `1.0` for an empty set.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn score(&self) -> f64 {
        if self.expected.is_empty() {
            1.0
        } else {
            self.correct as f64 / self.expected.len() as f64
        }
    }

    #[must_use]
    pub fn answer(&self, key: &K) -> Option<&str> {
        self.answers.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.expected.len()
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.correct
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.answers.len() == self.expected.len()
    }

    /// Drop every recorded answer; the question set is kept.
    pub fn reset(&mut self) {
        self.answers.clear();
        self.correct = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_questions() -> QuizSet<usize> {
        QuizSet::new([(0, "Haus"), (1, "Schule")])
    }

    #[test]
    fn empty_set_scores_one() {
        let quiz: QuizSet<usize> = QuizSet::default();
        assert_eq!(quiz.score(), 1.0);
        assert!(quiz.is_complete());
    }

    #[test]
    fn counts_correct_answers() {
        let mut quiz = two_questions();
        assert_eq!(quiz.record_answer(0, "Haus"), AnswerOutcome::Correct);
        assert_eq!(quiz.score(), 0.5);
        assert_eq!(quiz.record_answer(1, "Baum"), AnswerOutcome::Incorrect);
        assert_eq!(quiz.score(), 0.5);
        assert!(quiz.is_complete());
    }

    #[test]
    fn second_answer_never_overwrites_the_first() {
        let mut quiz = two_questions();
        assert_eq!(quiz.record_answer(0, "Baum"), AnswerOutcome::Incorrect);
        assert_eq!(quiz.record_answer(0, "Haus"), AnswerOutcome::AlreadyAnswered);

        assert_eq!(quiz.answer(&0), Some("Baum"));
        assert_eq!(quiz.correct_count(), 0);

        let mut quiz = two_questions();
        quiz.record_answer(1, "Schule");
        assert_eq!(quiz.record_answer(1, "Baum"), AnswerOutcome::AlreadyAnswered);
        assert_eq!(quiz.answer(&1), Some("Schule"));
        assert_eq!(quiz.correct_count(), 1);
    }

    #[test]
    fn unknown_key_is_rejected() {
        let mut quiz = two_questions();
        assert_eq!(quiz.record_answer(7, "Haus"), AnswerOutcome::UnknownQuestion);
        assert_eq!(quiz.answered_count(), 0);
    }

    #[test]
    fn reset_clears_answers_and_count() {
        let mut quiz = two_questions();
        quiz.record_answer(0, "Haus");
        quiz.reset();

        assert_eq!(quiz.answered_count(), 0);
        assert_eq!(quiz.correct_count(), 0);
        assert_eq!(quiz.score(), 0.0);
        assert_eq!(quiz.record_answer(0, "Haus"), AnswerOutcome::Correct);
    }
}
