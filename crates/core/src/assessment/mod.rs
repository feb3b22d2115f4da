//! Quiz scoring and free-text output checks.

mod day_quizzes;
mod output;
mod quiz;

pub use day_quizzes::{DayQuizzes, QuizScores};
pub use output::{OutputReport, count_sentences, evaluate_output};
pub use quiz::{AnswerOutcome, QuizSet};
