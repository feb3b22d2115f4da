use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::lenient;
use crate::model::{DayNumber, ListeningBlock};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DayPlanError {
    #[error("day {day} has an empty topic")]
    EmptyTopic { day: DayNumber },

    #[error("day {day}: {set} question {index} has no choices")]
    NoChoices {
        day: DayNumber,
        set: &'static str,
        index: usize,
    },

    #[error("day {day}: {set} question {index} expects {expected:?}, which is not one of its choices")]
    CorrectChoiceMissing {
        day: DayNumber,
        set: &'static str,
        index: usize,
        expected: String,
    },

    #[error("day {day}: output pattern {index} ({pattern:?}) does not compile: {reason}")]
    InvalidPattern {
        day: DayNumber,
        index: usize,
        pattern: String,
        reason: String,
    },
}

/// A target-language term and its gloss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabEntry {
    pub term: String,
    #[serde(default)]
    pub gloss: String,
}

impl VocabEntry {
    #[must_use]
    pub fn new(term: impl Into<String>, gloss: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            gloss: gloss.into(),
        }
    }
}

/// Multiple-choice question; the correct choice is stored by its text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub prompt: String,
    pub choices: Vec<String>,
    pub correct_choice: String,
}

impl QuizQuestion {
    #[must_use]
    pub fn new<I, S>(prompt: impl Into<String>, choices: I, correct_choice: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prompt: prompt.into(),
            choices: choices.into_iter().map(Into::into).collect(),
            correct_choice: correct_choice.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GrammarBlock {
    pub title: String,
    pub rules: Vec<String>,
    pub examples: Vec<String>,
    pub quiz: Vec<QuizQuestion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputBlock {
    pub prompt: String,
}

/// Composable checks applied to the learner's free-text output.
///
/// Every field is optional in authored content; absent or malformed fields
/// fall back to the vacuously satisfied default.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputRules {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub required_any_keyword: Vec<String>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub required_patterns: Vec<String>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub min_sentence_count: usize,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub min_vocab_usage_count: usize,
}

/// Thresholds the day gate compares scores against.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassRules {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub min_output_characters: usize,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub min_vocab_quiz_ratio: f64,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub min_grammar_quiz_ratio: f64,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub min_listening_quiz_ratio: f64,
}

impl OutputRules {
    /// Each required pattern compiled case-insensitively, in authored order.
    pub fn compiled_patterns(&self) -> impl Iterator<Item = Result<Regex, regex::Error>> + '_ {
        self.required_patterns
            .iter()
            .map(|pattern| RegexBuilder::new(pattern).case_insensitive(true).build())
    }
}

fn default_target_language() -> String {
    "de".to_owned()
}

/// Immutable content bundle for one lesson day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayPlan {
    pub day: DayNumber,
    pub topic: String,
    #[serde(default = "default_target_language")]
    pub target_language: String,
    #[serde(default)]
    pub vocabulary: Vec<VocabEntry>,
    #[serde(default)]
    pub vocab_quiz: Vec<QuizQuestion>,
    #[serde(default)]
    pub grammar: GrammarBlock,
    #[serde(default)]
    pub listening: ListeningBlock,
    #[serde(default)]
    pub output: OutputBlock,
    #[serde(default)]
    pub output_rules: OutputRules,
    #[serde(default)]
    pub pass_rules: PassRules,
}

impl DayPlan {
    /// An empty plan for `day`; fill blocks with the `with_*` builders.
    #[must_use]
    pub fn new(day: DayNumber, topic: impl Into<String>) -> Self {
        Self {
            day,
            topic: topic.into(),
            target_language: default_target_language(),
            vocabulary: Vec::new(),
            vocab_quiz: Vec::new(),
            grammar: GrammarBlock::default(),
            listening: ListeningBlock::default(),
            output: OutputBlock::default(),
            output_rules: OutputRules::default(),
            pass_rules: PassRules::default(),
        }
    }

    #[must_use]
    pub fn with_vocabulary(mut self, vocabulary: Vec<VocabEntry>) -> Self {
        self.vocabulary = vocabulary;
        self
    }

    #[must_use]
    pub fn with_vocab_quiz(mut self, quiz: Vec<QuizQuestion>) -> Self {
        self.vocab_quiz = quiz;
        self
    }

    #[must_use]
    pub fn with_grammar(mut self, grammar: GrammarBlock) -> Self {
        self.grammar = grammar;
        self
    }

    #[must_use]
    pub fn with_listening(mut self, listening: ListeningBlock) -> Self {
        self.listening = listening;
        self
    }

    #[must_use]
    pub fn with_output_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.output.prompt = prompt.into();
        self
    }

    #[must_use]
    pub fn with_output_rules(mut self, rules: OutputRules) -> Self {
        self.output_rules = rules;
        self
    }

    #[must_use]
    pub fn with_pass_rules(mut self, rules: PassRules) -> Self {
        self.pass_rules = rules;
        self
    }

    /// Check authored content for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns `DayPlanError` if the topic is blank, an output pattern does
    /// not compile, or a quiz question's correct choice is not among its
    /// choices.
    pub fn validate(&self) -> Result<(), DayPlanError> {
        if self.topic.trim().is_empty() {
            return Err(DayPlanError::EmptyTopic { day: self.day });
        }
        for (index, compiled) in self.output_rules.compiled_patterns().enumerate() {
            if let Err(err) = compiled {
                return Err(DayPlanError::InvalidPattern {
                    day: self.day,
                    index,
                    pattern: self.output_rules.required_patterns[index].clone(),
                    reason: err.to_string(),
                });
            }
        }
        self.validate_quiz("vocabulary", &self.vocab_quiz)?;
        self.validate_quiz("grammar", &self.grammar.quiz)?;
        for segment in &self.listening.segments {
            self.validate_quiz("listening", &segment.quiz)?;
        }
        Ok(())
    }

    fn validate_quiz(&self, set: &'static str, quiz: &[QuizQuestion]) -> Result<(), DayPlanError> {
        for (index, question) in quiz.iter().enumerate() {
            if question.choices.is_empty() {
                return Err(DayPlanError::NoChoices {
                    day: self.day,
                    set,
                    index,
                });
            }
            if !question.choices.contains(&question.correct_choice) {
                return Err(DayPlanError::CorrectChoiceMissing {
                    day: self.day,
                    set,
                    index,
                    expected: question.correct_choice.clone(),
                });
            }
        }
        Ok(())
    }
}
