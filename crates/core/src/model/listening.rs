use serde::{Deserialize, Serialize};

use crate::model::{ListeningKey, QuizQuestion};

/// One narrated listening passage with its own questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListeningSegment {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub text: String,
    #[serde(default = "default_repeat_count")]
    pub repeat_count: u32,
    #[serde(default)]
    pub quiz: Vec<QuizQuestion>,
}

fn default_repeat_count() -> u32 {
    1
}

impl ListeningSegment {
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            text: text.into(),
            repeat_count: 1,
            quiz: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_repeat_count(mut self, repeat_count: u32) -> Self {
        self.repeat_count = repeat_count;
        self
    }

    #[must_use]
    pub fn with_quiz(mut self, quiz: Vec<QuizQuestion>) -> Self {
        self.quiz = quiz;
        self
    }

    /// How many times the passage is narrated; authored zeros play once.
    #[must_use]
    pub fn plays(&self) -> u32 {
        self.repeat_count.max(1)
    }

    /// Narration chunks for this segment: its text, once per play.
    #[must_use]
    pub fn narration_chunks(&self) -> Vec<String> {
        (0..self.plays()).map(|_| self.text.clone()).collect()
    }
}

/// Authored listening payload in either of its accepted shapes.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawListening {
    Segmented {
        segments: Vec<ListeningSegment>,
    },
    Legacy {
        text: String,
        #[serde(default)]
        quiz: Vec<QuizQuestion>,
    },
}

impl From<RawListening> for ListeningBlock {
    fn from(raw: RawListening) -> Self {
        match raw {
            RawListening::Segmented { segments } => Self { segments },
            RawListening::Legacy { text, quiz } => Self {
                segments: vec![ListeningSegment::new("main", "", text).with_quiz(quiz)],
            },
        }
    }
}

/// Listening block, always held as an ordered segment list.
///
/// The legacy single `{ text, quiz }` shape is folded into one segment when
/// deserialized, so nothing downstream branches on the authored shape.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "RawListening")]
pub struct ListeningBlock {
    pub segments: Vec<ListeningSegment>,
}

/// Read-only view of one listening question under its composite key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlattenedListeningQuestion<'a> {
    pub key: ListeningKey,
    pub segment: &'a ListeningSegment,
    pub question: &'a QuizQuestion,
}

impl ListeningBlock {
    #[must_use]
    pub fn new(segments: Vec<ListeningSegment>) -> Self {
        Self { segments }
    }

    #[must_use]
    pub fn segment(&self, index: usize) -> Option<&ListeningSegment> {
        self.segments.get(index)
    }

    /// All questions in segment order, then in-segment order.
    #[must_use]
    pub fn flattened(&self) -> Vec<FlattenedListeningQuestion<'_>> {
        self.segments
            .iter()
            .enumerate()
            .flat_map(|(segment_index, segment)| {
                segment
                    .quiz
                    .iter()
                    .enumerate()
                    .map(move |(question_index, question)| FlattenedListeningQuestion {
                        key: ListeningKey::new(segment_index, question_index),
                        segment,
                        question,
                    })
            })
            .collect()
    }

    /// Narration chunks for every segment, concatenated in order.
    #[must_use]
    pub fn narration_chunks(&self) -> Vec<String> {
        self.segments
            .iter()
            .flat_map(ListeningSegment::narration_chunks)
            .collect()
    }
}
