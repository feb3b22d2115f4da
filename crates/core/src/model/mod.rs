mod day_plan;
mod ids;
mod lenient;
mod listening;
mod progress;
mod speech_settings;

pub use day_plan::{
    DayPlan, DayPlanError, GrammarBlock, OutputBlock, OutputRules, PassRules, QuizQuestion,
    VocabEntry,
};
pub use ids::{DayNumber, InvalidDayNumber, ListeningKey};
pub use listening::{FlattenedListeningQuestion, ListeningBlock, ListeningSegment};
pub use progress::{Mode, Progress};
pub use speech_settings::{SpeechSettings, SpeechSettingsDraft};
