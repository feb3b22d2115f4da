//! Built-in lessons so the runner is usable without authored content.

use lesson_core::model::{
    DayNumber, DayPlan, GrammarBlock, ListeningBlock, ListeningSegment, OutputRules, PassRules,
    QuizQuestion, VocabEntry,
};

fn strings<const N: usize>(items: [&str; N]) -> Vec<String> {
    items.iter().map(|s| (*s).to_owned()).collect()
}

fn school_day() -> DayPlan {
    DayPlan::new(DayNumber::FIRST, "In der Schule")
        .with_vocabulary(vec![
            VocabEntry::new("Schule", "school"),
            VocabEntry::new("Lehrer", "teacher"),
            VocabEntry::new("Heft", "notebook"),
            VocabEntry::new("lernen", "to learn"),
        ])
        .with_vocab_quiz(vec![
            QuizQuestion::new("school", ["Schule", "Straße", "Stunde"], "Schule"),
            QuizQuestion::new("teacher", ["Lehrer", "Leser", "Läufer"], "Lehrer"),
        ])
        .with_grammar(GrammarBlock {
            title: "Verb an zweiter Stelle".into(),
            rules: strings(["Im Hauptsatz steht das konjugierte Verb an Position 2."]),
            examples: strings(["Heute gehe ich in die Schule.", "Ich gehe heute in die Schule."]),
            quiz: vec![QuizQuestion::new(
                "Heute ___ ich Deutsch.",
                ["lerne", "lernen", "lernst"],
                "lerne",
            )],
        })
        .with_listening(ListeningBlock::new(vec![
            ListeningSegment::new("morning", "Am Morgen", "Anna geht um acht Uhr in die Schule.")
                .with_repeat_count(2)
                .with_quiz(vec![QuizQuestion::new(
                    "Wann geht Anna in die Schule?",
                    ["um acht Uhr", "um neun Uhr"],
                    "um acht Uhr",
                )]),
            ListeningSegment::new("class", "Im Unterricht", "Der Lehrer schreibt an die Tafel."),
        ]))
        .with_output_prompt("Schreibe zwei Sätze über deinen Schultag.")
        .with_output_rules(OutputRules {
            required_any_keyword: strings(["schule", "lehrer"]),
            required_patterns: Vec::new(),
            min_sentence_count: 2,
            min_vocab_usage_count: 1,
        })
        .with_pass_rules(PassRules {
            min_output_characters: 10,
            min_vocab_quiz_ratio: 0.5,
            min_grammar_quiz_ratio: 1.0,
            min_listening_quiz_ratio: 1.0,
        })
}

fn reasons_day() -> DayPlan {
    let day = DayNumber::FIRST.next();
    DayPlan::new(day, "Gründe nennen")
        .with_vocabulary(vec![
            VocabEntry::new("weil", "because"),
            VocabEntry::new("müde", "tired"),
            VocabEntry::new("Wetter", "weather"),
        ])
        .with_vocab_quiz(vec![QuizQuestion::new("tired", ["müde", "mutig"], "müde")])
        .with_grammar(GrammarBlock {
            title: "Nebensatz mit weil".into(),
            rules: strings(["Nach \"weil\" steht das Verb am Ende."]),
            examples: strings(["Ich bleibe zu Hause, weil ich müde bin."]),
            quiz: vec![QuizQuestion::new(
                "Ich komme nicht, weil ich krank ___.",
                ["bin", "sein"],
                "bin",
            )],
        })
        .with_listening(ListeningBlock::new(vec![ListeningSegment::new(
            "weather",
            "Das Wetter",
            "Wir gehen nicht spazieren, weil das Wetter schlecht ist.",
        )
        .with_quiz(vec![QuizQuestion::new(
            "Warum gehen sie nicht spazieren?",
            ["Das Wetter ist schlecht.", "Sie sind müde."],
            "Das Wetter ist schlecht.",
        )])]))
        .with_output_prompt("Warum lernst du Deutsch? Antworte mit weil.")
        .with_output_rules(OutputRules {
            required_any_keyword: Vec::new(),
            required_patterns: strings([r"\bweil\b"]),
            min_sentence_count: 2,
            min_vocab_usage_count: 1,
        })
        .with_pass_rules(PassRules {
            min_output_characters: 20,
            min_vocab_quiz_ratio: 1.0,
            min_grammar_quiz_ratio: 1.0,
            min_listening_quiz_ratio: 1.0,
        })
}

/// Two German starter days.
#[must_use]
pub fn seed_days() -> Vec<DayPlan> {
    vec![school_day(), reasons_day()]
}
