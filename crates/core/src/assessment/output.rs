use crate::model::{OutputRules, PassRules, VocabEntry};

/// Every sub-check of one free-text evaluation.
///
/// Always recomputed from scratch; nothing here is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputReport {
    pub characters: usize,
    pub min_characters: usize,
    pub characters_ok: bool,

    pub sentence_count: usize,
    pub min_sentences: usize,
    pub sentences_ok: bool,

    /// First required keyword found in the text, if any.
    pub matched_keyword: Option<String>,
    pub keyword_ok: bool,

    /// One entry per required pattern, in authored order.
    pub pattern_results: Vec<bool>,
    /// Indexes of patterns that failed to compile and were treated as satisfied.
    pub invalid_patterns: Vec<usize>,
    pub patterns_ok: bool,

    pub vocab_used: usize,
    pub min_vocab_used: usize,
    pub vocab_ok: bool,

    pub passed: bool,
}

/// Evaluate free text against a day's output and pass rules.
///
/// Keyword and vocabulary checks are case-insensitive *substring* tests, not
/// whole-word matches: a short term inside a longer word counts. Entries are
/// matched exactly as authored, surrounding spaces included; blank entries
/// are ignored.
#[must_use]
pub fn evaluate_output(
    text: &str,
    rules: &OutputRules,
    pass: &PassRules,
    vocabulary: &[VocabEntry],
) -> OutputReport {
    let lowered = text.to_lowercase();

    let characters = text.trim().chars().count();
    let characters_ok = characters >= pass.min_output_characters;

    let sentence_count = count_sentences(text);
    let sentences_ok = sentence_count >= rules.min_sentence_count;

    let keywords: Vec<&String> = rules
        .required_any_keyword
        .iter()
        .filter(|k| !k.trim().is_empty())
        .collect();
    let matched_keyword = keywords
        .iter()
        .find(|k| lowered.contains(&k.to_lowercase()))
        .map(|k| (*k).clone());
    let keyword_ok = keywords.is_empty() || matched_keyword.is_some();

    let mut invalid_patterns = Vec::new();
    let pattern_results: Vec<bool> = rules
        .compiled_patterns()
        .enumerate()
        .map(|(index, compiled)| match compiled {
            Ok(re) => re.is_match(text),
            Err(err) => {
                tracing::warn!(index, error = %err, "invalid output pattern treated as satisfied");
                invalid_patterns.push(index);
                true
            }
        })
        .collect();
    let patterns_ok = pattern_results.iter().all(|ok| *ok);

    let vocab_used = vocabulary
        .iter()
        .map(|entry| entry.term.as_str())
        .filter(|term| !term.trim().is_empty() && lowered.contains(&term.to_lowercase()))
        .count();
    let vocab_ok = vocab_used >= rules.min_vocab_usage_count;

    let passed = characters_ok && sentences_ok && keyword_ok && patterns_ok && vocab_ok;

    OutputReport {
        characters,
        min_characters: pass.min_output_characters,
        characters_ok,
        sentence_count,
        min_sentences: rules.min_sentence_count,
        sentences_ok,
        matched_keyword,
        keyword_ok,
        pattern_results,
        invalid_patterns,
        patterns_ok,
        vocab_used,
        min_vocab_used: rules.min_vocab_usage_count,
        vocab_ok,
        passed,
    }
}

/// Fragments between runs of `.`, `!`, `?` that are non-blank once trimmed.
#[must_use]
pub fn count_sentences(text: &str) -> usize {
    text.split(['.', '!', '?'])
        .filter(|fragment| !fragment.trim().is_empty())
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHOOL_TEXT: &str = "Ich gehe heute in die Schule. Das macht Spaß.";

    fn school_rules() -> (OutputRules, PassRules, Vec<VocabEntry>) {
        let rules = OutputRules {
            required_any_keyword: vec!["schule".into()],
            required_patterns: Vec::new(),
            min_sentence_count: 2,
            min_vocab_usage_count: 1,
        };
        let pass = PassRules {
            min_output_characters: 10,
            ..PassRules::default()
        };
        let vocab = vec![VocabEntry::new("Schule", "school")];
        (rules, pass, vocab)
    }

    #[test]
    fn school_text_passes_every_check() {
        let (rules, pass, vocab) = school_rules();
        let report = evaluate_output(SCHOOL_TEXT, &rules, &pass, &vocab);

        assert_eq!(report.sentence_count, 2);
        assert!(report.keyword_ok);
        assert_eq!(report.matched_keyword.as_deref(), Some("schule"));
        assert_eq!(report.vocab_used, 1);
        assert!(report.patterns_ok);
        assert!(report.passed);
    }

    #[test]
    fn missing_weil_fails_only_the_pattern_check() {
        let (mut rules, pass, vocab) = school_rules();
        let baseline = evaluate_output(SCHOOL_TEXT, &rules, &pass, &vocab);

        rules.required_patterns = vec![r"\bweil\b".into()];
        let report = evaluate_output(SCHOOL_TEXT, &rules, &pass, &vocab);

        assert_eq!(report.pattern_results, vec![false]);
        assert!(!report.patterns_ok);
        assert!(!report.passed);
        assert_eq!(report.characters_ok, baseline.characters_ok);
        assert_eq!(report.sentence_count, baseline.sentence_count);
        assert_eq!(report.keyword_ok, baseline.keyword_ok);
        assert_eq!(report.vocab_used, baseline.vocab_used);
    }

    #[test]
    fn patterns_are_case_insensitive_and_reported_individually() {
        let rules = OutputRules {
            required_patterns: vec![r"\bWEIL\b".into(), r"\bdenn\b".into()],
            ..OutputRules::default()
        };
        let report = evaluate_output(
            "Ich lerne, weil es Spaß macht.",
            &rules,
            &PassRules::default(),
            &[],
        );

        assert_eq!(report.pattern_results, vec![true, false]);
        assert!(!report.patterns_ok);
    }

    #[test]
    fn empty_keyword_list_is_vacuously_satisfied() {
        let rules = OutputRules::default();
        for text in ["", "   ", "irgendwas", "Schule!"] {
            let report = evaluate_output(text, &rules, &PassRules::default(), &[]);
            assert!(report.keyword_ok, "keyword check failed for {text:?}");
            assert!(report.patterns_ok);
        }
    }

    #[test]
    fn sentence_count_collapses_punctuation_runs() {
        assert_eq!(count_sentences("Hallo!!! Wie geht's?! Gut..."), 3);
        assert_eq!(count_sentences("  ...  "), 0);
        assert_eq!(count_sentences("Ohne Punkt"), 1);
    }

    #[test]
    fn vocabulary_matches_inside_longer_words() {
        let rules = OutputRules {
            min_vocab_usage_count: 2,
            ..OutputRules::default()
        };
        let vocab = vec![VocabEntry::new("Tag", "day"), VocabEntry::new("Haus", "house")];
        let report = evaluate_output(
            "Am Dienstag gehe ich nach Hause.",
            &rules,
            &PassRules::default(),
            &vocab,
        );

        assert_eq!(report.vocab_used, 2);
        assert!(report.vocab_ok);
    }

    #[test]
    fn characters_are_counted_after_trimming() {
        let pass = PassRules {
            min_output_characters: 5,
            ..PassRules::default()
        };
        let report = evaluate_output("   Spaß   ", &OutputRules::default(), &pass, &[]);

        assert_eq!(report.characters, 4);
        assert!(!report.characters_ok);
        assert!(!report.passed);
    }

    #[test]
    fn invalid_pattern_is_permissive() {
        let rules = OutputRules {
            required_patterns: vec!["(unclosed".into()],
            ..OutputRules::default()
        };
        let report = evaluate_output("Hallo.", &rules, &PassRules::default(), &[]);

        assert_eq!(report.invalid_patterns, vec![0]);
        assert!(report.patterns_ok);
        assert!(report.passed);
    }

    #[test]
    fn lookaround_pattern_is_reported_and_passes() {
        let rules = OutputRules {
            required_patterns: vec![r"weil(?= ich)".into(), r"\bweil\b".into()],
            ..OutputRules::default()
        };
        let report = evaluate_output("Weil es regnet.", &rules, &PassRules::default(), &[]);

        assert_eq!(report.invalid_patterns, vec![0]);
        assert_eq!(report.pattern_results, vec![true, true]);
        assert!(report.passed);
    }

    #[test]
    fn keywords_keep_authored_spaces() {
        let rules = OutputRules {
            required_any_keyword: vec![" weil ".into(), "   ".into()],
            ..OutputRules::default()
        };
        let pass = PassRules::default();

        let inside = evaluate_output("Ich bleibe, weil ich müde bin.", &rules, &pass, &[]);
        assert_eq!(inside.matched_keyword.as_deref(), Some(" weil "));

        let leading = evaluate_output("Weil ich müde bin.", &rules, &pass, &[]);
        assert!(!leading.keyword_ok);
    }
}
