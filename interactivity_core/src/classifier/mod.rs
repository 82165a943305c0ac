//! Content classifiers used by the rule engine and the sequence optimizer.
//!
//! Classification is heuristic. Everything downstream depends only on the
//! [`ContentClassifier`] trait, so the keyword tables here can be replaced by a
//! different implementation without touching rules or ordering.

use serde::{Deserialize, Serialize};
use storyboard_rules::BloomLevel;

/// Content traits that pedagogical rules react to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentTraits {
    pub emotional: bool,
    pub procedural: bool,
    pub categorization: bool,
    pub attitudinal: bool,
    pub sequential: bool,
}

/// Classifies free text for rule triggers and Bloom ordering.
pub trait ContentClassifier: Send + Sync {
    /// Content traits present in `text`.
    fn classify(&self, text: &str) -> ContentTraits;

    /// Best-guess Bloom level of an outcome or scene text, `None` if nothing matched.
    fn infer_bloom_level(&self, text: &str) -> Option<BloomLevel>;
}

const EMOTIONAL: &[&str] = &[
    "anger", "angry", "anxi", "confiden", "emotion", "empath", "fear", "feel", "frustrat",
    "motivat", "stress", "upset", "worr",
];

const PROCEDURAL: &[&str] = &[
    "button", "click", "configur", "install", "log in", "login", "menu", "navigat",
    "procedure", "step-by-step", "submit",
];

const CATEGORIZATION: &[&str] = &[
    "categor", "classif", "group", "kinds of", "sort", "type of", "types of",
];

const ATTITUDINAL: &[&str] = &[
    "attitude", "belief", "bias", "culture", "ethic", "inclusi", "integrity", "mindset",
    "respect", "values",
];

const SEQUENTIAL: &[&str] = &[
    "afterwards", "finally", "first", "next", "order", "phase", "process", "sequence",
    "stage", "then", "workflow",
];

/// Distinct sequence markers needed before text counts as a process description.
const SEQUENTIAL_MIN_HITS: usize = 2;

const BLOOM_KEYWORDS: [(BloomLevel, &[&str]); 6] = [
    (
        BloomLevel::Remember,
        &["defin", "identif", "memori", "recall", "recogni", "terminolog"],
    ),
    (
        BloomLevel::Understand,
        &["classif", "describ", "explain", "interpret", "summar", "understand"],
    ),
    (
        BloomLevel::Apply,
        &["appli", "apply", "demonstrat", "implement", "perform", "practic", "solv", "using"],
    ),
    (
        BloomLevel::Analyze,
        &["analy", "compar", "contrast", "differentiat", "distinguish", "examin", "investigat"],
    ),
    (
        BloomLevel::Evaluate,
        &["assess", "critiqu", "decid", "evaluat", "judg", "justif", "priorit", "recommend"],
    ),
    (
        BloomLevel::Create,
        &["compos", "construct", "creat", "design", "develop", "formulat", "invent"],
    ),
];

/// Keyword-table classifier. Single-word entries match word prefixes; entries with
/// a space or hyphen match anywhere in the text.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    /// Create a classifier over the built-in keyword tables.
    pub fn new() -> Self {
        Self
    }
}

impl ContentClassifier for KeywordClassifier {
    fn classify(&self, text: &str) -> ContentTraits {
        let text = Text::new(text);
        ContentTraits {
            emotional: text.hits(EMOTIONAL) > 0,
            procedural: text.hits(PROCEDURAL) > 0,
            categorization: text.hits(CATEGORIZATION) > 0,
            attitudinal: text.hits(ATTITUDINAL) > 0,
            sequential: text.hits(SEQUENTIAL) >= SEQUENTIAL_MIN_HITS,
        }
    }

    /// The level with the most keyword hits; ties go to the higher level.
    fn infer_bloom_level(&self, text: &str) -> Option<BloomLevel> {
        let text = Text::new(text);
        BLOOM_KEYWORDS
            .iter()
            .map(|(level, keywords)| (*level, text.hits(keywords)))
            .filter(|(_, hits)| *hits > 0)
            .max_by_key(|(level, hits)| (*hits, *level))
            .map(|(level, _)| level)
    }
}

/// Lowercased text plus its words.
struct Text {
    lowered: String,
    words: Vec<String>,
}

impl Text {
    fn new(text: &str) -> Self {
        let lowered = text.to_lowercase();
        let words = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect();
        Self { lowered, words }
    }

    /// Number of distinct keywords present.
    fn hits(&self, keywords: &[&str]) -> usize {
        keywords.iter().filter(|kw| self.contains(kw)).count()
    }

    fn contains(&self, keyword: &str) -> bool {
        if keyword.contains([' ', '-']) {
            self.lowered.contains(keyword)
        } else {
            self.words.iter().any(|w| w.starts_with(keyword))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_traits() {
        let classifier = KeywordClassifier::new();

        let traits = classifier.classify("Customers often feel frustrated when calls are dropped.");
        assert!(traits.emotional);
        assert!(!traits.procedural);

        let traits = classifier.classify("Click the Submit button, then open the Settings menu.");
        assert!(traits.procedural);

        let traits = classifier.classify("Sort each expense into one of three categories.");
        assert!(traits.categorization);

        let traits = classifier.classify("Respect and integrity shape our culture.");
        assert!(traits.attitudinal);
    }

    #[test]
    fn test_sequential_needs_two_markers() {
        let classifier = KeywordClassifier::new();
        assert!(!classifier.classify("First, a word about safety.").sequential);
        assert!(classifier
            .classify("First gather the receipts, then file the claim, finally wait.")
            .sequential);
    }

    #[test]
    fn test_plain_text_has_no_traits() {
        let traits = KeywordClassifier::new().classify("The office opens at nine.");
        assert_eq!(traits, ContentTraits::default());
    }

    #[test]
    fn test_infer_bloom_level() {
        let classifier = KeywordClassifier::new();
        assert_eq!(
            classifier.infer_bloom_level("Define the key terminology"),
            Some(BloomLevel::Remember)
        );
        assert_eq!(
            classifier.infer_bloom_level("Apply the checklist to a new supplier"),
            Some(BloomLevel::Apply)
        );
        assert_eq!(
            classifier.infer_bloom_level("Evaluate and justify the vendor choice"),
            Some(BloomLevel::Evaluate)
        );
        assert_eq!(
            classifier.infer_bloom_level("Design a rollout plan"),
            Some(BloomLevel::Create)
        );
        assert_eq!(classifier.infer_bloom_level("Lunch is at noon"), None);
    }

    #[test]
    fn test_bloom_ties_go_to_higher_level() {
        // One Understand hit and one Analyze hit.
        assert_eq!(
            KeywordClassifier::new().infer_bloom_level("Explain and compare the options"),
            Some(BloomLevel::Analyze)
        );
    }
}
