//! Picks a single "action" word out of a generated caption.
//!
//! Heuristic, in priority order:
//! 1. first word ending in "ing" (progressive verbs: "running", "jumping")
//! 2. first word longer than two characters that is not a stopword
//! 3. the second word, if there is one
//! 4. "Unknown"
//!
//! There is no part-of-speech tagging here; the result is only guaranteed to
//! be deterministic for a given caption and stoplist.

use std::collections::HashSet;

/// Returned when no rule matches.
pub const UNKNOWN_ACTION: &str = "Unknown";

/// Articles, number words and common subject nouns that precede the verb in
/// typical captions.
const STOPWORDS: &[&str] = &[
    "a", "an", "the", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "people", "person", "persons", "man", "men", "woman", "women", "boy", "boys", "girl", "girls",
    "child", "children", "kid", "kids", "dog", "dogs", "cat", "cats", "staged", "player",
    "players", "athlete", "athletes", "someone",
];

/// Action extractor with a configurable stoplist.
#[derive(Debug, Clone)]
pub struct ActionExtractor {
    stopwords: HashSet<String>,
}

impl Default for ActionExtractor {
    fn default() -> Self {
        Self::new(std::iter::empty::<&str>())
    }
}

impl ActionExtractor {
    /// Built-in stoplist plus `extra` words (matched case-insensitively).
    pub fn new<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let stopwords = STOPWORDS
            .iter()
            .map(|w| w.to_string())
            .chain(extra.into_iter().map(|w| w.as_ref().to_lowercase()))
            .collect();
        Self { stopwords }
    }

    /// Pick the action word for a caption.
    pub fn extract(&self, caption: &str) -> String {
        let words: Vec<&str> = caption.split_whitespace().collect();

        if let Some(word) = words.iter().find(|w| w.to_lowercase().ends_with("ing")) {
            return capitalize(word);
        }

        if let Some(word) = words
            .iter()
            .find(|w| w.chars().count() > 2 && !self.stopwords.contains(&w.to_lowercase()))
        {
            return capitalize(word);
        }

        match words.get(1) {
            Some(word) => capitalize(word),
            None => UNKNOWN_ACTION.to_string(),
        }
    }
}

/// Extract an action with the default stoplist.
pub fn extract_action(caption: &str) -> String {
    ActionExtractor::default().extract(caption)
}

/// Uppercase the first character and lowercase the rest.
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ing_word_wins() {
        assert_eq!(extract_action("a man running quickly"), "Running");
    }

    #[test]
    fn test_ing_word_wins_over_earlier_candidate() {
        assert_eq!(extract_action("brown dog is jumping"), "Jumping");
    }

    #[test]
    fn test_ing_suffix_case_insensitive() {
        assert_eq!(extract_action("a man SWIMMING"), "Swimming");
    }

    #[test]
    fn test_stoplist_skipped() {
        assert_eq!(extract_action("two dogs fight"), "Fight");
        assert_eq!(extract_action("The Woman sits"), "Sits");
    }

    #[test]
    fn test_second_word_fallback() {
        // Every word is either short or a stopword.
        assert_eq!(extract_action("a dog"), "Dog");
    }

    #[test]
    fn test_single_word_unknown() {
        assert_eq!(extract_action("a"), "Unknown");
        assert_eq!(extract_action(""), "Unknown");
    }

    #[test]
    fn test_extra_stopwords() {
        let extractor = ActionExtractor::new(["Surfer"]);
        assert_eq!(extractor.extract("surfer rides wave"), "Rides");
        assert_eq!(extract_action("surfer rides wave"), "Surfer");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("rUNNING"), "Running");
        assert_eq!(capitalize("élan"), "Élan");
        assert_eq!(capitalize(""), "");
    }
}
