//! Word⇄index vocabulary built from a caption corpus.
//!
//! Indices are assigned by descending word frequency starting at 1; index 0
//! is reserved for padding. Words of equal frequency keep the order in which
//! they were first seen. Both directions of the mapping are built once, so
//! decoding never scans the table.

mod corpus;

pub use corpus::{normalize_caption, CaptionCorpus, CorpusRecord, Normalization};

use std::collections::HashMap;
use std::path::Path;

use crate::error::ConfigError;

/// Marker prepended to every caption and used to seed decoding.
pub const START_MARKER: &str = "startseq";

/// Marker appended to every caption; decoding stops when it is produced.
pub const END_MARKER: &str = "endseq";

/// Characters replaced by a space before splitting text into words.
const TOKEN_FILTERS: &str = "!\"#$%&()*+,-./:;<=>?@[\\]^_`{|}~\t\n";

/// Immutable bidirectional word⇄index table.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    /// `words[i]` is the word with index `i + 1`
    words: Vec<String>,
    by_word: HashMap<String, u32>,
    start_id: u32,
    end_id: u32,
}

impl Vocabulary {
    /// Build the vocabulary from a corpus file.
    pub fn from_corpus_file(path: &Path, normalization: Normalization) -> Result<Self, ConfigError> {
        let corpus = CaptionCorpus::load(path, normalization)?;
        let vocab = Self::fit(corpus.captions()).ok_or_else(|| ConfigError::InvalidCorpus {
            path: path.to_path_buf(),
            message: "no captions found".to_string(),
        })?;

        tracing::info!(
            "Built vocabulary: {} words from {} images ({:?} normalization)",
            vocab.len(),
            corpus.len(),
            normalization,
        );

        Ok(vocab)
    }

    /// Fit a vocabulary over marker-wrapped captions.
    ///
    /// Returns `None` when the captions never mention both markers, which
    /// only happens for an empty corpus.
    pub fn fit<'a, I>(captions: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut counts: Vec<(String, usize)> = Vec::new();
        let mut seen: HashMap<String, usize> = HashMap::new();

        for caption in captions {
            for word in tokenize(caption) {
                match seen.get(&word) {
                    Some(&slot) => counts[slot].1 += 1,
                    None => {
                        seen.insert(word.clone(), counts.len());
                        counts.push((word, 1));
                    }
                }
            }
        }

        // Stable sort keeps first-seen order among equal counts.
        counts.sort_by(|a, b| b.1.cmp(&a.1));

        let words: Vec<String> = counts.into_iter().map(|(w, _)| w).collect();
        Self::from_words(words)
    }

    /// Build from words already in index order (index 1 first).
    ///
    /// Returns `None` if either marker is missing or a word repeats.
    pub fn from_words(words: Vec<String>) -> Option<Self> {
        let mut by_word = HashMap::with_capacity(words.len());
        for (i, word) in words.iter().enumerate() {
            if by_word.insert(word.clone(), i as u32 + 1).is_some() {
                return None;
            }
        }

        let start_id = *by_word.get(START_MARKER)?;
        let end_id = *by_word.get(END_MARKER)?;

        Some(Self {
            words,
            by_word,
            start_id,
            end_id,
        })
    }

    /// Number of words (index 0 excluded).
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the vocabulary holds no words. Never true for a built vocabulary.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Number of addressable indices including the reserved 0.
    ///
    /// This is the width of the decoder's output distribution.
    pub fn cardinality(&self) -> usize {
        self.words.len() + 1
    }

    /// Index of a word.
    pub fn index_of(&self, word: &str) -> Option<u32> {
        self.by_word.get(word).copied()
    }

    /// Word at an index. Index 0 and out-of-range indices map to nothing.
    pub fn word(&self, index: u32) -> Option<&str> {
        let slot = (index as usize).checked_sub(1)?;
        self.words.get(slot).map(String::as_str)
    }

    /// Index of the start marker.
    pub fn start_id(&self) -> u32 {
        self.start_id
    }

    /// Index of the end marker.
    pub fn end_id(&self) -> u32 {
        self.end_id
    }

    /// Words in index order, most frequent first.
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Compute a BLAKE3 hash of all words in index order.
    ///
    /// Two vocabularies hash equal exactly when they assign the same indices,
    /// which is what a decoder's weights depend on.
    pub fn content_hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for word in &self.words {
            hasher.update(word.as_bytes());
            hasher.update(b"\n");
        }
        hasher.finalize().to_hex().to_string()
    }
}

/// Split text into words: lowercase, replace filter characters with spaces,
/// split on spaces, drop empties.
pub fn tokenize(text: &str) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| if TOKEN_FILTERS.contains(c) { ' ' } else { c })
        .collect();
    cleaned
        .split(' ')
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}
