//! Caption corpus parsing and normalization.
//!
//! The corpus is a CSV-like text file: one header line, then
//! `image_file,caption` per line. Captions may themselves contain commas;
//! every field after the first is rejoined with a single space.

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

use super::{END_MARKER, START_MARKER};

static NON_ALPHA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z\s]").expect("static regex"));
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static regex"));

/// How raw captions are cleaned before tokenization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Normalization {
    /// Treat `[^A-Za-z]` and `\s+` as literal substrings, after lowercasing.
    /// In practice neither ever matches, so captions pass through unchanged.
    /// The published decoder weights were trained on this vocabulary.
    #[default]
    Literal,
    /// Drop everything except ASCII letters and whitespace, then collapse
    /// whitespace runs.
    Pattern,
}

impl Normalization {
    /// Normalize an already-lowercased caption.
    pub fn apply(self, caption: &str) -> String {
        match self {
            Normalization::Literal => caption.replace("[^A-Za-z]", "").replace("\\s+", " "),
            Normalization::Pattern => {
                let letters = NON_ALPHA.replace_all(caption, "");
                WHITESPACE_RUN.replace_all(&letters, " ").into_owned()
            }
        }
    }
}

/// All captions for one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusRecord {
    /// Image file name without its extension
    pub image_id: String,
    /// Normalized captions wrapped in start/end markers
    pub captions: Vec<String>,
}

/// Parsed caption corpus, records in order of first appearance.
#[derive(Debug, Default)]
pub struct CaptionCorpus {
    records: Vec<CorpusRecord>,
    by_id: HashMap<String, usize>,
}

impl CaptionCorpus {
    /// Read and parse a corpus file.
    pub fn load(path: &Path, normalization: Normalization) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::CorpusNotFound(path.to_path_buf()));
        }
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::InvalidCorpus {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        Ok(Self::parse(&content, normalization))
    }

    /// Parse corpus text. The first line is a header and is always skipped.
    pub fn parse(content: &str, normalization: Normalization) -> Self {
        let mut corpus = Self::default();
        let body = content.split_once('\n').map(|(_, rest)| rest).unwrap_or("");

        for line in body.split('\n') {
            if line.chars().count() < 2 {
                continue;
            }
            let mut fields = line.split(',');
            let file_name = fields.next().unwrap_or_default();
            let image_id = file_name.split('.').next().unwrap_or_default();
            let raw = fields.collect::<Vec<_>>().join(" ");
            corpus.push(image_id, normalize_caption(&raw, normalization));
        }

        corpus
    }

    fn push(&mut self, image_id: &str, caption: String) {
        let slot = match self.by_id.get(image_id) {
            Some(&i) => i,
            None => {
                self.records.push(CorpusRecord {
                    image_id: image_id.to_string(),
                    captions: Vec::new(),
                });
                self.by_id.insert(image_id.to_string(), self.records.len() - 1);
                self.records.len() - 1
            }
        };
        self.records[slot].captions.push(caption);
    }

    /// Records in order of first appearance.
    pub fn records(&self) -> &[CorpusRecord] {
        &self.records
    }

    /// Captions for one image.
    pub fn get(&self, image_id: &str) -> Option<&[String]> {
        self.by_id
            .get(image_id)
            .map(|&i| self.records[i].captions.as_slice())
    }

    /// Every caption, record by record.
    pub fn captions(&self) -> impl Iterator<Item = &str> {
        self.records
            .iter()
            .flat_map(|r| r.captions.iter().map(String::as_str))
    }

    /// Number of distinct images.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the corpus has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Lowercase, normalize, drop single-character tokens and wrap in markers.
pub fn normalize_caption(raw: &str, normalization: Normalization) -> String {
    let cleaned = normalization.apply(&raw.to_lowercase());
    let words: Vec<&str> = cleaned
        .split_whitespace()
        .filter(|w| w.chars().count() > 1)
        .collect();
    format!("{START_MARKER} {} {END_MARKER}", words.join(" "))
}
