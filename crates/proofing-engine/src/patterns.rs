//! Phrase tables and scan helpers for the style heuristics.

use lazy_static::lazy_static;
use regex::Regex;

/// Wordy constructions and their plain replacements.
pub const WORDY_PHRASES: &[(&str, &str)] = &[
    ("in order to", "to"),
    ("due to the fact that", "because"),
    ("at this point in time", "now"),
    ("utilize", "use"),
];

lazy_static! {
    /// One case-insensitive, word-bounded pattern per wordy phrase.
    static ref WORDY_PATTERNS: Vec<(Regex, &'static str, &'static str)> = WORDY_PHRASES
        .iter()
        .map(|&(phrase, replacement)| {
            let pattern = format!(r"(?i)\b{}\b", regex::escape(phrase));
            (Regex::new(&pattern).unwrap(), phrase, replacement)
        })
        .collect();
}

/// A single wordy-construction occurrence, byte offsets into the scanned
/// text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordyMatch {
    pub start: usize,
    pub end: usize,
    pub phrase: &'static str,
    pub replacement: &'static str,
}

/// Scan `text` for every wordy-construction occurrence.
pub fn find_wordy_phrases(text: &str) -> Vec<WordyMatch> {
    let mut matches = Vec::new();
    for &(ref regex, phrase, replacement) in WORDY_PATTERNS.iter() {
        for m in regex.find_iter(text) {
            matches.push(WordyMatch {
                start: m.start(),
                end: m.end(),
                phrase,
                replacement,
            });
        }
    }
    matches
}
