//! Dictionary-backed spell checking over the token stream.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use shared_types::{Category, Finding, MAX_SUGGESTIONS};

use crate::detectors::Detector;
use crate::parse::{ParsedForm, PosTag};

/// Maximum edit distance considered when ranking candidate corrections.
const MAX_EDIT_DISTANCE: usize = 2;

/// A ranked candidate correction from the dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correction {
    pub term: String,
    pub distance: usize,
}

/// Dictionary lookup seam. Given a token, returns ranked candidate
/// corrections; a verbatim (case-insensitive) hit among the candidates
/// means the token is spelled correctly.
pub trait Lexicon: Send + Sync {
    fn lookup(&self, token: &str) -> Vec<Correction>;
}

/// Word-frequency dictionary with edit-distance candidate ranking.
///
/// Loads the common `term count` per-line format. Candidates are ranked by
/// edit distance first, then descending frequency.
#[derive(Debug, Default)]
pub struct FrequencyLexicon {
    words: HashMap<String, u64>,
}

impl FrequencyLexicon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a `term count` per-line dictionary file. Malformed lines are
    /// skipped.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading dictionary {}", path.display()))?;
        let mut lexicon = Self::new();
        for line in content.lines() {
            let mut parts = line.split_whitespace();
            let (Some(term), Some(count)) = (parts.next(), parts.next()) else {
                continue;
            };
            let Ok(count) = count.parse::<u64>() else {
                continue;
            };
            lexicon.insert(term, count);
        }
        Ok(lexicon)
    }

    pub fn insert(&mut self, term: &str, count: u64) {
        self.words.insert(term.to_lowercase(), count);
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for FrequencyLexicon {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut lexicon = Self::new();
        for term in iter {
            lexicon.insert(term.as_ref(), 1);
        }
        lexicon
    }
}

impl Lexicon for FrequencyLexicon {
    fn lookup(&self, token: &str) -> Vec<Correction> {
        let lower = token.to_lowercase();
        if self.words.contains_key(&lower) {
            return vec![Correction {
                term: token.to_string(),
                distance: 0,
            }];
        }

        let mut candidates: Vec<(usize, u64, &str)> = self
            .words
            .iter()
            .filter_map(|(word, frequency)| {
                if word.len().abs_diff(lower.len()) > MAX_EDIT_DISTANCE {
                    return None;
                }
                let distance = strsim::levenshtein(&lower, word);
                (distance <= MAX_EDIT_DISTANCE)
                    .then_some((distance, *frequency, word.as_str()))
            })
            .collect();

        candidates.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)).then(a.2.cmp(b.2)));
        candidates
            .into_iter()
            .map(|(distance, _, term)| Correction {
                term: term.to_string(),
                distance,
            })
            .collect()
    }
}

/// Spell checker: walks the token stream, skipping tokens the dictionary
/// has no business judging (URLs, emails, proper nouns, punctuation), and
/// reports tokens the lexicon cannot confirm.
pub struct SpellingDetector {
    lexicon: Arc<dyn Lexicon>,
}

impl SpellingDetector {
    pub fn new(lexicon: Arc<dyn Lexicon>) -> Self {
        Self { lexicon }
    }
}

#[async_trait]
impl Detector for SpellingDetector {
    async fn detect(&self, _text: &str, parsed: Option<&ParsedForm>) -> Vec<Finding> {
        let Some(parsed) = parsed else {
            return Vec::new();
        };

        let mut findings = Vec::new();
        for token in &parsed.tokens {
            if !token.alphabetic
                || token.looks_like_url
                || token.looks_like_email
                || token.pos == PosTag::ProperNoun
                || token.pos == PosTag::Punctuation
            {
                continue;
            }

            let candidates = self.lexicon.lookup(&token.text);
            if candidates.is_empty() {
                // No dictionary coverage near this token; stay quiet rather
                // than over-correct.
                continue;
            }

            let word_lower = token.text.to_lowercase();
            if candidates
                .iter()
                .any(|c| c.term.to_lowercase() == word_lower)
            {
                continue;
            }

            findings.push(Finding {
                category: Category::Spelling,
                span: token.span,
                message: format!("Possible spelling error: '{}'", token.text),
                suggestions: candidates
                    .iter()
                    .take(MAX_SUGGESTIONS)
                    .map(|c| c.term.clone())
                    .collect(),
                confidence: 0.9,
                source: self.name().to_string(),
            });
        }
        findings
    }

    fn name(&self) -> &'static str {
        "lexicon"
    }
}
