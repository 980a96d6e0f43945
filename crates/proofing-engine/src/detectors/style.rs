//! Style heuristics: passive voice, long sentences, wordy constructions.

use async_trait::async_trait;
use shared_types::{Category, Finding, Span};

use crate::detectors::Detector;
use crate::parse::{DepRel, ParsedForm};
use crate::patterns;

/// Sentences longer than this many tokens get flagged.
const LONG_SENTENCE_TOKENS: usize = 40;

#[derive(Debug, Default)]
pub struct StyleDetector;

impl StyleDetector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Detector for StyleDetector {
    async fn detect(&self, text: &str, parsed: Option<&ParsedForm>) -> Vec<Finding> {
        let mut findings = Vec::new();

        if let Some(parsed) = parsed {
            // Passive voice: an auxpass token points at the main verb
            for token in &parsed.tokens {
                if token.dep == DepRel::PassiveAuxiliary {
                    if let Some(verb) = parsed.head_of(token) {
                        findings.push(Finding {
                            category: Category::Style,
                            span: Span::new(
                                token.span.start.min(verb.span.start),
                                token.span.end.max(verb.span.end),
                            ),
                            message: "Passive voice detected. Consider active voice."
                                .to_string(),
                            suggestions: vec![],
                            confidence: 0.6,
                            source: "style_passive".to_string(),
                        });
                    }
                }
            }

            // Overly long sentences
            for sentence in &parsed.sentences {
                if sentence.tokens.len() > LONG_SENTENCE_TOKENS {
                    findings.push(Finding {
                        category: Category::Style,
                        span: sentence.span,
                        message: "Sentence is very long (40+ tokens). Consider splitting."
                            .to_string(),
                        suggestions: vec![],
                        confidence: 0.5,
                        source: "style_length".to_string(),
                    });
                }
            }
        }

        // Wordy constructions need only the raw text
        for hit in patterns::find_wordy_phrases(text) {
            findings.push(Finding {
                category: Category::Style,
                span: Span::new(hit.start, hit.end),
                message: format!("Wordy construction '{}'.", hit.phrase),
                suggestions: vec![hit.replacement.to_string()],
                confidence: 0.8,
                source: "style_wordy".to_string(),
            });
        }

        findings
    }

    fn name(&self) -> &'static str {
        "style_heuristic"
    }
}
