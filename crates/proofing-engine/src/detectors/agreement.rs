//! Number-agreement heuristics over the dependency parse.

use async_trait::async_trait;
use shared_types::{Category, Finding, Span};

use crate::detectors::Detector;
use crate::parse::{DepRel, ParsedForm, PosTag, Token};

/// Syntactic-pattern detector for subject-verb and determiner-noun number
/// agreement. Needs morphology; against an impoverished parse it reports
/// nothing.
#[derive(Debug, Default)]
pub struct AgreementDetector;

impl AgreementDetector {
    pub fn new() -> Self {
        Self
    }
}

/// Span covering both tokens, whichever order they appear in the text.
fn joint_span(a: &Token, b: &Token) -> Span {
    Span::new(
        a.span.start.min(b.span.start),
        a.span.end.max(b.span.end),
    )
}

#[async_trait]
impl Detector for AgreementDetector {
    async fn detect(&self, _text: &str, parsed: Option<&ParsedForm>) -> Vec<Finding> {
        let Some(parsed) = parsed else {
            return Vec::new();
        };

        let mut findings = Vec::new();
        for token in &parsed.tokens {
            // Subject-verb agreement
            if token.dep == DepRel::NominalSubject {
                if let Some(verb) = parsed.head_of(token) {
                    if verb.pos == PosTag::Verb {
                        if let (Some(subject_number), Some(verb_number)) =
                            (token.number, verb.number)
                        {
                            if subject_number != verb_number {
                                // Past-tense verbs other than "be" don't
                                // inflect for number in English.
                                if verb.past_tense && verb.lemma.as_deref() != Some("be") {
                                    continue;
                                }
                                findings.push(Finding {
                                    category: Category::Agreement,
                                    span: joint_span(token, verb),
                                    message: format!(
                                        "Possible subject-verb agreement error: '{}' ({}) vs '{}' ({})",
                                        token.text,
                                        subject_number.label(),
                                        verb.text,
                                        verb_number.label(),
                                    ),
                                    suggestions: vec![],
                                    confidence: 0.6,
                                    source: self.name().to_string(),
                                });
                            }
                        }
                    }
                }
            }

            // Determiner-noun agreement ("this apples")
            if token.pos == PosTag::Determiner {
                if let Some(noun) = parsed.head_of(token) {
                    if noun.pos == PosTag::Noun {
                        if let (Some(det_number), Some(noun_number)) = (token.number, noun.number)
                        {
                            if det_number != noun_number {
                                findings.push(Finding {
                                    category: Category::Agreement,
                                    span: joint_span(token, noun),
                                    message: format!(
                                        "Determiner agreement error: '{}' ({}) vs '{}' ({})",
                                        token.text,
                                        det_number.label(),
                                        noun.text,
                                        noun_number.label(),
                                    ),
                                    suggestions: vec![],
                                    confidence: 0.7,
                                    source: self.name().to_string(),
                                });
                            }
                        }
                    }
                }
            }
        }
        findings
    }

    fn name(&self) -> &'static str {
        "syntax_rule"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::Number;

    // "The dogs runs." with a hand-built dependency parse
    fn mismatched_subject_verb() -> ParsedForm {
        ParsedForm {
            tokens: vec![
                Token::new("The", 0).with_pos(PosTag::Determiner),
                Token::new("dogs", 4)
                    .with_dep(DepRel::NominalSubject, 2)
                    .with_number(Number::Plural),
                Token::new("runs", 9)
                    .with_pos(PosTag::Verb)
                    .with_number(Number::Singular)
                    .with_lemma("run"),
            ],
            sentences: vec![],
        }
    }

    #[tokio::test]
    async fn test_detects_subject_verb_mismatch() {
        let findings = AgreementDetector::new()
            .detect("The dogs runs.", Some(&mismatched_subject_verb()))
            .await;

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].category, Category::Agreement);
        assert_eq!(findings[0].span, Span::new(4, 13));
        assert!(findings[0].message.contains("'dogs' (plural)"));
        assert!(findings[0].message.contains("'runs' (singular)"));
        assert!((findings[0].confidence - 0.6).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_matching_numbers_pass() {
        let parsed = ParsedForm {
            tokens: vec![
                Token::new("dogs", 0)
                    .with_dep(DepRel::NominalSubject, 1)
                    .with_number(Number::Plural),
                Token::new("run", 5)
                    .with_pos(PosTag::Verb)
                    .with_number(Number::Plural)
                    .with_lemma("run"),
            ],
            sentences: vec![],
        };
        let findings = AgreementDetector::new().detect("dogs run", Some(&parsed)).await;
        assert!(findings.is_empty());
    }

    #[tokio::test]
    async fn test_past_tense_exemption() {
        // "The dogs ran" - past tense doesn't inflect for number
        let parsed = ParsedForm {
            tokens: vec![
                Token::new("dogs", 4)
                    .with_dep(DepRel::NominalSubject, 1)
                    .with_number(Number::Plural),
                Token::new("ran", 9)
                    .with_pos(PosTag::Verb)
                    .with_number(Number::Singular)
                    .with_lemma("run")
                    .with_past_tense(),
            ],
            sentences: vec![],
        };
        let findings = AgreementDetector::new()
            .detect("The dogs ran.", Some(&parsed))
            .await;
        assert!(findings.is_empty());
    }

    #[tokio::test]
    async fn test_past_tense_be_still_checked() {
        // "The dogs was" - "was"/"were" still carry number
        let parsed = ParsedForm {
            tokens: vec![
                Token::new("dogs", 4)
                    .with_dep(DepRel::NominalSubject, 1)
                    .with_number(Number::Plural),
                Token::new("was", 9)
                    .with_pos(PosTag::Verb)
                    .with_number(Number::Singular)
                    .with_lemma("be")
                    .with_past_tense(),
            ],
            sentences: vec![],
        };
        let findings = AgreementDetector::new()
            .detect("The dogs was late.", Some(&parsed))
            .await;
        assert_eq!(findings.len(), 1);
    }

    #[tokio::test]
    async fn test_detects_determiner_noun_mismatch() {
        // "this apples"
        let parsed = ParsedForm {
            tokens: vec![
                Token::new("this", 0)
                    .with_pos(PosTag::Determiner)
                    .with_head(1)
                    .with_number(Number::Singular),
                Token::new("apples", 5)
                    .with_pos(PosTag::Noun)
                    .with_number(Number::Plural),
            ],
            sentences: vec![],
        };
        let findings = AgreementDetector::new()
            .detect("this apples", Some(&parsed))
            .await;

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].span, Span::new(0, 11));
        assert!((findings[0].confidence - 0.7).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_unnumbered_tokens_skipped() {
        // Impoverished parse: no morphology anywhere
        let parsed = ParsedForm {
            tokens: vec![
                Token::new("dogs", 0).with_dep(DepRel::NominalSubject, 1),
                Token::new("runs", 5).with_pos(PosTag::Verb),
            ],
            sentences: vec![],
        };
        let findings = AgreementDetector::new().detect("dogs runs", Some(&parsed)).await;
        assert!(findings.is_empty());
    }

    #[tokio::test]
    async fn test_no_parse_no_findings() {
        assert!(AgreementDetector::new().detect("dogs runs", None).await.is_empty());
    }
}
