//! Shared linguistic annotation computed once per analysis call.
//!
//! Every detector receives the same `ParsedForm` by reference, so all
//! sources see identical tokenization and sentence segmentation. A full
//! language provider fills in part-of-speech, dependency, and morphology
//! data; the fallback [`BasicSegmenter`] produces an impoverished form that
//! detectors tolerate by emitting fewer findings.

use shared_types::Span;
use unicode_segmentation::UnicodeSegmentation;

/// Coarse part-of-speech tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PosTag {
    Noun,
    ProperNoun,
    Verb,
    Determiner,
    Punctuation,
    #[default]
    Other,
}

/// Dependency relation of a token to its syntactic head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DepRel {
    /// Nominal subject of a clause.
    NominalSubject,
    /// Passive auxiliary ("was" in "was taken").
    PassiveAuxiliary,
    #[default]
    Other,
}

/// Grammatical number from morphological analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Number {
    Singular,
    Plural,
}

impl Number {
    pub fn label(self) -> &'static str {
        match self {
            Number::Singular => "singular",
            Number::Plural => "plural",
        }
    }
}

/// One token of the analyzed text with whatever annotation the provider
/// could supply.
#[derive(Debug, Clone)]
pub struct Token {
    pub text: String,
    pub span: Span,
    pub pos: PosTag,
    pub dep: DepRel,
    /// Index of the syntactic head token within `ParsedForm::tokens`.
    pub head: Option<usize>,
    pub number: Option<Number>,
    pub lemma: Option<String>,
    pub past_tense: bool,
    pub alphabetic: bool,
    pub looks_like_url: bool,
    pub looks_like_email: bool,
}

impl Token {
    /// Build a token at a byte offset, deriving the surface flags that need
    /// no language model.
    pub fn new(text: &str, start: usize) -> Self {
        let alphabetic = !text.is_empty() && text.chars().all(|c| c.is_alphabetic());
        let pos = if !text.is_empty() && text.chars().all(|c| !c.is_alphanumeric()) {
            PosTag::Punctuation
        } else {
            PosTag::Other
        };
        Self {
            span: Span::new(start, start + text.len()),
            pos,
            dep: DepRel::Other,
            head: None,
            number: None,
            lemma: None,
            past_tense: false,
            alphabetic,
            looks_like_url: looks_like_url(text),
            looks_like_email: looks_like_email(text),
            text: text.to_string(),
        }
    }

    pub fn with_pos(mut self, pos: PosTag) -> Self {
        self.pos = pos;
        self
    }

    pub fn with_dep(mut self, dep: DepRel, head: usize) -> Self {
        self.dep = dep;
        self.head = Some(head);
        self
    }

    pub fn with_head(mut self, head: usize) -> Self {
        self.head = Some(head);
        self
    }

    pub fn with_number(mut self, number: Number) -> Self {
        self.number = Some(number);
        self
    }

    pub fn with_lemma(mut self, lemma: &str) -> Self {
        self.lemma = Some(lemma.to_string());
        self
    }

    pub fn with_past_tense(mut self) -> Self {
        self.past_tense = true;
        self
    }
}

fn looks_like_url(text: &str) -> bool {
    text.contains("://") || text.starts_with("www.")
}

fn looks_like_email(text: &str) -> bool {
    match text.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.'),
        None => false,
    }
}

/// One sentence: its byte span and the tokens it covers.
#[derive(Debug, Clone)]
pub struct Sentence {
    pub span: Span,
    /// Indexes into `ParsedForm::tokens`.
    pub tokens: std::ops::Range<usize>,
}

/// The shared parsed representation. Read-only once constructed.
#[derive(Debug, Clone, Default)]
pub struct ParsedForm {
    pub tokens: Vec<Token>,
    pub sentences: Vec<Sentence>,
}

impl ParsedForm {
    pub fn head_of(&self, token: &Token) -> Option<&Token> {
        token.head.and_then(|i| self.tokens.get(i))
    }
}

/// Produces the shared parsed representation for one analysis call.
///
/// Returning `None` signals that parsing failed outright; the pipeline then
/// hands `None` to every detector rather than aborting analysis.
pub trait LanguageProvider: Send + Sync {
    fn parse(&self, text: &str) -> Option<ParsedForm>;
}

/// Minimal language provider: Unicode sentence segmentation plus word-bound
/// tokens. No part-of-speech, dependency, or morphology data.
#[derive(Debug, Default)]
pub struct BasicSegmenter;

impl LanguageProvider for BasicSegmenter {
    fn parse(&self, text: &str) -> Option<ParsedForm> {
        let mut tokens = Vec::new();
        let mut sentences = Vec::new();

        for (sent_start, sent) in text.split_sentence_bound_indices() {
            if sent.trim().is_empty() {
                continue;
            }
            let first_token = tokens.len();
            for (offset, word) in sent.split_word_bound_indices() {
                if word.trim().is_empty() {
                    continue;
                }
                tokens.push(Token::new(word, sent_start + offset));
            }
            let leading = sent.len() - sent.trim_start().len();
            let trimmed_len = sent.trim_end().len();
            sentences.push(Sentence {
                span: Span::new(sent_start + leading, sent_start + trimmed_len),
                tokens: first_token..tokens.len(),
            });
        }

        Some(ParsedForm { tokens, sentences })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segmenter_token_offsets() {
        let parsed = BasicSegmenter.parse("Helo world.").unwrap();
        let words: Vec<(&str, usize, usize)> = parsed
            .tokens
            .iter()
            .map(|t| (t.text.as_str(), t.span.start, t.span.end))
            .collect();
        assert_eq!(
            words,
            vec![("Helo", 0, 4), ("world", 5, 10), (".", 10, 11)]
        );
    }

    #[test]
    fn test_segmenter_sentence_bounds() {
        let parsed = BasicSegmenter.parse("One here. Two there.").unwrap();
        assert_eq!(parsed.sentences.len(), 2);
        assert_eq!(parsed.sentences[0].span, Span::new(0, 9));
        assert_eq!(parsed.sentences[1].span, Span::new(10, 20));
        // Token ranges partition the token list
        assert_eq!(parsed.sentences[0].tokens, 0..3);
        assert_eq!(parsed.sentences[1].tokens, 3..6);
    }

    #[test]
    fn test_segmenter_empty_text() {
        let parsed = BasicSegmenter.parse("   ").unwrap();
        assert!(parsed.tokens.is_empty());
        assert!(parsed.sentences.is_empty());
    }

    #[test]
    fn test_segmenter_marks_punctuation() {
        let parsed = BasicSegmenter.parse("Stop!").unwrap();
        assert_eq!(parsed.tokens[1].pos, PosTag::Punctuation);
        assert!(!parsed.tokens[1].alphabetic);
        assert!(parsed.tokens[0].alphabetic);
    }

    #[test]
    fn test_surface_flags() {
        assert!(looks_like_url("https://example.com/x"));
        assert!(looks_like_url("www.example.com"));
        assert!(!looks_like_url("example"));
        assert!(looks_like_email("user@example.com"));
        assert!(!looks_like_email("user@localhost"));
        assert!(!looks_like_email("word"));
    }

    #[test]
    fn test_head_lookup() {
        let tokens = vec![
            Token::new("dogs", 0).with_dep(DepRel::NominalSubject, 1),
            Token::new("runs", 5).with_pos(PosTag::Verb),
        ];
        let parsed = ParsedForm {
            tokens,
            sentences: vec![],
        };
        let head = parsed.head_of(&parsed.tokens[0]).unwrap();
        assert_eq!(head.text, "runs");
        assert!(parsed.head_of(&parsed.tokens[1]).is_none());
    }
}
