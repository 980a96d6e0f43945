//! The analysis pipeline: normalize, parse once, fan out, resolve.

use std::sync::Arc;
use std::time::Duration;

use shared_types::{AnalysisResponse, Finding, ReadabilityMetrics, ValidationError};
use unicode_normalization::UnicodeNormalization;

use crate::clients::{LanguageToolClient, OpenAiClient};
use crate::config::EngineConfig;
use crate::detectors::{
    AgreementDetector, ContextualChecker, ContextualDetector, Detector, FrequencyLexicon,
    GrammarDetector, GrammarService, Lexicon, SpellingDetector, StyleDetector,
};
use crate::parse::{BasicSegmenter, LanguageProvider, ParsedForm};
use crate::readability::{HeuristicReadability, ReadabilityProvider};
use crate::resolver;

/// Owns the detector set and the collaborator seams. One instance serves
/// any number of `analyze` calls; nothing here is mutated per call.
pub struct AnalysisPipeline {
    parser: Arc<dyn LanguageProvider>,
    readability: Arc<dyn ReadabilityProvider>,
    checker: Arc<dyn ContextualChecker>,
    spelling: SpellingDetector,
    grammar: GrammarDetector,
    agreement: AgreementDetector,
    style: StyleDetector,
    contextual: ContextualDetector,
    detector_timeout: Duration,
}

impl AnalysisPipeline {
    /// Assemble the pipeline from explicit collaborators.
    pub fn new(
        parser: Arc<dyn LanguageProvider>,
        readability: Arc<dyn ReadabilityProvider>,
        lexicon: Arc<dyn Lexicon>,
        grammar_service: Arc<dyn GrammarService>,
        checker: Arc<dyn ContextualChecker>,
        detector_timeout: Duration,
    ) -> Self {
        Self {
            spelling: SpellingDetector::new(lexicon),
            grammar: GrammarDetector::new(grammar_service),
            agreement: AgreementDetector::new(),
            style: StyleDetector::new(),
            contextual: ContextualDetector::new(checker.clone()),
            parser,
            readability,
            checker,
            detector_timeout,
        }
    }

    /// Assemble the pipeline from configuration, using the carried adapters
    /// (fallback segmenter, frequency lexicon, HTTP clients).
    pub fn from_config(config: &EngineConfig) -> anyhow::Result<Self> {
        let lexicon: Arc<dyn Lexicon> = match &config.dictionary_path {
            Some(path) => Arc::new(FrequencyLexicon::load(path)?),
            None => Arc::new(FrequencyLexicon::new()),
        };
        let grammar_service = Arc::new(LanguageToolClient::new(
            &config.grammar_endpoint,
            &config.grammar_language,
            config.http_timeout,
        )?);
        let checker = Arc::new(OpenAiClient::new(
            config.llm_api_key.clone(),
            &config.llm_endpoint,
            &config.llm_model,
            config.http_timeout,
        )?);

        Ok(Self::new(
            Arc::new(BasicSegmenter),
            Arc::new(HeuristicReadability),
            lexicon,
            grammar_service,
            checker,
            config.detector_timeout,
        ))
    }

    /// Analyze `text`: normalize, parse once, run every enabled detector
    /// concurrently, resolve conflicts, attach readability.
    ///
    /// Partial collaborator failures degrade coverage silently; the only
    /// error path is a finding that violates the data-model invariants,
    /// which indicates a detector defect.
    pub async fn analyze(
        &self,
        text: &str,
        use_llm: bool,
    ) -> Result<AnalysisResponse, ValidationError> {
        let normalized: String = text.nfc().collect();

        if normalized.trim().is_empty() {
            return AnalysisResponse::new(
                Vec::new(),
                ReadabilityMetrics::default(),
                use_llm,
                normalized.len(),
            );
        }

        // One parse per call; every detector sees the same artifact.
        let parsed = self.parser.parse(&normalized);
        if parsed.is_none() {
            tracing::warn!("language provider produced no parse; parse-dependent detectors stay quiet");
        }
        let parsed_ref = parsed.as_ref();

        tracing::debug!(len = normalized.len(), use_llm, "running detectors");
        let (spelling, grammar, agreement, style, contextual) = tokio::join!(
            self.run(&self.spelling, &normalized, parsed_ref),
            self.run(&self.grammar, &normalized, parsed_ref),
            self.run(&self.agreement, &normalized, parsed_ref),
            self.run(&self.style, &normalized, parsed_ref),
            self.run_contextual(&normalized, parsed_ref, use_llm),
        );

        let mut findings = spelling;
        findings.extend(grammar);
        findings.extend(agreement);
        findings.extend(style);
        findings.extend(contextual);

        let findings = resolver::resolve(findings);
        let readability = self.readability.metrics(&normalized);

        AnalysisResponse::new(findings, readability, use_llm, normalized.len())
    }

    async fn run<D: Detector>(
        &self,
        detector: &D,
        text: &str,
        parsed: Option<&ParsedForm>,
    ) -> Vec<Finding> {
        match tokio::time::timeout(self.detector_timeout, detector.detect(text, parsed)).await {
            Ok(findings) => findings,
            Err(_) => {
                tracing::warn!(detector = detector.name(), "detector timed out");
                Vec::new()
            }
        }
    }

    async fn run_contextual(
        &self,
        text: &str,
        parsed: Option<&ParsedForm>,
        use_llm: bool,
    ) -> Vec<Finding> {
        if !use_llm {
            return Vec::new();
        }
        self.run(&self.contextual, text, parsed).await
    }

    /// One-sentence plain-language explanation of a finding, produced by
    /// the contextual collaborator on demand.
    pub async fn explain_finding(&self, finding: &Finding, text: &str) -> String {
        let excerpt = text
            .get(finding.span.start..finding.span.end)
            .unwrap_or_default();
        match self.checker.explain(excerpt, &finding.message).await {
            Ok(explanation) => explanation,
            Err(error) => {
                tracing::warn!(%error, "explanation request failed");
                "Explanation unavailable.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detectors::{GrammarMatch, RawContextIssue};
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingParser {
        calls: AtomicUsize,
    }

    impl CountingParser {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl LanguageProvider for CountingParser {
        fn parse(&self, text: &str) -> Option<crate::parse::ParsedForm> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            BasicSegmenter.parse(text)
        }
    }

    struct CountingGrammar {
        calls: AtomicUsize,
        matches: Vec<GrammarMatch>,
        fail: bool,
    }

    impl CountingGrammar {
        fn quiet() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                matches: vec![],
                fail: false,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                matches: vec![],
                fail: true,
            })
        }

        fn with_matches(matches: Vec<GrammarMatch>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                matches,
                fail: false,
            })
        }
    }

    #[async_trait]
    impl GrammarService for CountingGrammar {
        async fn check(&self, _text: &str) -> Result<Vec<GrammarMatch>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(anyhow!("service unreachable"));
            }
            Ok(self.matches.clone())
        }
    }

    struct SlowGrammar;

    #[async_trait]
    impl GrammarService for SlowGrammar {
        async fn check(&self, _text: &str) -> Result<Vec<GrammarMatch>> {
            tokio::time::sleep(Duration::from_millis(500)).await;
            Ok(vec![GrammarMatch {
                offset: 0,
                length: 4,
                message: "too late".to_string(),
                rule_id: "SLOW".to_string(),
                replacements: vec![],
            }])
        }
    }

    struct CountingChecker {
        calls: AtomicUsize,
        issues: Vec<RawContextIssue>,
    }

    impl CountingChecker {
        fn with_issues(issues: Vec<RawContextIssue>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                issues,
            })
        }

        fn quiet() -> Arc<Self> {
            Self::with_issues(vec![])
        }
    }

    #[async_trait]
    impl ContextualChecker for CountingChecker {
        async fn review(&self, _text: &str) -> Result<Vec<RawContextIssue>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.issues.clone())
        }

        async fn explain(&self, excerpt: &str, _message: &str) -> Result<String> {
            Ok(format!("'{excerpt}' is likely wrong"))
        }
    }

    fn lexicon(words: &[&str]) -> Arc<FrequencyLexicon> {
        Arc::new(words.iter().collect())
    }

    fn pipeline(
        parser: Arc<CountingParser>,
        grammar: Arc<CountingGrammar>,
        checker: Arc<CountingChecker>,
    ) -> AnalysisPipeline {
        AnalysisPipeline::new(
            parser,
            Arc::new(HeuristicReadability),
            lexicon(&["hello", "world", "the", "cat", "sat"]),
            grammar,
            checker,
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn test_empty_input_short_circuits() {
        let parser = CountingParser::new();
        let grammar = CountingGrammar::quiet();
        let checker = CountingChecker::quiet();
        let p = pipeline(parser.clone(), grammar.clone(), checker.clone());

        let response = p.analyze("   \n\t ", true).await.unwrap();

        assert!(response.findings.is_empty());
        assert_eq!(response.readability, ReadabilityMetrics::default());
        assert!(response.llm_used);
        // Nothing downstream of normalization ran
        assert_eq!(parser.calls.load(Ordering::SeqCst), 0);
        assert_eq!(grammar.calls.load(Ordering::SeqCst), 0);
        assert_eq!(checker.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_parses_exactly_once() {
        let parser = CountingParser::new();
        let p = pipeline(parser.clone(), CountingGrammar::quiet(), CountingChecker::quiet());

        p.analyze("The cat sat.", false).await.unwrap();
        assert_eq!(parser.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_contextual_detector_gated_by_flag() {
        let checker = CountingChecker::quiet();
        let p = pipeline(CountingParser::new(), CountingGrammar::quiet(), checker.clone());

        let response = p.analyze("Hello world.", false).await.unwrap();
        assert!(!response.llm_used);
        assert_eq!(checker.calls.load(Ordering::SeqCst), 0);

        let response = p.analyze("Hello world.", true).await.unwrap();
        assert!(response.llm_used);
        assert_eq!(checker.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failing_service_degrades_to_remaining_detectors() {
        let p = pipeline(
            CountingParser::new(),
            CountingGrammar::failing(),
            CountingChecker::quiet(),
        );

        let response = p.analyze("Helo world.", false).await.unwrap();

        // The grammar source is down; the spelling finding still arrives.
        assert_eq!(response.findings.len(), 1);
        assert_eq!(response.findings[0].source, "lexicon");
    }

    #[tokio::test]
    async fn test_detector_timeout_drops_slow_source() {
        let p = AnalysisPipeline::new(
            CountingParser::new(),
            Arc::new(HeuristicReadability),
            lexicon(&["hello", "world"]),
            Arc::new(SlowGrammar),
            CountingChecker::quiet(),
            Duration::from_millis(50),
        );

        let response = p.analyze("Helo world.", false).await.unwrap();
        assert!(response.findings.iter().all(|f| f.source != "grammar_api"));
        assert_eq!(response.findings.len(), 1);
    }

    #[tokio::test]
    async fn test_overlap_resolved_across_sources() {
        // Grammar service reports a style-hinted match over [0,6); the
        // lexicon reports a spelling error over [0,4). Spelling outranks it.
        let grammar = CountingGrammar::with_matches(vec![GrammarMatch {
            offset: 0,
            length: 6,
            message: "Sentence fragment".to_string(),
            rule_id: "UPPERCASE_SENTENCE_START".to_string(),
            replacements: vec![],
        }]);
        let p = pipeline(CountingParser::new(), grammar, CountingChecker::quiet());

        let response = p.analyze("Helo world.", false).await.unwrap();

        assert_eq!(response.findings.len(), 1);
        assert_eq!(response.findings[0].source, "lexicon");
        assert_eq!(response.findings[0].span.start, 0);
        assert_eq!(response.findings[0].span.end, 4);
    }

    #[tokio::test]
    async fn test_malformed_model_entries_discarded() {
        let checker = CountingChecker::with_issues(vec![
            RawContextIssue {
                message: Some("valid issue".to_string()),
                start_index: Some(0),
                end_index: Some(4),
                suggestion: None,
            },
            RawContextIssue {
                message: Some("beyond text".to_string()),
                start_index: Some(0),
                end_index: Some(5000),
                suggestion: None,
            },
        ]);
        let p = pipeline(CountingParser::new(), CountingGrammar::quiet(), checker);

        let response = p.analyze("Helo world.", true).await.unwrap();

        // The invalid span never reaches response validation
        assert!(response
            .findings
            .iter()
            .all(|f| f.span.end <= "Helo world.".len()));
        assert!(response.findings.iter().any(|f| f.source == "llm_context"
            || f.source == "lexicon"));
    }

    #[tokio::test]
    async fn test_readability_attached_regardless_of_findings() {
        let p = pipeline(
            CountingParser::new(),
            CountingGrammar::quiet(),
            CountingChecker::quiet(),
        );
        let response = p.analyze("The cat sat.", false).await.unwrap();
        assert!(response.findings.is_empty());
        assert_ne!(response.readability, ReadabilityMetrics::default());
    }

    #[tokio::test]
    async fn test_normalization_composes_input() {
        // Decomposed "e" + combining acute collapses to one code point
        let p = pipeline(
            CountingParser::new(),
            CountingGrammar::quiet(),
            CountingChecker::quiet(),
        );
        let response = p.analyze("cafe\u{0301} time", false).await.unwrap();
        // Spans validated against the normalized length, not the raw input
        for finding in &response.findings {
            assert!(finding.span.end <= "café time".len());
        }
    }

    #[tokio::test]
    async fn test_explain_finding_uses_excerpt() {
        let p = pipeline(
            CountingParser::new(),
            CountingGrammar::quiet(),
            CountingChecker::quiet(),
        );
        let finding = Finding {
            category: shared_types::Category::Spelling,
            span: shared_types::Span::new(0, 4),
            message: "Possible spelling error: 'Helo'".to_string(),
            suggestions: vec![],
            confidence: 0.9,
            source: "lexicon".to_string(),
        };
        let explanation = p.explain_finding(&finding, "Helo world").await;
        assert_eq!(explanation, "'Helo' is likely wrong");
    }
}
