//! Proofing Engine - aggregation of heterogeneous text-checking sources
//!
//! This crate provides:
//! - The detector contract and the five checking sources
//! - Conflict resolution over overlapping findings
//! - The analysis pipeline (normalize, parse once, fan out, resolve)
//! - The shared parse model and a fallback segmenter
//! - Readability scoring
//! - HTTP adapters for the grammar and language-model collaborators

pub mod clients;
pub mod config;
pub mod detectors;
pub mod parse;
pub mod patterns;
pub mod pipeline;
pub mod readability;
pub mod resolver;

// Re-export commonly used types
pub use config::EngineConfig;
pub use detectors::{
    AgreementDetector, ContextualDetector, Detector, GrammarDetector, SpellingDetector,
    StyleDetector,
};
pub use parse::{BasicSegmenter, LanguageProvider, ParsedForm, Sentence, Token};
pub use pipeline::AnalysisPipeline;
pub use readability::{HeuristicReadability, ReadabilityProvider};
pub use resolver::resolve;
