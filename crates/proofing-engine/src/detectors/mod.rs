//! Detector contract and the five checking sources.
//!
//! Each detector is a pure function of (text, parsed form) to findings. A
//! detector that needs a collaborator which is unavailable, unreachable, or
//! returning garbage degrades to an empty result and logs the condition; it
//! never fails the pipeline.

pub mod agreement;
pub mod contextual;
pub mod grammar;
pub mod spelling;
pub mod style;

pub use agreement::AgreementDetector;
pub use contextual::{ContextualChecker, ContextualDetector, RawContextIssue};
pub use grammar::{GrammarDetector, GrammarMatch, GrammarService};
pub use spelling::{Correction, FrequencyLexicon, Lexicon, SpellingDetector};
pub use style::StyleDetector;

use async_trait::async_trait;
use shared_types::Finding;

use crate::parse::ParsedForm;

/// A single checking source.
///
/// Implementations must not mutate `text` or `parsed`, must tolerate
/// `parsed` being absent or impoverished, and must keep failures local:
/// an unreachable backing service yields an empty list, not an error.
#[async_trait]
pub trait Detector: Send + Sync {
    /// Run detection over the normalized text and the shared parsed form.
    async fn detect(&self, text: &str, parsed: Option<&ParsedForm>) -> Vec<Finding>;

    /// Short identifier used for logging and provenance.
    fn name(&self) -> &'static str;
}
