pub mod types;

pub use types::{
    AnalysisResponse, Category, Finding, ReadabilityMetrics, Span, ValidationError,
    MAX_SUGGESTIONS,
};
