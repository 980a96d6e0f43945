//! HTTP adapters for the out-of-process collaborators.

pub mod languagetool;
pub mod openai;

pub use languagetool::LanguageToolClient;
pub use openai::OpenAiClient;
