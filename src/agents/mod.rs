pub mod gemini;
pub mod prompt;

pub use gemini::GeminiClient;

use crate::cases::CaseFile;
use crate::error::AnalysisError;

/// Lazy, finite sequence of response fragments in arrival order.
/// Consumed once; an `Err` item ends the sequence.
pub type FragmentStream = Box<dyn Iterator<Item = Result<String, AnalysisError>> + Send>;

/// Per-request switches chosen by the user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalysisOptions {
    /// Use the slower model variant with a deliberation budget
    pub extended_reasoning: bool,
}

/// Remote model operations the session and voice flows depend on
pub trait AnalysisBackend: Send + Sync {
    /// Starts a streamed analysis of `prompt` over `files`
    fn stream_analysis(
        &self,
        prompt: &str,
        files: &[CaseFile],
        options: AnalysisOptions,
    ) -> Result<FragmentStream, AnalysisError>;

    /// Sends one audio attachment and returns the trimmed transcript
    fn transcribe(&self, audio: &CaseFile) -> Result<String, AnalysisError>;

    /// Name of the model variant `options` selects
    fn model_name(&self, options: AnalysisOptions) -> &str;
}
