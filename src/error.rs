//! Error types for the case, analysis and voice layers.

use std::path::PathBuf;

/// Errors raised while turning a file on disk into a `CaseFile`.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("path has no file name: {0}")]
    NoFileName(PathBuf),
}

/// Errors from the remote generative model.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("API error ({status}): {body}")]
    Status { status: u16, body: String },
    #[error("stream read failed: {0}")]
    Stream(#[from] std::io::Error),
    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("model returned an error: {0}")]
    Remote(String),
    #[error("model returned no text")]
    EmptyResponse,
}

/// Errors from microphone capture and voice transcription.
#[derive(Debug, thiserror::Error)]
pub enum VoiceError {
    #[error("a recording is already in progress")]
    AlreadyRecording,
    #[error("no recording in progress")]
    NotRecording,
    #[error("microphone unavailable: {0}")]
    Unavailable(String),
    #[error("audio stream error: {0}")]
    Stream(String),
    #[error("transcription failed: {0}")]
    Transcription(#[from] AnalysisError),
}

/// Configuration problems that stop the application from starting.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(
        "Gemini API key not set. Export GEMINI_API_KEY (or API_KEY) or set gemini.api_key in {0}"
    )]
    MissingCredential(PathBuf),
}
