//! Error types for Vaani.

use thiserror::Error;

/// Library-level error type for Vaani operations.
#[derive(Error, Debug)]
pub enum VaaniError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Download failed: {0}")]
    Download(String),

    #[error("Transcription failed: {0}")]
    Recognition(String),

    #[error("Translation failed at batch {batch}: {message}")]
    Translation { batch: usize, message: String },

    #[error("Chat failed: {0}")]
    Chat(String),

    #[error("Speech synthesis failed: {0}")]
    Synthesis(String),

    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Service error: {0}")]
    Service(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("External tool failed: {0}")]
    ToolFailed(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for Vaani operations.
pub type Result<T> = std::result::Result<T, VaaniError>;
