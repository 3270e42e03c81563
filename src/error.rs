//! Error types for qotd.

use thiserror::Error;

/// Library-level error type for qotd operations.
#[derive(Error, Debug)]
pub enum QotdError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Language model error: {0}")]
    Llm(String),

    #[error("Web search failed: {0}")]
    Search(String),

    #[error("Agent error: {0}")]
    Agent(String),

    #[error("Timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// Result type alias for qotd operations.
pub type Result<T> = std::result::Result<T, QotdError>;
