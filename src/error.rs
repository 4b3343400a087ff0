//! Error types for the financial coach

use thiserror::Error;

/// Result type alias for coach operations
pub type Result<T> = std::result::Result<T, CoachError>;

/// Errors raised by the fallible plumbing around the core.
///
/// Rule engines never return these to the orchestrator; delegated strategies
/// convert them into inline error strings or default classifications.
#[derive(Error, Debug)]
pub enum CoachError {

    // =============================
    // Core Errors
    // =============================

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Configuration error: {0}")]
    Config(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
