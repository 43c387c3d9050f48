//! Error types for Vertito operations.
//!
//! This module defines the main error type [`VertitoError`] and the per-chunk
//! failure type [`ChunkError`].
//!
//! Extraction and chunking never fail: a weak extraction degrades to flat text
//! and an oversized sentence becomes its own chunk. Only the transform step can
//! surface an error to the caller.
//!
//! # Example
//!
//! ```rust
//! use vertito_core::{VertitoError, Result};
//!
//! fn require_text(text: &str) -> Result<&str> {
//!     if text.trim().is_empty() {
//!         return Err(VertitoError::ConfigError("nothing to translate".to_string()));
//!     }
//!     Ok(text)
//! }
//! # assert!(require_text("").is_err());
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the extraction and transform pipeline.
///
/// # Example
///
/// ```rust
/// use vertito_core::VertitoError;
///
/// let err = VertitoError::TransformAborted { index: 1, reason: "HTTP 429".to_string() };
/// assert!(err.to_string().contains("chunk 1"));
/// assert!(err.to_string().contains("HTTP 429"));
/// ```
#[derive(Error, Debug)]
pub enum VertitoError {
    /// HTTP client errors from reqwest.
    ///
    /// Only raised while building a client; failed chunk calls are reported
    /// through [`ChunkError`] instead.
    #[cfg(feature = "service")]
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Invalid service URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid CSS selector in a candidate table.
    #[error("Failed to parse HTML: {0}")]
    HtmlParseError(String),

    /// Unknown or malformed target language.
    #[error("Unsupported target language: {0}")]
    InvalidLanguage(String),

    /// A translation chunk failed and translation has no fallback path.
    ///
    /// No partial document is produced when this is returned.
    #[error("Transform aborted at chunk {index}: {reason}")]
    TransformAborted { index: usize, reason: String },

    /// The caller cancelled the operation between two chunk calls.
    #[error("Transform cancelled after {completed} chunk(s)")]
    Cancelled { completed: usize },

    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// File write errors.
    #[error("Failed to write to file: {0}")]
    WriteError(#[from] std::io::Error),

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// A single chunk's transform call failed.
///
/// Carries a human-readable reason. The orchestrator recovers from it for
/// transliteration and escalates it to [`VertitoError::TransformAborted`] for
/// translation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct ChunkError {
    pub reason: String,
}

impl ChunkError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

/// Result type alias for VertitoError.
pub type Result<T> = std::result::Result<T, VertitoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VertitoError::InvalidUrl("not a url".to_string());
        assert!(err.to_string().contains("Invalid URL"));
    }

    #[test]
    fn test_transform_aborted_carries_reason() {
        let err = VertitoError::TransformAborted { index: 2, reason: "quota exceeded".to_string() };
        let message = err.to_string();
        assert!(message.contains("chunk 2"));
        assert!(message.contains("quota exceeded"));
    }

    #[test]
    fn test_cancelled_error() {
        let err = VertitoError::Cancelled { completed: 3 };
        assert!(err.to_string().contains('3'));
    }

    #[test]
    fn test_chunk_error_display_is_reason() {
        let err = ChunkError::new("HTTP 503");
        assert_eq!(err.to_string(), "HTTP 503");
    }
}
