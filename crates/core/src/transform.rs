//! Chunk-by-chunk orchestration of the remote transform call.
//!
//! Chunks are processed strictly in order, one call at a time. Each chunk is
//! offered to an ordered list of capability-equivalent [`ChunkTransformer`]
//! strategies; how many of them a chunk may try, and what happens when all of
//! them fail, depends on the [`TransformMode`]:
//!
//! | mode | attempts | all attempts fail |
//! |---|---|---|
//! | translate | primary only | whole operation aborts |
//! | transliterate | primary, then one fallback | original chunk passes through |

use std::fmt;

use async_trait::async_trait;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::chunk::Chunk;
use crate::error::ChunkError;
use crate::formatters::display::{DisplayConfig, to_display_markup};
use crate::{Result, VertitoError};

/// The remote capability applied to each chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformMode {
    Translate,
    Transliterate,
}

impl TransformMode {
    /// Separator placed between chunk outputs in the final document.
    ///
    /// Translation keeps paragraph breaks; transliteration joins with a
    /// single space.
    pub fn join_separator(self) -> &'static str {
        match self {
            TransformMode::Translate => "\n\n",
            TransformMode::Transliterate => " ",
        }
    }

    /// How many strategies a chunk may try before it counts as failed
    pub fn attempt_limit(self) -> usize {
        match self {
            TransformMode::Translate => 1,
            TransformMode::Transliterate => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TransformMode::Translate => "translate",
            TransformMode::Transliterate => "transliterate",
        }
    }
}

impl fmt::Display for TransformMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A per-chunk transform call.
///
/// Implementations are opaque remote operations: they either return the
/// transformed text or fail with a human-readable reason.
#[async_trait]
pub trait ChunkTransformer: Send + Sync {
    /// Transform one chunk of text into `target_language`
    async fn transform_chunk(
        &self,
        text: &str,
        target_language: &str,
        mode: TransformMode,
    ) -> std::result::Result<String, ChunkError>;

    /// Name used in logs
    fn name(&self) -> &str;
}

/// How a chunk's output was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkStatus {
    Success,
    FallbackUsed,
    FailedPassthrough,
}

/// The outcome for one chunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformResult {
    pub index: usize,
    pub output: String,
    pub status: ChunkStatus,
}

/// Chunk outputs in chunk order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinalDocument {
    pub mode: TransformMode,
    pub results: Vec<TransformResult>,
}

impl FinalDocument {
    /// Outputs joined with the mode's separator
    pub fn text(&self) -> String {
        self.results
            .iter()
            .map(|r| r.output.as_str())
            .collect::<Vec<_>>()
            .join(self.mode.join_separator())
    }

    /// Render the joined text as display markup
    pub fn to_display_markup(&self, config: &DisplayConfig) -> String {
        to_display_markup(&self.text(), config)
    }

    pub fn count(&self, status: ChunkStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }
}

/// Drives chunk calls through an ordered list of strategies
pub struct Orchestrator {
    strategies: Vec<Box<dyn ChunkTransformer>>,
}

impl Orchestrator {
    /// Create an orchestrator with a primary strategy
    pub fn new(primary: impl ChunkTransformer + 'static) -> Self {
        Self { strategies: vec![Box::new(primary)] }
    }

    /// Append a strategy tried after the ones already registered
    pub fn with_fallback(mut self, fallback: impl ChunkTransformer + 'static) -> Self {
        self.strategies.push(Box::new(fallback));
        self
    }

    /// Strategy names in the order they are tried
    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Transform every chunk in order.
    ///
    /// `cancel` is checked before each chunk; a call already in flight always
    /// completes first.
    ///
    /// # Errors
    ///
    /// - [`VertitoError::TransformAborted`] when a translation chunk fails;
    ///   no partial document is returned
    /// - [`VertitoError::Cancelled`] when `cancel` fires between chunks
    pub async fn transform(
        &self,
        chunks: &[Chunk],
        target_language: &str,
        mode: TransformMode,
        cancel: &CancellationToken,
    ) -> Result<FinalDocument> {
        let mut results = Vec::with_capacity(chunks.len());

        for chunk in chunks {
            if cancel.is_cancelled() {
                tracing::info!(completed = results.len(), total = chunks.len(), "transform cancelled");
                return Err(VertitoError::Cancelled { completed: results.len() });
            }

            results.push(self.transform_one(chunk, target_language, mode).await?);
        }

        Ok(FinalDocument { mode, results })
    }

    async fn transform_one(&self, chunk: &Chunk, target_language: &str, mode: TransformMode) -> Result<TransformResult> {
        let mut last_error = ChunkError::new("no transform strategy configured");

        for (attempt, strategy) in self.strategies.iter().take(mode.attempt_limit()).enumerate() {
            match strategy.transform_chunk(&chunk.text, target_language, mode).await {
                Ok(output) => {
                    let status = if attempt == 0 { ChunkStatus::Success } else { ChunkStatus::FallbackUsed };
                    tracing::debug!(index = chunk.index, strategy = strategy.name(), ?status, "chunk transformed");
                    return Ok(TransformResult { index: chunk.index, output, status });
                }
                Err(err) => {
                    tracing::warn!(index = chunk.index, strategy = strategy.name(), reason = %err, "chunk attempt failed");
                    last_error = err;
                }
            }
        }

        match mode {
            TransformMode::Translate => {
                tracing::error!(index = chunk.index, reason = %last_error, "translation aborted");
                Err(VertitoError::TransformAborted { index: chunk.index, reason: last_error.reason })
            }
            TransformMode::Transliterate => {
                tracing::warn!(index = chunk.index, "passing chunk through untransformed");
                Ok(TransformResult {
                    index: chunk.index,
                    output: chunk.text.clone(),
                    status: ChunkStatus::FailedPassthrough,
                })
            }
        }
    }
}
