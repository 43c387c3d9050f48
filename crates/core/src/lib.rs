pub mod chunk;
pub mod document;
pub mod error;
pub mod extract;
pub mod formatters;
pub mod language;
pub mod parse;
pub mod pipeline;
pub mod preprocess;
pub mod scoring;
#[cfg(feature = "service")]
pub mod service;
pub mod transform;

pub use chunk::{Chunk, ChunkSplitter, DEFAULT_BUDGET, split_sentences, split_text};
pub use document::{EmphasisKind, Segment, SegmentKind, Span, StructuredDocument};
pub use error::{ChunkError, Result, VertitoError};
pub use extract::{CANDIDATE_SELECTORS, CandidateSelector, SelectConfig, Selection, SelectionStrategy, select_content};
pub use formatters::{DisplayConfig, DisplayFormatter, render_structured, to_display_markup};
pub use language::{SUPPORTED_LANGUAGES, Target, parse_target};
pub use parse::{Document, Element};
pub use pipeline::{Pipeline, PipelineConfig, PipelineConfigBuilder, Prepared, Source, TranslatedArticle, prepare};
#[doc(hidden)]
pub use preprocess::PreprocessConfig;
pub use preprocess::preprocess_html;
#[doc(hidden)]
pub use scoring::{ScoreConfig, ScoreResult, calculate_score, class_weight, length_score, link_ratio, structure_score};
#[cfg(feature = "service")]
pub use service::{ServiceClient, ServiceConfig};
pub use transform::{ChunkStatus, ChunkTransformer, FinalDocument, Orchestrator, TransformMode, TransformResult};
