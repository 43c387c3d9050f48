//! End-to-end API: source → structured text → chunks → transform → markup.
//!
//! The synchronous half ([`prepare`]) never fails: a weak extraction degrades
//! to flat text and oversized sentences become their own chunks. Only the
//! asynchronous transform step returns errors.
//!
//! # Example
//!
//! ```rust
//! use vertito_core::pipeline::{PipelineConfig, Source, prepare};
//!
//! let html = "<nav>Home</nav><article><h1>Title</h1><p>Hello world.</p></article>";
//! let prepared = prepare(Source::Html(html), &PipelineConfig::default());
//!
//! assert_eq!(prepared.text, "Title\n\nHello world.\n\n");
//! assert_eq!(prepared.chunks.len(), 1);
//! ```

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::Result;
use crate::chunk::{Chunk, DEFAULT_BUDGET, split_text};
use crate::document::StructuredDocument;
use crate::extract::{SelectConfig, Selection, SelectionStrategy, select_content};
use crate::formatters::display::{DisplayConfig, to_display_markup};
use crate::language::Target;
use crate::transform::{ChunkStatus, FinalDocument, Orchestrator, TransformMode, TransformResult};

/// Input to the pipeline
#[derive(Debug, Clone, Copy)]
pub enum Source<'a> {
    /// An HTML page; the article region is extracted first
    Html(&'a str),
    /// Pasted text; used as is after trimming
    Text(&'a str),
}

/// Pipeline configuration.
///
/// # Example
///
/// ```rust
/// use vertito_core::PipelineConfig;
/// use vertito_core::language::parse_target;
///
/// let config = PipelineConfig::builder()
///     .budget(500)
///     .target(parse_target("transliterate-ta").unwrap())
///     .build();
/// assert_eq!(config.budget, 500);
/// ```
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Chunk budget in characters (default: 1000, never below 1)
    pub budget: usize,
    /// Transform mode and target language (default: translate to `hi-IN`)
    pub target: Target,
    /// Content selection settings
    pub select: SelectConfig,
    /// Display markup settings
    pub display: DisplayConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            budget: DEFAULT_BUDGET,
            target: Target { mode: TransformMode::Translate, language: "hi-IN".to_string() },
            select: SelectConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::new()
    }
}

/// Builder for [`PipelineConfig`]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn new() -> Self {
        Self { config: PipelineConfig::default() }
    }

    /// Sets the chunk budget; zero is raised to one.
    pub fn budget(mut self, value: usize) -> Self {
        self.config.budget = value.max(1);
        self
    }

    pub fn target(mut self, value: Target) -> Self {
        self.config.target = value;
        self
    }

    /// Sets the score a candidate must exceed to be rendered structurally.
    pub fn article_threshold(mut self, value: f64) -> Self {
        self.config.select.article_threshold = value;
        self
    }

    /// Sets the score the fallback root must exceed to be rendered structurally.
    pub fn fallback_threshold(mut self, value: f64) -> Self {
        self.config.select.fallback_threshold = value;
        self
    }

    pub fn select(mut self, value: SelectConfig) -> Self {
        self.config.select = value;
        self
    }

    pub fn display(mut self, value: DisplayConfig) -> Self {
        self.config.display = value;
        self
    }

    /// Sets the class of the display wrapper; `None` disables the wrapper.
    pub fn container_class(mut self, value: Option<String>) -> Self {
        self.config.display.container_class = value;
        self
    }

    pub fn build(self) -> PipelineConfig {
        self.config
    }
}

impl Default for PipelineConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Structured text and chunks for one source
#[derive(Debug, Clone)]
pub struct Prepared {
    /// Structured text handed to the splitter
    pub text: String,
    /// Typed segments of `text`
    pub document: StructuredDocument,
    /// Chunks in order
    pub chunks: Vec<Chunk>,
    /// How the text was selected; `None` for text sources
    pub selection: Option<Selection>,
}

impl Prepared {
    /// Whether extraction degraded to flat text
    pub fn is_degraded(&self) -> bool {
        self.selection.as_ref().is_some_and(Selection::is_degraded)
    }

    /// The untransformed text as display markup
    pub fn to_display_markup(&self, config: &DisplayConfig) -> String {
        to_display_markup(&self.text, config)
    }
}

/// Extract, structure and chunk a source
pub fn prepare(source: Source<'_>, config: &PipelineConfig) -> Prepared {
    let (text, selection) = match source {
        Source::Html(html) => {
            let selection = select_content(html, &config.select);
            (selection.text.clone(), Some(selection))
        }
        Source::Text(text) => (text.trim().to_string(), None),
    };

    let document = StructuredDocument::from_markup(&text);
    let chunks = split_text(&text, config.budget);
    tracing::debug!(chars = text.chars().count(), chunks = chunks.len(), budget = config.budget, "prepared source");

    Prepared { text, document, chunks, selection }
}

/// The result of a full run, serializable for reports
#[derive(Debug, Clone, Serialize)]
pub struct TranslatedArticle {
    pub mode: TransformMode,
    pub target_language: String,
    /// How the source text was selected; absent for text sources
    pub selection: Option<SelectionStrategy>,
    /// Structured text before transformation
    pub source_text: String,
    /// Chunk outputs joined with the mode's separator
    pub text: String,
    /// Display markup of `text`
    pub markup: String,
    /// Per-chunk outcomes in order
    pub results: Vec<TransformResult>,
}

impl TranslatedArticle {
    fn assemble(prepared: Prepared, document: FinalDocument, config: &PipelineConfig) -> Self {
        let text = document.text();
        let markup = to_display_markup(&text, &config.display);
        Self {
            mode: document.mode,
            target_language: config.target.language.clone(),
            selection: prepared.selection.map(|s| s.strategy),
            source_text: prepared.text,
            text,
            markup,
            results: document.results,
        }
    }

    pub fn count(&self, status: ChunkStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }
}

/// A configured pipeline bound to its transform strategies
pub struct Pipeline {
    config: PipelineConfig,
    orchestrator: Orchestrator,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, orchestrator: Orchestrator) -> Self {
        Self { config, orchestrator }
    }

    /// A pipeline calling the HTTP service, with the service's alternate
    /// connection as the fallback strategy.
    #[cfg(feature = "service")]
    pub fn with_service(config: PipelineConfig, service: crate::service::ServiceConfig) -> Result<Self> {
        let primary = crate::service::ServiceClient::new(service)?;
        let fallback = primary.alternate()?;
        Ok(Self::new(config, Orchestrator::new(primary).with_fallback(fallback)))
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn prepare(&self, source: Source<'_>) -> Prepared {
        prepare(source, &self.config)
    }

    /// Run the whole pipeline on `source`.
    ///
    /// # Errors
    ///
    /// See [`Orchestrator::transform`].
    pub async fn run(&self, source: Source<'_>, cancel: &CancellationToken) -> Result<TranslatedArticle> {
        let prepared = self.prepare(source);
        self.transform(prepared, cancel).await
    }

    /// Transform already prepared chunks
    pub async fn transform(&self, prepared: Prepared, cancel: &CancellationToken) -> Result<TranslatedArticle> {
        let target = &self.config.target;
        let document = self
            .orchestrator
            .transform(&prepared.chunks, &target.language, target.mode, cancel)
            .await?;

        tracing::info!(
            mode = %document.mode,
            chunks = document.results.len(),
            fallbacks = document.count(ChunkStatus::FallbackUsed),
            passthroughs = document.count(ChunkStatus::FailedPassthrough),
            "transform complete"
        );

        Ok(TranslatedArticle::assemble(prepared, document, &self.config))
    }
}
