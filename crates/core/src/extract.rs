use serde::Serialize;

use crate::formatters::structured::render_structured;
use crate::parse::{Document, Element};
use crate::preprocess::{PreprocessConfig, preprocess_html};
use crate::scoring::{ScoreConfig, calculate_score};

/// A candidate strategy: a CSS selector plus the bonus its matches earn.
///
/// Semantic landmarks (`<article>`, `role="main"`, schema.org `articleBody`)
/// carry a bonus large enough that any non-empty match clears the article
/// threshold; class-pattern strategies earn nothing beyond their own score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateSelector {
    pub selector: &'static str,
    pub bonus: f64,
}

const fn candidate(selector: &'static str, bonus: f64) -> CandidateSelector {
    CandidateSelector { selector, bonus }
}

/// Candidate strategies in priority order
pub const CANDIDATE_SELECTORS: &[CandidateSelector] = &[
    candidate("article", 100.0),
    candidate("[role=\"main\"]", 100.0),
    candidate("[itemprop=\"articleBody\"]", 100.0),
    candidate(".content", 0.0),
    candidate(".article-content", 0.0),
    candidate(".post-content", 0.0),
    candidate(".entry-content", 0.0),
    candidate(".article-body", 0.0),
    candidate(".post-body", 0.0),
    candidate("main .content", 0.0),
    candidate(".main-content", 0.0),
];

/// Fallback roots, tried in order; the first one present is used
pub const FALLBACK_ROOTS: &[&str] = &["main", "body"];

/// Configuration for content selection
#[derive(Debug, Clone)]
pub struct SelectConfig {
    /// A candidate must score above this to be rendered structurally
    pub article_threshold: f64,
    /// The fallback root must score above this to be rendered structurally
    pub fallback_threshold: f64,
    /// Candidate strategies in priority order
    pub candidates: Vec<CandidateSelector>,
    /// Element scoring configuration
    pub score: ScoreConfig,
    /// Disqualification pass configuration
    pub preprocess: PreprocessConfig,
}

impl Default for SelectConfig {
    fn default() -> Self {
        Self {
            article_threshold: 100.0,
            fallback_threshold: 50.0,
            candidates: CANDIDATE_SELECTORS.to_vec(),
            score: ScoreConfig::default(),
            preprocess: PreprocessConfig::default(),
        }
    }
}

/// How the returned text was obtained
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectionStrategy {
    /// A candidate cleared the article threshold and was rendered structurally
    Candidate { selector: String, score: f64 },
    /// The fallback root cleared the lower threshold and was rendered structurally
    Fallback { root: String, score: f64 },
    /// Nothing scored well enough; the body text was flattened
    FlatText,
}

/// The result of content selection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    /// Structured text, or whitespace-normalized flat text when degraded
    pub text: String,
    /// How `text` was produced
    pub strategy: SelectionStrategy,
}

impl Selection {
    /// Whether selection fell back to flat text.
    ///
    /// This is a recoverable outcome, not an error.
    pub fn is_degraded(&self) -> bool {
        matches!(self.strategy, SelectionStrategy::FlatText)
    }
}

/// A scored match of one candidate strategy
#[derive(Debug, Clone)]
struct Candidate<'a> {
    element: Element<'a>,
    selector: &'static str,
    score: f64,
}

/// Score every match of every strategy and keep the best one.
///
/// Only a strictly higher score replaces the current best, so ties keep the
/// first match in strategy order, then document order.
fn best_candidate<'a>(doc: &'a Document, config: &SelectConfig) -> Option<Candidate<'a>> {
    let mut best: Option<Candidate<'a>> = None;

    for strategy in &config.candidates {
        let Ok(elements) = doc.select(strategy.selector) else {
            tracing::warn!(selector = strategy.selector, "skipping invalid candidate selector");
            continue;
        };

        for element in elements {
            let score = calculate_score(&element, &config.score).final_score + strategy.bonus;
            if best.as_ref().is_none_or(|b| score > b.score) {
                best = Some(Candidate { element, selector: strategy.selector, score });
            }
        }
    }

    best
}

/// Pick the article region of `html` and render it.
///
/// Never fails and always returns some text, possibly empty:
/// 1. Remove disqualified subtrees from a private copy of the document
/// 2. Score every match of every candidate strategy
/// 3. Render the best candidate if it scores above the article threshold
/// 4. Otherwise render the fallback root (`main`, else `body`) if it scores
///    above the fallback threshold
/// 5. Otherwise return the flattened, whitespace-normalized body text
pub fn select_content(html: &str, config: &SelectConfig) -> Selection {
    let Ok(doc) = Document::parse_cleaned(html, &config.preprocess) else {
        return Selection { text: String::new(), strategy: SelectionStrategy::FlatText };
    };

    if let Some(best) = best_candidate(&doc, config) {
        tracing::debug!(selector = best.selector, score = best.score, "best candidate");
        if best.score > config.article_threshold {
            return Selection {
                text: render_structured(&best.element),
                strategy: SelectionStrategy::Candidate { selector: best.selector.to_string(), score: best.score },
            };
        }
    }

    if let Some(selection) = select_fallback(&doc, config) {
        return selection;
    }

    tracing::info!("no confident article region, degrading to flat text");
    Selection { text: flat_text(&doc), strategy: SelectionStrategy::FlatText }
}

/// Score the first fallback root present, after a second disqualification pass
/// scoped to that root.
fn select_fallback(doc: &Document, config: &SelectConfig) -> Option<Selection> {
    let (root, element) = FALLBACK_ROOTS
        .iter()
        .find_map(|root| doc.select_first(root).ok().flatten().map(|el| (*root, el)))?;

    let scoped = Document::parse(&preprocess_html(&element.outer_html(), &config.preprocess)).ok()?;
    let element = scoped.select_first(root).ok().flatten()?;

    let score = calculate_score(&element, &config.score).final_score;
    tracing::debug!(root, score, "fallback root");

    if score > config.fallback_threshold {
        Some(Selection {
            text: render_structured(&element),
            strategy: SelectionStrategy::Fallback { root: root.to_string(), score },
        })
    } else {
        None
    }
}

/// Whitespace-normalized text of the cleaned body.
///
/// Text nodes are joined with a space so adjacent blocks stay separate words.
fn flat_text(doc: &Document) -> String {
    let Some(body) = doc.body() else {
        return String::new();
    };
    let text = body.node().text().collect::<Vec<_>>().join(" ");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
