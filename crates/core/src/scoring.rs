use crate::parse::Element;

/// Class keywords that suggest an element holds the article body
pub const POSITIVE_KEYWORDS: &[&str] = &["article", "post", "content", "story", "body", "text"];

/// Class keywords that suggest an element is page chrome
pub const NEGATIVE_KEYWORDS: &[&str] = &["nav", "menu", "sidebar", "header", "footer"];

/// Paragraph-like block descendants
const PARAGRAPH_SELECTOR: &str = "p";
/// Heading descendants
const HEADING_SELECTOR: &str = "h1, h2, h3, h4, h5, h6";
/// List and list-item descendants
const LIST_SELECTOR: &str = "ul, ol, li";
/// Link descendants
const LINK_SELECTOR: &str = "a";

/// Configuration for the element scorer
#[derive(Debug, Clone)]
pub struct ScoreConfig {
    /// Characters of trimmed text per length point
    pub chars_per_point: f64,
    /// Cap on the length component
    pub max_length_score: f64,
    /// Bonus per paragraph descendant
    pub paragraph_weight: f64,
    /// Bonus per heading descendant
    pub heading_weight: f64,
    /// Bonus per list or list-item descendant
    pub list_weight: f64,
    /// Links per paragraph above which the link penalty applies
    pub link_ratio_limit: f64,
    /// Penalty multiplier applied to the link ratio
    pub link_penalty: f64,
    /// Bonus per positive keyword found in the class attribute
    pub positive_weight: f64,
    /// Adjustment per negative keyword found in the class attribute
    pub negative_weight: f64,
    /// Positive class keywords, matched as substrings
    pub positive_keywords: Vec<String>,
    /// Negative class keywords, matched as substrings
    pub negative_keywords: Vec<String>,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            chars_per_point: 10.0,
            max_length_score: 100.0,
            paragraph_weight: 5.0,
            heading_weight: 3.0,
            list_weight: 2.0,
            link_ratio_limit: 2.0,
            link_penalty: 10.0,
            positive_weight: 20.0,
            negative_weight: -30.0,
            positive_keywords: POSITIVE_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            negative_keywords: NEGATIVE_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Breakdown of an element's score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreResult {
    /// The element's tag name
    pub tag_name: String,
    /// The element's class attribute (if present)
    pub class: Option<String>,
    /// Score from trimmed text length, capped
    pub length_score: f64,
    /// Bonus from paragraph, heading and list descendants
    pub structure_score: f64,
    /// Links per paragraph
    pub link_ratio: f64,
    /// Penalty subtracted for link-heavy elements (zero or positive)
    pub link_penalty: f64,
    /// Net adjustment from class keywords
    pub class_weight: f64,
    /// Final calculated score; may be zero or negative
    pub final_score: f64,
}

/// Length component: `min(len / chars_per_point, max_length_score)` over the trimmed text
pub fn length_score(element: &Element<'_>, config: &ScoreConfig) -> f64 {
    let length = element.text().trim().chars().count() as f64;
    (length / config.chars_per_point).min(config.max_length_score)
}

/// Structure component from paragraph, heading and list descendants
pub fn structure_score(element: &Element<'_>, config: &ScoreConfig) -> f64 {
    element.count(PARAGRAPH_SELECTOR) as f64 * config.paragraph_weight
        + element.count(HEADING_SELECTOR) as f64 * config.heading_weight
        + element.count(LIST_SELECTOR) as f64 * config.list_weight
}

/// Links per paragraph, with the paragraph count floored at one
pub fn link_ratio(element: &Element<'_>) -> f64 {
    let links = element.count(LINK_SELECTOR) as f64;
    let paragraphs = element.count(PARAGRAPH_SELECTOR).max(1) as f64;
    links / paragraphs
}

/// Net class keyword adjustment.
///
/// Every keyword found in the lowercased class attribute counts once, and
/// matches stack: `article-content` earns both `article` and `content`.
pub fn class_weight(element: &Element<'_>, config: &ScoreConfig) -> f64 {
    let Some(class) = element.class() else {
        return 0.0;
    };
    let class = class.to_lowercase();

    let positive = config.positive_keywords.iter().filter(|k| class.contains(k.as_str())).count() as f64;
    let negative = config.negative_keywords.iter().filter(|k| class.contains(k.as_str())).count() as f64;

    positive * config.positive_weight + negative * config.negative_weight
}

/// Calculate the relevance score for an element
///
/// The score combines:
/// - Text length, one point per ten characters up to 100
/// - +5 per paragraph, +3 per heading, +2 per list or list item
/// - A link penalty of `ratio * 10` when links per paragraph exceed 2
/// - +20 per positive class keyword, -30 per negative class keyword
///
/// Scoring reads the subtree only, so it is idempotent for an unchanged element.
pub fn calculate_score(element: &Element<'_>, config: &ScoreConfig) -> ScoreResult {
    let length_score = length_score(element, config);
    let structure_score = structure_score(element, config);
    let link_ratio = link_ratio(element);
    let link_penalty = if link_ratio > config.link_ratio_limit { link_ratio * config.link_penalty } else { 0.0 };
    let class_weight = class_weight(element, config);

    let final_score = length_score + structure_score - link_penalty + class_weight;

    ScoreResult {
        tag_name: element.tag_name(),
        class: element.class().map(|s| s.to_string()),
        length_score,
        structure_score,
        link_ratio,
        link_penalty,
        class_weight,
        final_score,
    }
}
