//! Structured text to safe display markup.
//!
//! All literal text is escaped before any structural tag is introduced, so
//! nothing from the input can be interpreted as markup. Recognized
//! conventions: `**bold**`, `*italic*`, `` `code` ``, fenced code blocks,
//! `> ` quote lines, `- ` bullet lines, blank-line separated paragraphs and
//! short single-line headings.

use once_cell::sync::Lazy;
use regex::Regex;

static BOLD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*([^*\n]+?)\*\*").expect("valid bold pattern"));
static ITALIC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*([^*\n]+?)\*").expect("valid italic pattern"));
static CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`\n]+?)`").expect("valid code pattern"));

/// Marks a fenced block placeholder; stripped from input before rendering
const FENCE_MARK: char = '\u{E000}';

const FENCE: &str = "```";

/// Headings are single lines shorter than this with no period
const HEADING_MAX_CHARS: usize = 100;

const QUOTE_PREFIX: &str = "&gt;";
const BULLET_PREFIX: &str = "- ";

/// Configuration for display markup
#[derive(Debug, Clone)]
pub struct DisplayConfig {
    /// Class of the wrapping `<div>`; `None` emits the blocks unwrapped
    pub container_class: Option<String>,
    /// Level used for detected headings, clamped to 1..=6
    pub heading_level: u8,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { container_class: Some("article-content".to_string()), heading_level: 2 }
    }
}

/// Display markup formatter
pub struct DisplayFormatter {
    config: DisplayConfig,
}

impl DisplayFormatter {
    pub fn new(config: DisplayConfig) -> Self {
        Self { config }
    }

    /// Convert structured text to display markup
    pub fn convert(&self, text: &str) -> String {
        to_display_markup(text, &self.config)
    }
}

/// Escape the five HTML-significant characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Convert structured text into display markup.
///
/// # Example
///
/// ```rust
/// use vertito_core::formatters::display::{DisplayConfig, to_display_markup};
///
/// let config = DisplayConfig { container_class: None, ..Default::default() };
/// let markup = to_display_markup("Title\n\nSome **bold** <text>.", &config);
/// assert_eq!(markup, "<h2>Title</h2>\n<p>Some <strong>bold</strong> &lt;text&gt;.</p>");
/// ```
pub fn to_display_markup(text: &str, config: &DisplayConfig) -> String {
    let text: String = text.chars().filter(|c| *c != FENCE_MARK).collect();
    let escaped = html_escape(&text);

    let (body, fences) = extract_fences(&escaped);
    let body = BOLD_RE.replace_all(&body, "<strong>$1</strong>");
    let body = ITALIC_RE.replace_all(&body, "<em>$1</em>");
    let body = CODE_RE.replace_all(&body, "<code>$1</code>");

    let level = config.heading_level.clamp(1, 6);
    let blocks = split_blocks(&body);
    let mut html = Vec::with_capacity(blocks.len());

    for (i, block) in blocks.iter().enumerate() {
        let has_next = i + 1 < blocks.len();

        if let [line] = block.as_slice() {
            if let Some(fence) = fence_index(line).and_then(|n| fences.get(n)) {
                html.push(format!("<pre><code>{fence}</code></pre>"));
                continue;
            }
        }

        // a short line directly before a blank line is a heading
        match block.split_last() {
            Some((line, rest)) if has_next && is_heading(line) => {
                render_block(rest, &mut html);
                html.push(format!("<h{level}>{line}</h{level}>"));
            }
            _ => render_block(block, &mut html),
        }
    }

    let body = html.join("\n");
    match &config.container_class {
        Some(class) => format!("<div class=\"{}\">\n{}\n</div>", html_escape(class), body),
        None => body,
    }
}

/// Replace fenced blocks with placeholder lines, returning the rewritten text
/// and the fence contents in order.
fn extract_fences(text: &str) -> (String, Vec<String>) {
    let mut lines = Vec::new();
    let mut fences = Vec::new();
    let mut open: Option<Vec<&str>> = None;

    for line in text.lines() {
        match open.as_mut() {
            Some(body) if line.trim() == FENCE => {
                fences.push(body.join("\n"));
                open = None;
                lines.push(String::new());
                lines.push(format!("{FENCE_MARK}{}{FENCE_MARK}", fences.len() - 1));
                lines.push(String::new());
            }
            Some(body) => body.push(line),
            None if line.trim() == FENCE => open = Some(Vec::new()),
            None => lines.push(line.to_string()),
        }
    }

    if let Some(body) = open {
        fences.push(body.join("\n"));
        lines.push(String::new());
        lines.push(format!("{FENCE_MARK}{}{FENCE_MARK}", fences.len() - 1));
    }

    (lines.join("\n"), fences)
}

fn fence_index(line: &str) -> Option<usize> {
    line.strip_prefix(FENCE_MARK)?.strip_suffix(FENCE_MARK)?.parse().ok()
}

/// Blank-line separated blocks of trimmed lines
fn split_blocks(text: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();

    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
}

fn is_heading(line: &str) -> bool {
    line.chars().count() < HEADING_MAX_CHARS
        && !line.contains('.')
        && !line.starts_with(BULLET_PREFIX)
        && !line.starts_with(QUOTE_PREFIX)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Quote,
    Bullet,
    Text,
}

fn line_kind(line: &str) -> LineKind {
    if line.starts_with(QUOTE_PREFIX) {
        LineKind::Quote
    } else if line.starts_with(BULLET_PREFIX) {
        LineKind::Bullet
    } else {
        LineKind::Text
    }
}

/// Group consecutive lines of the same kind into one display block each
fn render_block(lines: &[&str], html: &mut Vec<String>) {
    for run in lines.chunk_by(|a, b| line_kind(a) == line_kind(b)) {
        match line_kind(run[0]) {
            LineKind::Quote => {
                let quoted: Vec<&str> = run
                    .iter()
                    .map(|line| line.strip_prefix(QUOTE_PREFIX).unwrap_or(line).trim_start())
                    .collect();
                html.push(format!("<blockquote>{}</blockquote>", quoted.join("<br>")));
            }
            LineKind::Bullet => {
                let items: String = run
                    .iter()
                    .map(|line| format!("<li>{}</li>", line.strip_prefix(BULLET_PREFIX).unwrap_or(line)))
                    .collect();
                html.push(format!("<ul>{items}</ul>"));
            }
            LineKind::Text => html.push(format!("<p>{}</p>", run.join("<br>"))),
        }
    }
}
