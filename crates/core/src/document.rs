//! Typed view of structured text.
//!
//! [`StructuredDocument`] splits the markup produced by
//! [`render_structured`](crate::formatters::structured::render_structured)
//! into reading-order segments with their emphasis spans, and rebuilds a
//! canonical markup string from them.

use serde::Serialize;

/// The kind of a block of structured text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    Heading,
    Paragraph,
    ListItem,
    Quote,
    CodeBlock,
    /// Trailing text with no block terminator
    InlineRun,
}

/// Inline emphasis markers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmphasisKind {
    Bold,
    Italic,
    Code,
}

impl EmphasisKind {
    fn marker(self) -> &'static str {
        match self {
            EmphasisKind::Bold => "**",
            EmphasisKind::Italic => "*",
            EmphasisKind::Code => "`",
        }
    }
}

/// An emphasis range over a segment's literal text, in byte offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub kind: EmphasisKind,
    pub start: usize,
    pub end: usize,
}

/// One block of structured text.
///
/// `text` holds the literal text with markers removed; `spans` locate the
/// emphasized ranges within it. Code blocks keep their contents verbatim and
/// carry no spans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub kind: SegmentKind,
    pub text: String,
    pub spans: Vec<Span>,
}

impl Segment {
    /// Segment text with its emphasis markers restored
    pub fn to_markup(&self) -> String {
        let mut markup = String::with_capacity(self.text.len() + self.spans.len() * 4);
        let mut cursor = 0;

        for span in &self.spans {
            markup.push_str(&self.text[cursor..span.start]);
            markup.push_str(span.kind.marker());
            markup.push_str(&self.text[span.start..span.end]);
            markup.push_str(span.kind.marker());
            cursor = span.end;
        }
        markup.push_str(&self.text[cursor..]);

        match self.kind {
            SegmentKind::ListItem => format!("- {markup}"),
            SegmentKind::Quote => markup.lines().map(|line| format!("> {line}")).collect::<Vec<_>>().join("\n"),
            SegmentKind::CodeBlock => format!("```\n{markup}\n```"),
            SegmentKind::Heading | SegmentKind::Paragraph | SegmentKind::InlineRun => markup,
        }
    }
}

/// Reading-order sequence of typed segments
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StructuredDocument {
    pub segments: Vec<Segment>,
}

/// Headings are a single short line without a period
const HEADING_MAX_CHARS: usize = 100;

impl StructuredDocument {
    /// Parse structured markup into segments.
    ///
    /// Blocks are separated by blank lines. A line is a heading when it is
    /// under 100 characters, contains no period, is not a list or quote line,
    /// and ends a block that is followed by another block. Lines before it in
    /// the same block form their own segment. A final block without a
    /// trailing blank line is an inline run.
    pub fn from_markup(markup: &str) -> Self {
        let blocks = split_blocks(markup);
        let terminated = markup.ends_with("\n\n");
        let mut segments = Vec::new();

        for (i, block) in blocks.iter().enumerate() {
            let is_last = i + 1 == blocks.len();

            match block {
                Block::Code(code) => segments.push(Segment {
                    kind: SegmentKind::CodeBlock,
                    text: code.to_string(),
                    spans: Vec::new(),
                }),
                Block::Text(lines) => match lines.split_last() {
                    Some((last, rest))
                        if !is_last && !rest.is_empty() && is_heading_line(std::slice::from_ref(last)) =>
                    {
                        push_text(rest, SegmentKind::Paragraph, &mut segments);
                        segments.push(inline_segment(SegmentKind::Heading, last));
                    }
                    _ => {
                        let kind = if is_last && !terminated {
                            SegmentKind::InlineRun
                        } else if !is_last && is_heading_line(lines) {
                            SegmentKind::Heading
                        } else {
                            SegmentKind::Paragraph
                        };
                        push_text(lines, kind, &mut segments);
                    }
                },
            }
        }

        Self { segments }
    }

    /// Canonical markup: blocks separated by a blank line, consecutive list
    /// items by a single newline, terminated by a blank line unless the last
    /// segment is an inline run.
    pub fn to_markup(&self) -> String {
        let mut output = String::new();

        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                let previous = self.segments[i - 1].kind;
                if previous == SegmentKind::ListItem && segment.kind == SegmentKind::ListItem {
                    output.push('\n');
                } else {
                    output.push_str("\n\n");
                }
            }
            output.push_str(&segment.to_markup());
        }

        match self.segments.last() {
            Some(last) if last.kind != SegmentKind::InlineRun => output.push_str("\n\n"),
            _ => {}
        }

        output
    }

    /// Literal text of every segment joined by blank lines, markers removed
    pub fn plain_text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect::<Vec<_>>().join("\n\n")
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

enum Block<'a> {
    Text(Vec<&'a str>),
    Code(String),
}

/// Split markup into blank-line separated blocks, keeping fenced code intact
fn split_blocks(markup: &str) -> Vec<Block<'_>> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut code: Option<Vec<&str>> = None;

    for line in markup.lines() {
        if let Some(body) = code.as_mut() {
            if line.trim_end() == "```" {
                blocks.push(Block::Code(body.join("\n")));
                code = None;
            } else {
                body.push(line);
            }
            continue;
        }

        let trimmed = line.trim();
        if trimmed == "```" {
            if !current.is_empty() {
                blocks.push(Block::Text(std::mem::take(&mut current)));
            }
            code = Some(Vec::new());
        } else if trimmed.is_empty() {
            if !current.is_empty() {
                blocks.push(Block::Text(std::mem::take(&mut current)));
            }
        } else {
            current.push(trimmed);
        }
    }

    if let Some(body) = code {
        blocks.push(Block::Code(body.join("\n")));
    }
    if !current.is_empty() {
        blocks.push(Block::Text(current));
    }

    blocks
}

fn is_heading_line(lines: &[&str]) -> bool {
    matches!(lines, [line] if line.chars().count() < HEADING_MAX_CHARS
        && !line.contains('.')
        && !line.starts_with("- ")
        && !line.starts_with('>'))
}

/// Push a text block as list items, one quote, or one segment of `kind`
fn push_text(lines: &[&str], kind: SegmentKind, segments: &mut Vec<Segment>) {
    if lines.iter().all(|line| line.starts_with("- ")) {
        segments.extend(lines.iter().map(|line| inline_segment(SegmentKind::ListItem, &line[2..])));
    } else if lines.iter().all(|line| line.starts_with("> ") || *line == ">") {
        let text = lines
            .iter()
            .map(|line| line.strip_prefix("> ").unwrap_or(""))
            .collect::<Vec<_>>()
            .join("\n");
        segments.push(inline_segment(SegmentKind::Quote, &text));
    } else {
        segments.push(inline_segment(kind, &lines.join("\n")));
    }
}

fn inline_segment(kind: SegmentKind, markup: &str) -> Segment {
    let (text, spans) = parse_inline(markup);
    Segment { kind, text, spans }
}

/// Strip emphasis markers, recording the ranges they enclosed.
///
/// A marker only opens when a matching closer follows on the same segment;
/// unmatched markers are kept as literal text. Code spans take precedence,
/// and bold is matched before italic.
fn parse_inline(markup: &str) -> (String, Vec<Span>) {
    let mut text = String::with_capacity(markup.len());
    let mut spans = Vec::new();
    let mut rest = markup;

    while !rest.is_empty() {
        let matched = [EmphasisKind::Code, EmphasisKind::Bold, EmphasisKind::Italic]
            .into_iter()
            .find_map(|kind| {
                let marker = kind.marker();
                let after = rest.strip_prefix(marker)?;
                if kind == EmphasisKind::Italic && after.starts_with('*') {
                    return None;
                }
                let close = after.find(marker)?;
                (close > 0).then_some((kind, &after[..close], &after[close + marker.len()..]))
            });

        match matched {
            Some((kind, inner, remaining)) => {
                let start = text.len();
                text.push_str(inner);
                spans.push(Span { kind, start, end: text.len() });
                rest = remaining;
            }
            None => {
                let mut chars = rest.chars();
                if let Some(c) = chars.next() {
                    text.push(c);
                }
                rest = chars.as_str();
            }
        }
    }

    (text, spans)
}
