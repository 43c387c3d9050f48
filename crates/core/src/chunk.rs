//! Budgeted splitting of structured text.
//!
//! Text is split into paragraphs on blank lines and greedily packed into
//! chunks of at most `budget` characters. Blank lines inside a fenced code
//! block do not end its paragraph. A paragraph that alone exceeds the budget
//! is re-split at line boundaries, and a line still over budget at sentence
//! boundaries. A fenced block or a single sentence longer than the budget
//! becomes its own oversized chunk.

use std::ops::Range;

use serde::Serialize;

/// Default chunk budget, in characters
pub const DEFAULT_BUDGET: usize = 1000;

/// Separator between paragraphs inside a chunk
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// Separator between re-joined lines of one paragraph
const LINE_SEPARATOR: &str = "\n";

/// Separator between re-joined sentences
const SENTENCE_SEPARATOR: &str = " ";

const FENCE: &str = "```";

/// A bounded slice of structured text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    /// Position in the chunk sequence
    pub index: usize,
    /// Indices of the source paragraphs this chunk was built from
    pub paragraphs: Range<usize>,
    /// Literal chunk text
    pub text: String,
}

impl Chunk {
    /// Length in characters
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Whether the chunk is over `budget`, which only happens for a single
    /// sentence or fenced block longer than the budget.
    pub fn is_oversized(&self, budget: usize) -> bool {
        self.len() > budget
    }
}

/// Splits text into chunks under a fixed budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSplitter {
    budget: usize,
}

impl Default for ChunkSplitter {
    fn default() -> Self {
        Self { budget: DEFAULT_BUDGET }
    }
}

impl ChunkSplitter {
    /// Create a splitter; a zero budget is raised to one character.
    pub fn new(budget: usize) -> Self {
        Self { budget: budget.max(1) }
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    pub fn split(&self, text: &str) -> Vec<Chunk> {
        split_text(text, self.budget)
    }
}

/// Split `text` into ordered chunks of at most `budget` characters.
///
/// Lengths count characters, separators included, so every emitted chunk
/// fits the budget unless it holds exactly one sentence or fenced block that
/// does not.
///
/// # Example
///
/// ```rust
/// use vertito_core::chunk::split_text;
///
/// let chunks = split_text("A. B. C.", 2);
/// let texts: Vec<_> = chunks.iter().map(|c| c.text.as_str()).collect();
/// assert_eq!(texts, vec!["A.", "B.", "C."]);
/// ```
pub fn split_text(text: &str, budget: usize) -> Vec<Chunk> {
    let budget = budget.max(1);
    let paragraphs = split_paragraphs(text);

    let mut pieces: Vec<(String, Range<usize>)> = Vec::new();
    let mut current = String::new();
    let mut start = 0;

    for (i, paragraph) in paragraphs.iter().enumerate() {
        if !current.is_empty() && char_len(&current) + PARAGRAPH_SEPARATOR.len() + char_len(paragraph) > budget {
            pieces.push((std::mem::take(&mut current), start..i));
        }

        if current.is_empty() {
            start = i;
        } else {
            current.push_str(PARAGRAPH_SEPARATOR);
        }
        current.push_str(paragraph);

        if char_len(&current) > budget {
            let mut split = split_paragraph(&current, budget);
            current = split.pop().unwrap_or_default();
            pieces.extend(split.into_iter().map(|piece| (piece, i..i + 1)));
            start = i;
        }
    }

    if !current.is_empty() {
        pieces.push((current, start..paragraphs.len()));
    }

    let chunks: Vec<Chunk> = pieces
        .into_iter()
        .map(|(text, range)| (text.trim().to_string(), range))
        .filter(|(text, _)| !text.is_empty())
        .enumerate()
        .map(|(index, (text, paragraphs))| Chunk { index, paragraphs, text })
        .collect();

    for chunk in chunks.iter().filter(|c| c.is_oversized(budget)) {
        tracing::debug!(index = chunk.index, len = chunk.len(), budget, "oversized chunk");
    }

    chunks
}

fn is_fence(line: &str) -> bool {
    line.trim() == FENCE
}

/// Blank-line separated paragraphs, trimmed. A fenced block is never split.
fn split_paragraphs(text: &str) -> Vec<&str> {
    let mut paragraphs = Vec::new();
    let mut start: Option<usize> = None;
    let mut in_fence = false;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        if !in_fence && line.trim().is_empty() {
            if let Some(start) = start.take() {
                paragraphs.push(text[start..offset].trim());
            }
        } else {
            start.get_or_insert(offset);
            if is_fence(line) {
                in_fence = !in_fence;
            }
        }
        offset += line.len();
    }

    if let Some(start) = start {
        paragraphs.push(text[start..].trim());
    }

    paragraphs
}

/// Lines of a paragraph, with each fenced block kept as one multi-line unit
fn split_lines(paragraph: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut fence_start: Option<usize> = None;
    let mut offset = 0;

    for line in paragraph.split_inclusive('\n') {
        match fence_start {
            Some(start) if is_fence(line) => {
                lines.push(paragraph[start..offset + line.len()].trim_end());
                fence_start = None;
            }
            Some(_) => {}
            None if is_fence(line) => fence_start = Some(offset),
            None if !line.trim().is_empty() => lines.push(line.trim()),
            None => {}
        }
        offset += line.len();
    }

    if let Some(start) = fence_start {
        lines.push(paragraph[start..].trim_end());
    }

    lines
}

/// Re-split an over-budget paragraph: lines first, then the sentences of any
/// single line that is still too long.
fn split_paragraph(paragraph: &str, budget: usize) -> Vec<String> {
    accumulate(&split_lines(paragraph), budget, LINE_SEPARATOR)
        .into_iter()
        .flat_map(|piece| {
            // an over-budget piece is one unit; only fenced units span lines
            if char_len(&piece) > budget && !piece.contains('\n') {
                accumulate(&split_sentences(&piece), budget, SENTENCE_SEPARATOR)
            } else {
                vec![piece]
            }
        })
        .collect()
}

/// Split a paragraph into sentences.
///
/// A sentence ends after a run of `.`, `!` or `?` that is followed by
/// whitespace or the end of the text; the punctuation stays with it. Text
/// after the last terminator forms a final sentence.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut sentence_start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !is_terminal(c) {
            continue;
        }
        match chars.peek() {
            Some(&(_, next)) if is_terminal(next) => continue,
            Some(&(_, next)) if !next.is_whitespace() => continue,
            _ => {}
        }

        let end = i + c.len_utf8();
        let sentence = text[sentence_start..end].trim();
        if !sentence.is_empty() {
            sentences.push(sentence);
        }
        sentence_start = end;
    }

    let tail = text[sentence_start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }

    sentences
}

fn is_terminal(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

/// Greedily pack `parts` into strings of at most `budget` characters.
///
/// A part that alone exceeds the budget is kept whole.
fn accumulate(parts: &[&str], budget: usize, separator: &str) -> Vec<String> {
    let mut packed = Vec::new();
    let mut current = String::new();

    for part in parts {
        if !current.is_empty() && char_len(&current) + separator.len() + char_len(part) > budget {
            packed.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push_str(separator);
        }
        current.push_str(part);
    }

    if !current.is_empty() {
        packed.push(current);
    }

    packed
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatters::{DisplayConfig, to_display_markup};
    use proptest::prelude::*;
    use rstest::rstest;

    fn texts(chunks: &[Chunk]) -> Vec<&str> {
        chunks.iter().map(|c| c.text.as_str()).collect()
    }

    fn normalize(text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_single_sentence_chunks() {
        let chunks = split_text("A. B. C.", 2);
        assert_eq!(texts(&chunks), vec!["A.", "B.", "C."]);
        assert!(chunks.iter().all(|c| !c.is_oversized(2)));
    }

    #[test]
    fn test_paragraphs_packed_under_budget() {
        let chunks = split_text("One.\n\nTwo.\n\nThree.", 10);
        // "One.\n\nTwo." is exactly 10 characters
        assert_eq!(texts(&chunks), vec!["One.\n\nTwo.", "Three."]);
        assert_eq!(chunks[0].paragraphs, 0..2);
        assert_eq!(chunks[1].paragraphs, 2..3);
    }

    #[test]
    fn test_whole_text_fits() {
        let chunks = split_text("Title\n\nHello world.\n\n", DEFAULT_BUDGET);
        assert_eq!(texts(&chunks), vec!["Title\n\nHello world."]);
        assert_eq!(chunks[0].index, 0);
    }

    #[test]
    fn test_oversized_paragraph_split_by_sentence() {
        let text = "Short intro.\n\nFirst sentence here. Second one! Third? Fourth.";
        let chunks = split_text(text, 25);

        assert_eq!(
            texts(&chunks),
            vec!["Short intro.", "First sentence here.", "Second one! Third?", "Fourth."]
        );
        assert_eq!(chunks[1].paragraphs, 1..2);
        assert_eq!(chunks.iter().map(|c| c.index).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_last_sentence_piece_continues_accumulating() {
        let text = "Alpha beta. Gamma.\n\nDelta.";
        let chunks = split_text(text, 14);
        assert_eq!(texts(&chunks), vec!["Alpha beta.", "Gamma.\n\nDelta."]);
    }

    #[test]
    fn test_single_long_sentence_is_oversized() {
        let sentence = "This sentence is far longer than the budget allows";
        let chunks = split_text(sentence, 10);
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].is_oversized(10));
    }

    #[test]
    fn test_budget_counts_characters_not_bytes() {
        let chunks = split_text("नमस्ते दुनिया।\n\nठीक है।", 15);
        assert_eq!(chunks.len(), 2);
    }

    #[test]
    fn test_over_budget_list_keeps_lines() {
        let text = "- First item here.\n- Second item here.\n- Third item here.";
        let chunks = split_text(text, 45);
        assert_eq!(texts(&chunks), vec!["- First item here.\n- Second item here.", "- Third item here."]);
        assert!(chunks.iter().all(|c| c.paragraphs == (0..1)));

        let config = DisplayConfig { container_class: None, ..Default::default() };
        assert_eq!(
            to_display_markup(&chunks[0].text, &config),
            "<ul><li>First item here.</li><li>Second item here.</li></ul>"
        );
    }

    #[test]
    fn test_over_budget_quote_keeps_lines() {
        let text = "> One short line.\n> Another short line.";
        assert_eq!(texts(&split_text(text, 25)), vec!["> One short line.", "> Another short line."]);
    }

    #[test]
    fn test_long_line_falls_back_to_sentences() {
        let text = "Heading line\nFirst sentence here. Second one here.";
        assert_eq!(
            texts(&split_text(text, 25)),
            vec!["Heading line", "First sentence here.", "Second one here."]
        );
    }

    #[test]
    fn test_fenced_block_is_one_paragraph() {
        let text = "Intro.\n\n```\nfn a() {}\n\n\nfn b() {}\n```";
        let chunks = split_text(text, 16);

        assert_eq!(texts(&chunks), vec!["Intro.", "```\nfn a() {}\n\n\nfn b() {}\n```"]);
        assert!(chunks[1].is_oversized(16));
        assert_eq!(chunks[1].paragraphs, 1..2);
    }

    #[test]
    fn test_fenced_block_keeps_indentation() {
        let text = "```\n    indented();\n\n    more();\n```";
        assert_eq!(texts(&split_text(text, DEFAULT_BUDGET)), vec![text]);
    }

    #[test]
    fn test_fence_packs_with_neighbouring_paragraphs() {
        let text = "Before.\n\n```\nx\n\ny\n```\n\nAfter.";
        let chunks = split_text(text, DEFAULT_BUDGET);
        assert_eq!(texts(&chunks), vec![text]);
        assert_eq!(chunks[0].paragraphs, 0..3);
    }

    #[rstest]
    #[case("", 10)]
    #[case("\n\n\n\n", 10)]
    #[case("   \n\n  ", 1)]
    fn test_empty_input_yields_no_chunks(#[case] text: &str, #[case] budget: usize) {
        assert!(split_text(text, budget).is_empty());
    }

    #[test]
    fn test_zero_budget_is_clamped() {
        assert_eq!(ChunkSplitter::new(0).budget(), 1);
        assert_eq!(texts(&ChunkSplitter::new(0).split("A. B.")), vec!["A.", "B."]);
    }

    #[rstest]
    #[case("One. Two. Three.", vec!["One.", "Two.", "Three."])]
    #[case("Wait... what?! Yes.", vec!["Wait...", "what?!", "Yes."])]
    #[case("Version 3.14 is out. Update", vec!["Version 3.14 is out.", "Update"])]
    #[case("no terminator", vec!["no terminator"])]
    fn test_split_sentences(#[case] text: &str, #[case] expected: Vec<&str>) {
        assert_eq!(split_sentences(text), expected);
    }

    proptest! {
        #[test]
        fn prop_chunks_respect_budget(text in "[a-z .!?\n]{0,300}", budget in 1usize..80) {
            for chunk in split_text(&text, budget) {
                prop_assert!(
                    chunk.len() <= budget || split_sentences(&chunk.text).len() == 1,
                    "chunk {:?} over budget {}", chunk.text, budget
                );
            }
        }

        #[test]
        fn prop_join_reconstructs_normalized_text(text in "[a-z .!?\n]{0,300}", budget in 1usize..80) {
            let chunks = split_text(&text, budget);
            let joined = texts(&chunks).join(PARAGRAPH_SEPARATOR);
            prop_assert_eq!(normalize(&joined), normalize(&text));
        }

        #[test]
        fn prop_no_empty_chunks_and_dense_indices(text in "[a-z .!?\n]{0,300}", budget in 1usize..80) {
            let chunks = split_text(&text, budget);
            for (i, chunk) in chunks.iter().enumerate() {
                prop_assert_eq!(chunk.index, i);
                prop_assert!(!chunk.text.trim().is_empty());
            }
        }
    }
}
