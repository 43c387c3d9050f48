//! HTML subtree to structured text.
//!
//! The output uses a small inline markup: blank-line separated blocks,
//! `- ` bullets, `> ` quote lines, `**bold**`, `*italic*`, `` `code` `` and
//! triple-backtick fences around preformatted text.

use scraper::ElementRef;
use scraper::node::Node;

use crate::parse::Element;

/// Deepest element nesting rendered structurally; anything deeper is flattened to text
const MAX_DEPTH: usize = 512;

const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// Block-level elements rendered like paragraphs
const PARAGRAPH_TAGS: &[&str] = &["p", "dt", "dd", "figcaption", "address", "summary", "caption"];

/// Containers whose children are spliced in place
const CONTAINER_TAGS: &[&str] = &[
    "html", "body", "main", "div", "section", "article", "header", "footer", "aside", "nav", "figure", "details",
    "dl", "form", "fieldset", "center",
];

/// Elements that never contribute text
const SKIPPED_TAGS: &[&str] = &[
    "head", "title", "meta", "link", "script", "style", "noscript", "template", "img", "picture", "video", "audio",
    "source", "track", "input", "button", "select", "textarea", "svg", "canvas", "iframe", "object", "embed",
];

/// Render an element and its descendants as structured text.
///
/// Total over any tree: unknown elements contribute their text, empty ones
/// contribute nothing, and recursion stops at [`MAX_DEPTH`].
pub fn render_structured(element: &Element<'_>) -> String {
    let mut out = String::new();
    render_element(element.node(), &mut out, 0);
    normalize(&out)
}

fn render_children(element: ElementRef<'_>, out: &mut String, depth: usize) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => push_text(out, text),
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    render_element(child, out, depth + 1);
                }
            }
            _ => {}
        }
    }
}

fn render_element(element: ElementRef<'_>, out: &mut String, depth: usize) {
    if depth > MAX_DEPTH {
        push_text(out, &element.text().collect::<String>());
        return;
    }

    let tag = element.value().name().to_ascii_lowercase();
    let tag = tag.as_str();

    match tag {
        _ if SKIPPED_TAGS.contains(&tag) => {}
        _ if HEADING_TAGS.contains(&tag) || PARAGRAPH_TAGS.contains(&tag) => {
            let inline = render_inline(element, depth);
            let inline = inline.trim();
            if !inline.is_empty() {
                open_block(out);
                out.push_str(inline);
                out.push_str("\n\n");
            }
        }
        "br" => {
            trim_trailing_spaces(out);
            out.push('\n');
        }
        "hr" => open_block(out),
        "ul" | "ol" => render_list(element, out, depth),
        "blockquote" => render_quote(element, out, depth),
        "pre" => render_pre(element, out),
        "b" | "strong" => {
            let inner = render_inline(element, depth);
            push_wrapped(out, &inner, "**");
        }
        "i" | "em" => {
            let inner = render_inline(element, depth);
            push_wrapped(out, &inner, "*");
        }
        "code" | "kbd" | "samp" => {
            let inner = collapse_whitespace(&element.text().collect::<String>());
            push_wrapped(out, &inner, "`");
        }
        "table" => {
            open_block(out);
            render_children(element, out, depth);
            open_block(out);
        }
        "tr" => {
            render_children(element, out, depth);
            trim_trailing_spaces(out);
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
        }
        "td" | "th" => {
            let inline = render_inline(element, depth);
            let inline = inline.trim();
            if !inline.is_empty() {
                out.push_str(inline);
                out.push(' ');
            }
        }
        _ if CONTAINER_TAGS.contains(&tag) => {
            open_block(out);
            render_children(element, out, depth);
            open_block(out);
        }
        _ => render_children(element, out, depth),
    }
}

/// Render an element's children into a fresh buffer
fn render_inline(element: ElementRef<'_>, depth: usize) -> String {
    let mut buf = String::new();
    render_children(element, &mut buf, depth);
    buf
}

fn render_list(element: ElementRef<'_>, out: &mut String, depth: usize) {
    let mut items = Vec::new();

    for child in element.children() {
        match child.value() {
            Node::Text(text) if !text.trim().is_empty() => items.push(collapse_whitespace(text)),
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    items.push(render_inline(child, depth + 1));
                }
            }
            _ => {}
        }
    }

    let mut block = String::new();
    for item in &items {
        push_list_item(&mut block, item);
    }

    if !block.is_empty() {
        open_block(out);
        out.push_str(&block);
        out.push('\n');
    }
}

/// One bullet per item; nested bullets are flattened and continuation lines
/// are folded into the preceding bullet.
fn push_list_item(block: &mut String, item: &str) {
    let mut lines = item.lines().map(str::trim).filter(|line| !line.is_empty());

    let Some(first) = lines.next() else {
        return;
    };
    block.push_str("- ");
    block.push_str(first.strip_prefix("- ").unwrap_or(first));

    for line in lines {
        if let Some(nested) = line.strip_prefix("- ") {
            block.push_str("\n- ");
            block.push_str(nested);
        } else {
            block.push(' ');
            block.push_str(line);
        }
    }
    block.push('\n');
}

fn render_quote(element: ElementRef<'_>, out: &mut String, depth: usize) {
    let inner = normalize(&render_inline(element, depth));
    let lines: Vec<String> = inner
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| format!("> {line}"))
        .collect();

    if !lines.is_empty() {
        open_block(out);
        out.push_str(&lines.join("\n"));
        out.push_str("\n\n");
    }
}

fn render_pre(element: ElementRef<'_>, out: &mut String) {
    let raw: String = element.text().collect();
    let raw = raw.trim_matches('\n').trim_end();
    if raw.trim().is_empty() {
        return;
    }

    open_block(out);
    out.push_str("```\n");
    out.push_str(raw);
    out.push_str("\n```\n\n");
}

/// Push a text node with whitespace collapsed.
///
/// A single space is kept at either edge where the source had whitespace,
/// unless the output already ends in whitespace.
fn push_text(out: &mut String, text: &str) {
    let collapsed = collapse_whitespace(text);
    if collapsed.is_empty() {
        if !text.is_empty() && !ends_with_whitespace(out) {
            out.push(' ');
        }
        return;
    }

    if text.starts_with(char::is_whitespace) && !ends_with_whitespace(out) {
        out.push(' ');
    }
    out.push_str(&collapsed);
    if text.ends_with(char::is_whitespace) {
        out.push(' ');
    }
}

/// Push `inner` wrapped in `marker`, keeping boundary spaces outside the markers
fn push_wrapped(out: &mut String, inner: &str, marker: &str) {
    let trimmed = inner.trim();
    if trimmed.is_empty() {
        if !inner.is_empty() && !ends_with_whitespace(out) {
            out.push(' ');
        }
        return;
    }

    if inner.starts_with(char::is_whitespace) && !ends_with_whitespace(out) {
        out.push(' ');
    }
    out.push_str(marker);
    out.push_str(trimmed);
    out.push_str(marker);
    if inner.ends_with(char::is_whitespace) {
        out.push(' ');
    }
}

/// Terminate any pending inline run so the next content starts a new block
fn open_block(out: &mut String) {
    trim_trailing_spaces(out);
    if out.is_empty() || out.ends_with("\n\n") {
        return;
    }
    if out.ends_with('\n') {
        out.push('\n');
    } else {
        out.push_str("\n\n");
    }
}

fn trim_trailing_spaces(out: &mut String) {
    let len = out.trim_end_matches([' ', '\t']).len();
    out.truncate(len);
}

fn ends_with_whitespace(out: &str) -> bool {
    out.ends_with(char::is_whitespace)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Trim lines, collapse blank-line runs to one blank line and strip leading
/// blank lines. Fenced code is left verbatim.
fn normalize(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    let mut in_fence = false;
    let mut blank_run = 0;

    for line in text.lines() {
        if in_fence {
            output.push_str(line);
            output.push('\n');
            if line == "```" {
                in_fence = false;
            }
            continue;
        }

        let line = line.trim();
        if line.is_empty() {
            blank_run += 1;
            if blank_run == 1 && !output.is_empty() {
                output.push('\n');
            }
            continue;
        }

        blank_run = 0;
        if line == "```" {
            in_fence = true;
        }
        output.push_str(line);
        output.push('\n');
    }

    if !text.ends_with('\n') {
        output.pop();
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::Document;

    fn render(html: &str, selector: &str) -> String {
        let doc = Document::parse(html).unwrap();
        let element = doc.select_first(selector).unwrap().unwrap();
        render_structured(&element)
    }

    #[test]
    fn test_heading_and_paragraph() {
        let html = "<article><h1>Title</h1><p>Hello world.</p></article>";
        assert_eq!(render(html, "article"), "Title\n\nHello world.\n\n");
    }

    #[test]
    fn test_source_whitespace_is_collapsed() {
        let html = "<article>\n  <h2>\n    Spaced   Title\n  </h2>\n  <p>\n    One\n    two.\n  </p>\n</article>";
        assert_eq!(render(html, "article"), "Spaced Title\n\nOne two.\n\n");
    }

    #[test]
    fn test_emphasis_markers() {
        let html = "<div><p>Plain <strong>bold</strong>, <em>italic</em> and <code>x = 1</code>.</p></div>";
        assert_eq!(render(html, "div"), "Plain **bold**, *italic* and `x = 1`.\n\n");
    }

    #[test]
    fn test_emphasis_boundary_spaces_stay_outside() {
        let html = "<p>Say<b> loud </b>now</p>";
        assert_eq!(render(html, "p"), "Say **loud** now\n\n");
    }

    #[test]
    fn test_line_break() {
        let html = "<p>First line<br>Second line</p>";
        assert_eq!(render(html, "p"), "First line\nSecond line\n\n");
    }

    #[test]
    fn test_unordered_and_ordered_lists() {
        let html = "<div><p>Intro.</p><ul><li>One</li><li><em>Two</em></li></ul><ol><li>Three</li></ol></div>";
        assert_eq!(render(html, "div"), "Intro.\n\n- One\n- *Two*\n\n- Three\n\n");
    }

    #[test]
    fn test_nested_list_is_flattened() {
        let html = "<ul><li>Parent<ul><li>Child</li></ul></li><li>Sibling</li></ul>";
        assert_eq!(render(html, "ul"), "- Parent\n- Child\n- Sibling\n\n");
    }

    #[test]
    fn test_blockquote() {
        let html = "<div><blockquote><p>Quoted one.</p><p>Quoted two.</p></blockquote><p>After.</p></div>";
        assert_eq!(render(html, "div"), "> Quoted one.\n> Quoted two.\n\nAfter.\n\n");
    }

    #[test]
    fn test_preformatted_block_keeps_whitespace() {
        let html = "<div><p>Code:</p><pre>fn main() {\n    run();\n\n\n}</pre></div>";
        assert_eq!(render(html, "div"), "Code:\n\n```\nfn main() {\n    run();\n\n\n}\n```\n\n");
    }

    #[test]
    fn test_inline_code_inside_pre_not_double_marked() {
        let html = "<pre><code>let x = 1;</code></pre>";
        assert_eq!(render(html, "pre"), "```\nlet x = 1;\n```\n\n");
    }

    #[test]
    fn test_container_text_becomes_paragraphs() {
        let html = "<section><div>Alpha</div><div>Beta</div></section>";
        assert_eq!(render(html, "section"), "Alpha\n\nBeta\n\n");
    }

    #[test]
    fn test_unknown_elements_contribute_text() {
        let html = r#"<p>See <a href="/x">the <b>docs</b></a> or <span>this</span>.</p>"#;
        assert_eq!(render(html, "p"), "See the **docs** or this.\n\n");
    }

    #[test]
    fn test_empty_nodes_contribute_nothing() {
        let html = "<div><p>  </p><h2></h2><ul></ul><strong> </strong><p>Kept.</p></div>";
        assert_eq!(render(html, "div"), "Kept.\n\n");
    }

    #[test]
    fn test_skipped_elements() {
        let html = r#"<div><p>Text<img src="a.png" alt="alt text"></p><button>Click</button></div>"#;
        assert_eq!(render(html, "div"), "Text\n\n");
    }

    #[test]
    fn test_table_rows() {
        let html = "<table><tr><th>Name</th><th>Value</th></tr><tr><td>a</td><td>1</td></tr></table>";
        assert_eq!(render(html, "table"), "Name Value\na 1\n\n");
    }

    #[test]
    fn test_deep_nesting_terminates() {
        let depth = 2000;
        let html = format!("{}deep text{}", "<span>".repeat(depth), "</span>".repeat(depth));
        let html = format!("<div>{html}</div>");
        let rendered = render(&html, "div");
        assert!(rendered.contains("deep text"));
    }

    #[test]
    fn test_inline_only_root_has_no_trailing_newline() {
        assert_eq!(render("<span>just text</span>", "span"), "just text");
    }
}
