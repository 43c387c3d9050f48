//! Disqualification pass run before candidate scoring.
//!
//! Removes whole subtrees that never hold article prose: scripts and styles,
//! navigation landmarks, and class/id/role-tagged boilerplate (ads, share bars,
//! comments, related content, newsletter and cookie banners, breadcrumbs,
//! author bios, tag lists, popups). The pass rewrites a copy of the source text
//! with `lol_html` and never touches the caller's document.

use lol_html::{HtmlRewriter, Settings, element};
use once_cell::sync::Lazy;
use regex::Regex;

/// Tags removed together with their content.
pub const DISQUALIFIED_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "iframe", "svg", "canvas", "nav", "header", "footer", "aside",
    "dialog",
];

/// ARIA roles removed together with their content.
pub const DISQUALIFIED_ROLES: &[&str] = &[
    "navigation",
    "banner",
    "contentinfo",
    "complementary",
    "search",
    "dialog",
    "alertdialog",
];

/// Tags that class/id/role rules never remove, since page templates often
/// decorate them with layout tokens such as `sidebar-enabled`.
pub const PROTECTED_TAGS: &[&str] = &["html", "body", "article", "main"];

/// Class/id tokens that mark boilerplate.
const BOILERPLATE_PATTERN: &str = r"(?i)(^|[-_])(ads?|advert\w*|sponsor\w*|promo)([-_]|$)|share|sharing|social|comment|disqus|related|recommend|newsletter|subscribe|signup|cookie|gdpr|consent|breadcrumb|author-?bio|about-author|^tags?$|tag-?(list|cloud|links)|^meta$|post-meta|entry-meta|metadata|popup|modal|sidebar|navigation|^nav$|menu";

/// Class/id tokens that explicitly mark the content container.
const CONTENT_PATTERN: &str =
    r"(?i)^((entry|post|article|story)[-_](content|body|text)|content|main-content|article)$";

static BOILERPLATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(BOILERPLATE_PATTERN).expect("valid boilerplate pattern"));
static CONTENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(CONTENT_PATTERN).expect("valid content pattern"));
static HIDDEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(display\s*:\s*none|visibility\s*:\s*hidden)").expect("valid hidden pattern"));
static COMMENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid comment pattern"));

/// Configuration for the disqualification pass
#[derive(Debug, Clone)]
pub struct PreprocessConfig {
    /// Whether to remove tags from [`DISQUALIFIED_TAGS`]
    pub remove_tags: bool,
    /// Whether to remove elements whose class or id matches boilerplate patterns
    pub remove_boilerplate_classes: bool,
    /// Whether to remove elements carrying a role from [`DISQUALIFIED_ROLES`]
    pub remove_roles: bool,
    /// Whether to remove `hidden` elements and inline `display:none` styles
    pub remove_hidden: bool,
    /// Whether to strip HTML comments
    pub remove_comments: bool,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            remove_tags: true,
            remove_boilerplate_classes: true,
            remove_roles: true,
            remove_hidden: true,
            remove_comments: true,
        }
    }
}

/// Returns a cleaned copy of `html` with all disqualified subtrees removed.
///
/// Never fails: if the rewriter rejects the input, the input is returned as is.
pub fn preprocess_html(html: &str, config: &PreprocessConfig) -> String {
    let mut processed = if config.remove_comments { remove_comments(html) } else { html.to_string() };

    if config.remove_tags {
        processed = remove_disqualified_tags(&processed);
    }

    if config.remove_boilerplate_classes || config.remove_roles || config.remove_hidden {
        processed = remove_boilerplate(&processed, config);
    }

    processed
}

/// Whether a class or id value marks boilerplate.
///
/// The value is split into tokens; a token that explicitly marks content
/// anywhere in the value vetoes removal.
pub fn is_boilerplate_attr(value: &str) -> bool {
    let tokens: Vec<&str> = value.split_whitespace().collect();
    if tokens.iter().any(|t| CONTENT_RE.is_match(t)) {
        return false;
    }
    tokens.iter().any(|t| BOILERPLATE_RE.is_match(t))
}

fn remove_comments(html: &str) -> String {
    COMMENT_RE.replace_all(html, "").to_string()
}

fn remove_disqualified_tags(html: &str) -> String {
    rewrite(
        html,
        Settings {
            element_content_handlers: DISQUALIFIED_TAGS
                .iter()
                .map(|tag| {
                    element!(*tag, |el| {
                        el.remove();
                        Ok(())
                    })
                })
                .collect(),
            ..Default::default()
        },
    )
}

fn remove_boilerplate(html: &str, config: &PreprocessConfig) -> String {
    rewrite(
        html,
        Settings {
            element_content_handlers: vec![element!("*", |el| {
                if config.remove_hidden
                    && (el.has_attribute("hidden")
                        || el.get_attribute("style").is_some_and(|style| HIDDEN_RE.is_match(&style)))
                {
                    el.remove();
                    return Ok(());
                }

                let tag = el.tag_name();
                if PROTECTED_TAGS.contains(&tag.as_str()) {
                    return Ok(());
                }

                if config.remove_roles
                    && let Some(role) = el.get_attribute("role")
                    && DISQUALIFIED_ROLES.contains(&role.trim().to_lowercase().as_str())
                {
                    el.remove();
                    return Ok(());
                }

                if config.remove_boilerplate_classes {
                    let marked = ["class", "id"]
                        .iter()
                        .filter_map(|name| el.get_attribute(name))
                        .any(|value| is_boilerplate_attr(&value));
                    if marked {
                        el.remove();
                    }
                }

                Ok(())
            })],
            ..Default::default()
        },
    )
}

fn rewrite(html: &str, settings: Settings<'_, '_>) -> String {
    let mut output = String::new();
    let mut rewriter = HtmlRewriter::new(settings, |c: &[u8]| {
        output.push_str(&String::from_utf8_lossy(c));
    });

    if rewriter.write(html.as_bytes()).is_err() {
        return html.to_string();
    }

    if rewriter.end().is_err() {
        return html.to_string();
    }

    if output.is_empty() && !html.is_empty() { html.to_string() } else { output }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_remove_disqualified_tags() {
        let html = r#"
            <html>
                <head><script>alert('test');</script><style>body{color:red;}</style></head>
                <body>
                    <header>Site header</header>
                    <nav>Home | About</nav>
                    <noscript>Enable JavaScript</noscript>
                    <aside>Trending now</aside>
                    <p>Content</p>
                    <footer>Copyright</footer>
                </body>
            </html>
        "#;

        let result = preprocess_html(html, &PreprocessConfig::default());
        assert!(!result.contains("alert"));
        assert!(!result.contains("color:red"));
        assert!(!result.contains("Site header"));
        assert!(!result.contains("Home | About"));
        assert!(!result.contains("Enable JavaScript"));
        assert!(!result.contains("Trending now"));
        assert!(!result.contains("Copyright"));
        assert!(result.contains("<p>Content</p>"));
    }

    #[test]
    fn test_remove_comments() {
        let html = "<body><!-- hidden note --><p>Visible content</p><!--\nmulti\nline--></body>";
        let result = remove_comments(html);
        assert!(!result.contains("<!--"));
        assert!(!result.contains("multi"));
        assert!(result.contains("Visible content"));
    }

    #[rstest]
    #[case("social-share", true)]
    #[case("ad-slot", true)]
    #[case("ads", true)]
    #[case("comments", true)]
    #[case("related-posts", true)]
    #[case("newsletter-signup", true)]
    #[case("cookie-banner", true)]
    #[case("gdpr", true)]
    #[case("breadcrumbs", true)]
    #[case("author-bio", true)]
    #[case("tags", true)]
    #[case("entry-meta", true)]
    #[case("popup", true)]
    #[case("shadow header-wrap", false)]
    #[case("read-more", false)]
    #[case("entry-content", false)]
    #[case("entry-content has-comments", false)]
    #[case("headline", false)]
    fn test_is_boilerplate_attr(#[case] value: &str, #[case] expected: bool) {
        assert_eq!(is_boilerplate_attr(value), expected, "class {value:?}");
    }

    #[test]
    fn test_remove_boilerplate_classes_and_roles() {
        let html = r#"
            <body>
                <div class="share-bar">Share on X</div>
                <div id="comments">Nice post!</div>
                <div role="navigation">Prev | Next</div>
                <section role="complementary">Elsewhere</section>
                <div class="post-body"><p>Keep me</p></div>
            </body>
        "#;

        let result = preprocess_html(html, &PreprocessConfig::default());
        assert!(!result.contains("Share on X"));
        assert!(!result.contains("Nice post!"));
        assert!(!result.contains("Prev | Next"));
        assert!(!result.contains("Elsewhere"));
        assert!(result.contains("Keep me"));
    }

    #[test]
    fn test_protected_tags_survive_layout_classes() {
        let html = r#"<body class="single sidebar-enabled"><article class="post has-sidebar"><p>Story</p></article></body>"#;
        let result = preprocess_html(html, &PreprocessConfig::default());
        assert!(result.contains("Story"));
    }

    #[test]
    fn test_remove_hidden_elements() {
        let html = r#"
            <body>
                <div style="display:none">Hidden content</div>
                <div style="visibility: hidden">Invisible content</div>
                <div hidden>Attribute hidden</div>
                <div>Visible content</div>
            </body>
        "#;

        let result = preprocess_html(html, &PreprocessConfig::default());
        assert!(!result.contains("Hidden content"));
        assert!(!result.contains("Invisible content"));
        assert!(!result.contains("Attribute hidden"));
        assert!(result.contains("Visible content"));
    }

    #[test]
    fn test_disabled_config_keeps_everything() {
        let html = "<body><nav>Menu</nav><div class=\"ads\">Buy</div><p>Text</p></body>";
        let config = PreprocessConfig {
            remove_tags: false,
            remove_boilerplate_classes: false,
            remove_roles: false,
            remove_hidden: false,
            remove_comments: false,
        };

        let result = preprocess_html(html, &config);
        assert!(result.contains("Menu"));
        assert!(result.contains("Buy"));
    }

    #[test]
    fn test_preserves_preformatted_whitespace() {
        let html = "<body><pre>fn main() {\n    run();\n}</pre></body>";
        let result = preprocess_html(html, &PreprocessConfig::default());
        assert!(result.contains("fn main() {\n    run();\n}"));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(preprocess_html("", &PreprocessConfig::default()), "");
    }
}
