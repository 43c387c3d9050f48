//! HTML parsing and read-only DOM access.
//!
//! This module provides the [`Document`] and [`Element`] types used by the
//! scorer, the content selector and the structural renderer. The tree is never
//! mutated after parsing: disqualified subtrees are removed by a filtering pass
//! over the source text (see [`crate::preprocess`]) that yields a new document,
//! so the caller's original HTML is left untouched.
//!
//! # Example
//!
//! ```rust
//! use vertito_core::parse::Document;
//!
//! let html = r#"
//!     <html>
//!         <body>
//!             <h1>Title</h1>
//!             <p class="content">Paragraph</p>
//!         </body>
//!     </html>
//! "#;
//!
//! let doc = Document::parse(html).unwrap();
//! let paragraphs = doc.select("p.content").unwrap();
//! assert_eq!(paragraphs.len(), 1);
//! ```

use scraper::{ElementRef, Html, Selector};

use crate::preprocess::{self, PreprocessConfig};
use crate::{Result, VertitoError};

/// Represents a parsed HTML document.
///
/// # Example
///
/// ```rust
/// use vertito_core::parse::Document;
///
/// let html = "<html><head><title>Test</title></head><body><p>Hello</p></body></html>";
/// let doc = Document::parse(html).unwrap();
/// assert_eq!(doc.body().unwrap().text(), "Hello");
/// ```
#[derive(Clone)]
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses HTML from a string without any cleaning.
    pub fn parse(html: &str) -> Result<Self> {
        let html = Html::parse_document(html);
        Ok(Self { html })
    }

    /// Parses HTML after removing disqualified subtrees.
    ///
    /// The filtering pass runs on a copy of the source, so the returned
    /// document is a private snapshot and `html` itself is not modified.
    ///
    /// # Example
    ///
    /// ```rust
    /// use vertito_core::parse::Document;
    /// use vertito_core::PreprocessConfig;
    ///
    /// let html = "<body><nav>Home</nav><article><p>Body</p></article></body>";
    /// let doc = Document::parse_cleaned(html, &PreprocessConfig::default()).unwrap();
    /// assert!(doc.select("nav").unwrap().is_empty());
    /// ```
    pub fn parse_cleaned(html: &str, config: &PreprocessConfig) -> Result<Self> {
        let cleaned = preprocess::preprocess_html(html, config);
        Self::parse(&cleaned)
    }

    /// Selects elements using a CSS selector, in document order.
    ///
    /// # Errors
    ///
    /// Returns [`VertitoError::HtmlParseError`] if the selector is invalid.
    ///
    /// # Example
    ///
    /// ```rust
    /// use vertito_core::parse::Document;
    ///
    /// let html = r#"<p class="content">First</p><p class="content">Second</p>"#;
    /// let doc = Document::parse(html).unwrap();
    /// let elements = doc.select("p.content").unwrap();
    /// assert_eq!(elements.len(), 2);
    /// ```
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = parse_selector(selector)?;
        Ok(self.html.select(&sel).map(|el| Element { element: el }).collect())
    }

    /// Returns the first element matching `selector`, if any.
    pub fn select_first(&'_ self, selector: &str) -> Result<Option<Element<'_>>> {
        let sel = parse_selector(selector)?;
        Ok(self.html.select(&sel).next().map(|el| Element { element: el }))
    }

    /// Gets the `<body>` element.
    ///
    /// html5ever always synthesizes a body, so this is only `None` for
    /// frameset documents.
    pub fn body(&self) -> Option<Element<'_>> {
        self.select_first("body").ok().flatten()
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| VertitoError::HtmlParseError(format!("Invalid selector: {}", e)))
}

/// A borrowed element of a [`Document`].
///
/// Exposes exactly what the scorer and renderers consume: tag name, text,
/// attributes, descendants and raw child nodes.
///
/// # Example
///
/// ```rust
/// use vertito_core::parse::Document;
///
/// let html = r#"<div class="post" role="main">Body text</div>"#;
/// let doc = Document::parse(html).unwrap();
/// let div = &doc.select("div").unwrap()[0];
///
/// assert_eq!(div.text(), "Body text");
/// assert_eq!(div.class(), Some("post"));
/// assert_eq!(div.attr("role"), Some("main"));
/// ```
#[derive(Clone, Debug)]
pub struct Element<'a> {
    element: ElementRef<'a>,
}

impl<'a> Element<'a> {
    /// Gets the outer HTML of this element.
    pub fn outer_html(&self) -> String {
        self.element.html()
    }

    /// Gets the concatenated text of all descendant text nodes.
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    /// Gets the value of an attribute.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.element.value().attr(name)
    }

    /// Gets the class attribute.
    pub fn class(&self) -> Option<&str> {
        self.attr("class")
    }

    /// Gets the lowercase tag name.
    pub fn tag_name(&self) -> String {
        self.element.value().name().to_lowercase()
    }

    /// Selects descendant elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`VertitoError::HtmlParseError`] if the selector is invalid.
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'a>>> {
        let sel = parse_selector(selector)?;
        Ok(self
            .element
            .select(&sel)
            .filter(|el| el.id() != self.element.id())
            .map(|el| Element { element: el })
            .collect())
    }

    /// Counts descendants matching `selector`; an invalid selector counts zero.
    pub fn count(&self, selector: &str) -> usize {
        self.select(selector).map(|found| found.len()).unwrap_or(0)
    }

    /// The underlying scraper handle, for tree walks.
    pub(crate) fn node(&self) -> ElementRef<'a> {
        self.element
    }
}
