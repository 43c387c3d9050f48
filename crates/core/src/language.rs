//! Target language selection.
//!
//! A target is written either as a language code (`hi-IN`), meaning
//! translate, or as `transliterate-<code>` (`transliterate-hi`), meaning
//! transliterate into that language's script. Bare codes are normalized to
//! their `-IN` regional form.

use std::fmt;

use crate::transform::TransformMode;
use crate::{Result, VertitoError};

/// Prefix selecting transliteration
pub const TRANSLITERATE_PREFIX: &str = "transliterate-";

/// Supported language codes and their English names
pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("hi", "Hindi"),
    ("bn", "Bengali"),
    ("gu", "Gujarati"),
    ("kn", "Kannada"),
    ("ml", "Malayalam"),
    ("mr", "Marathi"),
    ("od", "Odia"),
    ("pa", "Punjabi"),
    ("ta", "Tamil"),
    ("te", "Telugu"),
    ("en", "English"),
];

/// Region suffix appended to every language code
const REGION: &str = "IN";

/// A parsed target: what to do and into which language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub mode: TransformMode,
    /// Normalized code such as `hi-IN`
    pub language: String,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            TransformMode::Translate => write!(f, "{}", self.language),
            TransformMode::Transliterate => write!(f, "{}{}", TRANSLITERATE_PREFIX, self.language),
        }
    }
}

impl Target {
    /// English name of the target language
    pub fn language_name(&self) -> Option<&'static str> {
        let code = self.language.split('-').next()?;
        language_name(code)
    }
}

/// English name for a bare language code
pub fn language_name(code: &str) -> Option<&'static str> {
    SUPPORTED_LANGUAGES.iter().find(|(c, _)| *c == code).map(|(_, name)| *name)
}

/// Parse a target string into a mode and normalized language code.
///
/// # Errors
///
/// Returns [`VertitoError::InvalidLanguage`] for empty input, unknown
/// languages and regions other than `IN`.
///
/// # Example
///
/// ```rust
/// use vertito_core::language::parse_target;
/// use vertito_core::TransformMode;
///
/// let target = parse_target("transliterate-ta").unwrap();
/// assert_eq!(target.mode, TransformMode::Transliterate);
/// assert_eq!(target.language, "ta-IN");
/// ```
pub fn parse_target(input: &str) -> Result<Target> {
    let value = input.trim().to_ascii_lowercase();
    let invalid = || VertitoError::InvalidLanguage(input.trim().to_string());

    let (mode, code) = match value.strip_prefix(TRANSLITERATE_PREFIX) {
        Some(code) => (TransformMode::Transliterate, code),
        None => (TransformMode::Translate, value.as_str()),
    };

    let (lang, region) = match code.split_once('-') {
        Some((lang, region)) => (lang, Some(region)),
        None => (code, None),
    };

    if region.is_some_and(|r| !r.eq_ignore_ascii_case(REGION)) || language_name(lang).is_none() {
        return Err(invalid());
    }

    Ok(Target { mode, language: format!("{lang}-{REGION}") })
}
