use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

// Whitespace includes the ASCII information separators U+001C..U+001F.
lazy_static! {
    static ref URL_PATTERN: Regex =
        Regex::new(r"http[^\s\x1c-\x1f]+|www[^\s\x1c-\x1f]+|https[^\s\x1c-\x1f]+")
            .expect("URL pattern must compile");
    static ref NON_LETTER_PATTERN: Regex =
        Regex::new(r"[^a-zA-Z\s\x1c-\x1f]").expect("non-letter pattern must compile");
    static ref WHITESPACE_PATTERN: Regex =
        Regex::new(r"[\s\x1c-\x1f]+").expect("whitespace pattern must compile");
}

/// Converts raw user input into the canonical form the classifier was trained on.
///
/// The steps are applied in a fixed order:
/// 1. Lowercase the whole string
/// 2. Strip URL-like runs (`http…`, `https…`, `www…`)
/// 3. Drop every character that is not an ASCII letter or whitespace
/// 4. Collapse whitespace runs into a single space
/// 5. Trim both ends
///
/// The result contains only lowercase ASCII letters separated by single
/// spaces. The function is total and idempotent.
///
/// # Example
/// ```
/// use sentiment_analyzer::normalize;
///
/// assert_eq!(normalize("Wow!! 123 great??"), "wow great");
/// assert_eq!(normalize("check https://x.co/p now"), "check now");
/// ```
pub fn normalize(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let without_urls = URL_PATTERN.replace_all(&lowered, "");
    let letters_only = NON_LETTER_PATTERN.replace_all(&without_urls, "");
    // Removing punctuation can splice a new URL-like run together ("ht.tpx").
    let letters_only = URL_PATTERN.replace_all(&letters_only, "");
    let collapsed = WHITESPACE_PATTERN.replace_all(&letters_only, " ");
    collapsed.trim().to_string()
}

/// Text that has already passed through [`normalize`].
///
/// The only way to obtain one is by normalizing, so a prediction can never
/// see raw input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct NormalizedText(String);

impl NormalizedText {
    pub fn new(raw: &str) -> Self {
        Self(normalize(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for NormalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
