//! Label normalization.
//!
//! Material labels are written by people and language models, so the same
//! data point shows up as `"Hometown (self-reported) more than 200k"`,
//! `"Hometown > 200k - yes"` and so on. [`normalize`] reduces them to a
//! comparable form.
//!
//! # Steps
//!
//! 1. Drop parenthesized asides together with their parentheses
//! 2. Drop a trailing polarity/qualifier clause (`yes`, `no`, `on list provided`,
//!    `don't`, `do not`) through end of string
//! 3. Rewrite `more than` as `>` and `less than` as `<`
//! 4. Collapse whitespace and trim
//!
//! Normalization never fails and is idempotent:
//! `normalize(&normalize(s)) == normalize(s)`.

use once_cell::sync::Lazy;
use regex::Regex;

// Innermost parenthesized group; applied until no pair remains
static PARENTHESIZED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\([^()]*\)").expect("Invalid parenthesis regex pattern"));

// Separators directly before the qualifier are stripped with it
static TRAILING_QUALIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)[\s,;:/\-–—]*\b(?:yes|no|on\s+list\s+provided|don['’]?t|do\s+not)\b.*$")
        .expect("Invalid qualifier regex pattern")
});

static MORE_THAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bmore\s+than\b").expect("Invalid comparison regex pattern"));

static LESS_THAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bless\s+than\b").expect("Invalid comparison regex pattern"));

/// Canonicalizes a raw label into its comparable form.
///
/// # Examples
///
/// ```
/// use humanbench_core::normalize;
///
/// assert_eq!(normalize("Hometown (self-reported) more than 200k"), "Hometown > 200k");
/// assert_eq!(normalize("Owns a car - yes"), "Owns a car");
/// assert_eq!(normalize(""), "");
/// ```
pub fn normalize(label: &str) -> String {
    if label.is_empty() {
        return String::new();
    }

    let mut text = label.to_string();
    while PARENTHESIZED.is_match(&text) {
        text = PARENTHESIZED.replace_all(&text, "").into_owned();
    }

    let text = TRAILING_QUALIFIER.replace(&text, "");
    let text = MORE_THAN.replace_all(&text, ">");
    let text = LESS_THAN.replace_all(&text, "<");

    collapse_whitespace(&text)
}

/// Lowercased whitespace tokens of an already-normalized string.
pub(crate) fn tokens(normalized: &str) -> impl Iterator<Item = String> + '_ {
    normalized.split_whitespace().map(str::to_lowercase)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
