//! Utility functions and helpers.

pub mod http;

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

static NON_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9]").expect("static regex"));

/// Resolve a potentially relative URL against a base URL.
pub fn resolve_url(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Keep only ASCII digits: `"r12"` -> `"12"`, `"3*"` -> `"3"`.
pub fn digits(text: &str) -> String {
    NON_DIGITS.replace_all(text, "").into_owned()
}

/// Parse the digits of `text` as an integer, ignoring every other character.
pub fn parse_digits<T: std::str::FromStr>(text: &str) -> Option<T> {
    digits(text).parse().ok()
}

/// Lowercase and collapse whitespace, for label comparisons.
pub fn normalize_label(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
