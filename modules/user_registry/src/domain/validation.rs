//! Field normalization for mobile numbers and PAN codes.

use once_cell::sync::Lazy;
use regex::Regex;

static PAN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{5}[0-9]{4}[A-Z]{1}$").unwrap());

/// Strip a leading `+91`, then a single leading `0`; the rest must be exactly 10 digits.
pub fn normalize_mobile(input: &str) -> Option<String> {
    let rest = input.strip_prefix("+91").unwrap_or(input);
    let rest = rest.strip_prefix('0').unwrap_or(rest);

    (rest.len() == 10 && rest.bytes().all(|b| b.is_ascii_digit())).then(|| rest.to_string())
}

/// Upper-case and match 5 letters, 4 digits, 1 letter.
pub fn normalize_pan(input: &str) -> Option<String> {
    let upper = input.to_uppercase();
    PAN_PATTERN.is_match(&upper).then_some(upper)
}

/// Empty strings are treated as "not supplied".
pub fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
