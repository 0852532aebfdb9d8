//! Identifier normalization.
//!
//! Turns arbitrary, possibly non-ASCII labels into identifier candidates:
//! diacritics are stripped, locale-specific letters are transliterated,
//! everything outside `[A-Za-z0-9]` becomes a separator, and the remaining
//! tokens are joined in camel case.

use rand::Rng;
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::utils::to_camel_case;

/// Length of the placeholder returned for degenerate labels.
pub const PLACEHOLDER_LEN: usize = 10;

const SEPARATOR: char = '_';

/// Letters that do not decompose under NFD.
const TRANSLITERATIONS: &[(char, &str)] = &[
    ('ß', "ss"),
    ('ẞ', "SS"),
    ('æ', "ae"),
    ('Æ', "AE"),
    ('œ', "oe"),
    ('Œ', "OE"),
    ('ø', "o"),
    ('Ø', "O"),
    ('ł', "l"),
    ('Ł', "L"),
    ('đ', "d"),
    ('Đ', "D"),
    ('ð', "d"),
    ('Ð', "D"),
    ('þ', "th"),
    ('Þ', "TH"),
];

/// Normalize a label into an identifier.
///
/// Blank or symbol-only labels yield a random alphabetic placeholder of
/// [`PLACEHOLDER_LEN`] characters; this is the only non-deterministic output.
pub fn normalize(raw: &str, capitalize_first: bool) -> String {
    try_normalize(raw, capitalize_first).unwrap_or_else(|| placeholder(capitalize_first))
}

/// Normalize a label, returning `None` when nothing meaningful remains.
pub fn try_normalize(raw: &str, capitalize_first: bool) -> Option<String> {
    let mut separated = String::with_capacity(raw.len());
    for c in raw.nfd().filter(|c| !is_combining_mark(*c)) {
        if c.is_ascii_alphanumeric() {
            separated.push(c);
        } else if let Some((_, replacement)) = TRANSLITERATIONS.iter().find(|(from, _)| *from == c)
        {
            separated.push_str(replacement);
        } else {
            separated.push(SEPARATOR);
        }
    }

    let trimmed = separated.trim_matches(SEPARATOR);
    if trimmed.is_empty() {
        return None;
    }

    let camel = to_camel_case(trimmed, capitalize_first, SEPARATOR);
    Some(sanitize_leading_digit(&camel, capitalize_first))
}

/// Prefix `N`/`n` when an identifier would start with a digit.
pub fn sanitize_leading_digit(identifier: &str, capitalize_first: bool) -> String {
    match identifier.chars().next() {
        Some(c) if c.is_ascii_digit() => {
            let prefix = if capitalize_first { 'N' } else { 'n' };
            format!("{}{}", prefix, identifier)
        }
        _ => identifier.to_string(),
    }
}

/// Random alphabetic placeholder for degenerate labels.
pub fn placeholder(capitalize_first: bool) -> String {
    const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

    let mut rng = rand::rng();
    let mut result: String = (0..PLACEHOLDER_LEN)
        .map(|_| LETTERS[rng.random_range(0..LETTERS.len())] as char)
        .collect();

    let first = if capitalize_first {
        result[..1].to_uppercase()
    } else {
        result[..1].to_lowercase()
    };
    result.replace_range(..1, &first);
    result
}
