//! Shared string utilities for identifier generation.

/// Convert camelCase to snake_case (e.g., "definingCode" -> "defining_code").
///
/// An underscore is inserted only at lower-to-upper boundaries, so runs of
/// capitals such as "DV_TEXT" are kept together.
pub fn camel_to_snake(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let mut prev: Option<char> = None;
    for c in s.chars() {
        if c.is_uppercase() && prev.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit()) {
            result.push('_');
        }
        result.extend(c.to_lowercase());
        prev = Some(c);
    }
    result
}

/// Join `delimiter`-separated tokens into camel case.
///
/// The input is lowercased first; every token after the first starts with
/// a capital. `capitalize_first` selects PascalCase over lowerCamelCase.
/// Empty tokens are dropped.
pub fn to_camel_case(s: &str, capitalize_first: bool, delimiter: char) -> String {
    let lower = s.to_lowercase();
    let mut result = String::with_capacity(lower.len());
    for (i, token) in lower.split(delimiter).filter(|t| !t.is_empty()).enumerate() {
        let mut chars = token.chars();
        if let Some(first) = chars.next() {
            if i > 0 || capitalize_first {
                result.extend(first.to_uppercase());
            } else {
                result.push(first);
            }
            result.extend(chars);
        }
    }
    result
}

/// Convert camelCase to UPPER_SNAKE_CASE (e.g., "leftArm" -> "LEFT_ARM").
pub fn to_upper_snake(s: &str) -> String {
    camel_to_snake(s).to_uppercase()
}

/// Cut `s` to at most `max_width` characters, ending with `marker` when cut.
pub fn abbreviate(s: &str, marker: &str, max_width: usize) -> String {
    let len = s.chars().count();
    let marker_len = marker.chars().count();
    if len <= max_width || max_width <= marker_len {
        return s.to_string();
    }
    let mut result: String = s.chars().take(max_width - marker_len).collect();
    result.push_str(marker);
    result
}
