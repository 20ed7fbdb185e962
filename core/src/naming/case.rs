//! # Case Utilities
//!
//! Helper functions for deriving identifiers from schema titles, property
//! names and security scheme names.

use regex::Regex;
use std::sync::OnceLock;

/// Converts a mixed-case or delimited string to snake_case.
///
/// Non-alphanumeric characters act as separators and acronym runs stay
/// together, e.g. `X-API-Key` -> `x_api_key`, `userId` -> `user_id`.
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !result.is_empty() && !result.ends_with('_') {
                result.push('_');
            }
            continue;
        }
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let boundary = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower);
            if boundary && !result.is_empty() && !result.ends_with('_') {
                result.push('_');
            }
        }
        for lc in c.to_lowercase() {
            result.push(lc);
        }
    }

    result.trim_end_matches('_').to_string()
}

/// Converts a role or title into a type-style name.
///
/// Words are split on any non-alphanumeric run; each word's first letter is
/// upper-cased and the rest is kept. `pet owner` -> `PetOwner`,
/// `user_profile` -> `UserProfile`, `homeAddress` -> `HomeAddress`.
pub fn title_case(s: &str) -> String {
    static WORD_RE: OnceLock<Regex> = OnceLock::new();
    let word_re = WORD_RE.get_or_init(|| Regex::new(r"[A-Za-z0-9]+").expect("Invalid regex"));

    let mut out = String::with_capacity(s.len());
    for word in word_re.find_iter(s) {
        let mut chars = word.as_str().chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }

    // Type names cannot start with a digit.
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, 'T');
    }
    out
}
