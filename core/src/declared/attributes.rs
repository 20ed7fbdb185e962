//! # Attribute Operations
//!
//! internal logic for parsing `#[serde(...)]` attributes on extracted types.

use ra_ap_syntax::ast::{self};
use ra_ap_syntax::{AstNode, SyntaxNode};
use regex::Regex;
use std::sync::OnceLock;

/// Helper struct for attributes extracted from a single node.
#[derive(Default, Debug, PartialEq, Eq)]
pub struct AttrInfo {
    /// The rename value if present.
    pub rename: Option<String>,
    /// The container-level `rename_all` rule if present.
    pub rename_all: Option<String>,
    /// Whether the skip flag was found.
    pub is_skipped: bool,
    /// Whether `default` was found (the field may be omitted).
    pub has_default: bool,
    /// Whether the untagged flag was found (for enums).
    pub untagged: bool,
}

/// Analyzes attributes on a node to find `serde` configurations.
pub fn extract_attributes(node: &SyntaxNode) -> AttrInfo {
    let mut info = AttrInfo::default();

    let attributes = node.children().filter_map(ast::Attr::cast);

    for attr in attributes {
        if let Some(meta) = attr.meta() {
            if let Some(path) = meta.path() {
                if path.to_string() == "serde" {
                    if let Some(tt) = meta.token_tree() {
                        parse_attribute_content(&tt.to_string(), &mut info);
                    }
                }
            }
        }
    }

    info
}

/// Parses the inner content of an attribute.
fn parse_attribute_content(content: &str, info: &mut AttrInfo) {
    static RENAME_RE: OnceLock<Regex> = OnceLock::new();
    let rename_re =
        RENAME_RE.get_or_init(|| Regex::new(r#"\brename\s*=\s*"([^"]+)""#).expect("Invalid regex"));

    static RENAME_ALL_RE: OnceLock<Regex> = OnceLock::new();
    let rename_all_re = RENAME_ALL_RE
        .get_or_init(|| Regex::new(r#"\brename_all\s*=\s*"([^"]+)""#).expect("Invalid regex"));

    static SKIP_RE: OnceLock<Regex> = OnceLock::new();
    let skip_re = SKIP_RE.get_or_init(|| Regex::new(r#"\bskip\b"#).expect("Invalid regex"));

    static DEFAULT_RE: OnceLock<Regex> = OnceLock::new();
    let default_re =
        DEFAULT_RE.get_or_init(|| Regex::new(r#"\bdefault\b"#).expect("Invalid regex"));

    static UNTAGGED_RE: OnceLock<Regex> = OnceLock::new();
    let untagged_re =
        UNTAGGED_RE.get_or_init(|| Regex::new(r#"\buntagged\b"#).expect("Invalid regex"));

    if let Some(val) = rename_re.captures(content).and_then(|c| c.get(1)) {
        info.rename = Some(val.as_str().to_string());
    }
    if let Some(val) = rename_all_re.captures(content).and_then(|c| c.get(1)) {
        info.rename_all = Some(val.as_str().to_string());
    }

    if skip_re.is_match(content) {
        info.is_skipped = true;
    }
    if default_re.is_match(content) {
        info.has_default = true;
    }
    if untagged_re.is_match(content) {
        info.untagged = true;
    }
}

/// Applies a serde `rename_all` rule to a snake_case field identifier.
/// Unknown rules leave the name untouched.
pub fn apply_rename_all(rule: &str, field: &str) -> String {
    let words: Vec<&str> = field.split('_').filter(|w| !w.is_empty()).collect();
    let capitalize = |w: &str| {
        let mut chars = w.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
            None => String::new(),
        }
    };

    match rule {
        "camelCase" => words
            .iter()
            .enumerate()
            .map(|(i, w)| if i == 0 { w.to_string() } else { capitalize(*w) })
            .collect(),
        "PascalCase" => words.iter().map(|w| capitalize(*w)).collect(),
        "kebab-case" => words.join("-"),
        "SCREAMING_SNAKE_CASE" => field.to_uppercase(),
        "lowercase" => field.to_lowercase(),
        "UPPERCASE" => field.to_uppercase(),
        _ => field.to_string(),
    }
}
