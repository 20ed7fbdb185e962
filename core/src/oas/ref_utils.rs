//! # Reference Utilities
//!
//! Turns `$ref` strings into component lookups.
//!
//! These utilities never fetch external documents. Absolute or relative
//! references are treated as local when their document part matches the
//! current document's `$self` URI; anything else is unresolved.

use crate::error::{AppError, AppResult};
use percent_encoding::percent_decode_str;
use std::fmt;
use url::Url;

/// The Components Object sections a `$ref` may target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentSection {
    /// `#/components/schemas/...`
    Schemas,
    /// `#/components/parameters/...`
    Parameters,
    /// `#/components/requestBodies/...`
    RequestBodies,
    /// `#/components/securitySchemes/...`
    SecuritySchemes,
}

impl ComponentSection {
    fn key(&self) -> &'static str {
        match self {
            ComponentSection::Schemas => "schemas",
            ComponentSection::Parameters => "parameters",
            ComponentSection::RequestBodies => "requestBodies",
            ComponentSection::SecuritySchemes => "securitySchemes",
        }
    }
}

impl fmt::Display for ComponentSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Extracts the component name a `$ref` points at.
///
/// Fails with [`AppError::UnresolvedReference`] when the reference is external,
/// malformed, or targets a different section.
pub fn component_name(
    ref_str: &str,
    self_uri: Option<&str>,
    section: ComponentSection,
) -> AppResult<String> {
    let unresolved = || AppError::UnresolvedReference(ref_str.to_string());

    let fragment = local_fragment(ref_str, self_uri).ok_or_else(unresolved)?;
    let segments: Vec<&str> = fragment.trim_start_matches('/').split('/').collect();

    match segments.as_slice() {
        ["components", sec, name] if *sec == section.key() => {
            let decoded = decode_pointer_segment(name);
            if decoded.is_empty() {
                Err(unresolved())
            } else {
                Ok(decoded)
            }
        }
        _ => Err(unresolved()),
    }
}

/// Returns the JSON-pointer fragment (without `#`) of a reference into the
/// current document.
fn local_fragment(ref_str: &str, self_uri: Option<&str>) -> Option<String> {
    let (document, fragment) = match ref_str.split_once('#') {
        Some((doc, frag)) => (doc, frag),
        None => (ref_str, ""),
    };

    if document.is_empty() {
        return Some(fragment.to_string());
    }

    let self_uri = self_uri?;
    if document_matches_self(document, self_uri) {
        Some(fragment.to_string())
    } else {
        None
    }
}

/// Decodes a JSON Pointer segment (handles `~1`, `~0` and percent-encoding).
pub(crate) fn decode_pointer_segment(segment: &str) -> String {
    let decoded = segment.replace("~1", "/").replace("~0", "~");
    percent_decode_str(&decoded)
        .decode_utf8_lossy()
        .into_owned()
}

fn document_matches_self(document: &str, self_uri: &str) -> bool {
    if document == self_uri {
        return true;
    }

    match (Url::parse(document), Url::parse(self_uri)) {
        (Ok(doc_url), Ok(self_url)) => {
            doc_url.scheme() == self_url.scheme()
                && doc_url.host() == self_url.host()
                && doc_url.port() == self_url.port()
                && doc_url.path() == self_url.path()
        }
        // `$self` given as an absolute path: compare against the URL path.
        (Ok(doc_url), Err(_)) if self_uri.starts_with('/') => doc_url.path() == self_uri,
        _ => false,
    }
}
