//! # OpenAPI Models
//!
//! Small value types shared by the document layer, the resolver and the
//! declared service model.

use crate::error::{AppError, AppResult};
use std::fmt;
use std::str::FromStr;

/// HTTP methods an OpenAPI Path Item can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HttpMethod {
    /// `get`
    Get,
    /// `put`
    Put,
    /// `post`
    Post,
    /// `delete`
    Delete,
    /// `options`
    Options,
    /// `head`
    Head,
    /// `patch`
    Patch,
    /// `trace`
    Trace,
}

impl HttpMethod {
    /// All methods in Path Item declaration order.
    pub const ALL: [HttpMethod; 8] = [
        HttpMethod::Get,
        HttpMethod::Put,
        HttpMethod::Post,
        HttpMethod::Delete,
        HttpMethod::Options,
        HttpMethod::Head,
        HttpMethod::Patch,
        HttpMethod::Trace,
    ];

    /// Lower-case name as used for Path Item keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Put => "put",
            HttpMethod::Post => "post",
            HttpMethod::Delete => "delete",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
            HttpMethod::Patch => "patch",
            HttpMethod::Trace => "trace",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        let lower = s.to_ascii_lowercase();
        HttpMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == lower)
            .ok_or_else(|| AppError::General(format!("Unknown HTTP method '{}'", s)))
    }
}

/// The location of a parameter. Cookie parameters are not modelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamLocation {
    /// URL Path parameter (e.g. /users/{id})
    Path,
    /// URL Query parameter (e.g. /users?page=1)
    Query,
    /// Request header.
    Header,
}

impl ParamLocation {
    /// Maps the raw `in` value of a Parameter Object. Returns `None` for
    /// `cookie` and unknown locations.
    pub fn from_in(value: &str) -> Option<Self> {
        match value {
            "path" => Some(ParamLocation::Path),
            "query" => Some(ParamLocation::Query),
            "header" => Some(ParamLocation::Header),
            _ => None,
        }
    }
}

impl fmt::Display for ParamLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamLocation::Path => write!(f, "path"),
            ParamLocation::Query => write!(f, "query"),
            ParamLocation::Header => write!(f, "header"),
        }
    }
}
