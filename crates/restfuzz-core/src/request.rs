//! Operation identity and templated-endpoint parsing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// HTTP methods an operation can declare.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    /// GET
    Get,
    /// PUT
    Put,
    /// POST
    Post,
    /// PATCH
    Patch,
    /// DELETE
    Delete,
    /// HEAD
    Head,
    /// OPTIONS
    Options,
}

impl HttpMethod {
    /// Lowercase method name (`"get"`, `"post"`, ...).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Put => "put",
            Self::Post => "post",
            Self::Patch => "patch",
            Self::Delete => "delete",
            Self::Head => "head",
            Self::Options => "options",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a recognized HTTP method.
#[derive(Debug, thiserror::Error)]
#[error("unrecognized HTTP method '{0}'")]
pub struct MethodParseError(String);

impl FromStr for HttpMethod {
    type Err = MethodParseError;

    /// Case-insensitive: `"POST"`, `"post"` and `"Post"` all parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Ok(Self::Get),
            "put" => Ok(Self::Put),
            "post" => Ok(Self::Post),
            "patch" => Ok(Self::Patch),
            "delete" => Ok(Self::Delete),
            "head" => Ok(Self::Head),
            "options" => Ok(Self::Options),
            _ => Err(MethodParseError(s.to_string())),
        }
    }
}

/// Normalize an endpoint string for identity comparison.
///
/// Endpoints following the `x-ms-path` convention encode a synthetic query
/// string in the path template (`/foo?bar=baz`). Normalization rewrites
/// `?`, `=` and `&` into path separators so both representations of the
/// same resource shape compare equal: `/foo?bar=baz` → `/foo/bar/baz`.
///
/// Duplicate separators are collapsed and a trailing separator is dropped,
/// which makes the function idempotent.
#[must_use]
pub fn normalize_endpoint(endpoint: &str) -> String {
    let rewritten: String = endpoint
        .chars()
        .map(|c| if matches!(c, '?' | '=' | '&') { '/' } else { c })
        .collect();

    let mut out = String::with_capacity(rewritten.len());
    for segment in rewritten.split('/').filter(|s| !s.is_empty()) {
        out.push('/');
        out.push_str(segment);
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}

/// The identity of one API operation: normalized endpoint + HTTP method.
///
/// Two `RequestId`s are equal iff both fields match exactly after endpoint
/// normalization. Used as a map key throughout the engine.
#[derive(
    Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct RequestId {
    /// Normalized endpoint path (see [`normalize_endpoint`]).
    pub endpoint: String,
    /// HTTP method.
    pub method: HttpMethod,
}

impl RequestId {
    /// Build an identity, normalizing the endpoint.
    #[must_use]
    pub fn new(endpoint: &str, method: HttpMethod) -> Self {
        Self {
            endpoint: normalize_endpoint(endpoint),
            method,
        }
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.endpoint)
    }
}

/// One typed part of a templated endpoint path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TemplatePart {
    /// A literal path segment (`stores`).
    Constant(String),
    /// The `/` separator between segments.
    Separator,
    /// A named parameter placeholder (`{storeId}` → `storeId`).
    Parameter(String),
}

/// A parsed endpoint template (`/stores/{storeId}/order/{orderId}`).
///
/// Parsing only represents the template; checking that the declared path
/// parameters are consistent with an operation's parameter list is the
/// schema loader's job, reported there as a schema-validation error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathTemplate {
    parts: Vec<TemplatePart>,
}

impl PathTemplate {
    /// Parse an endpoint template into its ordered parts.
    #[must_use]
    pub fn parse(endpoint: &str) -> Self {
        let mut parts = Vec::new();
        for segment in endpoint.split('/') {
            if segment.is_empty() {
                continue;
            }
            parts.push(TemplatePart::Separator);
            let part = segment
                .strip_prefix('{')
                .and_then(|s| s.strip_suffix('}'))
                .map_or_else(
                    || TemplatePart::Constant(segment.to_string()),
                    |name| TemplatePart::Parameter(name.to_string()),
                );
            parts.push(part);
        }
        Self { parts }
    }

    /// The ordered template parts.
    #[must_use]
    pub fn parts(&self) -> &[TemplatePart] {
        &self.parts
    }

    /// Iterate over the named parameters in template order.
    pub fn parameters(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().filter_map(|p| match p {
            TemplatePart::Parameter(name) => Some(name.as_str()),
            _ => None,
        })
    }

    /// Whether `name` occurs as a path parameter (exact match).
    #[must_use]
    pub fn contains_parameter(&self, name: &str) -> bool {
        self.parameters().any(|p| p == name)
    }

    /// Whether the template ends in a parameter placeholder.
    ///
    /// Distinguishes item-style endpoints (`/stores/{storeId}`) from
    /// collection-style ones (`/stores`) when ranking GET producers.
    #[must_use]
    pub fn ends_with_parameter(&self) -> bool {
        matches!(self.parts.last(), Some(TemplatePart::Parameter(_)))
    }

    /// The literal prefix up to (but excluding) the named parameter.
    ///
    /// The parameter name is matched case-insensitively. Returns `None`
    /// when the template has no such parameter.
    #[must_use]
    pub fn prefix_before_parameter(&self, name: &str) -> Option<String> {
        let mut prefix = String::new();
        for part in &self.parts {
            match part {
                TemplatePart::Parameter(p) if p.eq_ignore_ascii_case(name) => {
                    return Some(prefix);
                }
                TemplatePart::Parameter(p) => {
                    prefix.push('{');
                    prefix.push_str(p);
                    prefix.push('}');
                }
                TemplatePart::Constant(c) => prefix.push_str(c),
                TemplatePart::Separator => prefix.push('/'),
            }
        }
        None
    }
}
