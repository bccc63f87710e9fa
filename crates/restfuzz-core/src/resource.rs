//! How a consumed parameter names the value it needs.

use serde::{Deserialize, Serialize};

use crate::access_path::AccessPath;

/// Where a consumer parameter is substituted into its request.
///
/// Purely a ranking/validity key — a header can only be satisfied by
/// header-compatible custom payload entries. Never part of identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    /// Path segment parameter.
    Path,
    /// Query string parameter.
    Query,
    /// HTTP header parameter.
    Header,
    /// Body property.
    Body,
}

/// Primitive payload kinds a parameter can declare.
///
/// Drives the per-kind default value lists in the mutations dictionary and
/// the context-free fuzzable fallback for unresolved consumers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    /// Arbitrary string.
    String,
    /// Integer.
    Int,
    /// Boolean.
    Bool,
    /// Floating-point number.
    Number,
    /// Calendar date.
    Date,
    /// Date with time.
    DateTime,
    /// UUID.
    Uuid,
    /// Whole JSON object/array.
    Object,
}

/// A reference to a produced/consumed resource.
///
/// A resource is identified either by name (shallow, legacy matching) or by
/// full structural path (precise matching) — never both meaningfully
/// populated at once.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceReference {
    /// Logical identifier, usually a property name.
    pub name: Option<String>,
    /// Full structural path into a body; empty when matching by name.
    pub path: AccessPath,
}

impl ResourceReference {
    /// A name-based (shallow) reference.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            path: AccessPath::empty(),
        }
    }

    /// A path-based (precise) reference.
    #[must_use]
    pub fn from_path(path: AccessPath) -> Self {
        Self {
            name: None,
            path,
        }
    }

    /// Resolve a raw identifier: a structured access-path string becomes a
    /// path reference, anything else a name reference.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match AccessPath::parse(raw) {
            Some(path) if !path.is_empty() => Self::from_path(path),
            _ => Self::from_name(raw),
        }
    }

    /// The resource name this reference matches under name-based lookup:
    /// the explicit name, or the name part of the path.
    #[must_use]
    pub fn resource_name(&self) -> Option<&str> {
        self.name.as_deref().or_else(|| self.path.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_prefers_structured_paths() {
        let r = ResourceReference::parse("/store/id");
        assert_eq!(r.name, None);
        assert_eq!(r.path, AccessPath::from_segments(["store", "id"]));
        assert_eq!(r.resource_name(), Some("id"));
    }

    #[test]
    fn parse_falls_back_to_names() {
        let r = ResourceReference::parse("storeId");
        assert_eq!(r.name.as_deref(), Some("storeId"));
        assert!(r.path.is_empty());
        assert_eq!(r.resource_name(), Some("storeId"));
    }
}
