//! Structural addressing of values inside nested bodies.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Segment marking an array element in an access path.
///
/// A value reachable only through an array is addressed through this marker
/// (e.g. `/items/[0]/id`), which also makes the producer a *nested body
/// resource* for ranking purposes.
pub const ARRAY_MARKER: &str = "[0]";

/// The structural address of a value inside a request or response body.
///
/// An access path is an ordered sequence of property-name segments (with
/// [`ARRAY_MARKER`] standing in for array elements). Paths are immutable:
/// derived paths ([`parent`](Self::parent), [`child`](Self::child)) are new
/// values. The empty path is a distinguished value meaning "the whole body".
///
/// Segments are never empty strings — constructors drop them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessPath {
    segments: Vec<String>,
}

impl AccessPath {
    /// The empty path ("no path / whole value").
    #[must_use]
    pub fn empty() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Build a path from an ordered list of segments, dropping empty ones.
    #[must_use]
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments
                .into_iter()
                .map(Into::into)
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    /// Parse a JSON-pointer-like path string (`/a/b/[0]/c`).
    ///
    /// Total: a string that does not start with `/` is *not a path* and
    /// yields `None` rather than an error, so callers can fall back to
    /// name-based matching. Empty segments are dropped.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        if !s.starts_with('/') {
            return None;
        }
        Some(Self::from_segments(s.split('/')))
    }

    /// The path segments in order.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments. Longer paths are more specific matches.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether this is the empty path.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The name part: the last segment that is not the array marker.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.segments
            .iter()
            .rev()
            .find(|s| s.as_str() != ARRAY_MARKER)
            .map(String::as_str)
    }

    /// The parent path (all but the last segment).
    ///
    /// The empty path is its own parent.
    #[must_use]
    pub fn parent(&self) -> Self {
        match self.segments.split_last() {
            Some((_, rest)) => Self {
                segments: rest.to_vec(),
            },
            None => Self::empty(),
        }
    }

    /// A new path with `segment` appended (dropped if empty).
    #[must_use]
    pub fn child(&self, segment: &str) -> Self {
        let mut segments = self.segments.clone();
        if !segment.is_empty() {
            segments.push(segment.to_string());
        }
        Self { segments }
    }
}

impl fmt::Display for AccessPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}
