//! Keyed payload tables and their structured keys.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use restfuzz_core::{HttpMethod, RequestId, ResourceReference};

use crate::error::{DictionaryError, Result};

/// One-or-many literal values for a dictionary key.
///
/// Dictionary documents may write a single value (`"x": "1"`) or a list
/// (`"x": ["1", "2"]`); both deserialize here. Serialization collapses a
/// single value back to the scalar form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PayloadValues {
    /// A single literal value.
    One(String),
    /// Several alternative literal values.
    Many(Vec<String>),
}

impl PayloadValues {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(v) => vec![v],
            Self::Many(vs) => vs,
        }
    }

    fn from_vec(mut values: Vec<String>) -> Self {
        if values.len() == 1 {
            Self::One(values.remove(0))
        } else {
            Self::Many(values)
        }
    }
}

/// A parsed keyed-table entry.
///
/// The raw document key is kept only for merging and serialization; lookups
/// go through the structured `request`/`resource` identities.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PayloadEntry {
    /// Key exactly as written in the document.
    pub raw_key: String,
    /// Scoping request, for `<endpoint>/<method>/<property>` keys.
    pub request: Option<RequestId>,
    /// The resource the entry applies to (name or access path).
    pub resource: ResourceReference,
    /// Literal values, in document order.
    pub values: Vec<String>,
}

/// One keyed override table (`custom_payload`, `custom_payload_query`, ...).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PayloadTable {
    entries: Vec<PayloadEntry>,
}

impl PayloadTable {
    /// Parse a raw document table, resolving every key into its structured
    /// form. Fails fast on the first malformed key.
    pub(crate) fn from_raw(raw: BTreeMap<String, PayloadValues>) -> Result<Self> {
        let mut entries = Vec::with_capacity(raw.len());
        for (key, values) in raw {
            let (request, resource) = parse_key(&key)?;
            entries.push(PayloadEntry {
                raw_key: key,
                request,
                resource,
                values: values.into_vec(),
            });
        }
        Ok(Self { entries })
    }

    pub(crate) fn to_raw(&self) -> BTreeMap<String, PayloadValues> {
        self.entries
            .iter()
            .map(|e| (e.raw_key.clone(), PayloadValues::from_vec(e.values.clone())))
            .collect()
    }

    /// The parsed entries, in key order.
    #[must_use]
    pub fn entries(&self) -> &[PayloadEntry] {
        &self.entries
    }

    /// Whether the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Union `other` into this table key-by-key: a key present in both keeps
    /// both value lists (concatenated, deduplicated); a key present in one
    /// side is carried over unchanged.
    pub(crate) fn union(&mut self, other: Self) {
        for entry in other.entries {
            match self
                .entries
                .iter_mut()
                .find(|e| e.raw_key == entry.raw_key)
            {
                Some(existing) => {
                    for value in entry.values {
                        if !existing.values.contains(&value) {
                            existing.values.push(value);
                        }
                    }
                }
                None => self.entries.push(entry),
            }
        }
    }

    /// Find the entry scoped to `request` whose access path equals the
    /// consumer's path exactly.
    pub(crate) fn find_scoped_path(
        &self,
        request: &RequestId,
        resource: &ResourceReference,
    ) -> Option<&PayloadEntry> {
        if resource.path.is_empty() {
            return None;
        }
        self.entries.iter().find(|e| {
            e.request.as_ref() == Some(request) && !e.resource.path.is_empty()
                && e.resource.path == resource.path
        })
    }

    /// Find the entry scoped to `request` matching the consumer by resource
    /// name.
    pub(crate) fn find_scoped_name(
        &self,
        request: &RequestId,
        resource: &ResourceReference,
    ) -> Option<&PayloadEntry> {
        let name = resource.resource_name()?;
        self.entries.iter().find(|e| {
            e.request.as_ref() == Some(request) && e.resource.resource_name() == Some(name)
        })
    }

    /// Find the bare (unscoped) entry matching the consumer by resource name.
    pub(crate) fn find_bare_name(&self, resource: &ResourceReference) -> Option<&PayloadEntry> {
        let name = resource.resource_name()?;
        self.entries
            .iter()
            .find(|e| e.request.is_none() && e.resource.resource_name() == Some(name))
    }
}

/// Payload kind tag attached to a dictionary hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomPayloadKind {
    /// Generic custom payload.
    String,
    /// Query-only custom payload.
    Query,
    /// Header-only custom payload.
    Header,
    /// Payload that generates a unique uuid4 suffix per use.
    UuidSuffix,
}

/// A resolved dictionary override for one consumer parameter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CustomPayload {
    /// Which table family produced the hit.
    pub kind: CustomPayloadKind,
    /// Literal values, in document order.
    pub values: Vec<String>,
    /// Whether the emitter should quote the substitution. Entries from the
    /// `*_unquoted` tables are substituted verbatim.
    pub quoted: bool,
    /// Whether the literal looks like a JSON object/array (starts with `{`
    /// or `[`), which also tells the emitter not to quote it.
    pub is_object: bool,
}

impl CustomPayload {
    pub(crate) fn from_entry(entry: &PayloadEntry, kind: CustomPayloadKind, quoted: bool) -> Self {
        let is_object = entry
            .values
            .first()
            .map(|v| {
                let v = v.trim_start();
                v.starts_with('{') || v.starts_with('[')
            })
            .unwrap_or(false);
        Self {
            kind,
            values: entry.values.clone(),
            quoted,
            is_object,
        }
    }
}

/// Parse a dictionary key into its structured identity.
///
/// Keys not starting with `/` are bare resource names. Keys starting with
/// `/` must have the form `<endpoint>/<method>/<propertyNameOrPath>`: the
/// rightmost segment naming an HTTP method splits the key, everything
/// before it is the endpoint and everything after is the property (a bare
/// name for one trailing segment, an access path for several).
fn parse_key(key: &str) -> Result<(Option<RequestId>, ResourceReference)> {
    if !key.starts_with('/') {
        return Ok((None, ResourceReference::from_name(key)));
    }

    let segments: Vec<&str> = key.split('/').filter(|s| !s.is_empty()).collect();
    let split = segments
        .iter()
        .enumerate()
        .rev()
        .filter(|&(i, _)| i >= 1 && i + 1 < segments.len())
        .find_map(|(i, s)| HttpMethod::from_str(s).ok().map(|m| (i, m)));

    let Some((method_index, method)) = split else {
        return Err(DictionaryError::InvalidKey {
            key: key.to_string(),
            reason: "request-type-scoped key needs an HTTP method segment between \
                     endpoint and property"
                .to_string(),
        });
    };

    let endpoint = format!("/{}", segments[..method_index].join("/"));
    let request = RequestId::new(&endpoint, method);

    let property = &segments[method_index + 1..];
    let resource = if property.len() == 1 {
        ResourceReference::from_name(property[0])
    } else {
        ResourceReference::from_path(restfuzz_core::AccessPath::from_segments(
            property.iter().copied(),
        ))
    };

    Ok((Some(request), resource))
}
