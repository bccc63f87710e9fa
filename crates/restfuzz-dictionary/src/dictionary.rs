//! The mutations dictionary: loading, merging and payload lookup.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use restfuzz_core::{ParameterKind, PrimitiveKind, RequestId, ResourceReference};

use crate::error::Result;
use crate::payload::{
    CustomPayload, CustomPayloadKind, PayloadTable, PayloadValues,
};

/// On-disk document shape of a mutations dictionary (JSON).
///
/// All fields are optional; absent tables stay empty and absent default
/// lists fall back to the built-in defaults after merging.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct DictionaryDocument {
    restler_fuzzable_string: Vec<String>,
    restler_fuzzable_int: Vec<String>,
    restler_fuzzable_bool: Vec<String>,
    restler_fuzzable_number: Vec<String>,
    restler_fuzzable_date: Vec<String>,
    restler_fuzzable_datetime: Vec<String>,
    restler_fuzzable_uuid4: Vec<String>,
    restler_fuzzable_object: Vec<String>,
    restler_custom_payload: BTreeMap<String, PayloadValues>,
    restler_custom_payload_unquoted: BTreeMap<String, PayloadValues>,
    restler_custom_payload_uuid4_suffix: BTreeMap<String, PayloadValues>,
    restler_custom_payload_header: BTreeMap<String, PayloadValues>,
    restler_custom_payload_header_unquoted: BTreeMap<String, PayloadValues>,
    restler_custom_payload_query: BTreeMap<String, PayloadValues>,
    shadow_values: BTreeMap<String, PayloadValues>,
}

/// A loaded, structurally-parsed mutations dictionary.
///
/// Built once per compilation run (built-in defaults merged with any user
/// document), then read-only during resolution.
#[derive(Clone, Debug, PartialEq)]
pub struct MutationsDictionary {
    fuzzable_string: Vec<String>,
    fuzzable_int: Vec<String>,
    fuzzable_bool: Vec<String>,
    fuzzable_number: Vec<String>,
    fuzzable_date: Vec<String>,
    fuzzable_datetime: Vec<String>,
    fuzzable_uuid: Vec<String>,
    fuzzable_object: Vec<String>,
    custom_payload: PayloadTable,
    custom_payload_unquoted: PayloadTable,
    custom_payload_uuid4_suffix: PayloadTable,
    custom_payload_header: PayloadTable,
    custom_payload_header_unquoted: PayloadTable,
    custom_payload_query: PayloadTable,
    shadow_values: PayloadTable,
}

impl Default for MutationsDictionary {
    /// The built-in default dictionary: one default value per primitive
    /// kind, no overrides. User dictionaries are merged onto this base.
    fn default() -> Self {
        Self {
            fuzzable_string: vec!["fuzzstring".to_string()],
            fuzzable_int: vec!["1".to_string()],
            fuzzable_bool: vec!["true".to_string()],
            fuzzable_number: vec!["1.23".to_string()],
            fuzzable_date: vec!["2019-06-26".to_string()],
            fuzzable_datetime: vec!["2019-06-26T20:20:39+00:00".to_string()],
            fuzzable_uuid: vec!["903bcc44-30cf-4ea7-968a-d9d0da7c072f".to_string()],
            fuzzable_object: vec!["{}".to_string()],
            custom_payload: PayloadTable::default(),
            custom_payload_unquoted: PayloadTable::default(),
            custom_payload_uuid4_suffix: PayloadTable::default(),
            custom_payload_header: PayloadTable::default(),
            custom_payload_header_unquoted: PayloadTable::default(),
            custom_payload_query: PayloadTable::default(),
            shadow_values: PayloadTable::default(),
        }
    }
}

impl MutationsDictionary {
    /// Parse a dictionary from a JSON document string.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid JSON or a keyed-table
    /// entry has a malformed key. Both are fatal configuration errors.
    pub fn from_json(document: &str) -> Result<Self> {
        let doc: DictionaryDocument = serde_json::from_str(document)?;
        Self::from_document(doc)
    }

    /// Load a dictionary from a JSON file.
    ///
    /// A missing or unreadable file is a fatal configuration error, not a
    /// soft fallback.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    fn from_document(doc: DictionaryDocument) -> Result<Self> {
        Ok(Self {
            fuzzable_string: doc.restler_fuzzable_string,
            fuzzable_int: doc.restler_fuzzable_int,
            fuzzable_bool: doc.restler_fuzzable_bool,
            fuzzable_number: doc.restler_fuzzable_number,
            fuzzable_date: doc.restler_fuzzable_date,
            fuzzable_datetime: doc.restler_fuzzable_datetime,
            fuzzable_uuid: doc.restler_fuzzable_uuid4,
            fuzzable_object: doc.restler_fuzzable_object,
            custom_payload: PayloadTable::from_raw(doc.restler_custom_payload)?,
            custom_payload_unquoted: PayloadTable::from_raw(doc.restler_custom_payload_unquoted)?,
            custom_payload_uuid4_suffix: PayloadTable::from_raw(
                doc.restler_custom_payload_uuid4_suffix,
            )?,
            custom_payload_header: PayloadTable::from_raw(doc.restler_custom_payload_header)?,
            custom_payload_header_unquoted: PayloadTable::from_raw(
                doc.restler_custom_payload_header_unquoted,
            )?,
            custom_payload_query: PayloadTable::from_raw(doc.restler_custom_payload_query)?,
            shadow_values: PayloadTable::from_raw(doc.shadow_values)?,
        })
    }

    /// Serialize back to the on-disk JSON document shape.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn to_json(&self) -> Result<String> {
        let doc = DictionaryDocument {
            restler_fuzzable_string: self.fuzzable_string.clone(),
            restler_fuzzable_int: self.fuzzable_int.clone(),
            restler_fuzzable_bool: self.fuzzable_bool.clone(),
            restler_fuzzable_number: self.fuzzable_number.clone(),
            restler_fuzzable_date: self.fuzzable_date.clone(),
            restler_fuzzable_datetime: self.fuzzable_datetime.clone(),
            restler_fuzzable_uuid4: self.fuzzable_uuid.clone(),
            restler_fuzzable_object: self.fuzzable_object.clone(),
            restler_custom_payload: self.custom_payload.to_raw(),
            restler_custom_payload_unquoted: self.custom_payload_unquoted.to_raw(),
            restler_custom_payload_uuid4_suffix: self.custom_payload_uuid4_suffix.to_raw(),
            restler_custom_payload_header: self.custom_payload_header.to_raw(),
            restler_custom_payload_header_unquoted: self.custom_payload_header_unquoted.to_raw(),
            restler_custom_payload_query: self.custom_payload_query.to_raw(),
            shadow_values: self.shadow_values.to_raw(),
        };
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    /// Merge `overlay` onto this dictionary.
    ///
    /// Keyed tables are unioned key-by-key (value lists concatenated and
    /// deduplicated, never overwritten). Default value lists are replaced
    /// wholesale by the overlay's list when it provides any values.
    #[must_use]
    pub fn merge(mut self, overlay: Self) -> Self {
        fn replace_if_provided(base: &mut Vec<String>, overlay: Vec<String>) {
            if !overlay.is_empty() {
                *base = overlay;
            }
        }

        replace_if_provided(&mut self.fuzzable_string, overlay.fuzzable_string);
        replace_if_provided(&mut self.fuzzable_int, overlay.fuzzable_int);
        replace_if_provided(&mut self.fuzzable_bool, overlay.fuzzable_bool);
        replace_if_provided(&mut self.fuzzable_number, overlay.fuzzable_number);
        replace_if_provided(&mut self.fuzzable_date, overlay.fuzzable_date);
        replace_if_provided(&mut self.fuzzable_datetime, overlay.fuzzable_datetime);
        replace_if_provided(&mut self.fuzzable_uuid, overlay.fuzzable_uuid);
        replace_if_provided(&mut self.fuzzable_object, overlay.fuzzable_object);

        self.custom_payload.union(overlay.custom_payload);
        self.custom_payload_unquoted
            .union(overlay.custom_payload_unquoted);
        self.custom_payload_uuid4_suffix
            .union(overlay.custom_payload_uuid4_suffix);
        self.custom_payload_header.union(overlay.custom_payload_header);
        self.custom_payload_header_unquoted
            .union(overlay.custom_payload_header_unquoted);
        self.custom_payload_query.union(overlay.custom_payload_query);
        self.shadow_values.union(overlay.shadow_values);

        self
    }

    /// Default values for a fuzzable primitive kind.
    #[must_use]
    pub fn fuzzable_values(&self, kind: PrimitiveKind) -> &[String] {
        match kind {
            PrimitiveKind::String => &self.fuzzable_string,
            PrimitiveKind::Int => &self.fuzzable_int,
            PrimitiveKind::Bool => &self.fuzzable_bool,
            PrimitiveKind::Number => &self.fuzzable_number,
            PrimitiveKind::Date => &self.fuzzable_date,
            PrimitiveKind::DateTime => &self.fuzzable_datetime,
            PrimitiveKind::Uuid => &self.fuzzable_uuid,
            PrimitiveKind::Object => &self.fuzzable_object,
        }
    }

    /// The generic custom-payload table.
    #[must_use]
    pub fn custom_payload(&self) -> &PayloadTable {
        &self.custom_payload
    }

    /// The shadow-values table (used by a bug checker to impersonate a
    /// second identity; carried through merge/serialize, not consulted
    /// during resolution).
    #[must_use]
    pub fn shadow_values(&self) -> &PayloadTable {
        &self.shadow_values
    }

    /// Look up a custom payload override for one consumer parameter.
    ///
    /// Precedence, per table group appropriate to `kind` (query table for
    /// query parameters, header tables for headers, generic + unquoted
    /// otherwise), then the uuid-suffix table:
    ///
    /// 1. request-scoped entry whose access path matches exactly
    /// 2. request-scoped entry matching by resource name
    /// 3. bare resource-name entry
    ///
    /// Request-scoped keys therefore always beat bare keys for the same
    /// lookup, and the quoted table of a pair is consulted before its
    /// `*_unquoted` twin at each step.
    #[must_use]
    pub fn find_payload(
        &self,
        request: &RequestId,
        resource: &ResourceReference,
        kind: ParameterKind,
    ) -> Option<CustomPayload> {
        let group: &[(&PayloadTable, CustomPayloadKind, bool)] = match kind {
            ParameterKind::Query => &[(
                &self.custom_payload_query,
                CustomPayloadKind::Query,
                true,
            )],
            ParameterKind::Header => &[
                (&self.custom_payload_header, CustomPayloadKind::Header, true),
                (
                    &self.custom_payload_header_unquoted,
                    CustomPayloadKind::Header,
                    false,
                ),
            ],
            ParameterKind::Path | ParameterKind::Body => &[
                (&self.custom_payload, CustomPayloadKind::String, true),
                (
                    &self.custom_payload_unquoted,
                    CustomPayloadKind::String,
                    false,
                ),
            ],
        };

        let uuid_group: &[(&PayloadTable, CustomPayloadKind, bool)] = &[(
            &self.custom_payload_uuid4_suffix,
            CustomPayloadKind::UuidSuffix,
            true,
        )];

        lookup_group(group, request, resource)
            .or_else(|| lookup_group(uuid_group, request, resource))
    }
}

/// Run the three precedence steps across a table group: each step is tried
/// in every table of the group (in group order) before falling to the next
/// step, so a scoped key in any table outranks a bare key in all of them.
fn lookup_group(
    group: &[(&PayloadTable, CustomPayloadKind, bool)],
    request: &RequestId,
    resource: &ResourceReference,
) -> Option<CustomPayload> {
    enum Step {
        ScopedPath,
        ScopedName,
        BareName,
    }

    for step in [Step::ScopedPath, Step::ScopedName, Step::BareName] {
        for (table, kind, quoted) in group {
            let entry = match step {
                Step::ScopedPath => table.find_scoped_path(request, resource),
                Step::ScopedName => table.find_scoped_name(request, resource),
                Step::BareName => table.find_bare_name(resource),
            };
            if let Some(entry) = entry {
                return Some(CustomPayload::from_entry(entry, *kind, *quoted));
            }
        }
    }
    None
}
