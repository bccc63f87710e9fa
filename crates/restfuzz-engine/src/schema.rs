//! The operation contract consumed from the schema-loading collaborator.
//!
//! Parsing an OpenAPI/Swagger document is out of scope; the loader hands
//! over a pre-distilled operation list in the JSON shape deserialized here.
//! Endpoint/parameter consistency (a `{storeId}` template variable with no
//! matching parameter declaration) is the loader's schema-validation error
//! to report — this contract only represents what was declared.

use serde::Deserialize;

use restfuzz_core::{
    AccessPath, HttpMethod, ParameterKind, PrimitiveKind, RequestId, ResourceReference,
};

use crate::error::Result;

/// One API operation as distilled by the schema loader.
#[derive(Clone, Debug, Deserialize)]
pub struct Operation {
    /// Templated endpoint path (`/stores/{storeId}/order`).
    pub endpoint: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// Ordered input parameter declarations.
    #[serde(default)]
    pub parameters: Vec<ParameterDecl>,
    /// Properties of the response body, each a candidate producer site.
    #[serde(default)]
    pub response: Vec<ResponseProperty>,
    /// Set when this operation's whole request body is identical in shape
    /// to a body declared elsewhere, enabling payload-construction reuse.
    #[serde(default)]
    pub same_body_as: Option<SameBodyRef>,
}

impl Operation {
    /// The normalized identity of this operation.
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        RequestId::new(&self.endpoint, self.method)
    }
}

/// One declared input parameter.
#[derive(Clone, Debug, Deserialize)]
pub struct ParameterDecl {
    /// Parameter name as declared.
    pub name: String,
    /// Where the parameter is substituted.
    pub kind: ParameterKind,
    /// Declared primitive kind; drives the fuzzable fallback.
    #[serde(default = "default_primitive")]
    pub primitive: PrimitiveKind,
    /// For body properties: the access path of this property inside the
    /// body (JSON-pointer-like string).
    #[serde(default)]
    pub path: Option<String>,
    /// Resource name or access-path string this parameter consumes, when it
    /// differs from the parameter name (e.g. `storeId` consuming `id`).
    #[serde(default)]
    pub consumes: Option<String>,
}

fn default_primitive() -> PrimitiveKind {
    PrimitiveKind::String
}

impl ParameterDecl {
    /// The resource reference this parameter is bound from: the explicit
    /// `consumes` override, else the body path, else the parameter name.
    #[must_use]
    pub fn resource(&self) -> ResourceReference {
        if let Some(consumes) = &self.consumes {
            return ResourceReference::parse(consumes);
        }
        if let Some(path) = self.path.as_deref().and_then(AccessPath::parse) {
            if !path.is_empty() {
                return ResourceReference::from_path(path);
            }
        }
        ResourceReference::from_name(&self.name)
    }
}

/// One property of a response body: a candidate producer site.
#[derive(Clone, Debug, Deserialize)]
pub struct ResponseProperty {
    /// Property name; the resource name producers register under.
    pub name: String,
    /// Access path of the property from the response root
    /// (JSON-pointer-like string). Defaults to the top-level `/{name}`.
    #[serde(default)]
    pub path: Option<String>,
    /// Schema type tags the value might satisfy.
    #[serde(default)]
    pub candidate_types: Vec<String>,
    /// Whether the value is reachable only through an array/sub-object.
    /// When absent, derived from the access path depth.
    #[serde(default)]
    pub nested: Option<bool>,
}

impl ResponseProperty {
    /// The resolved access path of this property.
    #[must_use]
    pub fn access_path(&self) -> AccessPath {
        self.path
            .as_deref()
            .and_then(AccessPath::parse)
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| AccessPath::from_segments([self.name.as_str()]))
    }

    /// Whether this property is a nested body resource.
    #[must_use]
    pub fn is_nested(&self) -> bool {
        self.nested.unwrap_or_else(|| self.access_path().len() > 1)
    }
}

/// Reference to the operation whose request body shape this one reuses.
#[derive(Clone, Debug, Deserialize)]
pub struct SameBodyRef {
    /// Endpoint declaring the original body.
    pub endpoint: String,
    /// Method declaring the original body.
    pub method: HttpMethod,
    /// Resource name the reuse is indexed under.
    pub resource_name: String,
}

/// Load an operation list from a JSON document (an array of operations).
///
/// # Errors
///
/// Returns an error if the document is not valid JSON for this contract.
pub fn load_operations(document: &str) -> Result<Vec<Operation>> {
    Ok(serde_json::from_str(document)?)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn minimal_operation_deserializes() {
        let ops = load_operations(
            r#"[{ "endpoint": "/stores", "method": "post" }]"#,
        )
        .unwrap();
        assert_eq!(ops.len(), 1);
        assert!(ops[0].parameters.is_empty());
        assert!(ops[0].response.is_empty());
        assert_eq!(
            ops[0].request_id(),
            RequestId::new("/stores", HttpMethod::Post)
        );
    }

    #[test]
    fn parameter_resource_prefers_consumes() {
        let param: ParameterDecl = serde_json::from_str(
            r#"{ "name": "storeId", "kind": "path", "consumes": "id" }"#,
        )
        .unwrap();
        assert_eq!(param.resource(), ResourceReference::from_name("id"));
        assert_eq!(param.primitive, PrimitiveKind::String);
    }

    #[test]
    fn parameter_resource_uses_body_path() {
        let param: ParameterDecl = serde_json::from_str(
            r#"{ "name": "id", "kind": "body", "path": "/store/id" }"#,
        )
        .unwrap();
        let resource = param.resource();
        assert_eq!(resource.path.to_string(), "/store/id");
        assert_eq!(resource.resource_name(), Some("id"));
    }

    #[test]
    fn response_property_paths_default_to_top_level() {
        let prop: ResponseProperty =
            serde_json::from_str(r#"{ "name": "id" }"#).unwrap();
        assert_eq!(prop.access_path().to_string(), "/id");
        assert!(!prop.is_nested());

        let nested: ResponseProperty = serde_json::from_str(
            r#"{ "name": "id", "path": "/items/[0]/id" }"#,
        )
        .unwrap();
        assert!(nested.is_nested());
    }

    #[test]
    fn explicit_nested_flag_wins() {
        let prop: ResponseProperty = serde_json::from_str(
            r#"{ "name": "id", "path": "/id", "nested": true }"#,
        )
        .unwrap();
        assert!(prop.is_nested());
    }
}
