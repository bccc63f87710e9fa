//! Producer and consumer sites of a data-flow edge.

use serde::Serialize;

use crate::access_path::AccessPath;
use crate::request::RequestId;
use crate::resource::{ParameterKind, PrimitiveKind, ResourceReference};

/// A site that yields a value consumable by some other operation.
///
/// Closed set of shapes: the registry and the ranking code match over these
/// exhaustively, so a new variant forces review at every decision site.
/// Every variant carries enough information to be ranked without
/// re-consulting the schema.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Producer {
    /// A value read from an operation's response body.
    Response(ResponseProducer),
    /// A value that is an input parameter of another operation, reusable
    /// without any response parsing.
    InputOnly(InputOnlyProducer),
    /// An operation whose entire request body matches another operation's,
    /// so the same payload-construction logic can be reused. Not a value
    /// producer in the data-flow sense, but indexed alongside producers
    /// because consumers query it the same way.
    BodyPayloadInput(BodyPayloadInputProducer),
}

/// A value produced in an operation's response body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResponseProducer {
    /// The producing operation.
    pub request: RequestId,
    /// Where the value sits in the response body.
    pub path: AccessPath,
    /// Schema type tags the response value might satisfy.
    pub candidate_types: Vec<String>,
    /// Whether the value is reachable only through an array or sub-object
    /// rather than being a top-level field.
    pub nested: bool,
}

impl ResponseProducer {
    /// The runtime variable name under which the produced value is stored
    /// for later requests to read (`_stores_post_id` style).
    #[must_use]
    pub fn variable_name(&self) -> String {
        variable_name(&self.request, self.path.name().unwrap_or_default())
    }
}

/// A value supplied as an input parameter of another operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InputOnlyProducer {
    /// The operation whose input carries the value.
    pub request: RequestId,
    /// Which input parameter carries it.
    pub resource: ResourceReference,
    /// Where the parameter is substituted in that operation.
    pub kind: ParameterKind,
}

impl InputOnlyProducer {
    /// Runtime variable name for the carried value.
    #[must_use]
    pub fn variable_name(&self) -> String {
        variable_name(
            &self.request,
            self.resource.resource_name().unwrap_or_default(),
        )
    }
}

/// An operation whose whole request body matches another operation's shape.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BodyPayloadInputProducer {
    /// The operation reusing the body shape.
    pub request: RequestId,
    /// The operation whose declared body it matches.
    pub reuses: RequestId,
}

/// An operation parameter that needs a value sourced from elsewhere.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Consumer {
    /// The operation that needs the value.
    pub request: RequestId,
    /// What resource name/path the value should be bound from.
    pub resource: ResourceReference,
    /// Where in the request the value is substituted.
    pub kind: ParameterKind,
    /// Declared primitive kind, used for the unresolved fallback.
    pub primitive: PrimitiveKind,
}

/// Derive a runtime variable name from a producing request and resource name.
fn variable_name(request: &RequestId, resource_name: &str) -> String {
    let mut out = String::with_capacity(request.endpoint.len() + resource_name.len() + 8);
    out.push('_');
    let mut last_was_sep = true;
    for c in request
        .endpoint
        .chars()
        .chain(['_'])
        .chain(request.method.as_str().chars())
        .chain(['_'])
        .chain(resource_name.chars())
    {
        if c.is_ascii_alphanumeric() {
            out.push(c);
            last_was_sep = false;
        } else if !last_was_sep {
            out.push('_');
            last_was_sep = true;
        }
    }
    if out.ends_with('_') {
        out.pop();
    }
    out
}
