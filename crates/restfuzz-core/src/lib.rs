//! Shared data model for the restfuzz ecosystem.
//!
//! This crate defines the identity and addressing types that the dictionary
//! and engine crates agree on:
//!
//! - [`AccessPath`] — the structural address of a value inside a nested
//!   request/response body
//! - [`RequestId`] / [`PathTemplate`] — normalized operation identity and
//!   templated-endpoint parsing
//! - [`ResourceReference`], [`ParameterKind`], [`PrimitiveKind`] — how a
//!   consumed parameter names the value it needs
//! - [`Producer`] / [`Consumer`] — the sites a data-flow edge connects
//!
//! Both `restfuzz-dictionary` and `restfuzz-engine` depend on these shared
//! types. You should not need to depend on this crate directly — use the
//! higher-level crates instead.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod access_path;
mod producer;
mod request;
mod resource;

pub use access_path::{AccessPath, ARRAY_MARKER};
pub use producer::{
    BodyPayloadInputProducer, Consumer, InputOnlyProducer, Producer, ResponseProducer,
};
pub use request::{
    normalize_endpoint, HttpMethod, MethodParseError, PathTemplate, RequestId, TemplatePart,
};
pub use resource::{ParameterKind, PrimitiveKind, ResourceReference};
