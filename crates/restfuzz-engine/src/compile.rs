//! The compilation pass: registry population + consumer resolution.
//!
//! A single-threaded batch job over the operation list. The registry and
//! dictionary are owned by this pass and mutated only during registration;
//! the returned bindings are read-only data for the grammar emitter.

use serde::Serialize;

use restfuzz_core::{
    BodyPayloadInputProducer, Consumer, InputOnlyProducer, ParameterKind, Producer, RequestId,
    ResponseProducer,
};
use restfuzz_dictionary::MutationsDictionary;

use crate::annotations::AnnotationSet;
use crate::config::EngineConfig;
use crate::registry::ProducerRegistry;
use crate::resolve::{resolve_consumer, ResolveOptions, ResolvedBinding};
use crate::schema::Operation;

/// The resolved source for one consumer parameter of one operation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConsumerBinding {
    /// The consuming operation.
    pub request: RequestId,
    /// The parameter name as declared.
    pub parameter: String,
    /// Where the parameter is substituted.
    pub kind: ParameterKind,
    /// What the emitter should substitute.
    pub binding: ResolvedBinding,
}

/// All resolved bindings for an operation list, in declaration order.
#[derive(Debug, Default, Serialize)]
pub struct ResolvedGrammar {
    /// One entry per consumer parameter.
    pub bindings: Vec<ConsumerBinding>,
}

/// Populate a producer registry from the operation list.
///
/// For every operation this registers:
/// - a [`ResponseProducer`] per response property, under the property name;
/// - an [`InputOnlyProducer`] per path parameter (a later operation can
///   reuse the value without any response parsing);
/// - a [`BodyPayloadInputProducer`] when the operation declares its body
///   identical in shape to another operation's.
///
/// Discovery counters are assigned here, in operation-list order, which is
/// what makes tie-breaking reproducible across runs.
#[must_use]
pub fn build_registry(operations: &[Operation], config: &EngineConfig) -> ProducerRegistry {
    let mut registry = ProducerRegistry::new(config.method_ordering);

    for operation in operations {
        let request = operation.request_id();

        for property in &operation.response {
            registry.register(
                &property.name,
                Producer::Response(ResponseProducer {
                    request: request.clone(),
                    path: property.access_path(),
                    candidate_types: property.candidate_types.clone(),
                    nested: property.is_nested(),
                }),
            );
        }

        for parameter in &operation.parameters {
            if parameter.kind != ParameterKind::Path {
                continue;
            }
            let resource = parameter.resource();
            if let Some(name) = resource.resource_name() {
                let name = name.to_string();
                registry.register(
                    &name,
                    Producer::InputOnly(InputOnlyProducer {
                        request: request.clone(),
                        resource,
                        kind: ParameterKind::Path,
                    }),
                );
            }
        }

        if let Some(same_body) = &operation.same_body_as {
            registry.register(
                &same_body.resource_name,
                Producer::BodyPayloadInput(BodyPayloadInputProducer {
                    request: request.clone(),
                    reuses: RequestId::new(&same_body.endpoint, same_body.method),
                }),
            );
        }
    }

    registry
}

/// Run the full compilation pass: build the registry, then resolve every
/// consumer parameter of every operation.
#[must_use]
pub fn compile(
    operations: &[Operation],
    dictionary: &MutationsDictionary,
    annotations: &AnnotationSet,
    config: &EngineConfig,
) -> ResolvedGrammar {
    let registry = build_registry(operations, config);
    let options = ResolveOptions {
        exclude_nested: config.exclude_nested_producers,
        ..ResolveOptions::default()
    };

    let mut bindings = Vec::new();
    for operation in operations {
        let request = operation.request_id();
        for parameter in &operation.parameters {
            let consumer = Consumer {
                request: request.clone(),
                resource: parameter.resource(),
                kind: parameter.kind,
                primitive: parameter.primitive,
            };
            let binding =
                resolve_consumer(&registry, dictionary, annotations, &consumer, &options);
            bindings.push(ConsumerBinding {
                request: request.clone(),
                parameter: parameter.name.clone(),
                kind: parameter.kind,
                binding,
            });
        }
    }

    ResolvedGrammar { bindings }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use restfuzz_core::HttpMethod;

    use crate::schema::load_operations;

    use super::*;

    #[test]
    fn registry_collects_all_producer_shapes() {
        let operations = load_operations(
            r#"[
                {
                    "endpoint": "/stores",
                    "method": "post",
                    "response": [
                        { "name": "id" },
                        { "name": "name", "path": "/metadata/name" }
                    ]
                },
                {
                    "endpoint": "/stores/{storeId}",
                    "method": "get",
                    "parameters": [
                        { "name": "storeId", "kind": "path" }
                    ]
                },
                {
                    "endpoint": "/stores/import",
                    "method": "post",
                    "same_body_as": {
                        "endpoint": "/stores",
                        "method": "post",
                        "resource_name": "store"
                    }
                }
            ]"#,
        )
        .unwrap();

        let registry = build_registry(&operations, &EngineConfig::default());
        assert_eq!(registry.response_producer_count(), 2);

        let id = registry.indexes("id").unwrap();
        assert_eq!(id.ranked(false).len(), 1);

        // "/metadata/name" is nested: present in the full list only.
        let name = registry.indexes("name").unwrap();
        assert_eq!(name.ranked(false).len(), 1);
        assert!(name.ranked(true).is_empty());

        let store_id = registry.indexes("storeId").unwrap();
        assert_eq!(store_id.input_only().len(), 1);

        let store = registry.indexes("store").unwrap();
        assert_eq!(store.same_payload("/stores").len(), 1);
        assert_eq!(
            store.same_payload("/stores")[0].request,
            RequestId::new("/stores/import", HttpMethod::Post)
        );
    }

    #[test]
    fn compile_resolves_every_parameter() {
        let operations = load_operations(
            r#"[
                {
                    "endpoint": "/stores",
                    "method": "post",
                    "response": [{ "name": "id" }]
                },
                {
                    "endpoint": "/stores/{storeId}",
                    "method": "get",
                    "parameters": [
                        { "name": "storeId", "kind": "path", "consumes": "id" },
                        { "name": "verbose", "kind": "query", "primitive": "bool" }
                    ]
                }
            ]"#,
        )
        .unwrap();

        let grammar = compile(
            &operations,
            &MutationsDictionary::default(),
            &AnnotationSet::default(),
            &EngineConfig::default(),
        );
        assert_eq!(grammar.bindings.len(), 2);

        let store_id = &grammar.bindings[0];
        assert_eq!(store_id.parameter, "storeId");
        match &store_id.binding {
            ResolvedBinding::Dynamic { producer } => {
                assert_eq!(producer.producer, RequestId::new("/stores", HttpMethod::Post));
            }
            other => panic!("expected dynamic binding, got {other:?}"),
        }

        let verbose = &grammar.bindings[1];
        match &verbose.binding {
            ResolvedBinding::Fuzzable { values, .. } => assert_eq!(values.as_slice(), ["true"]),
            other => panic!("expected fuzzable fallback, got {other:?}"),
        }
    }
}
