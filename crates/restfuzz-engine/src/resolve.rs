//! Consumer resolution: picking one producer (or payload) per consumer.
//!
//! Precedence, highest first:
//!
//! 1. Mutations-dictionary override ([`MutationsDictionary::find_payload`])
//! 2. Local annotation naming the consumer's operation + parameter
//! 3. Global annotation for the resource, minus its `except` list
//! 4. Best-ranked registry candidate (optionally restricted to non-nested
//!    producers, a specific endpoint, or a declared type)
//! 5. Input-only producer carrying the value as another operation's input
//! 6. Unresolved: a context-free fuzzable of the declared primitive kind
//!
//! Steps 5 and 6 are normal outcomes, not errors. Multiple candidates tied
//! on every ranking key resolve deterministically through the
//! registration-order discovery counter.

use serde::Serialize;

use restfuzz_core::{AccessPath, Consumer, PrimitiveKind, RequestId, ResponseProducer};
use restfuzz_dictionary::{CustomPayload, MutationsDictionary};

use crate::annotations::{AnnotationSet, ProducerConsumerAnnotation};
use crate::registry::ProducerRegistry;

/// A dynamic data-flow edge: read the value this producer writes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DynamicBinding {
    /// The producing operation.
    pub producer: RequestId,
    /// Where in the producer's response (or input) the value sits.
    pub path: AccessPath,
    /// Runtime variable name the value is stored under.
    pub variable: String,
}

/// The resolved source for one consumer parameter, handed to the grammar
/// emitter.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "binding", rename_all = "snake_case")]
pub enum ResolvedBinding {
    /// A literal/generator payload from the mutations dictionary.
    Custom {
        /// The dictionary hit, including its kind tag and quoting flag.
        payload: CustomPayload,
    },
    /// A dynamic binding to a producer.
    Dynamic {
        /// The edge to the producing site.
        producer: DynamicBinding,
    },
    /// Unresolved: emit a context-free fuzzable value.
    Fuzzable {
        /// Declared primitive kind of the parameter.
        primitive: PrimitiveKind,
        /// Default values for that kind, from the dictionary.
        values: Vec<String>,
    },
}

/// Caller-supplied restrictions on registry candidates.
#[derive(Clone, Debug, Default)]
pub struct ResolveOptions {
    /// Never bind to producers whose value only exists inside arrays or
    /// sub-objects of other requests.
    pub exclude_nested: bool,
    /// Only consider producers at the consumer's own endpoint.
    pub same_endpoint_only: bool,
    /// Only consider producers exposing this declared type.
    pub declared_type: Option<String>,
}

/// Resolve one consumer parameter to its binding.
#[must_use]
pub fn resolve_consumer(
    registry: &ProducerRegistry,
    dictionary: &MutationsDictionary,
    annotations: &AnnotationSet,
    consumer: &Consumer,
    options: &ResolveOptions,
) -> ResolvedBinding {
    // 1. Dictionary overrides beat everything.
    if let Some(payload) =
        dictionary.find_payload(&consumer.request, &consumer.resource, consumer.kind)
    {
        return ResolvedBinding::Custom { payload };
    }

    // 2./3. Annotations beat inference: a local rule wins unconditionally,
    // else a global rule that does not except this consumer.
    if let Some(annotation) = annotations
        .find_local(consumer)
        .or_else(|| annotations.find_global(consumer))
    {
        return annotation_binding(registry, annotation, consumer);
    }

    // 4. Best-ranked registry candidate.
    if let Some(producer) = best_candidate(registry, consumer, options) {
        return dynamic(producer);
    }

    // 5. A matching input parameter of another operation.
    if let Some(binding) = input_only_binding(registry, consumer) {
        return binding;
    }

    // 6. Unresolved: context-free fuzzable of the declared kind.
    ResolvedBinding::Fuzzable {
        primitive: consumer.primitive,
        values: dictionary.fuzzable_values(consumer.primitive).to_vec(),
    }
}

/// Pick the best-ranked registry candidate under `options`.
///
/// A consumer never binds to its own operation's response — that would be
/// a self-dependency the request sequence cannot satisfy.
fn best_candidate<'a>(
    registry: &'a ProducerRegistry,
    consumer: &Consumer,
    options: &ResolveOptions,
) -> Option<&'a ResponseProducer> {
    let resource_name = consumer.resource.resource_name()?;
    let indexes = registry.indexes(resource_name)?;

    let candidates = if options.same_endpoint_only {
        indexes.at_endpoint(&consumer.request.endpoint)
    } else if let Some(type_name) = &options.declared_type {
        indexes.of_type(type_name)
    } else {
        indexes.ranked(options.exclude_nested)
    };

    candidates
        .into_iter()
        .filter(|c| !(options.exclude_nested && c.producer.nested))
        .map(|c| &c.producer)
        .find(|p| p.request != consumer.request)
}

/// Build the binding an annotation dictates.
///
/// The declared producer is looked up in the registry first so the binding
/// carries the real response path; an annotated producer the walk never
/// discovered is synthesized from the annotation's own resource identity.
fn annotation_binding(
    registry: &ProducerRegistry,
    annotation: &ProducerConsumerAnnotation,
    consumer: &Consumer,
) -> ResolvedBinding {
    let resource_name = consumer
        .resource
        .resource_name()
        .or_else(|| annotation.resource_name());

    if let Some(name) = resource_name {
        if let Some(indexes) = registry.indexes(name) {
            if let Some(registered) = indexes
                .at_endpoint(&annotation.producer_id.endpoint)
                .into_iter()
                .find(|c| c.producer.request == annotation.producer_id)
            {
                return dynamic(&registered.producer);
            }
        }
    }

    let path = annotation
        .producer_parameter
        .as_ref()
        .filter(|r| !r.path.is_empty())
        .map_or_else(
            || {
                resource_name.map_or_else(AccessPath::empty, |name| {
                    AccessPath::from_segments([name])
                })
            },
            |r| r.path.clone(),
        );

    dynamic(&ResponseProducer {
        request: annotation.producer_id.clone(),
        path,
        candidate_types: Vec::new(),
        nested: false,
    })
}

/// Fall back to a value carried as another operation's input parameter.
fn input_only_binding(
    registry: &ProducerRegistry,
    consumer: &Consumer,
) -> Option<ResolvedBinding> {
    let resource_name = consumer.resource.resource_name()?;
    let indexes = registry.indexes(resource_name)?;

    indexes
        .input_only()
        .iter()
        .find(|p| p.request != consumer.request)
        .map(|p| ResolvedBinding::Dynamic {
            producer: DynamicBinding {
                producer: p.request.clone(),
                path: p.resource.path.clone(),
                variable: p.variable_name(),
            },
        })
}

fn dynamic(producer: &ResponseProducer) -> ResolvedBinding {
    ResolvedBinding::Dynamic {
        producer: DynamicBinding {
            producer: producer.request.clone(),
            path: producer.path.clone(),
            variable: producer.variable_name(),
        },
    }
}
