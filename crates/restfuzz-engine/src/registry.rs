//! Producer registry: every candidate value-producing site, indexed for
//! ranked lookup.
//!
//! Registration happens while the operation list is walked; each response
//! producer gets its [`MatchKey`] computed exactly once at insertion, using
//! a monotonically increasing discovery counter owned by the registry.
//! Writers only append; readers sort by the precomputed keys immediately
//! before use, so read-time order is always rank order.

use std::collections::HashMap;

use restfuzz_core::{BodyPayloadInputProducer, InputOnlyProducer, Producer, ResponseProducer};

use crate::ranking::{MatchKey, MethodOrdering};

/// A response producer with its registration-time sort key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RankedProducer {
    /// The producing site.
    pub producer: ResponseProducer,
    /// Sort key computed at registration.
    pub key: MatchKey,
}

/// All candidate producers registered under one resource name.
#[derive(Debug, Default)]
pub struct ProducerIndexes {
    /// Every response producer, in registration order.
    pub(crate) ranked: Vec<RankedProducer>,

    /// The subset of `ranked` whose value is a top-level response field.
    pub(crate) ranked_non_nested: Vec<RankedProducer>,

    /// Endpoint → indices into `ranked` for producers at that endpoint.
    pub(crate) by_endpoint: HashMap<String, Vec<usize>>,

    /// Candidate type name → indices into `ranked`.
    pub(crate) by_type: HashMap<String, Vec<usize>>,

    /// Endpoint → operations whose whole request body matches a body
    /// declared at that endpoint.
    pub(crate) same_payload: HashMap<String, Vec<BodyPayloadInputProducer>>,

    /// Input-only producers, deduplicated by structural equality (the same
    /// parameter can be discovered from multiple code paths).
    pub(crate) input_only: Vec<InputOnlyProducer>,
}

impl ProducerIndexes {
    /// Response producers in rank order, optionally excluding producers
    /// whose value only exists inside arrays/sub-objects.
    #[must_use]
    pub fn ranked(&self, exclude_nested: bool) -> Vec<&RankedProducer> {
        let source = if exclude_nested {
            &self.ranked_non_nested
        } else {
            &self.ranked
        };
        let mut out: Vec<&RankedProducer> = source.iter().collect();
        out.sort_by_key(|p| p.key);
        out
    }

    /// Response producers at `endpoint`, in rank order.
    #[must_use]
    pub fn at_endpoint(&self, endpoint: &str) -> Vec<&RankedProducer> {
        self.select(self.by_endpoint.get(endpoint))
    }

    /// Response producers exposing candidate type `type_name`, in rank order.
    #[must_use]
    pub fn of_type(&self, type_name: &str) -> Vec<&RankedProducer> {
        self.select(self.by_type.get(type_name))
    }

    /// Same-payload producers registered against `endpoint`.
    #[must_use]
    pub fn same_payload(&self, endpoint: &str) -> &[BodyPayloadInputProducer] {
        self.same_payload
            .get(endpoint)
            .map_or(&[], Vec::as_slice)
    }

    /// Input-only producers in registration order.
    #[must_use]
    pub fn input_only(&self) -> &[InputOnlyProducer] {
        &self.input_only
    }

    fn select(&self, indices: Option<&Vec<usize>>) -> Vec<&RankedProducer> {
        let mut out: Vec<&RankedProducer> = indices
            .into_iter()
            .flatten()
            .map(|&i| &self.ranked[i])
            .collect();
        out.sort_by_key(|p| p.key);
        out
    }
}

/// The registry of every producer discovered while walking the schema.
///
/// Owned by the compilation pass that builds it; read-only once resolution
/// starts. The discovery counter lives here so the uniqueness tie-breaker
/// is plain data assigned in one registration step, never ambient state.
#[derive(Debug)]
pub struct ProducerRegistry {
    ordering: MethodOrdering,
    by_resource: HashMap<String, ProducerIndexes>,
    next_discovery: u64,
}

impl ProducerRegistry {
    /// Create an empty registry ranking with `ordering`.
    #[must_use]
    pub fn new(ordering: MethodOrdering) -> Self {
        Self {
            ordering,
            by_resource: HashMap::new(),
            next_discovery: 0,
        }
    }

    /// The method-priority table this registry ranks with.
    #[must_use]
    pub fn ordering(&self) -> MethodOrdering {
        self.ordering
    }

    /// Register any producer shape under `resource_name`.
    ///
    /// The match is exhaustive on purpose: a new [`Producer`] variant must
    /// be routed to an index here before it can exist.
    pub fn register(&mut self, resource_name: &str, producer: Producer) {
        match producer {
            Producer::Response(response) => {
                self.register_response_producer(resource_name, response);
            }
            Producer::InputOnly(input) => {
                self.register_input_only_producer(resource_name, input);
            }
            Producer::BodyPayloadInput(body) => {
                self.register_same_payload_producer(resource_name, body);
            }
        }
    }

    /// Register a response producer under `resource_name`.
    ///
    /// The producer's sort key is computed here, once, including the next
    /// discovery-counter value; it is also indexed by its endpoint and by
    /// every candidate type name it satisfies.
    pub fn register_response_producer(&mut self, resource_name: &str, producer: ResponseProducer) {
        let key = MatchKey::new(self.ordering, &producer, self.next_discovery);
        self.next_discovery += 1;

        let indexes = self.by_resource.entry(resource_name.to_string()).or_default();
        let index = indexes.ranked.len();

        indexes
            .by_endpoint
            .entry(producer.request.endpoint.clone())
            .or_default()
            .push(index);
        for type_name in &producer.candidate_types {
            indexes
                .by_type
                .entry(type_name.clone())
                .or_default()
                .push(index);
        }

        let ranked = RankedProducer { producer, key };
        if !ranked.producer.nested {
            indexes.ranked_non_nested.push(ranked.clone());
        }
        indexes.ranked.push(ranked);
    }

    /// Register an input-only producer under `resource_name`, deduplicating
    /// structurally equal rediscoveries.
    pub fn register_input_only_producer(
        &mut self,
        resource_name: &str,
        producer: InputOnlyProducer,
    ) {
        let indexes = self.by_resource.entry(resource_name.to_string()).or_default();
        if !indexes.input_only.contains(&producer) {
            indexes.input_only.push(producer);
        }
    }

    /// Register `producer` under `resource_name`, indexed by the endpoint
    /// whose body shape it reuses.
    pub fn register_same_payload_producer(
        &mut self,
        resource_name: &str,
        producer: BodyPayloadInputProducer,
    ) {
        self.by_resource
            .entry(resource_name.to_string())
            .or_default()
            .same_payload
            .entry(producer.reuses.endpoint.clone())
            .or_default()
            .push(producer);
    }

    /// The index structure for `resource_name`, if any producer was
    /// registered under it.
    #[must_use]
    pub fn indexes(&self, resource_name: &str) -> Option<&ProducerIndexes> {
        self.by_resource.get(resource_name)
    }

    /// All registered resource names, sorted for reproducible iteration.
    #[must_use]
    pub fn resource_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.by_resource.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Total number of registered response producers.
    #[must_use]
    pub fn response_producer_count(&self) -> usize {
        self.by_resource.values().map(|i| i.ranked.len()).sum()
    }
}
