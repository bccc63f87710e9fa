//! Data-dependency resolution engine for REST API fuzzing grammars.
//!
//! Given a pre-distilled operation list (endpoints, parameters, response
//! shapes — see [`Operation`]), the engine discovers which operation
//! produces each value another operation must consume, ranks competing
//! candidate producers deterministically, and lets explicit overrides win:
//!
//! 1. **Mutations dictionary** entries always take precedence
//!    ([`restfuzz_dictionary::MutationsDictionary`]).
//! 2. **Annotations** — explicit producer→consumer links with exceptions
//!    ([`AnnotationSet`]) — override inference for the endpoints they name.
//! 3. The **producer registry** ([`ProducerRegistry`]) supplies the best
//!    inferred candidate via the match ranking algorithm.
//! 4. A consumer nothing matches falls back to a context-free fuzzable
//!    value of its declared primitive kind — a normal outcome, not an error.
//!
//! Compilation is a single-pass batch job: [`build_registry`] populates the
//! registry from the operation list, then [`compile`] resolves every
//! consumer parameter and returns read-only [`ConsumerBinding`]s for the
//! grammar emitter.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod annotations;
mod compile;
mod config;
mod error;
mod ranking;
mod registry;
mod resolve;
mod schema;

pub use annotations::{AnnotationSet, ProducerConsumerAnnotation};
pub use compile::{build_registry, compile, ConsumerBinding, ResolvedGrammar};
pub use config::EngineConfig;
pub use error::{Error, Result};
pub use ranking::{MatchKey, MethodOrdering};
pub use registry::{ProducerIndexes, ProducerRegistry, RankedProducer};
pub use resolve::{resolve_consumer, DynamicBinding, ResolveOptions, ResolvedBinding};
pub use schema::{load_operations, Operation, ParameterDecl, ResponseProperty, SameBodyRef};
