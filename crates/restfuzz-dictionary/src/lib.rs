//! Mutations dictionary: user-supplied payload overrides.
//!
//! A mutations dictionary carries two kinds of data:
//!
//! - **Default value lists**, one per fuzzable primitive kind, used when a
//!   parameter resolves to a context-free fuzzable value.
//! - **Keyed override tables** (`custom_payload`, `custom_payload_query`,
//!   ...) mapping a resource key to one-or-many literal values. These always
//!   take precedence over inferred producer/consumer bindings.
//!
//! Keys are either a bare resource name (`storeId`) or request-type-scoped
//! (`/stores/{storeId}/order/post/price`). Scoped keys are parsed into
//! structured [`RequestId`](restfuzz_core::RequestId) +
//! [`ResourceReference`](restfuzz_core::ResourceReference) identities at
//! load time — the raw string form never leaks past the parser — and always
//! outrank bare keys for the same lookup.
//!
//! Loading a missing or malformed dictionary file is a fatal configuration
//! error, never a soft fallback, so fuzz runs cannot silently use wrong
//! values.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod dictionary;
mod error;
mod payload;

pub use dictionary::MutationsDictionary;
pub use error::{DictionaryError, Result};
pub use payload::{CustomPayload, CustomPayloadKind, PayloadEntry, PayloadTable};
