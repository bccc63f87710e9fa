//! Match ranking keys for candidate producers.
//!
//! A candidate producer is ranked by three ordered keys, most significant
//! first (lower is better on every key):
//!
//! 1. **Method priority** — a value is most reliably obtained from the
//!    operation that most directly asserts it: a delete consumes the
//!    canonical id, while a get may return a list and be unreliable.
//! 2. **Producer-shape priority** — among same-method candidates, a GET
//!    whose endpoint ends in a path-parameter placeholder targets exactly
//!    one resource and beats a collection-style GET; non-GET producers all
//!    share one mid value.
//! 3. **Access-path specificity** — a top-level `id` beats a deeply nested
//!    `items/[0]/id`: shorter paths are less likely to be coincidental name
//!    collisions.
//!
//! A fourth key — the registration-time discovery counter — exists purely
//! to make exact ties deterministic. It must never be derived from thread
//! identity or timing: the registry assigns it monotonically in the single
//! registration step.

use serde::{Deserialize, Serialize};

use restfuzz_core::{HttpMethod, PathTemplate, RequestId, ResponseProducer};

/// Which method-priority table the ranking uses.
///
/// `Normal` is authoritative. `Exploratory` is an alternate table that
/// prefers creating resources before deleting them; it must be opted into
/// explicitly (engine config), never switched on implicitly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodOrdering {
    /// DELETE, POST, PUT, PATCH, GET, then everything else.
    #[default]
    Normal,
    /// POST, PUT, PATCH, GET, DELETE, then everything else.
    Exploratory,
}

impl MethodOrdering {
    /// Rank a method under this ordering; lower is better.
    #[must_use]
    pub fn method_rank(self, method: HttpMethod) -> u8 {
        match self {
            Self::Normal => match method {
                HttpMethod::Delete => 0,
                HttpMethod::Post => 1,
                HttpMethod::Put => 2,
                HttpMethod::Patch => 3,
                HttpMethod::Get => 4,
                HttpMethod::Head | HttpMethod::Options => 5,
            },
            Self::Exploratory => match method {
                HttpMethod::Post => 0,
                HttpMethod::Put => 1,
                HttpMethod::Patch => 2,
                HttpMethod::Get => 3,
                HttpMethod::Delete => 4,
                HttpMethod::Head | HttpMethod::Options => 5,
            },
        }
    }
}

/// Shape rank of a producing request; lower is better.
///
/// Parameterized GETs (`/stores/{storeId}`) rank 0, every non-GET shares
/// the mid value 1, and collection-style GETs (`/stores`) rank 2.
fn shape_rank(request: &RequestId) -> u8 {
    if request.method != HttpMethod::Get {
        return 1;
    }
    if PathTemplate::parse(&request.endpoint).ends_with_parameter() {
        0
    } else {
        2
    }
}

/// The full sort key of a registered producer.
///
/// Derived `Ord` compares fields in declaration order, which is exactly the
/// ranking: method, shape, specificity, then the discovery tie-breaker.
/// The discovery counter makes every key unique, so sorting is total and
/// reproducible for a given registration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct MatchKey {
    /// Method priority under the registry's ordering.
    pub method_rank: u8,
    /// Producer-shape priority.
    pub shape_rank: u8,
    /// Access-path length (shorter is more trustworthy).
    pub path_len: usize,
    /// Registration-time discovery counter.
    pub discovery: u64,
}

impl MatchKey {
    /// Compute the key for a response producer at registration time.
    #[must_use]
    pub fn new(ordering: MethodOrdering, producer: &ResponseProducer, discovery: u64) -> Self {
        Self {
            method_rank: ordering.method_rank(producer.request.method),
            shape_rank: shape_rank(&producer.request),
            path_len: producer.path.len(),
            discovery,
        }
    }
}

#[cfg(test)]
mod tests {
    use restfuzz_core::AccessPath;

    use super::*;

    fn producer(endpoint: &str, method: HttpMethod, path: &[&str]) -> ResponseProducer {
        ResponseProducer {
            request: RequestId::new(endpoint, method),
            path: AccessPath::from_segments(path.iter().copied()),
            candidate_types: Vec::new(),
            nested: false,
        }
    }

    #[test]
    fn normal_ordering_prefers_delete_then_post() {
        let ordering = MethodOrdering::Normal;
        assert!(ordering.method_rank(HttpMethod::Delete) < ordering.method_rank(HttpMethod::Post));
        assert!(ordering.method_rank(HttpMethod::Post) < ordering.method_rank(HttpMethod::Get));
        assert!(ordering.method_rank(HttpMethod::Get) < ordering.method_rank(HttpMethod::Head));
    }

    #[test]
    fn exploratory_ordering_demotes_delete() {
        let ordering = MethodOrdering::Exploratory;
        assert_eq!(ordering.method_rank(HttpMethod::Post), 0);
        assert!(ordering.method_rank(HttpMethod::Get) < ordering.method_rank(HttpMethod::Delete));
    }

    #[test]
    fn parameterized_get_beats_collection_get() {
        let item = producer("/stores/{storeId}", HttpMethod::Get, &["id"]);
        let collection = producer("/stores", HttpMethod::Get, &["id"]);

        let item_key = MatchKey::new(MethodOrdering::Normal, &item, 0);
        let collection_key = MatchKey::new(MethodOrdering::Normal, &collection, 1);
        assert!(item_key < collection_key);
    }

    #[test]
    fn shorter_paths_win_specificity() {
        let shallow = producer("/stores", HttpMethod::Post, &["id"]);
        let deep = producer("/stores", HttpMethod::Post, &["items", "[0]", "id"]);

        let shallow_key = MatchKey::new(MethodOrdering::Normal, &shallow, 1);
        let deep_key = MatchKey::new(MethodOrdering::Normal, &deep, 0);
        assert!(shallow_key < deep_key);
    }

    #[test]
    fn discovery_counter_breaks_exact_ties() {
        let a = producer("/stores", HttpMethod::Post, &["id"]);
        let b = producer("/shops", HttpMethod::Post, &["id"]);

        let first = MatchKey::new(MethodOrdering::Normal, &a, 0);
        let second = MatchKey::new(MethodOrdering::Normal, &b, 1);
        assert_ne!(first, second);
        assert!(first < second);
    }
}
