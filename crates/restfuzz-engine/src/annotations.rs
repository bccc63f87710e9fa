//! Explicit producer→consumer annotations.
//!
//! Annotations are user- or schema-declared overrides of the inferred
//! dependency graph. A record names a producer (endpoint + method +
//! resource identity) and optionally a specific consumer; without a
//! consumer it is a *global* rule applying to every consumer of the
//! resource, minus the `except` list.
//!
//! Parsing is all-or-nothing: a record missing its producer endpoint or
//! method, a consumer endpoint without a method, or an unparseable
//! `except` clause fails the whole load with an error naming the offending
//! record — annotation parsing never partially succeeds.

use std::str::FromStr;

use serde::Deserialize;

use restfuzz_core::{Consumer, HttpMethod, RequestId, ResourceReference};

use crate::error::{Error, Result};

/// Raw annotation record as written in the document. All fields optional
/// here; validation happens in [`ProducerConsumerAnnotation::from_raw`].
#[derive(Debug, Deserialize)]
struct RawAnnotation {
    producer_endpoint: Option<String>,
    producer_method: Option<String>,
    producer_resource_name: Option<String>,
    consumer_endpoint: Option<String>,
    consumer_method: Option<String>,
    consumer_param: Option<String>,
    #[serde(default)]
    except: Option<serde_json::Value>,
}

/// One raw `except` entry: a consumer that must keep its own resolution.
#[derive(Debug, Deserialize)]
struct RawExcept {
    consumer_endpoint: Option<String>,
    consumer_method: Option<String>,
}

/// A validated producer→consumer override.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProducerConsumerAnnotation {
    /// The declared producing operation.
    pub producer_id: RequestId,
    /// The produced resource (access path or bare name), when declared.
    pub producer_parameter: Option<ResourceReference>,
    /// The specific consuming operation for a *local* rule; `None` makes
    /// this a *global* rule.
    pub consumer_id: Option<RequestId>,
    /// The consumer parameter the rule applies to, when declared.
    pub consumer_parameter: Option<ResourceReference>,
    /// Consumers a global rule must NOT apply to.
    pub except_consumers: Vec<RequestId>,
}

impl ProducerConsumerAnnotation {
    /// Validate one raw record. `index` is the record's position in the
    /// document, used for error reporting when no endpoint is available.
    fn from_raw(index: usize, raw: RawAnnotation) -> Result<Self> {
        let endpoint = raw
            .producer_endpoint
            .ok_or(Error::MissingProducerEndpoint { index })?;
        let method = raw
            .producer_method
            .ok_or_else(|| Error::MissingProducerMethod {
                endpoint: endpoint.clone(),
            })?;
        let method = parse_method(&endpoint, &method)?;
        let producer_id = RequestId::new(&endpoint, method);

        let consumer_id = match (raw.consumer_endpoint, raw.consumer_method) {
            (Some(consumer_endpoint), Some(consumer_method)) => {
                let consumer_method = parse_method(&endpoint, &consumer_method)?;
                Some(RequestId::new(&consumer_endpoint, consumer_method))
            }
            (Some(consumer_endpoint), None) => {
                return Err(Error::ConsumerMethodMissing {
                    endpoint,
                    consumer_endpoint,
                });
            }
            // A consumer method without an endpoint is tolerated: the rule
            // is simply global.
            (None, _) => None,
        };

        let except_consumers = parse_except(&endpoint, raw.except)?;

        Ok(Self {
            producer_id,
            producer_parameter: raw
                .producer_resource_name
                .as_deref()
                .map(ResourceReference::parse),
            consumer_id,
            consumer_parameter: raw.consumer_param.as_deref().map(ResourceReference::parse),
            except_consumers,
        })
    }

    /// The resource name this annotation routes, from the producer side.
    #[must_use]
    pub fn resource_name(&self) -> Option<&str> {
        self.producer_parameter
            .as_ref()
            .and_then(ResourceReference::resource_name)
    }

    /// Whether this rule targets `consumer`'s parameter.
    fn applies_to_parameter(&self, consumer: &Consumer) -> bool {
        if let Some(param) = &self.consumer_parameter {
            if !param.path.is_empty() {
                return param.path == consumer.resource.path;
            }
            return param.resource_name() == consumer.resource.resource_name();
        }
        // No declared consumer parameter: match on the produced resource name.
        self.resource_name().is_some()
            && self.resource_name() == consumer.resource.resource_name()
    }
}

fn parse_method(endpoint: &str, method: &str) -> Result<HttpMethod> {
    HttpMethod::from_str(method).map_err(|_| Error::InvalidAnnotationMethod {
        endpoint: endpoint.to_string(),
        method: method.to_string(),
    })
}

/// Parse an `except` clause: one object or a list of objects, each naming a
/// consumer endpoint + method.
fn parse_except(
    producer_endpoint: &str,
    value: Option<serde_json::Value>,
) -> Result<Vec<RequestId>> {
    let Some(value) = value else {
        return Ok(Vec::new());
    };

    let entries: Vec<RawExcept> = match value {
        serde_json::Value::Array(_) => {
            serde_json::from_value(value).map_err(|e| Error::MalformedExcept {
                endpoint: producer_endpoint.to_string(),
                reason: e.to_string(),
            })?
        }
        serde_json::Value::Object(_) => {
            let single: RawExcept =
                serde_json::from_value(value).map_err(|e| Error::MalformedExcept {
                    endpoint: producer_endpoint.to_string(),
                    reason: e.to_string(),
                })?;
            vec![single]
        }
        other => {
            return Err(Error::MalformedExcept {
                endpoint: producer_endpoint.to_string(),
                reason: format!("expected object or list, found {other}"),
            });
        }
    };

    entries
        .into_iter()
        .map(|entry| {
            let endpoint = entry.consumer_endpoint.ok_or_else(|| Error::MalformedExcept {
                endpoint: producer_endpoint.to_string(),
                reason: "except entry missing consumer_endpoint".to_string(),
            })?;
            let method = entry.consumer_method.ok_or_else(|| Error::MalformedExcept {
                endpoint: producer_endpoint.to_string(),
                reason: format!("except entry '{endpoint}' missing consumer_method"),
            })?;
            let method = HttpMethod::from_str(&method).map_err(|_| Error::MalformedExcept {
                endpoint: producer_endpoint.to_string(),
                reason: format!("except entry '{endpoint}': unrecognized method '{method}'"),
            })?;
            Ok(RequestId::new(&endpoint, method))
        })
        .collect()
}

/// The parsed, immutable annotation relation consulted during resolution.
#[derive(Debug, Default)]
pub struct AnnotationSet {
    annotations: Vec<ProducerConsumerAnnotation>,
}

impl AnnotationSet {
    /// Parse an annotation document: a JSON array of records.
    ///
    /// # Errors
    ///
    /// Returns an error on the first malformed record (see module docs);
    /// the set is never partially populated for the caller.
    pub fn from_json(document: &str) -> Result<Self> {
        let raw: Vec<RawAnnotation> = serde_json::from_str(document)?;
        let annotations = raw
            .into_iter()
            .enumerate()
            .map(|(index, record)| ProducerConsumerAnnotation::from_raw(index, record))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { annotations })
    }

    /// Load annotations from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Number of parsed annotations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Find a *local* rule naming `consumer`'s operation and parameter.
    #[must_use]
    pub fn find_local(&self, consumer: &Consumer) -> Option<&ProducerConsumerAnnotation> {
        self.annotations.iter().find(|a| {
            a.consumer_id.as_ref() == Some(&consumer.request) && a.applies_to_parameter(consumer)
        })
    }

    /// Find a *global* rule for `consumer`'s resource whose `except` clause
    /// does not name the consumer.
    #[must_use]
    pub fn find_global(&self, consumer: &Consumer) -> Option<&ProducerConsumerAnnotation> {
        self.annotations.iter().find(|a| {
            a.consumer_id.is_none()
                && a.applies_to_parameter(consumer)
                && !a.except_consumers.contains(&consumer.request)
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use restfuzz_core::ParameterKind;
    use restfuzz_core::PrimitiveKind;

    use super::*;

    fn consumer(endpoint: &str, method: HttpMethod, resource: &str) -> Consumer {
        Consumer {
            request: RequestId::new(endpoint, method),
            resource: ResourceReference::from_name(resource),
            kind: ParameterKind::Path,
            primitive: PrimitiveKind::String,
        }
    }

    #[test]
    fn global_annotation_parses() {
        let set = AnnotationSet::from_json(
            r#"[{
                "producer_endpoint": "/stores",
                "producer_method": "POST",
                "producer_resource_name": "id"
            }]"#,
        )
        .unwrap();
        assert_eq!(set.len(), 1);

        let c = consumer("/stores/{storeId}", HttpMethod::Get, "id");
        let hit = set.find_global(&c).unwrap();
        assert_eq!(hit.producer_id, RequestId::new("/stores", HttpMethod::Post));
        assert_eq!(set.find_local(&c), None);
    }

    #[test]
    fn local_annotation_requires_matching_consumer() {
        let set = AnnotationSet::from_json(
            r#"[{
                "producer_endpoint": "/stores",
                "producer_method": "POST",
                "producer_resource_name": "id",
                "consumer_endpoint": "/stores/{storeId}/order",
                "consumer_method": "POST",
                "consumer_param": "storeId"
            }]"#,
        )
        .unwrap();

        let named = consumer("/stores/{storeId}/order", HttpMethod::Post, "storeId");
        assert!(set.find_local(&named).is_some());

        let other = consumer("/stores/{storeId}", HttpMethod::Get, "storeId");
        assert_eq!(set.find_local(&other), None);
        // Local rules never leak into global lookup.
        assert_eq!(set.find_global(&other), None);
    }

    #[test]
    fn except_clause_excludes_named_consumers() {
        let set = AnnotationSet::from_json(
            r#"[{
                "producer_endpoint": "/stores",
                "producer_method": "POST",
                "producer_resource_name": "id",
                "except": {
                    "consumer_endpoint": "/legacy/{id}",
                    "consumer_method": "GET"
                }
            }]"#,
        )
        .unwrap();

        let excluded = consumer("/legacy/{id}", HttpMethod::Get, "id");
        assert_eq!(set.find_global(&excluded), None);

        let included = consumer("/stores/{storeId}", HttpMethod::Get, "id");
        assert!(set.find_global(&included).is_some());
    }

    #[test]
    fn except_endpoints_are_normalized() {
        let set = AnnotationSet::from_json(
            r#"[{
                "producer_endpoint": "/stores",
                "producer_method": "POST",
                "producer_resource_name": "id",
                "except": [{
                    "consumer_endpoint": "/legacy?kind=store",
                    "consumer_method": "GET"
                }]
            }]"#,
        )
        .unwrap();

        // The consumer uses the hierarchical spelling of the same endpoint.
        let excluded = consumer("/legacy/kind/store", HttpMethod::Get, "id");
        assert_eq!(set.find_global(&excluded), None);
    }

    #[test]
    fn missing_producer_endpoint_fails_fast() {
        let err = AnnotationSet::from_json(r#"[{ "producer_method": "POST" }]"#).unwrap_err();
        assert!(matches!(err, Error::MissingProducerEndpoint { index: 0 }));
    }

    #[test]
    fn missing_producer_method_fails_fast() {
        let err =
            AnnotationSet::from_json(r#"[{ "producer_endpoint": "/stores" }]"#).unwrap_err();
        assert!(err.to_string().contains("/stores"));
        assert!(matches!(err, Error::MissingProducerMethod { .. }));
    }

    #[test]
    fn consumer_endpoint_without_method_fails_fast() {
        let err = AnnotationSet::from_json(
            r#"[{
                "producer_endpoint": "/stores",
                "producer_method": "POST",
                "consumer_endpoint": "/stores/{storeId}"
            }]"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::ConsumerMethodMissing { .. }));
    }

    #[test]
    fn malformed_except_fails_fast() {
        let err = AnnotationSet::from_json(
            r#"[{
                "producer_endpoint": "/stores",
                "producer_method": "POST",
                "except": "nope"
            }]"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::MalformedExcept { .. }));

        let err = AnnotationSet::from_json(
            r#"[{
                "producer_endpoint": "/stores",
                "producer_method": "POST",
                "except": { "consumer_endpoint": "/x" }
            }]"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("consumer_method"));
    }

    #[test]
    fn path_form_resource_names_resolve() {
        let set = AnnotationSet::from_json(
            r#"[{
                "producer_endpoint": "/stores",
                "producer_method": "POST",
                "producer_resource_name": "/store/id"
            }]"#,
        )
        .unwrap();

        // Name-based consumers still match through the path's name part.
        let c = consumer("/stores/{storeId}", HttpMethod::Get, "id");
        let hit = set.find_global(&c).unwrap();
        assert_eq!(
            hit.producer_parameter.as_ref().unwrap().path.to_string(),
            "/store/id"
        );
    }
}
