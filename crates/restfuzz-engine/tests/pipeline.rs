//! End-to-end fixture tests for the full compilation pass.
//!
//! Each test provides a minimal operation list (and optionally a
//! dictionary/annotation document), runs [`restfuzz_engine::compile`], and
//! verifies the resolved bindings.

use indoc::indoc;
use pretty_assertions::assert_eq;

use restfuzz_core::{HttpMethod, RequestId};
use restfuzz_dictionary::{CustomPayloadKind, MutationsDictionary};
use restfuzz_engine::{
    compile, load_operations, AnnotationSet, ConsumerBinding, EngineConfig, ResolvedBinding,
};

/// The store/order fixture: a POST creating stores, a parameterized GET
/// reading one back, and an order operation consuming the store id.
const STORE_OPERATIONS: &str = indoc! {r#"
    [
        {
            "endpoint": "/stores",
            "method": "post",
            "response": [{ "name": "id" }]
        },
        {
            "endpoint": "/stores/{id}",
            "method": "get",
            "parameters": [{ "name": "id", "kind": "path" }],
            "response": [{ "name": "id" }]
        },
        {
            "endpoint": "/stores/{storeId}/order/{orderId}",
            "method": "get",
            "parameters": [
                { "name": "storeId", "kind": "path", "consumes": "id" },
                { "name": "orderId", "kind": "path", "consumes": "orderId" }
            ]
        }
    ]
"#};

fn run(
    operations_json: &str,
    dictionary: MutationsDictionary,
    annotations: AnnotationSet,
    config: &EngineConfig,
) -> Vec<ConsumerBinding> {
    let operations = load_operations(operations_json).expect("operations should parse");
    compile(&operations, &dictionary, &annotations, config).bindings
}

fn binding_for<'a>(bindings: &'a [ConsumerBinding], parameter: &str) -> &'a ConsumerBinding {
    bindings
        .iter()
        .find(|b| b.parameter == parameter)
        .unwrap_or_else(|| panic!("no binding for parameter '{parameter}'"))
}

#[test]
fn store_id_binds_to_the_post_producer() {
    let bindings = run(
        STORE_OPERATIONS,
        MutationsDictionary::default(),
        AnnotationSet::default(),
        &EngineConfig::default(),
    );

    // The order operation's storeId must bind to POST /stores: method
    // priority puts POST ahead of the parameterized GET.
    let store_id = binding_for(&bindings, "storeId");
    assert_eq!(
        store_id.request,
        RequestId::new("/stores/{storeId}/order/{orderId}", HttpMethod::Get)
    );
    match &store_id.binding {
        ResolvedBinding::Dynamic { producer } => {
            assert_eq!(producer.producer, RequestId::new("/stores", HttpMethod::Post));
            assert_eq!(producer.path.to_string(), "/id");
            assert_eq!(producer.variable, "_stores_post_id");
        }
        other => panic!("expected dynamic binding, got {other:?}"),
    }
}

#[test]
fn unmatched_resources_fall_back_to_fuzzable() {
    let bindings = run(
        STORE_OPERATIONS,
        MutationsDictionary::default(),
        AnnotationSet::default(),
        &EngineConfig::default(),
    );

    // Nothing produces "orderId": not an error, just a fuzzable value.
    let order_id = binding_for(&bindings, "orderId");
    match &order_id.binding {
        ResolvedBinding::Fuzzable { values, .. } => {
            assert_eq!(values.as_slice(), ["fuzzstring"]);
        }
        other => panic!("expected fuzzable fallback, got {other:?}"),
    }
}

#[test]
fn get_by_id_reuses_the_created_id() {
    let bindings = run(
        STORE_OPERATIONS,
        MutationsDictionary::default(),
        AnnotationSet::default(),
        &EngineConfig::default(),
    );

    // GET /stores/{id} consumes the id POST /stores produced — never its
    // own response.
    let id = binding_for(&bindings, "id");
    assert_eq!(id.request, RequestId::new("/stores/{id}", HttpMethod::Get));
    match &id.binding {
        ResolvedBinding::Dynamic { producer } => {
            assert_eq!(producer.producer, RequestId::new("/stores", HttpMethod::Post));
        }
        other => panic!("expected dynamic binding, got {other:?}"),
    }
}

#[test]
fn scoped_dictionary_entries_beat_bare_entries_per_request() {
    let dictionary_json = indoc! {r#"
        {
            "restler_custom_payload": {
                "id": "bare-id",
                "/stores/{storeId}/order/{orderId}/get/id": "scoped-id"
            }
        }
    "#};
    let dictionary = MutationsDictionary::default()
        .merge(MutationsDictionary::from_json(dictionary_json).expect("dictionary should parse"));

    let bindings = run(
        STORE_OPERATIONS,
        dictionary,
        AnnotationSet::default(),
        &EngineConfig::default(),
    );

    // The order operation sees the request-scoped entry...
    let store_id = binding_for(&bindings, "storeId");
    match &store_id.binding {
        ResolvedBinding::Custom { payload } => {
            assert_eq!(payload.kind, CustomPayloadKind::String);
            assert_eq!(payload.values, ["scoped-id"]);
            assert!(payload.quoted);
        }
        other => panic!("expected custom payload, got {other:?}"),
    }

    // ...while GET /stores/{id} gets the bare entry.
    let id = binding_for(&bindings, "id");
    match &id.binding {
        ResolvedBinding::Custom { payload } => assert_eq!(payload.values, ["bare-id"]),
        other => panic!("expected custom payload, got {other:?}"),
    }
}

#[test]
fn global_annotation_overrides_ranking_minus_excepted_consumers() {
    let operations_json = indoc! {r#"
        [
            {
                "endpoint": "/stores",
                "method": "post",
                "response": [{ "name": "id" }]
            },
            {
                "endpoint": "/archive/{id}",
                "method": "delete",
                "parameters": [{ "name": "id", "kind": "path" }],
                "response": [{ "name": "id" }]
            },
            {
                "endpoint": "/stores/{id}",
                "method": "get",
                "parameters": [{ "name": "id", "kind": "path" }]
            },
            {
                "endpoint": "/legacy/{id}",
                "method": "get",
                "parameters": [{ "name": "id", "kind": "path" }]
            }
        ]
    "#};
    let annotations = AnnotationSet::from_json(indoc! {r#"
        [
            {
                "producer_endpoint": "/stores",
                "producer_method": "POST",
                "producer_resource_name": "id",
                "except": {
                    "consumer_endpoint": "/legacy/{id}",
                    "consumer_method": "GET"
                }
            }
        ]
    "#})
    .expect("annotations should parse");

    let bindings = run(
        operations_json,
        MutationsDictionary::default(),
        annotations,
        &EngineConfig::default(),
    );

    // Ranking alone would prefer the DELETE producer; the annotation routes
    // everyone to the POST...
    let stores_get = bindings
        .iter()
        .find(|b| b.request.endpoint == "/stores/{id}")
        .unwrap();
    match &stores_get.binding {
        ResolvedBinding::Dynamic { producer } => {
            assert_eq!(producer.producer, RequestId::new("/stores", HttpMethod::Post));
        }
        other => panic!("expected dynamic binding, got {other:?}"),
    }

    // ...except the excepted consumer, which falls through to ranking and
    // gets the DELETE.
    let legacy_get = bindings
        .iter()
        .find(|b| b.request.endpoint == "/legacy/{id}")
        .unwrap();
    match &legacy_get.binding {
        ResolvedBinding::Dynamic { producer } => {
            assert_eq!(
                producer.producer,
                RequestId::new("/archive/{id}", HttpMethod::Delete)
            );
        }
        other => panic!("expected dynamic binding, got {other:?}"),
    }
}

#[test]
fn exploratory_ordering_changes_the_winner() {
    let operations_json = indoc! {r#"
        [
            {
                "endpoint": "/stores",
                "method": "post",
                "response": [{ "name": "id" }]
            },
            {
                "endpoint": "/archive/{id}",
                "method": "delete",
                "parameters": [{ "name": "id", "kind": "path" }],
                "response": [{ "name": "id" }]
            },
            {
                "endpoint": "/orders",
                "method": "post",
                "parameters": [{ "name": "id", "kind": "body" }]
            }
        ]
    "#};

    let order_binding = |bindings: &[ConsumerBinding]| {
        bindings
            .iter()
            .find(|b| b.request.endpoint == "/orders")
            .expect("the /orders consumer should be resolved")
            .binding
            .clone()
    };

    let normal = run(
        operations_json,
        MutationsDictionary::default(),
        AnnotationSet::default(),
        &EngineConfig::default(),
    );
    match order_binding(&normal) {
        ResolvedBinding::Dynamic { producer } => {
            assert_eq!(
                producer.producer,
                RequestId::new("/archive/{id}", HttpMethod::Delete)
            );
        }
        other => panic!("expected dynamic binding, got {other:?}"),
    }

    let config: EngineConfig =
        serde_yaml_ng::from_str("method_ordering: exploratory").expect("config should parse");
    let exploratory = run(
        operations_json,
        MutationsDictionary::default(),
        AnnotationSet::default(),
        &config,
    );
    match order_binding(&exploratory) {
        ResolvedBinding::Dynamic { producer } => {
            assert_eq!(producer.producer, RequestId::new("/stores", HttpMethod::Post));
        }
        other => panic!("expected dynamic binding, got {other:?}"),
    }
}

#[test]
fn bindings_serialize_for_the_emitter() {
    let operations = load_operations(STORE_OPERATIONS).expect("operations should parse");
    let grammar = compile(
        &operations,
        &MutationsDictionary::default(),
        &AnnotationSet::default(),
        &EngineConfig::default(),
    );

    let json = serde_json::to_string_pretty(&grammar).expect("bindings should serialize");
    let doc: serde_json::Value = serde_json::from_str(&json).expect("output should parse");

    let first = &doc["bindings"][0];
    assert_eq!(first["parameter"], "id");
    assert_eq!(first["binding"]["binding"], "dynamic");
    assert_eq!(
        first["binding"]["producer"]["variable"],
        "_stores_post_id"
    );
}
