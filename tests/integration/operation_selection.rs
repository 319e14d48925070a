//! Routing of request shapes onto capabilities.

use crate::common::fixtures::{Call, RecordingHandler, tagged_search};
use crate::common::{context, recording_dispatcher};
use proptest::prelude::*;
use rest_dispatcher::dispatcher::{SelectionInput, select_operation};
use rest_dispatcher::{
    Capability, DispatchError, DispatchRequest, DispatcherBuilder, ErrorKind, Operation, Outcome,
    RestMethod, SearchHandlerConfig,
};
use serde_json::json;

const PATIENT: [Capability; 4] = [
    Capability::Retrievable,
    Capability::Listable,
    Capability::Searchable,
    Capability::Deletable,
];

#[tokio::test]
async fn test_patient_walkthrough() {
    let (dispatcher, handler) = recording_dispatcher("patient", &PATIENT);

    // GET /patient lists everything
    let listed = dispatcher
        .dispatch(DispatchRequest::new(RestMethod::Get, "patient", context("")))
        .await
        .unwrap();
    assert!(matches!(listed, Outcome::Page(_)));
    assert_eq!(handler.last_call(), Some(Call::List));

    // GET /patient?q=john has no search handler for `q`: generic search
    dispatcher
        .dispatch(DispatchRequest::new(RestMethod::Get, "patient", context("q=john")))
        .await
        .unwrap();
    assert_eq!(handler.last_call(), Some(Call::Search));

    // GET /patient/abc-123 retrieves
    let retrieved = dispatcher
        .dispatch(DispatchRequest::new(RestMethod::Get, "patient", context("")).with_id("abc-123"))
        .await
        .unwrap();
    assert_eq!(retrieved, Outcome::Entity(json!({ "uuid": "abc-123" })));

    // DELETE /patient/abc-123?reason=duplicate soft deletes with the reason
    let deleted = dispatcher
        .dispatch(
            DispatchRequest::new(RestMethod::Delete, "patient", context("reason=duplicate"))
                .with_id("abc-123"),
        )
        .await
        .unwrap();
    assert_eq!(deleted, Outcome::NoContent);
    assert_eq!(
        handler.last_call(),
        Some(Call::Delete {
            id: "abc-123".to_string(),
            reason: "duplicate".to_string(),
        })
    );
}

#[tokio::test]
async fn test_special_parameters_do_not_trigger_search() {
    let (dispatcher, handler) = recording_dispatcher("patient", &PATIENT);

    dispatcher
        .list_or_search(
            "patient",
            &context("v=full&limit=10&startIndex=20&includeAll=true&totalCount=true"),
        )
        .await
        .unwrap();
    assert_eq!(handler.calls(), vec![Call::List]);
}

#[tokio::test]
async fn test_list_only_resource_rejects_search() {
    let (dispatcher, handler) = recording_dispatcher("location", &[Capability::Listable]);

    let err = dispatcher
        .list_or_search("location", &context("q=ward"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DispatchError::UnsupportedOperation {
            capability: Capability::Searchable,
            ..
        }
    ));
    assert!(handler.calls().is_empty());
}

#[tokio::test]
async fn test_search_only_resource_rejects_list() {
    let (dispatcher, _) = recording_dispatcher("concept", &[Capability::Searchable]);

    let err = dispatcher
        .list_or_search("concept", &context(""))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DispatchError::UnsupportedOperation {
            capability: Capability::Listable,
            ..
        }
    ));
}

#[tokio::test]
async fn test_collection_get_without_list_or_search() {
    let (dispatcher, handler) = recording_dispatcher("visit", &[Capability::Retrievable]);

    for query in ["", "v=full&limit=5&startIndex=0"] {
        let err = dispatcher
            .dispatch(DispatchRequest::new(RestMethod::Get, "visit", context(query)))
            .await
            .unwrap_err();
        assert!(
            matches!(
                err,
                DispatchError::UnsupportedOperation {
                    capability: Capability::Listable,
                    ..
                }
            ),
            "query {:?}",
            query
        );
    }
    assert!(handler.calls().is_empty());
}

#[tokio::test]
async fn test_search_handler_bypasses_missing_search_capability() {
    let handler = RecordingHandler::with(&[Capability::Listable]);
    let dispatcher = DispatcherBuilder::new()
        .register("location", handler.clone())
        .unwrap()
        .register_search_handler(
            "location",
            SearchHandlerConfig::new("by-tag", ["tag"]),
            tagged_search("tagged"),
        )
        .unwrap()
        .build()
        .unwrap();

    let outcome = dispatcher
        .list_or_search("location", &context("tag=login"))
        .await
        .unwrap();
    assert_eq!(outcome.page().map(|page| page.len()), Some(1));
    assert!(handler.calls().is_empty());
}

#[tokio::test]
async fn test_each_operation_requires_its_capability() {
    let cases = [
        (RestMethod::Get, Some("x"), "", None, Capability::Retrievable),
        (RestMethod::Post, None, "", Some(json!({})), Capability::Creatable),
        (RestMethod::Post, Some("x"), "", Some(json!({})), Capability::Updatable),
        (RestMethod::Delete, Some("x"), "", None, Capability::Deletable),
        (RestMethod::Delete, Some("x"), "purge", None, Capability::Purgeable),
        (RestMethod::Get, None, "", None, Capability::Listable),
        (RestMethod::Get, None, "q=a", None, Capability::Searchable),
    ];

    for (method, id, query, body, needed) in cases {
        let others: Vec<Capability> = Capability::ALL
            .into_iter()
            .filter(|capability| *capability != needed)
            .collect();
        let (dispatcher, handler) = recording_dispatcher("thing", &others);

        let mut request = DispatchRequest::new(method, "thing", context(query));
        if let Some(id) = id {
            request = request.with_id(id);
        }
        if let Some(body) = body {
            request = request.with_body(body);
        }

        let err = dispatcher.dispatch(request).await.unwrap_err();
        match err {
            DispatchError::UnsupportedOperation { capability, .. } => {
                assert_eq!(capability, needed)
            }
            other => panic!("expected unsupported {:?}, got {:?}", needed, other),
        }
        assert!(handler.calls().is_empty(), "no fall-through for {:?}", needed);
    }
}

#[tokio::test]
async fn test_unknown_resource_checked_before_parameters() {
    let (dispatcher, _) = recording_dispatcher("patient", &PATIENT);

    let err = dispatcher
        .dispatch(
            DispatchRequest::new(RestMethod::Delete, "encounter", context("purge=maybe"))
                .with_id("e1"),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownResource);
}

fn method_strategy() -> impl Strategy<Value = RestMethod> {
    prop_oneof![
        Just(RestMethod::Get),
        Just(RestMethod::Post),
        Just(RestMethod::Delete),
    ]
}

proptest! {
    #[test]
    fn test_selection_is_total_and_consistent(
        method in method_strategy(),
        has_id in any::<bool>(),
        purge in any::<bool>(),
        search_handler_matched in any::<bool>(),
        has_search_parameters in any::<bool>(),
    ) {
        let input = SelectionInput {
            method,
            has_id,
            purge,
            search_handler_matched,
            has_search_parameters,
        };

        match select_operation(&input) {
            Ok(operation) => {
                // Entity operations exactly when an id is present
                let targets_entity = matches!(
                    operation,
                    Operation::Retrieve | Operation::Update | Operation::Delete | Operation::Purge
                );
                prop_assert_eq!(targets_entity, has_id);
                if operation == Operation::HandlerSearch {
                    prop_assert!(search_handler_matched);
                }
                if operation == Operation::Purge {
                    prop_assert!(purge);
                }
            }
            Err(err) => {
                prop_assert_eq!(err.kind(), ErrorKind::BadRequest);
                prop_assert!(method == RestMethod::Delete && !has_id);
            }
        }
    }
}
