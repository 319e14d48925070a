//! Entity lifecycle through the dispatcher and the in-memory handler.

use crate::common::{context, in_memory_dispatcher};
use rest_dispatcher::{DispatchError, ErrorKind, HandlerError, Outcome};
use serde_json::json;

#[tokio::test]
async fn test_create_retrieve_update_cycle() {
    let (dispatcher, _) = in_memory_dispatcher(&["patient"]);

    let created = dispatcher
        .create("patient", json!({ "display": "John Doe", "gender": "M" }), &context(""))
        .await
        .unwrap();
    let uuid = match &created {
        Outcome::Created(entity) => entity["uuid"].as_str().unwrap().to_string(),
        other => panic!("expected created, got {:?}", other),
    };

    let updated = dispatcher
        .update("patient", &uuid, json!({ "display": "Johnny Doe" }), &context(""))
        .await
        .unwrap();
    assert_eq!(updated, Outcome::NoContent);

    let retrieved = dispatcher
        .retrieve("patient", &uuid, &context("v=default"))
        .await
        .unwrap();
    let entity = retrieved.entity().unwrap();
    assert_eq!(entity["display"], "Johnny Doe");
    assert_eq!(entity["gender"], "M");
}

#[tokio::test]
async fn test_delete_then_list_hides_voided() {
    let (dispatcher, stores) = in_memory_dispatcher(&["patient"]);
    for display in ["A", "B", "C"] {
        dispatcher
            .create("patient", json!({ "uuid": display, "display": display }), &context(""))
            .await
            .unwrap();
    }

    dispatcher
        .delete("patient", "B", Some("entered in error"), &context(""))
        .await
        .unwrap();
    let stored = stores[0].get_raw("B").await.unwrap();
    assert_eq!(stored["voidReason"], "entered in error");

    let visible = dispatcher.list_or_search("patient", &context("")).await.unwrap();
    assert_eq!(visible.page().unwrap().len(), 2);

    let all = dispatcher
        .list_or_search("patient", &context("includeAll=true"))
        .await
        .unwrap();
    assert_eq!(all.page().unwrap().len(), 3);
}

#[tokio::test]
async fn test_default_delete_reason_is_applied() {
    let (dispatcher, stores) = in_memory_dispatcher(&["patient"]);
    dispatcher
        .create("patient", json!({ "uuid": "p1" }), &context(""))
        .await
        .unwrap();

    dispatcher
        .delete("patient", "p1", None, &context(""))
        .await
        .unwrap();
    let stored = stores[0].get_raw("p1").await.unwrap();
    assert_eq!(stored["voidReason"], "web service call");
}

#[tokio::test]
async fn test_purge_is_idempotent() {
    let (dispatcher, stores) = in_memory_dispatcher(&["obs"]);
    dispatcher
        .create("obs", json!({ "uuid": "o1", "value": 42 }), &context(""))
        .await
        .unwrap();

    let first = dispatcher.purge("obs", "o1", &context("")).await.unwrap();
    let second = dispatcher.purge("obs", "o1", &context("")).await.unwrap();
    assert_eq!(first, Outcome::NoContent);
    assert_eq!(second, Outcome::NoContent);
    assert!(stores[0].is_empty().await);
}

#[tokio::test]
async fn test_retrieve_unknown_entity_reports_handler_error() {
    let (dispatcher, _) = in_memory_dispatcher(&["patient"]);

    let err = dispatcher
        .retrieve("patient", "does-not-exist", &context(""))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Handler);
    assert!(matches!(
        err,
        DispatchError::Handler {
            source: HandlerError::NotFound { .. },
            ..
        }
    ));
}

#[tokio::test]
async fn test_resources_are_isolated() {
    let (dispatcher, stores) = in_memory_dispatcher(&["patient", "location"]);
    dispatcher
        .create("patient", json!({ "uuid": "shared-id" }), &context(""))
        .await
        .unwrap();

    assert!(dispatcher.retrieve("location", "shared-id", &context("")).await.is_err());
    assert_eq!(stores[0].len().await, 1);
    assert!(stores[1].is_empty().await);
}

#[tokio::test]
async fn test_paging_and_total_count() {
    let (dispatcher, _) = in_memory_dispatcher(&["concept"]);
    for i in 0..7 {
        dispatcher
            .create("concept", json!({ "uuid": format!("c{}", i) }), &context(""))
            .await
            .unwrap();
    }

    let outcome = dispatcher
        .list_or_search("concept", &context("limit=3&startIndex=3&totalCount=true"))
        .await
        .unwrap();
    let page = outcome.page().unwrap();
    assert_eq!(page.len(), 3);
    assert_eq!(page.results[0]["uuid"], "c3");
    assert!(page.has_more);
    assert_eq!(page.total_count, Some(7));
}
