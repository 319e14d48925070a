//! End-to-end tests of the request handler.

use crate::common::init_logging;
use rest_dispatcher::DispatcherBuilder;
use rest_dispatcher::providers::InMemoryResource;
use rest_dispatcher::request_handler::{RestRequest, RestRequestHandler};
use serde_json::json;
use std::sync::Arc;

fn handler() -> RestRequestHandler {
    init_logging();
    let dispatcher = DispatcherBuilder::new()
        .with_base_url("https://emr.example.org/openmrs/ws/rest")
        .with_default_limit(2)
        .register("patient", Arc::new(InMemoryResource::new("patient")))
        .unwrap()
        .build()
        .unwrap();
    RestRequestHandler::new(dispatcher)
}

async fn seed(handler: &RestRequestHandler, names: &[&str]) {
    for name in names {
        let response = handler
            .handle_request(RestRequest::post(
                "/openmrs/ws/rest/v1/patient",
                json!({ "uuid": name, "display": name }),
            ))
            .await;
        assert_eq!(response.status, 201);
    }
}

#[tokio::test]
async fn test_paging_links() {
    let handler = handler();
    seed(&handler, &["a", "b", "c", "d", "e"]).await;

    let response = handler
        .handle_request(RestRequest::get("/openmrs/ws/rest/v1/patient?startIndex=2"))
        .await;
    assert_eq!(response.status, 200);

    let body = response.body.unwrap();
    assert_eq!(body["results"], json!([
        { "uuid": "c", "display": "c" },
        { "uuid": "d", "display": "d" },
    ]));
    let links = body["links"].as_array().unwrap();
    assert_eq!(links.len(), 2);
    assert_eq!(links[0]["rel"], "prev");
    assert_eq!(
        links[0]["uri"],
        "https://emr.example.org/openmrs/ws/rest/v1/patient?limit=2&startIndex=0"
    );
    assert_eq!(links[1]["rel"], "next");
    assert_eq!(
        links[1]["uri"],
        "https://emr.example.org/openmrs/ws/rest/v1/patient?limit=2&startIndex=4"
    );
}

#[tokio::test]
async fn test_search_paging_links_keep_criteria() {
    let handler = handler();
    seed(&handler, &["John Doe", "Jane Doe", "Ann Smith", "Mary Doe"]).await;

    let first = handler
        .handle_request(RestRequest::get("/openmrs/ws/rest/v1/patient?q=doe"))
        .await;
    let body = first.body.unwrap();
    assert_eq!(body["results"].as_array().unwrap().len(), 2);
    let next = body["links"][0]["uri"].as_str().unwrap().to_string();
    assert_eq!(
        next,
        "https://emr.example.org/openmrs/ws/rest/v1/patient?q=doe&limit=2&startIndex=2"
    );

    // Following the link continues the search rather than listing everything
    let target = next.trim_start_matches("https://emr.example.org");
    let second = handler.handle_request(RestRequest::new("GET", target)).await;
    assert_eq!(second.status, 200);
    let body = second.body.unwrap();
    assert_eq!(body["results"], json!([{ "uuid": "Mary Doe", "display": "Mary Doe" }]));
    let links = body["links"].as_array().unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0]["rel"], "prev");
    assert_eq!(
        links[0]["uri"],
        "https://emr.example.org/openmrs/ws/rest/v1/patient?q=doe&limit=2&startIndex=0"
    );
}

#[tokio::test]
async fn test_limit_is_clamped_not_rejected() {
    let handler = handler();
    seed(&handler, &["a"]).await;

    let response = handler
        .handle_request(RestRequest::get("/patient?limit=100000&totalCount=true"))
        .await;
    assert_eq!(response.status, 200);
    assert_eq!(response.body.unwrap()["totalCount"], 1);
}

#[tokio::test]
async fn test_soft_delete_and_purge_over_http() {
    let handler = handler();
    seed(&handler, &["a", "b"]).await;

    let deleted = handler
        .handle_request(RestRequest::delete("/patient/a?reason=duplicate"))
        .await;
    assert_eq!(deleted.status, 204);

    let voided = handler
        .handle_request(RestRequest::get("/patient/a?v=full"))
        .await;
    let body = voided.body.unwrap();
    assert_eq!(body["voided"], true);
    assert_eq!(body["voidReason"], "duplicate");

    let purged = handler.handle_request(RestRequest::delete("/patient/b?purge")).await;
    assert_eq!(purged.status, 204);
    let gone = handler.handle_request(RestRequest::get("/patient/b")).await;
    assert_eq!(gone.status, 404);

    let invalid = handler
        .handle_request(RestRequest::delete("/patient/a?purge=perhaps"))
        .await;
    assert_eq!(invalid.status, 400);
    assert_eq!(invalid.body.unwrap()["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_update_answers_no_content() {
    let handler = handler();
    seed(&handler, &["a"]).await;

    let response = handler
        .handle_request(RestRequest::post("/patient/a", json!({ "gender": "F" })))
        .await;
    assert_eq!(response.status, 204);
    assert!(response.body.is_none());
    assert!(response.is_success());
}

#[tokio::test]
async fn test_custom_representation() {
    let handler = handler();
    seed(&handler, &["a"]).await;

    let response = handler
        .handle_request(RestRequest::get("/patient/a?v=custom:(uuid,voided)"))
        .await;
    assert_eq!(response.body.unwrap(), json!({ "uuid": "a", "voided": false }));

    let unknown = handler
        .handle_request(RestRequest::get("/patient/a?v=verbose"))
        .await;
    assert_eq!(unknown.status, 400);
}
