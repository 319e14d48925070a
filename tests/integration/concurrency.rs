//! Concurrent dispatch and runtime re-registration.

use crate::common::fixtures::RecordingHandler;
use crate::common::{context, in_memory_dispatcher, init_logging};
use futures::future::join_all;
use rest_dispatcher::providers::InMemoryResource;
use rest_dispatcher::{Capability, Dispatcher, ErrorKind, ResourceRegistry};
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn test_concurrent_creates_are_all_stored() {
    let (dispatcher, stores) = in_memory_dispatcher(&["patient"]);

    let creates = (0..50).map(|i| {
        let dispatcher = dispatcher.clone();
        async move {
            dispatcher
                .create("patient", json!({ "display": format!("Patient {}", i) }), &context(""))
                .await
        }
    });
    let results = join_all(creates).await;

    assert!(results.iter().all(Result::is_ok));
    assert_eq!(stores[0].len().await, 50);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_dispatch_across_tasks() {
    let (dispatcher, _) = in_memory_dispatcher(&["obs"]);
    dispatcher
        .create("obs", json!({ "uuid": "o1" }), &context(""))
        .await
        .unwrap();

    let tasks: Vec<_> = (0..20)
        .map(|_| {
            let dispatcher = dispatcher.clone();
            tokio::spawn(async move { dispatcher.retrieve("obs", "o1", &context("")).await })
        })
        .collect();

    for result in join_all(tasks).await {
        assert!(result.unwrap().is_ok());
    }
}

#[tokio::test]
async fn test_reregistration_while_dispatching() {
    init_logging();
    let dispatcher = Dispatcher::new(ResourceRegistry::new()).unwrap();

    let registrations = (0..10).map(|i| {
        let dispatcher = dispatcher.clone();
        async move {
            let name = format!("resource{}", i);
            dispatcher.registry().update(|registry| {
                registry.register(&name, Arc::new(InMemoryResource::new(name.clone())))
            })
        }
    });
    let lookups = (0..10).map(|i| {
        let dispatcher = dispatcher.clone();
        async move {
            // Either not yet registered or fully registered, never partial
            match dispatcher
                .list_or_search(&format!("resource{}", i), &context(""))
                .await
            {
                Ok(outcome) => assert!(outcome.page().is_some()),
                Err(err) => assert_eq!(err.kind(), ErrorKind::UnknownResource),
            }
        }
    });

    let (registered, _) = futures::join!(join_all(registrations), join_all(lookups));
    assert!(registered.iter().all(Result::is_ok));
    assert_eq!(dispatcher.registry().snapshot().len(), 10);
}

#[tokio::test]
async fn test_replacement_is_atomic() {
    init_logging();
    let mut registry = ResourceRegistry::new();
    registry
        .register("location", RecordingHandler::with(&[Capability::Listable]))
        .unwrap();
    let dispatcher = Dispatcher::new(registry).unwrap();
    let pinned = dispatcher.registry().snapshot();

    dispatcher
        .registry()
        .update(|registry| {
            registry.unregister("location");
            registry.register(
                "location",
                RecordingHandler::with(&[Capability::Listable, Capability::Searchable]),
            )
        })
        .unwrap();

    // The earlier snapshot still sees the old capabilities
    assert_eq!(pinned.capabilities("location").unwrap(), vec![Capability::Listable]);
    assert!(
        dispatcher
            .list_or_search("location", &context("q=ward"))
            .await
            .is_ok()
    );
}
