//! Common test utilities for dispatcher testing.

use rest_dispatcher::providers::InMemoryResource;
use rest_dispatcher::{
    Capability, Dispatcher, DispatcherBuilder, DispatcherConfig, ParameterMap, RequestContext,
};
use std::sync::Arc;


use fixtures::RecordingHandler;

/// Route `log` output through the test harness. Safe to call repeatedly.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Request context built from a raw query string with the default configuration.
pub fn context(query: &str) -> RequestContext {
    RequestContext::from_parameters(ParameterMap::from_query(query), &DispatcherConfig::default())
        .expect("test query should parse")
}

/// Dispatcher with one in-memory resource per name.
pub fn in_memory_dispatcher(resources: &[&str]) -> (Dispatcher, Vec<InMemoryResource>) {
    init_logging();
    let mut builder = DispatcherBuilder::new();
    let mut stores = Vec::new();
    for name in resources {
        let store = InMemoryResource::new(*name);
        builder = builder
            .register(name, Arc::new(store.clone()))
            .expect("registration should succeed");
        stores.push(store);
    }
    (builder.build().expect("dispatcher should build"), stores)
}

/// Dispatcher with a single recording handler offering `capabilities`.
pub fn recording_dispatcher(
    resource: &str,
    capabilities: &[Capability],
) -> (Dispatcher, Arc<RecordingHandler>) {
    init_logging();
    let handler = RecordingHandler::with(capabilities);
    let dispatcher = DispatcherBuilder::new()
        .register(resource, handler.clone())
        .expect("registration should succeed")
        .build()
        .expect("dispatcher should build");
    (dispatcher, handler)
}
