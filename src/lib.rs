//! Generic REST resource dispatcher for Rust.
//!
//! Routes REST requests (`GET`, `POST`, `DELETE` on `/{resource}` and
//! `/{resource}/{id}`) to resource handlers registered by name. Each handler
//! declares the capabilities it supports; the dispatcher picks exactly one
//! operation per request, checks the capability and invokes it.
//!
//! # Core Components
//!
//! - [`Dispatcher`] - Routes requests to the registered handlers
//! - [`ResourceRegistry`] - Resource names mapped to handlers and search handlers
//! - [`ResourceHandler`](resource::ResourceHandler) - Capability accessors a handler implements
//! - [`RequestContext`] - Representation, paging and raw query parameters of a request
//! - [`request_handler::RestRequestHandler`] - Status-code mapping for HTTP frameworks
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use rest_dispatcher::{DispatcherBuilder, RequestContext};
//! use rest_dispatcher::providers::InMemoryResource;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let dispatcher = DispatcherBuilder::new()
//!     .register("patient", Arc::new(InMemoryResource::new("patient")))?
//!     .build()?;
//!
//! let outcome = dispatcher
//!     .list_or_search("patient", &RequestContext::with_generated_id())
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod dispatcher;
pub mod error;
pub mod providers;
pub mod registry;
pub mod representation;
pub mod request_handler;
pub mod resource;

// Re-export commonly used types for convenience
pub use dispatcher::{
    DispatchRequest, Dispatcher, DispatcherBuilder, DispatcherConfig, Outcome, RestMethod,
};
pub use error::{DispatchError, DispatchResult, ErrorKind, HandlerError, HandlerResult};
pub use registry::{
    ResourceRegistry, SearchHandler, SearchHandlerConfig, SharedRegistry, search_fn,
};
pub use representation::Representation;
pub use resource::{Capability, Operation, PageResult, ParameterMap, RequestContext};
