//! Framework-agnostic REST request handling.
//!
//! This module sits between an HTTP framework and the [`Dispatcher`](crate::Dispatcher).
//! It parses the method, path and query string of a request, builds the
//! request context, dispatches and maps the outcome onto a status code and
//! JSON body. Wiring it to a concrete server is left to the embedder.
//!
//! # Key Types
//!
//! - [`RestRequestHandler`] - Owns a dispatcher and answers requests
//! - [`RestRequest`] - Method, path, query string and optional body
//! - [`RestResponse`] - Status code, optional body and optional location
//!
//! # Examples
//!
//! ```rust
//! use rest_dispatcher::DispatcherBuilder;
//! use rest_dispatcher::providers::InMemoryResource;
//! use rest_dispatcher::request_handler::{RestRequest, RestRequestHandler};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), rest_dispatcher::DispatchError> {
//! let dispatcher = DispatcherBuilder::new()
//!     .register("patient", Arc::new(InMemoryResource::new("patient")))?
//!     .build()?;
//! let handler = RestRequestHandler::new(dispatcher);
//!
//! let response = handler
//!     .handle_request(RestRequest::post("/patient", json!({"display": "John Doe"})))
//!     .await;
//! assert_eq!(response.status, 201);
//! assert!(response.location.is_some());
//! # Ok(())
//! # }
//! ```

mod builders;
mod core;
mod errors;

pub use core::{RestRequest, RestRequestHandler, RestResponse};
pub use errors::create_error_response;
