//! Generic REST dispatcher over registered resource handlers.
//!
//! The dispatcher turns a method, a resource name, an optional identifier and
//! the query parameters into exactly one capability invocation. It holds no
//! per-request state and never retries a handler call.
//!
//! # Module Organization
//!
//! * [`core`] - `Dispatcher` struct, request type and routing
//! * [`operations`] - One entry point per operation (retrieve, create, update, ...)
//! * [`selection`] - The method/path/parameter decision table
//! * [`builder`] - Configuration and bootstrap

pub mod builder;
pub mod core;
pub mod operations;
pub mod selection;


pub use builder::{DispatcherBuilder, DispatcherConfig};
pub use core::{DispatchRequest, Dispatcher, Outcome};
pub use selection::{RestMethod, SelectionInput, select_operation};
