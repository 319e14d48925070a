//! Integration tests for the REST dispatcher.
//!
//! ## Test Organization
//!
//! - `operation_selection` - Which capability a request shape reaches, and
//!   that a missing capability never falls through to another one
//! - `crud` - Full entity lifecycle through the in-memory handler
//! - `search_handlers` - Specialized search handler matching and determinism
//! - `transport` - `RestRequestHandler` status codes, bodies and links
//! - `concurrency` - Parallel dispatch and re-registration at runtime

pub mod concurrency;
pub mod crud;
pub mod operation_selection;
pub mod transport;
