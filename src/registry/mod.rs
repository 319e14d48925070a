//! Resource registry with specialized search handlers.
//!
//! # Module Organization
//!
//! * [`core`] - `ResourceRegistry` struct and lookups
//! * [`registration`] - Registration and bootstrap validation
//! * [`search`] - Search handler trait, configs and most-specific matching
//! * [`shared`] - Copy-on-write wrapper for re-registration at runtime

pub mod core;
pub mod registration;
pub mod search;
pub mod shared;


pub use core::ResourceRegistry;
pub use search::{
    FnSearchHandler, RegisteredSearchHandler, SearchHandler, SearchHandlerConfig, search_fn,
};
pub use shared::SharedRegistry;
