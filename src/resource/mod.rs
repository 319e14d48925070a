//! Resource handler abstractions.
//!
//! # Key Components
//!
//! * [`ResourceHandler`] - A handler registered under a resource name, exposing its capabilities
//! * [`Capability`] - The seven behaviours a handler may implement
//! * [`RequestContext`] - Per-request representation, paging and raw parameters
//! * [`PageResult`] - A page of entities returned by list and search

pub mod capabilities;
pub mod context;
pub mod page;

pub use capabilities::{
    Capability, Creatable, Deletable, Listable, Operation, Purgeable, ResourceHandler,
    Retrievable, Searchable, Updatable,
};
pub use context::{ParameterMap, RequestContext, params};
pub use page::PageResult;
