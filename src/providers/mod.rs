//! Ready-made resource handlers.
//!
//! * [`InMemoryResource`] - Thread-safe in-memory handler implementing every
//!   capability, for testing, development and as a reference for custom handlers

pub mod in_memory;

pub use in_memory::InMemoryResource;
