//! Builder utilities for transport types.

pub mod request;
