//! Error types for resource dispatch.
//!
//! Two layers of errors exist. [`HandlerError`] is what a concrete resource
//! handler returns from one of its capability methods. [`DispatchError`] is
//! what the dispatcher hands back to the transport layer: it covers routing
//! failures (unknown resource, missing capability, malformed parameters,
//! registry misconfiguration) and wraps handler failures unchanged together
//! with the resource and operation that produced them.

use crate::resource::capabilities::{Capability, Operation};

/// Main error type for dispatch operations.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// No handler is registered under the requested resource name
    #[error("Unknown resource: {resource}")]
    UnknownResource { resource: String },

    /// The handler exists but does not implement the capability the request needs
    #[error("Resource '{resource}' does not support {capability}")]
    UnsupportedOperation {
        resource: String,
        capability: Capability,
    },

    /// Registration-time misconfiguration (duplicate names, ambiguous search handlers)
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Malformed pagination, representation or flag values
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    /// Failure reported by the resource handler itself
    #[error("{operation} on '{resource}' failed: {source}")]
    Handler {
        resource: String,
        operation: Operation,
        #[source]
        source: HandlerError,
    },
}

/// Coarse classification of a [`DispatchError`] for transport mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnknownResource,
    UnsupportedOperation,
    Configuration,
    BadRequest,
    Handler,
}

/// Errors returned by resource and search handlers.
///
/// The dispatcher never inspects these; it only attaches routing context
/// and propagates them. The variants exist so that a transport can choose a
/// sensible status code.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// No entity with the given identifier exists
    #[error("Object with id '{id}' not found")]
    NotFound { id: String },

    /// The payload or parameters failed domain validation
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// The request conflicts with the current state of the entity
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// Any other failure inside the handler
    #[error("Handler error: {0}")]
    Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl DispatchError {
    /// Create an unknown resource error
    pub fn unknown_resource(resource: impl Into<String>) -> Self {
        Self::UnknownResource {
            resource: resource.into(),
        }
    }

    /// Create an unsupported operation error
    pub fn unsupported(resource: impl Into<String>, capability: Capability) -> Self {
        Self::UnsupportedOperation {
            resource: resource.into(),
            capability,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Wrap a handler failure with the resource and operation it came from
    pub fn handler(resource: impl Into<String>, operation: Operation, source: HandlerError) -> Self {
        Self::Handler {
            resource: resource.into(),
            operation,
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownResource { .. } => ErrorKind::UnknownResource,
            Self::UnsupportedOperation { .. } => ErrorKind::UnsupportedOperation,
            Self::Configuration { .. } => ErrorKind::Configuration,
            Self::BadRequest { .. } => ErrorKind::BadRequest,
            Self::Handler { .. } => ErrorKind::Handler,
        }
    }

    /// Stable error code for programmatic handling by clients.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownResource { .. } => "UNKNOWN_RESOURCE",
            Self::UnsupportedOperation { .. } => "UNSUPPORTED_OPERATION",
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::BadRequest { .. } => "BAD_REQUEST",
            Self::Handler { source, .. } => source.error_code(),
        }
    }

    /// HTTP status code a transport should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::UnknownResource { .. } => 404,
            Self::UnsupportedOperation { .. } | Self::BadRequest { .. } => 400,
            Self::Configuration { .. } => 500,
            Self::Handler { source, .. } => source.status_code(),
        }
    }

    /// The resource name this error refers to, if any.
    pub fn resource(&self) -> Option<&str> {
        match self {
            Self::UnknownResource { resource }
            | Self::UnsupportedOperation { resource, .. }
            | Self::Handler { resource, .. } => Some(resource),
            Self::Configuration { .. } | Self::BadRequest { .. } => None,
        }
    }
}

impl HandlerError {
    /// Create a not found error
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Create an invalid request error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Create a conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Wrap an arbitrary handler-side error
    pub fn internal<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Internal(Box::new(error))
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "OBJECT_NOT_FOUND",
            Self::InvalidRequest { .. } => "INVALID_REQUEST",
            Self::Conflict { .. } => "CONFLICT",
            Self::Internal(_) => "HANDLER_ERROR",
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::InvalidRequest { .. } => 400,
            Self::Conflict { .. } => 409,
            Self::Internal(_) => 500,
        }
    }
}

// Result type aliases for convenience
pub type DispatchResult<T> = Result<T, DispatchError>;
pub type HandlerResult<T> = Result<T, HandlerError>;
