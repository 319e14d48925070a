//! Core dispatcher structure and request routing.

use super::builder::{DispatcherBuilder, DispatcherConfig};
use super::selection::{
    RestMethod, SelectionInput, ensure_capability, purge_requested, select_operation,
};
use crate::error::{DispatchError, DispatchResult};
use crate::registry::{ResourceRegistry, SharedRegistry};
use crate::resource::context::params;
use crate::resource::{Operation, PageResult, RequestContext};
use log::{debug, info, warn};
use serde_json::Value;
use std::sync::Arc;

/// Result of a successful dispatch.
///
/// The transport decides how each variant maps to a status code and body.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A single entity (retrieve)
    Entity(Value),
    /// A page of entities (list and search)
    Page(PageResult),
    /// The entity produced by a create
    Created(Value),
    /// Update, delete and purge succeeded; nothing to return
    NoContent,
}

impl Outcome {
    /// Entity payload of `Entity` and `Created` outcomes.
    pub fn entity(&self) -> Option<&Value> {
        match self {
            Self::Entity(value) | Self::Created(value) => Some(value),
            Self::Page(_) | Self::NoContent => None,
        }
    }

    pub fn page(&self) -> Option<&PageResult> {
        match self {
            Self::Page(page) => Some(page),
            _ => None,
        }
    }

    pub fn is_no_content(&self) -> bool {
        matches!(self, Self::NoContent)
    }
}

/// A fully parsed request, ready for routing.
#[derive(Debug, Clone)]
pub struct DispatchRequest {
    pub method: RestMethod,
    pub resource: String,
    /// Entity identifier from the path, if any
    pub id: Option<String>,
    /// Decoded request body for create and update
    pub body: Option<Value>,
    pub context: RequestContext,
}

impl DispatchRequest {
    pub fn new(method: RestMethod, resource: impl Into<String>, context: RequestContext) -> Self {
        Self {
            method,
            resource: resource.into(),
            id: None,
            body: None,
            context,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Routes requests to the capability handlers registered per resource.
///
/// The dispatcher keeps no per-request state. Each call pins a snapshot of
/// the registry, so re-registration through [`Dispatcher::registry`] never
/// affects a dispatch already in flight.
///
/// # Examples
///
/// ```rust
/// use rest_dispatcher::{DispatcherBuilder, Outcome, RequestContext};
/// use rest_dispatcher::providers::InMemoryResource;
/// use serde_json::json;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), rest_dispatcher::DispatchError> {
/// let dispatcher = DispatcherBuilder::new()
///     .register("patient", Arc::new(InMemoryResource::new("patient")))?
///     .build()?;
///
/// let context = RequestContext::with_generated_id();
/// let created = dispatcher
///     .create("patient", json!({"display": "John Doe"}), &context)
///     .await?;
/// assert!(matches!(created, Outcome::Created(_)));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Dispatcher {
    pub(super) registry: Arc<SharedRegistry>,
    pub(super) config: DispatcherConfig,
}

impl Dispatcher {
    /// Create a dispatcher over a bootstrapped registry with default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Configuration`] if the registry fails validation.
    pub fn new(registry: ResourceRegistry) -> DispatchResult<Self> {
        DispatcherBuilder::new().with_registry(registry).build()
    }

    /// Create a dispatcher from a shared registry and an already validated configuration.
    pub(crate) fn with_config(registry: Arc<SharedRegistry>, config: DispatcherConfig) -> Self {
        Self { registry, config }
    }

    /// The registry, for inspection or re-registration.
    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Route a parsed request through the operation selection table.
    ///
    /// # Errors
    ///
    /// * [`DispatchError::UnknownResource`] if the resource is not registered
    /// * [`DispatchError::UnsupportedOperation`] if the handler lacks the capability
    /// * [`DispatchError::BadRequest`] for malformed flags or a missing body
    /// * [`DispatchError::Handler`] when the handler itself fails
    pub async fn dispatch(&self, request: DispatchRequest) -> DispatchResult<Outcome> {
        info!(
            "Dispatching {} {}{} (request: '{}')",
            request.method,
            request.resource,
            request
                .id
                .as_deref()
                .map(|id| format!("/{}", id))
                .unwrap_or_default(),
            request.context.request_id
        );

        let request_id = request.context.request_id.clone();
        let registry = self.registry.snapshot();
        let result = self.route(&registry, request).await;

        match &result {
            Ok(_) => debug!(
                "Dispatch completed successfully (request: '{}')",
                request_id
            ),
            Err(e) => warn!("Dispatch failed: {} (request: '{}')", e, request_id),
        }
        result
    }

    async fn route(
        &self,
        registry: &ResourceRegistry,
        request: DispatchRequest,
    ) -> DispatchResult<Outcome> {
        let DispatchRequest {
            method,
            resource,
            id,
            body,
            context,
        } = request;

        // Unknown resources fail before any parameter is interpreted
        let handler = registry.lookup(&resource)?;

        let parameters = context.parameters();
        let purge = method == RestMethod::Delete && purge_requested(parameters)?;
        let search_handler_matched = method == RestMethod::Get
            && id.is_none()
            && self
                .resolve_search_handler(registry, &resource, &context)?
                .is_some();

        let operation = select_operation(&SelectionInput {
            method,
            has_id: id.is_some(),
            purge,
            search_handler_matched,
            has_search_parameters: parameters.has_search_parameters(),
        })?;
        debug!("Selected {} for '{}'", operation, resource);
        ensure_capability(&resource, handler, operation)?;

        let id = id.unwrap_or_default();
        match operation {
            Operation::Retrieve => self.retrieve_in(registry, &resource, &id, &context).await,
            Operation::Update => {
                let body = require_body(body, operation)?;
                self.update_in(registry, &resource, &id, body, &context).await
            }
            Operation::Create => {
                let body = require_body(body, operation)?;
                self.create_in(registry, &resource, body, &context).await
            }
            Operation::Delete => {
                let reason = context.parameter(params::REASON);
                self.delete_in(registry, &resource, &id, reason, &context)
                    .await
            }
            Operation::Purge => self.purge_in(registry, &resource, &id, &context).await,
            Operation::List | Operation::Search | Operation::HandlerSearch => {
                self.list_or_search_in(registry, &resource, &context).await
            }
        }
    }
}

fn require_body(body: Option<Value>, operation: Operation) -> DispatchResult<Value> {
    body.ok_or_else(|| {
        DispatchError::bad_request(format!("{} requires a request body", operation))
    })
}
