//! Core request handler infrastructure.
//!
//! Contains the transport-level request and response types and the handler
//! that translates between them and dispatcher calls.

use crate::dispatcher::{DispatchRequest, Dispatcher, Outcome, RestMethod};
use crate::error::{DispatchError, DispatchResult};
use crate::representation::Representation;
use crate::resource::{ParameterMap, RequestContext, params};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Transport-agnostic REST request handler.
///
/// Cheap to clone; clones share the dispatcher's registry.
#[derive(Debug, Clone)]
pub struct RestRequestHandler {
    pub(super) dispatcher: Dispatcher,
}

/// An incoming request as seen by an HTTP framework.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestRequest {
    /// HTTP method name, e.g. "GET"
    pub method: String,
    /// Request path, with or without the configured prefix
    pub path: String,
    /// Raw query string without the leading `?`
    pub query: String,
    /// Decoded JSON body for POST requests
    pub body: Option<Value>,
    /// Correlation id supplied by the transport
    pub request_id: Option<String>,
}

/// The response a transport should send back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestResponse {
    pub status: u16,
    /// JSON body; `None` for 204 responses
    pub body: Option<Value>,
    /// URL of a newly created entity
    pub location: Option<String>,
    pub request_id: String,
}

impl RestResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl RestRequestHandler {
    /// Create a handler answering requests with the given dispatcher.
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Handle one request. Never fails; errors become error responses.
    pub async fn handle_request(&self, request: RestRequest) -> RestResponse {
        let request_id = request
            .request_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        info!(
            "REST request handler processing {} {} (request: '{}')",
            request.method, request.path, request_id
        );

        let result = self.process(request, &request_id).await;

        match &result {
            Ok(response) => debug!(
                "REST request completed with status {} (request: '{}')",
                response.status, request_id
            ),
            Err(e) => warn!("REST request failed: {} (request: '{}')", e, request_id),
        }

        result.unwrap_or_else(|e| super::errors::create_error_response(e, request_id))
    }

    async fn process(&self, request: RestRequest, request_id: &str) -> DispatchResult<RestResponse> {
        let config = self.dispatcher.config();
        let method: RestMethod = request.method.parse()?;
        let (resource, id) = self.parse_path(&request.path)?;
        // Unknown resources are reported before any parameter is interpreted
        self.dispatcher.registry().snapshot().lookup(&resource)?;

        // Single-entity requests default to the handler's default view
        let default_representation = if id.is_some() || method == RestMethod::Post {
            Representation::Default
        } else {
            Representation::Ref
        };
        let parameters = ParameterMap::from_query(&request.query);
        let link_query = parameters.to_query_without(&[params::LIMIT, params::START_INDEX]);
        let context = RequestContext::from_parameters_with_default(
            parameters,
            config,
            default_representation,
        )?
        .with_request_id(request_id);

        let mut dispatch = DispatchRequest::new(method, resource.clone(), context);
        if let Some(id) = id {
            dispatch = dispatch.with_id(id);
        }
        if let Some(body) = request.body {
            dispatch = dispatch.with_body(body);
        }

        let outcome = self.dispatcher.dispatch(dispatch).await?;
        Ok(self.to_response(&resource, &link_query, outcome, request_id))
    }

    /// Split a request path into resource name and optional identifier.
    ///
    /// The configured path prefix is stripped when present.
    pub(super) fn parse_path(&self, path: &str) -> DispatchResult<(String, Option<String>)> {
        let prefix = self.dispatcher.config().path_prefix();
        let relative = match path.strip_prefix(prefix.as_str()) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
            _ => path,
        };
        let segments: Vec<&str> = relative
            .trim_matches('/')
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();

        match segments.as_slice() {
            [resource] => Ok((resource.to_string(), None)),
            [resource, id] => Ok((resource.to_string(), Some(id.to_string()))),
            _ => Err(DispatchError::bad_request(format!(
                "path '{}' does not address a resource or entity",
                path
            ))),
        }
    }

    /// Paging links carry `link_query` ahead of the paging parameters.
    fn to_response(
        &self,
        resource: &str,
        link_query: &str,
        outcome: Outcome,
        request_id: &str,
    ) -> RestResponse {
        let config = self.dispatcher.config();
        let (status, body, location) = match outcome {
            Outcome::Entity(entity) => (200, Some(entity), None),
            Outcome::Created(entity) => {
                let location = entity
                    .get("uuid")
                    .and_then(Value::as_str)
                    .map(|uuid| config.resource_url(resource, Some(uuid)));
                (201, Some(entity), location)
            }
            Outcome::Page(page) => {
                let mut collection = config.resource_url(resource, None);
                if !link_query.is_empty() {
                    collection.push('?');
                    collection.push_str(link_query);
                }
                (200, Some(page.to_json(Some(collection.as_str()))), None)
            }
            Outcome::NoContent => (204, None, None),
        };

        RestResponse {
            status,
            body,
            location,
            request_id: request_id.to_string(),
        }
    }
}
