//! Request builder utilities for RestRequest
//!
//! A target may carry its query string (`/patient?q=john`); it is split off
//! into [`RestRequest::query`].

use crate::request_handler::core::RestRequest;
use serde_json::Value;

impl RestRequest {
    /// Create a request for any method name.
    pub fn new(method: impl Into<String>, target: &str) -> Self {
        let (path, query) = target.split_once('?').unwrap_or((target, ""));
        Self {
            method: method.into(),
            path: path.to_string(),
            query: query.to_string(),
            body: None,
            request_id: None,
        }
    }

    /// Create a GET request (retrieve, list or search).
    pub fn get(target: &str) -> Self {
        Self::new("GET", target)
    }

    /// Create a POST request (create or update).
    pub fn post(target: &str, body: Value) -> Self {
        Self::new("POST", target).with_body(body)
    }

    /// Create a DELETE request (delete, or purge with `?purge`).
    pub fn delete(target: &str) -> Self {
        Self::new("DELETE", target)
    }

    /// Replace the query string.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Set the correlation id used for logging and the response.
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}
