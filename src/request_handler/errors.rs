//! Error response creation for the request handler.

use crate::error::DispatchError;
use crate::request_handler::core::RestResponse;
use serde_json::json;

/// Create an error response from a DispatchError.
///
/// The body has the shape `{"error": {"code", "message", "resource"?}}`.
pub fn create_error_response(error: DispatchError, request_id: String) -> RestResponse {
    let mut detail = json!({
        "code": error.error_code(),
        "message": error.to_string(),
    });
    if let Some(resource) = error.resource() {
        detail["resource"] = json!(resource);
    }

    RestResponse {
        status: error.status_code(),
        body: Some(json!({ "error": detail })),
        location: None,
        request_id,
    }
}
