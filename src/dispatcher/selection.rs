//! Operation selection.
//!
//! The routing rules are a pure function of the request shape so each row of
//! the decision table can be tested on its own:
//!
//! | method | id | condition | operation |
//! |---|---|---|---|
//! | GET | yes | | retrieve |
//! | POST | yes | | update |
//! | POST | no | | create |
//! | DELETE | yes | no purge flag | delete |
//! | DELETE | yes | purge flag | purge |
//! | GET | no | a search handler matches | search handler |
//! | GET | no | non-special parameters present | generic search |
//! | GET | no | otherwise | list |

use crate::error::{DispatchError, DispatchResult};
use crate::resource::context::{ParameterMap, params, parse_bool};
use crate::resource::{Capability, Operation, ResourceHandler};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// HTTP methods the dispatcher routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RestMethod {
    Get,
    Post,
    Delete,
}

impl FromStr for RestMethod {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "DELETE" => Ok(Self::Delete),
            other => Err(DispatchError::bad_request(format!(
                "method '{}' is not supported",
                other
            ))),
        }
    }
}

impl fmt::Display for RestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// Everything operation selection depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionInput {
    pub method: RestMethod,
    pub has_id: bool,
    /// DELETE carried a purge flag
    pub purge: bool,
    /// A registered search handler matched the request parameters
    pub search_handler_matched: bool,
    /// At least one non-special query parameter is present
    pub has_search_parameters: bool,
}

/// Map a request shape onto an operation.
///
/// Precedence for collection GETs is strict: search handler, then generic
/// search, then list.
///
/// # Errors
///
/// Returns [`DispatchError::BadRequest`] for a DELETE without an identifier.
pub fn select_operation(input: &SelectionInput) -> DispatchResult<Operation> {
    match (input.method, input.has_id) {
        (RestMethod::Get, true) => Ok(Operation::Retrieve),
        (RestMethod::Post, true) => Ok(Operation::Update),
        (RestMethod::Post, false) => Ok(Operation::Create),
        (RestMethod::Delete, true) if input.purge => Ok(Operation::Purge),
        (RestMethod::Delete, true) => Ok(Operation::Delete),
        (RestMethod::Delete, false) => Err(DispatchError::bad_request(
            "DELETE requires an entity identifier",
        )),
        (RestMethod::Get, false) if input.search_handler_matched => Ok(Operation::HandlerSearch),
        (RestMethod::Get, false) if input.has_search_parameters => Ok(Operation::Search),
        (RestMethod::Get, false) => Ok(Operation::List),
    }
}

/// Whether a DELETE asked for a hard purge.
///
/// `?purge` and `?purge=true` request it, `?purge=false` does not.
pub fn purge_requested(parameters: &ParameterMap) -> DispatchResult<bool> {
    match parameters.get(params::PURGE) {
        Some(value) => parse_bool(params::PURGE, value),
        None => Ok(false),
    }
}

/// Fail unless the handler offers the capability the operation needs.
pub fn ensure_capability(
    resource: &str,
    handler: &dyn ResourceHandler,
    operation: Operation,
) -> DispatchResult<()> {
    match operation.required_capability() {
        Some(capability) if !handler.supports(capability) => {
            Err(DispatchError::unsupported(resource, capability))
        }
        _ => Ok(()),
    }
}

/// Convenience for callers that want the capability a method/path pair needs.
pub fn capability_for(input: &SelectionInput) -> DispatchResult<Option<Capability>> {
    Ok(select_operation(input)?.required_capability())
}
