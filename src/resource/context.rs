//! Request context and query parameters for dispatch.
//!
//! A [`RequestContext`] is built once per request from the raw query
//! parameters and is immutable afterwards. It carries the requested
//! representation, pagination window and the full parameter multimap so that
//! generic search and search handlers can read their own criteria.

use crate::dispatcher::builder::DispatcherConfig;
use crate::error::{DispatchError, DispatchResult};
use crate::representation::Representation;
use indexmap::IndexMap;
use uuid::Uuid;

/// Names of reserved transport parameters.
///
/// These never count as search criteria when deciding between list and search.
pub mod params {
    /// Representation (`ref`, `default`, `full`, `custom:...`)
    pub const REPRESENTATION: &str = "v";
    /// Page size
    pub const LIMIT: &str = "limit";
    /// Zero-based offset of the first result
    pub const START_INDEX: &str = "startIndex";
    /// Include voided/retired entities
    pub const INCLUDE_ALL: &str = "includeAll";
    /// Ask paged handlers to report a total
    pub const TOTAL_COUNT: &str = "totalCount";
    /// Explicit search handler id
    pub const SEARCH_ID: &str = "s";
    /// Hard delete flag on DELETE
    pub const PURGE: &str = "purge";
    /// Audit reason on DELETE
    pub const REASON: &str = "reason";

    pub const SPECIAL: [&str; 8] = [
        REPRESENTATION,
        LIMIT,
        START_INDEX,
        INCLUDE_ALL,
        TOTAL_COUNT,
        SEARCH_ID,
        PURGE,
        REASON,
    ];

    /// Check whether a parameter name is reserved by the transport.
    pub fn is_special(name: &str) -> bool {
        SPECIAL.contains(&name)
    }
}

/// Insertion-ordered, multi-valued query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterMap {
    entries: IndexMap<String, Vec<String>>,
}

impl ParameterMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode an `application/x-www-form-urlencoded` query string.
    pub fn from_query(query: &str) -> Self {
        url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
            .into_owned()
            .collect()
    }

    /// Append a value, keeping earlier values for the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries
            .entry(name.into())
            .or_default()
            .push(value.into());
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// First value for a name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// All values for a name, in the order they were supplied.
    pub fn get_all(&self, name: &str) -> &[String] {
        self.entries.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Names that are not reserved transport parameters.
    pub fn search_names(&self) -> impl Iterator<Item = &str> {
        self.names().filter(|name| !params::is_special(name))
    }

    pub fn has_search_parameters(&self) -> bool {
        self.search_names().next().is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .flat_map(|(name, values)| values.iter().map(move |v| (name.as_str(), v.as_str())))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Encode back into a query string, skipping the `excluded` names.
    pub fn to_query_without(&self, excluded: &[&str]) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (name, value) in self.iter().filter(|(name, _)| !excluded.contains(name)) {
            serializer.append_pair(name, value);
        }
        serializer.finish()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ParameterMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (name, value) in iter {
            map.insert(name, value);
        }
        map
    }
}

/// Request context for dispatch operations.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Unique identifier for this request
    pub request_id: String,
    representation: Representation,
    limit: usize,
    offset: usize,
    include_all: bool,
    total_count: bool,
    parameters: ParameterMap,
}

impl RequestContext {
    /// Create a context with the given request id and default paging.
    pub fn new(request_id: String) -> Self {
        let config = DispatcherConfig::default();
        Self {
            request_id,
            representation: Representation::Ref,
            limit: config.default_limit,
            offset: 0,
            include_all: false,
            total_count: false,
            parameters: ParameterMap::new(),
        }
    }

    /// Create a context with a generated request id.
    pub fn with_generated_id() -> Self {
        Self::new(Uuid::new_v4().to_string())
    }

    /// Build a context from raw query parameters.
    ///
    /// The representation falls back to REF when no `v` parameter is present.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::BadRequest`] for malformed representation,
    /// pagination or boolean flag values.
    pub fn from_parameters(
        parameters: ParameterMap,
        config: &DispatcherConfig,
    ) -> DispatchResult<Self> {
        Self::from_parameters_with_default(parameters, config, Representation::Ref)
    }

    /// Build a context from raw query parameters with an explicit fallback representation.
    pub fn from_parameters_with_default(
        parameters: ParameterMap,
        config: &DispatcherConfig,
        default_representation: Representation,
    ) -> DispatchResult<Self> {
        let representation = match parameters.get(params::REPRESENTATION) {
            Some(value) => value.parse()?,
            None => default_representation,
        };

        let limit = match parameters.get(params::LIMIT) {
            Some(value) => {
                let limit = parse_count(params::LIMIT, value)?;
                if limit == 0 {
                    return Err(DispatchError::bad_request("limit must be at least 1"));
                }
                limit.min(config.max_limit)
            }
            None => config.default_limit.min(config.max_limit),
        };

        let offset = match parameters.get(params::START_INDEX) {
            Some(value) => parse_count(params::START_INDEX, value)?,
            None => 0,
        };

        let include_all = parse_flag(&parameters, params::INCLUDE_ALL)?;
        let total_count = parse_flag(&parameters, params::TOTAL_COUNT)?;

        Ok(Self {
            request_id: Uuid::new_v4().to_string(),
            representation,
            limit,
            offset,
            include_all,
            total_count,
            parameters,
        })
    }

    /// Replace the generated request id, e.g. with one supplied by the transport.
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }

    pub fn with_representation(mut self, representation: Representation) -> Self {
        self.representation = representation;
        self
    }

    pub fn with_paging(mut self, offset: usize, limit: usize) -> Self {
        self.offset = offset;
        self.limit = limit.max(1);
        self
    }

    pub fn with_parameters(mut self, parameters: ParameterMap) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn representation(&self) -> &Representation {
        &self.representation
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Whether voided or retired entities were requested.
    pub fn include_all(&self) -> bool {
        self.include_all
    }

    /// Whether the client asked for the total number of results.
    pub fn total_count(&self) -> bool {
        self.total_count
    }

    pub fn parameters(&self) -> &ParameterMap {
        &self.parameters
    }

    /// First value of a parameter.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name)
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::with_generated_id()
    }
}

fn parse_count(name: &str, value: &str) -> DispatchResult<usize> {
    value.trim().parse::<usize>().map_err(|_| {
        DispatchError::bad_request(format!(
            "'{}' must be a non-negative integer, got '{}'",
            name, value
        ))
    })
}

fn parse_flag(parameters: &ParameterMap, name: &str) -> DispatchResult<bool> {
    match parameters.get(name) {
        None => Ok(false),
        Some(value) => parse_bool(name, value),
    }
}

/// Parse a boolean flag; an empty value counts as `true` (`?purge`).
pub(crate) fn parse_bool(name: &str, value: &str) -> DispatchResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(DispatchError::bad_request(format!(
            "'{}' must be true or false, got '{}'",
            name, value
        ))),
    }
}
