//! Builder pattern for configuring dispatcher instances.
//!
//! [`DispatcherConfig`] carries the pagination defaults, the default delete
//! reason and the URL settings used for location hints and paging links.
//! [`DispatcherBuilder`] collects the configuration and the resource
//! registrations, validating both before a dispatcher is created.

use crate::dispatcher::Dispatcher;
use crate::error::{DispatchError, DispatchResult};
use crate::registry::{ResourceRegistry, SearchHandler, SearchHandlerConfig, SharedRegistry};
use crate::resource::ResourceHandler;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Dispatcher configuration.
///
/// Deserializable so embedders can load it alongside their own settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DispatcherConfig {
    /// Base URL of the REST API, without version or resource segments.
    /// Example: "http://localhost:8080/openmrs/ws/rest"
    pub base_url: String,

    /// API version segment used in generated URLs. Defaults to "v1".
    pub api_version: String,

    /// Page size when the request has no `limit` parameter
    pub default_limit: usize,

    /// Upper bound applied to any requested `limit`
    pub max_limit: usize,

    /// Audit reason passed to soft deletes when the caller gives none
    pub default_delete_reason: String,
}

impl DispatcherConfig {
    pub const DEFAULT_LIMIT: usize = 50;
    pub const MAX_LIMIT: usize = 1000;
    pub const DEFAULT_DELETE_REASON: &'static str = "web service call";

    /// URL of a resource collection, or of one entity when `id` is given.
    pub fn resource_url(&self, resource: &str, id: Option<&str>) -> String {
        let base = self.base_url.trim_end_matches('/');
        match id {
            Some(id) => format!("{}/{}/{}/{}", base, self.api_version, resource, id),
            None => format!("{}/{}/{}", base, self.api_version, resource),
        }
    }

    /// Path prefix under which resources are addressed, e.g. `/ws/rest/v1`.
    pub fn path_prefix(&self) -> String {
        let without_scheme = self
            .base_url
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(&self.base_url);
        let path = without_scheme
            .find('/')
            .map(|index| &without_scheme[index..])
            .unwrap_or("");
        format!("{}/{}", path.trim_end_matches('/'), self.api_version)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> DispatchResult<()> {
        if self.base_url.is_empty() {
            return Err(DispatchError::configuration("Base URL cannot be empty"));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(DispatchError::configuration(
                "Base URL must start with http:// or https://",
            ));
        }

        if self.api_version.is_empty() {
            return Err(DispatchError::configuration("API version cannot be empty"));
        }

        if self.default_limit == 0 {
            return Err(DispatchError::configuration("Default limit must be at least 1"));
        }

        if self.default_limit > self.max_limit {
            return Err(DispatchError::configuration(format!(
                "Default limit {} exceeds maximum limit {}",
                self.default_limit, self.max_limit
            )));
        }

        Ok(())
    }
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/openmrs/ws/rest".to_string(),
            api_version: "v1".to_string(),
            default_limit: Self::DEFAULT_LIMIT,
            max_limit: Self::MAX_LIMIT,
            default_delete_reason: Self::DEFAULT_DELETE_REASON.to_string(),
        }
    }
}

/// Builder for configuring and creating dispatchers.
///
/// # Examples
///
/// ```rust
/// use rest_dispatcher::DispatcherBuilder;
/// use rest_dispatcher::providers::InMemoryResource;
/// use std::sync::Arc;
///
/// # fn main() -> Result<(), rest_dispatcher::DispatchError> {
/// let dispatcher = DispatcherBuilder::new()
///     .with_base_url("https://emr.example.org/ws/rest")
///     .with_default_limit(25)
///     .register("patient", Arc::new(InMemoryResource::new("patient")))?
///     .build()?;
///
/// assert_eq!(dispatcher.config().default_limit, 25);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct DispatcherBuilder {
    config: DispatcherConfig,
    registry: ResourceRegistry,
}

impl DispatcherBuilder {
    /// Start with the default configuration and an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an already populated registry.
    pub fn with_registry(mut self, registry: ResourceRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_config(mut self, config: DispatcherConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.config.api_version = version.into();
        self
    }

    pub fn with_default_limit(mut self, limit: usize) -> Self {
        self.config.default_limit = limit;
        self
    }

    pub fn with_max_limit(mut self, limit: usize) -> Self {
        self.config.max_limit = limit;
        self
    }

    pub fn with_default_delete_reason(mut self, reason: impl Into<String>) -> Self {
        self.config.default_delete_reason = reason.into();
        self
    }

    /// Register a resource handler.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Configuration`] on a duplicate or invalid name.
    pub fn register(
        mut self,
        resource: &str,
        handler: Arc<dyn ResourceHandler>,
    ) -> DispatchResult<Self> {
        self.registry.register(resource, handler)?;
        Ok(self)
    }

    /// Register a specialized search handler.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Configuration`] on an ambiguous parameter set.
    pub fn register_search_handler(
        mut self,
        resource: &str,
        config: SearchHandlerConfig,
        handler: Arc<dyn SearchHandler>,
    ) -> DispatchResult<Self> {
        self.registry
            .register_search_handler(resource, config, handler)?;
        Ok(self)
    }

    /// Build the dispatcher.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Configuration`] if the configuration or the
    /// registry is invalid; a misconfigured dispatcher is never created.
    pub fn build(self) -> DispatchResult<Dispatcher> {
        self.config.validate()?;
        let registry = SharedRegistry::new(self.registry)?;
        Ok(Dispatcher::with_config(Arc::new(registry), self.config))
    }
}
