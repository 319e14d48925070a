//! Resource and search handler registration.
//!
//! Every registration check runs here, at bootstrap, so that an ambiguous or
//! duplicate configuration is rejected before the dispatcher serves traffic.

use super::core::ResourceRegistry;
use super::search::{SearchHandler, SearchHandlerConfig};
use crate::error::{DispatchError, DispatchResult};
use crate::resource::ResourceHandler;
use log::{debug, warn};
use std::sync::Arc;

impl ResourceRegistry {
    /// Register a handler under a resource name.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Configuration`] if the name is invalid, already
    /// registered, or the handler offers no capability at all.
    pub fn register(
        &mut self,
        resource: &str,
        handler: Arc<dyn ResourceHandler>,
    ) -> DispatchResult<()> {
        validate_resource_name(resource)?;

        if self.handlers.contains_key(resource) {
            warn!("Rejected duplicate registration of resource '{}'", resource);
            return Err(DispatchError::configuration(format!(
                "resource '{}' is already registered",
                resource
            )));
        }

        let capabilities = handler.capabilities();
        if capabilities.is_empty() {
            return Err(DispatchError::configuration(format!(
                "handler for '{}' implements no capability",
                resource
            )));
        }

        debug!("Registered resource '{}' with {:?}", resource, capabilities);
        self.handlers.insert(resource.to_string(), handler);
        Ok(())
    }

    /// Register a specialized search handler for a resource.
    ///
    /// The resource itself may be registered before or after; [`validate`]
    /// checks that it exists once bootstrap is complete.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Configuration`] if another handler for the same
    /// resource already requires the identical parameter set or uses the same
    /// id, or if the required set is empty or names a reserved parameter.
    ///
    /// [`validate`]: Self::validate
    pub fn register_search_handler(
        &mut self,
        resource: &str,
        config: SearchHandlerConfig,
        handler: Arc<dyn SearchHandler>,
    ) -> DispatchResult<()> {
        validate_resource_name(resource)?;

        let id = config.id().to_string();
        let required = config.required().clone();
        let mut set = self.search_handlers.remove(resource).unwrap_or_default();
        let inserted = set.insert(resource, config, handler);
        if !set.is_empty() {
            self.search_handlers.insert(resource.to_string(), set);
        }
        inserted.inspect_err(|e| warn!("Rejected search handler for '{}': {}", resource, e))?;

        debug!(
            "Registered search handler '{}' for '{}' requiring {:?}",
            id, resource, required
        );
        Ok(())
    }

    /// Remove a resource and every search handler attached to it.
    ///
    /// Returns whether anything was registered under the name.
    pub fn unregister(&mut self, resource: &str) -> bool {
        let search = self.search_handlers.remove(resource).is_some();
        let handler = self.handlers.remove(resource).is_some();
        if handler || search {
            debug!("Unregistered resource '{}'", resource);
        }
        handler || search
    }

    /// Check cross-registration invariants.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Configuration`] if a search handler is attached
    /// to a resource that has no registered handler.
    pub fn validate(&self) -> DispatchResult<()> {
        let mut orphans: Vec<&str> = self
            .search_handlers
            .iter()
            .filter(|(resource, set)| !set.is_empty() && !self.handlers.contains_key(*resource))
            .map(|(resource, _)| resource.as_str())
            .collect();

        if orphans.is_empty() {
            return Ok(());
        }

        orphans.sort_unstable();
        Err(DispatchError::configuration(format!(
            "search handlers registered for unknown resources: {}",
            orphans.join(", ")
        )))
    }
}

fn validate_resource_name(resource: &str) -> DispatchResult<()> {
    if resource.is_empty() {
        return Err(DispatchError::configuration("resource name cannot be empty"));
    }
    if resource.contains('/') || resource.chars().any(char::is_whitespace) {
        return Err(DispatchError::configuration(format!(
            "resource name '{}' must be a single path segment",
            resource
        )));
    }
    Ok(())
}
