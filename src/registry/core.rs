//! Core registry structure and lookups.

use super::search::{RegisteredSearchHandler, SearchHandlerSet};
use crate::error::{DispatchError, DispatchResult};
use crate::resource::{Capability, ResourceHandler};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Maps resource names to their handlers and specialized search handlers.
///
/// The registry is populated once during bootstrap and then shared read-only.
/// Cloning is cheap: handlers are reference counted, so a clone only copies
/// the maps. [`SharedRegistry`](super::SharedRegistry) relies on this to
/// publish modified copies.
///
/// # Examples
///
/// ```rust
/// use rest_dispatcher::registry::ResourceRegistry;
/// use rest_dispatcher::providers::InMemoryResource;
/// use std::sync::Arc;
///
/// # fn main() -> Result<(), rest_dispatcher::DispatchError> {
/// let mut registry = ResourceRegistry::new();
/// registry.register("location", Arc::new(InMemoryResource::new("location")))?;
///
/// assert!(registry.lookup("location").is_ok());
/// assert!(registry.register("location", Arc::new(InMemoryResource::new("location"))).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Default)]
pub struct ResourceRegistry {
    pub(super) handlers: HashMap<String, Arc<dyn ResourceHandler>>, // resource -> handler
    pub(super) search_handlers: HashMap<String, SearchHandlerSet>,  // resource -> search handlers
}

impl ResourceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a resource name to its handler.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnknownResource`] if nothing is registered under `resource`.
    pub fn lookup(&self, resource: &str) -> DispatchResult<&dyn ResourceHandler> {
        self.handlers
            .get(resource)
            .map(|handler| handler.as_ref())
            .ok_or_else(|| DispatchError::unknown_resource(resource))
    }

    /// Find the search handler for `resource` matching the present parameter names.
    ///
    /// Reserved transport parameters are ignored. When several handlers
    /// match, the one requiring the most parameters wins; equal sizes are
    /// ordered by their sorted parameter names.
    pub fn find_search_handler<'a, I>(
        &self,
        resource: &str,
        present: I,
    ) -> Option<&RegisteredSearchHandler>
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.search_handlers
            .get(resource)
            .and_then(|set| set.find(present))
    }

    /// Find a search handler for `resource` by its id.
    pub fn search_handler_by_id(&self, resource: &str, id: &str) -> Option<&RegisteredSearchHandler> {
        self.search_handlers
            .get(resource)
            .and_then(|set| set.find_by_id(id))
    }

    /// Whether any search handler is registered for `resource`.
    pub fn has_search_handlers(&self, resource: &str) -> bool {
        self.search_handlers
            .get(resource)
            .is_some_and(|set| !set.is_empty())
    }

    /// Search handlers registered for `resource`, in registration order.
    pub fn search_handlers(&self, resource: &str) -> Vec<&RegisteredSearchHandler> {
        self.search_handlers
            .get(resource)
            .map(|set| set.iter().collect())
            .unwrap_or_default()
    }

    /// All registered resource names, sorted.
    pub fn resource_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Capabilities offered by the handler registered under `resource`.
    pub fn capabilities(&self, resource: &str) -> DispatchResult<Vec<Capability>> {
        Ok(self.lookup(resource)?.capabilities())
    }

    pub fn contains(&self, resource: &str) -> bool {
        self.handlers.contains_key(resource)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for ResourceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let search: HashMap<&str, usize> = self
            .search_handlers
            .iter()
            .map(|(name, set)| (name.as_str(), set.len()))
            .collect();
        f.debug_struct("ResourceRegistry")
            .field("resources", &self.resource_names())
            .field("search_handlers", &search)
            .finish()
    }
}
