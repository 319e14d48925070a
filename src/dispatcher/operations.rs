//! Dispatcher operations.
//!
//! Each public operation resolves the handler, checks the capability it
//! needs and invokes it. Handler failures are wrapped with the resource and
//! operation but otherwise passed through untouched; nothing is retried.

use super::core::{Dispatcher, Outcome};
use crate::error::{DispatchError, DispatchResult, HandlerError};
use crate::registry::{RegisteredSearchHandler, ResourceRegistry};
use crate::resource::context::params;
use crate::resource::{Capability, Operation, RequestContext};
use log::debug;
use serde_json::Value;

impl Dispatcher {
    /// Retrieve one entity.
    pub async fn retrieve(
        &self,
        resource: &str,
        id: &str,
        context: &RequestContext,
    ) -> DispatchResult<Outcome> {
        let registry = self.registry.snapshot();
        self.retrieve_in(&registry, resource, id, context).await
    }

    /// Create an entity from a structured payload.
    pub async fn create(
        &self,
        resource: &str,
        body: Value,
        context: &RequestContext,
    ) -> DispatchResult<Outcome> {
        let registry = self.registry.snapshot();
        self.create_in(&registry, resource, body, context).await
    }

    /// Update an entity; the handler's returned representation is discarded.
    pub async fn update(
        &self,
        resource: &str,
        id: &str,
        body: Value,
        context: &RequestContext,
    ) -> DispatchResult<Outcome> {
        let registry = self.registry.snapshot();
        self.update_in(&registry, resource, id, body, context).await
    }

    /// Soft delete an entity.
    ///
    /// A missing or blank `reason` is replaced by the configured default.
    pub async fn delete(
        &self,
        resource: &str,
        id: &str,
        reason: Option<&str>,
        context: &RequestContext,
    ) -> DispatchResult<Outcome> {
        let registry = self.registry.snapshot();
        self.delete_in(&registry, resource, id, reason, context)
            .await
    }

    /// Permanently remove an entity.
    pub async fn purge(
        &self,
        resource: &str,
        id: &str,
        context: &RequestContext,
    ) -> DispatchResult<Outcome> {
        let registry = self.registry.snapshot();
        self.purge_in(&registry, resource, id, context).await
    }

    /// Serve a collection GET from the context's query parameters.
    ///
    /// A matching search handler wins over the handler's generic search,
    /// which wins over listing. A resource lacking the capability the
    /// request shape needs fails; there is no fall-through.
    pub async fn list_or_search(
        &self,
        resource: &str,
        context: &RequestContext,
    ) -> DispatchResult<Outcome> {
        let registry = self.registry.snapshot();
        self.list_or_search_in(&registry, resource, context).await
    }

    pub(super) async fn retrieve_in(
        &self,
        registry: &ResourceRegistry,
        resource: &str,
        id: &str,
        context: &RequestContext,
    ) -> DispatchResult<Outcome> {
        let handler = registry
            .lookup(resource)?
            .as_retrievable()
            .ok_or_else(|| DispatchError::unsupported(resource, Capability::Retrievable))?;

        let entity = handler
            .retrieve(id, context)
            .await
            .map_err(failed(resource, Operation::Retrieve))?;
        Ok(Outcome::Entity(entity))
    }

    pub(super) async fn create_in(
        &self,
        registry: &ResourceRegistry,
        resource: &str,
        body: Value,
        context: &RequestContext,
    ) -> DispatchResult<Outcome> {
        let handler = registry
            .lookup(resource)?
            .as_creatable()
            .ok_or_else(|| DispatchError::unsupported(resource, Capability::Creatable))?;

        let created = handler
            .create(body, context)
            .await
            .map_err(failed(resource, Operation::Create))?;
        Ok(Outcome::Created(created))
    }

    pub(super) async fn update_in(
        &self,
        registry: &ResourceRegistry,
        resource: &str,
        id: &str,
        body: Value,
        context: &RequestContext,
    ) -> DispatchResult<Outcome> {
        let handler = registry
            .lookup(resource)?
            .as_updatable()
            .ok_or_else(|| DispatchError::unsupported(resource, Capability::Updatable))?;

        handler
            .update(id, body, context)
            .await
            .map_err(failed(resource, Operation::Update))?;
        Ok(Outcome::NoContent)
    }

    pub(super) async fn delete_in(
        &self,
        registry: &ResourceRegistry,
        resource: &str,
        id: &str,
        reason: Option<&str>,
        context: &RequestContext,
    ) -> DispatchResult<Outcome> {
        let handler = registry
            .lookup(resource)?
            .as_deletable()
            .ok_or_else(|| DispatchError::unsupported(resource, Capability::Deletable))?;

        let reason = reason
            .map(str::trim)
            .filter(|reason| !reason.is_empty())
            .unwrap_or(self.config.default_delete_reason.as_str());
        debug!("Deleting {}/{} with reason '{}'", resource, id, reason);

        handler
            .delete(id, reason, context)
            .await
            .map_err(failed(resource, Operation::Delete))?;
        Ok(Outcome::NoContent)
    }

    pub(super) async fn purge_in(
        &self,
        registry: &ResourceRegistry,
        resource: &str,
        id: &str,
        context: &RequestContext,
    ) -> DispatchResult<Outcome> {
        let handler = registry
            .lookup(resource)?
            .as_purgeable()
            .ok_or_else(|| DispatchError::unsupported(resource, Capability::Purgeable))?;

        handler
            .purge(id, context)
            .await
            .map_err(failed(resource, Operation::Purge))?;
        Ok(Outcome::NoContent)
    }

    pub(super) async fn list_or_search_in(
        &self,
        registry: &ResourceRegistry,
        resource: &str,
        context: &RequestContext,
    ) -> DispatchResult<Outcome> {
        let handler = registry.lookup(resource)?;

        if let Some(search) = self.resolve_search_handler(registry, resource, context)? {
            debug!("Using search handler '{}' for '{}'", search.id(), resource);
            let page = search
                .handler()
                .search(context)
                .await
                .map_err(failed(resource, Operation::HandlerSearch))?;
            return Ok(Outcome::Page(page));
        }

        if context.parameters().has_search_parameters() {
            let searchable = handler
                .as_searchable()
                .ok_or_else(|| DispatchError::unsupported(resource, Capability::Searchable))?;
            let page = searchable
                .search(context)
                .await
                .map_err(failed(resource, Operation::Search))?;
            return Ok(Outcome::Page(page));
        }

        let listable = handler
            .as_listable()
            .ok_or_else(|| DispatchError::unsupported(resource, Capability::Listable))?;
        let page = listable
            .get_all(context)
            .await
            .map_err(failed(resource, Operation::List))?;
        Ok(Outcome::Page(page))
    }

    /// Pick the search handler serving a collection GET, if any.
    ///
    /// An explicit `s` parameter names the handler; otherwise the most
    /// specific handler whose required parameters are present is used.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::BadRequest`] when `s` names an unknown handler
    /// or the request lacks parameters that handler requires.
    pub(super) fn resolve_search_handler<'r>(
        &self,
        registry: &'r ResourceRegistry,
        resource: &str,
        context: &RequestContext,
    ) -> DispatchResult<Option<&'r RegisteredSearchHandler>> {
        let parameters = context.parameters();

        let Some(search_id) = parameters.get(params::SEARCH_ID) else {
            return Ok(registry.find_search_handler(resource, parameters.names()));
        };

        let search = registry
            .search_handler_by_id(resource, search_id)
            .ok_or_else(|| {
                DispatchError::bad_request(format!(
                    "unknown search handler '{}' for '{}'",
                    search_id, resource
                ))
            })?;

        let missing: Vec<&str> = search
            .config()
            .required()
            .iter()
            .map(String::as_str)
            .filter(|name| !parameters.contains(name))
            .collect();
        if !missing.is_empty() {
            return Err(DispatchError::bad_request(format!(
                "search handler '{}' requires parameters: {}",
                search_id,
                missing.join(", ")
            )));
        }

        Ok(Some(search))
    }
}

fn failed(resource: &str, operation: Operation) -> impl FnOnce(HandlerError) -> DispatchError + '_ {
    move |source| DispatchError::handler(resource, operation, source)
}
