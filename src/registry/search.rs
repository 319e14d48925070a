//! Specialized search handlers keyed by resource name and parameter set.
//!
//! A search handler declares the query parameters it requires. When a
//! collection GET arrives, every handler registered for the resource whose
//! required parameters are all present is a candidate; the most specific
//! candidate (largest required set) wins. Equal-sized candidates are ordered by
//! their sorted parameter names so the choice never depends on registration
//! order or hash iteration.

use crate::error::{DispatchError, DispatchResult, HandlerResult};
use crate::resource::context::params;
use crate::resource::{PageResult, RequestContext};
use async_trait::async_trait;
use std::cmp::Reverse;
use std::collections::BTreeSet;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// A search strategy bound to a set of recognized query parameters.
#[async_trait]
pub trait SearchHandler: Send + Sync {
    async fn search(&self, context: &RequestContext) -> HandlerResult<PageResult>;
}

/// Adapter turning an async closure into a [`SearchHandler`].
pub struct FnSearchHandler<F> {
    search: F,
}

/// Wrap an async closure as a search handler.
///
/// The closure receives its own copy of the request context.
pub fn search_fn<F, Fut>(search: F) -> FnSearchHandler<F>
where
    F: Fn(RequestContext) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult<PageResult>> + Send,
{
    FnSearchHandler { search }
}

#[async_trait]
impl<F, Fut> SearchHandler for FnSearchHandler<F>
where
    F: Fn(RequestContext) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult<PageResult>> + Send,
{
    async fn search(&self, context: &RequestContext) -> HandlerResult<PageResult> {
        (self.search)(context.clone()).await
    }
}

/// Registration metadata of a search handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHandlerConfig {
    id: String,
    required: BTreeSet<String>,
    optional: BTreeSet<String>,
    description: Option<String>,
}

impl SearchHandlerConfig {
    /// Create a config with an id (unique per resource) and its required parameters.
    pub fn new<I, S>(id: impl Into<String>, required: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            required: required.into_iter().map(Into::into).collect(),
            optional: BTreeSet::new(),
            description: None,
        }
    }

    /// Parameters the handler understands but does not need to match.
    pub fn with_optional<I, S>(mut self, optional: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.optional.extend(optional.into_iter().map(Into::into));
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn required(&self) -> &BTreeSet<String> {
        &self.required
    }

    pub fn optional(&self) -> &BTreeSet<String> {
        &self.optional
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Whether every required parameter is among `present`.
    fn matches(&self, present: &BTreeSet<&str>) -> bool {
        !self.required.is_empty()
            && self
                .required
                .iter()
                .all(|name| present.contains(name.as_str()))
    }
}

/// A search handler together with its registration metadata.
#[derive(Clone)]
pub struct RegisteredSearchHandler {
    config: SearchHandlerConfig,
    handler: Arc<dyn SearchHandler>,
}

impl RegisteredSearchHandler {
    pub fn config(&self) -> &SearchHandlerConfig {
        &self.config
    }

    pub fn id(&self) -> &str {
        &self.config.id
    }

    pub fn handler(&self) -> &dyn SearchHandler {
        self.handler.as_ref()
    }
}

impl fmt::Debug for RegisteredSearchHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredSearchHandler")
            .field("config", &self.config)
            .finish()
    }
}

/// The search handlers registered for one resource.
#[derive(Debug, Clone, Default)]
pub(crate) struct SearchHandlerSet {
    handlers: Vec<RegisteredSearchHandler>,
}

impl SearchHandlerSet {
    pub(crate) fn insert(
        &mut self,
        resource: &str,
        config: SearchHandlerConfig,
        handler: Arc<dyn SearchHandler>,
    ) -> DispatchResult<()> {
        if config.id.trim().is_empty() {
            return Err(DispatchError::configuration(format!(
                "search handler for '{}' must have a non-empty id",
                resource
            )));
        }

        if config.required.is_empty() {
            return Err(DispatchError::configuration(format!(
                "search handler '{}' for '{}' must require at least one parameter",
                config.id, resource
            )));
        }

        if let Some(reserved) = config.required.iter().find(|name| params::is_special(name)) {
            return Err(DispatchError::configuration(format!(
                "search handler '{}' for '{}' cannot require reserved parameter '{}'",
                config.id, resource, reserved
            )));
        }

        for existing in &self.handlers {
            if existing.config.id == config.id {
                return Err(DispatchError::configuration(format!(
                    "search handler id '{}' is already registered for '{}'",
                    config.id, resource
                )));
            }
            if existing.config.required == config.required {
                return Err(DispatchError::configuration(format!(
                    "search handlers '{}' and '{}' for '{}' both require {:?}",
                    existing.config.id, config.id, resource, config.required
                )));
            }
        }

        self.handlers
            .push(RegisteredSearchHandler { config, handler });
        Ok(())
    }

    /// Most specific handler whose required parameters are all present.
    ///
    /// Reserved transport parameters in `present` are ignored.
    pub(crate) fn find<'a, I>(&self, present: I) -> Option<&RegisteredSearchHandler>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let present: BTreeSet<&str> = present
            .into_iter()
            .filter(|name| !params::is_special(name))
            .collect();

        self.handlers
            .iter()
            .filter(|candidate| candidate.config.matches(&present))
            .min_by(|a, b| {
                Reverse(a.config.required.len())
                    .cmp(&Reverse(b.config.required.len()))
                    .then_with(|| a.config.required.cmp(&b.config.required))
            })
    }

    pub(crate) fn find_by_id(&self, id: &str) -> Option<&RegisteredSearchHandler> {
        self.handlers.iter().find(|candidate| candidate.config.id == id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &RegisteredSearchHandler> {
        self.handlers.iter()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.handlers.len()
    }
}
