//! Capability traits implemented by resource handlers.
//!
//! A resource handler implements any non-empty subset of the seven
//! capabilities below. Instead of runtime downcasting, [`ResourceHandler`]
//! exposes one typed accessor per capability; the default implementation of
//! each returns `None`, so a handler only overrides the accessors for what it
//! actually supports.
//!
//! ```rust
//! use async_trait::async_trait;
//! use rest_dispatcher::resource::{Listable, PageResult, ResourceHandler};
//! use rest_dispatcher::{Capability, HandlerResult, RequestContext};
//!
//! struct Locations;
//!
//! #[async_trait]
//! impl Listable for Locations {
//!     async fn get_all(&self, context: &RequestContext) -> HandlerResult<PageResult> {
//!         Ok(PageResult::paginate(Vec::new(), context))
//!     }
//! }
//!
//! impl ResourceHandler for Locations {
//!     fn as_listable(&self) -> Option<&dyn Listable> {
//!         Some(self)
//!     }
//! }
//!
//! assert!(Locations.supports(Capability::Listable));
//! assert!(!Locations.supports(Capability::Searchable));
//! ```

use crate::error::HandlerResult;
use crate::resource::context::RequestContext;
use crate::resource::page::PageResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// One of the behaviours a resource handler may offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Capability {
    Retrievable,
    Creatable,
    Updatable,
    Deletable,
    Purgeable,
    Listable,
    Searchable,
}

impl Capability {
    pub const ALL: [Capability; 7] = [
        Capability::Retrievable,
        Capability::Creatable,
        Capability::Updatable,
        Capability::Deletable,
        Capability::Purgeable,
        Capability::Listable,
        Capability::Searchable,
    ];
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// The operation a dispatch resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    Retrieve,
    Create,
    Update,
    Delete,
    Purge,
    List,
    /// Generic search through the handler's [`Searchable`] capability
    Search,
    /// Search through a dynamically registered search handler
    HandlerSearch,
}

impl Operation {
    /// Capability the resolved handler must offer, if any.
    ///
    /// Searches served by a registered search handler do not consult the
    /// resource handler's capabilities.
    pub fn required_capability(&self) -> Option<Capability> {
        match self {
            Self::Retrieve => Some(Capability::Retrievable),
            Self::Create => Some(Capability::Creatable),
            Self::Update => Some(Capability::Updatable),
            Self::Delete => Some(Capability::Deletable),
            Self::Purge => Some(Capability::Purgeable),
            Self::List => Some(Capability::Listable),
            Self::Search => Some(Capability::Searchable),
            Self::HandlerSearch => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Retrieve => "retrieve",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Purge => "purge",
            Self::List => "list",
            Self::Search => "search",
            Self::HandlerSearch => "search handler",
        };
        f.write_str(name)
    }
}

/// Fetch a single entity by identifier.
#[async_trait]
pub trait Retrievable: Send + Sync {
    async fn retrieve(&self, id: &str, context: &RequestContext) -> HandlerResult<Value>;
}

/// Create a new entity from a structured payload.
#[async_trait]
pub trait Creatable: Send + Sync {
    /// Returns the representation of the created entity.
    async fn create(&self, body: Value, context: &RequestContext) -> HandlerResult<Value>;
}

/// Update an existing entity.
#[async_trait]
pub trait Updatable: Send + Sync {
    /// The returned value is discarded by the dispatcher, which answers with no content.
    async fn update(&self, id: &str, body: Value, context: &RequestContext)
    -> HandlerResult<Value>;
}

/// Soft delete (void or retire) an entity.
#[async_trait]
pub trait Deletable: Send + Sync {
    /// `reason` is a free-text audit string.
    async fn delete(&self, id: &str, reason: &str, context: &RequestContext) -> HandlerResult<()>;
}

/// Permanently remove an entity.
#[async_trait]
pub trait Purgeable: Send + Sync {
    async fn purge(&self, id: &str, context: &RequestContext) -> HandlerResult<()>;
}

/// Return every entity, paged according to the context.
#[async_trait]
pub trait Listable: Send + Sync {
    async fn get_all(&self, context: &RequestContext) -> HandlerResult<PageResult>;
}

/// Generic search driven by the request's non-special parameters.
#[async_trait]
pub trait Searchable: Send + Sync {
    async fn search(&self, context: &RequestContext) -> HandlerResult<PageResult>;
}

/// A resource handler registered under a resource name.
///
/// Override the accessor of each capability the handler implements.
pub trait ResourceHandler: Send + Sync {
    fn as_retrievable(&self) -> Option<&dyn Retrievable> {
        None
    }

    fn as_creatable(&self) -> Option<&dyn Creatable> {
        None
    }

    fn as_updatable(&self) -> Option<&dyn Updatable> {
        None
    }

    fn as_deletable(&self) -> Option<&dyn Deletable> {
        None
    }

    fn as_purgeable(&self) -> Option<&dyn Purgeable> {
        None
    }

    fn as_listable(&self) -> Option<&dyn Listable> {
        None
    }

    fn as_searchable(&self) -> Option<&dyn Searchable> {
        None
    }

    /// Check whether the handler offers a capability.
    fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::Retrievable => self.as_retrievable().is_some(),
            Capability::Creatable => self.as_creatable().is_some(),
            Capability::Updatable => self.as_updatable().is_some(),
            Capability::Deletable => self.as_deletable().is_some(),
            Capability::Purgeable => self.as_purgeable().is_some(),
            Capability::Listable => self.as_listable().is_some(),
            Capability::Searchable => self.as_searchable().is_some(),
        }
    }

    /// All capabilities the handler offers, in declaration order.
    fn capabilities(&self) -> Vec<Capability> {
        Capability::ALL
            .into_iter()
            .filter(|capability| self.supports(*capability))
            .collect()
    }
}
