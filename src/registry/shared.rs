//! Copy-on-write registry for re-registration while serving traffic.
//!
//! Readers pin an `Arc<ResourceRegistry>` snapshot for the duration of one
//! dispatch; loads are lock-free. Writers clone the current snapshot, apply
//! their change, validate it and publish with compare-and-swap, retrying from
//! the latest snapshot if another writer won. A dispatch therefore sees either
//! the registry before a change or after it, never a partial update.

use super::core::ResourceRegistry;
use crate::error::DispatchResult;
use arc_swap::ArcSwap;
use log::debug;
use std::fmt;
use std::sync::Arc;

/// Atomically replaceable [`ResourceRegistry`].
pub struct SharedRegistry {
    snap: ArcSwap<ResourceRegistry>,
}

impl SharedRegistry {
    /// Publish a bootstrapped registry.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Configuration`](crate::DispatchError::Configuration)
    /// if the registry fails [`ResourceRegistry::validate`].
    pub fn new(registry: ResourceRegistry) -> DispatchResult<Self> {
        registry.validate()?;
        Ok(Self {
            snap: ArcSwap::from_pointee(registry),
        })
    }

    /// The currently published registry.
    pub fn snapshot(&self) -> Arc<ResourceRegistry> {
        self.snap.load_full()
    }

    /// Apply a change and publish the result.
    ///
    /// `change` runs against a private copy and may run more than once when
    /// writers race. Nothing is published if it fails or if the result does
    /// not validate.
    pub fn update<F>(&self, mut change: F) -> DispatchResult<()>
    where
        F: FnMut(&mut ResourceRegistry) -> DispatchResult<()>,
    {
        loop {
            let current = self.snap.load_full();
            let mut next = ResourceRegistry::clone(&current);
            change(&mut next)?;
            next.validate()?;

            let next = Arc::new(next);
            let previous = self.snap.compare_and_swap(&current, next);
            if Arc::ptr_eq(&*previous, &current) {
                debug!("Published registry with {} resources", self.snapshot().len());
                return Ok(());
            }
            debug!("Registry changed concurrently, retrying update");
        }
    }
}

impl fmt::Debug for SharedRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedRegistry")
            .field("snapshot", &self.snapshot())
            .finish()
    }
}

impl TryFrom<ResourceRegistry> for SharedRegistry {
    type Error = crate::error::DispatchError;

    fn try_from(registry: ResourceRegistry) -> Result<Self, Self::Error> {
        Self::new(registry)
    }
}
