//! In-memory resource handler.
//!
//! [`InMemoryResource`] stores entities as JSON objects keyed by their
//! `uuid` and implements every capability. It is meant for tests,
//! development and as a template for real handlers.
//!
//! # Behaviour
//!
//! * Soft delete marks an entity `voided` and records `voidReason` and
//!   `dateVoided`; voided entities stay retrievable by id but are hidden from
//!   list and search unless `includeAll` is set
//! * Purge removes the entity; purging an unknown id is a no-op
//! * Search matches `q` case-insensitively against one configurable field,
//!   and any other non-special parameter against the field of the same name
//! * Entities are rendered according to the requested representation
//!
//! # Example Usage
//!
//! ```rust
//! use rest_dispatcher::providers::InMemoryResource;
//! use rest_dispatcher::resource::{Creatable, Listable};
//! use rest_dispatcher::RequestContext;
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), rest_dispatcher::HandlerError> {
//! let patients = InMemoryResource::new("patient");
//! let context = RequestContext::with_generated_id();
//!
//! patients.create(json!({"display": "John Doe"}), &context).await?;
//! let page = patients.get_all(&context).await?;
//! assert_eq!(page.len(), 1);
//! # Ok(())
//! # }
//! ```

use crate::error::{HandlerError, HandlerResult};
use crate::representation::Representation;
use crate::resource::{
    Creatable, Deletable, Listable, PageResult, Purgeable, RequestContext, ResourceHandler,
    Retrievable, Searchable, Updatable,
};
use async_trait::async_trait;
use chrono::Utc;
use indexmap::IndexMap;
use log::{debug, info};
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Property names with a fixed meaning in stored entities.
pub mod fields {
    pub const UUID: &str = "uuid";
    pub const DISPLAY: &str = "display";
    pub const VOIDED: &str = "voided";
    pub const VOID_REASON: &str = "voidReason";
    pub const DATE_VOIDED: &str = "dateVoided";
    pub const DATE_CREATED: &str = "dateCreated";
    pub const DATE_CHANGED: &str = "dateChanged";

    /// Audit properties shown only in the full representation.
    pub const AUDIT: [&str; 4] = [DATE_CREATED, DATE_CHANGED, VOID_REASON, DATE_VOIDED];

    /// Properties a client may not overwrite through create or update.
    pub const MANAGED: [&str; 6] = [UUID, VOIDED, VOID_REASON, DATE_VOIDED, DATE_CREATED, DATE_CHANGED];
}

/// Thread-safe in-memory handler for one resource.
///
/// Clones share the same underlying store.
#[derive(Debug, Clone)]
pub struct InMemoryResource {
    name: String,
    search_field: String,
    // Insertion-ordered so listings are stable across calls
    entities: Arc<RwLock<IndexMap<String, Value>>>,
}

impl InMemoryResource {
    /// Create an empty store for the named resource, searching on `display`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            search_field: fields::DISPLAY.to_string(),
            entities: Arc::new(RwLock::new(IndexMap::new())),
        }
    }

    /// Match the `q` parameter against a different property.
    pub fn with_search_field(mut self, field: impl Into<String>) -> Self {
        self.search_field = field.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of stored entities, voided ones included.
    pub async fn len(&self) -> usize {
        self.entities.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entities.read().await.is_empty()
    }

    /// The stored record, unrendered.
    pub async fn get_raw(&self, id: &str) -> Option<Value> {
        self.entities.read().await.get(id).cloned()
    }

    /// Remove every entity.
    pub async fn clear(&self) {
        self.entities.write().await.clear();
    }

    /// Project a stored entity onto the requested representation.
    pub fn render(entity: &Value, representation: &Representation) -> Value {
        let Some(object) = entity.as_object() else {
            return entity.clone();
        };

        let projected: Map<String, Value> = match representation {
            Representation::Ref => object
                .iter()
                .filter(|(key, _)| *key == fields::UUID || *key == fields::DISPLAY)
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
            Representation::Default => object
                .iter()
                .filter(|(key, _)| !fields::AUDIT.contains(&key.as_str()))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
            Representation::Full => object.clone(),
            Representation::Custom(_) => {
                let wanted = representation.custom_fields();
                object
                    .iter()
                    .filter(|(key, _)| wanted.contains(&key.as_str()))
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect()
            }
        };
        Value::Object(projected)
    }

    fn is_voided(entity: &Value) -> bool {
        entity
            .get(fields::VOIDED)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    fn visible<'a>(entity: &'a Value, context: &RequestContext) -> Option<&'a Value> {
        (context.include_all() || !Self::is_voided(entity)).then_some(entity)
    }

    fn matches(&self, entity: &Value, context: &RequestContext) -> bool {
        context.parameters().search_names().all(|name| {
            let Some(expected) = context.parameter(name) else {
                return true;
            };
            if name == "q" {
                let needle = expected.to_lowercase();
                return entity
                    .get(&self.search_field)
                    .and_then(Value::as_str)
                    .is_some_and(|value| value.to_lowercase().contains(&needle));
            }
            match entity.get(name) {
                Some(Value::String(value)) => value == expected,
                Some(other) => other.to_string() == expected,
                None => false,
            }
        })
    }

    async fn collect<F>(&self, context: &RequestContext, filter: F) -> PageResult
    where
        F: Fn(&Value) -> bool,
    {
        let entities = self.entities.read().await;
        let selected: Vec<Value> = entities
            .values()
            .filter_map(|entity| Self::visible(entity, context))
            .filter(|entity| filter(entity))
            .map(|entity| Self::render(entity, context.representation()))
            .collect();
        PageResult::paginate(selected, context)
    }
}

fn into_object(body: Value) -> HandlerResult<Map<String, Value>> {
    match body {
        Value::Object(object) => Ok(object),
        other => Err(HandlerError::invalid_request(format!(
            "expected a JSON object, got {}",
            other
        ))),
    }
}

fn now() -> Value {
    Value::String(Utc::now().to_rfc3339())
}

#[async_trait]
impl Retrievable for InMemoryResource {
    async fn retrieve(&self, id: &str, context: &RequestContext) -> HandlerResult<Value> {
        let entities = self.entities.read().await;
        let entity = entities.get(id).ok_or_else(|| HandlerError::not_found(id))?;
        Ok(Self::render(entity, context.representation()))
    }
}

#[async_trait]
impl Creatable for InMemoryResource {
    async fn create(&self, body: Value, context: &RequestContext) -> HandlerResult<Value> {
        let mut object = into_object(body)?;

        let id = match object.get(fields::UUID).and_then(Value::as_str) {
            Some(uuid) if !uuid.trim().is_empty() => uuid.to_string(),
            _ => Uuid::new_v4().to_string(),
        };
        for field in fields::MANAGED {
            object.remove(field);
        }
        object.insert(fields::UUID.to_string(), Value::String(id.clone()));
        object.insert(fields::VOIDED.to_string(), Value::Bool(false));
        object.insert(fields::DATE_CREATED.to_string(), now());

        let entity = Value::Object(object);
        {
            let mut entities = self.entities.write().await;
            if entities.contains_key(&id) {
                return Err(HandlerError::conflict(format!(
                    "{} '{}' already exists",
                    self.name, id
                )));
            }
            entities.insert(id.clone(), entity.clone());
        }

        info!("Created {} '{}' (request: '{}')", self.name, id, context.request_id);
        Ok(Self::render(&entity, context.representation()))
    }
}

#[async_trait]
impl Updatable for InMemoryResource {
    async fn update(&self, id: &str, body: Value, context: &RequestContext) -> HandlerResult<Value> {
        let changes = into_object(body)?;

        let mut entities = self.entities.write().await;
        let entity = entities.get_mut(id).ok_or_else(|| HandlerError::not_found(id))?;
        if let Value::Object(object) = entity {
            for (key, value) in changes {
                if !fields::MANAGED.contains(&key.as_str()) {
                    object.insert(key, value);
                }
            }
            object.insert(fields::DATE_CHANGED.to_string(), now());
        }

        debug!("Updated {} '{}' (request: '{}')", self.name, id, context.request_id);
        Ok(Self::render(entity, context.representation()))
    }
}

#[async_trait]
impl Deletable for InMemoryResource {
    async fn delete(&self, id: &str, reason: &str, context: &RequestContext) -> HandlerResult<()> {
        let mut entities = self.entities.write().await;
        let entity = entities.get_mut(id).ok_or_else(|| HandlerError::not_found(id))?;

        // Voiding twice keeps the first reason and timestamp
        if Self::is_voided(entity) {
            return Ok(());
        }
        if let Value::Object(object) = entity {
            object.insert(fields::VOIDED.to_string(), Value::Bool(true));
            object.insert(fields::VOID_REASON.to_string(), Value::String(reason.to_string()));
            object.insert(fields::DATE_VOIDED.to_string(), now());
        }

        info!(
            "Voided {} '{}' with reason '{}' (request: '{}')",
            self.name, id, reason, context.request_id
        );
        Ok(())
    }
}

#[async_trait]
impl Purgeable for InMemoryResource {
    async fn purge(&self, id: &str, context: &RequestContext) -> HandlerResult<()> {
        let removed = self.entities.write().await.shift_remove(id).is_some();
        if removed {
            info!("Purged {} '{}' (request: '{}')", self.name, id, context.request_id);
        } else {
            debug!("Purge of unknown {} '{}' ignored", self.name, id);
        }
        Ok(())
    }
}

#[async_trait]
impl Listable for InMemoryResource {
    async fn get_all(&self, context: &RequestContext) -> HandlerResult<PageResult> {
        Ok(self.collect(context, |_| true).await)
    }
}

#[async_trait]
impl Searchable for InMemoryResource {
    async fn search(&self, context: &RequestContext) -> HandlerResult<PageResult> {
        debug!(
            "Searching {} with {} parameter(s)",
            self.name,
            context.parameters().search_names().count()
        );
        Ok(self.collect(context, |entity| self.matches(entity, context)).await)
    }
}

impl ResourceHandler for InMemoryResource {
    fn as_retrievable(&self) -> Option<&dyn Retrievable> {
        Some(self)
    }

    fn as_creatable(&self) -> Option<&dyn Creatable> {
        Some(self)
    }

    fn as_updatable(&self) -> Option<&dyn Updatable> {
        Some(self)
    }

    fn as_deletable(&self) -> Option<&dyn Deletable> {
        Some(self)
    }

    fn as_purgeable(&self) -> Option<&dyn Purgeable> {
        Some(self)
    }

    fn as_listable(&self) -> Option<&dyn Listable> {
        Some(self)
    }

    fn as_searchable(&self) -> Option<&dyn Searchable> {
        Some(self)
    }
}
