//! Schema store
//!
//! Keyed memoization in front of schema retrieval. Transport lives behind
//! the [`SchemaSource`] trait (the real implementation talks HTTP to the
//! admin API); the store only caches and absorbs fetch failures so they
//! never reach validator or resolver code.
//!
//! One store is constructed per process/session and never evicts. A failed
//! fetch is logged and reported as `None`, not cached, so the next call
//! retries.

use std::collections::HashMap;

use tracing::error;

use crate::error::Result;
use crate::schema::{EntityKind, Schema};

/// Server-side validation verdict for a submitted form
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct ValidationMessage {
    pub message: String,
}

/// Boundary to the schema endpoints of the admin API
pub trait SchemaSource {
    fn fetch_entity_schema(&self, entity: EntityKind) -> Result<Schema>;

    fn fetch_plugin_schema(&self, plugin: &str) -> Result<Schema>;

    /// Authoritative server-side validation, used as defense-in-depth next
    /// to the client-side checkers
    fn validate_entity(&self, entity: EntityKind, form: &serde_json::Value)
        -> Result<ValidationMessage>;
}

/// Memoizing cache over a [`SchemaSource`]
pub struct SchemaStore<S> {
    source: S,
    entities: HashMap<EntityKind, Schema>,
    plugins: HashMap<String, Schema>,
}

impl<S: SchemaSource> SchemaStore<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            entities: HashMap::new(),
            plugins: HashMap::new(),
        }
    }

    /// Schema for an entity kind. `None` means "cannot render this entity
    /// yet": the fetch failed and was logged.
    pub fn entity_schema(&mut self, entity: EntityKind) -> Option<&Schema> {
        if !self.entities.contains_key(&entity) {
            match self.source.fetch_entity_schema(entity) {
                Ok(schema) => {
                    self.entities.insert(entity, schema);
                }
                Err(err) => {
                    error!(entity = %entity, %err, "failed to fetch entity schema");
                    return None;
                }
            }
        }
        self.entities.get(&entity)
    }

    /// Schema for a plugin, by plugin name
    pub fn plugin_schema(&mut self, plugin: &str) -> Option<&Schema> {
        if !self.plugins.contains_key(plugin) {
            match self.source.fetch_plugin_schema(plugin) {
                Ok(schema) => {
                    self.plugins.insert(plugin.to_string(), schema);
                }
                Err(err) => {
                    error!(plugin = %plugin, %err, "failed to fetch plugin schema");
                    return None;
                }
            }
        }
        self.plugins.get(plugin)
    }

    /// Pass-through to server-side validation; never cached
    pub fn validate_entity(
        &self,
        entity: EntityKind,
        form: &serde_json::Value,
    ) -> Result<ValidationMessage> {
        self.source.validate_entity(entity, form)
    }
}
