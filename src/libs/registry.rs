//! Entity name to schema resolution.
//!
//! The registry is populated once at startup with a factory per entity name.
//! Orchestration contexts resolve through it and cache the resulting handle.

use super::error::{DataError, DataResult};
use super::schema::Schema;
use crate::schemas;
use std::collections::BTreeMap;
use std::sync::Arc;

pub type SchemaFactory = fn() -> Arc<dyn Schema>;

#[derive(Default, Clone)]
pub struct SchemaRegistry {
    factories: BTreeMap<String, SchemaFactory>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every entity shipped with the crate.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("Phone", schemas::phone::factory);
        registry.register("Encoding", schemas::encoding::factory);
        registry.register("Timezone", schemas::timezone::factory);
        registry.register("ReportSummary", schemas::report_summary::factory);
        registry.register("ExportJob", schemas::export_job::factory);
        registry
    }

    /// Adds or replaces the factory for `name`.
    pub fn register(&mut self, name: impl Into<String>, factory: SchemaFactory) -> &mut Self {
        self.factories.insert(name.into(), factory);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Instantiates the schema registered under `name`.
    pub fn resolve(&self, name: &str) -> DataResult<Arc<dyn Schema>> {
        self.factories.get(name).map(|factory| factory()).ok_or_else(|| DataError::UnknownEntity(name.to_string()))
    }

    /// Every instantiated schema, in name order.
    pub fn schemas(&self) -> Vec<Arc<dyn Schema>> {
        self.factories.values().map(|factory| factory()).collect()
    }
}
