//! Entry point of the data management layer.
//!
//! A [`DataManager`] owns the connection handle, the schema registry and the
//! presentation options. Every call to [`DataManager::use_schema`] returns a
//! fresh [`Entity`] context: the resolved schema, deferred conditionals, the
//! parameter logic and eager-load list live there, never on the manager, so
//! concurrent orchestrations cannot leak state into each other.
//!
//! Queries are implemented in [`crate::libs::query`], mutations in
//! [`crate::libs::mutation`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use datamanage::db::db::Db;
//! use datamanage::libs::manager::DataManager;
//! use datamanage::libs::registry::SchemaRegistry;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let db = Db::in_memory()?;
//! let manager = DataManager::new(&db.conn, Arc::new(SchemaRegistry::with_defaults()));
//! let phone = manager.use_schema("Phone")?.store(json!({"phone": "+628123"}).as_object().cloned().unwrap_or_default())?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use super::condition::{Conditionals, Logic, ParamLogic, ParamOption};
use super::config::Config;
use super::error::{DataError, DataResult};
use super::record::Record;
use super::registry::SchemaRegistry;
use super::resource::{parse_offset, Presenter};
use super::schema::{RelationKind, Schema, Scope};
use crate::db::records::{Records, Trashed};
use chrono::FixedOffset;
use rusqlite::Connection;
use serde_json::{Map, Value};
use std::sync::Arc;

pub const DEFAULT_PER_PAGE: u32 = 15;
pub const DEFAULT_MAX_PER_PAGE: u32 = 100;

#[derive(Debug, Clone, Copy)]
pub struct ManagerOptions {
    pub per_page: u32,
    pub max_per_page: u32,
    pub timezone: Option<FixedOffset>,
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self {
            per_page: DEFAULT_PER_PAGE,
            max_per_page: DEFAULT_MAX_PER_PAGE,
            timezone: None,
        }
    }
}

impl ManagerOptions {
    pub fn from_config(config: &Config) -> Self {
        let pagination = config.pagination.clone().unwrap_or_default();
        Self {
            per_page: pagination.per_page.max(1),
            max_per_page: pagination.max_per_page.max(1),
            timezone: config.display_timezone.as_deref().and_then(parse_offset),
        }
    }
}

pub struct DataManager<'c> {
    conn: &'c Connection,
    registry: Arc<SchemaRegistry>,
    options: ManagerOptions,
}

impl<'c> DataManager<'c> {
    pub fn new(conn: &'c Connection, registry: Arc<SchemaRegistry>) -> Self {
        Self {
            conn,
            registry,
            options: ManagerOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ManagerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn connection(&self) -> &Connection {
        self.conn
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn options(&self) -> &ManagerOptions {
        &self.options
    }

    pub fn presenter(&self) -> Presenter {
        Presenter::new(self.options.timezone)
    }

    /// Resolves `name` and opens an orchestration context for it.
    pub fn use_schema(&self, name: &str) -> DataResult<Entity<'_>> {
        let model = self.registry.resolve(name)?;
        Ok(Entity::boot(self, name, model))
    }

    /// Creates tables for registered schemas the migrations do not cover.
    pub fn ensure_tables(&self) -> DataResult<()> {
        for schema in self.registry.schemas() {
            Records::new(self.conn, schema.as_ref()).create_table()?;
        }
        Ok(())
    }
}

/// Deferred filter input: raw caller parameters or prebuilt predicates.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionInput {
    Params(Map<String, Value>),
    Built(Conditionals),
}

impl From<Map<String, Value>> for ConditionInput {
    fn from(value: Map<String, Value>) -> Self {
        ConditionInput::Params(value)
    }
}

impl From<Conditionals> for ConditionInput {
    fn from(value: Conditionals) -> Self {
        ConditionInput::Built(value)
    }
}

/// Orchestration context for one entity.
pub struct Entity<'m> {
    pub(crate) manager: &'m DataManager<'m>,
    name: String,
    model: Arc<dyn Schema>,
    scope: Conditionals,
    conditionals: Option<ConditionInput>,
    param_logic: ParamLogic,
    pub(crate) trashed: Trashed,
    pub(crate) with: Vec<String>,
}

impl<'m> Entity<'m> {
    fn boot(manager: &'m DataManager<'m>, name: &str, model: Arc<dyn Schema>) -> Self {
        let mut scope = Scope::default();
        model.booting(&mut scope);

        let mut with: Vec<String> = model.eager_load().iter().map(|relation| relation.to_string()).collect();
        for relation in scope.with {
            if !with.contains(&relation) {
                with.push(relation);
            }
        }

        Self {
            manager,
            name: name.to_string(),
            model,
            scope: scope.conditionals,
            conditionals: None,
            param_logic: scope.param_logic.unwrap_or_default(),
            trashed: Trashed::Without,
            with,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Backing table of the resolved schema.
    pub fn get_class(&self) -> &'static str {
        self.model.table()
    }

    /// The cached schema handle, or a newly instantiated one when `fresh`.
    pub fn get_model(&self, fresh: bool) -> DataResult<Arc<dyn Schema>> {
        if fresh {
            self.manager.registry.resolve(&self.name)
        } else {
            Ok(Arc::clone(&self.model))
        }
    }

    pub(crate) fn schema(&self) -> &dyn Schema {
        self.model.as_ref()
    }

    pub(crate) fn conn(&self) -> &'m Connection {
        self.manager.conn
    }

    pub(crate) fn records(&self) -> Records<'_> {
        Records::new(self.manager.conn, self.model.as_ref())
    }

    /// Opens a context for another registered entity on the same manager.
    pub fn fork(&self, name: &str) -> DataResult<Entity<'m>> {
        self.manager.use_schema(name)
    }

    /// Opens a context for the target of a declared relation.
    pub fn child(&self, relation: &str) -> DataResult<Entity<'m>> {
        let relation = self.model.relation(relation).ok_or_else(|| DataError::UnknownRelation {
            entity: self.name.clone(),
            relation: relation.to_string(),
        })?;
        if let RelationKind::MorphTo { .. } = relation.kind {
            return Err(DataError::Configuration(format!(
                "{}.{} is polymorphic and has no fixed entity",
                self.name, relation.name
            )));
        }
        self.fork(relation.entity)
    }

    /// Stores filter input for later queries. Nothing is executed here.
    pub fn conditionals(mut self, value: impl Into<ConditionInput>) -> Self {
        self.conditionals = Some(value.into());
        self
    }

    pub fn set_param_logic(mut self, logic: Logic, match_value_in_like: bool, extra_options: Vec<ParamOption>) -> Self {
        self.param_logic = ParamLogic::new(logic, match_value_in_like, extra_options);
        self
    }

    pub fn param_logic(&self) -> &ParamLogic {
        &self.param_logic
    }

    pub fn with(mut self, relation: &str) -> Self {
        if !self.with.iter().any(|loaded| loaded == relation) {
            self.with.push(relation.to_string());
        }
        self
    }

    pub fn with_trashed(mut self) -> Self {
        self.trashed = Trashed::With;
        self
    }

    pub fn only_trashed(mut self) -> Self {
        self.trashed = Trashed::Only;
        self
    }

    fn resolve(&self, input: &ConditionInput) -> DataResult<Conditionals> {
        match input {
            ConditionInput::Built(conditionals) => Ok(conditionals.clone()),
            ConditionInput::Params(params) => Conditionals::from_params(params, &self.param_logic).map_err(|errors| DataError::Validation {
                entity: self.name.clone(),
                errors,
            }),
        }
    }

    /// Combines the stored conditionals with `value` under the configured
    /// combinator. Neither side is modified.
    pub fn merge_condition(&self, value: Option<&ConditionInput>) -> DataResult<Conditionals> {
        let stored = match &self.conditionals {
            Some(input) => self.resolve(input)?,
            None => Conditionals::new(self.param_logic.logic),
        };
        let incoming = match value {
            Some(input) => self.resolve(input)?,
            None => Conditionals::new(self.param_logic.logic),
        };
        Ok(stored.merge(&incoming, self.param_logic.logic))
    }

    /// Caller conditionals narrowed by the schema's booting scope.
    pub(crate) fn query_conditionals(&self, value: Option<&ConditionInput>) -> DataResult<Conditionals> {
        Ok(self.scoped(self.merge_condition(value)?))
    }

    pub(crate) fn scoped(&self, conditionals: Conditionals) -> Conditionals {
        if self.scope.is_empty() {
            conditionals
        } else {
            self.scope.merge(&Conditionals::and().where_group(conditionals), Logic::And)
        }
    }

    pub fn present(&self, record: &Record) -> Value {
        let resource = self.model.resource();
        self.manager.presenter().present(&self.name, resource.as_ref(), record)
    }

    pub fn present_all(&self, records: &[Record]) -> Vec<Value> {
        let resource = self.model.resource();
        self.manager.presenter().present_all(&self.name, resource.as_ref(), records)
    }
}
