//! Library modules.
//!
//! The orchestrator is split the way requests flow through it:
//!
//! - [`registry`] resolves entity names to [`schema::Schema`] handles
//! - [`manager`] opens an [`manager::Entity`] context per request
//! - [`condition`] turns caller filters into merged predicate trees
//! - [`query`] and [`mutation`] run reads and writes against [`crate::db::records`]
//! - [`resource`] presents records through per-entity transformers
//!
//! Around it sit [`config`], [`data_storage`], [`messages`], [`view`] and
//! [`export`] for the CLI.
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
//! let filters = json!({"status": "FAILED"}).as_object().cloned().unwrap_or_default();
//! let failed = manager.use_schema("ExportJob")?.conditionals(filters).list()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod condition;
pub mod config;
pub mod data_storage;
pub mod error;
pub mod export;
pub mod ids;
pub mod manager;
pub mod messages;
pub mod mutation;
pub mod pagination;
pub mod query;
pub mod record;
pub mod registry;
pub mod resource;
pub mod schema;
pub mod view;
