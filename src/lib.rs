//! # datamanage
//!
//! A generic CRUD orchestrator over SQLite. Entities are registered by name
//! with a schema describing their table, columns and relations; callers pick
//! one with `use_schema`, attach filter conditionals, and run list, paginate,
//! show, store, update, delete or update-or-create through a single uniform
//! interface. Results pass through per-entity resource transformers.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use datamanage::commands::Cli;
//!
//! fn main() -> anyhow::Result<()> {
//!     Cli::menu()
//! }
//! ```

pub mod commands;
pub mod db;
pub mod libs;
pub mod schemas;
