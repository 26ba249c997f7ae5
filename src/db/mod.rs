//! SQLite persistence.
//!
//! - [`db`] opens connections and applies migrations.
//! - [`migrations`] holds the versioned schema of the entity tables.
//! - [`records`] is the generic row gateway the orchestrator builds SQL with.

pub mod db;
pub mod migrations;
pub mod records;
