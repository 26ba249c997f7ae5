use super::migrations::init_with_migrations;
use crate::libs::config::Config;
use crate::libs::data_storage::DataStorage;
use anyhow::Result;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

pub const DB_FILE_NAME: &str = "datamanage.db";

pub struct Db {
    pub conn: Connection,
}

impl Db {
    /// Opens the configured database, falling back to the data directory,
    /// and applies pending migrations.
    pub fn new() -> Result<Db> {
        Self::open(Self::default_path()?)
    }

    /// Opens the database at `path` and applies pending migrations.
    pub fn open(path: impl AsRef<Path>) -> Result<Db> {
        let mut conn = Connection::open(path)?;
        init_with_migrations(&mut conn)?;
        Ok(Db { conn })
    }

    /// Private in-memory database with the current schema.
    pub fn in_memory() -> Result<Db> {
        let mut conn = Connection::open_in_memory()?;
        init_with_migrations(&mut conn)?;
        Ok(Db { conn })
    }

    /// Opens the default database without touching its schema.
    pub fn new_without_migrations() -> Result<Db> {
        let conn = Connection::open(Self::default_path()?)?;
        Ok(Db { conn })
    }

    pub fn default_path() -> Result<PathBuf> {
        let config = Config::read()?;
        match config.database.and_then(|database| database.path) {
            Some(path) => Ok(PathBuf::from(path)),
            None => DataStorage::new().get_path(DB_FILE_NAME),
        }
    }
}
