//! Versioned schema changes for the entity tables.
//!
//! Every table shares the same layout: a ULID `id` primary key, the entity's
//! declared columns, an optional `props` JSON bag, `created_at`/`updated_at`
//! audit columns and, for soft-deleting entities, a `deleted_at` tombstone.
//! Pending migrations are applied in version order inside one transaction
//! and recorded in the `migrations` table.
//!
//! ```rust,no_run
//! use datamanage::db::migrations::{get_db_version, init_with_migrations};
//! use rusqlite::Connection;
//!
//! let mut conn = Connection::open("datamanage.db")?;
//! init_with_migrations(&mut conn)?;
//! let version = get_db_version(&conn)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use crate::libs::ids::next_id;
use crate::libs::messages::Message;
use crate::libs::record::now_timestamp;
use crate::{msg_debug, msg_error, msg_info, msg_success};
use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension, Transaction};

const MIGRATIONS_TABLE: &str = "
CREATE TABLE IF NOT EXISTS migrations (
    id INTEGER PRIMARY KEY,
    version INTEGER NOT NULL UNIQUE,
    name TEXT NOT NULL,
    applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)";

#[derive(Debug, Clone)]
struct Migration {
    version: u32,
    name: &'static str,
    up: fn(&Transaction) -> Result<()>,
}

/// Registry of known migrations and the logic to apply them.
pub struct MigrationManager {
    migrations: Vec<Migration>,
}

impl Default for MigrationManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MigrationManager {
    pub fn new() -> Self {
        let mut manager = Self { migrations: Vec::new() };
        manager.register_migrations();
        manager
    }

    fn register_migrations(&mut self) {
        self.add_migration(1, "create_entity_tables", |tx| {
            tx.execute_batch(
                "
                CREATE TABLE IF NOT EXISTS phones (
                    id TEXT NOT NULL PRIMARY KEY,
                    phone TEXT NOT NULL,
                    verified_at TEXT,
                    props TEXT,
                    created_at TEXT,
                    updated_at TEXT,
                    deleted_at TEXT
                );
                CREATE TABLE IF NOT EXISTS encodings (
                    id TEXT NOT NULL PRIMARY KEY,
                    name TEXT NOT NULL,
                    label TEXT,
                    is_default INTEGER,
                    props TEXT,
                    created_at TEXT,
                    updated_at TEXT,
                    deleted_at TEXT
                );
                CREATE TABLE IF NOT EXISTS timezones (
                    id TEXT NOT NULL PRIMARY KEY,
                    name TEXT NOT NULL,
                    utc_offset TEXT NOT NULL,
                    created_at TEXT,
                    updated_at TEXT
                );
                CREATE TABLE IF NOT EXISTS report_summaries (
                    id TEXT NOT NULL PRIMARY KEY,
                    title TEXT NOT NULL,
                    period_start TEXT,
                    period_end TEXT,
                    total REAL,
                    previous_total REAL,
                    timezone_id TEXT,
                    props TEXT,
                    created_at TEXT,
                    updated_at TEXT,
                    deleted_at TEXT
                );
                CREATE TABLE IF NOT EXISTS export_jobs (
                    id TEXT NOT NULL PRIMARY KEY,
                    user_id TEXT,
                    export_type TEXT NOT NULL,
                    reference_type TEXT,
                    reference_id TEXT,
                    status TEXT NOT NULL,
                    file_path TEXT,
                    file_name TEXT,
                    error_message TEXT,
                    metadata TEXT,
                    expires_at TEXT,
                    created_at TEXT,
                    updated_at TEXT,
                    deleted_at TEXT
                );
                ",
            )?;
            Ok(())
        });

        self.add_migration(2, "add_lookup_indexes", |tx| {
            tx.execute_batch(
                "
                CREATE INDEX IF NOT EXISTS idx_phones_phone ON phones(phone);
                CREATE INDEX IF NOT EXISTS idx_phones_deleted_at ON phones(deleted_at);
                CREATE INDEX IF NOT EXISTS idx_report_summaries_timezone_id ON report_summaries(timezone_id);
                CREATE INDEX IF NOT EXISTS idx_report_summaries_period ON report_summaries(period_start, period_end);
                CREATE INDEX IF NOT EXISTS idx_export_jobs_status ON export_jobs(status);
                CREATE INDEX IF NOT EXISTS idx_export_jobs_reference ON export_jobs(reference_type, reference_id);
                ",
            )?;
            Ok(())
        });

        self.add_migration(3, "seed_default_encodings", |tx| {
            let now = now_timestamp();
            for (name, label, is_default) in [("UTF-8", "Unicode (UTF-8)", true), ("WINDOWS-1251", "Cyrillic (Windows-1251)", false)] {
                let exists: Option<String> = tx
                    .query_row("SELECT id FROM encodings WHERE name = ?1", params![name], |row| row.get(0))
                    .optional()?;
                if exists.is_none() {
                    tx.execute(
                        "INSERT INTO encodings (id, name, label, is_default, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                        params![next_id(), name, label, is_default, now],
                    )?;
                }
            }
            Ok(())
        });
    }

    fn add_migration(&mut self, version: u32, name: &'static str, up: fn(&Transaction) -> Result<()>) {
        self.migrations.push(Migration { version, name, up });
    }

    pub fn latest_version(&self) -> u32 {
        self.migrations.last().map(|m| m.version).unwrap_or(0)
    }

    /// Applies every migration newer than the recorded version.
    pub fn run_migrations(&self, conn: &mut Connection) -> Result<()> {
        conn.execute(MIGRATIONS_TABLE, [])?;

        let current_version = self.get_current_version(conn)?;
        let pending: Vec<&Migration> = self.migrations.iter().filter(|m| m.version > current_version).collect();

        if pending.is_empty() {
            msg_debug!("Database schema is current");
            return Ok(());
        }

        msg_info!(Message::MigrationsFound(pending.len()));
        let tx = conn.transaction()?;

        for migration in pending {
            msg_debug!(Message::RunningMigration(migration.version, migration.name.to_string()));

            if let Err(e) = (migration.up)(&tx) {
                msg_error!(Message::MigrationFailed(migration.version, e.to_string()));
                return Err(e);
            }
            tx.execute("INSERT INTO migrations (version, name) VALUES (?1, ?2)", params![migration.version, migration.name])?;
        }

        tx.commit()?;
        msg_success!(Message::MigrationsCompleted(self.latest_version()));

        Ok(())
    }

    fn get_current_version(&self, conn: &Connection) -> Result<u32> {
        let version: Option<u32> = conn.query_row("SELECT MAX(version) FROM migrations", [], |row| row.get(0)).unwrap_or(Some(0));
        Ok(version.unwrap_or(0))
    }

    pub fn is_migration_applied(&self, conn: &Connection, version: u32) -> Result<bool> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM migrations WHERE version = ?1", params![version], |row| row.get(0))?;
        Ok(count > 0)
    }

    /// `(version, name, applied_at)` for every applied migration.
    pub fn get_migration_history(&self, conn: &Connection) -> Result<Vec<(u32, String, String)>> {
        let mut stmt = conn.prepare("SELECT version, name, applied_at FROM migrations ORDER BY version")?;
        let history = stmt
            .query_map([], |row| Ok((row.get::<_, u32>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(history)
    }

    /// Forgets migration records above `target_version`. Tables are left as
    /// they are, so re-running relies on `IF NOT EXISTS`.
    #[cfg(debug_assertions)]
    pub fn rollback_to(&self, conn: &mut Connection, target_version: u32) -> Result<()> {
        let current_version = self.get_current_version(conn)?;
        if target_version >= current_version {
            msg_info!(Message::NothingToRollback);
            return Ok(());
        }

        msg_info!(Message::RollingBack(current_version, target_version));
        conn.execute("DELETE FROM migrations WHERE version > ?1", params![target_version])?;
        msg_success!(Message::RollbackCompleted(target_version));
        Ok(())
    }
}

pub fn init_with_migrations(conn: &mut Connection) -> Result<()> {
    MigrationManager::new().run_migrations(conn)
}

pub fn get_db_version(conn: &Connection) -> Result<u32> {
    MigrationManager::new().get_current_version(conn)
}

pub fn needs_migration(conn: &Connection) -> Result<bool> {
    let manager = MigrationManager::new();
    Ok(manager.get_current_version(conn)? < manager.latest_version())
}
