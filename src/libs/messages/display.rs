use super::types::Message;
use std::fmt;

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            // === CONFIG ===
            Message::ConfigSaved => "Configuration saved".to_string(),
            Message::ConfigModuleDatabase => "Database settings".to_string(),
            Message::ConfigModulePagination => "Pagination settings".to_string(),
            Message::ConfigModuleDisplay => "Display settings".to_string(),
            Message::ConfigModuleExport => "Export settings".to_string(),
            Message::PromptSelectModules => "Select sections to configure".to_string(),
            Message::PromptDatabasePath => "Database file (empty for default)".to_string(),
            Message::PromptPerPage => "Default page size".to_string(),
            Message::PromptMaxPerPage => "Maximum page size".to_string(),
            Message::PromptDisplayTimezone => "Display timezone offset (e.g. +07:00)".to_string(),
            Message::PromptExportDir => "Export directory (empty for default)".to_string(),
            Message::PromptExpiresAfterDays => "Days before exports expire".to_string(),
            Message::PageSizeMustBePositive => "Page size must be greater than zero".to_string(),
            Message::PageSizeOutOfRange(max) => format!("Page size must be between 1 and {}", max),
            Message::InvalidTimezone(value) => format!("Invalid timezone offset: {}", value),

            // === ENTITIES ===
            Message::SchemasHeader => "Registered entities".to_string(),
            Message::NoRecordsFound(entity) => format!("No {} records found", entity),
            Message::PageSummary { page, last_page, total } => format!("Page {} of {} ({} total)", page, last_page, total),
            Message::RecordStored(entity, id) => format!("{} stored with id {}", entity, id),
            Message::RecordsStored(entity, count) => format!("{} {} records stored", count, entity),
            Message::RecordUpdated(entity, id) => format!("{} {} updated", entity, id),
            Message::RecordsDeleted(entity) => format!("{} records deleted", entity),
            Message::NothingDeleted(entity) => format!("No {} records matched, nothing deleted", entity),
            Message::RecordsRestored(entity) => format!("{} records restored", entity),
            Message::NothingRestored(entity) => format!("No deleted {} records matched", entity),
            Message::ConfirmDelete(entity) => format!("Delete matching {} records?", entity),
            Message::OperationCancelled => "Operation cancelled".to_string(),

            // === INPUT ===
            Message::InvalidFilter(value) => format!("Invalid filter '{}', expected key=value", value),
            Message::InvalidJsonInput(err) => format!("Invalid JSON input: {}", err),
            Message::JsonObjectExpected => "Expected a JSON object".to_string(),
            Message::JsonArrayExpected => "Expected a JSON array of objects".to_string(),

            // === EXPORT ===
            Message::ExportStarted(entity, format) => format!("Exporting {} as {}", entity, format),
            Message::ExportCompleted(path) => format!("Export written to {}", path),
            Message::ExportFailed(err) => format!("Export failed: {}", err),
            Message::ExportsPruned(count) => format!("{} expired export(s) removed", count),
            Message::ExportFileNotRemoved(path, err) => format!("Could not remove export file {}: {}", path, err),

            // === MIGRATIONS ===
            Message::MigrationsFound(count) => format!("Applying {} pending migration(s)", count),
            Message::RunningMigration(version, name) => format!("Running migration v{}: {}", version, name),
            Message::MigrationFailed(version, err) => format!("Migration v{} failed: {}", version, err),
            Message::MigrationsCompleted(version) => format!("Database schema at v{}", version),
            Message::DbVersion(version) => format!("Current database version: {}", version),
            Message::DbNeedsMigration => "Database has pending migrations".to_string(),
            Message::DbUpToDate => "Database is up to date".to_string(),
            Message::MigrationHistoryHeader => "Migration history".to_string(),
            Message::NothingToRollback => "Nothing to roll back".to_string(),
            Message::RollingBack(from, to) => format!("Rolling back from v{} to v{}", from, to),
            Message::RollbackCompleted(version) => format!("Rolled back to v{}", version),
        };
        write!(f, "{}", s)
    }
}
