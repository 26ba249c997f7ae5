/// Every user-facing message the CLI prints.
#[derive(Debug, Clone)]
pub enum Message {
    // === CONFIG ===
    ConfigSaved,
    ConfigModuleDatabase,
    ConfigModulePagination,
    ConfigModuleDisplay,
    ConfigModuleExport,
    PromptSelectModules,
    PromptDatabasePath,
    PromptPerPage,
    PromptMaxPerPage,
    PromptDisplayTimezone,
    PromptExportDir,
    PromptExpiresAfterDays,
    PageSizeMustBePositive,
    PageSizeOutOfRange(u32),
    InvalidTimezone(String),

    // === ENTITIES ===
    SchemasHeader,
    NoRecordsFound(String),
    PageSummary { page: u32, last_page: u32, total: u64 },
    RecordStored(String, String),
    RecordsStored(String, usize),
    RecordUpdated(String, String),
    RecordsDeleted(String),
    NothingDeleted(String),
    RecordsRestored(String),
    NothingRestored(String),
    ConfirmDelete(String),
    OperationCancelled,

    // === INPUT ===
    InvalidFilter(String),
    InvalidJsonInput(String),
    JsonObjectExpected,
    JsonArrayExpected,

    // === EXPORT ===
    ExportStarted(String, String),
    ExportCompleted(String),
    ExportFailed(String),
    ExportsPruned(usize),
    ExportFileNotRemoved(String, String),

    // === MIGRATIONS ===
    MigrationsFound(usize),
    RunningMigration(u32, String),
    MigrationFailed(u32, String),
    MigrationsCompleted(u32),
    DbVersion(u32),
    DbNeedsMigration,
    DbUpToDate,
    MigrationHistoryHeader,
    NothingToRollback,
    RollingBack(u32, u32),
    RollbackCompleted(u32),
}
