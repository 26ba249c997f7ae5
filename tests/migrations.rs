#[cfg(test)]
mod tests {
    use datamanage::db::migrations::{get_db_version, needs_migration, MigrationManager};
    use rusqlite::Connection;
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    struct MigrationTestContext {
        conn: Connection,
        _temp_dir: TempDir,
    }

    impl TestContext for MigrationTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let conn = Connection::open(temp_dir.path().join("migrations.db")).unwrap();
            MigrationTestContext { conn, _temp_dir: temp_dir }
        }
    }

    fn table_exists(conn: &Connection, table: &str) -> bool {
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1", [table], |row| row.get(0))
            .unwrap();
        count == 1
    }

    #[test_context(MigrationTestContext)]
    #[test]
    fn test_fresh_database_is_migrated(ctx: &mut MigrationTestContext) {
        let manager = MigrationManager::new();
        assert!(needs_migration(&ctx.conn).unwrap());

        manager.run_migrations(&mut ctx.conn).unwrap();

        assert_eq!(get_db_version(&ctx.conn).unwrap(), manager.latest_version());
        assert_eq!(manager.latest_version(), 3);
        assert!(!needs_migration(&ctx.conn).unwrap());
        for table in ["phones", "encodings", "timezones", "report_summaries", "export_jobs"] {
            assert!(table_exists(&ctx.conn, table), "missing table {}", table);
        }
    }

    #[test_context(MigrationTestContext)]
    #[test]
    fn test_history_is_ordered(ctx: &mut MigrationTestContext) {
        let manager = MigrationManager::new();
        manager.run_migrations(&mut ctx.conn).unwrap();

        let history = manager.get_migration_history(&ctx.conn).unwrap();
        let versions: Vec<u32> = history.iter().map(|(version, _, _)| *version).collect();
        assert_eq!(versions, vec![1, 2, 3]);
        assert_eq!(history[0].1, "create_entity_tables");
        assert!(manager.is_migration_applied(&ctx.conn, 2).unwrap());
        assert!(!manager.is_migration_applied(&ctx.conn, 4).unwrap());
    }

    #[test_context(MigrationTestContext)]
    #[test]
    fn test_migrations_are_idempotent(ctx: &mut MigrationTestContext) {
        let manager = MigrationManager::new();
        manager.run_migrations(&mut ctx.conn).unwrap();
        manager.run_migrations(&mut ctx.conn).unwrap();

        assert_eq!(manager.get_migration_history(&ctx.conn).unwrap().len(), 3);
    }

    #[test_context(MigrationTestContext)]
    #[test]
    fn test_default_encodings_are_seeded(ctx: &mut MigrationTestContext) {
        MigrationManager::new().run_migrations(&mut ctx.conn).unwrap();

        let mut stmt = ctx.conn.prepare("SELECT name, is_default FROM encodings ORDER BY name").unwrap();
        let rows: Vec<(String, bool)> = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(rows, vec![("UTF-8".to_string(), true), ("WINDOWS-1251".to_string(), false)]);
    }

    #[cfg(debug_assertions)]
    #[test_context(MigrationTestContext)]
    #[test]
    fn test_rollback_and_reapply(ctx: &mut MigrationTestContext) {
        let manager = MigrationManager::new();
        manager.run_migrations(&mut ctx.conn).unwrap();

        manager.rollback_to(&mut ctx.conn, 1).unwrap();
        assert_eq!(get_db_version(&ctx.conn).unwrap(), 1);
        assert!(needs_migration(&ctx.conn).unwrap());

        manager.run_migrations(&mut ctx.conn).unwrap();
        assert_eq!(get_db_version(&ctx.conn).unwrap(), 3);

        let encodings: i64 = ctx.conn.query_row("SELECT COUNT(*) FROM encodings", [], |row| row.get(0)).unwrap();
        assert_eq!(encodings, 2);
    }
}
