#[cfg(test)]
mod tests {
    use datamanage::db::db::Db;
    use datamanage::libs::condition::{Conditionals, Logic};
    use datamanage::libs::error::ErrorKind;
    use datamanage::libs::manager::DataManager;
    use datamanage::libs::record::Record;
    use datamanage::libs::registry::SchemaRegistry;
    use datamanage::libs::resource::{ResourceError, ResourceTransformer};
    use datamanage::libs::schema::{Column, Schema, Scope};
    use serde_json::{json, Map, Value};
    use std::sync::Arc;
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    const NOTE_COLUMNS: &[Column] = &[Column::text("body").required(), Column::integer("priority"), Column::boolean("archived")];

    /// Hard-deleting entity that hides archived rows and cannot be presented.
    struct Note;

    fn note() -> Arc<dyn Schema> {
        Arc::new(Note)
    }

    impl Schema for Note {
        fn name(&self) -> &'static str {
            "Note"
        }

        fn table(&self) -> &'static str {
            "notes"
        }

        fn columns(&self) -> &'static [Column] {
            NOTE_COLUMNS
        }

        fn soft_deletes(&self) -> bool {
            false
        }

        fn has_props(&self) -> bool {
            false
        }

        fn booting(&self, scope: &mut Scope) {
            scope.conditionals = Conditionals::and().where_eq("archived", false);
        }

        fn resource(&self) -> Box<dyn ResourceTransformer> {
            Box::new(BrokenResource)
        }
    }

    struct BrokenResource;

    impl ResourceTransformer for BrokenResource {
        fn transform(&self, _record: &Record) -> Result<Value, ResourceError> {
            Err(ResourceError::MissingField("summary".into()))
        }
    }

    struct NoteTestContext {
        db: Db,
        _temp_dir: TempDir,
    }

    impl TestContext for NoteTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let db = Db::open(temp_dir.path().join("datamanage.db")).unwrap();
            NoteTestContext { db, _temp_dir: temp_dir }
        }
    }

    impl NoteTestContext {
        fn manager(&self) -> DataManager<'_> {
            let mut registry = SchemaRegistry::with_defaults();
            registry.register("Note", note);
            let manager = DataManager::new(&self.db.conn, Arc::new(registry));
            manager.ensure_tables().unwrap();
            manager
        }
    }

    fn obj(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn store_note(manager: &DataManager, body: &str, priority: i64, archived: bool) -> String {
        let input = obj(json!({"body": body, "priority": priority, "archived": archived}));
        manager.use_schema("Note").unwrap().prepare_store(input).unwrap().id
    }

    #[test_context(NoteTestContext)]
    #[test]
    fn test_registered_schema_is_resolvable(ctx: &mut NoteTestContext) {
        let manager = ctx.manager();
        assert!(manager.registry().contains("Note"));
        assert_eq!(manager.use_schema("Note").unwrap().get_class(), "notes");
    }

    #[test_context(NoteTestContext)]
    #[test]
    fn test_booting_scope_narrows_every_query(ctx: &mut NoteTestContext) {
        let manager = ctx.manager();
        store_note(&manager, "groceries", 1, false);
        store_note(&manager, "taxes", 3, false);
        let archived = store_note(&manager, "old groceries", 2, true);

        assert_eq!(manager.use_schema("Note").unwrap().count(None).unwrap(), 2);

        let either = manager
            .use_schema("Note")
            .unwrap()
            .set_param_logic(Logic::Or, true, Vec::new())
            .conditionals(obj(json!({"body": "groceries", "priority": 3})))
            .prepare_list(None)
            .unwrap();
        assert_eq!(either.len(), 2);
        assert!(either.iter().all(|note| note.id != archived));

        assert!(manager.use_schema("Note").unwrap().show(Some(&archived)).is_err());

        let err = manager
            .use_schema("Note")
            .unwrap()
            .update(obj(json!({"id": archived, "body": "moved"})))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let body: String = ctx
            .db
            .conn
            .query_row("SELECT body FROM notes WHERE id = ?1", [&archived], |row| row.get(0))
            .unwrap();
        assert_eq!(body, "old groceries");
    }

    #[test_context(NoteTestContext)]
    #[test]
    fn test_update_or_create_ignores_hidden_rows(ctx: &mut NoteTestContext) {
        let manager = ctx.manager();
        let archived = store_note(&manager, "old groceries", 2, true);

        let note = manager
            .use_schema("Note")
            .unwrap()
            .update_or_create(obj(json!({"body": "old groceries"})), obj(json!({"priority": 5, "archived": false})))
            .unwrap();
        assert_ne!(note.id, archived);
        assert_eq!(note.get("priority"), Some(json!(5)));

        let priority: i64 = ctx
            .db
            .conn
            .query_row("SELECT priority FROM notes WHERE id = ?1", [&archived], |row| row.get(0))
            .unwrap();
        assert_eq!(priority, 2);
    }

    #[test_context(NoteTestContext)]
    #[test]
    fn test_failing_resource_returns_raw_record(ctx: &mut NoteTestContext) {
        let manager = ctx.manager();
        let id = store_note(&manager, "groceries", 1, false);

        let shown = manager.use_schema("Note").unwrap().show(Some(&id)).unwrap();
        assert_eq!(shown["id"], json!(id));
        assert_eq!(shown["body"], json!("groceries"));
        assert_eq!(shown["priority"], json!(1));
        assert_eq!(shown["archived"], json!(false));
        assert!(shown.get("props").is_none());
    }

    #[test_context(NoteTestContext)]
    #[test]
    fn test_hard_delete_and_no_restore(ctx: &mut NoteTestContext) {
        let manager = ctx.manager();
        let id = store_note(&manager, "groceries", 1, false);

        assert!(manager.use_schema("Note").unwrap().delete_by_id(&id).unwrap());
        let remaining: i64 = ctx.db.conn.query_row("SELECT COUNT(*) FROM notes", [], |row| row.get(0)).unwrap();
        assert_eq!(remaining, 0);

        let err = manager.use_schema("Note").unwrap().restore(None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test_context(NoteTestContext)]
    #[test]
    fn test_column_types_are_enforced(ctx: &mut NoteTestContext) {
        let manager = ctx.manager();
        let notes = manager.use_schema("Note").unwrap();

        let err = notes.store(obj(json!({"body": "x", "priority": "high"}))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = notes.store(obj(json!({"body": "x", "props": {"a": 1}}))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
