#[cfg(test)]
mod tests {
    use datamanage::db::db::Db;
    use datamanage::libs::condition::{Conditionals, Logic, ParamOption};
    use datamanage::libs::error::{DataError, ErrorKind};
    use datamanage::libs::manager::{ConditionInput, DataManager, ManagerOptions};
    use datamanage::libs::pagination::PaginateRequest;
    use datamanage::libs::registry::SchemaRegistry;
    use datamanage::libs::resource::parse_offset;
    use serde_json::{json, Map, Value};
    use std::sync::Arc;
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    struct DataTestContext {
        db: Db,
        _temp_dir: TempDir,
    }

    impl TestContext for DataTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let db = Db::open(temp_dir.path().join("datamanage.db")).unwrap();
            DataTestContext { db, _temp_dir: temp_dir }
        }
    }

    impl DataTestContext {
        fn manager(&self) -> DataManager<'_> {
            DataManager::new(&self.db.conn, Arc::new(SchemaRegistry::with_defaults()))
        }
    }

    fn obj(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn ids(values: &[Value]) -> Vec<String> {
        values.iter().map(|value| value["id"].as_str().unwrap().to_string()).collect()
    }

    fn store_phone(manager: &DataManager, phone: &str) -> String {
        let stored = manager.use_schema("Phone").unwrap().store(obj(json!({ "phone": phone }))).unwrap();
        stored["id"].as_str().unwrap().to_string()
    }

    #[test_context(DataTestContext)]
    #[test]
    fn test_store_then_show_phone(ctx: &mut DataTestContext) {
        let manager = ctx.manager();
        let id = store_phone(&manager, "+628123");

        let shown = manager.use_schema("Phone").unwrap().show(Some(&id)).unwrap();
        let fields = shown.as_object().unwrap();
        assert_eq!(fields.len(), 4);
        assert_eq!(shown["id"], json!(id));
        assert_eq!(shown["phone"], json!("+628123"));
        assert!(shown["created_at"].is_string());
        assert!(shown["verified_at"].is_null());
    }

    #[test_context(DataTestContext)]
    #[test]
    fn test_store_returns_every_input_field(ctx: &mut DataTestContext) {
        let manager = ctx.manager();
        let input = json!({
            "title": "March",
            "period_start": "2025-03-01",
            "period_end": "2025-03-31",
            "total": 12.5,
            "props": {"source": "import"}
        });
        let record = manager.use_schema("ReportSummary").unwrap().prepare_store(obj(input.clone())).unwrap();

        let shown = manager.use_schema("ReportSummary").unwrap().prepare_show(Some(&record.id), None).unwrap();
        for (field, value) in input.as_object().unwrap() {
            if field == "props" {
                assert_eq!(shown.props.clone().map(Value::Object), Some(value.clone()));
            } else {
                assert_eq!(shown.get(field).as_ref(), Some(value), "field {}", field);
            }
        }
        assert!(shown.created_at.is_some());
        assert_eq!(shown.created_at, shown.updated_at);
    }

    #[test_context(DataTestContext)]
    #[test]
    fn test_whole_number_reals_round_trip(ctx: &mut DataTestContext) {
        let manager = ctx.manager();
        let summaries = manager.use_schema("ReportSummary").unwrap();
        let stored = summaries.prepare_store(obj(json!({"title": "Q", "total": 100, "previous_total": 80.0}))).unwrap();

        let shown = summaries.prepare_show(Some(&stored.id), None).unwrap();
        assert_eq!(shown.get("total"), Some(json!(100)));
        assert_eq!(shown.get("previous_total"), stored.get("previous_total"));

        let updated = summaries.prepare_update(obj(json!({"id": stored.id, "total": 100.0}))).unwrap();
        assert_eq!(updated.updated_at, stored.updated_at);
        assert_eq!(summaries.show(Some(&stored.id)).unwrap()["change_percent"], json!(25.0));
    }

    #[test_context(DataTestContext)]
    #[test]
    fn test_store_normalizes_and_validates(ctx: &mut DataTestContext) {
        let manager = ctx.manager();
        let phones = manager.use_schema("Phone").unwrap();

        let stored = phones.store(obj(json!({"phone": "+62 812-3456"}))).unwrap();
        assert_eq!(stored["phone"], json!("+628123456"));

        let err = phones.store(obj(json!({"phone": "12", "nickname": "x", "created_at": "2025-01-01"}))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        let DataError::Validation { errors, .. } = err else { panic!("expected validation error") };
        assert!(errors.get("phone").is_some());
        assert!(errors.get("nickname").is_some());
        assert!(errors.get("created_at").is_some());

        let err = phones.store(Map::new()).unwrap_err();
        let DataError::Validation { errors, .. } = err else { panic!("expected validation error") };
        assert_eq!(errors.get("phone").unwrap(), ["is required".to_string()]);
    }

    #[test_context(DataTestContext)]
    #[test]
    fn test_explicit_id_is_kept(ctx: &mut DataTestContext) {
        let manager = ctx.manager();
        let phones = manager.use_schema("Phone").unwrap();
        let record = phones.prepare_store(obj(json!({"id": "phone-1", "phone": "+628123"}))).unwrap();
        assert_eq!(record.id, "phone-1");
        assert!(phones.store(obj(json!({"id": 5, "phone": "+628123"}))).is_err());
    }

    #[test_context(DataTestContext)]
    #[test]
    fn test_soft_delete_hides_records(ctx: &mut DataTestContext) {
        let manager = ctx.manager();
        let first = store_phone(&manager, "+628111111");
        let second = store_phone(&manager, "+628222222");

        assert!(manager.use_schema("Phone").unwrap().delete_by_id(&first).unwrap());

        let listed = manager.use_schema("Phone").unwrap().list().unwrap();
        assert_eq!(ids(&listed), vec![second.clone()]);

        let all = manager.use_schema("Phone").unwrap().with_trashed().list().unwrap();
        assert_eq!(all.len(), 2);

        let trashed = manager.use_schema("Phone").unwrap().only_trashed().prepare_list(None).unwrap();
        assert_eq!(trashed.len(), 1);
        assert!(trashed[0].is_trashed());

        assert!(manager.use_schema("Phone").unwrap().show(Some(&first)).is_err());
        assert!(manager.use_schema("Phone").unwrap().with_trashed().show(Some(&first)).is_ok());

        let by_id = ConditionInput::Built(Conditionals::and().where_eq("id", first.as_str()));
        assert!(manager.use_schema("Phone").unwrap().restore(Some(by_id.clone())).unwrap());
        assert!(!manager.use_schema("Phone").unwrap().restore(Some(by_id)).unwrap());
        assert_eq!(manager.use_schema("Phone").unwrap().list().unwrap().len(), 2);
    }

    #[test_context(DataTestContext)]
    #[test]
    fn test_delete_requires_conditions(ctx: &mut DataTestContext) {
        let manager = ctx.manager();
        store_phone(&manager, "+628111111");

        let err = manager.use_schema("Phone").unwrap().delete(None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(manager.use_schema("Phone").unwrap().count(None).unwrap(), 1);

        let deleted = manager
            .use_schema("Phone")
            .unwrap()
            .conditionals(obj(json!({"phone": "+628111111"})))
            .delete(None)
            .unwrap();
        assert!(deleted);
        assert!(!manager.use_schema("Phone").unwrap().delete_by_id("missing").unwrap());
    }

    #[test_context(DataTestContext)]
    #[test]
    fn test_timezone_is_hard_deleted(ctx: &mut DataTestContext) {
        let manager = ctx.manager();
        let stored = manager
            .use_schema("Timezone")
            .unwrap()
            .prepare_store(obj(json!({"name": "Jakarta", "utc_offset": "+7"})))
            .unwrap();
        assert_eq!(stored.get("utc_offset"), Some(json!("+07:00")));

        assert!(manager.use_schema("Timezone").unwrap().delete_by_id(&stored.id).unwrap());
        assert!(manager.use_schema("Timezone").unwrap().with_trashed().list().unwrap().is_empty());

        let err = manager.use_schema("Timezone").unwrap().restore(None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test_context(DataTestContext)]
    #[test]
    fn test_timezone_rejects_non_ascii_offset(ctx: &mut DataTestContext) {
        let manager = ctx.manager();
        let err = manager
            .use_schema("Timezone")
            .unwrap()
            .store(obj(json!({"name": "X", "utc_offset": "+a€"})))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        let DataError::Validation { errors, .. } = err else {
            panic!("expected validation error");
        };
        assert!(errors.get("utc_offset").is_some());
    }

    #[test_context(DataTestContext)]
    #[test]
    fn test_paginate_empty_collection(ctx: &mut DataTestContext) {
        let manager = ctx.manager();
        let page = manager.use_schema("Phone").unwrap().paginate(None).unwrap();

        assert!(page.data.is_empty());
        assert_eq!(page.meta.total, 0);
        assert_eq!(page.meta.current_page, 1);
        assert_eq!(page.meta.per_page, 15);
        assert_eq!(page.meta.last_page, 1);
        assert_eq!(page.links.next, None);
    }

    #[test_context(DataTestContext)]
    #[test]
    fn test_paginate_pages_and_links(ctx: &mut DataTestContext) {
        let manager = ctx.manager();
        let mut stored = Vec::new();
        for i in 0..25 {
            stored.push(store_phone(&manager, &format!("+62812300{:02}", i)));
        }

        let request = PaginateRequest::new().per_page(10).page(2).path("/phones");
        let page = manager.use_schema("Phone").unwrap().paginate(Some(&request)).unwrap();
        assert_eq!(ids(&page.data), stored[10..20].to_vec());
        assert_eq!(page.meta.total, 25);
        assert_eq!(page.meta.last_page, 3);
        assert_eq!(page.meta.from, Some(11));
        assert_eq!(page.meta.to, Some(20));
        assert_eq!(page.links.next.as_deref(), Some("/phones?per_page=10&page=3"));

        let request = PaginateRequest::new()
            .per_page(5)
            .filters(obj(json!({"phone": "+628123000"})))
            .path("/phones");
        let page = manager.use_schema("Phone").unwrap().paginate(Some(&request)).unwrap();
        assert_eq!(page.meta.total, 10);
        assert_eq!(page.data.len(), 5);
        assert_eq!(page.links.next.as_deref(), Some("/phones?phone=%2B628123000&per_page=5&page=2"));
    }

    #[test_context(DataTestContext)]
    #[test]
    fn test_paginate_accepts_raw_query_params(ctx: &mut DataTestContext) {
        let manager = ctx.manager();
        for i in 0..10 {
            store_phone(&manager, &format!("+62812300{:02}", i));
        }

        let request = PaginateRequest::new()
            .per_page(5)
            .page(2)
            .filters(obj(json!({"phone": "+628123000", "page": "2", "per_page": "5"})))
            .path("/phones");
        let page = manager.use_schema("Phone").unwrap().paginate(Some(&request)).unwrap();

        assert_eq!(page.meta.total, 10);
        assert_eq!(page.data.len(), 5);
        assert!(page.links.next.is_none());
        assert_eq!(page.links.prev.as_deref(), Some("/phones?phone=%2B628123000&per_page=5&page=1"));
    }

    #[test_context(DataTestContext)]
    #[test]
    fn test_paginate_projection_and_known_total(ctx: &mut DataTestContext) {
        let manager = ctx.manager();
        store_phone(&manager, "+628111111");

        let request = PaginateRequest::new().columns(["phone"]).total(40);
        let page = manager.use_schema("Phone").unwrap().prepare_paginate(&request).unwrap();
        assert_eq!(page.meta.total, 40);
        assert_eq!(page.meta.last_page, 3);
        assert_eq!(page.data[0].get("phone"), Some(json!("+628111111")));
        assert_eq!(page.data[0].created_at, None);

        let request = PaginateRequest::new().columns(["password"]);
        let err = manager.use_schema("Phone").unwrap().prepare_paginate(&request).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test_context(DataTestContext)]
    #[test]
    fn test_page_size_is_clamped(ctx: &mut DataTestContext) {
        let options = ManagerOptions {
            per_page: 2,
            max_per_page: 5,
            timezone: None,
        };
        let manager = ctx.manager().with_options(options);
        for i in 0..7 {
            store_phone(&manager, &format!("+6281110{:02}", i));
        }

        let default_page = manager.use_schema("Phone").unwrap().paginate(None).unwrap();
        assert_eq!(default_page.data.len(), 2);

        let request = PaginateRequest::new().per_page(50);
        let page = manager.use_schema("Phone").unwrap().paginate(Some(&request)).unwrap();
        assert_eq!(page.meta.per_page, 5);
        assert_eq!(page.data.len(), 5);
    }

    #[test_context(DataTestContext)]
    #[test]
    fn test_merged_filters_match_union(ctx: &mut DataTestContext) {
        let manager = ctx.manager();
        let phones = manager.use_schema("Phone").unwrap();
        phones.store(obj(json!({"phone": "+628111111", "props": {"city": "Jakarta"}}))).unwrap();
        phones.store(obj(json!({"phone": "+628111222", "props": {"city": "Bandung"}}))).unwrap();
        phones.store(obj(json!({"phone": "+658111333", "props": {"city": "Jakarta"}}))).unwrap();

        let f1 = obj(json!({"phone": "+628"}));
        let f2 = obj(json!({"props.city": "Jakarta"}));
        let mut union = f1.clone();
        union.extend(f2.clone());

        let merged = manager.use_schema("Phone").unwrap().conditionals(f1).prepare_list(Some(f2.into())).unwrap();
        let single = manager.use_schema("Phone").unwrap().conditionals(union).prepare_list(None).unwrap();

        assert_eq!(merged.len(), 1);
        assert_eq!(merged, single);
    }

    #[test_context(DataTestContext)]
    #[test]
    fn test_or_logic_and_exact_matching(ctx: &mut DataTestContext) {
        let manager = ctx.manager();
        let phones = manager.use_schema("Phone").unwrap();
        phones.store(obj(json!({"phone": "+628111111"}))).unwrap();
        phones.store(obj(json!({"phone": "+628222222", "props": {"city": "Bandung"}}))).unwrap();
        phones.store(obj(json!({"phone": "+628333333"}))).unwrap();

        let either = manager
            .use_schema("Phone")
            .unwrap()
            .set_param_logic(Logic::Or, true, Vec::new())
            .conditionals(obj(json!({"phone": "111111", "props.city": "Bandung"})))
            .list()
            .unwrap();
        assert_eq!(either.len(), 2);

        let exact = manager
            .use_schema("Phone")
            .unwrap()
            .set_param_logic(Logic::And, false, Vec::new())
            .conditionals(obj(json!({"phone": "111111"})))
            .list()
            .unwrap();
        assert!(exact.is_empty());

        let ignored = manager
            .use_schema("Phone")
            .unwrap()
            .set_param_logic(Logic::And, true, vec![ParamOption::Ignore("page".into())])
            .conditionals(obj(json!({"phone": "+628", "page": 3})))
            .list()
            .unwrap();
        assert_eq!(ignored.len(), 3);
    }

    #[test_context(DataTestContext)]
    #[test]
    fn test_like_filters_match_wildcards_literally(ctx: &mut DataTestContext) {
        let manager = ctx.manager();
        let summaries = manager.use_schema("ReportSummary").unwrap();
        for title in ["100% done", "1000 done", "a_b", "axb"] {
            summaries.store(obj(json!({"title": title}))).unwrap();
        }

        let titles = |filters: Value| -> Vec<Value> {
            manager
                .use_schema("ReportSummary")
                .unwrap()
                .prepare_list(Some(obj(filters).into()))
                .unwrap()
                .iter()
                .filter_map(|record| record.get("title"))
                .collect()
        };
        assert_eq!(titles(json!({"title": "100%"})), vec![json!("100% done")]);
        assert_eq!(titles(json!({"title": "a_b"})), vec![json!("a_b")]);
        assert_eq!(titles(json!({"title": {"op": "like", "value": "a_b"}})).len(), 2);
    }

    #[test_context(DataTestContext)]
    #[test]
    fn test_filter_operators(ctx: &mut DataTestContext) {
        let manager = ctx.manager();
        let summaries = manager.use_schema("ReportSummary").unwrap();
        for (title, total) in [("Jan", 10.0), ("Feb", 20.0), ("Mar", 30.0)] {
            summaries.store(obj(json!({"title": title, "total": total}))).unwrap();
        }

        let count = |filters: Value| manager.use_schema("ReportSummary").unwrap().count(Some(obj(filters).into())).unwrap();
        assert_eq!(count(json!({"total": {"op": ">=", "value": 20.0}})), 2);
        assert_eq!(count(json!({"title": ["Jan", "Mar"]})), 2);
        assert_eq!(count(json!({"or": {"title": "Jan", "total": {"op": "gt", "value": 25.0}}})), 2);
        assert_eq!(count(json!({"period_start": null})), 3);

        let err = manager
            .use_schema("ReportSummary")
            .unwrap()
            .count(Some(obj(json!({"owner": "x"})).into()))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test_context(DataTestContext)]
    #[test]
    fn test_update_by_id_and_by_conditionals(ctx: &mut DataTestContext) {
        let manager = ctx.manager();
        let phones = manager.use_schema("Phone").unwrap();
        let created = phones.prepare_store(obj(json!({"phone": "+628123456", "props": {"a": 1}}))).unwrap();

        let updated = phones
            .prepare_update(obj(json!({"id": created.id, "verified_at": "2025-01-15T10:00:00Z", "props": {"b": 2}})))
            .unwrap();
        assert_eq!(updated.get("verified_at"), Some(json!("2025-01-15T10:00:00Z")));
        assert_eq!(updated.props, Some(obj(json!({"a": 1, "b": 2}))));
        assert!(updated.updated_at >= created.updated_at);
        assert_eq!(updated.created_at, created.created_at);

        let by_filter = manager
            .use_schema("Phone")
            .unwrap()
            .conditionals(obj(json!({"phone": "+628123456"})))
            .prepare_update(obj(json!({"phone": "+628999999"})))
            .unwrap();
        assert_eq!(by_filter.id, created.id);
        assert_eq!(by_filter.get("phone"), Some(json!("+628999999")));

        let err = manager.use_schema("Phone").unwrap().update(obj(json!({"phone": "+628000000"}))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = manager.use_schema("Phone").unwrap().update(obj(json!({"id": "missing", "phone": "+628000000"}))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = manager.use_schema("Phone").unwrap().update(obj(json!({"id": created.id, "phone": null}))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test_context(DataTestContext)]
    #[test]
    fn test_update_or_create_twice(ctx: &mut DataTestContext) {
        let manager = ctx.manager();
        let encodings = manager.use_schema("Encoding").unwrap();

        let first = encodings
            .update_or_create(obj(json!({"name": "KOI8-R"})), obj(json!({"label": "first"})))
            .unwrap();
        let second = encodings
            .update_or_create(obj(json!({"name": "koi8-r"})), obj(json!({"label": "second"})))
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.get("label"), Some(json!("second")));
        assert_eq!(second.get("is_default"), Some(json!(false)));

        let matching = manager
            .use_schema("Encoding")
            .unwrap()
            .set_param_logic(Logic::And, false, Vec::new())
            .count(Some(obj(json!({"name": "KOI8-R"})).into()))
            .unwrap();
        assert_eq!(matching, 1);

        assert!(encodings.update_or_create(Map::new(), obj(json!({"label": "x"}))).is_err());
    }

    #[test_context(DataTestContext)]
    #[test]
    fn test_store_multiple_is_atomic(ctx: &mut DataTestContext) {
        let manager = ctx.manager();
        let phones = manager.use_schema("Phone").unwrap();

        let err = phones
            .store_multiple(vec![obj(json!({"phone": "+628111111"})), obj(json!({"phone": "12"}))])
            .unwrap_err();
        let DataError::Validation { errors, .. } = err else { panic!("expected validation error") };
        assert!(errors.get("1.phone").is_some());
        assert_eq!(phones.count(None).unwrap(), 0);

        let err = phones
            .store_multiple(vec![obj(json!({"id": "dup", "phone": "+628111111"})), obj(json!({"id": "dup", "phone": "+628222222"}))])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Storage);
        assert_eq!(phones.with_trashed().count(None).unwrap(), 0);

        let stored = manager
            .use_schema("Phone")
            .unwrap()
            .store_multiple(vec![obj(json!({"phone": "+628111111"})), obj(json!({"phone": "+628222222"}))])
            .unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].as_object().unwrap().len(), 4);
        assert_eq!(manager.use_schema("Phone").unwrap().count(None).unwrap(), 2);
    }

    #[test_context(DataTestContext)]
    #[test]
    fn test_unknown_entity(ctx: &mut DataTestContext) {
        let manager = ctx.manager();
        let err = manager.use_schema("Invoice").err().unwrap();
        assert!(matches!(err, DataError::UnknownEntity(ref name) if name == "Invoice"));
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(err.to_string(), "entity not found: Invoice");
    }

    #[test_context(DataTestContext)]
    #[test]
    fn test_resolver_accessors(ctx: &mut DataTestContext) {
        let manager = ctx.manager();
        let entity = manager.use_schema("ReportSummary").unwrap();
        assert_eq!(entity.name(), "ReportSummary");
        assert_eq!(entity.get_class(), "report_summaries");
        assert_eq!(entity.get_model(false).unwrap().name(), "ReportSummary");
        assert_eq!(entity.get_model(true).unwrap().table(), "report_summaries");
        assert_eq!(entity.fork("Phone").unwrap().get_class(), "phones");
    }

    #[test_context(DataTestContext)]
    #[test]
    fn test_contexts_do_not_share_conditionals(ctx: &mut DataTestContext) {
        let manager = ctx.manager();
        store_phone(&manager, "+628111111");
        store_phone(&manager, "+628222222");

        let filtered = manager.use_schema("Phone").unwrap().conditionals(obj(json!({"phone": "111111"})));
        let unfiltered = manager.use_schema("Phone").unwrap();

        assert_eq!(filtered.list().unwrap().len(), 1);
        assert_eq!(unfiltered.list().unwrap().len(), 2);
    }

    #[test_context(DataTestContext)]
    #[test]
    fn test_timestamps_use_display_timezone(ctx: &mut DataTestContext) {
        let options = ManagerOptions {
            timezone: parse_offset("+07:00"),
            ..ManagerOptions::default()
        };
        let manager = ctx.manager().with_options(options);
        let id = store_phone(&manager, "+628123");

        let shown = manager.use_schema("Phone").unwrap().show(Some(&id)).unwrap();
        assert!(shown["created_at"].as_str().unwrap().ends_with("+07:00"));

        let raw = manager.use_schema("Phone").unwrap().prepare_show(Some(&id), None).unwrap();
        assert!(raw.created_at.unwrap().ends_with('Z'));
    }

    #[test_context(DataTestContext)]
    #[test]
    fn test_export_jobs_match_status_exactly(ctx: &mut DataTestContext) {
        let manager = ctx.manager();
        let jobs = manager.use_schema("ExportJob").unwrap();
        jobs.store(obj(json!({"export_type": "csv", "status": "failed"}))).unwrap();
        jobs.store(obj(json!({"export_type": "csv"}))).unwrap();

        let failed = manager.use_schema("ExportJob").unwrap().conditionals(obj(json!({"status": "FAILED"}))).list().unwrap();
        assert_eq!(failed.len(), 1);
        let partial = manager.use_schema("ExportJob").unwrap().conditionals(obj(json!({"status": "FAIL"}))).list().unwrap();
        assert!(partial.is_empty());

        let err = jobs.store(obj(json!({"export_type": "csv", "status": "DONE"}))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
