use crate::libs::error::FieldErrors;
use crate::libs::resource::parse_offset;
use crate::libs::schema::{Column, InputMode, Relation, RelationKind, Schema};
use serde_json::{Map, Value};
use std::sync::Arc;

const COLUMNS: &[Column] = &[Column::text("name").required(), Column::text("utc_offset").required()];

const RELATIONS: &[Relation] = &[Relation {
    name: "report_summaries",
    entity: "ReportSummary",
    kind: RelationKind::HasMany { foreign_key: "timezone_id" },
}];

pub struct Timezone;

pub fn factory() -> Arc<dyn Schema> {
    Arc::new(Timezone)
}

impl Schema for Timezone {
    fn name(&self) -> &'static str {
        "Timezone"
    }

    fn table(&self) -> &'static str {
        "timezones"
    }

    fn columns(&self) -> &'static [Column] {
        COLUMNS
    }

    fn soft_deletes(&self) -> bool {
        false
    }

    fn has_props(&self) -> bool {
        false
    }

    fn relations(&self) -> &'static [Relation] {
        RELATIONS
    }

    fn prepare_input(&self, input: &mut Map<String, Value>, _mode: InputMode) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if let Some(Value::String(offset)) = input.get("utc_offset") {
            match parse_offset(offset) {
                Some(parsed) => {
                    input.insert("utc_offset".into(), Value::String(parsed.to_string()));
                }
                None => errors.add("utc_offset", "must be an offset like +07:00"),
            }
        }
        errors
    }
}
