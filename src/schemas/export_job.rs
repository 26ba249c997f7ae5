//! Export job bookkeeping.
//!
//! A job row is created `PENDING` before any file is written, moves to
//! `PROCESSING`, and ends `COMPLETED` with a file path or `FAILED` with an
//! error message. `reference_type`/`reference_id` optionally point at the
//! record the export was produced for.

use crate::libs::condition::{ParamLogic, ParamOption};
use crate::libs::error::FieldErrors;
use crate::libs::schema::{Column, InputMode, Relation, RelationKind, Schema, Scope};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

const COLUMNS: &[Column] = &[
    Column::text("user_id"),
    Column::text("export_type").required(),
    Column::text("reference_type"),
    Column::text("reference_id"),
    Column::text("status").required(),
    Column::text("file_path"),
    Column::text("file_name"),
    Column::text("error_message"),
    Column::json("metadata"),
    Column::timestamp("expires_at"),
];

const RELATIONS: &[Relation] = &[Relation {
    name: "reference",
    entity: "",
    kind: RelationKind::MorphTo {
        type_column: "reference_type",
        id_column: "reference_id",
    },
}];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl ExportStatus {
    pub const ALL: [ExportStatus; 4] = [ExportStatus::Pending, ExportStatus::Processing, ExportStatus::Completed, ExportStatus::Failed];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportStatus::Pending => "PENDING",
            ExportStatus::Processing => "PROCESSING",
            ExportStatus::Completed => "COMPLETED",
            ExportStatus::Failed => "FAILED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

impl fmt::Display for ExportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct ExportJob;

pub fn factory() -> Arc<dyn Schema> {
    Arc::new(ExportJob)
}

impl Schema for ExportJob {
    fn name(&self) -> &'static str {
        "ExportJob"
    }

    fn table(&self) -> &'static str {
        "export_jobs"
    }

    fn columns(&self) -> &'static [Column] {
        COLUMNS
    }

    fn has_props(&self) -> bool {
        false
    }

    fn relations(&self) -> &'static [Relation] {
        RELATIONS
    }

    fn booting(&self, scope: &mut Scope) {
        let mut logic = ParamLogic::default();
        logic.extra_options.push(ParamOption::Exact("status".into()));
        logic.extra_options.push(ParamOption::Exact("export_type".into()));
        scope.param_logic = Some(logic);
    }

    fn prepare_input(&self, input: &mut Map<String, Value>, mode: InputMode) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if mode == InputMode::Create && !input.contains_key("status") {
            input.insert("status".into(), Value::from(ExportStatus::Pending.as_str()));
        }
        if let Some(Value::String(status)) = input.get("status") {
            match ExportStatus::parse(status) {
                Some(status) => {
                    input.insert("status".into(), Value::from(status.as_str()));
                }
                None => errors.add("status", "must be one of PENDING, PROCESSING, COMPLETED, FAILED"),
            }
        }

        if let Some(metadata) = input.get("metadata") {
            if !metadata.is_null() && !metadata.is_object() {
                errors.add("metadata", "must be an object");
            }
        }

        let has_type = input.get("reference_type").is_some_and(|value| !value.is_null());
        let has_id = input.get("reference_id").is_some_and(|value| !value.is_null());
        if has_type != has_id {
            errors.add("reference_id", "reference_type and reference_id must be given together");
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parsing() {
        assert_eq!(ExportStatus::parse("completed"), Some(ExportStatus::Completed));
        assert_eq!(ExportStatus::parse("DONE"), None);
    }

    #[test]
    fn new_jobs_default_to_pending() {
        let mut input = Map::new();
        input.insert("export_type".into(), Value::from("csv"));
        assert!(ExportJob.prepare_input(&mut input, InputMode::Create).is_empty());
        assert_eq!(input["status"], "PENDING");
    }

    #[test]
    fn reference_must_be_complete() {
        let mut input = Map::new();
        input.insert("reference_type".into(), Value::from("Phone"));
        let errors = ExportJob.prepare_input(&mut input, InputMode::Update);
        assert!(errors.get("reference_id").is_some());
    }
}
