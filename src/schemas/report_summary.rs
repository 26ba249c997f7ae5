use crate::libs::error::FieldErrors;
use crate::libs::record::Record;
use crate::libs::resource::{ResourceError, ResourceTransformer};
use crate::libs::schema::{Column, InputMode, Relation, RelationKind, Schema};
use serde_json::{Map, Value};
use std::sync::Arc;

const COLUMNS: &[Column] = &[
    Column::text("title").required(),
    Column::timestamp("period_start"),
    Column::timestamp("period_end"),
    Column::real("total"),
    Column::real("previous_total"),
    Column::text("timezone_id"),
];

const RELATIONS: &[Relation] = &[Relation {
    name: "timezone",
    entity: "Timezone",
    kind: RelationKind::BelongsTo { foreign_key: "timezone_id" },
}];

/// Aggregated totals for a reporting period.
pub struct ReportSummary;

pub fn factory() -> Arc<dyn Schema> {
    Arc::new(ReportSummary)
}

impl Schema for ReportSummary {
    fn name(&self) -> &'static str {
        "ReportSummary"
    }

    fn table(&self) -> &'static str {
        "report_summaries"
    }

    fn columns(&self) -> &'static [Column] {
        COLUMNS
    }

    fn relations(&self) -> &'static [Relation] {
        RELATIONS
    }

    fn eager_load(&self) -> &'static [&'static str] {
        &["timezone"]
    }

    fn prepare_input(&self, input: &mut Map<String, Value>, _mode: InputMode) -> FieldErrors {
        let mut errors = FieldErrors::new();
        // Both bounds use the same format, so text order is time order.
        if let (Some(Value::String(start)), Some(Value::String(end))) = (input.get("period_start"), input.get("period_end")) {
            if start.len() == end.len() && start > end {
                errors.add("period_end", "must not be before period_start");
            }
        }
        errors
    }

    fn resource(&self) -> Box<dyn ResourceTransformer> {
        Box::new(ReportSummaryResource)
    }
}

/// Adds the change against the previous period to the stored fields.
pub struct ReportSummaryResource;

impl ResourceTransformer for ReportSummaryResource {
    fn transform(&self, record: &Record) -> Result<Value, ResourceError> {
        let mut value = record.to_value();
        let change = match (number(record, "total")?, number(record, "previous_total")?) {
            (Some(total), Some(previous)) if previous != 0.0 => Value::from(((total - previous) / previous * 10000.0).round() / 100.0),
            _ => Value::Null,
        };
        if let Value::Object(object) = &mut value {
            object.insert("change_percent".into(), change);
        }
        Ok(value)
    }
}

fn number(record: &Record, field: &str) -> Result<Option<f64>, ResourceError> {
    match record.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => Ok(number.as_f64()),
        Some(other) => Err(ResourceError::Invalid {
            field: field.to_string(),
            reason: format!("expected a number, got {}", other),
        }),
    }
}
