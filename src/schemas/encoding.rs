use crate::libs::error::FieldErrors;
use crate::libs::schema::{Column, InputMode, Schema};
use serde_json::{Map, Value};
use std::sync::Arc;

const COLUMNS: &[Column] = &[Column::text("name").required(), Column::text("label"), Column::boolean("is_default")];

/// Character encodings offered for exported files.
pub struct Encoding;

pub fn factory() -> Arc<dyn Schema> {
    Arc::new(Encoding)
}

impl Schema for Encoding {
    fn name(&self) -> &'static str {
        "Encoding"
    }

    fn table(&self) -> &'static str {
        "encodings"
    }

    fn columns(&self) -> &'static [Column] {
        COLUMNS
    }

    fn prepare_input(&self, input: &mut Map<String, Value>, mode: InputMode) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if let Some(Value::String(name)) = input.get("name") {
            let name = name.trim().to_uppercase();
            if name.is_empty() {
                errors.add("name", "cannot be empty");
            }
            input.insert("name".into(), Value::String(name));
        }
        if mode == InputMode::Create && !input.contains_key("is_default") {
            input.insert("is_default".into(), Value::Bool(false));
        }
        errors
    }
}
