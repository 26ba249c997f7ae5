use crate::libs::error::FieldErrors;
use crate::libs::record::Record;
use crate::libs::resource::{ResourceError, ResourceTransformer};
use crate::libs::schema::{Column, InputMode, Schema};
use serde_json::{json, Map, Value};
use std::sync::Arc;

const COLUMNS: &[Column] = &[Column::text("phone").required(), Column::timestamp("verified_at")];

pub struct Phone;

pub fn factory() -> Arc<dyn Schema> {
    Arc::new(Phone)
}

impl Schema for Phone {
    fn name(&self) -> &'static str {
        "Phone"
    }

    fn table(&self) -> &'static str {
        "phones"
    }

    fn columns(&self) -> &'static [Column] {
        COLUMNS
    }

    fn prepare_input(&self, input: &mut Map<String, Value>, _mode: InputMode) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if let Some(Value::String(raw)) = input.get("phone") {
            let phone = normalize_phone(raw);
            if !is_valid_phone(&phone) {
                errors.add("phone", "must be + followed by 6 to 15 digits");
            }
            input.insert("phone".into(), Value::String(phone));
        }
        errors
    }

    fn resource(&self) -> Box<dyn ResourceTransformer> {
        Box::new(PhoneResource)
    }
}

/// Strips spaces, dashes and parentheses.
pub fn normalize_phone(raw: &str) -> String {
    raw.chars().filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '.')).collect()
}

pub fn is_valid_phone(phone: &str) -> bool {
    match phone.strip_prefix('+') {
        Some(digits) => (6..=15).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

pub struct PhoneResource;

impl ResourceTransformer for PhoneResource {
    fn transform(&self, record: &Record) -> Result<Value, ResourceError> {
        let phone = record.get("phone").ok_or_else(|| ResourceError::MissingField("phone".into()))?;
        Ok(json!({
            "id": record.id,
            "phone": phone,
            "created_at": record.created_at,
            "verified_at": record.get("verified_at").unwrap_or(Value::Null),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_format() {
        assert_eq!(normalize_phone("+62 812-3456"), "+628123456");
        assert!(is_valid_phone("+628123"));
        assert!(!is_valid_phone("628123"));
        assert!(!is_valid_phone("+12345"));
        assert!(!is_valid_phone("+1234567890123456"));
        assert!(!is_valid_phone("+62a123"));
    }

    #[test]
    fn invalid_phone_is_reported() {
        let mut input = Map::new();
        input.insert("phone".into(), Value::from("12"));
        let errors = Phone.prepare_input(&mut input, InputMode::Create);
        assert!(errors.get("phone").is_some());
    }

    #[test]
    fn resource_shape() {
        let mut record = Record::new("01J");
        record.attributes.insert("phone".into(), Value::from("+628123"));
        record.attributes.insert("verified_at".into(), Value::Null);
        record.created_at = Some("2025-01-01T00:00:00Z".into());

        let value = PhoneResource.transform(&record).unwrap();
        assert_eq!(
            value,
            json!({"id": "01J", "phone": "+628123", "created_at": "2025-01-01T00:00:00Z", "verified_at": null})
        );
    }
}
