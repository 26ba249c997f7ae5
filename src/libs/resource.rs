//! Presentation of records.
//!
//! A [`ResourceTransformer`] maps a stored [`Record`] to the JSON shape handed
//! back to callers. The [`Presenter`] runs the transformer and then normalizes
//! audit timestamps into the configured display offset. Presentation never
//! fails a response: a transformer error or an unparseable timestamp is logged
//! and the unnormalized value is returned instead.

use super::record::Record;
use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("missing field `{0}`")]
    MissingField(String),
    #[error("cannot present `{field}`: {reason}")]
    Invalid { field: String, reason: String },
}

pub trait ResourceTransformer: Send + Sync {
    fn transform(&self, record: &Record) -> Result<Value, ResourceError>;
}

/// Emits every stored field, props and loaded relations.
pub struct DefaultResource;

impl ResourceTransformer for DefaultResource {
    fn transform(&self, record: &Record) -> Result<Value, ResourceError> {
        Ok(record.to_value())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Presenter {
    timezone: Option<FixedOffset>,
}

impl Presenter {
    pub fn new(timezone: Option<FixedOffset>) -> Self {
        Self { timezone }
    }

    pub fn timezone(&self) -> Option<FixedOffset> {
        self.timezone
    }

    pub fn present(&self, entity: &str, transformer: &dyn ResourceTransformer, record: &Record) -> Value {
        let value = match transformer.transform(record) {
            Ok(value) => value,
            Err(err) => {
                warn!(entity, id = %record.id, error = %err, "resource transform failed, returning raw record");
                record.to_value()
            }
        };
        self.normalize(entity, value)
    }

    pub fn present_all(&self, entity: &str, transformer: &dyn ResourceTransformer, records: &[Record]) -> Vec<Value> {
        records.iter().map(|record| self.present(entity, transformer, record)).collect()
    }

    fn normalize(&self, entity: &str, value: Value) -> Value {
        let Some(offset) = self.timezone else {
            return value;
        };
        let Value::Object(mut object) = value else {
            return value;
        };

        for (key, field) in object.iter_mut() {
            if !key.ends_with("_at") {
                continue;
            }
            let Value::String(raw) = field else {
                continue;
            };
            let raw = raw.clone();
            match localize(&raw, offset) {
                Ok(local) => *field = Value::String(local),
                Err(reason) => {
                    warn!(entity, field = %key, value = %raw, %reason, "leaving timestamp unnormalized");
                }
            }
        }

        Value::Object(object)
    }
}

fn localize(raw: &str, offset: FixedOffset) -> Result<String, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|moment| moment.with_timezone(&offset).to_rfc3339_opts(SecondsFormat::Secs, false))
        .map_err(|err| err.to_string())
}

/// Parses `Z`, `UTC`, `+07:00`, `-0530` or `+7` into a fixed offset.
pub fn parse_offset(value: &str) -> Option<FixedOffset> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("z") || value.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0);
    }

    let (sign, rest) = match *value.as_bytes().first()? {
        b'+' => (1, &value[1..]),
        b'-' => (-1, &value[1..]),
        _ => return None,
    };
    if !rest.is_ascii() {
        return None;
    }
    let (hours, minutes) = match rest.split_once(':') {
        Some((hours, minutes)) => (hours, minutes),
        None if rest.len() == 4 => rest.split_at(2),
        None => (rest, "0"),
    };
    if hours.is_empty() || !hours.chars().all(|c| c.is_ascii_digit()) || !minutes.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 14 || minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
