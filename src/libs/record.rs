use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Eager-loaded relation payload attached to a record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Related {
    One(Option<Box<Record>>),
    Many(Vec<Record>),
}

/// One persisted row of an entity.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    pub id: String,
    pub attributes: Map<String, Value>,
    pub props: Option<Map<String, Value>>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub deleted_at: Option<String>,
    pub relations: BTreeMap<String, Related>,
}

impl Record {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Looks up a field the same way filters address it: `id`, audit
    /// timestamps, declared attributes, or `props.<key>`.
    pub fn get(&self, field: &str) -> Option<Value> {
        match field {
            "id" => Some(Value::String(self.id.clone())),
            "created_at" => self.created_at.clone().map(Value::String),
            "updated_at" => self.updated_at.clone().map(Value::String),
            "deleted_at" => self.deleted_at.clone().map(Value::String),
            _ => match field.strip_prefix("props.") {
                Some(key) => self.props.as_ref().and_then(|props| props.get(key)).cloned(),
                None => self.attributes.get(field).cloned(),
            },
        }
    }

    pub fn is_trashed(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Flat JSON view of the row: id, attributes, props, timestamps, relations.
    pub fn to_value(&self) -> Value {
        let mut object = Map::new();
        object.insert("id".into(), Value::String(self.id.clone()));
        for (key, value) in &self.attributes {
            object.insert(key.clone(), value.clone());
        }
        if let Some(props) = &self.props {
            object.insert("props".into(), Value::Object(props.clone()));
        }
        if let Some(created_at) = &self.created_at {
            object.insert("created_at".into(), Value::String(created_at.clone()));
        }
        if let Some(updated_at) = &self.updated_at {
            object.insert("updated_at".into(), Value::String(updated_at.clone()));
        }
        if let Some(deleted_at) = &self.deleted_at {
            object.insert("deleted_at".into(), Value::String(deleted_at.clone()));
        }
        for (name, related) in &self.relations {
            let value = match related {
                Related::One(Some(record)) => record.to_value(),
                Related::One(None) => Value::Null,
                Related::Many(records) => Value::Array(records.iter().map(Record::to_value).collect()),
            };
            object.insert(name.clone(), value);
        }
        Value::Object(object)
    }
}

impl Serialize for Record {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

/// Audit timestamp for the current instant, UTC with microseconds.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}
