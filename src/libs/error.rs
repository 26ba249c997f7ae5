//! Error taxonomy for the data management layer.
//!
//! Every orchestrator operation returns [`DataResult`]. Errors are surfaced to
//! the caller unmodified; the only local recovery lives in
//! [`crate::libs::resource`], where presentation failures degrade to the raw
//! record.

use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

pub type DataResult<T> = Result<T, DataError>;

/// Field-level validation messages keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn extend(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    /// Converts collected messages into a validation error, or `Ok` when empty.
    pub fn into_result(self, entity: &str) -> DataResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(DataError::Validation {
                entity: entity.to_string(),
                errors: self,
            })
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|(field, messages)| format!("{}: {}", field, messages.join(", "))).collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Storage operation that failed, carried by [`DataError::Storage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Count,
    Show,
    Store,
    Update,
    Delete,
    Restore,
    Transaction,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::List => "list",
            Operation::Count => "count",
            Operation::Show => "show",
            Operation::Store => "store",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::Restore => "restore",
            Operation::Transaction => "transaction",
        };
        f.write_str(name)
    }
}

/// Coarse classification used by callers that map errors to exit codes or
/// response statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Storage,
    Configuration,
}

#[derive(Debug, Error)]
pub enum DataError {
    #[error("{entity} record not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("invalid {entity} input: {errors}")]
    Validation { entity: String, errors: FieldErrors },

    #[error("{entity} {operation} failed: {source}")]
    Storage {
        entity: String,
        operation: Operation,
        #[source]
        source: rusqlite::Error,
    },

    #[error("entity not found: {0}")]
    UnknownEntity(String),

    #[error("{entity} has no relation named {relation}")]
    UnknownRelation { entity: String, relation: String },

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl DataError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DataError::NotFound { .. } => ErrorKind::NotFound,
            DataError::Validation { .. } => ErrorKind::Validation,
            DataError::Storage { .. } => ErrorKind::Storage,
            DataError::UnknownEntity(_) | DataError::UnknownRelation { .. } | DataError::Configuration(_) => ErrorKind::Configuration,
        }
    }

    pub fn storage(entity: &str, operation: Operation) -> impl FnOnce(rusqlite::Error) -> DataError + '_ {
        move |source| DataError::Storage {
            entity: entity.to_string(),
            operation,
            source,
        }
    }

    pub fn invalid(entity: &str, field: &str, message: impl Into<String>) -> DataError {
        let mut errors = FieldErrors::new();
        errors.add(field, message);
        DataError::Validation {
            entity: entity.to_string(),
            errors,
        }
    }

    pub fn not_found(entity: &str, id: impl Into<String>) -> DataError {
        DataError::NotFound {
            entity: entity.to_string(),
            id: id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_errors_collect_per_field() {
        let mut errors = FieldErrors::new();
        errors.add("phone", "is required");
        errors.add("phone", "must start with +");
        errors.add("name", "is required");

        assert_eq!(errors.get("phone").map(|m| m.len()), Some(2));
        assert_eq!(errors.to_string(), "name: is required; phone: is required, must start with +");
        assert!(errors.into_result("Phone").is_err());
    }

    #[test]
    fn unknown_entity_is_configuration_class() {
        let err = DataError::UnknownEntity("Invoice".into());
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(err.to_string(), "entity not found: Invoice");
    }
}
