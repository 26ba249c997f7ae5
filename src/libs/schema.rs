//! Schema contract implemented by every managed entity.
//!
//! A schema describes its backing table, its columns, which relations can be
//! eager-loaded, and the hooks the orchestrator calls around queries and
//! mutations. Schemas are stateless; the registry hands out shared handles.

use super::condition::{Conditionals, ParamLogic};
use super::error::FieldErrors;
use super::resource::{DefaultResource, ResourceTransformer};
use serde_json::{Map, Value};

/// Storage type of a declared column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
    Real,
    Boolean,
    Timestamp,
    Json,
}

impl ColumnKind {
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnKind::Text | ColumnKind::Timestamp | ColumnKind::Json => "TEXT",
            ColumnKind::Integer | ColumnKind::Boolean => "INTEGER",
            ColumnKind::Real => "REAL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub required: bool,
}

impl Column {
    pub const fn new(name: &'static str, kind: ColumnKind) -> Self {
        Self { name, kind, required: false }
    }

    pub const fn text(name: &'static str) -> Self {
        Self::new(name, ColumnKind::Text)
    }

    pub const fn integer(name: &'static str) -> Self {
        Self::new(name, ColumnKind::Integer)
    }

    pub const fn real(name: &'static str) -> Self {
        Self::new(name, ColumnKind::Real)
    }

    pub const fn boolean(name: &'static str) -> Self {
        Self::new(name, ColumnKind::Boolean)
    }

    pub const fn timestamp(name: &'static str) -> Self {
        Self::new(name, ColumnKind::Timestamp)
    }

    pub const fn json(name: &'static str) -> Self {
        Self::new(name, ColumnKind::Json)
    }

    pub const fn required(self) -> Self {
        Self { required: true, ..self }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// The parent row holds `foreign_key` pointing at the target id.
    BelongsTo { foreign_key: &'static str },
    /// Target rows hold `foreign_key` pointing at the parent id.
    HasMany { foreign_key: &'static str },
    /// The parent row names the target entity in `type_column` and its id in
    /// `id_column`. The relation's `entity` is ignored.
    MorphTo {
        type_column: &'static str,
        id_column: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
    pub name: &'static str,
    pub entity: &'static str,
    pub kind: RelationKind,
}

/// Default query shaping applied when a schema is selected.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    pub conditionals: Conditionals,
    pub param_logic: Option<ParamLogic>,
    pub with: Vec<String>,
}

/// Whether the input is for a new record or a change to an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Create,
    Update,
}

pub trait Schema: Send + Sync {
    /// Logical entity name used for registry lookups and error messages.
    fn name(&self) -> &'static str;

    fn table(&self) -> &'static str;

    fn columns(&self) -> &'static [Column];

    fn soft_deletes(&self) -> bool {
        true
    }

    fn has_props(&self) -> bool {
        true
    }

    fn relations(&self) -> &'static [Relation] {
        &[]
    }

    /// Relations loaded on every query of this entity.
    fn eager_load(&self) -> &'static [&'static str] {
        &[]
    }

    /// Called once when the schema is selected for an orchestration context.
    fn booting(&self, _scope: &mut Scope) {}

    /// Entity-specific input normalization and validation, run before the
    /// generic column checks.
    fn prepare_input(&self, _input: &mut Map<String, Value>, _mode: InputMode) -> FieldErrors {
        FieldErrors::new()
    }

    fn resource(&self) -> Box<dyn ResourceTransformer> {
        Box::new(DefaultResource)
    }

    fn column(&self, name: &str) -> Option<&'static Column> {
        self.columns().iter().find(|column| column.name == name)
    }

    fn relation(&self, name: &str) -> Option<&'static Relation> {
        self.relations().iter().find(|relation| relation.name == name)
    }
}
