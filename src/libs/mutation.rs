//! Write side of the orchestrator: store, update, delete, restore and
//! update-or-create.
//!
//! Each call walks `Start → Prepared → Persisted → Transformed → Done`; any
//! error moves it to `Failed`. Multi-row writes run inside one SQLite
//! transaction, and resource transformation only happens after commit.

use super::condition::{Conditionals, Logic};
use super::error::{DataError, DataResult, FieldErrors, Operation};
use super::ids::next_id;
use super::manager::{ConditionInput, Entity};
use super::record::{now_timestamp, Record};
use super::schema::{Column, ColumnKind, InputMode};
use crate::db::records::{stored_value, Records, Select, Trashed};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rusqlite::Connection;
use serde_json::{Map, Value};
use tracing::{debug, info};

const MANAGED_FIELDS: [&str; 3] = ["created_at", "updated_at", "deleted_at"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationStage {
    Start,
    Prepared,
    Persisted,
    Transformed,
    Done,
    Failed,
}

impl MutationStage {
    pub fn is_terminal(self) -> bool {
        matches!(self, MutationStage::Done | MutationStage::Failed)
    }

    pub fn can_advance_to(self, next: MutationStage) -> bool {
        use MutationStage::*;
        match (self, next) {
            (Start, Prepared) | (Prepared, Persisted) | (Persisted, Transformed) | (Persisted, Done) | (Transformed, Done) => true,
            (stage, Failed) => !stage.is_terminal(),
            _ => false,
        }
    }
}

/// Tracks and logs the stage of one mutation call.
pub struct MutationTrace {
    entity: String,
    operation: Operation,
    stage: MutationStage,
}

impl MutationTrace {
    pub fn start(entity: &str, operation: Operation) -> Self {
        debug!(entity, %operation, "mutation started");
        Self {
            entity: entity.to_string(),
            operation,
            stage: MutationStage::Start,
        }
    }

    pub fn stage(&self) -> MutationStage {
        self.stage
    }

    pub fn advance(&mut self, next: MutationStage) {
        debug_assert!(self.stage.can_advance_to(next), "invalid mutation transition {:?} -> {:?}", self.stage, next);
        debug!(entity = %self.entity, operation = %self.operation, from = ?self.stage, to = ?next, "mutation stage");
        self.stage = next;
    }

    /// Moves to `Failed` when `result` is an error and passes it through.
    pub fn guard<T>(&mut self, result: DataResult<T>) -> DataResult<T> {
        if let Err(err) = &result {
            if !self.stage.is_terminal() {
                debug!(entity = %self.entity, operation = %self.operation, from = ?self.stage, error = %err, "mutation failed");
                self.stage = MutationStage::Failed;
            }
        }
        result
    }

    pub fn finish(&mut self) {
        self.advance(MutationStage::Done);
    }
}

impl<'m> Entity<'m> {
    pub fn prepare_store(&self, input: Map<String, Value>) -> DataResult<Record> {
        let mut trace = MutationTrace::start(self.name(), Operation::Store);
        let result = self.store_one(self.conn(), input, &mut trace);
        let record = trace.guard(result)?;
        trace.finish();
        Ok(record)
    }

    pub fn store(&self, input: Map<String, Value>) -> DataResult<Value> {
        let mut trace = MutationTrace::start(self.name(), Operation::Store);
        let result = self.store_one(self.conn(), input, &mut trace);
        let record = trace.guard(result)?;

        let value = self.present(&record);
        trace.advance(MutationStage::Transformed);
        trace.finish();
        Ok(value)
    }

    /// Validates every input, then inserts all rows in one transaction.
    /// Either every row is stored or none is.
    pub fn prepare_store_multiple(&self, inputs: Vec<Map<String, Value>>) -> DataResult<Vec<Record>> {
        let mut trace = MutationTrace::start(self.name(), Operation::Store);
        let result = self.store_many(inputs, &mut trace);
        let records = trace.guard(result)?;
        trace.finish();
        Ok(records)
    }

    pub fn store_multiple(&self, inputs: Vec<Map<String, Value>>) -> DataResult<Vec<Value>> {
        let mut trace = MutationTrace::start(self.name(), Operation::Store);
        let result = self.store_many(inputs, &mut trace);
        let records = trace.guard(result)?;

        let values = self.present_all(&records);
        trace.advance(MutationStage::Transformed);
        trace.finish();
        Ok(values)
    }

    /// Applies changed fields to the record named by `input.id`, or to the
    /// first record matching the stored conditionals.
    pub fn prepare_update(&self, input: Map<String, Value>) -> DataResult<Record> {
        let mut trace = MutationTrace::start(self.name(), Operation::Update);
        let result = self.update_target(input, &mut trace);
        let record = trace.guard(result)?;
        trace.finish();
        Ok(record)
    }

    pub fn update(&self, input: Map<String, Value>) -> DataResult<Value> {
        let mut trace = MutationTrace::start(self.name(), Operation::Update);
        let result = self.update_target(input, &mut trace);
        let record = trace.guard(result)?;

        let value = self.present(&record);
        trace.advance(MutationStage::Transformed);
        trace.finish();
        Ok(value)
    }

    /// Tombstones matching rows when the schema soft-deletes, removes them
    /// otherwise. Returns whether any row was affected.
    pub fn prepare_delete(&self, filters: Option<ConditionInput>) -> DataResult<bool> {
        let mut trace = MutationTrace::start(self.name(), Operation::Delete);
        let result = self.delete_matching(filters.as_ref(), &mut trace);
        let deleted = trace.guard(result)?;
        trace.finish();
        Ok(deleted)
    }

    pub fn delete(&self, filters: Option<ConditionInput>) -> DataResult<bool> {
        let deleted = self.prepare_delete(filters)?;
        info!(entity = self.name(), deleted, "delete finished");
        Ok(deleted)
    }

    pub fn delete_by_id(&self, id: &str) -> DataResult<bool> {
        self.delete(Some(ConditionInput::Built(Conditionals::and().where_eq("id", id))))
    }

    /// Clears tombstones on matching rows.
    pub fn restore(&self, filters: Option<ConditionInput>) -> DataResult<bool> {
        let mut trace = MutationTrace::start(self.name(), Operation::Restore);
        let result = self.restore_matching(filters.as_ref(), &mut trace);
        let restored = trace.guard(result)?;
        trace.finish();
        Ok(restored)
    }

    /// Finds the record whose fields equal `lookup` and updates it with
    /// `values`, or creates one from both maps. Runs in one transaction.
    pub fn update_or_create(&self, lookup: Map<String, Value>, values: Map<String, Value>) -> DataResult<Record> {
        let mut trace = MutationTrace::start(self.name(), Operation::Update);
        let result = self.upsert(lookup, values, &mut trace);
        let record = trace.guard(result)?;
        trace.finish();
        Ok(record)
    }

    fn store_one(&self, conn: &Connection, input: Map<String, Value>, trace: &mut MutationTrace) -> DataResult<Record> {
        let record = self.build_record(input)?;
        trace.advance(MutationStage::Prepared);

        Records::new(conn, self.schema()).insert(&record)?;
        trace.advance(MutationStage::Persisted);
        Ok(record)
    }

    fn store_many(&self, inputs: Vec<Map<String, Value>>, trace: &mut MutationTrace) -> DataResult<Vec<Record>> {
        let mut records = Vec::with_capacity(inputs.len());
        let mut errors = FieldErrors::new();
        for (index, input) in inputs.into_iter().enumerate() {
            match self.build_record(input) {
                Ok(record) => records.push(record),
                Err(DataError::Validation { errors: row_errors, .. }) => {
                    for field in row_errors.fields() {
                        for message in row_errors.get(field).unwrap_or_default() {
                            errors.add(format!("{}.{}", index, field), message.clone());
                        }
                    }
                }
                Err(err) => return Err(err),
            }
        }
        errors.into_result(self.name())?;
        trace.advance(MutationStage::Prepared);

        let tx = self.conn().unchecked_transaction().map_err(DataError::storage(self.schema().name(), Operation::Transaction))?;
        {
            let records_table = Records::new(&tx, self.schema());
            for record in &records {
                records_table.insert(record)?;
            }
        }
        tx.commit().map_err(DataError::storage(self.schema().name(), Operation::Transaction))?;
        trace.advance(MutationStage::Persisted);

        debug!(entity = self.name(), count = records.len(), "stored batch");
        Ok(records)
    }

    fn update_target(&self, input: Map<String, Value>, trace: &mut MutationTrace) -> DataResult<Record> {
        let existing = match input.get("id") {
            Some(Value::String(id)) => {
                let select = Select {
                    conditionals: self.scoped(Conditionals::and().where_eq("id", id.as_str())),
                    trashed: Trashed::Without,
                    limit: Some(1),
                    ..Default::default()
                };
                self.records()
                    .select(&select)?
                    .into_iter()
                    .next()
                    .ok_or_else(|| DataError::not_found(self.name(), id.clone()))?
            }
            Some(_) => return Err(DataError::invalid(self.name(), "id", "must be a string")),
            None => {
                let conditionals = self.merge_condition(None)?;
                if conditionals.is_empty() {
                    return Err(DataError::invalid(self.name(), "id", "is required to update without conditionals"));
                }
                let select = Select {
                    conditionals: self.query_conditionals(None)?,
                    trashed: Trashed::Without,
                    limit: Some(1),
                    ..Default::default()
                };
                self.records()
                    .select(&select)?
                    .into_iter()
                    .next()
                    .ok_or_else(|| DataError::not_found(self.name(), "matching conditionals"))?
            }
        };

        self.apply_update(self.conn(), existing, input, trace)
    }

    fn apply_update(&self, conn: &Connection, existing: Record, mut input: Map<String, Value>, trace: &mut MutationTrace) -> DataResult<Record> {
        let schema = self.schema();
        let mut errors = schema.prepare_input(&mut input, InputMode::Update);

        if let Some(Value::String(id)) = input.remove("id") {
            if id != existing.id {
                errors.add("id", "cannot be changed");
            }
        }

        let props = match input.remove("props") {
            None => None,
            Some(value) => self.check_props(value, &mut errors).map(|incoming| {
                let mut merged = existing.props.clone().unwrap_or_default();
                merged.extend(incoming);
                merged
            }),
        };

        let mut changes = Map::new();
        for (field, value) in input {
            let Some(column) = self.check_field(&field, &value, &mut errors) else {
                continue;
            };
            if column.required && value.is_null() {
                errors.add(field.as_str(), "is required");
                continue;
            }
            let value = stored_value(column.kind, value);
            if existing.attributes.get(&field) != Some(&value) {
                changes.insert(field, value);
            }
        }
        errors.into_result(self.name())?;
        trace.advance(MutationStage::Prepared);

        let props_changed = props.as_ref().is_some_and(|props| Some(props) != existing.props.as_ref());
        if changes.is_empty() && !props_changed {
            debug!(entity = self.name(), id = %existing.id, "nothing to update");
            trace.advance(MutationStage::Persisted);
            return Ok(existing);
        }

        let table = Records::new(conn, schema);
        table.update(&existing.id, &changes, props.as_ref(), &now_timestamp())?;
        let updated = table.find(&existing.id, Trashed::With)?.ok_or_else(|| DataError::not_found(self.name(), existing.id.clone()))?;
        trace.advance(MutationStage::Persisted);
        Ok(updated)
    }

    fn delete_matching(&self, filters: Option<&ConditionInput>, trace: &mut MutationTrace) -> DataResult<bool> {
        if self.merge_condition(filters)?.is_empty() {
            return Err(DataError::invalid(self.name(), "filters", "at least one condition is required to delete"));
        }
        let conditionals = self.query_conditionals(filters)?;
        trace.advance(MutationStage::Prepared);

        let affected = if self.schema().soft_deletes() {
            self.records().soft_delete(&conditionals, &now_timestamp())?
        } else {
            self.records().hard_delete(&conditionals)?
        };
        trace.advance(MutationStage::Persisted);

        debug!(entity = self.name(), affected, "delete applied");
        Ok(affected > 0)
    }

    fn restore_matching(&self, filters: Option<&ConditionInput>, trace: &mut MutationTrace) -> DataResult<bool> {
        if !self.schema().soft_deletes() {
            return Err(DataError::Configuration(format!("{} does not keep deleted records", self.name())));
        }
        if self.merge_condition(filters)?.is_empty() {
            return Err(DataError::invalid(self.name(), "filters", "at least one condition is required to restore"));
        }
        let conditionals = self.query_conditionals(filters)?;
        trace.advance(MutationStage::Prepared);

        let affected = self.records().restore(&conditionals, &now_timestamp())?;
        trace.advance(MutationStage::Persisted);
        Ok(affected > 0)
    }

    fn upsert(&self, lookup: Map<String, Value>, values: Map<String, Value>, trace: &mut MutationTrace) -> DataResult<Record> {
        if lookup.is_empty() {
            return Err(DataError::invalid(self.name(), "lookup", "at least one uniqueness field is required"));
        }

        // Match against values as they would be stored.
        let mut normalized = lookup.clone();
        let _ = self.schema().prepare_input(&mut normalized, InputMode::Update);
        let mut conditionals = Conditionals::new(Logic::And);
        for (field, value) in &lookup {
            let value = normalized.get(field).unwrap_or(value);
            conditionals = conditionals.where_eq(field.as_str(), value.clone());
        }

        let tx = self.conn().unchecked_transaction().map_err(DataError::storage(self.schema().name(), Operation::Transaction))?;
        let existing = Records::new(&tx, self.schema())
            .select(&Select {
                conditionals: self.scoped(conditionals),
                trashed: Trashed::Without,
                limit: Some(1),
                ..Default::default()
            })?
            .into_iter()
            .next();

        let record = match existing {
            Some(existing) => {
                debug!(entity = self.name(), id = %existing.id, "update_or_create matched");
                self.apply_update(&tx, existing, values, trace)?
            }
            None => {
                let mut input = lookup;
                input.extend(values);
                self.store_one(&tx, input, trace)?
            }
        };

        tx.commit().map_err(DataError::storage(self.schema().name(), Operation::Transaction))?;
        Ok(record)
    }

    /// Normalizes and validates create input into a record ready to insert.
    fn build_record(&self, mut input: Map<String, Value>) -> DataResult<Record> {
        let schema = self.schema();
        let mut errors = schema.prepare_input(&mut input, InputMode::Create);

        let id = match input.remove("id") {
            None | Some(Value::Null) => next_id(),
            Some(Value::String(id)) if !id.trim().is_empty() => id,
            Some(_) => {
                errors.add("id", "must be a non-empty string");
                String::new()
            }
        };

        let props = match input.remove("props") {
            None | Some(Value::Null) => None,
            Some(value) => self.check_props(value, &mut errors),
        };

        let mut attributes = Map::new();
        for (field, value) in input {
            if let Some(column) = self.check_field(&field, &value, &mut errors) {
                attributes.insert(field, stored_value(column.kind, value));
            }
        }

        for column in schema.columns() {
            let present = attributes.get(column.name).is_some_and(|value| !value.is_null());
            if column.required && !present {
                errors.add(column.name, "is required");
            }
            attributes.entry(column.name).or_insert(Value::Null);
        }
        errors.into_result(self.name())?;

        let now = now_timestamp();
        Ok(Record {
            id,
            attributes,
            props,
            created_at: Some(now.clone()),
            updated_at: Some(now),
            ..Default::default()
        })
    }

    fn check_props(&self, value: Value, errors: &mut FieldErrors) -> Option<Map<String, Value>> {
        if !self.schema().has_props() {
            errors.add("props", format!("is not a field of {}", self.name()));
            return None;
        }
        match value {
            Value::Object(props) => Some(props),
            _ => {
                errors.add("props", "must be an object");
                None
            }
        }
    }

    /// Returns the column for `field` when it exists and `value` fits it.
    fn check_field(&self, field: &str, value: &Value, errors: &mut FieldErrors) -> Option<&'static Column> {
        if MANAGED_FIELDS.contains(&field) {
            errors.add(field, "is managed automatically");
            return None;
        }
        let Some(column) = self.schema().column(field) else {
            errors.add(field, format!("is not a field of {}", self.name()));
            return None;
        };
        if let Some(message) = type_mismatch(column.kind, value) {
            errors.add(field, message);
            return None;
        }
        Some(column)
    }
}

fn type_mismatch(kind: ColumnKind, value: &Value) -> Option<&'static str> {
    if value.is_null() {
        return None;
    }
    let fits = match kind {
        ColumnKind::Text => value.is_string(),
        ColumnKind::Integer => value.is_i64() || value.is_u64(),
        ColumnKind::Real => value.is_number(),
        ColumnKind::Boolean => value.is_boolean(),
        ColumnKind::Timestamp => value.as_str().is_some_and(is_timestamp),
        ColumnKind::Json => true,
    };
    if fits {
        return None;
    }
    Some(match kind {
        ColumnKind::Text => "must be a string",
        ColumnKind::Integer => "must be an integer",
        ColumnKind::Real => "must be a number",
        ColumnKind::Boolean => "must be a boolean",
        ColumnKind::Timestamp => "must be an RFC 3339 timestamp or YYYY-MM-DD date",
        ColumnKind::Json => "must be JSON",
    })
}

fn is_timestamp(value: &str) -> bool {
    DateTime::parse_from_rfc3339(value).is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").is_ok()
        || NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}
