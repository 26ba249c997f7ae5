//! Generic table gateway for schema-described entities.
//!
//! `Records` turns [`Conditionals`] into parameterized SQL against the table a
//! [`Schema`] describes and maps rows back into [`Record`]s. Column names come
//! from the schema itself; caller-supplied field names are validated against
//! it before any SQL is built.

use crate::libs::condition::{Conditionals, Operator, Predicate};
use crate::libs::error::{DataError, DataResult, FieldErrors, Operation};
use crate::libs::record::Record;
use crate::libs::schema::{ColumnKind, Schema};
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection, Row};
use serde_json::{Map, Number, Value};
use tracing::debug;

/// Tombstone visibility for reads and restores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Trashed {
    #[default]
    Without,
    With,
    Only,
}

#[derive(Debug, Clone, Default)]
pub struct Select {
    pub conditionals: Conditionals,
    pub trashed: Trashed,
    pub columns: Option<Vec<String>>,
    pub limit: Option<u32>,
    pub offset: u32,
}

pub struct Records<'a> {
    conn: &'a Connection,
    schema: &'a dyn Schema,
}

impl<'a> Records<'a> {
    pub fn new(conn: &'a Connection, schema: &'a dyn Schema) -> Self {
        Self { conn, schema }
    }

    fn entity(&self) -> &'static str {
        self.schema.name()
    }

    /// Creates the backing table for schemas that are not covered by the
    /// bundled migrations.
    pub fn create_table(&self) -> DataResult<()> {
        let mut definitions = vec!["\"id\" TEXT NOT NULL PRIMARY KEY".to_string()];
        for column in self.schema.columns() {
            let not_null = if column.required { " NOT NULL" } else { "" };
            definitions.push(format!("{} {}{}", quote(column.name), column.kind.sql_type(), not_null));
        }
        if self.schema.has_props() {
            definitions.push("\"props\" TEXT".to_string());
        }
        definitions.push("\"created_at\" TEXT".to_string());
        definitions.push("\"updated_at\" TEXT".to_string());
        if self.schema.soft_deletes() {
            definitions.push("\"deleted_at\" TEXT".to_string());
        }

        let sql = format!("CREATE TABLE IF NOT EXISTS {} ({})", quote(self.schema.table()), definitions.join(", "));
        self.conn.execute(&sql, []).map_err(DataError::storage(self.entity(), Operation::Store))?;
        Ok(())
    }

    pub fn select(&self, select: &Select) -> DataResult<Vec<Record>> {
        let columns = self.projection(select.columns.as_deref())?;
        let (where_sql, mut params) = self.where_clause(&select.conditionals, select.trashed)?;

        let quoted: Vec<String> = columns.iter().map(|column| quote(column)).collect();
        let mut sql = format!("SELECT {} FROM {} WHERE {} ORDER BY \"id\" ASC", quoted.join(", "), quote(self.schema.table()), where_sql);

        if let Some(limit) = select.limit {
            sql.push_str(" LIMIT ?");
            params.push(SqlValue::Integer(i64::from(limit)));
            if select.offset > 0 {
                sql.push_str(" OFFSET ?");
                params.push(SqlValue::Integer(i64::from(select.offset)));
            }
        } else if select.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            params.push(SqlValue::Integer(i64::from(select.offset)));
        }

        debug!(entity = self.entity(), %sql, "select");
        let mut stmt = self.conn.prepare(&sql).map_err(DataError::storage(self.entity(), Operation::List))?;
        let mut rows = stmt.query(params_from_iter(params)).map_err(DataError::storage(self.entity(), Operation::List))?;

        let mut records = Vec::new();
        while let Some(row) = rows.next().map_err(DataError::storage(self.entity(), Operation::List))? {
            let record = self.parse_row(row, &columns).map_err(DataError::storage(self.entity(), Operation::List))?;
            records.push(record);
        }

        Ok(records)
    }

    pub fn find(&self, id: &str, trashed: Trashed) -> DataResult<Option<Record>> {
        let select = Select {
            conditionals: Conditionals::and().where_eq("id", id),
            trashed,
            limit: Some(1),
            ..Default::default()
        };
        Ok(self.select(&select)?.into_iter().next())
    }

    pub fn count(&self, conditionals: &Conditionals, trashed: Trashed) -> DataResult<u64> {
        let (where_sql, params) = self.where_clause(conditionals, trashed)?;
        let sql = format!("SELECT COUNT(*) FROM {} WHERE {}", quote(self.schema.table()), where_sql);

        debug!(entity = self.entity(), %sql, "count");
        let count: i64 = self
            .conn
            .query_row(&sql, params_from_iter(params), |row| row.get(0))
            .map_err(DataError::storage(self.entity(), Operation::Count))?;
        Ok(count.max(0) as u64)
    }

    pub fn insert(&self, record: &Record) -> DataResult<()> {
        let mut columns = vec!["id".to_string()];
        let mut params = vec![SqlValue::Text(record.id.clone())];

        for (name, value) in &record.attributes {
            let kind = self.schema.column(name).map(|column| column.kind);
            columns.push(name.clone());
            params.push(value_to_sql(value, kind));
        }
        if self.schema.has_props() {
            columns.push("props".into());
            params.push(props_to_sql(record.props.as_ref()));
        }
        columns.push("created_at".into());
        params.push(optional_text(record.created_at.as_deref()));
        columns.push("updated_at".into());
        params.push(optional_text(record.updated_at.as_deref()));

        let quoted: Vec<String> = columns.iter().map(|column| quote(column)).collect();
        let placeholders = vec!["?"; columns.len()].join(", ");
        let sql = format!("INSERT INTO {} ({}) VALUES ({})", quote(self.schema.table()), quoted.join(", "), placeholders);

        debug!(entity = self.entity(), id = %record.id, "insert");
        self.conn
            .execute(&sql, params_from_iter(params))
            .map_err(DataError::storage(self.entity(), Operation::Store))?;
        Ok(())
    }

    /// Writes `changes`, the full `props` bag (when given) and `updated_at`.
    pub fn update(&self, id: &str, changes: &Map<String, Value>, props: Option<&Map<String, Value>>, updated_at: &str) -> DataResult<usize> {
        let mut assignments = Vec::new();
        let mut params = Vec::new();

        for (name, value) in changes {
            let kind = self.schema.column(name).map(|column| column.kind);
            assignments.push(format!("{} = ?", quote(name)));
            params.push(value_to_sql(value, kind));
        }
        if self.schema.has_props() {
            if let Some(props) = props {
                assignments.push("\"props\" = ?".to_string());
                params.push(props_to_sql(Some(props)));
            }
        }
        assignments.push("\"updated_at\" = ?".to_string());
        params.push(SqlValue::Text(updated_at.to_string()));
        params.push(SqlValue::Text(id.to_string()));

        let sql = format!("UPDATE {} SET {} WHERE \"id\" = ?", quote(self.schema.table()), assignments.join(", "));

        debug!(entity = self.entity(), %id, "update");
        self.conn
            .execute(&sql, params_from_iter(params))
            .map_err(DataError::storage(self.entity(), Operation::Update))
    }

    pub fn soft_delete(&self, conditionals: &Conditionals, deleted_at: &str) -> DataResult<usize> {
        let (where_sql, where_params) = self.where_clause(conditionals, Trashed::Without)?;
        let sql = format!("UPDATE {} SET \"deleted_at\" = ?, \"updated_at\" = ? WHERE {}", quote(self.schema.table()), where_sql);

        let mut params = vec![SqlValue::Text(deleted_at.to_string()), SqlValue::Text(deleted_at.to_string())];
        params.extend(where_params);

        debug!(entity = self.entity(), %sql, "soft delete");
        self.conn
            .execute(&sql, params_from_iter(params))
            .map_err(DataError::storage(self.entity(), Operation::Delete))
    }

    pub fn hard_delete(&self, conditionals: &Conditionals) -> DataResult<usize> {
        let (where_sql, params) = self.where_clause(conditionals, Trashed::With)?;
        let sql = format!("DELETE FROM {} WHERE {}", quote(self.schema.table()), where_sql);

        debug!(entity = self.entity(), %sql, "delete");
        self.conn
            .execute(&sql, params_from_iter(params))
            .map_err(DataError::storage(self.entity(), Operation::Delete))
    }

    pub fn restore(&self, conditionals: &Conditionals, updated_at: &str) -> DataResult<usize> {
        if !self.schema.soft_deletes() {
            return Ok(0);
        }
        let (where_sql, where_params) = self.where_clause(conditionals, Trashed::Only)?;
        let sql = format!("UPDATE {} SET \"deleted_at\" = NULL, \"updated_at\" = ? WHERE {}", quote(self.schema.table()), where_sql);

        let mut params = vec![SqlValue::Text(updated_at.to_string())];
        params.extend(where_params);

        debug!(entity = self.entity(), %sql, "restore");
        self.conn
            .execute(&sql, params_from_iter(params))
            .map_err(DataError::storage(self.entity(), Operation::Restore))
    }

    /// Selected column names, always starting with `id`.
    fn projection(&self, requested: Option<&[String]>) -> DataResult<Vec<String>> {
        let mut all = vec!["id".to_string()];
        all.extend(self.schema.columns().iter().map(|column| column.name.to_string()));
        if self.schema.has_props() {
            all.push("props".into());
        }
        all.push("created_at".into());
        all.push("updated_at".into());
        if self.schema.soft_deletes() {
            all.push("deleted_at".into());
        }

        let Some(requested) = requested else {
            return Ok(all);
        };

        let mut errors = FieldErrors::new();
        for column in requested {
            if !all.contains(column) {
                errors.add(column.as_str(), "is not a selectable column");
            }
        }
        errors.into_result(self.entity())?;

        Ok(all.into_iter().filter(|column| column == "id" || requested.contains(column)).collect())
    }

    fn where_clause(&self, conditionals: &Conditionals, trashed: Trashed) -> DataResult<(String, Vec<SqlValue>)> {
        let mut params = Vec::new();
        let mut errors = FieldErrors::new();
        let body = self.render_group(conditionals, &mut params, &mut errors);
        errors.into_result(self.entity())?;

        let tombstone = match (self.schema.soft_deletes(), trashed) {
            (true, Trashed::Without) => " AND \"deleted_at\" IS NULL",
            (true, Trashed::Only) => " AND \"deleted_at\" IS NOT NULL",
            _ => "",
        };

        Ok((format!("({}){}", body, tombstone), params))
    }

    fn render_group(&self, conditionals: &Conditionals, params: &mut Vec<SqlValue>, errors: &mut FieldErrors) -> String {
        if conditionals.is_empty() {
            return "1 = 1".to_string();
        }

        let separator = format!(" {} ", conditionals.logic().keyword());
        let parts: Vec<String> = conditionals
            .predicates()
            .iter()
            .map(|predicate| match predicate {
                Predicate::Group(group) => format!("({})", self.render_group(group, params, errors)),
                Predicate::Compare { field, op, value } => self.render_compare(field, *op, value, params, errors),
            })
            .collect();
        parts.join(&separator)
    }

    fn render_compare(&self, field: &str, op: Operator, value: &Value, params: &mut Vec<SqlValue>, errors: &mut FieldErrors) -> String {
        let Some((expr, kind)) = self.field_expr(field) else {
            errors.add(field, "is not a filterable field");
            return "1 = 1".to_string();
        };

        let symbol = match op {
            Operator::Eq if value.is_null() => return format!("{} IS NULL", expr),
            Operator::Ne if value.is_null() => return format!("{} IS NOT NULL", expr),
            Operator::Null => return format!("{} IS NULL", expr),
            Operator::NotNull => return format!("{} IS NOT NULL", expr),
            Operator::In | Operator::NotIn => {
                let items = match value {
                    Value::Array(items) => items.clone(),
                    other => vec![other.clone()],
                };
                if items.is_empty() {
                    return if op == Operator::In { "0 = 1".to_string() } else { "1 = 1".to_string() };
                }
                let placeholders = vec!["?"; items.len()].join(", ");
                params.extend(items.iter().map(|item| value_to_sql(item, kind)));
                let keyword = if op == Operator::In { "IN" } else { "NOT IN" };
                return format!("{} {} ({})", expr, keyword, placeholders);
            }
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Like => "LIKE",
        };

        params.push(value_to_sql(value, kind));
        if op == Operator::Like {
            return format!("{} LIKE ? ESCAPE '\\'", expr);
        }
        format!("{} {} ?", expr, symbol)
    }

    fn field_expr(&self, field: &str) -> Option<(String, Option<ColumnKind>)> {
        match field {
            "id" | "created_at" | "updated_at" => return Some((quote(field), Some(ColumnKind::Text))),
            "deleted_at" if self.schema.soft_deletes() => return Some((quote(field), Some(ColumnKind::Text))),
            _ => {}
        }

        if let Some(key) = field.strip_prefix("props.") {
            let valid = !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
            return (self.schema.has_props() && valid).then(|| (format!("json_extract(\"props\", '$.{}')", key), None));
        }

        self.schema.column(field).map(|column| (quote(column.name), Some(column.kind)))
    }

    fn parse_row(&self, row: &Row<'_>, columns: &[String]) -> rusqlite::Result<Record> {
        let mut record = Record::default();

        for (index, name) in columns.iter().enumerate() {
            let raw = row.get_ref(index)?;
            match name.as_str() {
                "id" => record.id = row.get(index)?,
                "created_at" => record.created_at = row.get(index)?,
                "updated_at" => record.updated_at = row.get(index)?,
                "deleted_at" => record.deleted_at = row.get(index)?,
                "props" => {
                    record.props = match raw {
                        ValueRef::Text(text) => serde_json::from_slice::<Map<String, Value>>(text).ok(),
                        _ => None,
                    }
                }
                column => {
                    let kind = self.schema.column(column).map(|c| c.kind).unwrap_or(ColumnKind::Text);
                    record.attributes.insert(column.to_string(), value_from_sql(raw, kind));
                }
            }
        }

        Ok(record)
    }
}

fn quote(name: &str) -> String {
    format!("\"{}\"", name)
}

fn optional_text(value: Option<&str>) -> SqlValue {
    value.map(|text| SqlValue::Text(text.to_string())).unwrap_or(SqlValue::Null)
}

fn props_to_sql(props: Option<&Map<String, Value>>) -> SqlValue {
    match props {
        Some(props) => SqlValue::Text(Value::Object(props.clone()).to_string()),
        None => SqlValue::Null,
    }
}

pub(crate) fn value_to_sql(value: &Value, kind: Option<ColumnKind>) -> SqlValue {
    if kind == Some(ColumnKind::Json) {
        return match value {
            Value::Null => SqlValue::Null,
            other => SqlValue::Text(other.to_string()),
        };
    }

    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(flag) => SqlValue::Integer(i64::from(*flag)),
        Value::Number(number) => match number.as_i64() {
            Some(integer) => SqlValue::Integer(integer),
            None => SqlValue::Real(number.as_f64().unwrap_or_default()),
        },
        Value::String(text) => SqlValue::Text(text.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}

/// Whole-valued reals come back as JSON integers so `100` survives a round trip.
pub(crate) fn real_value(real: f64) -> Value {
    const EXACT: f64 = 9_007_199_254_740_992.0;
    if real.fract() == 0.0 && real.abs() < EXACT {
        return Value::from(real as i64);
    }
    Number::from_f64(real).map(Value::Number).unwrap_or(Value::Null)
}

/// Shapes an input value the way the column reads back from storage.
pub(crate) fn stored_value(kind: ColumnKind, value: Value) -> Value {
    match (kind, &value) {
        (ColumnKind::Real, Value::Number(number)) => number.as_f64().map(real_value).unwrap_or(value),
        _ => value,
    }
}

pub(crate) fn value_from_sql(value: ValueRef<'_>, kind: ColumnKind) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(integer) if kind == ColumnKind::Boolean => Value::Bool(integer != 0),
        ValueRef::Integer(integer) => Value::Number(integer.into()),
        ValueRef::Real(real) => real_value(real),
        ValueRef::Text(bytes) => {
            let text = String::from_utf8_lossy(bytes).into_owned();
            if kind == ColumnKind::Json {
                serde_json::from_str(&text).unwrap_or(Value::String(text))
            } else {
                Value::String(text)
            }
        }
        ValueRef::Blob(_) => Value::Null,
    }
}
