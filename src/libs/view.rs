use super::pagination::Page;
use super::registry::SchemaRegistry;
use anyhow::Result;
use prettytable::{format, row, Cell, Row, Table};
use serde_json::Value;

const MAX_CELL_WIDTH: usize = 48;

pub struct View {}

impl View {
    /// One row per record; columns are the union of keys in first-seen order.
    pub fn records(records: &[Value]) -> Result<()> {
        Self::records_table(records).printstd();
        Ok(())
    }

    pub fn records_table(records: &[Value]) -> Table {
        let headers = collect_headers(records);
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_BOX_CHARS);
        table.set_titles(Row::new(headers.iter().map(|header| Cell::new(&header.to_uppercase())).collect()));

        for record in records {
            let cells = headers.iter().map(|header| Cell::new(&cell_text(record.get(header)))).collect();
            table.add_row(Row::new(cells));
        }
        table
    }

    pub fn page(page: &Page<Value>) -> Result<()> {
        Self::records(&page.data)
    }

    /// Field/value listing of a single record.
    pub fn record(record: &Value) -> Result<()> {
        let mut table = Table::new();
        table.add_row(row!["FIELD", "VALUE"]);
        if let Value::Object(fields) = record {
            for (field, value) in fields {
                table.add_row(row![field, cell_text(Some(value))]);
            }
        }
        table.printstd();
        Ok(())
    }

    pub fn schemas(registry: &SchemaRegistry) -> Result<()> {
        let mut table = Table::new();
        table.add_row(row!["ENTITY", "TABLE", "COLUMNS", "RELATIONS", "SOFT DELETE"]);
        for name in registry.names() {
            let schema = registry.resolve(name)?;
            let columns: Vec<String> = schema
                .columns()
                .iter()
                .map(|column| if column.required { format!("{}*", column.name) } else { column.name.to_string() })
                .collect();
            let relations: Vec<&str> = schema.relations().iter().map(|relation| relation.name).collect();
            table.add_row(row![
                name,
                schema.table(),
                columns.join(", "),
                relations.join(", "),
                if schema.soft_deletes() { "yes" } else { "no" }
            ]);
        }
        table.printstd();
        Ok(())
    }

    pub fn migration_history(history: &[(u32, String, String)]) -> Result<()> {
        let mut table = Table::new();
        table.add_row(row!["VERSION", "NAME", "APPLIED AT"]);
        for (version, name, applied_at) in history {
            table.add_row(row![version, name, applied_at]);
        }
        table.printstd();
        Ok(())
    }
}

fn collect_headers(records: &[Value]) -> Vec<String> {
    let mut headers: Vec<String> = Vec::new();
    for record in records {
        if let Value::Object(fields) = record {
            for key in fields.keys() {
                if !headers.contains(key) {
                    headers.push(key.clone());
                }
            }
        }
    }
    if let Some(position) = headers.iter().position(|header| header == "id") {
        let id = headers.remove(position);
        headers.insert(0, id);
    }
    headers
}

fn cell_text(value: Option<&Value>) -> String {
    let text = match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    };
    if text.chars().count() > MAX_CELL_WIDTH {
        let truncated: String = text.chars().take(MAX_CELL_WIDTH - 1).collect();
        format!("{}…", truncated)
    } else {
        text
    }
}
