//! Command-line interface.
//!
//! Each subcommand plays the caller role for one orchestrator operation:
//! filters arrive as repeated `-f key=value` pairs, bodies as JSON via
//! `--data` or `-s key=value`, and results print as tables or, with `--json`,
//! as pretty JSON.

pub mod delete;
pub mod export;
pub mod init;
pub mod list;
#[cfg(debug_assertions)]
pub mod migrations;
pub mod schemas;
pub mod show;
pub mod store;
pub mod update;

use crate::db::db::Db;
use crate::libs::condition::Logic;
use crate::libs::config::Config;
use crate::libs::manager::{DataManager, Entity, ManagerOptions};
use crate::libs::messages::Message;
use crate::libs::registry::SchemaRegistry;
use crate::libs::view::View;
use crate::{msg_bail_anyhow, msg_error_anyhow};
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use serde_json::{Map, Value};
use std::sync::Arc;

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Interactive configuration")]
    Init(init::InitArgs),
    #[command(about = "List registered entities")]
    Schemas,
    #[command(about = "List records of an entity")]
    List(list::ListArgs),
    #[command(about = "List one page of records")]
    Paginate(list::PaginateArgs),
    #[command(about = "Show one record")]
    Show(show::ShowArgs),
    #[command(about = "Store one record, or several from a JSON array")]
    Store(store::StoreArgs),
    #[command(about = "Update a record")]
    Update(update::UpdateArgs),
    #[command(about = "Update the record matching the lookup keys or create it")]
    Upsert(update::UpsertArgs),
    #[command(about = "Delete matching records")]
    Delete(delete::DeleteArgs),
    #[command(about = "Restore deleted records")]
    Restore(delete::RestoreArgs),
    #[command(about = "Export records to CSV or JSON")]
    Export(export::ExportArgs),
    #[cfg(debug_assertions)]
    #[command(about = "Inspect database migrations")]
    Migrations(migrations::MigrationsArgs),
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help(true))]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub fn menu() -> Result<()> {
        let cli = Self::parse();
        match cli.command {
            Commands::Init(args) => init::cmd(args),
            Commands::Schemas => schemas::cmd(),
            Commands::List(args) => list::cmd(args),
            Commands::Paginate(args) => list::paginate_cmd(args),
            Commands::Show(args) => show::cmd(args),
            Commands::Store(args) => store::cmd(args),
            Commands::Update(args) => update::cmd(args),
            Commands::Upsert(args) => update::upsert_cmd(args),
            Commands::Delete(args) => delete::cmd(args),
            Commands::Restore(args) => delete::restore_cmd(args),
            Commands::Export(args) => export::cmd(args),
            #[cfg(debug_assertions)]
            Commands::Migrations(args) => migrations::cmd(args),
        }
    }
}

/// Filter options shared by the query and delete commands.
#[derive(Debug, Args, Default)]
pub struct FilterArgs {
    /// Filter as key=value; values are parsed as JSON when possible.
    #[arg(short = 'f', long = "filter")]
    pub filters: Vec<String>,
    /// Combine filters with OR instead of AND.
    #[arg(long)]
    pub or: bool,
    /// Match strings exactly instead of with LIKE %value%.
    #[arg(long)]
    pub exact: bool,
}

impl FilterArgs {
    pub fn params(&self) -> Result<Map<String, Value>> {
        parse_pairs(&self.filters)
    }

    /// Sets the combinator and LIKE matching, keeping the entity's own
    /// parameter options.
    pub fn with_logic<'m>(&self, entity: Entity<'m>) -> Entity<'m> {
        let logic = if self.or { Logic::Or } else { Logic::And };
        let extra = entity.param_logic().extra_options.clone();
        entity.set_param_logic(logic, !self.exact, extra)
    }

    /// Applies parameter logic and stores the filters as conditionals.
    pub fn apply<'m>(&self, entity: Entity<'m>) -> Result<Entity<'m>> {
        let params = self.params()?;
        let entity = self.with_logic(entity);
        Ok(if params.is_empty() { entity } else { entity.conditionals(params) })
    }
}

/// Parses `key=value` pairs. Repeating a key collects its values into an
/// array, which filters treat as `IN`.
pub fn parse_pairs(pairs: &[String]) -> Result<Map<String, Value>> {
    let mut map = Map::new();
    for pair in pairs {
        let Some((key, raw)) = pair.split_once('=') else {
            msg_bail_anyhow!(Message::InvalidFilter(pair.clone()));
        };
        let key = key.trim();
        if key.is_empty() {
            msg_bail_anyhow!(Message::InvalidFilter(pair.clone()));
        }
        let value = parse_scalar(raw);
        match map.get_mut(key) {
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                map.insert(key.to_string(), value);
            }
        }
    }
    Ok(map)
}

/// JSON when the text parses, otherwise the text itself.
pub fn parse_scalar(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Builds a request body from `--data` JSON merged with `-s` pairs.
pub fn parse_body(data: Option<&str>, set: &[String]) -> Result<Map<String, Value>> {
    let mut body = match data {
        None => Map::new(),
        Some(text) => match serde_json::from_str::<Value>(text).map_err(|e| msg_error_anyhow!(Message::InvalidJsonInput(e.to_string())))? {
            Value::Object(object) => object,
            _ => msg_bail_anyhow!(Message::JsonObjectExpected),
        },
    };
    body.extend(parse_pairs(set)?);
    Ok(body)
}

/// Opens the configured database and runs `f` with a manager over it.
pub fn with_manager<T>(f: impl FnOnce(&DataManager) -> Result<T>) -> Result<T> {
    let config = Config::read()?;
    let db = Db::new()?;
    let manager = DataManager::new(&db.conn, Arc::new(SchemaRegistry::with_defaults())).with_options(ManagerOptions::from_config(&config));
    f(&manager)
}

pub fn print_values(values: &[Value], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(values)?);
        Ok(())
    } else {
        View::records(values)
    }
}

pub fn print_value(value: &Value, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    } else {
        View::record(value)
    }
}
