use super::{parse_body, parse_pairs, print_value, with_manager, FilterArgs};
use crate::libs::messages::Message;
use crate::msg_success;
use anyhow::Result;
use clap::Args;
use serde_json::Value;

#[derive(Debug, Args)]
pub struct UpdateArgs {
    entity: String,
    /// Record id; without it the first record matching the filters is updated
    id: Option<String>,
    #[command(flatten)]
    filter: FilterArgs,
    #[arg(short, long)]
    data: Option<String>,
    #[arg(short, long = "set")]
    set: Vec<String>,
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
pub struct UpsertArgs {
    entity: String,
    /// Lookup field as key=value; matched exactly
    #[arg(short, long = "key", required = true)]
    keys: Vec<String>,
    #[arg(short, long)]
    data: Option<String>,
    #[arg(short, long = "set")]
    set: Vec<String>,
    #[arg(long)]
    json: bool,
}

pub fn cmd(args: UpdateArgs) -> Result<()> {
    let mut input = parse_body(args.data.as_deref(), &args.set)?;
    if let Some(id) = &args.id {
        input.insert("id".into(), Value::from(id.as_str()));
    }

    with_manager(|manager| {
        let entity = args.filter.apply(manager.use_schema(&args.entity)?)?;
        let record = entity.prepare_update(input)?;
        msg_success!(Message::RecordUpdated(args.entity.clone(), record.id.clone()));
        print_value(&entity.present(&record), args.json)
    })
}

pub fn upsert_cmd(args: UpsertArgs) -> Result<()> {
    let lookup = parse_pairs(&args.keys)?;
    let values = parse_body(args.data.as_deref(), &args.set)?;

    with_manager(|manager| {
        let entity = manager.use_schema(&args.entity)?;
        let record = entity.update_or_create(lookup, values)?;
        msg_success!(Message::RecordStored(args.entity.clone(), record.id.clone()));
        print_value(&entity.present(&record), args.json)
    })
}
