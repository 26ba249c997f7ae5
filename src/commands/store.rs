use super::{parse_pairs, print_value, print_values, with_manager};
use crate::libs::messages::Message;
use crate::{msg_bail_anyhow, msg_error_anyhow, msg_success};
use anyhow::Result;
use clap::Args;
use serde_json::{Map, Value};

#[derive(Debug, Args)]
pub struct StoreArgs {
    entity: String,
    /// JSON object, or an array of objects stored in one transaction
    #[arg(short, long)]
    data: Option<String>,
    /// Field as key=value, merged over --data
    #[arg(short, long = "set")]
    set: Vec<String>,
    #[arg(long)]
    json: bool,
}

pub fn cmd(args: StoreArgs) -> Result<()> {
    let pairs = parse_pairs(&args.set)?;
    let data = match args.data.as_deref() {
        None => Value::Object(Map::new()),
        Some(text) => serde_json::from_str::<Value>(text).map_err(|e| msg_error_anyhow!(Message::InvalidJsonInput(e.to_string())))?,
    };

    with_manager(|manager| {
        let entity = manager.use_schema(&args.entity)?;
        match data {
            Value::Array(items) => {
                let mut inputs = Vec::with_capacity(items.len());
                for item in items {
                    let Value::Object(mut input) = item else {
                        msg_bail_anyhow!(Message::JsonArrayExpected);
                    };
                    input.extend(pairs.clone());
                    inputs.push(input);
                }
                let stored = entity.store_multiple(inputs)?;
                msg_success!(Message::RecordsStored(args.entity.clone(), stored.len()));
                print_values(&stored, args.json)
            }
            Value::Object(mut input) => {
                input.extend(pairs);
                let stored = entity.store(input)?;
                let id = stored.get("id").and_then(Value::as_str).unwrap_or_default().to_string();
                msg_success!(Message::RecordStored(args.entity.clone(), id));
                print_value(&stored, args.json)
            }
            _ => msg_bail_anyhow!(Message::JsonObjectExpected),
        }
    })
}
