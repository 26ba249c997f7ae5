use super::{print_value, with_manager, FilterArgs};
use crate::libs::manager::ConditionInput;
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct ShowArgs {
    entity: String,
    /// Record id; without it the first record matching the filters is shown
    id: Option<String>,
    #[command(flatten)]
    filter: FilterArgs,
    #[arg(short, long)]
    with: Vec<String>,
    #[arg(long)]
    trashed: bool,
    #[arg(long)]
    json: bool,
}

pub fn cmd(args: ShowArgs) -> Result<()> {
    with_manager(|manager| {
        let mut entity = args.filter.with_logic(manager.use_schema(&args.entity)?);
        for relation in &args.with {
            entity = entity.with(relation);
        }
        if args.trashed {
            entity = entity.with_trashed();
        }

        let params = args.filter.params()?;
        let filters = (!params.is_empty()).then_some(ConditionInput::Params(params));
        let record = entity.prepare_show(args.id.as_deref(), filters)?;
        let value = entity.present(&record);
        print_value(&value, args.json)
    })
}
