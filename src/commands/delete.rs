use super::{with_manager, FilterArgs};
use crate::libs::condition::Conditionals;
use crate::libs::manager::{ConditionInput, Entity};
use crate::libs::messages::Message;
use crate::{msg_info, msg_success};
use anyhow::Result;
use clap::Args;
use dialoguer::{theme::ColorfulTheme, Confirm};

#[derive(Debug, Args)]
pub struct DeleteArgs {
    entity: String,
    id: Option<String>,
    #[command(flatten)]
    filter: FilterArgs,
    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,
}

#[derive(Debug, Args)]
pub struct RestoreArgs {
    entity: String,
    id: Option<String>,
    #[command(flatten)]
    filter: FilterArgs,
}

fn target<'m>(entity: Entity<'m>, id: Option<&str>, filter: &FilterArgs) -> Result<(Entity<'m>, Option<ConditionInput>)> {
    let entity = filter.apply(entity)?;
    let by_id = id.map(|id| ConditionInput::Built(Conditionals::and().where_eq("id", id)));
    Ok((entity, by_id))
}

pub fn cmd(args: DeleteArgs) -> Result<()> {
    if !args.yes
        && !Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::ConfirmDelete(args.entity.clone()).to_string())
            .default(false)
            .interact()?
    {
        msg_info!(Message::OperationCancelled);
        return Ok(());
    }

    with_manager(|manager| {
        let (entity, by_id) = target(manager.use_schema(&args.entity)?, args.id.as_deref(), &args.filter)?;
        if entity.delete(by_id)? {
            msg_success!(Message::RecordsDeleted(args.entity.clone()));
        } else {
            msg_info!(Message::NothingDeleted(args.entity.clone()));
        }
        Ok(())
    })
}

pub fn restore_cmd(args: RestoreArgs) -> Result<()> {
    with_manager(|manager| {
        let (entity, by_id) = target(manager.use_schema(&args.entity)?, args.id.as_deref(), &args.filter)?;
        if entity.restore(by_id)? {
            msg_success!(Message::RecordsRestored(args.entity.clone()));
        } else {
            msg_info!(Message::NothingRestored(args.entity.clone()));
        }
        Ok(())
    })
}
