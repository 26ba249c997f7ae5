use super::{print_values, with_manager, FilterArgs};
use crate::libs::{messages::Message, pagination::PaginateRequest, view::View};
use crate::{msg_info, msg_print};
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Entity name, e.g. Phone
    entity: String,
    #[command(flatten)]
    filter: FilterArgs,
    /// Eager-load a relation
    #[arg(short, long)]
    with: Vec<String>,
    /// Include deleted records
    #[arg(long, conflicts_with = "only_trashed")]
    trashed: bool,
    /// Only deleted records
    #[arg(long)]
    only_trashed: bool,
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
pub struct PaginateArgs {
    entity: String,
    #[command(flatten)]
    filter: FilterArgs,
    #[arg(short, long, default_value_t = 1)]
    page: u32,
    #[arg(long)]
    per_page: Option<u32>,
    /// Columns to select, comma separated
    #[arg(short, long, value_delimiter = ',')]
    columns: Vec<String>,
    #[arg(short, long)]
    with: Vec<String>,
    #[arg(long)]
    trashed: bool,
    #[arg(long)]
    json: bool,
}

pub fn cmd(args: ListArgs) -> Result<()> {
    with_manager(|manager| {
        let mut entity = args.filter.apply(manager.use_schema(&args.entity)?)?;
        for relation in &args.with {
            entity = entity.with(relation);
        }
        if args.trashed {
            entity = entity.with_trashed();
        } else if args.only_trashed {
            entity = entity.only_trashed();
        }

        let records = entity.list()?;
        if records.is_empty() && !args.json {
            msg_info!(Message::NoRecordsFound(args.entity.clone()));
            return Ok(());
        }
        print_values(&records, args.json)
    })
}

pub fn paginate_cmd(args: PaginateArgs) -> Result<()> {
    with_manager(|manager| {
        let mut entity = args.filter.with_logic(manager.use_schema(&args.entity)?);
        for relation in &args.with {
            entity = entity.with(relation);
        }
        if args.trashed {
            entity = entity.with_trashed();
        }

        let mut request = PaginateRequest::new().page(args.page).filters(args.filter.params()?).path(format!("/{}", args.entity));
        if let Some(per_page) = args.per_page {
            request = request.per_page(per_page);
        }
        if !args.columns.is_empty() {
            request = request.columns(args.columns.iter().cloned());
        }

        let page = entity.paginate(Some(&request))?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&page)?);
            return Ok(());
        }

        if page.is_empty() {
            msg_info!(Message::NoRecordsFound(args.entity.clone()));
        } else {
            View::page(&page)?;
        }
        msg_print!(Message::PageSummary {
            page: page.meta.current_page,
            last_page: page.meta.last_page,
            total: page.meta.total,
        });
        if let Some(next) = &page.links.next {
            msg_print!(next);
        }
        Ok(())
    })
}
