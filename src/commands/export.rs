use super::{with_manager, FilterArgs};
use crate::libs::config::Config;
use crate::libs::export::{ExportFormat, ExportRequest, Exporter};
use crate::libs::messages::Message;
use crate::{msg_info, msg_success};
use anyhow::Result;
use clap::Args;
use serde_json::Value;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Entity to export; omit with --prune
    #[arg(required_unless_present = "prune")]
    entity: Option<String>,
    #[arg(short = 'F', long, value_enum, default_value_t = ExportFormat::Csv)]
    format: ExportFormat,
    #[command(flatten)]
    filter: FilterArgs,
    /// Output file; defaults to the export directory
    #[arg(short, long)]
    output: Option<PathBuf>,
    #[arg(long)]
    user_id: Option<String>,
    /// Remove expired export files and their jobs
    #[arg(long)]
    prune: bool,
}

pub fn cmd(args: ExportArgs) -> Result<()> {
    let config = Config::read()?;

    with_manager(|manager| {
        let exporter = Exporter::from_config(manager, &config);

        if args.prune {
            let pruned = exporter.prune_expired()?;
            msg_info!(Message::ExportsPruned(pruned));
            if args.entity.is_none() {
                return Ok(());
            }
        }
        let Some(entity) = args.entity.clone() else {
            return Ok(());
        };

        msg_info!(Message::ExportStarted(entity.clone(), args.format.extension().to_uppercase()));
        let mut request = ExportRequest::new(entity, args.format).filters(args.filter.params()?);
        if let Some(output) = &args.output {
            request = request.output_path(output.clone());
        }
        if let Some(user_id) = &args.user_id {
            request = request.user_id(user_id.clone());
        }

        let job = exporter.export(&request)?;
        if let Some(Value::String(path)) = job.get("file_path") {
            msg_success!(Message::ExportCompleted(path.clone()));
        }
        Ok(())
    })
}
