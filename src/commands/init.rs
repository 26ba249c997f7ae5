use crate::{
    libs::{config::Config, messages::Message},
    msg_info, msg_success,
};
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Print the config file location and exit.
    #[arg(long)]
    path: bool,
}

pub fn cmd(args: InitArgs) -> Result<()> {
    if args.path {
        msg_info!(Config::path()?.display());
        return Ok(());
    }

    Config::init()?.save()?;
    msg_success!(Message::ConfigSaved);
    Ok(())
}
