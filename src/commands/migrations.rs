use crate::{
    db::{
        db::Db,
        migrations::{get_db_version, needs_migration, MigrationManager},
    },
    libs::{messages::Message, view::View},
    msg_info, msg_print,
};
use anyhow::Result;
use clap::{Args, Subcommand};

#[derive(Debug, Args)]
pub struct MigrationsArgs {
    #[command(subcommand)]
    command: MigrationsCommand,
}

#[derive(Debug, Subcommand)]
enum MigrationsCommand {
    /// Current version and whether migrations are pending
    Status,
    /// Applied migrations
    History,
    /// Apply pending migrations
    Run,
    /// Forget migration records above a version
    Rollback { version: u32 },
}

pub fn cmd(args: MigrationsArgs) -> Result<()> {
    let mut db = Db::new_without_migrations()?;
    let manager = MigrationManager::new();

    match args.command {
        MigrationsCommand::Status => {
            msg_print!(Message::DbVersion(get_db_version(&db.conn)?));
            if needs_migration(&db.conn)? {
                msg_info!(Message::DbNeedsMigration);
            } else {
                msg_info!(Message::DbUpToDate);
            }
        }
        MigrationsCommand::History => {
            msg_print!(Message::MigrationHistoryHeader, true);
            View::migration_history(&manager.get_migration_history(&db.conn)?)?;
        }
        MigrationsCommand::Run => manager.run_migrations(&mut db.conn)?,
        MigrationsCommand::Rollback { version } => manager.rollback_to(&mut db.conn, version)?,
    }

    Ok(())
}
