//! Schema migration command

use crate::commands::StoreArgs;
use clap::Args;
use probity_store::migrations::applied_migrations;

#[derive(Debug, Args)]
pub struct MigrateArgs {
    #[command(flatten)]
    pub store: StoreArgs,
}

pub fn execute(args: MigrateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (config, conn) = args.store.open()?;
    let applied = applied_migrations(&conn)?;

    println!("Database ready: {}", config.database_path.display());
    for id in applied {
        println!("  {}", id);
    }
    Ok(())
}
