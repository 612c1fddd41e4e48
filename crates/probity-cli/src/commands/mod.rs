//! Subcommands and the options they share

pub mod migrate;
pub mod snapshot;

use clap::Args;
use probity_engine::EngineConfig;
use std::path::PathBuf;

/// Database and configuration flags accepted by every subcommand
#[derive(Debug, Args)]
pub struct StoreArgs {
    /// SQLite database file; overrides `database_path` from the config
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl StoreArgs {
    /// Load the config file (or defaults), apply flag overrides and start logging
    pub fn resolve(&self) -> Result<EngineConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::load(path)?,
            None => EngineConfig::default(),
        };
        if let Some(db) = &self.db {
            config.database_path = db.clone();
        }
        probity_core::logging_facility::init(config.log_profile);
        Ok(config)
    }

    pub fn open(
        &self,
    ) -> Result<(EngineConfig, rusqlite::Connection), Box<dyn std::error::Error>> {
        let config = self.resolve()?;
        let conn = probity_store::db::open_and_migrate(&config.database_path)?;
        Ok((config, conn))
    }
}
