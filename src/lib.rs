//! rPresence library root.
//! Exposes CLI parser, high-level run() function, and internal modules.

pub mod archive;
pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod detection;
pub mod errors;
pub mod eventlog;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod store;
pub mod stream;
pub mod tracker;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;

/// Central command dispatcher
pub fn dispatch(cli: &Cli, cfg: &Config) -> AppResult<()> {
    match &cli.command {
        Commands::Init => cli::commands::init::handle(cli),
        Commands::Config { .. } => cli::commands::config::handle(&cli.command, cfg),
        Commands::Db { .. } => cli::commands::db::handle(&cli.command, cfg),
        Commands::Log { .. } => cli::commands::log::handle(&cli.command, cfg),
        Commands::Mark { .. } => cli::commands::mark::handle(&cli.command, cfg),
        Commands::List { .. } => cli::commands::list::handle(&cli.command, cfg),
        Commands::Status { .. } => cli::commands::status::handle(&cli.command, cfg),
        Commands::Watch { .. } => cli::commands::watch::handle(&cli.command, cfg),
    }
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    let cli = Cli::parse();

    let mut cfg = Config::load()?;
    // Same resolution as `init`: relative names live in the config dir.
    if let Some(custom_db) = &cli.db {
        let path = utils::path::resolve_in(&Config::config_dir(), custom_db);
        cfg = cfg.with_database(&path.to_string_lossy());
    }
    log::debug!("effective database: {}", cfg.database);

    dispatch(&cli, &cfg)
}
