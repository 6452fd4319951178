use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::status::StatusLogic;
use crate::errors::AppResult;
use crate::store::AttendanceStore;
use crate::utils::date::resolve_date;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::List { date } = cmd {
        let date = resolve_date(date)?;
        let store = AttendanceStore::open(&cfg.database)?;
        StatusLogic::list(&store, date)?;
    }

    Ok(())
}
