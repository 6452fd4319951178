use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::mark::MarkLogic;
use crate::errors::AppResult;
use crate::models::Transition;
use crate::store::AttendanceStore;
use crate::utils::time::{now_local, parse_cli_datetime};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Mark { status, at, person } = cmd {
        cfg.check()?;
        let status = MarkLogic::parse_status(status)?;
        let at = match at {
            Some(s) => parse_cli_datetime(s)?,
            None => now_local(),
        };
        let person = person.as_deref().unwrap_or(&cfg.person_name);

        let store = AttendanceStore::open(&cfg.database)?.with_default_role(&cfg.person_role);
        MarkLogic::apply(&store, cfg, person, Transition::new(at, status))?;
    }

    Ok(())
}
