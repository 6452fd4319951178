use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::status::StatusLogic;
use crate::errors::AppResult;
use crate::report::ReportResponse;
use crate::store::AttendanceStore;
use crate::utils::date::resolve_date;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Status { date, json } = cmd {
        let date = resolve_date(date)?;
        let store = match AttendanceStore::open(&cfg.database) {
            Ok(s) => s,
            Err(e) if *json => {
                // Same `{"error": ...}` shape as a failed query.
                let resp = ReportResponse::from_result(Err(e));
                println!("{}", resp.to_json()?);
                return Err(crate::errors::AppError::StoreUnavailable(cfg.database.clone()));
            }
            Err(e) => return Err(e),
        };
        StatusLogic::status(&store, cfg, date, *json)?;
    }

    Ok(())
}
