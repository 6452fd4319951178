use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::initialize::init_db;
use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::db::stats;
use crate::errors::AppResult;
use crate::ui::messages::{error, info, success};
use rusqlite::Connection;

/// (person_id, date) pairs holding more than one attendance row.
fn duplicate_days(conn: &Connection) -> AppResult<i64> {
    let n = conn.query_row(
        "SELECT COUNT(*) FROM (
             SELECT 1 FROM attendance GROUP BY person_id, date HAVING COUNT(*) > 1
         )",
        [],
        |row| row.get(0),
    )?;
    Ok(n)
}

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Db {
        migrate,
        check,
        vacuum,
        info: show_info,
    } = cmd
    {
        let mut pool = DbPool::new(&cfg.database)?;

        if *migrate {
            info("Running migrations…");
            init_db(&pool.conn)?;
            success("Schema is up to date.");
        }

        if *show_info {
            stats::print_db_info(&mut pool, &cfg.database)?;
        }

        if *check {
            info("Running integrity check…");
            let integrity: String = pool
                .conn
                .query_row("PRAGMA integrity_check;", [], |row| row.get(0))?;

            if integrity == "ok" {
                success("Integrity check passed.");
            } else {
                error(format!("Integrity check failed: {}", integrity));
            }

            match duplicate_days(&pool.conn) {
                Ok(0) => success("One attendance row per person and day."),
                Ok(n) => error(format!(
                    "{} person/day pair(s) with more than one row, run `db --migrate`",
                    n
                )),
                Err(e) => error(format!("Attendance table not readable: {}", e)),
            }
        }

        if *vacuum {
            info("Running VACUUM…");
            pool.conn.execute_batch("VACUUM;")?;
            if let Err(e) = ttlog(&pool.conn, "vacuum", &cfg.database, "Database compacted") {
                log::warn!("internal log write failed: {}", e);
            }
            success("Vacuum completed.");
        }
    }

    Ok(())
}
