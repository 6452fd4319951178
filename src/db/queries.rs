use crate::errors::{AppError, AppResult};
use crate::models::{AttendanceRecord, AttendanceStatus, Person};
use crate::utils::time::{fmt_date, fmt_ts, parse_ts};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{Connection, OptionalExtension, Result, Row, params};

const RECORD_SELECT: &str = "SELECT a.id, a.person_id, p.name AS person_name, a.date,
            a.time_in, a.time_out, a.status, a.image_path
     FROM attendance a
     JOIN person p ON p.id = a.person_id";

fn conversion_error(row: &Row, col: &str, err: AppError) -> rusqlite::Error {
    let idx = row.as_ref().column_index(col).unwrap_or(0);
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(err))
}

fn get_ts(row: &Row, col: &str) -> Result<Option<NaiveDateTime>> {
    let raw: Option<String> = row.get(col)?;
    match raw {
        None => Ok(None),
        Some(s) => parse_ts(&s)
            .map(Some)
            .ok_or_else(|| conversion_error(row, col, AppError::InvalidTime(s))),
    }
}

pub fn map_record(row: &Row) -> Result<AttendanceRecord> {
    let date_str: String = row.get("date")?;
    let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
        .map_err(|_| conversion_error(row, "date", AppError::InvalidDate(date_str.clone())))?;

    let time_in = get_ts(row, "time_in")?
        .ok_or_else(|| conversion_error(row, "time_in", AppError::InvalidTime("missing time_in".into())))?;

    let status_str: String = row.get("status")?;
    let status = AttendanceStatus::from_db_str(&status_str)
        .ok_or_else(|| conversion_error(row, "status", AppError::InvalidStatus(status_str.clone())))?;

    Ok(AttendanceRecord {
        id: row.get("id")?,
        person_id: row.get("person_id")?,
        person_name: row.get("person_name")?,
        date,
        time_in,
        time_out: get_ts(row, "time_out")?,
        status,
        image_path: row.get("image_path")?,
    })
}

fn map_person(row: &Row) -> Result<Person> {
    Ok(Person {
        id: row.get("id")?,
        name: row.get("name")?,
        role: row
            .get::<_, Option<String>>("role")?
            .unwrap_or_else(|| crate::models::person::DEFAULT_ROLE.to_string()),
        created_at: row
            .get::<_, Option<String>>("created_at")?
            .unwrap_or_default(),
    })
}

/// Earliest person with this exact name (first write wins).
pub fn find_person(conn: &Connection, name: &str) -> AppResult<Option<Person>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, name, role, created_at FROM person WHERE name = ?1 ORDER BY id ASC LIMIT 1",
    )?;
    Ok(stmt.query_row([name], map_person).optional()?)
}

pub fn insert_person(conn: &Connection, name: &str, role: &str) -> AppResult<Person> {
    conn.execute(
        "INSERT INTO person (name, role) VALUES (?1, ?2)",
        params![name, role],
    )?;
    let id = conn.last_insert_rowid();
    let mut stmt =
        conn.prepare_cached("SELECT id, name, role, created_at FROM person WHERE id = ?1")?;
    Ok(stmt.query_row([id], map_person)?)
}

pub fn find_record(
    conn: &Connection,
    person_id: i64,
    date: &NaiveDate,
) -> AppResult<Option<AttendanceRecord>> {
    let sql = format!("{RECORD_SELECT} WHERE a.person_id = ?1 AND a.date = ?2");
    let mut stmt = conn.prepare_cached(&sql)?;
    Ok(stmt
        .query_row(params![person_id, fmt_date(date)], map_record)
        .optional()?)
}

pub fn insert_record(
    conn: &Connection,
    person_id: i64,
    at: &NaiveDateTime,
    status: AttendanceStatus,
    image_path: Option<&str>,
) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO attendance (person_id, date, time_in, time_out, status, image_path)
         VALUES (?1, ?2, ?3, NULL, ?4, ?5)",
        params![
            person_id,
            fmt_date(&at.date()),
            fmt_ts(at),
            status.to_db_str(),
            image_path,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Close or re-open the day: `time_in` is never touched here.
/// An image is only attached when the row has none yet.
pub fn update_record(
    conn: &Connection,
    id: i64,
    at: &NaiveDateTime,
    status: AttendanceStatus,
    image_path: Option<&str>,
) -> AppResult<()> {
    conn.execute(
        "UPDATE attendance
         SET time_out = ?1, status = ?2, image_path = COALESCE(image_path, ?3)
         WHERE id = ?4",
        params![fmt_ts(at), status.to_db_str(), image_path, id],
    )?;
    Ok(())
}

/// Returns true when a row was changed.
pub fn set_image_if_missing(conn: &Connection, id: i64, image_path: &str) -> AppResult<bool> {
    let n = conn.execute(
        "UPDATE attendance SET image_path = ?1 WHERE id = ?2 AND image_path IS NULL",
        params![image_path, id],
    )?;
    Ok(n > 0)
}

pub fn load_records_by_date(conn: &Connection, date: &NaiveDate) -> AppResult<Vec<AttendanceRecord>> {
    let sql = format!("{RECORD_SELECT} WHERE a.date = ?1 ORDER BY a.time_in ASC, a.id ASC");
    let mut stmt = conn.prepare_cached(&sql)?;

    let rows = stmt.query_map([fmt_date(date)], map_record)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Status of the most recent record of the day, if any.
pub fn latest_status_for_date(
    conn: &Connection,
    date: &NaiveDate,
) -> AppResult<Option<AttendanceStatus>> {
    let mut stmt = conn.prepare_cached(
        "SELECT status FROM attendance
         WHERE date = ?1
         ORDER BY COALESCE(time_out, time_in) DESC, id DESC
         LIMIT 1",
    )?;
    let raw: Option<String> = stmt.query_row([fmt_date(date)], |r| r.get(0)).optional()?;
    match raw {
        None => Ok(None),
        Some(s) => AttendanceStatus::from_db_str(&s)
            .map(Some)
            .ok_or(AppError::InvalidStatus(s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrate::run_pending_migrations;

    fn seeded(time_in: &str, time_out: Option<&str>) -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_pending_migrations(&conn).unwrap();
        let person = insert_person(&conn, "Person 1", "Employee").unwrap();
        conn.execute(
            "INSERT INTO attendance (person_id, date, time_in, time_out, status)
             VALUES (?1, '2025-09-01', ?2, ?3, 'PRESENT')",
            params![person.id, time_in, time_out],
        )
        .unwrap();
        conn
    }

    fn failing_column(conn: &Connection) -> usize {
        let day = NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();
        match load_records_by_date(conn, &day) {
            Err(AppError::Db(rusqlite::Error::FromSqlConversionFailure(idx, _, _))) => idx,
            other => panic!("expected a conversion failure, got {other:?}"),
        }
    }

    #[test]
    fn bad_time_in_names_its_column() {
        let conn = seeded("garbage", None);
        assert_eq!(failing_column(&conn), 4);
    }

    #[test]
    fn bad_time_out_names_its_column() {
        let conn = seeded("2025-09-01 09:00:00", Some("17h"));
        assert_eq!(failing_column(&conn), 5);
    }
}
