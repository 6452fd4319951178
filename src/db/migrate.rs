use crate::ui::messages::{success, warning};
use rusqlite::{Connection, OptionalExtension, Result};

/// Ensure that the `log` table exists.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type='table' AND name=?1")?;
    let exists: Option<String> = stmt.query_row([name], |row| row.get(0)).optional()?;
    Ok(exists.is_some())
}

fn index_exists(conn: &Connection, name: &str) -> Result<bool> {
    let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type='index' AND name=?1")?;
    let exists: Option<String> = stmt.query_row([name], |row| row.get(0)).optional()?;
    Ok(exists.is_some())
}

fn has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info('{table}')"))?;
    let cols = stmt.query_map([], |row| row.get::<_, String>(1))?;

    for c in cols {
        if c? == column {
            return Ok(true);
        }
    }
    Ok(false)
}

fn migration_applied(conn: &Connection, version: &str) -> Result<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

fn mark_applied(conn: &Connection, version: &str, message: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (datetime('now', 'localtime'), 'migration_applied', ?1, ?2)",
        [version, message],
    )?;
    Ok(())
}

/// Create the `person` table.
fn create_person_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS person (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL,
            role        TEXT NOT NULL DEFAULT 'student',
            created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%S', 'now', 'localtime'))
        );

        CREATE INDEX IF NOT EXISTS idx_person_name ON person(name);
        "#,
    )?;
    Ok(())
}

/// Create the `attendance` table with the modern schema.
fn create_attendance_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS attendance (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            person_id   INTEGER NOT NULL REFERENCES person(id),
            date        TEXT NOT NULL,
            time_in     TEXT NOT NULL,
            time_out    TEXT,
            status      TEXT NOT NULL CHECK(status IN ('PRESENT','ABSENT')),
            image_path  TEXT
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_attendance_person_date
            ON attendance(person_id, date);
        CREATE INDEX IF NOT EXISTS idx_attendance_date_time_in
            ON attendance(date, time_in);
        "#,
    )?;
    Ok(())
}

/// Older attendance tables were created without a column for the captured face.
fn migrate_add_image_path(conn: &Connection) -> Result<()> {
    let version = "20250301_0001_add_image_path";

    if migration_applied(conn, version)? || has_column(conn, "attendance", "image_path")? {
        return Ok(());
    }

    warning("Adding 'image_path' column to attendance table...");
    conn.execute("ALTER TABLE attendance ADD COLUMN image_path TEXT;", [])?;
    mark_applied(conn, version, "Added image_path to attendance")?;

    success(format!(
        "Migration applied: {} → added 'image_path' to attendance table",
        version
    ));
    Ok(())
}

/// Collapse duplicate (person, date) rows onto the earliest one, then enforce
/// uniqueness with an index.
fn migrate_unique_person_date(conn: &Connection) -> Result<()> {
    let version = "20250301_0002_unique_person_date";

    if index_exists(conn, "idx_attendance_person_date")? {
        return Ok(());
    }

    warning("Enforcing one attendance row per person and day...");

    let removed = conn.execute(
        r#"
        DELETE FROM attendance
        WHERE id NOT IN (
            SELECT MIN(id) FROM attendance GROUP BY person_id, date
        )
        "#,
        [],
    )?;

    conn.execute_batch(
        r#"
        UPDATE attendance SET status = UPPER(status);

        CREATE UNIQUE INDEX IF NOT EXISTS idx_attendance_person_date
            ON attendance(person_id, date);
        CREATE INDEX IF NOT EXISTS idx_attendance_date_time_in
            ON attendance(date, time_in);
        "#,
    )?;

    mark_applied(
        conn,
        version,
        &format!("Unique (person_id, date); {removed} duplicate row(s) removed"),
    )?;

    success(format!(
        "Migration applied: {} → {} duplicate row(s) removed",
        version, removed
    ));
    Ok(())
}

/// Public entry point: run all pending migrations.
///
/// Invoked by db::initialize::init_db().
pub fn run_pending_migrations(conn: &Connection) -> Result<()> {
    // 1) Ensure log table
    ensure_log_table(conn)?;

    // 2) Person table (legacy tables already match, only the index may be missing)
    create_person_table(conn)?;

    // 3) Attendance table: create or upgrade
    if !table_exists(conn, "attendance")? {
        create_attendance_table(conn)?;
        success("Created attendance table.");
    } else {
        migrate_add_image_path(conn)?;
        migrate_unique_person_date(conn)?;
    }

    Ok(())
}
