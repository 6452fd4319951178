use crate::db::initialize::init_db;
use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::db::queries;
use crate::errors::{AppError, AppResult};
use crate::models::person::DEFAULT_ROLE;
use crate::models::{AttendanceRecord, AttendanceStatus, Person};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::Connection;
use std::sync::{Mutex, MutexGuard};

/// What `record_transition` did to the day's row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Created(i64),
    Updated(i64),
    /// Replay of an already applied (or older) transition; nothing written.
    Unchanged(i64),
}

impl RecordOutcome {
    pub fn record_id(&self) -> i64 {
        match *self {
            RecordOutcome::Created(id) | RecordOutcome::Updated(id) | RecordOutcome::Unchanged(id) => id,
        }
    }

    /// True when the row was inserted or changed. Only those get a day-log line.
    pub fn is_write(&self) -> bool {
        !matches!(self, RecordOutcome::Unchanged(_))
    }
}

/// Durable attendance: one row per (person, local calendar date).
///
/// All access goes through one mutex-guarded connection, so writers are
/// serialized and in-process readers only ever see committed rows. Each
/// write is a single SQLite transaction, which gives the same guarantee to
/// readers in other processes.
pub struct AttendanceStore {
    pool: Mutex<DbPool>,
    default_role: String,
}

impl AttendanceStore {
    /// Open (and migrate) the database at `path`.
    pub fn open(path: &str) -> AppResult<Self> {
        Self::from_pool(DbPool::new(path)?)
    }

    pub fn in_memory() -> AppResult<Self> {
        Self::from_pool(DbPool::in_memory()?)
    }

    pub fn from_connection(conn: Connection) -> AppResult<Self> {
        Self::from_pool(DbPool::from_connection(conn)?)
    }

    fn from_pool(pool: DbPool) -> AppResult<Self> {
        init_db(&pool.conn)?;
        Ok(Self {
            pool: Mutex::new(pool),
            default_role: DEFAULT_ROLE.to_string(),
        })
    }

    /// Role given to people created on their first attendance write.
    pub fn with_default_role(mut self, role: &str) -> Self {
        self.default_role = role.to_string();
        self
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, DbPool>> {
        self.pool
            .lock()
            .map_err(|e| AppError::StoreUnavailable(e.to_string()))
    }

    pub fn ensure_person(&self, name: &str) -> AppResult<Person> {
        let pool = self.lock()?;
        resolve_person(&pool.conn, name, &self.default_role)
    }

    /// Apply one presence transition to the (person, date) row.
    ///
    /// - no row for the day: insert with `time_in = at`
    /// - row exists: set `time_out = at` and `status`; `time_in` is kept
    /// - same timestamp and status as the row's last write: replay,
    ///   nothing written
    ///
    /// A transition older than the last write still updates the row, so a
    /// manual correction is never dropped.
    ///
    /// `image` is stored only if the row does not reference one yet.
    pub fn record_transition(
        &self,
        person: &str,
        at: NaiveDateTime,
        status: AttendanceStatus,
        image: Option<&str>,
    ) -> AppResult<RecordOutcome> {
        let mut pool = self.lock()?;
        let tx = pool.conn.transaction()?;

        let person = resolve_person(&tx, person, &self.default_role)?;

        let outcome = match queries::find_record(&tx, person.id, &at.date())? {
            None => {
                let id = queries::insert_record(&tx, person.id, &at, status, image)?;
                RecordOutcome::Created(id)
            }
            Some(rec) if is_replay(&rec, &at, status) => {
                if let Some(path) = image {
                    queries::set_image_if_missing(&tx, rec.id, path)?;
                }
                RecordOutcome::Unchanged(rec.id)
            }
            Some(rec) => {
                queries::update_record(&tx, rec.id, &at, status, image)?;
                RecordOutcome::Updated(rec.id)
            }
        };

        tx.commit()?;
        log::debug!(
            "attendance {} {} at {}: {:?}",
            person.name,
            status,
            at,
            outcome
        );
        Ok(outcome)
    }

    pub fn record_for(&self, person: &str, date: NaiveDate) -> AppResult<Option<AttendanceRecord>> {
        let pool = self.lock()?;
        match queries::find_person(&pool.conn, person)? {
            Some(p) => queries::find_record(&pool.conn, p.id, &date),
            None => Ok(None),
        }
    }

    /// Records of the day, by `time_in` ascending.
    pub fn list_records_for_date(&self, date: NaiveDate) -> AppResult<Vec<AttendanceRecord>> {
        let pool = self.lock()?;
        queries::load_records_by_date(&pool.conn, &date)
    }

    /// Status of the day's latest record; ABSENT when the day has none.
    pub fn current_status(&self, date: NaiveDate) -> AppResult<AttendanceStatus> {
        let pool = self.lock()?;
        Ok(queries::latest_status_for_date(&pool.conn, &date)?.unwrap_or_default())
    }

    /// Append to the internal `log` table.
    pub fn audit(&self, operation: &str, target: &str, message: &str) -> AppResult<()> {
        let pool = self.lock()?;
        ttlog(&pool.conn, operation, target, message)
    }
}

fn resolve_person(conn: &Connection, name: &str, role: &str) -> AppResult<Person> {
    match queries::find_person(conn, name)? {
        Some(p) => Ok(p),
        None => queries::insert_person(conn, name, role),
    }
}

fn is_replay(rec: &AttendanceRecord, at: &NaiveDateTime, status: AttendanceStatus) -> bool {
    let last_write = rec.time_out.unwrap_or(rec.time_in);
    *at == last_write && status == rec.status
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    const P: &str = "Person 1";

    fn at(h: u32, m: u32) -> NaiveDateTime {
        day().and_hms_opt(h, m, 0).unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 1).unwrap()
    }

    #[test]
    fn present_then_absent_same_day_is_one_record() {
        let store = AttendanceStore::in_memory().unwrap();

        let first = store
            .record_transition(P, at(9, 0), AttendanceStatus::Present, None)
            .unwrap();
        let second = store
            .record_transition(P, at(17, 0), AttendanceStatus::Absent, None)
            .unwrap();

        assert!(matches!(first, RecordOutcome::Created(_)));
        assert_eq!(second, RecordOutcome::Updated(first.record_id()));

        let rows = store.list_records_for_date(day()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].time_in, at(9, 0));
        assert_eq!(rows[0].time_out, Some(at(17, 0)));
        assert_eq!(rows[0].status, AttendanceStatus::Absent);
        assert_eq!(rows[0].person_name, P);
    }

    #[test]
    fn later_transitions_never_touch_time_in() {
        let store = AttendanceStore::in_memory().unwrap();
        for (h, s) in [
            (8, AttendanceStatus::Present),
            (10, AttendanceStatus::Absent),
            (11, AttendanceStatus::Present),
            (12, AttendanceStatus::Absent),
        ] {
            store.record_transition(P, at(h, 0), s, None).unwrap();
        }

        let rec = store.record_for(P, day()).unwrap().unwrap();
        assert_eq!(rec.time_in, at(8, 0));
        assert_eq!(rec.time_out, Some(at(12, 0)));
        assert_eq!(rec.status, AttendanceStatus::Absent);
    }

    #[test]
    fn replaying_a_transition_is_idempotent() {
        let store = AttendanceStore::in_memory().unwrap();

        let a = store
            .record_transition(P, at(9, 0), AttendanceStatus::Present, None)
            .unwrap();
        let b = store
            .record_transition(P, at(9, 0), AttendanceStatus::Present, None)
            .unwrap();
        assert_eq!(b, RecordOutcome::Unchanged(a.record_id()));

        store
            .record_transition(P, at(17, 0), AttendanceStatus::Absent, None)
            .unwrap();
        let c = store
            .record_transition(P, at(17, 0), AttendanceStatus::Absent, None)
            .unwrap();
        assert_eq!(c, RecordOutcome::Unchanged(a.record_id()));

        let rows = store.list_records_for_date(day()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].time_in, at(9, 0));
        assert_eq!(rows[0].time_out, Some(at(17, 0)));
        assert_eq!(rows[0].status, AttendanceStatus::Absent);
    }

    #[test]
    fn late_correction_updates_the_row() {
        let store = AttendanceStore::in_memory().unwrap();
        let first = store
            .record_transition(P, at(9, 0), AttendanceStatus::Present, None)
            .unwrap();
        store
            .record_transition(P, at(17, 0), AttendanceStatus::Absent, None)
            .unwrap();

        let fix = store
            .record_transition(P, at(12, 0), AttendanceStatus::Present, None)
            .unwrap();
        assert_eq!(fix, RecordOutcome::Updated(first.record_id()));

        let rec = store.record_for(P, day()).unwrap().unwrap();
        assert_eq!(rec.time_in, at(9, 0));
        assert_eq!(rec.time_out, Some(at(12, 0)));
        assert_eq!(rec.status, AttendanceStatus::Present);
    }

    #[test]
    fn same_time_with_other_status_is_not_a_replay() {
        let store = AttendanceStore::in_memory().unwrap();
        let first = store
            .record_transition(P, at(9, 0), AttendanceStatus::Present, None)
            .unwrap();
        let out = store
            .record_transition(P, at(9, 0), AttendanceStatus::Absent, None)
            .unwrap();
        assert_eq!(out, RecordOutcome::Updated(first.record_id()));
        assert_eq!(
            store.current_status(day()).unwrap(),
            AttendanceStatus::Absent
        );
    }

    #[test]
    fn absent_first_transition_still_creates_a_record() {
        let store = AttendanceStore::in_memory().unwrap();
        let out = store
            .record_transition(P, at(7, 30), AttendanceStatus::Absent, None)
            .unwrap();
        assert!(matches!(out, RecordOutcome::Created(_)));

        let rec = store.record_for(P, day()).unwrap().unwrap();
        assert_eq!(rec.time_in, at(7, 30));
        assert_eq!(rec.time_out, None);
        assert_eq!(rec.status, AttendanceStatus::Absent);
    }

    #[test]
    fn new_day_gets_new_record() {
        let store = AttendanceStore::in_memory().unwrap();
        store
            .record_transition(P, at(9, 0), AttendanceStatus::Present, None)
            .unwrap();
        let next = day().succ_opt().unwrap().and_hms_opt(9, 0, 0).unwrap();
        let out = store
            .record_transition(P, next, AttendanceStatus::Present, None)
            .unwrap();
        assert!(matches!(out, RecordOutcome::Created(_)));
        assert_eq!(store.list_records_for_date(day()).unwrap().len(), 1);
        assert_eq!(
            store
                .list_records_for_date(day().succ_opt().unwrap())
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn person_created_once_with_default_role() {
        let store = AttendanceStore::in_memory().unwrap().with_default_role("staff");
        let a = store.ensure_person("Desk 4").unwrap();
        let b = store.ensure_person("Desk 4").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.role, "staff");
    }

    #[test]
    fn first_image_of_the_day_wins() {
        let store = AttendanceStore::in_memory().unwrap();
        store
            .record_transition(P, at(9, 0), AttendanceStatus::Present, Some("person_0.jpg"))
            .unwrap();
        store
            .record_transition(P, at(9, 10), AttendanceStatus::Absent, None)
            .unwrap();
        store
            .record_transition(P, at(9, 20), AttendanceStatus::Present, Some("person_1.jpg"))
            .unwrap();

        let rec = store.record_for(P, day()).unwrap().unwrap();
        assert_eq!(rec.image_path.as_deref(), Some("person_0.jpg"));
    }

    #[test]
    fn current_status_defaults_to_absent() {
        let store = AttendanceStore::in_memory().unwrap();
        assert_eq!(
            store.current_status(day()).unwrap(),
            AttendanceStatus::Absent
        );

        store
            .record_transition(P, at(9, 0), AttendanceStatus::Present, None)
            .unwrap();
        assert_eq!(
            store.current_status(day()).unwrap(),
            AttendanceStatus::Present
        );
    }

    #[test]
    fn listing_is_ordered_by_time_in() {
        let store = AttendanceStore::in_memory().unwrap();
        store
            .record_transition("B", at(10, 0), AttendanceStatus::Present, None)
            .unwrap();
        store
            .record_transition("A", at(8, 0), AttendanceStatus::Present, None)
            .unwrap();

        let names: Vec<String> = store
            .list_records_for_date(day())
            .unwrap()
            .into_iter()
            .map(|r| r.person_name)
            .collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn readers_never_see_half_written_rows() {
        let store = Arc::new(AttendanceStore::in_memory().unwrap());

        let writer = {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..200u32 {
                    let status = AttendanceStatus::from_present(i % 2 == 0);
                    let ts = day().and_hms_opt(8, 0, 0).unwrap()
                        + chrono::TimeDelta::seconds(i as i64);
                    store.record_transition(P, ts, status, None).unwrap();
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..100 {
                        let rows = store.list_records_for_date(day()).unwrap();
                        assert!(rows.len() <= 1);
                        if let Some(r) = rows.first() {
                            assert_eq!(r.time_in, at(8, 0));
                            if let Some(out) = r.time_out {
                                assert!(out > r.time_in);
                            }
                        }
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for r in readers {
            r.join().unwrap();
        }
        assert_eq!(store.list_records_for_date(day()).unwrap().len(), 1);
    }

    #[test]
    fn reopening_a_file_database_keeps_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.sqlite");
        let path = path.to_string_lossy().to_string();

        {
            let store = AttendanceStore::open(&path).unwrap();
            store
                .record_transition(P, at(9, 0), AttendanceStatus::Present, None)
                .unwrap();
        }
        let store = AttendanceStore::open(&path).unwrap();
        let out = store
            .record_transition(P, at(12, 0), AttendanceStatus::Absent, None)
            .unwrap();
        assert!(matches!(out, RecordOutcome::Updated(_)));
    }
}
