//! Student registry persistence.
//!
//! SQLite-backed storage for [`StudentRecord`]s. Records are insert-only:
//! nothing in the system updates or deletes a row after registration.
//!
//! ## Connection lifecycle
//!
//! There is no shared or ambient connection. The HTTP layer calls
//! [`Store::open`] at the start of a request and drops the handle on every
//! exit path; the connection closes with it. Schema migration is a separate
//! explicit step ([`migrate`]) run once before serving traffic — `open`
//! never re-checks the schema.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;
use tracing::debug;

use crate::types::{NewRecord, StudentRecord};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to open database at {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    #[error("database query failed: {0}")]
    Query(#[from] rusqlite::Error),
    #[error("database migration failed: {message}")]
    Migration { message: String },
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Run the schema migration against the database at `path`, creating the
/// file (and parent directories) if needed. Called once at startup.
pub fn migrate(path: impl AsRef<Path>) -> Result<(), StoreError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::DirectoryCreate {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    let conn = Connection::open(path).map_err(|source| StoreError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
    migrations::initialize_schema(&conn)?;
    debug!("schema migrated at {}", path.display());
    Ok(())
}

/// A scoped handle to the student registry.
#[derive(Debug)]
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open a connection to an already-migrated database.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| StoreError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        Ok(Self { conn })
    }

    /// In-memory registry for tests. Runs the migration itself, since each
    /// in-memory database starts empty.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|source| StoreError::Open {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        migrations::initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Insert a registration and return the assigned id.
    ///
    /// All fields plus both asset paths go in a single statement, so a
    /// partial record can never be observed. `created_at` is assigned here.
    pub fn insert(&self, record: &NewRecord) -> Result<i64, StoreError> {
        let created_at = Utc::now().to_rfc3339();
        self.conn.execute(
            r"
            INSERT INTO students
                (idno, lastname, firstname, course, level, photo_path, qr_path, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ",
            params![
                record.idno,
                record.lastname,
                record.firstname,
                record.course,
                record.level,
                record.photo_path,
                record.qr_path,
                created_at,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!("inserted student record {id} for idno {}", record.idno);
        Ok(id)
    }

    /// Look up a record by its surrogate key.
    pub fn find_by_id(&self, id: i64) -> Result<Option<StudentRecord>, StoreError> {
        let result = self
            .conn
            .query_row(
                r"
                SELECT id, idno, lastname, firstname, course, level,
                       photo_path, qr_path, created_at
                FROM students WHERE id = ?1
                ",
                [id],
                Self::row_to_record,
            )
            .optional()?;
        Ok(result)
    }

    /// Look up a record by its external id.
    ///
    /// `idno` is not unique; when several records share one, the first
    /// inserted wins. The explicit ORDER BY makes that deterministic rather
    /// than an accident of row storage.
    pub fn find_by_idno(&self, idno: &str) -> Result<Option<StudentRecord>, StoreError> {
        let result = self
            .conn
            .query_row(
                r"
                SELECT id, idno, lastname, firstname, course, level,
                       photo_path, qr_path, created_at
                FROM students WHERE idno = ?1
                ORDER BY id ASC LIMIT 1
                ",
                [idno],
                Self::row_to_record,
            )
            .optional()?;
        Ok(result)
    }

    /// All records, newest first.
    pub fn list_all(&self) -> Result<Vec<StudentRecord>, StoreError> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT id, idno, lastname, firstname, course, level,
                   photo_path, qr_path, created_at
            FROM students ORDER BY created_at DESC, id DESC
            ",
        )?;

        let records = stmt
            .query_map([], Self::row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<StudentRecord> {
        let created_at_str: String = row.get(8)?;
        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_default();

        Ok(StudentRecord {
            id: row.get(0)?,
            idno: row.get(1)?,
            lastname: row.get(2)?,
            firstname: row.get(3)?,
            course: row.get(4)?,
            level: row.get(5)?,
            photo_path: row.get(6)?,
            qr_path: row.get(7)?,
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> Store {
        Store::open_in_memory().expect("failed to create test store")
    }

    fn test_record(idno: &str) -> NewRecord {
        NewRecord {
            idno: idno.into(),
            lastname: "Cruz".into(),
            firstname: "Ana".into(),
            course: "BSIT".into(),
            level: "3".into(),
            photo_path: format!("{idno}_photo_1700000000.jpg"),
            qr_path: format!("{idno}_qr_1700000000.png"),
        }
    }

    #[test]
    fn insert_and_find_by_id() {
        let store = test_store();
        let id = store.insert(&test_record("2021-001")).unwrap();

        let found = store.find_by_id(id).unwrap().unwrap();
        assert_eq!(found.id, id);
        assert_eq!(found.idno, "2021-001");
        assert_eq!(found.lastname, "Cruz");
        assert_eq!(found.firstname, "Ana");
        assert_eq!(found.course, "BSIT");
        assert_eq!(found.level, "3");
    }

    #[test]
    fn find_by_id_unknown_returns_none() {
        let store = test_store();
        assert!(store.find_by_id(99999).unwrap().is_none());
    }

    #[test]
    fn find_by_idno_returns_submitted_fields() {
        let store = test_store();
        store.insert(&test_record("2021-002")).unwrap();

        let found = store.find_by_idno("2021-002").unwrap().unwrap();
        assert_eq!(found.idno, "2021-002");
        assert_eq!(found.photo_path, "2021-002_photo_1700000000.jpg");
        assert_eq!(found.qr_path, "2021-002_qr_1700000000.png");
    }

    #[test]
    fn find_by_idno_unknown_returns_none() {
        let store = test_store();
        assert!(store.find_by_idno("missing").unwrap().is_none());
    }

    #[test]
    fn duplicate_idno_both_persisted_first_wins_lookup() {
        let store = test_store();
        let first = store.insert(&test_record("2021-003")).unwrap();
        let mut dup = test_record("2021-003");
        dup.firstname = "Maria".into();
        let second = store.insert(&dup).unwrap();
        assert_ne!(first, second);

        // Both rows exist...
        assert_eq!(store.list_all().unwrap().len(), 2);
        // ...and the viewer lookup deterministically returns the first.
        let found = store.find_by_idno("2021-003").unwrap().unwrap();
        assert_eq!(found.id, first);
        assert_eq!(found.firstname, "Ana");
    }

    #[test]
    fn list_all_newest_first() {
        let store = test_store();
        let a = store.insert(&test_record("2021-010")).unwrap();
        let b = store.insert(&test_record("2021-011")).unwrap();
        let c = store.insert(&test_record("2021-012")).unwrap();

        let all = store.list_all().unwrap();
        assert_eq!(all.len(), 3);
        // Inserts within one test share a timestamp, so the id tie-break
        // carries the ordering.
        assert_eq!(all[0].id, c);
        assert_eq!(all[1].id, b);
        assert_eq!(all[2].id, a);
    }

    #[test]
    fn created_at_is_assigned_by_store() {
        let store = test_store();
        let before = Utc::now();
        let id = store.insert(&test_record("2021-020")).unwrap();
        let after = Utc::now();

        let found = store.find_by_id(id).unwrap().unwrap();
        assert!(found.created_at >= before - chrono::Duration::seconds(1));
        assert!(found.created_at <= after + chrono::Duration::seconds(1));
    }

    #[test]
    fn migrate_then_open_file_database() {
        let tmp = tempfile::TempDir::new().unwrap();
        let db_path = tmp.path().join("students.db");

        migrate(&db_path).unwrap();
        let store = Store::open(&db_path).unwrap();
        let id = store.insert(&test_record("2021-030")).unwrap();
        drop(store);

        // A fresh handle sees the committed row.
        let store = Store::open(&db_path).unwrap();
        assert_eq!(store.find_by_id(id).unwrap().unwrap().idno, "2021-030");
    }

    #[test]
    fn migrate_creates_parent_directories() {
        let tmp = tempfile::TempDir::new().unwrap();
        let db_path = tmp.path().join("nested/dir/students.db");
        migrate(&db_path).unwrap();
        assert!(db_path.exists());
    }
}
