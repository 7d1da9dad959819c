//! SQLite schema for the student registry.

/// Statements executed to create the base schema. All are idempotent.
///
/// `idno` is deliberately NOT unique: repeated registrations of the same
/// external id are accepted and all persisted. The index exists for the
/// public viewer lookup.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS students (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        idno TEXT NOT NULL,
        lastname TEXT NOT NULL,
        firstname TEXT NOT NULL,
        course TEXT NOT NULL,
        level TEXT NOT NULL,
        photo_path TEXT NOT NULL,
        qr_path TEXT NOT NULL,
        created_at TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_students_idno ON students(idno)",
    "CREATE INDEX IF NOT EXISTS idx_students_created_at ON students(created_at)",
    "CREATE TABLE IF NOT EXISTS metadata (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    )",
];
