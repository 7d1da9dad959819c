//! Shared types used across the store, compositor, and web layers.
//!
//! A [`StudentRecord`] is created once at registration and never mutated or
//! deleted afterwards. The web layer builds a [`NewRecord`] only after
//! validation and asset writing succeed, so the store never sees a partial
//! record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Course options offered on the registration form.
///
/// Advisory only — the store accepts any non-empty string, so records
/// imported from elsewhere (or submitted by hand) are not rejected.
pub const COURSES: &[&str] = &["BSIT", "BSCS", "BSIS", "BSHM", "BSA", "BSBA"];

/// Year level options offered on the registration form. Advisory, like
/// [`COURSES`].
pub const LEVELS: &[&str] = &["1", "2", "3", "4"];

/// A persisted student registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentRecord {
    /// Store-assigned surrogate key.
    pub id: i64,
    /// Externally-assigned student identifier. Lookup key for the public
    /// viewer page. Non-empty, but NOT unique across records.
    pub idno: String,
    pub lastname: String,
    pub firstname: String,
    /// Program/course name. Free-form; see [`COURSES`].
    pub course: String,
    /// Year level. Free-form; see [`LEVELS`].
    pub level: String,
    /// Photo file name relative to the upload directory.
    pub photo_path: String,
    /// QR code file name relative to the upload directory.
    pub qr_path: String,
    /// Assigned by the store at insert time.
    pub created_at: DateTime<Utc>,
}

/// A validated registration ready for insertion.
///
/// Both asset files already exist on disk when this is built — the insert
/// writes all fields together or not at all.
#[derive(Debug, Clone)]
pub struct NewRecord {
    pub idno: String,
    pub lastname: String,
    pub firstname: String,
    pub course: String,
    pub level: String,
    pub photo_path: String,
    pub qr_path: String,
}
