//! # Campus Card
//!
//! A small web service for registering students, generating a QR code per
//! student, and rendering a printable ID card. Registration stores a record
//! and two asset files; the card is composited on demand at export time and
//! never persisted.
//!
//! # Architecture
//!
//! ```text
//! POST /save        →  validate → write photo + QR files → insert record
//! GET  /student/id  →  viewer page (the URL the QR scans to)
//! GET  /export/...  →  read record → load assets → compose card → stream
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`card`] | The compositor — fixed-layout 1100×650 card, PNG/PDF export |
//! | [`store`] | SQLite registry: insert-only student records, startup migration |
//! | [`qr`] | Viewer-URL QR encoding |
//! | [`assets`] | Upload directory: data-URI decoding, asset file naming |
//! | [`web`] | axum routes, handlers, and maud pages |
//! | [`config`] | `config.toml` loading and validation |
//! | [`types`] | [`types::StudentRecord`] and friends |
//! | [`logging`] | tracing setup |
//!
//! # Design Decisions
//!
//! ## Scoped Store Handles
//!
//! No handler holds a database connection in shared or ambient state. Each
//! request opens its own handle, uses it, and drops it on every exit path.
//! Schema migration is a separate explicit startup step — `serve` migrates
//! once before binding the listener, and per-request opens never re-check
//! the schema.
//!
//! ## Deterministic Rendering
//!
//! The compositor is a pure function of the record fields and asset bytes.
//! Layout positions are constants, the validity caption is a static string,
//! and no clock or randomness is consulted, so re-rendering an unchanged
//! record yields byte-identical pixels. PNG and PDF exports re-encode the
//! same composed canvas without re-layout.
//!
//! ## All-or-Nothing Fonts
//!
//! The card draws four text roles. Either both configured TrueType faces
//! load and every role uses them, or all four roles fall back to a built-in
//! bitmap face. A card mixing loaded and fallback faces cannot be
//! represented — [`card::fonts::FontQuartet`] has exactly two states.
//!
//! ## Insert-Only Registry
//!
//! Records are never mutated or deleted. The external id is deliberately
//! not unique; duplicate registrations all persist, and the public viewer
//! resolves to the first inserted. Asset files are written before the
//! insert, so the registry never holds a record whose assets were never on
//! disk — the reverse (orphan files from a failed insert) is accepted.

pub mod assets;
pub mod card;
pub mod config;
pub mod logging;
pub mod qr;
pub mod store;
pub mod types;
pub mod web;
