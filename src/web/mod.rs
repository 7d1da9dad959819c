//! HTTP front end.
//!
//! axum router over four behaviors the system depends on —
//! accept-and-persist-registration, public-view-by-external-id,
//! export-as-bitmap, export-as-document — plus the registration form,
//! records listing, and upload serving around them.
//!
//! Shared state is read-only: the parsed config and the font quartet
//! loaded once at startup. Store handles are opened per request inside the
//! handlers, never here.

pub mod error;
pub mod handlers;
pub mod pages;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tracing::info;

use crate::card::fonts::FontQuartet;
use crate::config::AppConfig;

/// Immutable per-process state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub fonts: Arc<FontQuartet>,
}

impl AppState {
    /// Build state from a validated config, loading fonts once. A failed
    /// font load is not an error — the compositor falls back to its
    /// built-in face.
    pub fn new(config: AppConfig) -> Self {
        let fonts = FontQuartet::load(&config.fonts);
        Self {
            config: Arc::new(config),
            fonts: Arc::new(fonts),
        }
    }
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/save", post(handlers::save))
        .route("/student/{idno}", get(handlers::view_student))
        .route("/records", get(handlers::records))
        .route("/export/png/{id}", get(handlers::export_png))
        .route("/export/pdf/{id}", get(handlers::export_pdf))
        .route("/uploads/{name}", get(handlers::serve_upload))
        .with_state(state)
}

/// Bind and serve until the process is stopped. Expects the schema
/// migration and upload directory creation to have already run.
pub async fn serve(config: AppConfig) -> std::io::Result<()> {
    let bind = config.server.bind.clone();
    let state = AppState::new(config);
    let app = app_router(state);

    let listener = TcpListener::bind(&bind).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await
}
