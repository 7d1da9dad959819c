//! Request handlers.
//!
//! Each handler is a thin async wrapper around a synchronous service
//! function. Every request that touches the registry opens its own store
//! handle at the top and drops it before doing any rendering or encoding —
//! there is no connection shared across requests or held in ambient state.

use std::io::Cursor;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use chrono::Utc;
use image::{DynamicImage, ImageFormat, RgbImage};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::AppState;
use super::error::ApiError;
use super::pages;
use crate::assets::{self, AssetRole, UploadStore};
use crate::card;
use crate::qr;
use crate::store::Store;
use crate::types::{NewRecord, StudentRecord};

/// Raw registration submission. Fields default to empty so that absent and
/// empty inputs fail validation the same way.
#[derive(Debug, Default, Deserialize)]
pub struct RegistrationRequest {
    #[serde(default)]
    pub idno: String,
    #[serde(default)]
    pub lastname: String,
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub course: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub photo_data: String,
}

#[derive(Debug, Serialize)]
pub struct RegistrationResponse {
    pub status: &'static str,
    pub id: i64,
    pub qr_url: String,
}

pub async fn index() -> Html<String> {
    Html(pages::index().into_string())
}

pub async fn save(
    State(state): State<AppState>,
    Json(req): Json<RegistrationRequest>,
) -> Result<Json<RegistrationResponse>, ApiError> {
    register(&state, req).map(Json)
}

/// Accept-and-persist-registration.
///
/// Validates, writes both asset files, then inserts the record in a single
/// statement. Nothing is persisted to the registry until both assets exist
/// on disk.
pub fn register(
    state: &AppState,
    req: RegistrationRequest,
) -> Result<RegistrationResponse, ApiError> {
    let req = trimmed(req);
    require(&req.idno, "idno")?;
    require(&req.lastname, "lastname")?;
    require(&req.firstname, "firstname")?;
    require(&req.course, "course")?;
    require(&req.level, "level")?;
    let photo_bytes = assets::decode_photo_data_uri(&req.photo_data)?;

    let uploads = UploadStore::new(&state.config.storage.upload_dir);
    let timestamp = Utc::now().timestamp();

    let photo_name = UploadStore::asset_filename(&req.idno, AssetRole::Photo, timestamp);
    uploads.save(&photo_name, &photo_bytes)?;

    let qr_image = qr::encode(&state.config.viewer_url(&req.idno))?;
    let qr_name = UploadStore::asset_filename(&req.idno, AssetRole::Qr, timestamp);
    let mut qr_png = Cursor::new(Vec::new());
    DynamicImage::ImageLuma8(qr_image).write_to(&mut qr_png, ImageFormat::Png)?;
    uploads.save(&qr_name, qr_png.get_ref())?;

    let store = Store::open(&state.config.storage.database_path)?;
    let id = store.insert(&NewRecord {
        idno: req.idno.clone(),
        lastname: req.lastname,
        firstname: req.firstname,
        course: req.course,
        level: req.level,
        photo_path: photo_name,
        qr_path: qr_name.clone(),
    })?;

    info!("registered student {id} (idno {})", req.idno);
    Ok(RegistrationResponse {
        status: "ok",
        id,
        qr_url: format!("/uploads/{qr_name}"),
    })
}

pub async fn view_student(
    State(state): State<AppState>,
    Path(idno): Path<String>,
) -> Result<Response, ApiError> {
    let store = Store::open(&state.config.storage.database_path)?;
    let found = store.find_by_idno(&idno)?;
    drop(store);

    Ok(match found {
        Some(record) => Html(pages::student_view(&record).into_string()).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Html(pages::student_not_found(&idno).into_string()),
        )
            .into_response(),
    })
}

pub async fn records(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let store = Store::open(&state.config.storage.database_path)?;
    let students = store.list_all()?;
    drop(store);
    Ok(Html(pages::records(&students).into_string()))
}

pub async fn export_png(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let (record, rendered) = render_card(&state, id)?;
    let bytes = card::export::encode_png(&rendered)?;
    Ok(attachment(
        bytes,
        "image/png",
        &format!("idcard_{}.png", record.id),
    ))
}

pub async fn export_pdf(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let (record, rendered) = render_card(&state, id)?;
    let bytes = card::export::encode_pdf(&rendered)?;
    Ok(attachment(
        bytes,
        "application/pdf",
        &format!("idcard_{}.pdf", record.id),
    ))
}

/// Export-by-id: one record read, then a render from its stored assets.
/// The store handle is released before the compositor runs.
pub fn render_card(state: &AppState, id: i64) -> Result<(StudentRecord, RgbImage), ApiError> {
    let store = Store::open(&state.config.storage.database_path)?;
    let record = store.find_by_id(id)?.ok_or(ApiError::NotFound)?;
    drop(store);

    let rendered = card::render(
        &record,
        &state.config.storage.upload_dir,
        &state.config.branding,
        &state.fonts,
    )?;
    Ok((record, rendered))
}

pub async fn serve_upload(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response, ApiError> {
    let uploads = UploadStore::new(&state.config.storage.upload_dir);
    let path = uploads.resolve(&name).ok_or(ApiError::NotFound)?;
    let bytes = std::fs::read(&path).map_err(|_| ApiError::NotFound)?;

    let content_type = match path.extension().and_then(|e| e.to_str()) {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    };
    Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
}

fn trimmed(req: RegistrationRequest) -> RegistrationRequest {
    RegistrationRequest {
        idno: req.idno.trim().to_string(),
        lastname: req.lastname.trim().to_string(),
        firstname: req.firstname.trim().to_string(),
        course: req.course.trim().to_string(),
        level: req.level.trim().to_string(),
        photo_data: req.photo_data,
    }
}

fn require(value: &str, field: &'static str) -> Result<(), ApiError> {
    if value.is_empty() {
        Err(ApiError::Validation(field))
    } else {
        Ok(())
    }
}

fn attachment(bytes: Vec<u8>, content_type: &'static str, filename: &str) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}
