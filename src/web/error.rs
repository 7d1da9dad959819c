//! Boundary error mapping.
//!
//! Every failure category surfaces as a user-visible response for the one
//! request that hit it; nothing is retried and nothing takes the process
//! down. Client mistakes (missing fields, bad photo payloads) map to 400,
//! unknown ids to 404, everything else to 500.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::assets::DecodeError;
use crate::card::RenderError;
use crate::card::export::ExportError;
use crate::qr::QrError;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum ApiError {
    /// A required registration field is absent or empty.
    #[error("missing required field: {0}")]
    Validation(&'static str),
    #[error("photo decode failed: {0}")]
    Decode(#[from] DecodeError),
    /// Unknown record id or external id.
    #[error("not found")]
    NotFound,
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Qr(#[from] QrError),
    #[error("image encode failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Decode(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Render(_)
            | Self::Export(_)
            | Self::Store(_)
            | Self::Qr(_)
            | Self::Image(_)
            | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("request failed: {self}");
        }
        let body = Json(json!({ "status": "error", "msg": self.to_string() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_bad_request() {
        assert_eq!(
            ApiError::Validation("lastname").status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn decode_maps_to_bad_request() {
        assert_eq!(
            ApiError::Decode(DecodeError::NotADataUri).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn not_found_maps_to_404() {
        assert_eq!(ApiError::NotFound.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn asset_missing_maps_to_server_error() {
        let err = ApiError::Render(RenderError::AssetMissing {
            path: "/uploads/gone.jpg".into(),
        });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().contains("gone.jpg"));
    }
}
