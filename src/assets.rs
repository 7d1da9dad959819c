//! Upload directory management.
//!
//! Uploaded photos and generated QR codes live as individual files in a
//! single shared directory. File names follow the
//! `{idno}_{role}_{unix-timestamp}.{ext}` convention so repeated
//! registrations of the same external id never collide.
//!
//! The external id is sanitized before it enters a file name; everything
//! outside `[A-Za-z0-9._-]` becomes `-`. Lookups by stored name refuse any
//! path that is not a single plain component, which keeps `/uploads/{name}`
//! from walking out of the directory.

use std::io;
use std::path::{Component, Path, PathBuf};

use base64::{Engine as _, engine::general_purpose::STANDARD};
use thiserror::Error;

/// Which card asset a stored file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetRole {
    Photo,
    Qr,
}

impl AssetRole {
    fn tag(self) -> &'static str {
        match self {
            Self::Photo => "photo",
            Self::Qr => "qr",
        }
    }

    /// Photos keep the `.jpg` extension of the submitted payload; QR codes
    /// are always written as PNG.
    fn extension(self) -> &'static str {
        match self {
            Self::Photo => "jpg",
            Self::Qr => "png",
        }
    }
}

/// Failure to turn a submitted photo payload into image bytes.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("photo payload is not a data URI")]
    NotADataUri,
    #[error("photo payload base64 decode failed: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("photo payload is not a decodable image: {0}")]
    Image(#[from] image::ImageError),
}

/// Decode a `data:image/...;base64,....` payload into raw image bytes.
///
/// The bytes are test-decoded before being accepted, so a payload that
/// base64-decodes to garbage is rejected here rather than surfacing later
/// as a render failure.
pub fn decode_photo_data_uri(payload: &str) -> Result<Vec<u8>, DecodeError> {
    let (_, encoded) = payload.split_once(',').ok_or(DecodeError::NotADataUri)?;
    let bytes = STANDARD.decode(encoded.trim())?;
    image::load_from_memory(&bytes)?;
    Ok(bytes)
}

/// Handle to the shared upload directory.
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the upload directory if it does not exist. Called once at
    /// startup.
    pub fn ensure_dir(&self) -> io::Result<()> {
        std::fs::create_dir_all(&self.root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Build the stored file name for an asset.
    pub fn asset_filename(idno: &str, role: AssetRole, timestamp: i64) -> String {
        format!(
            "{}_{}_{}.{}",
            sanitize(idno),
            role.tag(),
            timestamp,
            role.extension()
        )
    }

    /// Write asset bytes under the given stored name.
    pub fn save(&self, name: &str, bytes: &[u8]) -> io::Result<()> {
        std::fs::write(self.root.join(name), bytes)
    }

    /// Resolve a stored name to its path inside the upload directory.
    ///
    /// Returns `None` for anything that is not a single plain path
    /// component (`..`, absolute paths, separators).
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        let path = Path::new(name);
        let mut components = path.components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Some(self.root.join(name)),
            _ => None,
        }
    }
}

fn sanitize(idno: &str) -> String {
    idno.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbImage};
    use std::io::Cursor;

    fn synthetic_png_data_uri() -> String {
        let img = RgbImage::from_pixel(8, 8, image::Rgb([10, 20, 30]));
        let mut buf = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        format!(
            "data:image/png;base64,{}",
            STANDARD.encode(buf.get_ref())
        )
    }

    #[test]
    fn decode_valid_data_uri() {
        let bytes = decode_photo_data_uri(&synthetic_png_data_uri()).unwrap();
        let img = image::load_from_memory(&bytes).unwrap();
        assert_eq!(img.width(), 8);
    }

    #[test]
    fn decode_rejects_payload_without_comma() {
        assert!(matches!(
            decode_photo_data_uri("no-comma-here"),
            Err(DecodeError::NotADataUri)
        ));
    }

    #[test]
    fn decode_rejects_bad_base64() {
        assert!(matches!(
            decode_photo_data_uri("data:image/png;base64,!!!not-base64!!!"),
            Err(DecodeError::Base64(_))
        ));
    }

    #[test]
    fn decode_rejects_non_image_bytes() {
        let payload = format!("data:image/png;base64,{}", STANDARD.encode(b"just text"));
        assert!(matches!(
            decode_photo_data_uri(&payload),
            Err(DecodeError::Image(_))
        ));
    }

    #[test]
    fn asset_filename_follows_convention() {
        let name = UploadStore::asset_filename("2021-001", AssetRole::Photo, 1700000000);
        assert_eq!(name, "2021-001_photo_1700000000.jpg");
        let name = UploadStore::asset_filename("2021-001", AssetRole::Qr, 1700000000);
        assert_eq!(name, "2021-001_qr_1700000000.png");
    }

    #[test]
    fn asset_filename_sanitizes_idno() {
        let name = UploadStore::asset_filename("../evil id", AssetRole::Photo, 1);
        assert_eq!(name, "..-evil-id_photo_1.jpg");
        assert!(!name.contains('/'));
    }

    #[test]
    fn save_and_resolve() {
        let tmp = tempfile::TempDir::new().unwrap();
        let uploads = UploadStore::new(tmp.path());
        uploads.ensure_dir().unwrap();

        uploads.save("a_photo_1.jpg", b"bytes").unwrap();
        let path = uploads.resolve("a_photo_1.jpg").unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"bytes");
    }

    #[test]
    fn resolve_rejects_traversal() {
        let uploads = UploadStore::new("/srv/uploads");
        assert!(uploads.resolve("../etc/passwd").is_none());
        assert!(uploads.resolve("a/b.png").is_none());
        assert!(uploads.resolve("/abs.png").is_none());
        assert!(uploads.resolve("..").is_none());
        assert!(uploads.resolve("").is_none());
    }
}
