//! QR code generation.
//!
//! Encodes the public viewer URL for a student into a scannable raster
//! image. The module matrix from the `qrcode` crate is scaled up by an
//! integer factor toward the requested width and wrapped in a quiet-zone
//! border, then written as a PNG into the upload directory.

use image::{GrayImage, Luma};
use qrcode::QrCode;
use thiserror::Error;

/// Quiet-zone border around the code, in modules.
const BORDER_MODULES: u32 = 2;

/// Pixel width the generated image aims for. The actual size is the nearest
/// integer module scale at or below this, never fractional — fractional
/// scaling blurs modules and hurts scan reliability.
pub const TARGET_WIDTH: u32 = 330;

#[derive(Error, Debug)]
pub enum QrError {
    #[error("QR encode failed: {0}")]
    Encode(#[from] qrcode::types::QrError),
}

/// Encode `payload` as a QR code image of roughly [`TARGET_WIDTH`] pixels.
pub fn encode(payload: &str) -> Result<GrayImage, QrError> {
    encode_with_width(payload, TARGET_WIDTH)
}

/// Encode with an explicit target width.
pub fn encode_with_width(payload: &str, target_width: u32) -> Result<GrayImage, QrError> {
    let code = QrCode::new(payload.as_bytes())?;
    let modules = code.to_colors();
    let module_count = code.width() as u32;

    let total_modules = module_count + 2 * BORDER_MODULES;
    let scale = (target_width / total_modules).max(1);
    let img_size = total_modules * scale;

    let mut img = GrayImage::from_pixel(img_size, img_size, Luma([255u8]));

    for (i, color) in modules.iter().enumerate() {
        if *color != qrcode::Color::Dark {
            continue;
        }
        let x = (i as u32) % module_count + BORDER_MODULES;
        let y = (i as u32) / module_count + BORDER_MODULES;
        for dx in 0..scale {
            for dy in 0..scale {
                img.put_pixel(x * scale + dx, y * scale + dy, Luma([0u8]));
            }
        }
    }

    Ok(img)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_produces_square_image() {
        let img = encode("http://127.0.0.1:8080/student/2021-001").unwrap();
        assert!(img.width() > 0);
        assert_eq!(img.width(), img.height());
    }

    #[test]
    fn encode_is_deterministic() {
        let a = encode("http://example.test/student/x").unwrap();
        let b = encode("http://example.test/student/x").unwrap();
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn border_rows_are_quiet() {
        let img = encode("hello").unwrap();
        // The top border band must be entirely light.
        for x in 0..img.width() {
            assert_eq!(img.get_pixel(x, 0).0[0], 255);
        }
    }

    #[test]
    fn contains_dark_modules() {
        let img = encode("hello").unwrap();
        assert!(img.pixels().any(|p| p.0[0] == 0));
    }

    #[test]
    fn tiny_target_width_clamps_scale_to_one() {
        let img = encode_with_width("hello", 1).unwrap();
        // scale 1: one pixel per module, plus the border on both sides
        assert!(img.width() >= 21 + 2 * BORDER_MODULES);
    }
}
