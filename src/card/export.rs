//! Card export encodings.
//!
//! Both exports are pure re-encodings of the composed canvas: PNG wraps the
//! pixels losslessly, and the PDF embeds the identical pixel data as a
//! full-page image. No re-layout happens here.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, RgbImage};
use printpdf::{
    ColorBits, ColorSpace, Image as PdfImage, ImageTransform, ImageXObject, Mm, PdfDocument, Px,
};
use thiserror::Error;

/// Resolution used to map card pixels onto the PDF page. Purely a physical
/// sizing choice; the embedded pixel data is unchanged by it.
const PDF_DPI: f32 = 150.0;
const MM_PER_INCH: f32 = 25.4;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("PNG encode failed: {0}")]
    Png(#[from] image::ImageError),
    #[error("PDF encode failed: {0}")]
    Pdf(String),
}

/// Encode the composed card as a PNG.
pub fn encode_png(card: &RgbImage) -> Result<Vec<u8>, ExportError> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(card.clone()).write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}

/// Encode the composed card as a single-page PDF, page sized to the card.
pub fn encode_pdf(card: &RgbImage) -> Result<Vec<u8>, ExportError> {
    let (width, height) = card.dimensions();
    let page_w = Mm(width as f32 * MM_PER_INCH / PDF_DPI);
    let page_h = Mm(height as f32 * MM_PER_INCH / PDF_DPI);

    let (doc, page, layer) = PdfDocument::new("Student ID Card", page_w, page_h, "card");

    let xobject = ImageXObject {
        width: Px(width as usize),
        height: Px(height as usize),
        color_space: ColorSpace::Rgb,
        bits_per_component: ColorBits::Bit8,
        interpolate: false,
        image_data: card.as_raw().clone(),
        image_filter: None,
        smask: None,
        clipping_bbox: None,
    };
    PdfImage::from(xobject).add_to_layer(
        doc.get_page(page).get_layer(layer),
        ImageTransform {
            dpi: Some(PDF_DPI),
            ..Default::default()
        },
    );

    doc.save_to_bytes()
        .map_err(|e| ExportError::Pdf(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn test_card() -> RgbImage {
        let mut card = RgbImage::from_pixel(64, 32, Rgb([255, 255, 255]));
        card.put_pixel(3, 4, Rgb([25, 55, 130]));
        card
    }

    #[test]
    fn png_round_trips_pixels() {
        let card = test_card();
        let bytes = encode_png(&card).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgb8();
        assert_eq!(decoded.as_raw(), card.as_raw());
    }

    #[test]
    fn png_encode_is_deterministic() {
        let card = test_card();
        assert_eq!(encode_png(&card).unwrap(), encode_png(&card).unwrap());
    }

    #[test]
    fn pdf_has_header_and_content() {
        let bytes = encode_pdf(&test_card()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 100);
    }

    #[test]
    fn pdf_ends_with_eof_marker() {
        let bytes = encode_pdf(&test_card()).unwrap();
        let tail = &bytes[bytes.len().saturating_sub(16)..];
        assert!(
            tail.windows(5).any(|w| w == b"%%EOF"),
            "PDF missing trailer"
        );
    }
}
