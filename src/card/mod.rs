//! ID card compositing.
//!
//! Renders a student's registration into a fixed-layout 1100×650 card.
//! The layout is a constant grid — nothing about it depends on the record
//! contents, asset dimensions, or which fonts loaded:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ [logo]  UNIVERSITY STUDENT ID CARD          (header band)│
//! ├──────────────────────────────────────────────────────────┤
//! │ ┌───────┐   IDNO:       2021-001             ┌────────┐  │
//! │ │ photo │   LASTNAME:   Cruz                 │   QR   │  │
//! │ │300×300│   FIRSTNAME:  Ana                  │220×220 │  │
//! │ └───────┘   PROGRAM:    BSIT                 └────────┘  │
//! │             YEAR LEVEL: 3                                │
//! │ ──────────────                                           │
//! │ Registrar Signature   VALID UNTIL: 2026        [seal]    │
//! │ Copyright (c) ...                                        │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Elements composite in a fixed z-order: header band, logo, title, photo,
//! QR, detail rows, signature line, seal, captions. The photo and QR are
//! required — a missing or undecodable file is [`RenderError::AssetMissing`]
//! and rendering does not proceed. The logo and seal are independently
//! optional and skipped silently; their absence moves nothing else.
//!
//! Rendering is deterministic: identical record fields and asset bytes
//! produce byte-identical pixels. There are no clocks and no randomness in
//! this module, and the validity caption is a static string.

pub mod builtin_font;
pub mod export;
pub mod fonts;

use std::path::{Path, PathBuf};

use image::{DynamicImage, Rgb, RgbImage, imageops, imageops::FilterType};
use thiserror::Error;

use crate::config::BrandingConfig;
use crate::types::StudentRecord;
use fonts::{FontQuartet, Role};

pub const CARD_WIDTH: u32 = 1100;
pub const CARD_HEIGHT: u32 = 650;

const CANVAS_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const HEADER_COLOR: Rgb<u8> = Rgb([25, 55, 130]);
const TEXT_COLOR: Rgb<u8> = Rgb([0, 0, 0]);
const TITLE_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

const HEADER_HEIGHT: u32 = 100;
const LOGO_SIZE: u32 = 80;
const LOGO_POS: (i64, i64) = (30, 10);
const TITLE_POS: (i32, i32) = (150, 25);
const PHOTO_SIZE: u32 = 300;
const PHOTO_POS: (i64, i64) = (50, 150);
const QR_SIZE: u32 = 220;
const QR_POS: (i64, i64) = ((CARD_WIDTH - 270) as i64, 150);
const DETAILS_X: i32 = 400;
const VALUES_X: i32 = DETAILS_X + 220;
const DETAILS_Y: i32 = 160;
const ROW_SPACING: i32 = 55;
const SIGNATURE_X: u32 = 50;
const SIGNATURE_WIDTH: u32 = 300;
const SIGNATURE_Y: u32 = CARD_HEIGHT - 150;
const SIGNATURE_THICKNESS: u32 = 2;
const SIGNATURE_CAPTION_Y: i32 = (CARD_HEIGHT - 140) as i32;
const SEAL_SIZE: u32 = 120;
const SEAL_POS: (i64, i64) = ((CARD_WIDTH - 180) as i64, (CARD_HEIGHT - 190) as i64);
const VALIDITY_POS: (i32, i32) = (400, (CARD_HEIGHT - 130) as i32);
const FOOTER_POS: (i32, i32) = (50, (CARD_HEIGHT - 40) as i32);

const TITLE_TEXT: &str = "UNIVERSITY STUDENT ID CARD";
const SIGNATURE_CAPTION: &str = "Registrar Signature";
const VALIDITY_TEXT: &str = "VALID UNTIL: 2026";
const FOOTER_TEXT: &str = "Copyright (c) Campus Registrar Office";

#[derive(Error, Debug)]
pub enum RenderError {
    /// The photo or QR file could not be opened or decoded. Fatal to the
    /// render; there is no placeholder substitution for required assets.
    #[error("required asset missing or unreadable: {path}")]
    AssetMissing { path: PathBuf },
}

/// Decoded pixel buffers for one card.
#[derive(Debug)]
pub struct CardAssets {
    pub photo: DynamicImage,
    pub qr: DynamicImage,
    pub logo: Option<DynamicImage>,
    pub seal: Option<DynamicImage>,
}

impl CardAssets {
    /// Load the record's photo and QR from the upload directory, plus any
    /// configured logo and seal.
    ///
    /// Required assets that fail to open are [`RenderError::AssetMissing`].
    /// Optional assets that fail to open are `None`.
    pub fn load(
        record: &StudentRecord,
        upload_root: &Path,
        branding: &BrandingConfig,
    ) -> Result<Self, RenderError> {
        Ok(Self {
            photo: open_required(&upload_root.join(&record.photo_path))?,
            qr: open_required(&upload_root.join(&record.qr_path))?,
            logo: branding.logo_path.as_deref().and_then(open_optional),
            seal: branding.seal_path.as_deref().and_then(open_optional),
        })
    }
}

fn open_required(path: &Path) -> Result<DynamicImage, RenderError> {
    image::open(path).map_err(|_| RenderError::AssetMissing {
        path: path.to_path_buf(),
    })
}

fn open_optional(path: &Path) -> Option<DynamicImage> {
    image::open(path).ok()
}

/// Load assets and compose the card in one step.
pub fn render(
    record: &StudentRecord,
    upload_root: &Path,
    branding: &BrandingConfig,
    fonts: &FontQuartet,
) -> Result<RgbImage, RenderError> {
    let assets = CardAssets::load(record, upload_root, branding)?;
    Ok(compose(record, &assets, fonts))
}

/// Composite the card from already-decoded assets.
pub fn compose(record: &StudentRecord, assets: &CardAssets, fonts: &FontQuartet) -> RgbImage {
    let mut card = RgbImage::from_pixel(CARD_WIDTH, CARD_HEIGHT, CANVAS_COLOR);

    fill_rect(&mut card, 0, 0, CARD_WIDTH, HEADER_HEIGHT, HEADER_COLOR);

    if let Some(logo) = &assets.logo {
        let logo = resize_square(logo, LOGO_SIZE);
        imageops::replace(&mut card, &logo, LOGO_POS.0, LOGO_POS.1);
    }

    fonts.draw(
        &mut card,
        TITLE_POS.0,
        TITLE_POS.1,
        Role::Title,
        TITLE_COLOR,
        TITLE_TEXT,
    );

    let photo = resize_square(&assets.photo, PHOTO_SIZE);
    imageops::replace(&mut card, &photo, PHOTO_POS.0, PHOTO_POS.1);

    let qr = resize_square(&assets.qr, QR_SIZE);
    imageops::replace(&mut card, &qr, QR_POS.0, QR_POS.1);

    let rows = [
        ("IDNO:", record.idno.as_str()),
        ("LASTNAME:", record.lastname.as_str()),
        ("FIRSTNAME:", record.firstname.as_str()),
        ("PROGRAM:", record.course.as_str()),
        ("YEAR LEVEL:", record.level.as_str()),
    ];
    let mut row_y = DETAILS_Y;
    for (label, value) in rows {
        fonts.draw(&mut card, DETAILS_X, row_y, Role::Label, TEXT_COLOR, label);
        fonts.draw(&mut card, VALUES_X, row_y, Role::Value, TEXT_COLOR, value);
        row_y += ROW_SPACING;
    }

    fill_rect(
        &mut card,
        SIGNATURE_X,
        SIGNATURE_Y,
        SIGNATURE_WIDTH,
        SIGNATURE_THICKNESS,
        TEXT_COLOR,
    );
    fonts.draw(
        &mut card,
        SIGNATURE_X as i32,
        SIGNATURE_CAPTION_Y,
        Role::Value,
        TEXT_COLOR,
        SIGNATURE_CAPTION,
    );

    if let Some(seal) = &assets.seal {
        let seal = resize_square(seal, SEAL_SIZE);
        imageops::replace(&mut card, &seal, SEAL_POS.0, SEAL_POS.1);
    }

    fonts.draw(
        &mut card,
        VALIDITY_POS.0,
        VALIDITY_POS.1,
        Role::Label,
        TEXT_COLOR,
        VALIDITY_TEXT,
    );
    fonts.draw(
        &mut card,
        FOOTER_POS.0,
        FOOTER_POS.1,
        Role::Footer,
        TEXT_COLOR,
        FOOTER_TEXT,
    );

    card
}

/// Resize to an exact square, ignoring the source aspect ratio. The layout
/// depends on fixed asset footprints, not on preserving proportions.
fn resize_square(img: &DynamicImage, size: u32) -> RgbImage {
    img.resize_exact(size, size, FilterType::Lanczos3).to_rgb8()
}

fn fill_rect(canvas: &mut RgbImage, x: u32, y: u32, w: u32, h: u32, color: Rgb<u8>) {
    for py in y..(y + h).min(canvas.height()) {
        for px in x..(x + w).min(canvas.width()) {
            canvas.put_pixel(px, py, color);
        }
    }
}
