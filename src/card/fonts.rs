//! Font loading and text drawing for the card compositor.
//!
//! The card uses four text roles. With TrueType faces available, each role
//! draws at its own point size from the bold or regular face. Loading is
//! all-or-nothing: if either face fails, every role falls back to the
//! built-in bitmap face. [`FontQuartet`] has exactly those two terminal
//! states — a mixed card (some TrueType, some bitmap) cannot be
//! represented.

use std::path::Path;

use image::{Rgb, RgbImage};
use rusttype::{Font, Scale, point};
use tracing::warn;

use super::builtin_font;
use crate::config::FontConfig;

/// Text roles on the card, each with a fixed point size and weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Header title, bold 40pt.
    Title,
    /// Detail-row labels and the validity caption, bold 26pt.
    Label,
    /// Detail-row values and the signature caption, regular 26pt.
    Value,
    /// Copyright footer, regular 20pt.
    Footer,
}

impl Role {
    fn size(self) -> f32 {
        match self {
            Self::Title => 40.0,
            Self::Label | Self::Value => 26.0,
            Self::Footer => 20.0,
        }
    }

    fn bold(self) -> bool {
        matches!(self, Self::Title | Self::Label)
    }

    /// Integer scale for the built-in 5×7 face, sized so each role's glyph
    /// height lands near its point size.
    fn builtin_scale(self) -> u32 {
        match self {
            Self::Title => 4,
            Self::Label | Self::Value => 3,
            Self::Footer => 2,
        }
    }
}

/// The card's font set: either both TrueType faces or the built-in face,
/// never a mix.
pub enum FontQuartet {
    /// Both faces loaded; roles draw at their own sizes.
    Scalable {
        bold: Font<'static>,
        regular: Font<'static>,
    },
    /// At least one face failed to load.
    Builtin,
}

impl FontQuartet {
    /// Load the configured bold and regular faces.
    ///
    /// Any failure — unreadable file or unparsable font — sends the whole
    /// quartet to [`FontQuartet::Builtin`].
    pub fn load(config: &FontConfig) -> Self {
        match (
            load_font(&config.bold_path),
            load_font(&config.regular_path),
        ) {
            (Some(bold), Some(regular)) => Self::Scalable { bold, regular },
            _ => {
                warn!(
                    "font load failed ({} / {}), using built-in face for all card text",
                    config.bold_path.display(),
                    config.regular_path.display()
                );
                Self::Builtin
            }
        }
    }

    /// Draw `text` with its top-left corner at `(x, y)`.
    pub fn draw(&self, canvas: &mut RgbImage, x: i32, y: i32, role: Role, color: Rgb<u8>, text: &str) {
        match self {
            Self::Scalable { bold, regular } => {
                let font = if role.bold() { bold } else { regular };
                draw_scalable(canvas, font, role.size(), x, y, color, text);
            }
            Self::Builtin => draw_builtin(canvas, role.builtin_scale(), x, y, color, text),
        }
    }
}

fn load_font(path: &Path) -> Option<Font<'static>> {
    let bytes = std::fs::read(path).ok()?;
    Font::try_from_vec(bytes)
}

/// Rasterize TrueType glyphs with coverage-based alpha blending.
fn draw_scalable(
    canvas: &mut RgbImage,
    font: &Font<'static>,
    px: f32,
    x: i32,
    y: i32,
    color: Rgb<u8>,
    text: &str,
) {
    let scale = Scale::uniform(px);
    let v_metrics = font.v_metrics(scale);
    let mut caret_x = x as f32;
    let baseline_y = y as f32 + v_metrics.ascent;

    for ch in text.chars() {
        let glyph = font
            .glyph(ch)
            .scaled(scale)
            .positioned(point(caret_x, baseline_y));
        if let Some(bb) = glyph.pixel_bounding_box() {
            glyph.draw(|gx, gy, v| {
                let px = gx as i32 + bb.min.x;
                let py = gy as i32 + bb.min.y;
                if px < 0 || py < 0 {
                    return;
                }
                let (px, py) = (px as u32, py as u32);
                if px >= canvas.width() || py >= canvas.height() {
                    return;
                }
                if v <= 0.0 {
                    return;
                }
                let dst = canvas.get_pixel_mut(px, py);
                let inv = 1.0 - v;
                dst.0[0] = (color.0[0] as f32 * v + dst.0[0] as f32 * inv) as u8;
                dst.0[1] = (color.0[1] as f32 * v + dst.0[1] as f32 * inv) as u8;
                dst.0[2] = (color.0[2] as f32 * v + dst.0[2] as f32 * inv) as u8;
            });
        }
        caret_x += glyph.unpositioned().h_metrics().advance_width;
    }
}

/// Stamp 5×7 bitmap glyphs as solid blocks, scaled by an integer factor.
fn draw_builtin(canvas: &mut RgbImage, scale: u32, x: i32, y: i32, color: Rgb<u8>, text: &str) {
    let advance = (builtin_font::GLYPH_WIDTH + builtin_font::GLYPH_SPACING) * scale;
    let mut caret_x = x;

    for ch in text.chars() {
        let columns = builtin_font::glyph(ch);
        for (col, &bits) in columns.iter().enumerate() {
            for row in 0..builtin_font::GLYPH_HEIGHT {
                if bits & (1 << row) == 0 {
                    continue;
                }
                let block_x = caret_x + (col as u32 * scale) as i32;
                let block_y = y + (row * scale) as i32;
                for dy in 0..scale {
                    for dx in 0..scale {
                        let px = block_x + dx as i32;
                        let py = block_y + dy as i32;
                        if px < 0 || py < 0 {
                            continue;
                        }
                        let (px, py) = (px as u32, py as u32);
                        if px < canvas.width() && py < canvas.height() {
                            canvas.put_pixel(px, py, color);
                        }
                    }
                }
            }
        }
        caret_x += advance as i32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn blank_canvas() -> RgbImage {
        RgbImage::from_pixel(200, 60, Rgb([255, 255, 255]))
    }

    #[test]
    fn load_missing_files_falls_back_to_builtin() {
        let config = FontConfig {
            bold_path: "/nonexistent/bold.ttf".into(),
            regular_path: "/nonexistent/regular.ttf".into(),
        };
        assert!(matches!(FontQuartet::load(&config), FontQuartet::Builtin));
    }

    #[test]
    fn load_unparsable_font_falls_back_to_builtin() {
        let mut garbage = tempfile::NamedTempFile::new().unwrap();
        garbage.write_all(b"this is not a font").unwrap();
        let config = FontConfig {
            bold_path: garbage.path().to_path_buf(),
            regular_path: garbage.path().to_path_buf(),
        };
        assert!(matches!(FontQuartet::load(&config), FontQuartet::Builtin));
    }

    #[test]
    fn one_bad_face_is_all_or_nothing() {
        // Even if the regular path were loadable, a bad bold path must
        // force the builtin quartet. Both are bad here; the point is that
        // the match arms never produce a half-loaded state.
        let config = FontConfig {
            bold_path: "/nonexistent/bold.ttf".into(),
            regular_path: "/nonexistent/regular.ttf".into(),
        };
        match FontQuartet::load(&config) {
            FontQuartet::Builtin => {}
            FontQuartet::Scalable { .. } => panic!("loaded quartet from missing files"),
        }
    }

    #[test]
    fn builtin_draw_marks_pixels() {
        let mut canvas = blank_canvas();
        FontQuartet::Builtin.draw(&mut canvas, 5, 5, Role::Value, Rgb([0, 0, 0]), "HI");
        assert!(canvas.pixels().any(|p| p.0 == [0, 0, 0]));
    }

    #[test]
    fn builtin_draw_is_deterministic() {
        let mut a = blank_canvas();
        let mut b = blank_canvas();
        let fonts = FontQuartet::Builtin;
        fonts.draw(&mut a, 5, 5, Role::Title, Rgb([0, 0, 0]), "ID CARD");
        fonts.draw(&mut b, 5, 5, Role::Title, Rgb([0, 0, 0]), "ID CARD");
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn builtin_draw_clips_at_canvas_edge() {
        let mut canvas = blank_canvas();
        // Drawing past the right edge and above the top must not panic.
        FontQuartet::Builtin.draw(&mut canvas, 195, -3, Role::Title, Rgb([0, 0, 0]), "WW");
    }

    #[test]
    fn space_advances_without_marking() {
        let mut canvas = blank_canvas();
        FontQuartet::Builtin.draw(&mut canvas, 5, 5, Role::Value, Rgb([0, 0, 0]), " ");
        assert!(canvas.pixels().all(|p| p.0 == [255, 255, 255]));
    }

    #[test]
    fn role_sizes_match_layout() {
        assert_eq!(Role::Title.size(), 40.0);
        assert_eq!(Role::Label.size(), 26.0);
        assert_eq!(Role::Value.size(), 26.0);
        assert_eq!(Role::Footer.size(), 20.0);
        assert!(Role::Title.bold());
        assert!(Role::Label.bold());
        assert!(!Role::Value.bold());
        assert!(!Role::Footer.bold());
    }
}
