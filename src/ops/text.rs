use ab_glyph::{point, Font, FontArc, GlyphId, ScaleFont};
use image::Rgba;

use crate::canvas::{PixelBuffer, Point};
use crate::error::FontError;

/// Turns a string into a coloured glyph raster. The returned buffer's
/// top-left corner is the top-left of the text's line box; `None` means
/// nothing visible was produced.
pub trait GlyphRenderer {
    fn render(&self, text: &str, color: Rgba<u8>) -> Option<PixelBuffer>;
}

/// Single-line text rendering through ab_glyph.
pub struct FontRenderer {
    font: FontArc,
    size: f32,
}

impl FontRenderer {
    pub fn new(font: FontArc, size: f32) -> Self {
        Self { font, size }
    }

    /// Look up `family` among the installed fonts, falling back to the
    /// platform's default sans-serif face.
    pub fn from_system(family: &str, size: f32) -> Result<Self, FontError> {
        use font_kit::family_name::FamilyName;

        let font = load_system_font(&[FamilyName::Title(family.to_string()), FamilyName::SansSerif])?;
        log::info!("Loaded text font '{}' at {}px", family, size);
        Ok(Self::new(font, size))
    }
}

/// Lay out a single line left-aligned with the baseline at `ascent`.
/// Returns `(glyphs, total_width, line_height)`.
fn layout_line(font: &FontArc, text: &str, font_size: f32) -> (Vec<(GlyphId, f32, f32)>, f32, f32) {
    let scaled = font.as_scaled(font_size);
    let ascent = scaled.ascent();

    let mut glyphs = Vec::new();
    let mut cursor_x = 0.0f32;
    let mut last_glyph: Option<GlyphId> = None;

    for ch in text.chars() {
        let glyph_id = font.glyph_id(ch);
        if let Some(prev) = last_glyph {
            cursor_x += scaled.kern(prev, glyph_id);
        }
        glyphs.push((glyph_id, cursor_x, ascent));
        cursor_x += scaled.h_advance(glyph_id);
        last_glyph = Some(glyph_id);
    }

    (glyphs, cursor_x, scaled.height())
}

impl GlyphRenderer for FontRenderer {
    fn render(&self, text: &str, color: Rgba<u8>) -> Option<PixelBuffer> {
        let (glyphs, width, line_height) = layout_line(&self.font, text, self.size);
        let buf_w = width.ceil().max(0.0) as u32;
        let buf_h = line_height.ceil().max(0.0) as u32;
        if glyphs.is_empty() || buf_w == 0 || buf_h == 0 {
            return None;
        }

        // Coverage accumulates across glyphs so overlapping kerning pairs
        // don't double-darken.
        let mut coverage = vec![0.0f32; (buf_w * buf_h) as usize];
        for (glyph_id, gx, gy) in glyphs {
            let glyph = glyph_id.with_scale_and_position(self.size, point(gx, gy));
            let Some(outlined) = self.font.outline_glyph(glyph) else { continue };
            let bounds = outlined.px_bounds();
            outlined.draw(|px, py, c| {
                let x = bounds.min.x as i32 + px as i32;
                let y = bounds.min.y as i32 + py as i32;
                if x >= 0 && y >= 0 && (x as u32) < buf_w && (y as u32) < buf_h {
                    let idx = y as usize * buf_w as usize + x as usize;
                    coverage[idx] = (coverage[idx] + c).min(1.0);
                }
            });
        }

        let mut out = PixelBuffer::new(buf_w, buf_h);
        let mut any = false;
        for (idx, c) in coverage.iter().enumerate() {
            let a = (color[3] as f32 * c).round() as u8;
            if a == 0 {
                continue;
            }
            any = true;
            let x = (idx % buf_w as usize) as i32;
            let y = (idx / buf_w as usize) as i32;
            out.set(x, y, Rgba([color[0], color[1], color[2], a]));
        }
        any.then_some(out)
    }
}

/// Alpha-composite rendered text onto `layer` with its top-left at `pos`.
pub fn place_text(layer: &mut PixelBuffer, rendered: &PixelBuffer, pos: Point) {
    rendered.composite_onto(layer, pos);
}

/// Load the first installed font matching any of `families`, in order.
pub fn load_system_font(families: &[font_kit::family_name::FamilyName]) -> Result<FontArc, FontError> {
    use font_kit::properties::Properties;
    use font_kit::source::SystemSource;

    let source = SystemSource::new();
    let handle = source
        .select_best_match(families, &Properties::new())
        .map_err(|_| FontError::NotFound(format!("{:?}", families)))?;

    let font_data = handle
        .load()
        .map_err(|e| FontError::Load(e.to_string()))?;
    let bytes = font_data
        .copy_font_data()
        .ok_or_else(|| FontError::Load("font has no readable data".to_string()))?;
    FontArc::try_from_vec((*bytes).clone()).map_err(|e| FontError::Load(e.to_string()))
}
