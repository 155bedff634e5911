// ============================================================================
// LINEAR GRADIENT
// ============================================================================

use image::Rgba;

use crate::canvas::{PixelBuffer, Point};

/// Two-stop linear gradient with a shared alpha.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearGradient {
    pub start: [u8; 3],
    pub end: [u8; 3],
    pub alpha: u8,
}

impl LinearGradient {
    /// Normalised projection of `(px, py)` onto the `a`→`b` vector, clamped
    /// to `[0, 1]`. The squared length is floored at 1 so a zero-length drag
    /// still yields a defined parameter.
    #[inline]
    pub fn compute_t(px: f32, py: f32, a: Point, b: Point) -> f32 {
        let dx = b.0 as f32 - a.0 as f32;
        let dy = b.1 as f32 - a.1 as f32;
        let len_sq = (dx * dx + dy * dy).max(1.0);
        let t = ((px - a.0 as f32) * dx + (py - a.1 as f32) * dy) / len_sq;
        t.clamp(0.0, 1.0)
    }

    /// Colour at parameter `t`. Channels are truncated toward zero.
    #[inline]
    pub fn color_at(&self, t: f32) -> Rgba<u8> {
        let lerp = |s: u8, e: u8| (s as f32 * (1.0 - t) + e as f32 * t) as u8;
        Rgba([
            lerp(self.start[0], self.end[0]),
            lerp(self.start[1], self.end[1]),
            lerp(self.start[2], self.end[2]),
            self.alpha,
        ])
    }

    /// Paint the inclusive bounding box of `a` and `b`, clipped to `buf`.
    ///
    /// `step` > 1 samples every `step`-th pixel and paints a `step`×`step`
    /// block with it; used for cheap drag previews. Committed gradients use
    /// `step == 1`, which evaluates every pixel. Block positions stay aligned
    /// to the box corner even when the box starts off the buffer.
    pub fn render(&self, buf: &mut PixelBuffer, a: Point, b: Point, step: usize) {
        let step = step.max(1) as i64;
        let (w, h) = (buf.width() as i64, buf.height() as i64);
        let clip = |lo: i32, hi: i32, len: i64| -> (i64, i64) {
            let (lo, hi) = (lo as i64, hi as i64);
            let start = if lo < 0 { lo + (-lo / step) * step } else { lo };
            (start, hi.min(len - 1))
        };
        let (x0, x1) = clip(a.0.min(b.0), a.0.max(b.0), w);
        let (y0, y1) = clip(a.1.min(b.1), a.1.max(b.1), h);

        let mut x = x0;
        while x <= x1 {
            let mut y = y0;
            while y <= y1 {
                let color = self.color_at(Self::compute_t(x as f32, y as f32, a, b));
                for by in y..(y + step).min(y1 + 1) {
                    for bx in x..(x + step).min(x1 + 1) {
                        buf.set(bx as i32, by as i32, color);
                    }
                }
                y += step;
            }
            x += step;
        }
    }
}
