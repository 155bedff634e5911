// ============================================================================
// BRUSH STAMPS - per-point mutations of the continuous tools
// ============================================================================

use std::time::{SystemTime, UNIX_EPOCH};

use image::Rgba;

use crate::canvas::{with_alpha, PixelBuffer, Point, TRANSPARENT};
use crate::ops::shapes::{fill_circle, points_on_segment, stroke_line};

/// Spray alphas are drawn from `[SPRAY_MIN_ALPHA, alpha]`.
pub const SPRAY_MIN_ALPHA: u8 = 100;

#[inline]
pub fn pencil_width(size: u32) -> u32 {
    (size / 3).max(1)
}

/// Size 1 gives radius 0, which still paints the centre pixel.
#[inline]
pub fn brush_radius(size: u32) -> u32 {
    size / 2
}

/// Hard-edged pencil. Joins to the previous sample with a line of the pencil
/// width, or drops a dot of that radius at the start of a stroke.
pub fn stamp_pencil(buf: &mut PixelBuffer, last: Option<Point>, pos: Point, color: Rgba<u8>, size: u32) {
    let w = pencil_width(size);
    match last {
        Some(prev) => stroke_line(buf, prev, pos, color, w),
        None => fill_circle(buf, pos, w, color),
    }
}

/// Round brush: a disc at every interpolated point between samples.
pub fn stamp_brush(buf: &mut PixelBuffer, last: Option<Point>, pos: Point, color: Rgba<u8>, size: u32) {
    stamp_discs(buf, last, pos, color, brush_radius(size));
}

/// Clears pixels to full transparency in a disc of radius `size` along the path.
pub fn stamp_eraser(buf: &mut PixelBuffer, last: Option<Point>, pos: Point, size: u32) {
    stamp_discs(buf, last, pos, TRANSPARENT, size);
}

fn stamp_discs(buf: &mut PixelBuffer, last: Option<Point>, pos: Point, color: Rgba<u8>, radius: u32) {
    match last {
        Some(prev) => {
            for p in points_on_segment(prev, pos) {
                fill_circle(buf, p, radius, color);
            }
        }
        None => fill_circle(buf, pos, radius, color),
    }
}

/// Scatter `2 * size` single pixels around `pos`. Angle and radius are both
/// uniform, so density falls off toward the rim. Each pixel gets its own
/// alpha from `[100, alpha]`; samples landing off the canvas are dropped.
/// Returns the number of pixels written.
pub fn spray(
    buf: &mut PixelBuffer,
    pos: Point,
    rgb: [u8; 3],
    alpha: u8,
    size: u32,
    rng: &mut SprayRng,
) -> usize {
    let (lo, hi) = if alpha >= SPRAY_MIN_ALPHA {
        (SPRAY_MIN_ALPHA, alpha)
    } else {
        (alpha, SPRAY_MIN_ALPHA)
    };

    let mut written = 0;
    for _ in 0..size * 2 {
        let angle = rng.uniform(0.0, std::f32::consts::TAU);
        let radius = rng.uniform(0.0, size as f32);
        let x = (pos.0 as f32 + radius * angle.cos()) as i32;
        let y = (pos.1 as f32 + radius * angle.sin()) as i32;
        if !buf.contains(x, y) {
            continue;
        }
        let a = rng.uniform(lo as f32, hi as f32) as u8;
        buf.set(x, y, with_alpha(rgb, a.clamp(lo, hi)));
        written += 1;
    }
    written
}

// ============================================================================
// SPRAY RNG - small counter-hash generator
// ============================================================================

/// Deterministic pseudorandom source for spray particles. A seed plus a
/// running counter is pushed through an integer hash, so a fixed seed
/// reproduces the same spray pattern.
#[derive(Clone, Debug)]
pub struct SprayRng {
    seed: u32,
    counter: u32,
}

impl SprayRng {
    pub fn new(seed: u32) -> Self {
        Self { seed, counter: 0 }
    }

    /// Seeded from the wall clock.
    pub fn from_time() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
            .unwrap_or(0x9E37_79B9);
        Self::new(nanos)
    }

    pub fn next_u32(&mut self) -> u32 {
        self.counter = self.counter.wrapping_add(1);
        let mut h = self
            .seed
            .wrapping_mul(374761393)
            .wrapping_add(self.counter.wrapping_mul(668265263))
            .wrapping_add(1013904223);
        h ^= h >> 13;
        h = h.wrapping_mul(1274126177);
        h ^= h >> 16;
        h
    }

    /// Uniform in `[0, 1)`.
    pub fn next_f32(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }

    /// Uniform in `[lo, hi)`.
    pub fn uniform(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.next_f32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INK: Rgba<u8> = Rgba([9, 9, 9, 255]);

    fn painted(buf: &PixelBuffer) -> usize {
        buf.as_image().pixels().filter(|p| p[3] != 0).count()
    }

    #[test]
    fn test_pencil_dot_then_line() {
        let mut buf = PixelBuffer::new(30, 30);
        stamp_pencil(&mut buf, None, (5, 5), INK, 3);
        // size 3 -> radius 1 dot (plus-shaped)
        assert_eq!(painted(&buf), 5);

        stamp_pencil(&mut buf, Some((5, 5)), (20, 5), INK, 3);
        for x in 5..=20 {
            assert_eq!(buf.get(x, 5), INK);
        }
    }

    #[test]
    fn test_brush_interpolates_between_samples() {
        let mut buf = PixelBuffer::new(40, 10);
        stamp_brush(&mut buf, Some((2, 5)), (37, 5), INK, 4);
        for x in 2..=37 {
            assert_eq!(buf.get(x, 5), INK, "gap at x={x}");
            assert_eq!(buf.get(x, 3), INK);
        }
        assert_eq!(buf.get(20, 2), TRANSPARENT);
    }

    #[test]
    fn test_size_one_brush_still_paints() {
        let mut buf = PixelBuffer::new(5, 5);
        stamp_brush(&mut buf, None, (2, 2), INK, 1);
        assert_eq!(painted(&buf), 1);
    }

    #[test]
    fn test_eraser_clears_to_transparent() {
        let mut buf = PixelBuffer::filled(20, 20, INK);
        stamp_eraser(&mut buf, Some((5, 10)), (14, 10), 2);
        assert_eq!(buf.get(10, 10), TRANSPARENT);
        assert_eq!(buf.get(10, 12), TRANSPARENT);
        assert_eq!(buf.get(10, 13), INK);
    }

    #[test]
    fn test_spray_stays_in_disc_and_alpha_range() {
        let mut buf = PixelBuffer::new(64, 64);
        let mut rng = SprayRng::new(7);
        let size = 10;
        let written = spray(&mut buf, (32, 32), [255, 0, 0], 220, size, &mut rng);
        assert_eq!(written, 20);
        for (x, y, px) in buf.as_image().enumerate_pixels() {
            if px[3] == 0 {
                continue;
            }
            // truncation can push a sample up to one pixel outward
            let dx = ((x as i32 - 32).abs() - 1).max(0);
            let dy = ((y as i32 - 32).abs() - 1).max(0);
            assert!(dx * dx + dy * dy < 100, "({x},{y}) outside disc");
            assert!((100..=220).contains(&px[3]));
            assert_eq!([px[0], px[1], px[2]], [255, 0, 0]);
        }
    }

    #[test]
    fn test_spray_near_edge_drops_offcanvas_samples() {
        let mut buf = PixelBuffer::new(8, 8);
        let mut rng = SprayRng::new(99);
        let written = spray(&mut buf, (0, 0), [0, 0, 0], 255, 20, &mut rng);
        assert!(written < 40);
        assert!(painted(&buf) <= written);
    }

    #[test]
    fn test_spray_low_alpha_range_is_inverted() {
        let mut buf = PixelBuffer::new(40, 40);
        let mut rng = SprayRng::new(3);
        spray(&mut buf, (20, 20), [0, 0, 255], 60, 8, &mut rng);
        for px in buf.as_image().pixels().filter(|p| p[3] != 0) {
            assert!((60..=100).contains(&px[3]));
        }
    }

    #[test]
    fn test_rng_is_reproducible_and_in_range() {
        let mut a = SprayRng::new(42);
        let mut b = SprayRng::new(42);
        for _ in 0..1000 {
            let v = a.next_f32();
            assert_eq!(v, b.next_f32());
            assert!((0.0..1.0).contains(&v));
        }
    }
}
