// ============================================================================
// RASTER PRIMITIVES - lines, circles, rectangles
// ============================================================================
//
// All primitives replace pixels outright (no blending) and silently clip to
// the buffer. Coordinates are integer pixel positions.

use image::Rgba;

use crate::canvas::{PixelBuffer, Point};

/// Axis-aligned rectangle covering `[x, x + w) × [y, y + h)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle spanned by two drag corners: origin at the smaller corner,
    /// extent equal to the absolute coordinate differences.
    /// Extents are computed wide and saturate at `i32::MAX`, so `x + w`
    /// never overflows.
    pub fn from_points(a: Point, b: Point) -> Self {
        let extent = |p: i32, q: i32| (p as i64 - q as i64).abs().min(i32::MAX as i64) as i32;
        Self {
            x: a.0.min(b.0),
            y: a.1.min(b.1),
            w: extent(a.0, b.0),
            h: extent(a.1, b.1),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }
}

/// Integer points visited walking from `p0` to `p1` (Bresenham), both
/// endpoints included, each pixel exactly once.
pub fn points_on_segment(p0: Point, p1: Point) -> Vec<Point> {
    let (mut x0, mut y0) = (p0.0 as i64, p0.1 as i64);
    let (x1, y1) = (p1.0 as i64, p1.1 as i64);

    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut points = Vec::with_capacity(dx.max(-dy) as usize + 1);
    loop {
        points.push((x0 as i32, y0 as i32));
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
    points
}

/// Distance from `(px, py)` to the segment `a`–`b`.
fn sdf_line_segment(px: f32, py: f32, ax: f32, ay: f32, bx: f32, by: f32) -> f32 {
    let dx = bx - ax;
    let dy = by - ay;
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq < 1e-6 {
        0.0
    } else {
        (((px - ax) * dx + (py - ay) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let cx = ax + t * dx;
    let cy = ay + t * dy;
    ((px - cx) * (px - cx) + (py - cy) * (py - cy)).sqrt()
}

/// Line of the given pixel width. Width 1 is a plain Bresenham walk; wider
/// lines are filled as a capsule of radius `width / 2` around the segment.
pub fn stroke_line(buf: &mut PixelBuffer, p0: Point, p1: Point, color: Rgba<u8>, width: u32) {
    if width <= 1 {
        for (x, y) in points_on_segment(p0, p1) {
            buf.set(x, y, color);
        }
        return;
    }

    let half = width as f32 / 2.0;
    let pad = half.ceil() as i32;
    let min_x = p0.0.min(p1.0).saturating_sub(pad).max(0);
    let max_x = p0.0.max(p1.0).saturating_add(pad).min(buf.width() as i32 - 1);
    let min_y = p0.1.min(p1.1).saturating_sub(pad).max(0);
    let max_y = p0.1.max(p1.1).saturating_add(pad).min(buf.height() as i32 - 1);

    let (ax, ay) = (p0.0 as f32, p0.1 as f32);
    let (bx, by) = (p1.0 as f32, p1.1 as f32);
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            if sdf_line_segment(x as f32, y as f32, ax, ay, bx, by) <= half {
                buf.set(x, y, color);
            }
        }
    }
}

// Radii reach u32::MAX and centres may sit far off the buffer.
#[inline]
fn sq(v: i64) -> i128 {
    (v as i128) * (v as i128)
}

/// Solid disc of every pixel within `radius` of `center`. Radius 0 paints
/// the centre pixel alone.
pub fn fill_circle(buf: &mut PixelBuffer, center: Point, radius: u32, color: Rgba<u8>) {
    let r = radius as i64;
    let r2 = sq(r);
    let (cx, cy) = (center.0 as i64, center.1 as i64);
    let (w, h) = (buf.width() as i64, buf.height() as i64);

    for y in (cy - r).max(0)..=(cy + r).min(h - 1) {
        let dy = y - cy;
        for x in (cx - r).max(0)..=(cx + r).min(w - 1) {
            let dx = x - cx;
            if sq(dx) + sq(dy) <= r2 {
                buf.set(x as i32, y as i32, color);
            }
        }
    }
}

/// Ring of thickness `width` whose outer edge is `radius`. A width that
/// reaches the centre degrades to a filled disc.
pub fn stroke_circle(
    buf: &mut PixelBuffer,
    center: Point,
    radius: u32,
    color: Rgba<u8>,
    width: u32,
) {
    let width = width.max(1);
    if width >= radius {
        fill_circle(buf, center, radius, color);
        return;
    }

    let r = radius as i64;
    let outer = sq(r);
    let inner = sq(r - width as i64);
    let (cx, cy) = (center.0 as i64, center.1 as i64);
    let (w, h) = (buf.width() as i64, buf.height() as i64);

    for y in (cy - r).max(0)..=(cy + r).min(h - 1) {
        let dy = y - cy;
        for x in (cx - r).max(0)..=(cx + r).min(w - 1) {
            let dx = x - cx;
            let d2 = sq(dx) + sq(dy);
            if d2 <= outer && d2 > inner {
                buf.set(x as i32, y as i32, color);
            }
        }
    }
}

pub fn fill_rect(buf: &mut PixelBuffer, rect: Rect, color: Rgba<u8>) {
    if rect.is_empty() {
        return;
    }
    let x0 = rect.x.max(0);
    let y0 = rect.y.max(0);
    let x1 = rect.x.saturating_add(rect.w).min(buf.width() as i32);
    let y1 = rect.y.saturating_add(rect.h).min(buf.height() as i32);
    for y in y0..y1 {
        for x in x0..x1 {
            buf.set(x, y, color);
        }
    }
}

/// Border of thickness `width` drawn inside `rect`.
pub fn stroke_rect(buf: &mut PixelBuffer, rect: Rect, color: Rgba<u8>, width: u32) {
    if rect.is_empty() {
        return;
    }
    let k = width.max(1) as i32;
    if 2 * k >= rect.w || 2 * k >= rect.h {
        fill_rect(buf, rect, color);
        return;
    }
    // top, bottom, left, right bands
    fill_rect(buf, Rect::new(rect.x, rect.y, rect.w, k), color);
    fill_rect(buf, Rect::new(rect.x, rect.y + rect.h - k, rect.w, k), color);
    fill_rect(buf, Rect::new(rect.x, rect.y + k, k, rect.h - 2 * k), color);
    fill_rect(buf, Rect::new(rect.x + rect.w - k, rect.y + k, k, rect.h - 2 * k), color);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::TRANSPARENT;

    const INK: Rgba<u8> = Rgba([1, 2, 3, 255]);

    fn count(buf: &PixelBuffer, color: Rgba<u8>) -> usize {
        buf.as_image().pixels().filter(|p| **p == color).count()
    }

    #[test]
    fn test_segment_includes_endpoints() {
        let cases = [
            ((0, 0), (0, 0)),
            ((0, 0), (7, 3)),
            ((5, 9), (-4, 2)),
            ((3, 3), (3, -8)),
            ((-2, 1), (10, 1)),
            ((0, 0), (6, 6)),
        ];
        for (p0, p1) in cases {
            let pts = points_on_segment(p0, p1);
            assert_eq!(pts.first(), Some(&p0));
            assert_eq!(pts.last(), Some(&p1));
            let expected = (p1.0 - p0.0).abs().max((p1.1 - p0.1).abs()) as usize + 1;
            assert!(pts.len().abs_diff(expected) <= 1, "{p0:?}->{p1:?}: {}", pts.len());
        }
    }

    #[test]
    fn test_segment_steps_are_adjacent_and_unique() {
        let pts = points_on_segment((2, 11), (17, -3));
        for pair in pts.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            assert!((a.0 - b.0).abs() <= 1 && (a.1 - b.1).abs() <= 1);
            assert_ne!(a, b);
        }
        let mut sorted = pts.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), pts.len());
    }

    #[test]
    fn test_segment_is_deterministic() {
        assert_eq!(points_on_segment((1, 2), (40, 13)), points_on_segment((1, 2), (40, 13)));
    }

    #[test]
    fn test_thin_line_matches_segment() {
        let mut buf = PixelBuffer::new(10, 10);
        stroke_line(&mut buf, (0, 0), (9, 4), INK, 1);
        assert_eq!(count(&buf, INK), points_on_segment((0, 0), (9, 4)).len());
    }

    #[test]
    fn test_wide_horizontal_line() {
        let mut buf = PixelBuffer::new(20, 20);
        stroke_line(&mut buf, (5, 10), (14, 10), INK, 4);
        assert_eq!(buf.get(10, 8), INK);
        assert_eq!(buf.get(10, 12), INK);
        assert_eq!(buf.get(10, 13), TRANSPARENT);
        assert_eq!(buf.get(10, 7), TRANSPARENT);
    }

    #[test]
    fn test_fill_circle_radius() {
        let mut buf = PixelBuffer::new(11, 11);
        fill_circle(&mut buf, (5, 5), 3, INK);
        assert_eq!(buf.get(5, 5), INK);
        assert_eq!(buf.get(8, 5), INK);
        assert_eq!(buf.get(9, 5), TRANSPARENT);
        assert_eq!(buf.get(8, 8), TRANSPARENT);
        // 29 lattice points satisfy x² + y² <= 9
        assert_eq!(count(&buf, INK), 29);
    }

    #[test]
    fn test_zero_radius_circle_is_one_pixel() {
        let mut buf = PixelBuffer::new(3, 3);
        fill_circle(&mut buf, (1, 1), 0, INK);
        assert_eq!(count(&buf, INK), 1);
    }

    #[test]
    fn test_circle_clipped_at_edge() {
        let mut buf = PixelBuffer::new(4, 4);
        fill_circle(&mut buf, (0, 0), 2, INK);
        assert_eq!(buf.get(0, 0), INK);
        assert_eq!(buf.get(2, 0), INK);
        assert_eq!(buf.get(2, 2), TRANSPARENT);
    }

    #[test]
    fn test_stroke_circle_leaves_centre_empty() {
        let mut buf = PixelBuffer::new(21, 21);
        stroke_circle(&mut buf, (10, 10), 8, INK, 2);
        assert_eq!(buf.get(10, 10), TRANSPARENT);
        assert_eq!(buf.get(18, 10), INK);
        assert_eq!(buf.get(17, 10), INK);
        assert_eq!(buf.get(16, 10), TRANSPARENT);
    }

    #[test]
    fn test_rect_from_points_any_corner_order() {
        let r = Rect::from_points((8, 2), (3, 6));
        assert_eq!(r, Rect::new(3, 2, 5, 4));
        assert_eq!(Rect::from_points((3, 6), (8, 2)), r);
    }

    #[test]
    fn test_fill_rect_covers_half_open_extent() {
        let mut buf = PixelBuffer::new(10, 10);
        fill_rect(&mut buf, Rect::new(2, 3, 4, 2), INK);
        assert_eq!(count(&buf, INK), 8);
        assert_eq!(buf.get(5, 4), INK);
        assert_eq!(buf.get(6, 4), TRANSPARENT);
        assert_eq!(buf.get(5, 5), TRANSPARENT);
    }

    #[test]
    fn test_empty_rect_draws_nothing() {
        let mut buf = PixelBuffer::new(5, 5);
        fill_rect(&mut buf, Rect::new(1, 1, 0, 3), INK);
        stroke_rect(&mut buf, Rect::new(1, 1, 3, 0), INK, 1);
        assert_eq!(count(&buf, INK), 0);
    }

    #[test]
    fn test_stroke_rect_border() {
        let mut buf = PixelBuffer::new(10, 10);
        stroke_rect(&mut buf, Rect::new(1, 1, 8, 6), INK, 1);
        assert_eq!(buf.get(1, 1), INK);
        assert_eq!(buf.get(8, 6), INK);
        assert_eq!(buf.get(4, 3), TRANSPARENT);
        // perimeter of an 8×6 box
        assert_eq!(count(&buf, INK), 2 * 8 + 2 * 4);
    }
}
