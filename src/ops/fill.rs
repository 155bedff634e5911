// ============================================================================
// FLOOD FILL - exact-match, 4-connected region replacement
// ============================================================================

use image::Rgba;

use crate::canvas::{PixelBuffer, Point};

/// `true` when filling at `seed` would change nothing: the seed lies outside
/// the buffer or already holds `replacement`. Callers check this before
/// recording history.
pub fn is_noop(buf: &PixelBuffer, seed: Point, replacement: Rgba<u8>) -> bool {
    !buf.contains(seed.0, seed.1) || buf.get(seed.0, seed.1) == replacement
}

/// Replace every pixel 4-connected to `seed` whose colour exactly equals the
/// seed's colour. Returns the number of pixels changed.
pub fn flood_fill(buf: &mut PixelBuffer, seed: Point, replacement: Rgba<u8>) -> usize {
    if is_noop(buf, seed, replacement) {
        return 0;
    }

    let w = buf.width();
    let h = buf.height();
    let target = buf.get(seed.0, seed.1);

    // DFS stack of packed flat indices (y * w + x) instead of coordinate tuples.
    let mut stack: Vec<u32> = Vec::with_capacity(4096);
    stack.push(seed.1 as u32 * w + seed.0 as u32);

    let mut filled = 0usize;
    while let Some(idx) = stack.pop() {
        let x = (idx % w) as i32;
        let y = (idx / w) as i32;

        // Pixels may be pushed twice before the first visit recolours them.
        if buf.get(x, y) != target {
            continue;
        }
        buf.set(x, y, replacement);
        filled += 1;

        if x > 0 && buf.get(x - 1, y) == target {
            stack.push(idx - 1);
        }
        if (x as u32) + 1 < w && buf.get(x + 1, y) == target {
            stack.push(idx + 1);
        }
        if y > 0 && buf.get(x, y - 1) == target {
            stack.push(idx - w);
        }
        if (y as u32) + 1 < h && buf.get(x, y + 1) == target {
            stack.push(idx + w);
        }
    }

    log::debug!("Flood fill at {:?} replaced {} pixels", seed, filled);
    filled
}
