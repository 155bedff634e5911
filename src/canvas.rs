// ============================================================================
// CANVAS - pixel buffers, layers and the layer stack
// ============================================================================

use image::{Rgba, RgbaImage};
use rayon::prelude::*;

pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);
pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Integer canvas coordinate. Signed so pointer positions that drift off the
/// canvas edge can be passed straight through and ignored by the buffer.
pub type Point = (i32, i32);

#[inline]
pub fn with_alpha(rgb: [u8; 3], alpha: u8) -> Rgba<u8> {
    Rgba([rgb[0], rgb[1], rgb[2], alpha])
}

/// Source-over blend of `top` onto `base`, both straight (non-premultiplied) alpha.
pub fn blend_over(base: Rgba<u8>, top: Rgba<u8>) -> Rgba<u8> {
    // Fast path: fully transparent top pixel, nothing to blend
    if top[3] == 0 {
        return base;
    }
    // Fast path: fully opaque top pixel, just overwrite
    if top[3] == 255 {
        return top;
    }

    let base_a = base[3] as f32 / 255.0;
    let top_a = top[3] as f32 / 255.0;
    let out_a = top_a + base_a * (1.0 - top_a);
    if out_a <= 0.0 {
        return TRANSPARENT;
    }

    let channel = |t: u8, b: u8| -> u8 {
        let t = t as f32 / 255.0;
        let b = b as f32 / 255.0;
        let c = (t * top_a + b * base_a * (1.0 - top_a)) / out_a;
        (c * 255.0).round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        channel(top[0], base[0]),
        channel(top[1], base[1]),
        channel(top[2], base[2]),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}

// ============================================================================
// PIXEL BUFFER
// ============================================================================

/// Fixed-size RGBA grid. Reads outside the grid yield transparent black and
/// writes outside it are dropped.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelBuffer {
    image: RgbaImage,
}

impl PixelBuffer {
    /// Fully transparent buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    pub fn filled(width: u32, height: u32, color: Rgba<u8>) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, color),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.image.width() && (y as u32) < self.image.height()
    }

    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Rgba<u8> {
        if self.contains(x, y) {
            *self.image.get_pixel(x as u32, y as u32)
        } else {
            TRANSPARENT
        }
    }

    #[inline]
    pub fn set(&mut self, x: i32, y: i32, color: Rgba<u8>) {
        if self.contains(x, y) {
            self.image.put_pixel(x as u32, y as u32, color);
        }
    }

    pub fn fill(&mut self, color: Rgba<u8>) {
        for px in self.image.pixels_mut() {
            *px = color;
        }
    }

    /// Blend this buffer over `dest` with its top-left corner at `origin`.
    /// Regions falling outside `dest` are clipped.
    pub fn composite_onto(&self, dest: &mut PixelBuffer, origin: Point) {
        let (ox, oy) = origin;
        let dw = dest.width() as i32;
        let dh = dest.height() as i32;
        let x0 = ox.max(0);
        let x1 = ox.saturating_add(self.width() as i32).min(dw);
        let y0 = oy.max(0);
        let y1 = oy.saturating_add(self.height() as i32).min(dh);
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        let row_len = dw as usize * 4;
        let src = &self.image;
        dest.image
            .par_chunks_mut(row_len)
            .enumerate()
            .skip(y0 as usize)
            .take((y1 - y0) as usize)
            .for_each(|(dy, row)| {
                let sy = (dy as i32 - oy) as u32;
                for dx in x0..x1 {
                    let top = *src.get_pixel((dx - ox) as u32, sy);
                    if top[3] == 0 {
                        continue;
                    }
                    let o = dx as usize * 4;
                    let base = Rgba([row[o], row[o + 1], row[o + 2], row[o + 3]]);
                    row[o..o + 4].copy_from_slice(&blend_over(base, top).0);
                }
            });
    }

    /// Number of pixels that differ from `other` (dimensions must match).
    pub fn diff_count(&self, other: &PixelBuffer) -> usize {
        self.image
            .pixels()
            .zip(other.image.pixels())
            .filter(|(a, b)| a != b)
            .count()
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    pub fn byte_size(&self) -> usize {
        self.image.as_raw().len()
    }
}

// ============================================================================
// LAYERS
// ============================================================================

/// Identity of a layer that survives reordering, removal and merges of its
/// neighbours. History entries refer to layers by id, never by index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LayerId(u64);

#[derive(Clone, Debug)]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    pub pixels: PixelBuffer,
}

/// Ordered layers, bottom first, with an active-layer cursor.
/// Never empty.
#[derive(Clone, Debug)]
pub struct LayerStack {
    layers: Vec<Layer>,
    active: usize,
    width: u32,
    height: u32,
    next_id: u64,
}

impl LayerStack {
    pub fn new(width: u32, height: u32) -> Self {
        let mut stack = Self {
            layers: Vec::new(),
            active: 0,
            width,
            height,
            next_id: 0,
        };
        stack.add_layer();
        stack
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active(&self) -> &Layer {
        &self.layers[self.active]
    }

    pub fn active_pixels_mut(&mut self) -> &mut PixelBuffer {
        &mut self.layers[self.active].pixels
    }

    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    /// Append a transparent layer on top and make it active.
    pub fn add_layer(&mut self) -> LayerId {
        let id = LayerId(self.next_id);
        self.next_id += 1;
        self.layers.push(Layer {
            id,
            name: format!("Layer {}", self.next_id),
            pixels: PixelBuffer::new(self.width, self.height),
        });
        self.active = self.layers.len() - 1;
        log::debug!("Added layer {} ({} total)", self.next_id, self.layers.len());
        id
    }

    /// Remove the active layer. Ignored when it is the only one.
    pub fn remove_layer(&mut self) -> bool {
        if self.layers.len() <= 1 {
            return false;
        }
        let removed = self.layers.remove(self.active);
        self.active = self.active.min(self.layers.len() - 1);
        log::debug!("Removed '{}', active is now {}", removed.name, self.active);
        true
    }

    /// Blend the active layer onto the one below and drop it.
    /// Ignored when the active layer is the bottom one.
    pub fn merge_down(&mut self) -> bool {
        if self.active == 0 {
            return false;
        }
        let top = self.layers.remove(self.active);
        self.active -= 1;
        top.pixels
            .composite_onto(&mut self.layers[self.active].pixels, (0, 0));
        log::debug!("Merged '{}' into '{}'", top.name, self.layers[self.active].name);
        true
    }

    /// Flatten all layers bottom-to-top over opaque white.
    pub fn composite(&self) -> PixelBuffer {
        self.composite_with(None)
    }

    /// Like [`composite`](Self::composite) but with `active_override` drawn in
    /// place of the active layer. Used to show a shape preview.
    pub fn composite_with(&self, active_override: Option<&PixelBuffer>) -> PixelBuffer {
        let mut out = PixelBuffer::filled(self.width, self.height, WHITE);
        for (i, layer) in self.layers.iter().enumerate() {
            let pixels = match active_override {
                Some(preview) if i == self.active => preview,
                _ => &layer.pixels,
            };
            pixels.composite_onto(&mut out, (0, 0));
        }
        out
    }
}
