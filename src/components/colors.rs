// ============================================================================
// Stroke palette and fill toggle
// ============================================================================

/// Colours visited by the colour-cycle command, in order.
pub const PALETTE: [[u8; 3]; 8] = [
    [0, 0, 0],
    [255, 0, 0],
    [0, 255, 0],
    [0, 0, 255],
    [255, 255, 0],
    [255, 0, 255],
    [0, 255, 255],
    [255, 255, 255],
];

/// Fill colour used when the fill toggle is switched on.
pub const DEFAULT_FILL: [u8; 3] = [255, 255, 255];

/// Palette entry after `current`. A colour not in the palette counts as the
/// first entry, so the next one is red.
pub fn next_palette_color(current: [u8; 3]) -> [u8; 3] {
    let idx = PALETTE.iter().position(|c| *c == current).unwrap_or(0);
    PALETTE[(idx + 1) % PALETTE.len()]
}

/// Switch shape filling off, or on with [`DEFAULT_FILL`].
pub fn toggle_fill(current: Option<[u8; 3]>) -> Option<[u8; 3]> {
    match current {
        Some(_) => None,
        None => Some(DEFAULT_FILL),
    }
}

pub fn format_rgb(c: [u8; 3]) -> String {
    format!("RGB({}, {}, {})", c[0], c[1], c[2])
}
