use image::Rgba;
use serde::{Deserialize, Serialize};

use crate::canvas::{with_alpha, LayerStack, PixelBuffer, Point};
use crate::components::history::HistoryManager;
use crate::ops::brush::{self, SprayRng};
use crate::ops::fill;
use crate::ops::gradient::LinearGradient;
use crate::ops::shapes::{self, Rect};
use crate::ops::text::{self, GlyphRenderer};

pub const MIN_BRUSH_SIZE: u32 = 1;
pub const MAX_BRUSH_SIZE: u32 = 100;

/// Preview gradients sample every n-th pixel.
const GRADIENT_PREVIEW_STEP: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    #[default]
    Pencil,
    Brush,
    Line,
    Rectangle,
    Circle,
    Fill,
    Text,
    Spray,
    Eraser,
    Gradient,
}

/// How a tool reacts to the pointer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToolKind {
    /// Paints at every sample of a drag.
    Continuous,
    /// Anchors on press, previews while dragging, commits on release.
    Shape,
    /// Single shot on press.
    Fill,
    /// Collects typed characters, places them on click.
    Text,
}

impl Tool {
    /// Number-key order.
    pub const ALL: [Tool; 10] = [
        Tool::Pencil,
        Tool::Brush,
        Tool::Line,
        Tool::Rectangle,
        Tool::Circle,
        Tool::Fill,
        Tool::Text,
        Tool::Spray,
        Tool::Eraser,
        Tool::Gradient,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Tool::Pencil => "Pencil",
            Tool::Brush => "Brush",
            Tool::Line => "Line",
            Tool::Rectangle => "Rectangle",
            Tool::Circle => "Circle",
            Tool::Fill => "Fill",
            Tool::Text => "Text",
            Tool::Spray => "Spray",
            Tool::Eraser => "Eraser",
            Tool::Gradient => "Gradient",
        }
    }

    pub fn kind(&self) -> ToolKind {
        match self {
            Tool::Pencil | Tool::Brush | Tool::Spray | Tool::Eraser => ToolKind::Continuous,
            Tool::Line | Tool::Rectangle | Tool::Circle | Tool::Gradient => ToolKind::Shape,
            Tool::Fill => ToolKind::Fill,
            Tool::Text => ToolKind::Text,
        }
    }

    /// `'1'` selects Pencil through `'9'` for Eraser; `'0'` is Gradient.
    pub fn from_digit(c: char) -> Option<Tool> {
        let d = c.to_digit(10)? as usize;
        let idx = if d == 0 { 9 } else { d - 1 };
        Tool::ALL.get(idx).copied()
    }

    /// Inverse of [`from_digit`](Self::from_digit).
    pub fn digit(&self) -> char {
        let idx = Tool::ALL.iter().position(|t| t == self).unwrap_or(0);
        if idx == 9 { '0' } else { char::from(b'1' + idx as u8) }
    }
}

// ============================================================================
// TOOL PROPERTIES
// ============================================================================

/// Parameters shared by every tool. Changed only by explicit commands.
#[derive(Clone, Debug, PartialEq)]
pub struct ToolProperties {
    size: u32,
    pub color: [u8; 3],
    pub fill_color: Option<[u8; 3]>,
    pub alpha: u8,
    pub gradient_start: [u8; 3],
    pub gradient_end: [u8; 3],
}

impl Default for ToolProperties {
    fn default() -> Self {
        Self {
            size: 5,
            color: [0, 0, 0],
            fill_color: None,
            alpha: 255,
            gradient_start: [255, 0, 0],
            gradient_end: [0, 0, 255],
        }
    }
}

impl ToolProperties {
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Out-of-range sizes (including negative ones) are clamped, not rejected.
    pub fn set_size(&mut self, size: i64) {
        self.size = size.clamp(MIN_BRUSH_SIZE as i64, MAX_BRUSH_SIZE as i64) as u32;
    }

    pub fn grow(&mut self) {
        self.set_size(self.size as i64 + 1);
    }

    pub fn shrink(&mut self) {
        self.set_size(self.size as i64 - 1);
    }

    pub fn stroke_rgba(&self) -> Rgba<u8> {
        with_alpha(self.color, self.alpha)
    }

    pub fn fill_rgba(&self) -> Option<Rgba<u8>> {
        self.fill_color.map(|c| with_alpha(c, self.alpha))
    }

    /// Outline width for rectangles and circles.
    pub fn outline_width(&self) -> u32 {
        (self.size / 2).max(1)
    }

    pub fn gradient(&self) -> LinearGradient {
        LinearGradient {
            start: self.gradient_start,
            end: self.gradient_end,
            alpha: self.alpha,
        }
    }
}

// ============================================================================
// TOOL ENGINE - pointer state machine
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToolPhase {
    Idle,
    Stroking,
    /// `shape` is the tool the release will draw with.
    ShapePending { anchor: Point, shape: Tool },
    TextPending,
}

/// Maps pointer and text events for the selected tool onto the active layer.
///
/// Every committing action records exactly one history snapshot first.
/// Shape drags render into a scratch copy of the active layer, which is only
/// written back on release.
pub struct ToolEngine {
    tool: Tool,
    pub props: ToolProperties,
    phase: ToolPhase,
    last_pos: Option<Point>,
    pending_text: String,
    preview: Option<PixelBuffer>,
    rng: SprayRng,
    glyphs: Option<Box<dyn GlyphRenderer>>,
}

impl Default for ToolEngine {
    fn default() -> Self {
        Self::new(SprayRng::from_time())
    }
}

impl ToolEngine {
    pub fn new(rng: SprayRng) -> Self {
        Self {
            tool: Tool::default(),
            props: ToolProperties::default(),
            phase: ToolPhase::Idle,
            last_pos: None,
            pending_text: String::new(),
            preview: None,
            rng,
            glyphs: None,
        }
    }

    /// Renderer used by the text tool. Without one, text placement is a no-op.
    pub fn set_glyph_renderer(&mut self, glyphs: Box<dyn GlyphRenderer>) {
        self.glyphs = Some(glyphs);
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn phase(&self) -> ToolPhase {
        self.phase
    }

    /// `true` while a press-drag-release gesture is in progress.
    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, ToolPhase::Stroking | ToolPhase::ShapePending { .. })
    }

    pub fn pending_text(&self) -> &str {
        &self.pending_text
    }

    /// Uncommitted shape, only while a shape drag is in progress.
    pub fn preview(&self) -> Option<&PixelBuffer> {
        match self.phase {
            ToolPhase::ShapePending { .. } => self.preview.as_ref(),
            _ => None,
        }
    }

    /// Switch tools. Pending text is discarded and a stroke simply ends.
    /// An open shape stays open with the tool it was started with; only the
    /// next release commits it.
    pub fn set_tool(&mut self, tool: Tool) {
        if tool != self.tool {
            log::info!("Tool: {}", tool.label());
        }
        self.tool = tool;
        if !matches!(self.phase, ToolPhase::ShapePending { .. }) {
            self.reset();
        }
    }

    fn reset(&mut self) {
        self.phase = ToolPhase::Idle;
        self.last_pos = None;
        self.pending_text.clear();
        self.preview = None;
    }

    pub fn pointer_down(&mut self, pos: Point, layers: &mut LayerStack, history: &mut HistoryManager) {
        let pos = bound_to_canvas(pos, layers);
        match self.phase {
            ToolPhase::Idle => self.begin(pos, layers, history),
            ToolPhase::TextPending => self.place_pending_text(pos, layers, history),
            // A press without a matching release; finish the old gesture first.
            ToolPhase::Stroking | ToolPhase::ShapePending { .. } => {
                self.pointer_up(pos, layers);
                self.begin(pos, layers, history);
            }
        }
    }

    fn begin(&mut self, pos: Point, layers: &mut LayerStack, history: &mut HistoryManager) {
        match self.tool.kind() {
            ToolKind::Continuous => {
                history.snapshot(layers, self.tool.label());
                self.last_pos = None;
                self.phase = ToolPhase::Stroking;
                self.stamp(pos, layers);
                self.last_pos = Some(pos);
            }
            ToolKind::Shape => {
                history.snapshot(layers, self.tool.label());
                self.phase = ToolPhase::ShapePending {
                    anchor: pos,
                    shape: self.tool,
                };
                self.update_preview(pos, layers);
            }
            ToolKind::Fill => {
                let replacement = self.props.stroke_rgba();
                if fill::is_noop(&layers.active().pixels, pos, replacement) {
                    return;
                }
                history.snapshot(layers, self.tool.label());
                let n = fill::flood_fill(layers.active_pixels_mut(), pos, replacement);
                log::info!("Filled {} pixels at {:?}", n, pos);
            }
            ToolKind::Text => {
                history.snapshot(layers, self.tool.label());
                self.phase = ToolPhase::TextPending;
            }
        }
    }

    pub fn pointer_move(&mut self, pos: Point, layers: &mut LayerStack) {
        let pos = bound_to_canvas(pos, layers);
        match self.phase {
            ToolPhase::Stroking => {
                self.stamp(pos, layers);
                self.last_pos = Some(pos);
            }
            ToolPhase::ShapePending { .. } => self.update_preview(pos, layers),
            ToolPhase::Idle | ToolPhase::TextPending => {}
        }
    }

    pub fn pointer_up(&mut self, pos: Point, layers: &mut LayerStack) {
        let pos = bound_to_canvas(pos, layers);
        match self.phase {
            ToolPhase::Stroking => {
                self.phase = ToolPhase::Idle;
                self.last_pos = None;
            }
            ToolPhase::ShapePending { anchor, shape } => {
                Self::render_shape(shape, &self.props, layers.active_pixels_mut(), anchor, pos, false);
                log::debug!("{} committed {:?} -> {:?}", shape.label(), anchor, pos);
                self.phase = ToolPhase::Idle;
                self.preview = None;
            }
            ToolPhase::Idle | ToolPhase::TextPending => {}
        }
    }

    /// Append a printable character to the pending text. Returns whether
    /// it was taken.
    pub fn text_input(&mut self, ch: char) -> bool {
        if self.phase != ToolPhase::TextPending || ch.is_control() {
            return false;
        }
        self.pending_text.push(ch);
        true
    }

    pub fn backspace(&mut self) -> bool {
        self.phase == ToolPhase::TextPending && self.pending_text.pop().is_some()
    }

    fn place_pending_text(&mut self, pos: Point, layers: &mut LayerStack, history: &mut HistoryManager) {
        if self.pending_text.is_empty() {
            return;
        }
        let raster = match &self.glyphs {
            Some(glyphs) => glyphs.render(&self.pending_text, self.props.stroke_rgba()),
            None => {
                log::warn!("No font available, dropping text '{}'", self.pending_text);
                None
            }
        };
        if let Some(raster) = raster {
            history.snapshot(layers, self.tool.label());
            text::place_text(layers.active_pixels_mut(), &raster, pos);
            log::debug!("Placed text '{}' at {:?}", self.pending_text, pos);
        }
        self.pending_text.clear();
    }

    /// Single-point mutation of the current continuous tool, joined to the
    /// previous sample when there is one.
    fn stamp(&mut self, pos: Point, layers: &mut LayerStack) {
        let props = &self.props;
        let buf = layers.active_pixels_mut();
        match self.tool {
            Tool::Pencil => brush::stamp_pencil(buf, self.last_pos, pos, props.stroke_rgba(), props.size),
            Tool::Brush => brush::stamp_brush(buf, self.last_pos, pos, props.stroke_rgba(), props.size),
            Tool::Eraser => brush::stamp_eraser(buf, self.last_pos, pos, props.size),
            Tool::Spray => {
                brush::spray(buf, pos, props.color, props.alpha, props.size, &mut self.rng);
            }
            Tool::Line | Tool::Rectangle | Tool::Circle | Tool::Gradient | Tool::Fill | Tool::Text => {}
        }
    }

    fn update_preview(&mut self, pos: Point, layers: &LayerStack) {
        let ToolPhase::ShapePending { anchor, shape } = self.phase else { return };
        let mut scratch = layers.active().pixels.clone();
        Self::render_shape(shape, &self.props, &mut scratch, anchor, pos, true);
        self.preview = Some(scratch);
    }

    /// Draw the shape spanned by `anchor` and `pos`. Previews and commits go
    /// through here so both produce the same geometry; only gradients use a
    /// coarser preview.
    fn render_shape(
        tool: Tool,
        props: &ToolProperties,
        buf: &mut PixelBuffer,
        anchor: Point,
        pos: Point,
        preview: bool,
    ) {
        let stroke = props.stroke_rgba();
        match tool {
            Tool::Line => shapes::stroke_line(buf, anchor, pos, stroke, props.size),
            Tool::Rectangle => {
                let rect = Rect::from_points(anchor, pos);
                if let Some(fill) = props.fill_rgba() {
                    shapes::fill_rect(buf, rect, fill);
                }
                shapes::stroke_rect(buf, rect, stroke, props.outline_width());
            }
            Tool::Circle => {
                let radius = circle_radius(anchor, pos);
                if let Some(fill) = props.fill_rgba() {
                    shapes::fill_circle(buf, anchor, radius, fill);
                }
                shapes::stroke_circle(buf, anchor, radius, stroke, props.outline_width());
            }
            Tool::Gradient => {
                let step = if preview { GRADIENT_PREVIEW_STEP } else { 1 };
                props.gradient().render(buf, anchor, pos, step);
            }
            Tool::Pencil | Tool::Brush | Tool::Spray | Tool::Eraser | Tool::Fill | Tool::Text => {}
        }
    }
}

/// Circle radius for a drag: the truncated anchor-to-pointer distance.
pub fn circle_radius(anchor: Point, pos: Point) -> u32 {
    let dx = pos.0 as f64 - anchor.0 as f64;
    let dy = pos.1 as f64 - anchor.1 as f64;
    dx.hypot(dy) as u32
}

/// Pointer positions are kept within one canvas size of the canvas edges.
/// Anything further out acts like that margin, which keeps shape geometry
/// and path walks bounded by the canvas area.
pub fn bound_to_canvas(pos: Point, layers: &LayerStack) -> Point {
    let clamp = |v: i32, len: u32| {
        let len = len as i64;
        (v as i64).clamp(-len, 2 * len - 1).clamp(i32::MIN as i64, i32::MAX as i64) as i32
    };
    (clamp(pos.0, layers.width()), clamp(pos.1, layers.height()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{TRANSPARENT, WHITE};
    use crate::ops::text::tests::BlockRenderer;

    const RED: [u8; 3] = [255, 0, 0];

    fn setup(w: u32, h: u32) -> (ToolEngine, LayerStack, HistoryManager) {
        (ToolEngine::new(SprayRng::new(1)), LayerStack::new(w, h), HistoryManager::default())
    }

    fn painted(buf: &PixelBuffer) -> usize {
        buf.as_image().pixels().filter(|p| p[3] != 0).count()
    }

    #[test]
    fn test_digit_mapping_round_trips() {
        assert_eq!(Tool::from_digit('1'), Some(Tool::Pencil));
        assert_eq!(Tool::from_digit('9'), Some(Tool::Eraser));
        assert_eq!(Tool::from_digit('0'), Some(Tool::Gradient));
        assert_eq!(Tool::from_digit('x'), None);
        for t in Tool::ALL {
            assert_eq!(Tool::from_digit(t.digit()), Some(t));
        }
    }

    #[test]
    fn test_size_is_clamped() {
        let mut props = ToolProperties::default();
        props.set_size(-4);
        assert_eq!(props.size(), 1);
        props.shrink();
        assert_eq!(props.size(), 1);
        props.set_size(1000);
        assert_eq!(props.size(), 100);
        props.grow();
        assert_eq!(props.size(), 100);
    }

    #[test]
    fn test_stroke_lifecycle() {
        let (mut engine, mut layers, mut history) = setup(40, 40);
        engine.set_tool(Tool::Brush);

        engine.pointer_down((5, 5), &mut layers, &mut history);
        assert_eq!(engine.phase(), ToolPhase::Stroking);
        assert_eq!(history.undo_count(), 1);
        assert_ne!(layers.active().pixels.get(5, 5), TRANSPARENT);

        // sparse samples still produce a continuous stroke
        engine.pointer_move((30, 5), &mut layers);
        for x in 5..=30 {
            assert_ne!(layers.active().pixels.get(x, 5), TRANSPARENT, "gap at {x}");
        }
        engine.pointer_up((30, 5), &mut layers);
        assert_eq!(engine.phase(), ToolPhase::Idle);
        assert_eq!(history.undo_count(), 1);
    }

    #[test]
    fn test_next_stroke_does_not_join_previous() {
        let (mut engine, mut layers, mut history) = setup(40, 10);
        engine.set_tool(Tool::Pencil);
        engine.props.set_size(1);
        engine.pointer_down((2, 2), &mut layers, &mut history);
        engine.pointer_up((2, 2), &mut layers);
        engine.pointer_down((30, 2), &mut layers, &mut history);
        engine.pointer_up((30, 2), &mut layers);
        assert_eq!(layers.active().pixels.get(15, 2), TRANSPARENT);
        assert_eq!(history.undo_count(), 2);
    }

    #[test]
    fn test_shape_preview_does_not_touch_layer_or_history() {
        let (mut engine, mut layers, mut history) = setup(20, 20);
        engine.set_tool(Tool::Rectangle);
        engine.pointer_down((2, 2), &mut layers, &mut history);
        assert_eq!(history.undo_count(), 1);

        engine.pointer_move((10, 12), &mut layers);
        engine.pointer_move((15, 15), &mut layers);
        assert_eq!(painted(&layers.active().pixels), 0);
        assert_eq!(history.undo_count(), 1);
        let preview = engine.preview().cloned().unwrap();
        assert_ne!(preview.get(2, 2), TRANSPARENT);

        engine.pointer_up((15, 15), &mut layers);
        assert_eq!(engine.preview(), None);
        assert_eq!(layers.active().pixels, preview);
        assert_eq!(history.undo_count(), 1);
    }

    #[test]
    fn test_filled_circle_paints_interior_then_outline() {
        let (mut engine, mut layers, mut history) = setup(10, 10);
        engine.set_tool(Tool::Circle);
        engine.props.fill_color = Some(RED);
        engine.pointer_down((5, 5), &mut layers, &mut history);
        engine.pointer_up((8, 5), &mut layers);

        let composite = layers.composite();
        assert_eq!(composite.get(5, 5), Rgba([255, 0, 0, 255]));
        assert_eq!(composite.get(8, 5), Rgba([0, 0, 0, 255]));
        assert_eq!(composite.get(0, 0), WHITE);
    }

    #[test]
    fn test_line_uses_full_size_width() {
        let (mut engine, mut layers, mut history) = setup(30, 30);
        engine.set_tool(Tool::Line);
        engine.props.set_size(6);
        engine.pointer_down((5, 15), &mut layers, &mut history);
        engine.pointer_up((25, 15), &mut layers);
        let px = &layers.active().pixels;
        assert_ne!(px.get(15, 12), TRANSPARENT);
        assert_ne!(px.get(15, 18), TRANSPARENT);
        assert_eq!(px.get(15, 19), TRANSPARENT);
    }

    #[test]
    fn test_gradient_commit_samples_every_pixel() {
        let (mut engine, mut layers, mut history) = setup(12, 12);
        engine.set_tool(Tool::Gradient);
        engine.pointer_down((0, 0), &mut layers, &mut history);
        engine.pointer_move((11, 11), &mut layers);
        let preview = engine.preview().cloned().unwrap();
        engine.pointer_up((11, 11), &mut layers);

        let committed = &layers.active().pixels;
        assert_eq!(painted(committed), 144);
        assert_eq!(committed.get(0, 0), Rgba([255, 0, 0, 255]));
        assert_eq!(committed.get(11, 11), Rgba([0, 0, 255, 255]));
        // the coarse preview repeats samples, the commit does not
        assert_eq!(preview.get(1, 0), preview.get(0, 0));
        assert_ne!(committed.get(1, 0), committed.get(0, 0));
    }

    #[test]
    fn test_fill_is_single_shot() {
        let (mut engine, mut layers, mut history) = setup(6, 6);
        engine.set_tool(Tool::Fill);
        engine.props.color = RED;
        engine.pointer_down((3, 3), &mut layers, &mut history);
        assert_eq!(engine.phase(), ToolPhase::Idle);
        assert_eq!(history.undo_count(), 1);
        assert_eq!(painted(&layers.active().pixels), 36);

        // same colour again: nothing to do, nothing recorded
        engine.pointer_down((1, 1), &mut layers, &mut history);
        assert_eq!(history.undo_count(), 1);
    }

    #[test]
    fn test_fill_outside_canvas_records_nothing() {
        let (mut engine, mut layers, mut history) = setup(6, 6);
        engine.set_tool(Tool::Fill);
        engine.pointer_down((60, 3), &mut layers, &mut history);
        assert_eq!(history.undo_count(), 0);
    }

    #[test]
    fn test_text_is_placed_only_on_next_click() {
        let (mut engine, mut layers, mut history) = setup(30, 10);
        engine.set_glyph_renderer(Box::new(BlockRenderer));
        engine.set_tool(Tool::Text);

        engine.pointer_down((1, 1), &mut layers, &mut history);
        assert_eq!(engine.phase(), ToolPhase::TextPending);
        assert_eq!(history.undo_count(), 1);

        for ch in "hix".chars() {
            engine.text_input(ch);
        }
        engine.backspace();
        engine.text_input('\r');
        assert_eq!(engine.pending_text(), "hi");
        assert_eq!(painted(&layers.active().pixels), 0);

        engine.pointer_down((4, 2), &mut layers, &mut history);
        assert_eq!(history.undo_count(), 2);
        assert_eq!(engine.pending_text(), "");
        assert_eq!(engine.phase(), ToolPhase::TextPending);
        assert_ne!(layers.active().pixels.get(4, 2), TRANSPARENT);
        assert_ne!(layers.active().pixels.get(7, 4), TRANSPARENT);

        // empty buffer: click places nothing and records nothing
        engine.pointer_down((20, 2), &mut layers, &mut history);
        assert_eq!(history.undo_count(), 2);
    }

    #[test]
    fn test_text_without_renderer_is_dropped() {
        let (mut engine, mut layers, mut history) = setup(10, 10);
        engine.set_tool(Tool::Text);
        engine.pointer_down((1, 1), &mut layers, &mut history);
        engine.text_input('a');
        engine.pointer_down((1, 1), &mut layers, &mut history);
        assert_eq!(painted(&layers.active().pixels), 0);
        assert_eq!(engine.pending_text(), "");
    }

    #[test]
    fn test_typing_outside_text_mode_is_ignored() {
        let (mut engine, _, _) = setup(4, 4);
        engine.text_input('a');
        assert_eq!(engine.pending_text(), "");
    }

    #[test]
    fn test_switching_tool_mid_stroke_ends_stroke() {
        let (mut engine, mut layers, mut history) = setup(10, 10);
        engine.set_tool(Tool::Pencil);
        engine.pointer_down((1, 1), &mut layers, &mut history);
        engine.set_tool(Tool::Brush);
        assert_eq!(engine.phase(), ToolPhase::Idle);
        engine.pointer_move((8, 8), &mut layers);
        assert_eq!(layers.active().pixels.get(8, 8), TRANSPARENT);
    }

    #[test]
    fn test_switching_tool_mid_drag_still_commits_open_shape() {
        let (mut engine, mut layers, mut history) = setup(20, 20);
        engine.props.set_size(1);
        engine.set_tool(Tool::Line);
        engine.pointer_down((2, 2), &mut layers, &mut history);
        engine.pointer_move((15, 2), &mut layers);
        engine.set_tool(Tool::Rectangle);
        assert!(engine.is_dragging());
        assert!(engine.preview().is_some());

        engine.pointer_up((15, 2), &mut layers);
        assert_eq!(engine.phase(), ToolPhase::Idle);
        assert_eq!(history.undo_count(), 1);
        for x in 2..=15 {
            assert_ne!(layers.active().pixels.get(x, 2), TRANSPARENT, "gap at {x}");
        }

        // the new tool takes over from the next press
        engine.pointer_down((2, 6), &mut layers, &mut history);
        engine.pointer_up((10, 12), &mut layers);
        assert_ne!(layers.active().pixels.get(2, 11), TRANSPARENT);
    }

    #[test]
    fn test_switching_to_other_tool_mid_drag_keeps_pending_shape() {
        let (mut engine, mut layers, mut history) = setup(20, 20);
        engine.props.set_size(1);
        engine.set_tool(Tool::Line);
        engine.pointer_down((2, 2), &mut layers, &mut history);
        engine.set_tool(Tool::Fill);
        assert!(engine.is_dragging());

        engine.pointer_up((12, 2), &mut layers);
        assert_eq!(engine.tool(), Tool::Fill);
        for x in 2..=12 {
            assert_ne!(layers.active().pixels.get(x, 2), TRANSPARENT);
        }
        assert_eq!(history.undo_count(), 1);
    }

    #[test]
    fn test_extreme_release_positions_stay_bounded() {
        for tool in [Tool::Line, Tool::Rectangle, Tool::Circle, Tool::Gradient, Tool::Brush] {
            let (mut engine, mut layers, mut history) = setup(12, 12);
            engine.set_tool(tool);
            engine.props.fill_color = Some([0, 0, 0]);
            engine.pointer_down((5, 5), &mut layers, &mut history);
            engine.pointer_move((i32::MAX, i32::MIN), &mut layers);
            engine.pointer_up((i32::MIN, i32::MIN), &mut layers);
            assert!(painted(&layers.active().pixels) > 0, "{tool:?}");
            assert_eq!(engine.phase(), ToolPhase::Idle);
        }
    }

    #[test]
    fn test_bound_to_canvas_keeps_one_canvas_margin() {
        let layers = LayerStack::new(10, 4);
        assert_eq!(bound_to_canvas((3, 2), &layers), (3, 2));
        assert_eq!(bound_to_canvas((-7, 6), &layers), (-7, 6));
        assert_eq!(bound_to_canvas((i32::MIN, i32::MAX), &layers), (-10, 7));
    }

    #[test]
    fn test_eraser_clears_pixels() {
        let (mut engine, mut layers, mut history) = setup(20, 20);
        layers.active_pixels_mut().fill(Rgba([0, 0, 0, 255]));
        engine.set_tool(Tool::Eraser);
        engine.props.set_size(3);
        engine.pointer_down((10, 10), &mut layers, &mut history);
        engine.pointer_up((10, 10), &mut layers);
        assert_eq!(layers.active().pixels.get(10, 13), TRANSPARENT);
        assert_eq!(layers.active().pixels.get(10, 14)[3], 255);
    }

    #[test]
    fn test_spray_alpha_bounds_through_engine() {
        let (mut engine, mut layers, mut history) = setup(50, 50);
        engine.set_tool(Tool::Spray);
        engine.props.alpha = 180;
        engine.pointer_down((25, 25), &mut layers, &mut history);
        engine.pointer_move((26, 25), &mut layers);
        engine.pointer_up((26, 25), &mut layers);
        let px = &layers.active().pixels;
        assert!(painted(px) > 0);
        for p in px.as_image().pixels().filter(|p| p[3] != 0) {
            assert!((100..=180).contains(&p[3]));
        }
    }

    #[test]
    fn test_circle_radius_truncates() {
        assert_eq!(circle_radius((0, 0), (3, 4)), 5);
        assert_eq!(circle_radius((0, 0), (2, 2)), 2);
        assert_eq!(circle_radius((4, 4), (4, 4)), 0);
    }
}
