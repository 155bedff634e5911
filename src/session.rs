use std::path::PathBuf;

use crate::canvas::{LayerStack, PixelBuffer, Point};
use crate::components::colors::{format_rgb, next_palette_color, toggle_fill};
use crate::components::history::HistoryManager;
use crate::components::tools::{Tool, ToolEngine};
use crate::error::SaveError;
use crate::input::{EditorCommand, InputEvent};
use crate::io;
use crate::ops::text::FontRenderer;
use crate::settings::EngineSettings;

/// What [`Session::handle`] did with an event.
#[derive(Debug)]
pub enum Response {
    /// Outside the drawable region, or not valid in the current state.
    Ignored,
    Applied,
    Saved(PathBuf),
    SaveFailed(SaveError),
}

fn applied_if(taken: bool) -> Response {
    if taken { Response::Applied } else { Response::Ignored }
}

/// Snapshot of the values shown in the status strip.
#[derive(Clone, Debug, PartialEq)]
pub struct Status {
    pub tool: Tool,
    pub size: u32,
    pub color: [u8; 3],
    pub fill_color: Option<[u8; 3]>,
    /// 1-based.
    pub active_layer: usize,
    pub layer_count: usize,
}

impl Status {
    pub fn tool_line(&self) -> String {
        format!(
            "Tool: {} | Size: {} | Color: {}",
            self.tool.label().to_uppercase(),
            self.size,
            format_rgb(self.color)
        )
    }

    pub fn layer_line(&self) -> String {
        format!("Layer: {}/{}", self.active_layer, self.layer_count)
    }
}

/// One drawing: layers, history, tool state and settings, driven entirely
/// through [`handle`](Self::handle).
pub struct Session {
    settings: EngineSettings,
    layers: LayerStack,
    history: HistoryManager,
    tools: ToolEngine,
    is_dirty: bool,
}

impl Session {
    /// Session without a text font; text placement does nothing until a
    /// renderer is installed.
    pub fn new(settings: EngineSettings) -> Self {
        Self::with_engine(settings, ToolEngine::default())
    }

    pub fn with_engine(settings: EngineSettings, tools: ToolEngine) -> Self {
        let layers = LayerStack::new(settings.canvas_width, settings.canvas_height);
        let history = HistoryManager::new(settings.max_undo_steps);
        log::info!(
            "New {}x{} canvas, {} undo steps",
            layers.width(),
            layers.height(),
            settings.max_undo_steps
        );
        Self {
            settings,
            layers,
            history,
            tools,
            is_dirty: false,
        }
    }

    /// Like [`new`](Self::new), and loads the configured system font.
    pub fn with_system_font(settings: EngineSettings) -> Self {
        let mut session = Self::new(settings);
        session.load_system_font();
        session
    }

    /// Install the configured font for the text tool. A missing font leaves
    /// the text tool inert.
    pub fn load_system_font(&mut self) {
        match FontRenderer::from_system(&self.settings.font_family, self.settings.font_size) {
            Ok(renderer) => self.tools.set_glyph_renderer(Box::new(renderer)),
            Err(e) => log::warn!("Text tool disabled: {}", e),
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn layers(&self) -> &LayerStack {
        &self.layers
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn tools(&self) -> &ToolEngine {
        &self.tools
    }

    pub fn tools_mut(&mut self) -> &mut ToolEngine {
        &mut self.tools
    }

    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    /// Get the display title (name with dirty indicator)
    pub fn display_title(&self) -> String {
        if self.is_dirty {
            "FreakDraw 2*".to_string()
        } else {
            "FreakDraw 2".to_string()
        }
    }

    /// Presses and drags count only on the canvas above the status strip.
    pub fn in_drawable(&self, (x, y): Point) -> bool {
        x >= 0
            && y >= 0
            && (x as u32) < self.layers.width()
            && (y as u32) < self.settings.drawable_height()
    }

    pub fn handle(&mut self, event: &InputEvent) -> Response {
        match *event {
            InputEvent::PointerDown { x, y } => {
                if !self.in_drawable((x, y)) {
                    return Response::Ignored;
                }
                let before = self.history.recorded();
                self.tools.pointer_down((x, y), &mut self.layers, &mut self.history);
                if self.history.recorded() != before {
                    self.is_dirty = true;
                }
                Response::Applied
            }
            InputEvent::PointerMove { x, y } => {
                if !self.tools.is_dragging() || !self.in_drawable((x, y)) {
                    return Response::Ignored;
                }
                self.tools.pointer_move((x, y), &mut self.layers);
                Response::Applied
            }
            // Releases always land, even over the strip, so a drag never
            // stays open.
            InputEvent::PointerUp { x, y } => {
                self.tools.pointer_up((x, y), &mut self.layers);
                Response::Applied
            }
            InputEvent::Char { ch } => applied_if(self.tools.text_input(ch)),
            InputEvent::Backspace => applied_if(self.tools.backspace()),
            InputEvent::Command { command } => self.apply_command(command),
        }
    }

    pub fn handle_all<'a>(&mut self, events: impl IntoIterator<Item = &'a InputEvent>) {
        for event in events {
            if let Response::SaveFailed(e) = self.handle(event) {
                log::error!("Save failed: {}", e);
            }
        }
    }

    fn apply_command(&mut self, command: EditorCommand) -> Response {
        match command {
            EditorCommand::SelectTool(tool) => self.tools.set_tool(tool),
            EditorCommand::SizeUp => self.tools.props.grow(),
            EditorCommand::SizeDown => self.tools.props.shrink(),
            EditorCommand::CycleColor => {
                let props = &mut self.tools.props;
                props.color = next_palette_color(props.color);
            }
            EditorCommand::ToggleFill => {
                let props = &mut self.tools.props;
                props.fill_color = toggle_fill(props.fill_color);
            }
            EditorCommand::Save => {
                return match self.save() {
                    Ok(path) => Response::Saved(path),
                    Err(e) => Response::SaveFailed(e),
                };
            }
            // Layer and history edits are refused while a drag is open.
            _ if self.tools.is_dragging() => {
                log::debug!("Ignoring {:?} during a drag", command);
                return Response::Ignored;
            }
            EditorCommand::Undo => match self.history.undo(&mut self.layers) {
                Some(desc) => log::info!("Undo: {}", desc),
                None => return Response::Ignored,
            },
            EditorCommand::Redo => match self.history.redo(&mut self.layers) {
                Some(desc) => log::info!("Redo: {}", desc),
                None => return Response::Ignored,
            },
            EditorCommand::AddLayer => {
                self.layers.add_layer();
                log::info!("Layer added ({} total)", self.layers.len());
            }
            EditorCommand::RemoveLayer => {
                if !self.layers.remove_layer() {
                    return Response::Ignored;
                }
                log::info!("Layer removed ({} left)", self.layers.len());
            }
            EditorCommand::MergeDown => {
                if !self.layers.merge_down() {
                    return Response::Ignored;
                }
                log::info!("Merged down ({} left)", self.layers.len());
            }
        }
        if matches!(
            command,
            EditorCommand::Undo
                | EditorCommand::Redo
                | EditorCommand::AddLayer
                | EditorCommand::RemoveLayer
                | EditorCommand::MergeDown
        ) {
            self.is_dirty = true;
        }
        Response::Applied
    }

    /// Flatten and write to the configured output directory.
    pub fn save(&mut self) -> Result<PathBuf, SaveError> {
        let path = io::save_drawing(&self.layers, &self.settings.output_dir)?;
        self.is_dirty = false;
        Ok(path)
    }

    /// Flattened layers for display, with any shape preview standing in for
    /// the active layer.
    pub fn display_image(&self) -> PixelBuffer {
        self.layers.composite_with(self.tools.preview())
    }

    pub fn composite(&self) -> PixelBuffer {
        self.layers.composite()
    }

    pub fn status(&self) -> Status {
        let props = &self.tools.props;
        Status {
            tool: self.tools.tool(),
            size: props.size(),
            color: props.color,
            fill_color: props.fill_color,
            active_layer: self.layers.active_index() + 1,
            layer_count: self.layers.len(),
        }
    }
}
