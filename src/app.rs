use eframe::egui;
use egui::{Color32, ColorImage, Pos2, Rect, Sense, TextureHandle, TextureOptions, Vec2};

use crate::components::tools::{Tool, ToolPhase};
use crate::input::{command_for_key, EditorCommand, InputEvent};
use crate::session::{Response, Session};

const STRIP_BG: Color32 = Color32::from_rgb(240, 240, 240);
const STRIP_TEXT: Color32 = Color32::from_rgb(50, 50, 50);

/// Interactive host: shows the session's display image at 1:1 and feeds it
/// pointer, key and text events once per frame.
pub struct FreakDrawApp {
    session: Session,
    texture: Option<TextureHandle>,
    /// Last save result shown in the side panel.
    message: Option<String>,
}

impl FreakDrawApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, session: Session) -> Self {
        Self {
            session,
            texture: None,
            message: None,
        }
    }

    fn dispatch(&mut self, event: InputEvent) {
        match self.session.handle(&event) {
            Response::Saved(path) => self.message = Some(format!("Saved {}", path.display())),
            Response::SaveFailed(e) => {
                log::error!("Save failed: {}", e);
                self.message = Some(format!("Save failed: {}", e));
            }
            Response::Applied | Response::Ignored => {}
        }
    }

    /// Translate this frame's raw egui events into session events.
    /// `canvas` is the on-screen rectangle of the canvas image.
    fn collect_events(&self, ctx: &egui::Context, canvas: Rect) -> Vec<InputEvent> {
        let text_mode = self.session.tools().phase() == ToolPhase::TextPending;
        let to_canvas = |p: Pos2| -> (i32, i32) {
            let local = p - canvas.min;
            (local.x.floor() as i32, local.y.floor() as i32)
        };

        ctx.input(|i| {
            let mut out = Vec::new();
            for ev in &i.events {
                match ev {
                    egui::Event::PointerButton {
                        pos,
                        button: egui::PointerButton::Primary,
                        pressed,
                        ..
                    } => {
                        let (x, y) = to_canvas(*pos);
                        if *pressed {
                            if canvas.contains(*pos) {
                                out.push(InputEvent::PointerDown { x, y });
                            }
                        } else {
                            out.push(InputEvent::PointerUp { x, y });
                        }
                    }
                    egui::Event::PointerMoved(pos) => {
                        let (x, y) = to_canvas(*pos);
                        out.push(InputEvent::PointerMove { x, y });
                    }
                    egui::Event::Text(text) => {
                        for ch in text.chars() {
                            if text_mode {
                                out.push(InputEvent::Char { ch });
                            } else if let Some(command) = command_for_key(ch) {
                                out.push(InputEvent::Command { command });
                            }
                        }
                    }
                    egui::Event::Key {
                        key: egui::Key::Backspace,
                        pressed: true,
                        ..
                    } if text_mode => out.push(InputEvent::Backspace),
                    // Leaves text entry without placing anything.
                    egui::Event::Key {
                        key: egui::Key::Escape,
                        pressed: true,
                        ..
                    } if text_mode => out.push(InputEvent::Command {
                        command: EditorCommand::SelectTool(Tool::Text),
                    }),
                    _ => {}
                }
            }
            out
        })
    }

    fn upload_canvas(&mut self, ctx: &egui::Context) {
        let image = self.session.display_image();
        let (w, h) = image.dimensions();
        let color_image = ColorImage::from_rgba_unmultiplied([w as usize, h as usize], image.as_image().as_raw());
        match &mut self.texture {
            Some(tex) => tex.set(color_image, TextureOptions::NEAREST),
            None => {
                self.texture = Some(ctx.load_texture("canvas", color_image, TextureOptions::NEAREST));
            }
        }
    }

    fn draw_status_strip(&self, painter: &egui::Painter, canvas: Rect) {
        let strip_h = self.session.settings().ui_strip_height as f32;
        if strip_h <= 0.0 {
            return;
        }
        let strip = Rect::from_min_max(Pos2::new(canvas.min.x, canvas.max.y - strip_h), canvas.max);
        painter.rect_filled(strip, 0.0, STRIP_BG);

        let status = self.session.status();
        let font = egui::FontId::proportional(14.0);
        painter.text(
            strip.min + Vec2::new(10.0, 6.0),
            egui::Align2::LEFT_TOP,
            status.tool_line(),
            font.clone(),
            STRIP_TEXT,
        );
        painter.text(
            strip.min + Vec2::new(10.0, 28.0),
            egui::Align2::LEFT_TOP,
            status.layer_line(),
            font.clone(),
            STRIP_TEXT,
        );
        if self.session.tools().phase() == ToolPhase::TextPending {
            painter.text(
                strip.center_top() + Vec2::new(0.0, 6.0),
                egui::Align2::CENTER_TOP,
                format!("Text: {}_", self.session.tools().pending_text()),
                font,
                STRIP_TEXT,
            );
        }

        let [r, g, b] = status.color;
        let swatch = Rect::from_min_size(Pos2::new(strip.max.x - 40.0, strip.min.y + 10.0), Vec2::splat(30.0));
        painter.rect_filled(swatch, 0.0, Color32::from_rgb(r, g, b));
        painter.rect_stroke(swatch, 0.0, egui::Stroke::new(1.0, Color32::BLACK));
    }

    fn side_panel(&mut self, ctx: &egui::Context) {
        let mut commands = Vec::new();
        egui::SidePanel::right("tools_panel").resizable(false).show(ctx, |ui| {
            ui.heading("Tools");
            let current = self.session.tools().tool();
            for tool in Tool::ALL {
                let label = format!("{}  {}", tool.digit(), tool.label());
                if ui.selectable_label(current == tool, label).clicked() {
                    commands.push(EditorCommand::SelectTool(tool));
                }
            }

            ui.separator();
            let status = self.session.status();
            ui.label(format!("Size: {}", status.size));
            let fill = status
                .fill_color
                .map(crate::components::colors::format_rgb)
                .unwrap_or_else(|| "none".to_string());
            ui.label(format!("Fill: {}", fill));
            ui.horizontal(|ui| {
                if ui.button("+ Layer").clicked() {
                    commands.push(EditorCommand::AddLayer);
                }
                if ui.button("Merge").clicked() {
                    commands.push(EditorCommand::MergeDown);
                }
                if ui.button("Delete").clicked() {
                    commands.push(EditorCommand::RemoveLayer);
                }
            });

            ui.separator();
            ui.heading("History");
            let history = self.session.history();
            ui.horizontal(|ui| {
                let mut undo = ui.add_enabled(history.can_undo(), egui::Button::new("Undo"));
                if let Some(desc) = history.undo_description() {
                    undo = undo.on_hover_text(format!("Undo {}", desc));
                }
                if undo.clicked() {
                    commands.push(EditorCommand::Undo);
                }
                let mut redo = ui.add_enabled(history.can_redo(), egui::Button::new("Redo"));
                if let Some(desc) = history.redo_description() {
                    redo = redo.on_hover_text(format!("Redo {}", desc));
                }
                if redo.clicked() {
                    commands.push(EditorCommand::Redo);
                }
            });
            ui.label(format!(
                "{}/{} steps, {} redo, {:.1} MB",
                history.undo_count(),
                history.max_history_size(),
                history.redo_count(),
                history.memory_usage() as f64 / (1024.0 * 1024.0)
            ));
            egui::ScrollArea::vertical().max_height(200.0).show(ui, |ui| {
                for desc in history.undo_history() {
                    ui.label(desc);
                }
            });

            if let Some(msg) = &self.message {
                ui.separator();
                ui.label(msg);
            }
        });
        for command in commands {
            self.dispatch(InputEvent::Command { command });
        }
    }
}

impl eframe::App for FreakDrawApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.send_viewport_cmd(egui::ViewportCommand::Title(self.session.display_title()));

        self.side_panel(ctx);

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(Color32::from_gray(200)))
            .show(ctx, |ui| {
                let (w, h) = {
                    let s = self.session.settings();
                    (s.canvas_width as f32, s.canvas_height as f32)
                };
                let (canvas, _response) = ui.allocate_exact_size(Vec2::new(w, h), Sense::click_and_drag());

                for event in self.collect_events(ctx, canvas) {
                    self.dispatch(event);
                }

                self.upload_canvas(ctx);
                if let Some(tex) = &self.texture {
                    ui.painter().image(
                        tex.id(),
                        canvas,
                        Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                        Color32::WHITE,
                    );
                }
                self.draw_status_strip(ui.painter(), canvas);
            });
    }
}
