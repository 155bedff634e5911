// ============================================================================
// INPUT - normalised events fed to a session
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::components::tools::Tool;

/// Discrete editor commands, independent of how the host maps keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorCommand {
    SelectTool(Tool),
    SizeUp,
    SizeDown,
    CycleColor,
    ToggleFill,
    Undo,
    Redo,
    AddLayer,
    RemoveLayer,
    MergeDown,
    Save,
}

/// One host event. Also the element type of headless replay scripts:
///
/// ```json
/// [
///   {"type": "command", "command": {"select_tool": "circle"}},
///   {"type": "pointer_down", "x": 5, "y": 5},
///   {"type": "pointer_up", "x": 8, "y": 5}
/// ]
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    PointerDown { x: i32, y: i32 },
    PointerMove { x: i32, y: i32 },
    PointerUp { x: i32, y: i32 },
    Command { command: EditorCommand },
    /// A typed character. Only meaningful while the text tool is collecting.
    Char { ch: char },
    Backspace,
}

/// Default single-key bindings.
pub fn command_for_key(key: char) -> Option<EditorCommand> {
    if let Some(tool) = Tool::from_digit(key) {
        return Some(EditorCommand::SelectTool(tool));
    }
    let cmd = match key.to_ascii_lowercase() {
        '+' | '=' => EditorCommand::SizeUp,
        '-' => EditorCommand::SizeDown,
        'c' => EditorCommand::CycleColor,
        'f' => EditorCommand::ToggleFill,
        'u' => EditorCommand::Undo,
        'r' => EditorCommand::Redo,
        'l' => EditorCommand::AddLayer,
        'd' => EditorCommand::RemoveLayer,
        'm' => EditorCommand::MergeDown,
        's' => EditorCommand::Save,
        _ => return None,
    };
    Some(cmd)
}
