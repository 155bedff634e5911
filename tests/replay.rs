use std::path::PathBuf;

use freakdraw::cli::{load_script, run_one};
use freakdraw::error::ReplayError;
use freakdraw::settings::EngineSettings;

fn scratch_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("freakdraw_replay_{}_{}", tag, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn settings() -> EngineSettings {
    EngineSettings {
        canvas_width: 16,
        canvas_height: 12,
        ui_strip_height: 2,
        ..Default::default()
    }
}

const SCRIPT: &str = r#"[
  {"type": "command", "command": "cycle_color"},
  {"type": "command", "command": {"select_tool": "rectangle"}},
  {"type": "command", "command": "toggle_fill"},
  {"type": "pointer_down", "x": 2, "y": 2},
  {"type": "pointer_move", "x": 6, "y": 5},
  {"type": "pointer_up", "x": 9, "y": 8},
  {"type": "pointer_down", "x": 3, "y": 11},
  {"type": "pointer_up", "x": 3, "y": 11}
]"#;

#[test]
fn test_script_replays_to_png() {
    let dir = scratch_dir("ok");
    let script = dir.join("rect.json");
    std::fs::write(&script, SCRIPT).unwrap();
    let out = dir.join("out").join("rect.png");

    let n = run_one(&script, &out, &settings(), Some(5)).unwrap();
    assert_eq!(n, 8);

    let img = image::open(&out).unwrap().to_rgb8();
    assert_eq!(img.dimensions(), (16, 12));
    // red outline, white fill, untouched background
    assert_eq!(img.get_pixel(2, 2).0, [255, 0, 0]);
    assert_eq!(img.get_pixel(5, 5).0, [255, 255, 255]);
    assert_eq!(img.get_pixel(12, 10).0, [255, 255, 255]);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_malformed_script_is_a_parse_error() {
    let dir = scratch_dir("bad");
    let script = dir.join("bad.json");
    std::fs::write(&script, r#"[{"type": "teleport"}]"#).unwrap();

    assert!(matches!(load_script(&script), Err(ReplayError::Parse { .. })));
    let out = dir.join("bad.png");
    assert!(run_one(&script, &out, &settings(), None).is_err());
    assert!(!out.exists());

    let _ = std::fs::remove_dir_all(&dir);
}
