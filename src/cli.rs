// ============================================================================
// FreakDraw CLI: headless replay of recorded input scripts
// ============================================================================
//
// Usage examples:
//   FreakDraw --replay strokes.json --output strokes.png
//   FreakDraw -r "sessions/*.json" --output-dir renders/
//   FreakDraw -r demo.json --width 320 --height 240 --strip 0 --seed 7
//
// Each script is a JSON array of input events replayed on a fresh canvas.
// The flattened result is written as PNG. No window is opened.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use crate::components::tools::ToolEngine;
use crate::error::ReplayError;
use crate::input::InputEvent;
use crate::io::{flatten_rgb, write_png};
use crate::ops::brush::SprayRng;
use crate::session::Session;
use crate::settings::EngineSettings;

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// FreakDraw headless replayer.
#[derive(Parser, Debug)]
#[command(
    name = "FreakDraw",
    about = "Replay recorded FreakDraw input scripts and save the result",
    long_about = "Replay JSON input scripts against a fresh canvas without opening\n\
                  the GUI and write the flattened drawing as PNG.\n\n\
                  Example:\n  \
                  FreakDraw --replay strokes.json --output strokes.png\n  \
                  FreakDraw -r \"sessions/*.json\" --output-dir renders/"
)]
pub struct CliArgs {
    /// Script file(s). Glob patterns accepted (e.g. "*.json").
    #[arg(short, long, required = true, num_args = 1..)]
    pub replay: Vec<String>,

    /// Output file path. Only valid for a single script.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output directory; each script is written as `<script stem>.png`.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Canvas width (overrides the settings file).
    #[arg(long)]
    pub width: Option<u32>,

    /// Canvas height (overrides the settings file).
    #[arg(long)]
    pub height: Option<u32>,

    /// Height of the reserved status strip at the bottom of the canvas.
    #[arg(long, value_name = "PX")]
    pub strip: Option<u32>,

    /// Fixed seed for the spray tool, for reproducible output.
    #[arg(long)]
    pub seed: Option<u32>,

    /// Print per-script timing information and debug logging.
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliArgs {
    /// Returns `true` when any CLI-mode flag is present in the real process arguments.
    /// Used by `main()` to route before creating an eframe window.
    pub fn is_cli_mode() -> bool {
        std::env::args().any(|a| a == "--replay" || a == "-r" || a == "--help" || a == "-h")
    }

    /// Settings file values with command-line overrides applied.
    pub fn settings(&self, mut base: EngineSettings) -> EngineSettings {
        if let Some(w) = self.width {
            base.canvas_width = w.max(1);
        }
        if let Some(h) = self.height {
            base.canvas_height = h.max(1);
        }
        if let Some(strip) = self.strip {
            base.ui_strip_height = strip;
        }
        if self.verbose {
            base.log_level = log::LevelFilter::Debug;
        }
        base
    }
}

// ============================================================================
// Public entry point
// ============================================================================

/// Run all replays and return an OS exit code.
/// `0` = all scripts succeeded, `1` = one or more failed.
pub fn run(args: CliArgs, settings: EngineSettings) -> ExitCode {
    let inputs = resolve_inputs(&args.replay);
    if inputs.is_empty() {
        eprintln!("error: no script files matched the given pattern(s).");
        return ExitCode::FAILURE;
    }

    if inputs.len() > 1 && args.output.is_some() {
        eprintln!(
            "error: {} scripts given but --output only accepts a single file path.\n\
             Use --output-dir to specify a destination directory.",
            inputs.len()
        );
        return ExitCode::FAILURE;
    }

    let total = inputs.len();
    let multi = total > 1;
    let mut any_failure = false;

    for (idx, script) in inputs.iter().enumerate() {
        if multi || args.verbose {
            println!("[{}/{}] {}", idx + 1, total, script.display());
        }
        let started = Instant::now();
        let output = build_output_path(
            script,
            args.output.as_deref(),
            args.output_dir.as_deref().unwrap_or(settings.output_dir.as_path()),
        );

        match run_one(script, &output, &settings, args.seed) {
            Ok(count) => {
                log::info!("Replayed {} events from {}", count, script.display());
                if args.verbose || multi {
                    println!(
                        "  → {} ({} events, {:.0}ms)",
                        output.display(),
                        count,
                        started.elapsed().as_secs_f64() * 1000.0
                    );
                }
            }
            Err(e) => {
                log::error!("{}", e);
                eprintln!("  error: {}", e);
                any_failure = true;
            }
        }
    }

    if args.verbose
        && let Some(path) = crate::logger::log_path()
    {
        println!("Log: {}", path.display());
    }

    if any_failure { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

// ============================================================================
// Per-script pipeline
// ============================================================================

/// Parse a replay script.
pub fn load_script(path: &Path) -> Result<Vec<InputEvent>, ReplayError> {
    let text = std::fs::read_to_string(path).map_err(|source| ReplayError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ReplayError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Replay one script on a fresh session and write the flattened result.
/// Returns the number of events replayed.
pub fn run_one(
    script: &Path,
    output: &Path,
    settings: &EngineSettings,
    seed: Option<u32>,
) -> Result<usize, ReplayError> {
    let events = load_script(script)?;

    let mut session = match seed {
        Some(seed) => Session::with_engine(settings.clone(), ToolEngine::new(SprayRng::new(seed))),
        None => Session::new(settings.clone()),
    };
    if events.iter().any(|e| matches!(e, InputEvent::Char { .. })) {
        session.load_system_font();
    }
    session.handle_all(&events);

    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|source| crate::error::SaveError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    write_png(&flatten_rgb(session.layers()), output)?;
    Ok(events.len())
}

// ============================================================================
// Helpers
// ============================================================================

/// Expand glob patterns and literal paths into a deduplicated, ordered list.
fn resolve_inputs(patterns: &[String]) -> Vec<PathBuf> {
    let mut result: Vec<PathBuf> = Vec::new();

    for pattern in patterns {
        let as_path = Path::new(pattern);

        if as_path.exists() {
            if !result.iter().any(|p| p.as_path() == as_path) {
                result.push(as_path.to_path_buf());
            }
            continue;
        }

        match glob::glob(pattern) {
            Ok(entries) => {
                let mut matched = false;
                for entry in entries.flatten() {
                    if !result.contains(&entry) {
                        result.push(entry);
                    }
                    matched = true;
                }
                if !matched {
                    eprintln!("warning: pattern '{}' matched no files.", pattern);
                }
            }
            Err(e) => {
                eprintln!("warning: invalid glob '{}': {}", pattern, e);
            }
        }
    }

    result
}

fn build_output_path(script: &Path, output: Option<&Path>, dir: &Path) -> PathBuf {
    if let Some(out) = output {
        return out.to_path_buf();
    }
    let stem = script
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "replay".to_string());
    dir.join(format!("{}.png", stem))
}
