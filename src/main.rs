// GUI-subsystem binary on Windows; headless replay (--replay/-r) still
// prints to the launching terminal when run from one.
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use std::process::ExitCode;

use clap::Parser;
use eframe::egui;

use freakdraw::app::FreakDrawApp;
use freakdraw::cli::{self, CliArgs};
use freakdraw::logger;
use freakdraw::session::Session;
use freakdraw::settings::EngineSettings;

fn main() -> ExitCode {
    let file_settings = EngineSettings::load();

    // -- CLI mode: replay scripts without opening a window ---------------
    if CliArgs::is_cli_mode() {
        let args = CliArgs::parse();
        let settings = args.settings(file_settings);
        logger::init(settings.log_level);
        return cli::run(args, settings);
    }

    logger::init(file_settings.log_level);

    // First GUI launch: write the defaults out so they can be edited.
    if EngineSettings::settings_path().is_some_and(|p| !p.exists()) {
        file_settings.save();
    }

    log::info!("Starting GUI ({}x{})", file_settings.canvas_width, file_settings.canvas_height);

    let (w, h) = (file_settings.canvas_width as f32, file_settings.canvas_height as f32);
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("FreakDraw 2")
            // Room for the tools panel on the right.
            .with_inner_size([w + 220.0, h])
            .with_min_inner_size([320.0, 240.0]),
        ..Default::default()
    };

    let result = eframe::run_native(
        "FreakDraw",
        options,
        Box::new(move |cc| Box::new(FreakDrawApp::new(cc, Session::with_system_font(file_settings)))),
    );
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("GUI exited with error: {}", e);
            ExitCode::FAILURE
        }
    }
}
