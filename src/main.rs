mod app;
mod color;
mod state;
mod ui;

use std::path::PathBuf;

use app::HoboViewerApp;
use clap::Parser;
use eframe::egui;
use state::AppState;

/// Desktop viewer for Hobo data logger CSV exports
#[derive(Parser, Debug)]
#[command(name = "hobo-viewer")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Load files with every `Temp, °F` column mirrored into `Temp, °C`
    #[arg(long)]
    celsius: bool,

    /// Hobo CSV files to open at start-up
    files: Vec<PathBuf>,
}

fn main() -> eframe::Result {
    env_logger::init();
    let cli = Cli::parse();

    let mut state = AppState::default();
    state.options.convert_to_celsius = cli.celsius;
    if !cli.files.is_empty() {
        state.open_files(&cli.files);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Hobo Viewer",
        options,
        Box::new(|_cc| Ok(Box::new(HoboViewerApp::new(state)))),
    )
}
