mod app;
mod chart;
mod color;
mod config;
mod data;
mod error;
mod state;
mod ui;

use std::path::PathBuf;

use app::CsvTimelineApp;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    // Optional dashboard file to open on start.
    let dashboard: Option<PathBuf> = std::env::args_os().nth(1).map(PathBuf::from);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "CSV Timeline",
        options,
        Box::new(move |cc| {
            let mut app = CsvTimelineApp::new(cc);
            if let Some(path) = &dashboard {
                if let Err(e) = app.state.open_dashboard(path) {
                    log::error!("Failed to open dashboard: {e:#}");
                    app.state.status_message = Some(format!("Error: {e:#}"));
                }
            }
            Ok(Box::new(app))
        }),
    )
}
