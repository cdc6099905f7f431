use std::sync::Arc;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::loader::LoadState;
use crate::data::model::Dataset;
use crate::state::AppState;

/// Rows shown in the preview table.
const PREVIEW_ROWS: usize = 200;

// ---------------------------------------------------------------------------
// Left side panel – sources and preview
// ---------------------------------------------------------------------------

/// Render the left panel: source status list and a preview of one dataset.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Sources");
    ui.separator();

    let Some(registry) = &state.registry else {
        ui.label("No dashboard loaded.");
        return;
    };
    ui.label(RichText::new(registry.base_url()).small().weak());

    let sources = registry.sources();
    let mut preview: Option<Arc<Dataset>> = None;

    for (path, loader) in &sources {
        let selected = state.preview_source.as_deref() == Some(path.as_str());
        ui.horizontal(|ui: &mut Ui| {
            if ui
                .selectable_label(selected, path.as_str())
                .on_hover_text(loader.url())
                .clicked()
            {
                state.preview_source = Some(path.clone());
            }
            match loader.state() {
                LoadState::Pending => {
                    ui.spinner();
                }
                LoadState::Ready { rows } => {
                    ui.label(format!("{rows} rows"));
                }
                LoadState::Failed(message) => {
                    ui.label(RichText::new("failed").color(Color32::RED))
                        .on_hover_text(message);
                }
            }
        });
        if state.preview_source.as_deref() == Some(path.as_str()) {
            preview = loader.dataset();
        }
    }

    ui.separator();
    ui.strong("Preview");
    match preview {
        Some(dataset) => preview_table(ui, &dataset),
        None => {
            ui.label("Select a loaded source.");
        }
    }
}

fn preview_table(ui: &mut Ui, dataset: &Dataset) {
    let shown = dataset.len().min(PREVIEW_ROWS);
    if shown < dataset.len() {
        ui.label(format!("first {shown} of {} rows", dataset.len()));
    }

    ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .columns(Column::auto().at_least(48.0), dataset.columns.len())
            .header(20.0, |mut header| {
                for col in &dataset.columns {
                    header.col(|ui: &mut Ui| {
                        ui.strong(col.as_str());
                    });
                }
            })
            .body(|body| {
                body.rows(18.0, shown, |mut row| {
                    let record = &dataset.rows[row.index()];
                    for col in &dataset.columns {
                        row.col(|ui: &mut Ui| {
                            match record.get(col) {
                                Some(value) => ui.label(value.to_string()),
                                None => ui.label(""),
                            };
                        });
                    }
                });
            });
    });
}

// ---------------------------------------------------------------------------
// Top bar – menu + status
// ---------------------------------------------------------------------------

pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open dashboard…").clicked() {
                open_dashboard_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.registry.is_some(), egui::Button::new("Reload sources"))
                .clicked()
            {
                log::info!("Reloading all sources");
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();

        match &state.dashboard_path {
            Some(path) => ui.label(format!(
                "{} · {} charts",
                path.display(),
                state.dashboard.charts.len()
            )),
            None => ui.label(format!("{} charts", state.dashboard.charts.len())),
        };

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_dashboard_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open dashboard")
        .add_filter("Dashboard", &["json"])
        .pick_file();

    if let Some(path) = file {
        if let Err(e) = state.open_dashboard(&path) {
            log::error!("Failed to open dashboard: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
