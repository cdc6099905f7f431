use eframe::egui::{Color32, RichText, Ui};
use egui_plot::{Legend, Line, Plot, PlotPoints};

use crate::chart::axis::{format_tick, time_coordinate};
use crate::chart::request::{ChartRequest, SeriesData};
use crate::color::parse_hex;
use crate::state::{lock_board, AppState};
use crate::ui::board::SurfaceContent;

// ---------------------------------------------------------------------------
// Chart surfaces (central panel)
// ---------------------------------------------------------------------------

/// Render every surface of the board, one below the other.
pub fn chart_surfaces(ui: &mut Ui, state: &AppState) {
    let surfaces = lock_board(&state.board).surfaces().to_vec();

    if surfaces.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a dashboard to view charts  (File → Open dashboard…)");
        });
        return;
    }

    let height = (ui.available_height() / surfaces.len() as f32).max(220.0) - 32.0;

    for surface in &surfaces {
        match &surface.content {
            SurfaceContent::Waiting => {
                ui.strong(surface.name.as_str());
                ui.horizontal(|ui: &mut Ui| {
                    ui.spinner();
                    ui.label("Loading…");
                });
            }
            SurfaceContent::Failed(message) => {
                ui.strong(surface.name.as_str());
                ui.label(RichText::new(message).color(Color32::RED));
            }
            SurfaceContent::Chart { request, .. } => {
                let heading = request.title().unwrap_or(surface.name.as_str());
                ui.strong(heading);
                time_series_plot(ui, &surface.name, request, height);
            }
        }
        ui.separator();
    }
}

/// Draw one chart request as egui_plot lines.
fn time_series_plot(ui: &mut Ui, id: &str, request: &ChartRequest, height: f32) {
    let unit = request.time_unit();
    let xs: Vec<Option<f64>> = request.data.labels.iter().map(time_coordinate).collect();
    let show_legend = request.data.datasets.iter().any(|s| s.label.is_some());

    let mut plot = Plot::new(format!("surface_{id}"))
        .height(height)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(false)
        .allow_zoom(true)
        .x_axis_formatter(move |mark, _range| format_tick(mark.value, unit));
    if show_legend {
        plot = plot.legend(Legend::default());
    }

    plot.show(ui, |plot_ui| {
        for series in &request.data.datasets {
            for segment in segments(&xs, series) {
                let mut line = Line::new(PlotPoints::from(segment))
                    .width(series.border_width as f32)
                    .color(parse_hex(&series.border_color).unwrap_or(Color32::LIGHT_BLUE));
                if let Some(label) = &series.label {
                    line = line.name(label);
                }
                plot_ui.line(line);
            }
        }
    });
}

/// Split a series into runs of drawable points; a missing x or y breaks the line.
fn segments(xs: &[Option<f64>], series: &SeriesData) -> Vec<Vec<[f64; 2]>> {
    let mut out = Vec::new();
    let mut current = Vec::new();
    for (x, y) in xs.iter().zip(series.data.iter()) {
        match (x, y.as_f64()) {
            (Some(x), Some(y)) => current.push([*x, y]),
            _ => {
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;

    #[test]
    fn gaps_split_lines() {
        let xs = vec![Some(2019.0), Some(2020.0), None, Some(2022.0), Some(2023.0)];
        let series = SeriesData::line(
            None,
            vec![
                CellValue::Number(1.0),
                CellValue::Number(2.0),
                CellValue::Number(3.0),
                CellValue::Null,
                CellValue::Number(5.0),
            ],
            "#000000".into(),
        );
        assert_eq!(
            segments(&xs, &series),
            vec![vec![[2019.0, 1.0], [2020.0, 2.0]], vec![[2023.0, 5.0]]]
        );
    }
}
