use crate::color::{generate_palette, to_hex};
use crate::data::model::Dataset;
use crate::error::RenderError;

use super::config::ChartConfig;
use super::request::{default_options, merge_options, ChartData, ChartRequest, SeriesData};

/// Handle returned by a backend for a drawn chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChartHandle(pub u64);

/// The charting library a request is handed to.
pub trait ChartBackend {
    /// Draw `request` on the surface named `target`, replacing what was there.
    fn draw(&mut self, target: &str, request: ChartRequest) -> Result<ChartHandle, RenderError>;
}

/// Turns datasets into line charts for one configuration.
#[derive(Debug, Clone)]
pub struct TimeSeriesRenderer {
    config: ChartConfig,
}

impl TimeSeriesRenderer {
    pub fn configure(config: ChartConfig) -> Self {
        TimeSeriesRenderer { config }
    }

    /// Build the chart request for `dataset` without drawing anything.
    pub fn build(&self, dataset: &Dataset) -> ChartRequest {
        let config = &self.config;
        let palette = generate_palette(config.series.len());

        let datasets = config
            .series
            .iter()
            .zip(palette)
            .map(|(spec, rgb)| {
                SeriesData::line(spec.label.clone(), spec.extract.extract(dataset), to_hex(rgb))
            })
            .collect();

        let options = merge_options(
            default_options(config.title.as_deref(), config.unit),
            &config.options,
        );

        ChartRequest {
            kind: "line",
            data: ChartData {
                labels: config.x.extract(dataset),
                datasets,
            },
            options,
            unit: config.unit,
        }
    }

    /// Build and draw on the configured surface.
    pub fn render(
        &self,
        dataset: &Dataset,
        backend: &mut dyn ChartBackend,
    ) -> Result<ChartHandle, RenderError> {
        let request = self.build(dataset);
        log::debug!(
            "Drawing {} series over {} `{}` labels on `{}`",
            request.data.datasets.len(),
            request.data.labels.len(),
            self.config.x.name(),
            self.config.el
        );
        backend.draw(&self.config.el, request)
    }
}
