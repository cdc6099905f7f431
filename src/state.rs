use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context as _, Result};
use eframe::egui;

use crate::chart::render::TimeSeriesRenderer;
use crate::config::DashboardConfig;
use crate::data::loader::{fetcher_for, Fetcher, SourceRegistry};
use crate::ui::board::PlotBoard;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub dashboard: DashboardConfig,

    /// File the dashboard came from, if any.
    pub dashboard_path: Option<PathBuf>,

    /// One loader per source path of the current dashboard.
    pub registry: Option<SourceRegistry>,

    /// Chart surfaces, written by loader callbacks on worker threads.
    pub board: Arc<Mutex<PlotBoard>>,

    /// Source shown in the preview table.
    pub preview_source: Option<String>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Bumped on every board reset; callbacks from older rounds stay silent.
    generation: Arc<AtomicU64>,

    ctx: egui::Context,
}

impl AppState {
    pub fn new(ctx: egui::Context) -> Self {
        Self {
            dashboard: DashboardConfig::default(),
            dashboard_path: None,
            registry: None,
            board: Arc::new(Mutex::new(PlotBoard::default())),
            preview_source: None,
            status_message: None,
            generation: Arc::new(AtomicU64::new(0)),
            ctx,
        }
    }

    /// Read a dashboard file and start loading its sources.
    pub fn open_dashboard(&mut self, path: &Path) -> Result<()> {
        let dashboard = DashboardConfig::from_path(path)?;
        self.dashboard_path = Some(path.to_path_buf());
        self.set_dashboard(dashboard)
    }

    /// Replace the dashboard, dropping every cached dataset.
    pub fn set_dashboard(&mut self, dashboard: DashboardConfig) -> Result<()> {
        let fetcher = fetcher_for(&dashboard.base_url, dashboard.timeout())
            .context("preparing data source fetcher")?;
        self.install_dashboard(dashboard, fetcher);
        Ok(())
    }

    fn install_dashboard(&mut self, dashboard: DashboardConfig, fetcher: Arc<dyn Fetcher>) {
        log::info!(
            "Dashboard with {} charts from {}",
            dashboard.charts.len(),
            dashboard.base_url
        );

        self.registry = Some(SourceRegistry::new(dashboard.base_url.clone(), fetcher));
        self.preview_source = dashboard.charts.first().map(|c| c.source.clone());
        self.dashboard = dashboard;
        self.status_message = None;
        self.start();
    }

    /// Fetch every source again and redraw.
    pub fn reload(&mut self) {
        if let Some(registry) = &mut self.registry {
            registry.clear();
        }
        self.start();
    }

    /// Reset the board and subscribe one renderer per chart entry.
    fn start(&mut self) {
        let Some(registry) = &mut self.registry else {
            return;
        };

        let round = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *lock_board(&self.board) =
            PlotBoard::with_surfaces(self.dashboard.charts.iter().map(|c| c.el.clone()));

        for entry in &self.dashboard.charts {
            let loader = registry.get_or_load(&entry.source);
            let renderer = TimeSeriesRenderer::configure(entry.chart_config());
            let board = self.board.clone();
            let generation = self.generation.clone();
            let ctx = self.ctx.clone();
            let el = entry.el.clone();

            loader.subscribe(move |delivery| {
                let mut board = lock_board(&board);
                if generation.load(Ordering::SeqCst) != round {
                    log::debug!("Dropping stale result for `{el}`");
                    return;
                }
                match delivery {
                    Ok(dataset) => {
                        if let Err(e) = renderer.render(&dataset, &mut *board) {
                            log::error!("Failed to draw `{el}`: {e}");
                            board.mark_failed(&el, e.to_string());
                        }
                    }
                    Err(e) => board.mark_failed(&el, e.to_string()),
                }
                drop(board);
                ctx.request_repaint();
            });
        }
    }
}

/// Callbacks never panic while holding the board, but recover regardless.
pub fn lock_board(board: &Mutex<PlotBoard>) -> MutexGuard<'_, PlotBoard> {
    board.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
