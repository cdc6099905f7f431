use crate::chart::render::{ChartBackend, ChartHandle};
use crate::chart::request::ChartRequest;
use crate::error::RenderError;

// ---------------------------------------------------------------------------
// PlotBoard – named drawing surfaces
// ---------------------------------------------------------------------------

/// What a surface currently shows.
#[derive(Debug, Clone, Default)]
pub enum SurfaceContent {
    #[default]
    Waiting,
    Chart {
        handle: ChartHandle,
        request: ChartRequest,
    },
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct Surface {
    pub name: String,
    pub content: SurfaceContent,
}

/// The set of chart surfaces in layout order. Requests land here and the
/// plot panel draws them with egui_plot on the next frame.
#[derive(Debug, Default)]
pub struct PlotBoard {
    surfaces: Vec<Surface>,
    next_handle: u64,
}

impl PlotBoard {
    pub fn with_surfaces<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PlotBoard {
            surfaces: names
                .into_iter()
                .map(|name| Surface {
                    name: name.into(),
                    content: SurfaceContent::Waiting,
                })
                .collect(),
            next_handle: 0,
        }
    }

    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }

    #[cfg(test)]
    pub fn surface(&self, name: &str) -> Option<&Surface> {
        self.surfaces.iter().find(|s| s.name == name)
    }

    /// Show an error in place of the chart. Unknown names are ignored.
    pub fn mark_failed(&mut self, name: &str, message: impl Into<String>) {
        if let Some(surface) = self.surfaces.iter_mut().find(|s| s.name == name) {
            surface.content = SurfaceContent::Failed(message.into());
        }
    }
}

impl ChartBackend for PlotBoard {
    fn draw(&mut self, target: &str, request: ChartRequest) -> Result<ChartHandle, RenderError> {
        let surface = self
            .surfaces
            .iter_mut()
            .find(|s| s.name == target)
            .ok_or_else(|| RenderError::TargetNotFound(target.to_string()))?;

        self.next_handle += 1;
        let handle = ChartHandle(self.next_handle);
        surface.content = SurfaceContent::Chart { handle, request };
        log::debug!("Surface `{target}` now shows chart #{}", handle.0);
        Ok(handle)
    }
}
