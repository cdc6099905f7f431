use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::data::model::{CellValue, Dataset};

use super::axis::TimeUnit;

// ---------------------------------------------------------------------------
// Extractor – dataset → values for one axis
// ---------------------------------------------------------------------------

/// Maps a dataset to the values of one axis or series.
#[derive(Clone)]
pub struct Extractor {
    name: String,
    f: Arc<dyn Fn(&Dataset) -> Vec<CellValue> + Send + Sync>,
}

impl Extractor {
    /// Custom extraction; `name` is only used for logs and `Debug`.
    pub fn new<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Dataset) -> Vec<CellValue> + Send + Sync + 'static,
    {
        Extractor {
            name: name.into(),
            f: Arc::new(f),
        }
    }

    /// All values of one column, in row order.
    pub fn column(name: &str) -> Self {
        let column = name.to_string();
        Extractor::new(name, move |ds: &Dataset| ds.column(&column))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn extract(&self, dataset: &Dataset) -> Vec<CellValue> {
        (self.f)(dataset)
    }
}

impl fmt::Debug for Extractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Extractor").field(&self.name).finish()
    }
}

// ---------------------------------------------------------------------------
// ChartConfig
// ---------------------------------------------------------------------------

/// One line on the chart.
#[derive(Debug, Clone)]
pub struct SeriesSpec {
    /// Legend label; `None` for the single implicit series.
    pub label: Option<String>,
    pub extract: Extractor,
}

/// Everything needed to turn a dataset into a line chart.
#[derive(Debug, Clone)]
pub struct ChartConfig {
    /// Identifier of the target surface.
    pub el: String,
    /// Values for the x axis.
    pub x: Extractor,
    pub series: Vec<SeriesSpec>,
    pub title: Option<String>,
    pub unit: TimeUnit,
    /// Extra options merged over the defaults, top-level keys win.
    pub options: Map<String, Value>,
}

impl ChartConfig {
    /// Chart on surface `el` with no series yet.
    pub fn new(el: impl Into<String>, x: Extractor) -> Self {
        ChartConfig {
            el: el.into(),
            x,
            series: Vec::new(),
            title: None,
            unit: TimeUnit::default(),
            options: Map::new(),
        }
    }

    /// One labelled series per column name.
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.series.extend(labels.into_iter().map(|label| SeriesSpec {
            label: Some(label.as_ref().to_string()),
            extract: Extractor::column(label.as_ref()),
        }));
        self
    }

    /// A single unlabelled series.
    pub fn with_y(mut self, y: Extractor) -> Self {
        self.series.push(SeriesSpec {
            label: None,
            extract: y,
        });
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_unit(mut self, unit: TimeUnit) -> Self {
        self.unit = unit;
        self
    }

    pub fn with_options(mut self, options: Map<String, Value>) -> Self {
        self.options = options;
        self
    }
}
