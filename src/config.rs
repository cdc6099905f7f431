use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::chart::axis::TimeUnit;
use crate::chart::config::{ChartConfig, Extractor};

pub const DEFAULT_BASE_URL: &str = "https://raw.githubusercontent.com/lumyuto/lumyuto.github.io/master";

// ---------------------------------------------------------------------------
// Dashboard file
// ---------------------------------------------------------------------------

/// Expected JSON layout:
///
/// ```json
/// {
///   "base_url": "https://example.org/data",
///   "charts": [
///     { "el": "gdp", "source": "/gdp.csv", "x": "year",
///       "labels": ["us", "eu"], "title": "GDP", "unit": "year",
///       "options": { "legend": { "display": false } } }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Seconds before a remote fetch gives up.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub charts: Vec<ChartEntry>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            charts: Vec::new(),
        }
    }
}

/// One chart panel and the source it draws from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartEntry {
    pub el: String,
    /// Path appended to the base URL.
    pub source: String,
    /// Column holding the time labels.
    pub x: String,
    /// Columns drawn as labelled series.
    #[serde(default)]
    pub labels: Vec<String>,
    /// Column drawn as a single unlabelled series.
    #[serde(default)]
    pub y: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub unit: TimeUnit,
    #[serde(default)]
    pub options: Map<String, Value>,
}

impl DashboardConfig {
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading dashboard {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("in dashboard {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: DashboardConfig = serde_json::from_str(text).context("parsing dashboard JSON")?;
        config.validate()?;
        Ok(config)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = std::collections::BTreeSet::new();
        for (i, chart) in self.charts.iter().enumerate() {
            if chart.el.is_empty() {
                bail!("chart {i} has an empty `el`");
            }
            if !seen.insert(chart.el.as_str()) {
                bail!("chart surface `{}` is declared twice", chart.el);
            }
            if chart.labels.is_empty() && chart.y.is_none() {
                bail!("chart `{}` needs `labels` or `y`", chart.el);
            }
        }
        Ok(())
    }
}

impl ChartEntry {
    /// Renderer configuration for this entry.
    pub fn chart_config(&self) -> ChartConfig {
        let mut config = ChartConfig::new(&self.el, Extractor::column(&self.x))
            .with_labels(&self.labels)
            .with_unit(self.unit)
            .with_options(self.options.clone());
        if let Some(y) = &self.y {
            config = config.with_y(Extractor::column(y));
        }
        if let Some(title) = &self.title {
            config = config.with_title(title);
        }
        config
    }
}
