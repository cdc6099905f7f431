use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::data::model::CellValue;

use super::axis::TimeUnit;

/// A fully resolved line chart, shaped like a Chart.js configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartRequest {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub data: ChartData,
    pub options: Map<String, Value>,
    /// Configured axis granularity; caller options may override it.
    #[serde(skip)]
    pub unit: TimeUnit,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<CellValue>,
    pub datasets: Vec<SeriesData>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub data: Vec<CellValue>,
    pub point_radius: u32,
    pub fill: bool,
    pub line_tension: f64,
    pub border_width: u32,
    pub border_color: String,
}

impl SeriesData {
    /// Straight, point-less line of width 2.
    pub fn line(label: Option<String>, data: Vec<CellValue>, border_color: String) -> Self {
        SeriesData {
            label,
            data,
            point_radius: 0,
            fill: false,
            line_tension: 0.0,
            border_width: 2,
            border_color,
        }
    }
}

impl ChartRequest {
    /// Title text after option merging, if it is displayed.
    pub fn title(&self) -> Option<&str> {
        let title = self.options.get("title")?;
        if title.get("display").and_then(Value::as_bool) != Some(true) {
            return None;
        }
        title.get("text").and_then(Value::as_str)
    }

    /// Tick granularity after option merging, so a caller-supplied `scales`
    /// decides the axis. Falls back to the configured unit.
    pub fn time_unit(&self) -> TimeUnit {
        self.options
            .get("scales")
            .and_then(|scales| scales.pointer("/xAxes/0/time/unit"))
            .and_then(|unit| serde_json::from_value(unit.clone()).ok())
            .unwrap_or(self.unit)
    }
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Options every time-series chart starts from.
pub fn default_options(title: Option<&str>, unit: TimeUnit) -> Map<String, Value> {
    let defaults = json!({
        "responsive": true,
        "title": {
            "display": title.is_some(),
            "text": title,
        },
        "tooltips": {
            "mode": "index",
            "intersect": false,
        },
        "hover": {
            "mode": "nearest",
            "intersect": true,
        },
        "point": {
            "pointStyle": "",
        },
        "scales": {
            "xAxes": [{
                "type": "time",
                "distribution": "series",
                "time": { "unit": unit.as_str() },
            }],
        },
    });
    match defaults {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Shallow merge: every top-level key of `overrides` replaces the default.
pub fn merge_options(
    mut defaults: Map<String, Value>,
    overrides: &Map<String, Value>,
) -> Map<String, Value> {
    for (key, value) in overrides {
        defaults.insert(key.clone(), value.clone());
    }
    defaults
}
