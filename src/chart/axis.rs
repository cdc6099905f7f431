use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::data::model::CellValue;

/// Display granularity of the time axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Day,
    Week,
    Month,
    Quarter,
    #[default]
    Year,
}

impl TimeUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeUnit::Day => "day",
            TimeUnit::Week => "week",
            TimeUnit::Month => "month",
            TimeUnit::Quarter => "quarter",
            TimeUnit::Year => "year",
        }
    }
}

// ---------------------------------------------------------------------------
// Label → x coordinate (fractional years)
// ---------------------------------------------------------------------------

/// Position of a label on the time axis, in fractional years.
///
/// Numbers are taken as-is (a `year` column is the common case); strings
/// are read as `YYYY`, `YYYY-MM` or `YYYY-MM-DD`, optionally followed by a
/// time part. Anything else has no position.
pub fn time_coordinate(label: &CellValue) -> Option<f64> {
    match label {
        CellValue::Number(v) => Some(*v),
        CellValue::String(s) => parse_date_label(s).map(fractional_year),
        _ => None,
    }
}

fn parse_date_label(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let date_part = match s.find(['T', ' ']) {
        Some(i) => &s[..i],
        None => s,
    };
    match date_part.len() {
        4 => date_part
            .parse::<i32>()
            .ok()
            .and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1)),
        7 => NaiveDate::parse_from_str(&format!("{date_part}-01"), "%Y-%m-%d").ok(),
        10 => NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok(),
        _ => None,
    }
}

fn days_in_year(year: i32) -> u32 {
    if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
        366
    } else {
        365
    }
}

fn fractional_year(date: NaiveDate) -> f64 {
    date.year() as f64 + date.ordinal0() as f64 / days_in_year(date.year()) as f64
}

fn date_at(x: f64) -> Option<NaiveDate> {
    let year = x.floor();
    if !year.is_finite() || year.abs() > 200_000.0 {
        return None;
    }
    let year = year as i32;
    let days = days_in_year(year);
    let ordinal0 = (((x - year as f64) * days as f64).round() as u32).min(days - 1);
    NaiveDate::from_yo_opt(year, ordinal0 + 1)
}

// ---------------------------------------------------------------------------
// Tick labels
// ---------------------------------------------------------------------------

/// Format an axis position at the given unit.
pub fn format_tick(x: f64, unit: TimeUnit) -> String {
    let Some(date) = date_at(x) else {
        return String::new();
    };
    match unit {
        TimeUnit::Year => {
            // Ticks close to a year boundary belong to the following year.
            let rounded = x.round();
            if (x - rounded).abs() < 1e-6 {
                format!("{rounded:.0}")
            } else {
                date.year().to_string()
            }
        }
        TimeUnit::Quarter => format!("Q{} {}", date.month0() / 3 + 1, date.year()),
        TimeUnit::Month => date.format("%b %Y").to_string(),
        TimeUnit::Week | TimeUnit::Day => date.format("%Y-%m-%d").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_labels_are_used_directly() {
        assert_eq!(time_coordinate(&CellValue::Number(2020.0)), Some(2020.0));
        assert_eq!(time_coordinate(&CellValue::Null), None);
        assert_eq!(time_coordinate(&CellValue::Bool(true)), None);
    }

    #[test]
    fn date_strings_map_to_fractional_years() {
        let year = time_coordinate(&CellValue::String("2021".into())).unwrap();
        assert_eq!(year, 2021.0);

        let july = time_coordinate(&CellValue::String("2021-07".into())).unwrap();
        assert!((july - (2021.0 + 181.0 / 365.0)).abs() < 1e-9);

        let stamped = time_coordinate(&CellValue::String("2020-12-31T10:00:00".into())).unwrap();
        assert!((stamped - (2020.0 + 365.0 / 366.0)).abs() < 1e-9);

        assert_eq!(time_coordinate(&CellValue::String("soon".into())), None);
        assert_eq!(time_coordinate(&CellValue::String("2021-13-01".into())), None);
    }

    #[test]
    fn ticks_follow_the_unit() {
        assert_eq!(format_tick(2020.0, TimeUnit::Year), "2020");
        assert_eq!(format_tick(2020.5, TimeUnit::Year), "2020");
        assert_eq!(format_tick(2021.0 + 181.0 / 365.0, TimeUnit::Month), "Jul 2021");
        assert_eq!(format_tick(2021.0 + 181.0 / 365.0, TimeUnit::Quarter), "Q3 2021");
        assert_eq!(format_tick(2021.0, TimeUnit::Day), "2021-01-01");
    }

    #[test]
    fn units_use_lowercase_names() {
        assert_eq!(serde_json::to_string(&TimeUnit::Quarter).unwrap(), "\"quarter\"");
        assert_eq!(
            serde_json::from_str::<TimeUnit>("\"month\"").unwrap(),
            TimeUnit::Month
        );
        assert_eq!(TimeUnit::default().as_str(), "year");
    }
}
