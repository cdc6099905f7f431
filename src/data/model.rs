use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};

// ---------------------------------------------------------------------------
// CellValue – a single cell of a CSV row
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value, decided per cell at parse time.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    String(String),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(v) => write!(f, "{v}"),
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

/// Cells serialize as bare JSON scalars; integral numbers stay integers so
/// `2020` does not come out as `2020.0`.
impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Number(v) if v.fract() == 0.0 && v.abs() <= MAX_SAFE_INTEGER => {
                serializer.serialize_i64(*v as i64)
            }
            CellValue::Number(v) => serializer.serialize_f64(*v),
            CellValue::String(s) => serializer.serialize_str(s),
            CellValue::Bool(b) => serializer.serialize_bool(*b),
            CellValue::Null => serializer.serialize_unit(),
        }
    }
}

/// Largest integer an `f64` holds exactly (2^53 - 1).
pub const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

impl CellValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(v) => Some(*v),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Row – one line of the source file
// ---------------------------------------------------------------------------

/// Column name → value for one record.
pub type Row = BTreeMap<String, CellValue>;

// ---------------------------------------------------------------------------
// Dataset – the complete parsed file
// ---------------------------------------------------------------------------

/// The full parsed content of one CSV resource. Rows keep file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    /// Header names in file order.
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl Dataset {
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Dataset { columns, rows }
    }

    /// All values of one column in row order. Rows lacking the column yield `Null`.
    pub fn column(&self, name: &str) -> Vec<CellValue> {
        self.rows
            .iter()
            .map(|row| row.get(name).cloned().unwrap_or(CellValue::Null))
            .collect()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(pairs: &[(&str, CellValue)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn column_keeps_row_order_and_fills_gaps_with_null() {
        let ds = Dataset::new(
            vec!["year".into(), "val".into()],
            vec![
                row(&[("year", CellValue::Number(2020.0)), ("val", CellValue::Number(1.0))]),
                row(&[("year", CellValue::Number(2021.0))]),
            ],
        );
        assert_eq!(
            ds.column("year"),
            vec![CellValue::Number(2020.0), CellValue::Number(2021.0)]
        );
        assert_eq!(ds.column("val"), vec![CellValue::Number(1.0), CellValue::Null]);
        assert_eq!(ds.column("missing"), vec![CellValue::Null, CellValue::Null]);
    }

    #[test]
    fn integral_numbers_serialize_as_integers() {
        let cells = vec![
            CellValue::Number(2020.0),
            CellValue::Number(1.5),
            CellValue::String("a".into()),
            CellValue::Bool(true),
            CellValue::Null,
        ];
        assert_eq!(
            serde_json::to_value(&cells).unwrap(),
            json!([2020, 1.5, "a", true, null])
        );
    }

    #[test]
    fn negative_zero_is_the_same_cell_as_zero() {
        let zero = CellValue::Number(0.0);
        let negative = CellValue::Number(-0.0);
        assert_eq!(zero, negative);
        assert_eq!(
            serde_json::to_value(&negative).unwrap(),
            serde_json::to_value(&zero).unwrap()
        );
        assert!(CellValue::Number(f64::NAN) != CellValue::Number(f64::NAN));
    }
}
