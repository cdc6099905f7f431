use crate::error::LoadError;

use super::model::{CellValue, Dataset, Row};

// ---------------------------------------------------------------------------
// CSV → Dataset
// ---------------------------------------------------------------------------

/// Parse CSV text with a header row into a [`Dataset`].
///
/// Every cell goes through [`infer_cell`]. Blank lines are skipped; a record
/// with a different field count than the header is rejected. Repeated header
/// names get a `_1`, `_2`… suffix so no column is lost.
pub fn parse_csv(source_name: &str, bytes: &[u8]) -> Result<Dataset, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes);

    let parse_failed = |line: u64, reason: String| LoadError::ParseFailed {
        source_name: source_name.to_string(),
        line,
        reason,
    };

    let columns = unique_headers(
        reader
            .headers()
            .map_err(|e| parse_failed(error_line(&e), e.to_string()))?,
    );

    if columns.is_empty() || columns.iter().all(|c| c.is_empty()) {
        return Err(parse_failed(1, "missing header row".to_string()));
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| parse_failed(error_line(&e), e.to_string()))?;

        let row: Row = columns
            .iter()
            .zip(record.iter())
            .map(|(col, raw)| (col.clone(), infer_cell(raw)))
            .collect();
        rows.push(row);
    }

    Ok(Dataset::new(columns, rows))
}

/// Later repeats are renamed around every name the header already uses.
fn unique_headers(headers: &csv::StringRecord) -> Vec<String> {
    let original: Vec<&str> = headers.iter().collect();
    let mut columns: Vec<String> = Vec::with_capacity(original.len());
    for (i, header) in original.iter().enumerate() {
        if !original[..i].contains(header) {
            columns.push(header.to_string());
            continue;
        }
        let mut suffix = 1;
        let mut name = format!("{header}_{suffix}");
        while original.contains(&name.as_str()) || columns.contains(&name) {
            suffix += 1;
            name = format!("{header}_{suffix}");
        }
        columns.push(name);
    }
    columns
}

fn error_line(err: &csv::Error) -> u64 {
    err.position().map(|p| p.line()).unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Dynamic typing
// ---------------------------------------------------------------------------

/// Exclusive bound for numbers converted from text (2^53).
const FLOAT_BOUND: f64 = 9_007_199_254_740_992.0;

/// Decide the type of one raw cell.
///
/// * `true`/`TRUE`, `false`/`FALSE` → `Bool`
/// * decimal or scientific literal strictly inside ±2^53 → `Number`
/// * empty → `Null`
/// * anything else → `String`, verbatim
pub fn infer_cell(raw: &str) -> CellValue {
    match raw {
        "true" | "TRUE" => return CellValue::Bool(true),
        "false" | "FALSE" => return CellValue::Bool(false),
        "" => return CellValue::Null,
        _ => {}
    }

    if is_float_literal(raw) {
        if let Ok(v) = raw.trim().parse::<f64>() {
            if v > -FLOAT_BOUND && v < FLOAT_BOUND {
                return CellValue::Number(v);
            }
        }
    }
    CellValue::String(raw.to_string())
}

/// `-?(\d+\.?|\.\d+|\d+\.\d+)([eE][-+]?\d+)?` with optional surrounding whitespace.
fn is_float_literal(raw: &str) -> bool {
    let s = raw.trim();
    let s = s.strip_prefix('-').unwrap_or(s);

    let (mantissa, exponent) = match s.find(['e', 'E']) {
        Some(i) => (&s[..i], Some(&s[i + 1..])),
        None => (s, None),
    };

    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((i, f)) => (i, f),
        None => (mantissa, ""),
    };
    let all_digits = |t: &str| t.bytes().all(|b| b.is_ascii_digit());
    if int_part.is_empty() && frac_part.is_empty() {
        return false;
    }
    if !all_digits(int_part) || !all_digits(frac_part) {
        return false;
    }

    match exponent {
        None => true,
        Some(exp) => {
            let digits = exp.strip_prefix(['+', '-']).unwrap_or(exp);
            !digits.is_empty() && all_digits(digits)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn infers_scalars_like_the_browser_parser() {
        assert_eq!(infer_cell("2020"), CellValue::Number(2020.0));
        assert_eq!(infer_cell("-1.5"), CellValue::Number(-1.5));
        assert_eq!(infer_cell(".5"), CellValue::Number(0.5));
        assert_eq!(infer_cell("3."), CellValue::Number(3.0));
        assert_eq!(infer_cell("1e3"), CellValue::Number(1000.0));
        assert_eq!(infer_cell(" 42 "), CellValue::Number(42.0));
        assert_eq!(infer_cell("TRUE"), CellValue::Bool(true));
        assert_eq!(infer_cell("false"), CellValue::Bool(false));
        assert_eq!(infer_cell(""), CellValue::Null);
    }

    #[test]
    fn keeps_non_literals_as_strings() {
        for raw in ["True", "+1", "1.2.3", ".", "-", "1e", "NaN", "inf", "0x10", "2020-01-01"] {
            assert_eq!(infer_cell(raw), CellValue::String(raw.to_string()), "{raw}");
        }
    }

    #[test]
    fn out_of_safe_range_numbers_stay_strings() {
        assert_eq!(
            infer_cell("9007199254740993"),
            CellValue::String("9007199254740993".into())
        );
        assert_eq!(
            infer_cell("9007199254740991"),
            CellValue::Number(9_007_199_254_740_991.0)
        );
    }

    #[test]
    fn parses_rows_in_file_order() {
        let csv = b"year,val,note\n2020,1,a\n\n2021,2,\n";
        let ds = parse_csv("test.csv", csv).unwrap();

        assert_eq!(ds.columns, vec!["year", "val", "note"]);
        assert_eq!(ds.len(), 2);
        assert_eq!(
            ds.column("year"),
            vec![CellValue::Number(2020.0), CellValue::Number(2021.0)]
        );
        assert_eq!(
            ds.column("note"),
            vec![CellValue::String("a".into()), CellValue::Null]
        );
    }

    #[test]
    fn repeated_headers_keep_every_column() {
        let ds = parse_csv("dup.csv", b"a,a,b,a_1\n1,2,3,4\n").unwrap();
        assert_eq!(ds.columns, vec!["a", "a_2", "b", "a_1"]);
        assert_eq!(ds.column("a"), vec![CellValue::Number(1.0)]);
        assert_eq!(ds.column("a_2"), vec![CellValue::Number(2.0)]);
        assert_eq!(ds.column("a_1"), vec![CellValue::Number(4.0)]);
        assert_eq!(ds.rows[0].len(), 4);
    }

    #[test]
    fn ragged_record_is_a_parse_failure() {
        let err = parse_csv("bad.csv", b"a,b\n1,2\n3\n").unwrap_err();
        match err {
            LoadError::ParseFailed { source_name, line, .. } => {
                assert_eq!(source_name, "bad.csv");
                assert_eq!(line, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_input_has_no_header() {
        assert!(matches!(
            parse_csv("empty.csv", b""),
            Err(LoadError::ParseFailed { .. })
        ));
    }

    proptest! {
        #[test]
        fn small_integers_become_numbers(n in -1_000_000_000i64..1_000_000_000i64) {
            prop_assert_eq!(infer_cell(&n.to_string()), CellValue::Number(n as f64));
        }

        #[test]
        fn alphabetic_text_stays_text(s in "[a-zA-Z][a-zA-Z ]{0,12}") {
            prop_assume!(!matches!(s.as_str(), "true" | "TRUE" | "false" | "FALSE"));
            prop_assert_eq!(infer_cell(&s), CellValue::String(s.clone()));
        }
    }
}
