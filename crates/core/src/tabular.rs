//! Already-tabulated workbook input.
//!
//! Spreadsheet parsing happens upstream; this module receives each tab as an
//! ordered list of raw cell rows and turns data rows into ordered
//! field-name → value records.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ParseFailure;

/// A single raw cell as extracted from the spreadsheet.
pub type RawCell = Value;

/// One data row keyed by column name, in header order.
pub type RawRecord = IndexMap<String, Value>;

/// One tab of a submitted workbook. The first row is the header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    #[serde(default)]
    pub rows: Vec<Vec<RawCell>>,
}

/// A submitted workbook: its tabs in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    /// Check the workbook has exactly the given tabs, in order.
    pub fn expect_tabs(&self, names: &'static [&'static str]) -> Result<(), ParseFailure> {
        if self.sheets.len() != names.len() {
            return Err(ParseFailure::WrongTabCount {
                expected: names.len(),
                found: self.sheets.len(),
            });
        }
        for (position, (sheet, &expected)) in self.sheets.iter().zip(names).enumerate() {
            if sheet.name != expected {
                return Err(ParseFailure::WrongTabName {
                    position: position + 1,
                    expected,
                    found: sheet.name.clone(),
                });
            }
        }
        Ok(())
    }
}

impl Sheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<RawCell>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// Check the first row matches `expected` exactly, in order.
    ///
    /// Cells past the expected width are ignored.
    pub fn validate_header(&self, expected: &[&str]) -> Result<(), ParseFailure> {
        let invalid = || ParseFailure::InvalidHeader {
            tab: self.name.clone(),
        };
        let header = self.rows.first().ok_or_else(invalid)?;
        if header.len() < expected.len() {
            return Err(invalid());
        }
        let matches = header
            .iter()
            .zip(expected)
            .all(|(cell, name)| cell_text(cell) == *name);
        if matches {
            Ok(())
        } else {
            Err(invalid())
        }
    }
}

/// Read the first `fields.len()` cells of a row into a record.
///
/// Missing trailing cells become `null` and numbers are stringified. Text is
/// kept as is; only [`value_is_blank`] looks past whitespace.
pub fn read_record(cells: &[RawCell], fields: &[&str]) -> RawRecord {
    fields
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let value = cells.get(i).map(normalize_cell).unwrap_or(Value::Null);
            (name.to_string(), value)
        })
        .collect()
}

/// True when every value in the record is blank.
pub fn record_is_blank(record: &RawRecord) -> bool {
    record.values().all(value_is_blank)
}

pub fn value_is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Bool(b) => !b,
        Value::Number(_) => false,
        Value::Object(map) => map.is_empty(),
    }
}

/// Read a scalar column as text. Absent and null read as empty.
pub fn text(record: &RawRecord, field: &str) -> String {
    record.get(field).map(cell_text).unwrap_or_default()
}

/// Read a multi-value column.
///
/// A text cell is split on commas; arrays are taken item by item. Items are
/// trimmed and empty items are discarded.
pub fn list(record: &RawRecord, field: &str) -> Vec<String> {
    match record.get(field) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| cell_text(item).trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Some(other) => split_list(&cell_text(other)),
    }
}

pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn normalize_cell(cell: &RawCell) -> Value {
    match cell {
        Value::Null => Value::Null,
        Value::Array(_) => cell.clone(),
        other => Value::String(cell_text(other)),
    }
}

/// Stringify a cell the way it is displayed in the spreadsheet. Text is kept
/// verbatim, surrounding whitespace included.
///
/// Integral floats lose their fractional part so that a numeric siret keeps
/// exactly its digits.
pub fn cell_text(cell: &RawCell) -> String {
    match cell {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < 1e16 => format!("{f:.0}"),
                    _ => n.to_string(),
                }
            }
        }
        Value::Array(items) => items.iter().map(cell_text).collect::<Vec<_>>().join(","),
        Value::Object(_) => cell.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn record_pads_missing_cells_with_null() {
        let record = read_record(&[json!("a")], &["x", "y"]);
        assert_eq!(record["x"], json!("a"));
        assert_eq!(record["y"], Value::Null);
        assert_eq!(record.keys().collect::<Vec<_>>(), ["x", "y"]);
    }

    #[test]
    fn numeric_siret_keeps_its_digits() {
        assert_eq!(cell_text(&json!(12345678901234_i64)), "12345678901234");
        assert_eq!(cell_text(&json!(12345678901234.0)), "12345678901234");
        assert_eq!(cell_text(&json!(1.5)), "1.5");
    }

    #[test]
    fn list_splits_and_trims() {
        let record = read_record(&[json!(" PRODUCER , COLLECTOR,,")], &["companyTypes"]);
        assert_eq!(list(&record, "companyTypes"), ["PRODUCER", "COLLECTOR"]);
    }

    #[test]
    fn list_accepts_arrays() {
        let record = read_record(&[json!(["PRODUCER", ""])], &["companyTypes"]);
        assert_eq!(list(&record, "companyTypes"), ["PRODUCER"]);
    }

    #[test]
    fn blank_record_detection() {
        let blank = read_record(&[json!(""), Value::Null, json!("   ")], &["a", "b", "c"]);
        assert!(record_is_blank(&blank));
        let filled = read_record(&[json!(""), json!(0)], &["a", "b"]);
        assert!(!record_is_blank(&filled));
    }

    #[test]
    fn header_must_match_in_order() {
        let sheet = Sheet::new("roles", vec![vec![json!("siret"), json!("email"), json!("role")]]);
        assert!(sheet.validate_header(&["siret", "email", "role"]).is_ok());
        assert_matches!(
            sheet.validate_header(&["siret", "role", "email"]),
            Err(ParseFailure::InvalidHeader { .. })
        );
    }

    #[test]
    fn text_is_not_trimmed() {
        let record = read_record(&[json!(" 1234567890123"), json!("ADMIN ")], &["siret", "role"]);
        assert_eq!(text(&record, "siret"), " 1234567890123");
        assert_eq!(text(&record, "role"), "ADMIN ");
    }

    #[test]
    fn header_cells_must_match_exactly() {
        let sheet = Sheet::new("roles", vec![vec![json!(" siret"), json!("email"), json!("role")]]);
        assert_matches!(
            sheet.validate_header(&["siret", "email", "role"]),
            Err(ParseFailure::InvalidHeader { .. })
        );
    }

    #[test]
    fn header_ignores_extra_columns_but_not_missing_ones() {
        let sheet = Sheet::new("roles", vec![vec![json!("siret"), json!("email"), json!("role"), json!("notes")]]);
        assert!(sheet.validate_header(&["siret", "email", "role"]).is_ok());
        let short = Sheet::new("roles", vec![vec![json!("siret"), json!("email")]]);
        assert!(short.validate_header(&["siret", "email", "role"]).is_err());
        let empty = Sheet::new("roles", vec![]);
        assert!(empty.validate_header(&["siret"]).is_err());
    }

    #[test]
    fn workbook_tabs_checked_by_count_then_name() {
        let wb = Workbook {
            sheets: vec![Sheet::new("etablissements", vec![])],
        };
        assert_matches!(
            wb.expect_tabs(&["etablissements", "roles"]),
            Err(ParseFailure::WrongTabCount { expected: 2, found: 1 })
        );
        let wb = Workbook {
            sheets: vec![Sheet::new("etablissements", vec![]), Sheet::new("rôles", vec![])],
        };
        assert_matches!(
            wb.expect_tabs(&["etablissements", "roles"]),
            Err(ParseFailure::WrongTabName { position: 2, .. })
        );
    }
}
