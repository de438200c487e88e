// SPDX-FileCopyrightText: 2026 finbench contributors
//
// SPDX-License-Identifier: MIT

//! Statement loading: one CSV per company, rows = named line items,
//! columns = periods. The table is normalized into an in-memory map keyed by
//! line-item name with one `Option<f64>` per period. Dirty cells become
//! missing values, never errors; only structural problems (no name column,
//! duplicate line items) fail the load.

use std::collections::HashMap;
use std::path::Path;

use crate::error::SchemaError;

/// A normalized financial statement. Immutable after load.
#[derive(Debug, Clone)]
pub struct Statement {
    periods: Vec<String>,
    items: HashMap<String, Vec<Option<f64>>>,
    item_order: Vec<String>,
}

impl Statement {
    /// Load a statement from a CSV file on disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Statement, SchemaError> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_reader(file)
    }

    /// Parse a statement from any reader producing CSV text.
    ///
    /// Header layout: first column is the line-item name column, every
    /// remaining column is a period label. A column literally named `Total`
    /// is a row aggregate in the source exports and is skipped.
    pub fn from_reader(reader: impl std::io::Read) -> Result<Statement, SchemaError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        if headers.is_empty() {
            return Err(SchemaError::MissingNameColumn);
        }

        // Map CSV column index -> period slot, skipping aggregate columns.
        let mut periods = Vec::new();
        let mut period_columns = Vec::new();
        for (idx, header) in headers.iter().enumerate().skip(1) {
            if header.trim() == "Total" {
                continue;
            }
            periods.push(header.trim().to_string());
            period_columns.push(idx);
        }

        if periods.is_empty() {
            return Err(SchemaError::NoPeriodColumns);
        }

        let mut items: HashMap<String, Vec<Option<f64>>> = HashMap::new();
        let mut item_order = Vec::new();

        for record in csv_reader.records() {
            let record = record?;
            let name = match record.get(0) {
                Some(n) if !n.trim().is_empty() => n.trim().to_string(),
                // Blank separator rows are common in exported statements
                _ => continue,
            };

            if items.contains_key(&name) {
                return Err(SchemaError::DuplicateLineItem(name));
            }

            let values: Vec<Option<f64>> = period_columns
                .iter()
                .map(|&idx| record.get(idx).and_then(parse_cell))
                .collect();

            item_order.push(name.clone());
            items.insert(name, values);
        }

        Ok(Statement {
            periods,
            items,
            item_order,
        })
    }

    /// Period labels in statement order.
    pub fn periods(&self) -> &[String] {
        &self.periods
    }

    /// Line-item names in row order.
    pub fn line_items(&self) -> &[String] {
        &self.item_order
    }

    /// Value of a line item at a period index, `None` if the item is absent
    /// or the cell was missing/unparseable.
    pub fn value(&self, name: &str, period: usize) -> Option<f64> {
        self.items.get(name)?.get(period).copied().flatten()
    }

    /// Full period vector for a line item, `None` if the item is absent.
    pub fn series(&self, name: &str) -> Option<&[Option<f64>]> {
        self.items.get(name).map(|v| v.as_slice())
    }

    /// The raw CSV text of a statement, used as context for the narrative
    /// collaborators. Reconstructed rather than kept so callers never hold
    /// the original file handle.
    pub fn to_table_text(&self) -> String {
        let mut out = String::from("Name");
        for p in &self.periods {
            out.push(',');
            out.push_str(p);
        }
        out.push('\n');
        for name in &self.item_order {
            out.push_str(name);
            for v in &self.items[name] {
                out.push(',');
                match v {
                    Some(x) => out.push_str(&format!("{:.2}", x)),
                    None => {}
                }
            }
            out.push('\n');
        }
        out
    }
}

/// Coerce one cell to a number. Currency symbols, thousands separators and
/// surrounding whitespace are tolerated; anything else is a missing value.
fn parse_cell(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' '))
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_str(csv: &str) -> Result<Statement, SchemaError> {
        Statement::from_reader(csv.as_bytes())
    }

    #[test]
    fn test_loads_basic_statement() {
        let stmt = load_str(
            "Name,2024-01,2024-02,2024-03\n\
             Total Income,100,120,150\n\
             Gross Profit,40,50,60\n",
        )
        .unwrap();

        assert_eq!(stmt.periods(), &["2024-01", "2024-02", "2024-03"]);
        assert_eq!(stmt.value("Total Income", 0), Some(100.0));
        assert_eq!(stmt.value("Gross Profit", 2), Some(60.0));
        assert_eq!(stmt.line_items(), &["Total Income", "Gross Profit"]);
    }

    #[test]
    fn test_dirty_cells_become_missing_not_errors() {
        let stmt = load_str(
            "Name,2024-01,2024-02\n\
             Total Income,\"$1,200.50\",n/a\n\
             Net Profit,abc,30\n",
        )
        .unwrap();

        assert_eq!(stmt.value("Total Income", 0), Some(1200.50));
        assert_eq!(stmt.value("Total Income", 1), None);
        assert_eq!(stmt.value("Net Profit", 0), None);
        assert_eq!(stmt.value("Net Profit", 1), Some(30.0));
    }

    #[test]
    fn test_total_column_is_skipped() {
        let stmt = load_str(
            "Name,2024-01,2024-02,Total\n\
             Total Income,100,120,220\n",
        )
        .unwrap();

        assert_eq!(stmt.periods(), &["2024-01", "2024-02"]);
        assert_eq!(stmt.series("Total Income").unwrap().len(), 2);
    }

    #[test]
    fn test_duplicate_line_item_is_schema_error() {
        let err = load_str(
            "Name,2024-01\n\
             Total Income,100\n\
             Total Income,200\n",
        )
        .unwrap_err();

        assert!(matches!(err, SchemaError::DuplicateLineItem(name) if name == "Total Income"));
    }

    #[test]
    fn test_no_period_columns_is_schema_error() {
        let err = load_str("Name\nTotal Income\n").unwrap_err();
        assert!(matches!(err, SchemaError::NoPeriodColumns));
    }

    #[test]
    fn test_absent_item_lookup_is_none() {
        let stmt = load_str("Name,2024-01\nTotal Income,100\n").unwrap();
        assert_eq!(stmt.value("Net Profit", 0), None);
        assert!(stmt.series("Net Profit").is_none());
    }

    #[test]
    fn test_blank_rows_are_skipped() {
        let stmt = load_str(
            "Name,2024-01\n\
             Total Income,100\n\
             ,\n\
             Net Profit,10\n",
        )
        .unwrap();
        assert_eq!(stmt.line_items().len(), 2);
    }

    #[test]
    fn test_table_text_roundtrip_shape() {
        let stmt = load_str("Name,2024-01,2024-02\nTotal Income,100,120\n").unwrap();
        let text = stmt.to_table_text();
        assert!(text.starts_with("Name,2024-01,2024-02"));
        assert!(text.contains("Total Income,100.00,120.00"));
    }
}
