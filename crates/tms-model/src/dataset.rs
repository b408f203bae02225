//! Normalized spreadsheet data.
//!
//! A [`Dataset`] is built once from the output of the text-to-table parser.
//! Every row receives its `row_nr` at that point and keeps it for the
//! lifetime of the dataset, so it stays a stable key when rows are filtered
//! or sorted for display.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Raw parser output: ordered headers plus one string map per data row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedTable {
    pub headers: Vec<String>,
    pub rows: Vec<BTreeMap<String, String>>,
}

/// A spreadsheet row with its ingestion-time number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub row_nr: usize,
    pub data: BTreeMap<String, String>,
}

impl Row {
    /// Raw cell value for `header`, if the row has that column.
    pub fn get(&self, header: &str) -> Option<&str> {
        self.data.get(header).map(String::as_str)
    }

    /// Cell value for `header`, treating a missing cell as empty.
    pub fn cell(&self, header: &str) -> &str {
        self.get(header).unwrap_or("")
    }
}

/// Indexable spreadsheet contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    headers: Vec<String>,
    rows: Vec<Row>,
}

impl Dataset {
    /// Normalizes parser output into a dataset.
    ///
    /// Rows are numbered by their position in the input. Cells are kept
    /// verbatim: no trimming, deduplication or type coercion happens here.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::DuplicateHeader`] if a header occurs twice, since
    /// row data is keyed by header.
    pub fn ingest(parsed: ParsedTable) -> Result<Self> {
        let mut seen = BTreeSet::new();
        for header in &parsed.headers {
            if !seen.insert(header.as_str()) {
                return Err(ModelError::DuplicateHeader {
                    header: header.clone(),
                });
            }
        }

        let rows = parsed
            .rows
            .into_iter()
            .enumerate()
            .map(|(row_nr, data)| Row { row_nr, data })
            .collect();

        Ok(Self {
            headers: parsed.headers,
            rows,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_header(&self, header: &str) -> bool {
        self.headers.iter().any(|h| h == header)
    }

    /// Looks up a row by its ingestion number.
    pub fn row(&self, row_nr: usize) -> Option<&Row> {
        // Rows are stored in ingestion order, so the number is also the index.
        self.rows.get(row_nr).filter(|row| row.row_nr == row_nr)
    }

    /// First row whose cell in `header` is non-empty.
    pub fn first_row_with(&self, header: &str) -> Option<&Row> {
        self.rows
            .iter()
            .find(|row| row.get(header).is_some_and(|value| !value.trim().is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(headers: &[&str], rows: &[&[(&str, &str)]]) -> ParsedTable {
        ParsedTable {
            headers: headers.iter().map(|h| (*h).to_string()).collect(),
            rows: rows
                .iter()
                .map(|cells| {
                    cells
                        .iter()
                        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                        .collect()
                })
                .collect(),
        }
    }

    #[test]
    fn assigns_row_numbers_in_input_order() {
        let dataset = Dataset::ingest(parsed(
            &["Login", "1"],
            &[&[("Login", "b")], &[("Login", "a")], &[("Login", "b")]],
        ))
        .unwrap();

        let numbers: Vec<usize> = dataset.rows().iter().map(|r| r.row_nr).collect();
        assert_eq!(numbers, vec![0, 1, 2]);
        // Duplicate rows are kept.
        assert_eq!(dataset.rows()[0].data, dataset.rows()[2].data);
    }

    #[test]
    fn keeps_cells_verbatim() {
        let dataset =
            Dataset::ingest(parsed(&["Login"], &[&[("Login", "  jdoe ")]])).unwrap();
        assert_eq!(dataset.rows()[0].cell("Login"), "  jdoe ");
        assert_eq!(dataset.rows()[0].cell("Missing"), "");
    }

    #[test]
    fn rejects_duplicate_headers() {
        let err = Dataset::ingest(parsed(&["A", "A"], &[])).unwrap_err();
        assert_eq!(
            err,
            ModelError::DuplicateHeader {
                header: "A".to_string()
            }
        );
    }

    #[test]
    fn first_row_with_skips_blank_cells() {
        let dataset = Dataset::ingest(parsed(
            &["Max"],
            &[&[("Max", "")], &[("Max", " ")], &[("Max", "20")]],
        ))
        .unwrap();
        assert_eq!(dataset.first_row_with("Max").map(|r| r.row_nr), Some(2));
        assert!(dataset.first_row_with("Other").is_none());
        assert_eq!(dataset.row(1).map(|r| r.row_nr), Some(1));
    }
}
