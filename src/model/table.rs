//! Structured table payloads returned by the table-extraction engine.

use serde::{Deserialize, Serialize};

/// A table recovered from a table region.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Rows in the table, top to bottom
    pub rows: Vec<TableRow>,
}

impl Table {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from rows of cell strings.
    pub fn from_rows<R, S>(rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rows: rows.into_iter().map(TableRow::from_strings).collect(),
        }
    }

    /// Add a row to the table.
    pub fn add_row(&mut self, row: TableRow) {
        self.rows.push(row);
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Widest row's cell count.
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(|r| r.cells.len()).max().unwrap_or(0)
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Tab-separated cells, one row per line.
    pub fn plain_text(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.cells.join("\t"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A table row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableRow {
    /// Cell texts, left to right
    pub cells: Vec<String>,
}

impl TableRow {
    /// Create a row from text values.
    pub fn from_strings<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self {
            cells: values.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_new() {
        let table = Table::new();
        assert!(table.is_empty());
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.column_count(), 0);
    }

    #[test]
    fn test_table_with_data() {
        let table = Table::from_rows([vec!["Name", "Age"], vec!["Alice", "30"], vec!["Bob"]]);
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.plain_text(), "Name\tAge\nAlice\t30\nBob");
    }

    #[test]
    fn test_table_json_is_rows_of_cells() {
        let table: Table = serde_json::from_str(r#"{"rows": [["a", "b"], ["c", "d"]]}"#).unwrap();
        assert_eq!(table.rows[1].cells, vec!["c", "d"]);
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(json, r#"{"rows":[["a","b"],["c","d"]]}"#);
    }
}
