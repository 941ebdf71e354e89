//! In-memory tabular results.

use langpulse_core::LangpulseError;
use serde::Serialize;

/// A named table with ordered columns and rows of optional text cells.
///
/// Cells are kept as text exactly as the source produced them; numeric
/// interpretation is left to the consumer.
///
/// # Examples
///
/// ```
/// use langpulse_source::Table;
///
/// let mut table = Table::new("repos_csv", vec!["language".into(), "num_repos".into()]);
/// table.push_row(vec![Some("rust".into()), Some("42".into())]);
/// assert_eq!(table.len(), 1);
/// assert_eq!(table.cell(0, 1), Some("42"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    /// Table identifier.
    pub name: String,
    /// Column headers in source order.
    pub columns: Vec<String>,
    /// Row data; every row has one cell per column.
    pub rows: Vec<Vec<Option<String>>>,
}

impl Table {
    /// Create an empty table.
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row, padding or truncating it to the column count.
    pub fn push_row(&mut self, mut row: Vec<Option<String>>) {
        row.resize(self.columns.len(), None);
        self.rows.push(row);
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the column whose trimmed header matches `name`, ignoring case.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.trim().eq_ignore_ascii_case(name))
    }

    /// Index of the first of `candidates` present in the table.
    ///
    /// # Errors
    ///
    /// Returns [`LangpulseError::Schema`] naming every candidate when none
    /// of them is a column.
    ///
    /// # Examples
    ///
    /// ```
    /// use langpulse_source::Table;
    ///
    /// let table = Table::new("repos_csv", vec!["Language".into(), "num_repos".into()]);
    /// assert_eq!(table.require_column(&["name", "language"]).unwrap(), 0);
    /// assert!(table.require_column(&["count"]).is_err());
    /// ```
    pub fn require_column(&self, candidates: &[&str]) -> Result<usize, LangpulseError> {
        candidates
            .iter()
            .find_map(|c| self.column_index(c))
            .ok_or_else(|| LangpulseError::Schema {
                table: self.name.clone(),
                column: candidates.join("|"),
            })
    }

    /// Text of the cell at `(row, col)`, if present and non-null.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col)?.as_deref()
    }

    /// Iterate over rows as cell slices.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[Option<String>]> {
        self.rows.iter().map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let mut table = Table::new(
            "issues_csv",
            vec![" name ".into(), "year".into(), "count".into()],
        );
        table.push_row(vec![Some("Rust".into()), Some("2022".into())]);
        table.push_row(vec![
            Some("Go".into()),
            Some("2023".into()),
            Some("7".into()),
            Some("extra".into()),
        ]);
        table
    }

    #[test]
    fn short_and_long_rows_are_fitted_to_columns() {
        let table = sample();
        assert!(table.iter_rows().all(|r| r.len() == 3));
        assert_eq!(table.cell(0, 2), None);
        assert_eq!(table.cell(1, 2), Some("7"));
    }

    #[test]
    fn column_lookup_ignores_case_and_padding() {
        let table = sample();
        assert_eq!(table.column_index("NAME"), Some(0));
        assert_eq!(table.column_index("quarter"), None);
    }

    #[test]
    fn missing_column_reports_candidates() {
        assert_eq!(sample().require_column(&["num_repos", "count"]).unwrap(), 2);
        let err = sample().require_column(&["quarter", "q"]).unwrap_err();
        assert!(err.to_string().contains("quarter|q"));
        assert!(err.to_string().contains("issues_csv"));
    }

    #[test]
    fn out_of_range_cells_are_none() {
        let table = sample();
        assert_eq!(table.cell(5, 0), None);
        assert_eq!(table.cell(0, 9), None);
        assert!(!table.is_empty());
    }
}
