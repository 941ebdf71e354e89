//! Column-aligned text and GitHub-flavored Markdown tables.

use std::fmt::Write;

/// Horizontal alignment of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    /// Pad on the right.
    Left,
    /// Pad on the left.
    Right,
}

/// A table of pre-formatted cells.
///
/// # Examples
///
/// ```
/// use langpulse_report::grid::{Align, Grid};
///
/// let mut grid = Grid::new(&[("Language", Align::Left), ("PRs", Align::Right)]);
/// grid.push(vec!["Rust".into(), "1,200".into()]);
/// let text = grid.to_text();
/// assert!(text.starts_with("Language    PRs"));
/// assert!(grid.to_markdown().contains("| Rust | 1,200 |"));
/// ```
#[derive(Debug, Clone)]
pub struct Grid {
    headers: Vec<String>,
    align: Vec<Align>,
    rows: Vec<Vec<String>>,
}

impl Grid {
    /// Create an empty grid with `(header, alignment)` columns.
    pub fn new(columns: &[(&str, Align)]) -> Self {
        Self {
            headers: columns.iter().map(|(h, _)| h.to_string()).collect(),
            align: columns.iter().map(|(_, a)| *a).collect(),
            rows: Vec::new(),
        }
    }

    /// Create a grid with left-aligned columns named `headers`.
    pub fn with_headers(headers: &[String]) -> Self {
        Self {
            headers: headers.to_vec(),
            align: vec![Align::Left; headers.len()],
            rows: Vec::new(),
        }
    }

    /// Append a row, padding or truncating it to the column count.
    pub fn push(&mut self, mut row: Vec<String>) {
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    /// Number of body rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the grid has no body rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                self.rows
                    .iter()
                    .map(|row| row[i].chars().count())
                    .chain(std::iter::once(header.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }

    /// Render with two spaces between columns and a dashed rule under the
    /// header.
    pub fn to_text(&self) -> String {
        let widths = self.widths();
        let mut out = String::new();

        let header: Vec<String> = self
            .headers
            .iter()
            .zip(&widths)
            .zip(&self.align)
            .map(|((h, w), a)| pad(h, *w, *a))
            .collect();
        let _ = writeln!(out, "{}", header.join("  ").trim_end());

        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        let _ = writeln!(out, "{}", rule.join("  "));

        for row in &self.rows {
            let cells: Vec<String> = row
                .iter()
                .zip(&widths)
                .zip(&self.align)
                .map(|((c, w), a)| pad(c, *w, *a))
                .collect();
            let _ = writeln!(out, "{}", cells.join("  ").trim_end());
        }
        out
    }

    /// Render as a GFM table; `|` inside cells is escaped.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        let header: Vec<String> = self.headers.iter().map(|h| escape(h)).collect();
        let _ = writeln!(out, "| {} |", header.join(" | "));

        let rule: Vec<&str> = self
            .align
            .iter()
            .map(|a| match a {
                Align::Left => "---",
                Align::Right => "---:",
            })
            .collect();
        let _ = writeln!(out, "| {} |", rule.join(" | "));

        for row in &self.rows {
            let cells: Vec<String> = row.iter().map(|c| escape(c)).collect();
            let _ = writeln!(out, "| {} |", cells.join(" | "));
        }
        out
    }
}

fn pad(cell: &str, width: usize, align: Align) -> String {
    match align {
        Align::Left => format!("{cell:<width$}"),
        Align::Right => format!("{cell:>width$}"),
    }
}

fn escape(cell: &str) -> String {
    cell.replace('|', "\\|")
}
