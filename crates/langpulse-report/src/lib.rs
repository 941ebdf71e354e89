//! Presentation of langpulse analytics.
//!
//! Every report section is first laid out as a block (a heading, key/value
//! notes and an optional [`Grid`]) and then rendered as aligned
//! text or GitHub-flavored Markdown. JSON output serializes the pipeline
//! records directly with camelCase keys.

pub mod grid;
pub mod numbers;
mod sections;

use std::fmt::Write;

use langpulse_core::{title_case, ClusterConfig, LangpulseError, OutputFormat};
use langpulse_metrics::AnalyticsReport;
use langpulse_source::Table;

use crate::grid::{Align, Grid};

pub use sections::Section;

/// What to render and how much of it.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Sections in output order.
    pub sections: Vec<Section>,
    /// Maximum rows per table (market leaders use `leaders_page_size`).
    pub limit: usize,
    /// Rows on the first page of market leaders.
    pub leaders_page_size: usize,
    /// Emit ANSI styling in text output.
    pub use_color: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            sections: Section::ALL.to_vec(),
            limit: 20,
            leaders_page_size: 10,
            use_color: false,
        }
    }
}

/// A rendered-format-independent piece of a report.
#[derive(Debug, Clone)]
pub(crate) struct Block {
    pub(crate) title: String,
    pub(crate) level: u8,
    pub(crate) notes: Vec<(String, String)>,
    pub(crate) grid: Option<Grid>,
    pub(crate) empty: &'static str,
}

impl Block {
    pub(crate) fn new(title: impl Into<String>, level: u8) -> Self {
        Self {
            title: title.into(),
            level,
            notes: Vec::new(),
            grid: None,
            empty: "No data.",
        }
    }

    pub(crate) fn note(mut self, label: &str, value: impl Into<String>) -> Self {
        self.notes.push((label.to_string(), value.into()));
        self
    }

    pub(crate) fn grid(mut self, grid: Grid, empty: &'static str) -> Self {
        self.grid = Some(grid);
        self.empty = empty;
        self
    }
}

/// Render `report` in `format`.
///
/// # Errors
///
/// Returns [`LangpulseError::Serialization`] if JSON serialization fails.
pub fn render(
    report: &AnalyticsReport,
    format: OutputFormat,
    options: &RenderOptions,
) -> Result<String, LangpulseError> {
    match format {
        OutputFormat::Json => format_json(report, &options.sections),
        OutputFormat::Markdown => Ok(format_markdown(report, options)),
        OutputFormat::Text => Ok(format_text(report, options)),
    }
}

/// Render the selected sections as pretty JSON.
///
/// Lists are not truncated.
///
/// # Errors
///
/// Returns [`LangpulseError::Serialization`] if serialization fails.
pub fn format_json(
    report: &AnalyticsReport,
    sections: &[Section],
) -> Result<String, LangpulseError> {
    let mut json = serde_json::Map::new();
    for section in sections {
        sections::insert_json(&mut json, report, *section)?;
    }
    Ok(serde_json::to_string_pretty(&serde_json::Value::Object(json))?)
}

/// Render the selected sections as aligned text.
pub fn format_text(report: &AnalyticsReport, options: &RenderOptions) -> String {
    let blocks = sections::blocks(report, options);
    let mut out = String::new();
    for block in &blocks {
        write_text_block(&mut out, block, options.use_color);
    }
    out
}

/// Render the selected sections as Markdown.
pub fn format_markdown(report: &AnalyticsReport, options: &RenderOptions) -> String {
    let blocks = sections::blocks(report, options);
    let mut out = String::from("# Programming Language Analytics\n\n");
    for block in &blocks {
        write_markdown_block(&mut out, block);
    }
    out
}

/// Render an ad-hoc query result.
///
/// JSON output is an array of objects keyed by column name; NULL cells
/// become `null`.
///
/// # Errors
///
/// Returns [`LangpulseError::Serialization`] if JSON serialization fails.
///
/// # Examples
///
/// ```
/// use langpulse_core::OutputFormat;
/// use langpulse_report::format_table;
/// use langpulse_source::Table;
///
/// let mut table = Table::new("query", vec!["language".into(), "n".into()]);
/// table.push_row(vec![Some("rust".into()), None]);
/// let json = format_table(&table, OutputFormat::Json).unwrap();
/// assert!(json.contains("\"n\": null"));
/// ```
pub fn format_table(table: &Table, format: OutputFormat) -> Result<String, LangpulseError> {
    if format == OutputFormat::Json {
        let rows: Vec<serde_json::Value> = table
            .iter_rows()
            .map(|row| {
                let object: serde_json::Map<String, serde_json::Value> = table
                    .columns
                    .iter()
                    .zip(row)
                    .map(|(column, cell)| {
                        let value = cell
                            .as_ref()
                            .map_or(serde_json::Value::Null, |c| c.clone().into());
                        (column.clone(), value)
                    })
                    .collect();
                serde_json::Value::Object(object)
            })
            .collect();
        return Ok(serde_json::to_string_pretty(&rows)?);
    }

    let mut grid = Grid::with_headers(&table.columns);
    for row in table.iter_rows() {
        grid.push(
            row.iter()
                .map(|cell| cell.clone().unwrap_or_else(|| "NULL".into()))
                .collect(),
        );
    }
    let mut out = if format == OutputFormat::Markdown {
        grid.to_markdown()
    } else {
        grid.to_text()
    };
    let _ = writeln!(out, "\n({} rows)", table.len());
    Ok(out)
}

/// Render the configured clusters and their members.
///
/// # Errors
///
/// Returns [`LangpulseError::Serialization`] if JSON serialization fails.
pub fn format_clusters(
    clusters: &[ClusterConfig],
    format: OutputFormat,
) -> Result<String, LangpulseError> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(clusters)?);
    }

    let mut grid = Grid::new(&[("Cluster", Align::Left), ("Languages", Align::Left)]);
    for cluster in clusters {
        let members: Vec<String> = cluster.languages.iter().map(|l| title_case(l)).collect();
        grid.push(vec![cluster.name.clone(), members.join(", ")]);
    }
    Ok(match format {
        OutputFormat::Markdown => format!("# Language Clusters\n\n{}", grid.to_markdown()),
        _ => grid.to_text(),
    })
}

fn write_text_block(out: &mut String, block: &Block, use_color: bool) {
    let rule = if block.level <= 2 { '=' } else { '-' };
    if use_color {
        let _ = writeln!(out, "\x1b[1m{}\x1b[0m", block.title);
    } else {
        let _ = writeln!(out, "{}", block.title);
    }
    let _ = writeln!(out, "{}", rule.to_string().repeat(block.title.chars().count()));

    if !block.notes.is_empty() {
        let width = block
            .notes
            .iter()
            .map(|(label, _)| label.chars().count())
            .max()
            .unwrap_or(0);
        for (label, value) in &block.notes {
            let label = format!("{label}:");
            let _ = writeln!(out, "  {label:<w$} {value}", w = width + 1);
        }
        out.push('\n');
    }

    if let Some(grid) = &block.grid {
        if grid.is_empty() {
            let _ = writeln!(out, "{}\n", block.empty);
        } else {
            out.push_str(&grid.to_text());
            out.push('\n');
        }
    }
}

fn write_markdown_block(out: &mut String, block: &Block) {
    let hashes = "#".repeat(usize::from(block.level.max(2)));
    let _ = writeln!(out, "{hashes} {}\n", block.title);

    if !block.notes.is_empty() {
        for (label, value) in &block.notes {
            let _ = writeln!(out, "- **{label}:** {value}");
        }
        out.push('\n');
    }

    if let Some(grid) = &block.grid {
        if grid.is_empty() {
            let _ = writeln!(out, "{}\n", block.empty);
        } else {
            out.push_str(&grid.to_markdown());
            out.push('\n');
        }
    }
}
