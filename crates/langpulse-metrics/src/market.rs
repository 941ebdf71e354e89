//! Repository market leaders, computed through the query contract.

use langpulse_core::LangpulseError;
use langpulse_source::{DataSource, Table};
use serde::{Deserialize, Serialize};

/// A language's share of all repositories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketShare {
    /// Normalized language key.
    pub language: String,
    /// Repositories on this row.
    pub num_repos: u64,
    /// Share of all positive repository counts, rounded to 2 decimals.
    pub market_share_pct: f64,
}

/// Rank repository rows of `table` by market share.
///
/// Only rows with a positive integer count and a non-empty language take
/// part, in the numerator and in the total alike. The total deliberately
/// leaves out zero, negative and unparseable rows instead of summing every
/// row, so a negative count cannot shrink it and the listed shares sum to
/// 100. Ties keep alphabetical order.
///
/// # Errors
///
/// Returns [`LangpulseError::Schema`] if the table lacks a language or count
/// column and [`LangpulseError::Source`] if the query fails.
///
/// # Examples
///
/// ```
/// use langpulse_metrics::market::market_leaders;
/// use langpulse_source::{SqliteSource, Table};
///
/// let mut repos = Table::new("repos_csv", vec!["language".into(), "num_repos".into()]);
/// repos.push_row(vec![Some("Rust".into()), Some("3".into())]);
/// repos.push_row(vec![Some("go".into()), Some("1".into())]);
/// let source = SqliteSource::from_tables(vec![repos]).unwrap();
///
/// let leaders = market_leaders(&source, "repos_csv").unwrap();
/// assert_eq!(leaders[0].language, "rust");
/// assert_eq!(leaders[0].market_share_pct, 75.0);
/// ```
pub fn market_leaders(
    source: &dyn DataSource,
    table: &str,
) -> Result<Vec<MarketShare>, LangpulseError> {
    let mut header = source.query(&format!("SELECT * FROM {} LIMIT 0", quote(table)))?;
    header.name = table.to_string();
    let lang_col = quote(&header.columns[header.require_column(&["language", "name"])?]);
    let count_col = quote(&header.columns[header.require_column(&["num_repos", "count"])?]);

    let sql = format!(
        "WITH repos AS (
            SELECT TRIM(LOWER({lang_col})) AS language,
                   CAST({count_col} AS INTEGER) AS num_repos
            FROM {table}
            WHERE TRIM(COALESCE({lang_col}, '')) <> ''
        )
        SELECT language,
               num_repos,
               ROUND(num_repos * 100.0 / (SELECT SUM(num_repos) FROM repos WHERE num_repos > 0), 2)
                   AS market_share_pct
        FROM repos
        WHERE num_repos > 0
        ORDER BY num_repos DESC, language",
        table = quote(table),
    );

    let result = source.query(&sql)?;
    let mut leaders = Vec::with_capacity(result.len());
    for row in 0..result.len() {
        let language = result.cell(row, 0).unwrap_or_default().to_string();
        let num_repos = parse_cell::<u64>(&result, row, 1)?;
        let market_share_pct = parse_cell::<f64>(&result, row, 2)?;
        leaders.push(MarketShare {
            language,
            num_repos,
            market_share_pct,
        });
    }

    tracing::info!(languages = leaders.len(), "ranked repository market share");
    Ok(leaders)
}

/// One 1-based page of `size` leaders; page 0 is treated as page 1.
///
/// # Examples
///
/// ```
/// use langpulse_metrics::market::{page, MarketShare};
///
/// let leaders: Vec<MarketShare> = (0..25)
///     .map(|i| MarketShare { language: format!("l{i}"), num_repos: 1, market_share_pct: 4.0 })
///     .collect();
/// assert_eq!(page(&leaders, 10, 1).len(), 10);
/// assert_eq!(page(&leaders, 10, 3).len(), 5);
/// assert!(page(&leaders, 10, 4).is_empty());
/// ```
pub fn page(leaders: &[MarketShare], size: usize, page: usize) -> &[MarketShare] {
    if size == 0 {
        return leaders;
    }
    let start = page.saturating_sub(1).saturating_mul(size);
    if start >= leaders.len() {
        return &[];
    }
    let end = start.saturating_add(size).min(leaders.len());
    &leaders[start..end]
}

/// Number of pages needed for `len` leaders.
pub fn page_count(len: usize, size: usize) -> usize {
    if size == 0 {
        return usize::from(len > 0);
    }
    len.div_ceil(size)
}

fn quote(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

fn parse_cell<T: std::str::FromStr>(
    table: &Table,
    row: usize,
    col: usize,
) -> Result<T, LangpulseError> {
    let text = table.cell(row, col).unwrap_or_default();
    text.parse().map_err(|_| {
        LangpulseError::Source(format!(
            "unexpected value '{text}' in column {} of market share query",
            table.columns.get(col).map(String::as_str).unwrap_or("?")
        ))
    })
}
