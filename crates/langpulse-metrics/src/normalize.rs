//! Ingestion-time coercion of raw tables into typed rows.
//!
//! Count columns go through [`parse_or_zero`]; rows whose count ends up
//! non-positive are dropped, as are rows without a language name. The
//! quarterly projection ([`quarterly_rows`]) keeps zero counts so a quiet
//! quarter still counts as an observation. Nothing here fails on bad cell
//! contents, only on missing columns.

use langpulse_core::LangpulseError;
use langpulse_source::Table;
use serde::Serialize;

/// One issue or pull request count row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityRow {
    /// Trimmed, lowercased language name.
    pub language: String,
    /// Calendar year, when present and parseable.
    pub year: Option<i32>,
    /// Quarter 1–4, when present and parseable.
    pub quarter: Option<u8>,
    /// Count; positive except in [`quarterly_rows`] output.
    pub count: u64,
}

/// One repository count row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRow {
    /// Trimmed, lowercased language name.
    pub language: String,
    /// Positive repository count.
    pub num_repos: u64,
}

/// Counters for rows removed during normalization.
///
/// # Examples
///
/// ```
/// use langpulse_metrics::normalize::DropStats;
///
/// let stats = DropStats { total: 10, non_positive: 2, missing_language: 1 };
/// assert_eq!(stats.kept(), 7);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DropStats {
    /// Rows read from the table.
    pub total: usize,
    /// Rows whose count was zero, negative or unparseable.
    pub non_positive: usize,
    /// Rows with an empty or null language.
    pub missing_language: usize,
}

impl DropStats {
    /// Rows that survived normalization.
    pub fn kept(&self) -> usize {
        self.total - self.non_positive - self.missing_language
    }
}

/// Rows that survived normalization plus what was dropped.
#[derive(Debug, Clone)]
pub struct Normalized<T> {
    /// Surviving rows in source order.
    pub rows: Vec<T>,
    /// Drop counters.
    pub dropped: DropStats,
}

impl<T> Default for Normalized<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            dropped: DropStats::default(),
        }
    }
}

/// Parse a count cell, mapping anything unusable to zero.
///
/// Integers parse directly; decimals are truncated toward zero; negative,
/// non-finite or non-numeric input yields 0.
///
/// # Examples
///
/// ```
/// use langpulse_metrics::normalize::parse_or_zero;
///
/// assert_eq!(parse_or_zero(Some(" 42 ")), 42);
/// assert_eq!(parse_or_zero(Some("12.9")), 12);
/// assert_eq!(parse_or_zero(Some("n/a")), 0);
/// assert_eq!(parse_or_zero(Some("-3")), 0);
/// assert_eq!(parse_or_zero(None), 0);
/// ```
pub fn parse_or_zero(raw: Option<&str>) -> u64 {
    let Some(text) = raw.map(str::trim) else {
        return 0;
    };
    if let Ok(n) = text.parse::<i64>() {
        return u64::try_from(n).unwrap_or(0);
    }
    match text.parse::<f64>() {
        Ok(f) if f.is_finite() && f > 0.0 => f.trunc() as u64,
        _ => 0,
    }
}

/// Grouping key for a language name: trimmed and lowercased.
///
/// # Examples
///
/// ```
/// use langpulse_metrics::normalize::normalize_language;
///
/// assert_eq!(normalize_language("  TypeScript "), "typescript");
/// ```
pub fn normalize_language(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Parse a year cell; decimal forms such as `2023.0` are accepted.
pub fn parse_year(raw: Option<&str>) -> Option<i32> {
    let text = raw?.trim();
    if let Ok(year) = text.parse::<i32>() {
        return Some(year);
    }
    let f = text.parse::<f64>().ok()?;
    (f.is_finite() && f.fract() == 0.0 && f.abs() < i32::MAX as f64).then_some(f as i32)
}

/// Parse a quarter cell: `1`–`4`, optionally prefixed with `Q`.
///
/// # Examples
///
/// ```
/// use langpulse_metrics::normalize::parse_quarter;
///
/// assert_eq!(parse_quarter(Some("3")), Some(3));
/// assert_eq!(parse_quarter(Some("q4")), Some(4));
/// assert_eq!(parse_quarter(Some("5")), None);
/// ```
pub fn parse_quarter(raw: Option<&str>) -> Option<u8> {
    let text = raw?.trim();
    let digits = text
        .strip_prefix('Q')
        .or_else(|| text.strip_prefix('q'))
        .unwrap_or(text);
    let quarter = digits.parse::<u8>().ok()?;
    (1..=4).contains(&quarter).then_some(quarter)
}

/// Normalize an issues or pull requests table.
///
/// Requires a `name` (or `language`) column and a `count` column; `year` and
/// `quarter` are optional and only feed the time-series analyzers.
///
/// # Errors
///
/// Returns [`LangpulseError::Schema`] when a required column is missing.
pub fn normalize_activity(table: &Table) -> Result<Normalized<ActivityRow>, LangpulseError> {
    let name_col = table.require_column(&["name", "language"])?;
    let count_col = table.require_column(&["count"])?;
    let year_col = table.column_index("year");
    let quarter_col = table.column_index("quarter");

    let mut out = Normalized::default();
    for (idx, row) in table.iter_rows().enumerate() {
        out.dropped.total += 1;
        let cell = move |col: usize| row.get(col).and_then(|c| c.as_deref());

        let language = cell(name_col).map(normalize_language).unwrap_or_default();
        if language.is_empty() {
            out.dropped.missing_language += 1;
            tracing::debug!(table = %table.name, row = idx, "dropping row without language");
            continue;
        }

        let count = parse_or_zero(cell(count_col));
        if count == 0 {
            out.dropped.non_positive += 1;
            tracing::debug!(
                table = %table.name,
                row = idx,
                language = %language,
                raw = ?cell(count_col),
                "dropping non-positive count"
            );
            continue;
        }

        out.rows.push(ActivityRow {
            language,
            year: year_col.and_then(|c| parse_year(cell(c))),
            quarter: quarter_col.and_then(|c| parse_quarter(cell(c))),
            count,
        });
    }

    log_summary(&table.name, &out.dropped);
    Ok(out)
}

/// Project a pull requests table into quarterly observations.
///
/// Unlike [`normalize_activity`], zero and unparseable counts are kept as 0;
/// only rows without a language, year or quarter are left out. A table with
/// no `year` or `quarter` column projects to nothing.
///
/// # Errors
///
/// Returns [`LangpulseError::Schema`] when the language or count column is
/// missing.
///
/// # Examples
///
/// ```
/// use langpulse_metrics::normalize::quarterly_rows;
/// use langpulse_source::Table;
///
/// let mut table = Table::new(
///     "prs_csv",
///     vec!["name".into(), "year".into(), "quarter".into(), "count".into()],
/// );
/// table.push_row(vec![Some("Rust".into()), Some("2023".into()), Some("4".into()), Some("0".into())]);
/// let rows = quarterly_rows(&table).unwrap();
/// assert_eq!(rows[0].count, 0);
/// ```
pub fn quarterly_rows(table: &Table) -> Result<Vec<ActivityRow>, LangpulseError> {
    let name_col = table.require_column(&["name", "language"])?;
    let count_col = table.require_column(&["count"])?;
    let year_col = table.column_index("year");
    let quarter_col = table.column_index("quarter");

    let mut rows = Vec::with_capacity(table.len());
    let mut skipped = 0usize;
    for row in table.iter_rows() {
        let cell = move |col: usize| row.get(col).and_then(|c| c.as_deref());

        let language = cell(name_col).map(normalize_language).unwrap_or_default();
        let year = year_col.and_then(|c| parse_year(cell(c)));
        let quarter = quarter_col.and_then(|c| parse_quarter(cell(c)));
        if language.is_empty() || year.is_none() || quarter.is_none() {
            skipped += 1;
            continue;
        }
        rows.push(ActivityRow {
            language,
            year,
            quarter,
            count: parse_or_zero(cell(count_col)),
        });
    }

    tracing::info!(
        table = %table.name,
        kept = rows.len(),
        zero = rows.iter().filter(|r| r.count == 0).count(),
        skipped,
        "projected quarterly rows"
    );
    Ok(rows)
}

/// Normalize the repositories table (`language`/`name` and `num_repos`/`count`).
///
/// # Errors
///
/// Returns [`LangpulseError::Schema`] when a required column is missing.
pub fn normalize_repos(table: &Table) -> Result<Normalized<RepoRow>, LangpulseError> {
    let name_col = table.require_column(&["language", "name"])?;
    let count_col = table.require_column(&["num_repos", "count"])?;

    let mut out = Normalized::default();
    for (idx, row) in table.iter_rows().enumerate() {
        out.dropped.total += 1;
        let cell = move |col: usize| row.get(col).and_then(|c| c.as_deref());

        let language = cell(name_col).map(normalize_language).unwrap_or_default();
        if language.is_empty() {
            out.dropped.missing_language += 1;
            tracing::debug!(table = %table.name, row = idx, "dropping row without language");
            continue;
        }

        let num_repos = parse_or_zero(cell(count_col));
        if num_repos == 0 {
            out.dropped.non_positive += 1;
            tracing::debug!(
                table = %table.name,
                row = idx,
                language = %language,
                raw = ?cell(count_col),
                "dropping non-positive repository count"
            );
            continue;
        }

        out.rows.push(RepoRow {
            language,
            num_repos,
        });
    }

    log_summary(&table.name, &out.dropped);
    Ok(out)
}

fn log_summary(table: &str, dropped: &DropStats) {
    tracing::info!(
        table = %table,
        total = dropped.total,
        kept = dropped.kept(),
        non_positive = dropped.non_positive,
        missing_language = dropped.missing_language,
        "normalized table"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(name: &str, columns: &[&str], rows: &[&[&str]]) -> Table {
        let mut t = Table::new(name, columns.iter().map(|c| c.to_string()).collect());
        for row in rows {
            t.push_row(
                row.iter()
                    .map(|c| (!c.is_empty()).then(|| c.to_string()))
                    .collect(),
            );
        }
        t
    }

    #[test]
    fn bad_counts_become_zero_and_are_dropped() {
        let t = table(
            "issues_csv",
            &["name", "year", "quarter", "count"],
            &[
                &["Rust", "2023", "1", "10"],
                &["Go", "2023", "1", "abc"],
                &["Zig", "2023", "1", "0"],
                &["Nim", "2023", "1", "-4"],
                &["", "2023", "1", "5"],
            ],
        );
        let normalized = normalize_activity(&t).unwrap();
        assert_eq!(normalized.rows.len(), 1);
        assert_eq!(normalized.rows[0].language, "rust");
        assert_eq!(normalized.dropped.non_positive, 3);
        assert_eq!(normalized.dropped.missing_language, 1);
        assert_eq!(normalized.dropped.kept(), 1);
    }

    #[test]
    fn unparseable_periods_survive_without_period() {
        let t = table(
            "prs_csv",
            &["name", "year", "quarter", "count"],
            &[&["Rust", "twenty", "Q9", "3"], &["Rust", "2021.0", "Q2", "4"]],
        );
        let rows = normalize_activity(&t).unwrap().rows;
        assert_eq!(rows[0].year, None);
        assert_eq!(rows[0].quarter, None);
        assert_eq!(rows[1].year, Some(2021));
        assert_eq!(rows[1].quarter, Some(2));
    }

    #[test]
    fn period_columns_are_optional() {
        let t = table("issues_csv", &["name", "count"], &[&["Rust", "3"]]);
        let rows = normalize_activity(&t).unwrap().rows;
        assert_eq!(rows[0].year, None);
    }

    #[test]
    fn missing_count_column_is_a_schema_error() {
        let t = table("prs_csv", &["name", "year"], &[]);
        let err = normalize_activity(&t).unwrap_err();
        assert!(matches!(err, LangpulseError::Schema { .. }));
    }

    #[test]
    fn repos_accept_language_column() {
        let t = table(
            "repos_csv",
            &["language", "num_repos"],
            &[&[" Python ", "120"], &["Cobol", "0"]],
        );
        let normalized = normalize_repos(&t).unwrap();
        assert_eq!(
            normalized.rows,
            vec![RepoRow {
                language: "python".into(),
                num_repos: 120
            }]
        );
        assert_eq!(normalized.dropped.non_positive, 1);
    }

    #[test]
    fn quarterly_projection_keeps_zero_counts() {
        let t = table(
            "prs_csv",
            &["name", "year", "quarter", "count"],
            &[
                &["Rust", "2023", "Q3", "6"],
                &["Rust", "2023", "Q4", "0"],
                &["Rust", "2024", "1", "oops"],
                &["Rust", "2024", "", "5"],
                &["", "2024", "2", "5"],
            ],
        );
        let rows = quarterly_rows(&t).unwrap();
        let counts: Vec<_> = rows.iter().map(|r| r.count).collect();
        assert_eq!(counts, vec![6, 0, 0]);
        assert_eq!(rows[1].quarter, Some(4));

        let filtered = normalize_activity(&t).unwrap();
        assert_eq!(filtered.rows.len(), 2);
    }

    #[test]
    fn quarterly_projection_without_periods_is_empty() {
        let t = table("prs_csv", &["name", "count"], &[&["Rust", "3"]]);
        assert!(quarterly_rows(&t).unwrap().is_empty());

        let t = table("prs_csv", &["name", "year", "quarter"], &[]);
        assert!(matches!(
            quarterly_rows(&t).unwrap_err(),
            LangpulseError::Schema { .. }
        ));
    }

    #[test]
    fn year_parsing_rejects_fractions() {
        assert_eq!(parse_year(Some("2022")), Some(2022));
        assert_eq!(parse_year(Some("2022.5")), None);
        assert_eq!(parse_year(None), None);
    }
}
