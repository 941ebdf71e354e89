//! Year-over-year issue growth.
//!
//! Builds the per-language yearly issue series, derives growth against the
//! previous observed year, and ranks the latest year's languages both by
//! growth rate and by absolute increase.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::normalize::ActivityRow;
use crate::stats::min_ranks_desc;

/// Issues for one language in one year.
///
/// `prev_year_issues` and `growth_rate_pct` are `None` on a language's first
/// observed year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyIssueRecord {
    /// Normalized language key.
    pub language_normalized: String,
    /// Calendar year.
    pub year: i32,
    /// Issues counted in the year.
    pub issues_count: u64,
    /// Issues in the language's previous observed year.
    pub prev_year_issues: Option<u64>,
    /// `(issues_count - prev) / prev * 100`.
    pub growth_rate_pct: Option<f64>,
}

/// Which ranking put a language in the leaders table.
///
/// # Examples
///
/// ```
/// use langpulse_metrics::growth::LeaderRank;
///
/// assert_eq!(LeaderRank::Growth(2).to_string(), "Growth Rank: 2");
/// assert_eq!(LeaderRank::Absolute(7).to_string(), "Absolute Rank: 7");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LeaderRank {
    /// Rank by growth rate among the growth top list.
    Growth(u32),
    /// Rank by absolute increase among the absolute top list.
    Absolute(u32),
}

impl fmt::Display for LeaderRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeaderRank::Growth(rank) => write!(f, "Growth Rank: {rank}"),
            LeaderRank::Absolute(rank) => write!(f, "Absolute Rank: {rank}"),
        }
    }
}

/// A latest-year language from either top list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthLeader {
    /// Normalized language key.
    pub language_normalized: String,
    /// Issues in the latest year.
    pub issues_count: u64,
    /// Issues in the previous observed year.
    pub prev_year_issues: u64,
    /// Growth rate in percent.
    pub growth_rate_pct: f64,
    /// `issues_count - prev_year_issues`.
    pub absolute_change: i64,
    /// Ranking that selected this language.
    pub rank: LeaderRank,
}

/// Yearly trend series plus the latest-year leaders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthReport {
    /// Latest year with a growth observation.
    pub latest_year: Option<i32>,
    /// Every (language, year) point, including first years without growth.
    pub trend: Vec<YearlyIssueRecord>,
    /// Leaders of the latest year, by growth rate descending.
    pub leaders: Vec<GrowthLeader>,
}

impl GrowthReport {
    /// Records that carry a growth rate.
    pub fn growth_rows(&self) -> impl Iterator<Item = &YearlyIssueRecord> {
        self.trend.iter().filter(|r| r.growth_rate_pct.is_some())
    }
}

/// Build the yearly issue series ordered by (language, year).
///
/// Exact duplicate (language, year, count) rows are counted once before
/// summing; rows without a year are ignored.
///
/// # Examples
///
/// ```
/// use langpulse_metrics::growth::yearly_issue_series;
/// use langpulse_metrics::normalize::ActivityRow;
///
/// let rows = vec![
///     ActivityRow { language: "go".into(), year: Some(2022), quarter: None, count: 10 },
///     ActivityRow { language: "go".into(), year: Some(2023), quarter: None, count: 15 },
/// ];
/// let series = yearly_issue_series(&rows);
/// assert_eq!(series[0].growth_rate_pct, None);
/// assert_eq!(series[1].growth_rate_pct, Some(50.0));
/// ```
pub fn yearly_issue_series(rows: &[ActivityRow]) -> Vec<YearlyIssueRecord> {
    let distinct: BTreeSet<(&str, i32, u64)> = rows
        .iter()
        .filter_map(|r| r.year.map(|year| (r.language.as_str(), year, r.count)))
        .collect();

    let mut yearly: BTreeMap<(&str, i32), u64> = BTreeMap::new();
    for (lang, year, count) in distinct {
        let total = yearly.entry((lang, year)).or_default();
        *total = total.saturating_add(count);
    }

    let mut out = Vec::with_capacity(yearly.len());
    let mut previous: Option<(&str, u64)> = None;
    for ((lang, year), issues_count) in yearly {
        let prev_year_issues = match previous {
            Some((prev_lang, prev_count)) if prev_lang == lang => Some(prev_count),
            _ => None,
        };
        let growth_rate_pct = prev_year_issues
            .filter(|prev| *prev > 0)
            .map(|prev| (issues_count as f64 - prev as f64) / prev as f64 * 100.0);

        out.push(YearlyIssueRecord {
            language_normalized: lang.to_string(),
            year,
            issues_count,
            prev_year_issues,
            growth_rate_pct,
        });
        previous = Some((lang, issues_count));
    }
    out
}

/// Analyze issue growth, keeping `top_n` languages per ranking.
///
/// # Examples
///
/// ```
/// use langpulse_metrics::growth::analyze_growth;
/// use langpulse_metrics::normalize::ActivityRow;
///
/// let row = |lang: &str, year, count| ActivityRow {
///     language: lang.into(), year: Some(year), quarter: None, count,
/// };
/// let report = analyze_growth(&[row("go", 2022, 10), row("go", 2023, 20), row("zig", 2023, 5)], 100);
/// assert_eq!(report.latest_year, Some(2023));
/// assert_eq!(report.leaders.len(), 1);
/// assert_eq!(report.trend.len(), 3);
/// ```
pub fn analyze_growth(rows: &[ActivityRow], top_n: usize) -> GrowthReport {
    let trend = yearly_issue_series(rows);

    let latest_year = trend
        .iter()
        .filter(|r| r.growth_rate_pct.is_some())
        .map(|r| r.year)
        .max();

    let Some(latest) = latest_year else {
        tracing::info!("no language has two observed years; growth table is empty");
        return GrowthReport {
            latest_year: None,
            trend,
            leaders: Vec::new(),
        };
    };

    // (record, growth, absolute change) for the latest year, language order
    let latest_rows: Vec<(&YearlyIssueRecord, f64, i64, u64)> = trend
        .iter()
        .filter(|r| r.year == latest)
        .filter_map(|r| {
            let growth = r.growth_rate_pct?;
            let prev = r.prev_year_issues?;
            Some((r, growth, absolute_change(r.issues_count, prev), prev))
        })
        .collect();

    let mut by_growth = latest_rows.clone();
    by_growth.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    by_growth.truncate(top_n);
    let growth_ranks = min_ranks_desc(&by_growth.iter().map(|r| r.1).collect::<Vec<_>>());

    let mut by_absolute = latest_rows;
    by_absolute.sort_by(|a, b| b.2.cmp(&a.2));
    by_absolute.truncate(top_n);
    let absolute_ranks =
        min_ranks_desc(&by_absolute.iter().map(|r| r.2 as f64).collect::<Vec<_>>());

    let mut seen: HashSet<&str> = HashSet::new();
    let mut leaders = Vec::with_capacity(by_growth.len() + by_absolute.len());
    let ranked = by_growth
        .iter()
        .zip(growth_ranks)
        .map(|(r, rank)| (r, LeaderRank::Growth(rank)))
        .chain(
            by_absolute
                .iter()
                .zip(absolute_ranks)
                .map(|(r, rank)| (r, LeaderRank::Absolute(rank))),
        );
    for ((record, growth, change, prev), rank) in ranked {
        if !seen.insert(record.language_normalized.as_str()) {
            continue;
        }
        leaders.push(GrowthLeader {
            language_normalized: record.language_normalized.clone(),
            issues_count: record.issues_count,
            prev_year_issues: *prev,
            growth_rate_pct: *growth,
            absolute_change: *change,
            rank,
        });
    }
    leaders.sort_by(|a, b| {
        b.growth_rate_pct
            .partial_cmp(&a.growth_rate_pct)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    tracing::info!(
        latest_year = latest,
        leaders = leaders.len(),
        "ranked yearly issue growth"
    );

    GrowthReport {
        latest_year,
        trend,
        leaders,
    }
}

/// `current - prev`, clamped to the `i64` range.
fn absolute_change(current: u64, prev: u64) -> i64 {
    let diff = i128::from(current) - i128::from(prev);
    i64::try_from(diff).unwrap_or(if diff > 0 { i64::MAX } else { i64::MIN })
}
