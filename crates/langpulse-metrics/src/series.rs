//! Quarterly pull request series and per-period market share.

use std::collections::BTreeMap;

use langpulse_core::Period;
use serde::{Deserialize, Serialize};

use crate::normalize::ActivityRow;

/// Pull requests for one language in one quarter.
///
/// # Examples
///
/// ```
/// use langpulse_core::Period;
/// use langpulse_metrics::series::QuarterlyPrRecord;
///
/// let record = QuarterlyPrRecord {
///     language: "rust".into(),
///     period: Period::new(2023, 2),
///     pr_count: 1200,
/// };
/// assert_eq!(record.period.to_string(), "2023-Q2");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuarterlyPrRecord {
    /// Normalized language key.
    pub language: String,
    /// Year and quarter.
    pub period: Period,
    /// Pull requests opened in the period.
    pub pr_count: u64,
}

/// One point of a market share trace.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharePoint {
    /// Year and quarter.
    pub period: Period,
    /// Share of all pull requests in the period, in percent.
    pub share_pct: f64,
}

/// Per-language quarterly pull request counts, ordered by (language, period).
///
/// Rows repeating the same (language, period) are summed. Rows without a
/// parseable year and quarter are ignored.
///
/// # Examples
///
/// ```
/// use langpulse_metrics::normalize::ActivityRow;
/// use langpulse_metrics::series::QuarterlySeries;
///
/// let rows = vec![
///     ActivityRow { language: "go".into(), year: Some(2023), quarter: Some(2), count: 5 },
///     ActivityRow { language: "go".into(), year: Some(2023), quarter: Some(1), count: 3 },
/// ];
/// let series = QuarterlySeries::from_rows(&rows);
/// assert_eq!(series.counts("go"), Some(vec![3, 5]));
/// ```
#[derive(Debug, Clone, Default)]
pub struct QuarterlySeries {
    languages: BTreeMap<String, BTreeMap<Period, u64>>,
}

impl QuarterlySeries {
    /// Build the series from normalized pull request rows.
    pub fn from_rows(rows: &[ActivityRow]) -> Self {
        let mut languages: BTreeMap<String, BTreeMap<Period, u64>> = BTreeMap::new();
        let mut skipped = 0usize;
        for row in rows {
            let (Some(year), Some(quarter)) = (row.year, row.quarter) else {
                skipped += 1;
                continue;
            };
            let count = languages
                .entry(row.language.clone())
                .or_default()
                .entry(Period::new(year, quarter))
                .or_default();
            *count = count.saturating_add(row.count);
        }
        if skipped > 0 {
            tracing::debug!(skipped, "rows without a year and quarter left out of quarterly series");
        }
        Self { languages }
    }

    /// Number of languages with at least one observation.
    pub fn len(&self) -> usize {
        self.languages.len()
    }

    /// Whether the series holds no observations.
    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }

    /// Language keys in ascending order.
    pub fn language_names(&self) -> impl Iterator<Item = &str> {
        self.languages.keys().map(String::as_str)
    }

    /// Period-ordered counts for one language.
    pub fn counts(&self, language: &str) -> Option<Vec<u64>> {
        self.languages
            .get(language)
            .map(|points| points.values().copied().collect())
    }

    /// `(language, period-ordered counts)` for every language, ascending by name.
    pub fn iter_counts(&self) -> impl Iterator<Item = (&str, Vec<u64>)> {
        self.languages
            .iter()
            .map(|(lang, points)| (lang.as_str(), points.values().copied().collect()))
    }

    /// Flattened records ordered by (language, year, quarter).
    pub fn records(&self) -> Vec<QuarterlyPrRecord> {
        self.languages
            .iter()
            .flat_map(|(lang, points)| {
                points.iter().map(move |(period, count)| QuarterlyPrRecord {
                    language: lang.clone(),
                    period: *period,
                    pr_count: *count,
                })
            })
            .collect()
    }

    /// Total pull requests across all languages per period.
    pub fn period_totals(&self) -> BTreeMap<Period, u64> {
        let mut totals: BTreeMap<Period, u64> = BTreeMap::new();
        for points in self.languages.values() {
            for (period, count) in points {
                let total = totals.entry(*period).or_default();
                *total = total.saturating_add(*count);
            }
        }
        totals
    }

    /// Each language's share of the period total, period-ordered.
    ///
    /// Shares of all languages present in one period sum to 100.
    pub fn market_shares(&self) -> ShareSeries {
        let totals = self.period_totals();
        let languages = self
            .languages
            .iter()
            .map(|(lang, points)| {
                let trace = points
                    .iter()
                    .map(|(period, count)| {
                        let total = totals.get(period).copied().unwrap_or(0);
                        let share_pct = if total > 0 {
                            *count as f64 / total as f64 * 100.0
                        } else {
                            0.0
                        };
                        SharePoint {
                            period: *period,
                            share_pct,
                        }
                    })
                    .collect();
                (lang.clone(), trace)
            })
            .collect();
        ShareSeries { languages }
    }
}

/// Per-language market share traces.
#[derive(Debug, Clone, Default)]
pub struct ShareSeries {
    languages: BTreeMap<String, Vec<SharePoint>>,
}

impl ShareSeries {
    /// Period-ordered share trace for one language.
    pub fn trace(&self, language: &str) -> Option<&[SharePoint]> {
        self.languages.get(language).map(Vec::as_slice)
    }

    /// Sum of shares of every language in `period`.
    pub fn period_sum(&self, period: Period) -> f64 {
        self.languages
            .values()
            .flat_map(|trace| trace.iter())
            .filter(|p| p.period == period)
            .map(|p| p.share_pct)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(lang: &str, year: i32, quarter: u8, count: u64) -> ActivityRow {
        ActivityRow {
            language: lang.into(),
            year: Some(year),
            quarter: Some(quarter),
            count,
        }
    }

    #[test]
    fn duplicate_periods_are_summed_and_ordered() {
        let rows = vec![
            row("rust", 2023, 2, 10),
            row("rust", 2022, 4, 7),
            row("rust", 2023, 2, 5),
        ];
        let series = QuarterlySeries::from_rows(&rows);
        assert_eq!(series.counts("rust"), Some(vec![7, 15]));
        let records = series.records();
        assert_eq!(records[0].period, Period::new(2022, 4));
        assert_eq!(records[1].pr_count, 15);
    }

    #[test]
    fn huge_counts_saturate_per_period_and_in_totals() {
        let rows = vec![
            row("go", 2023, 1, u64::MAX),
            row("go", 2023, 1, u64::MAX),
            row("rust", 2023, 1, 10),
        ];
        let series = QuarterlySeries::from_rows(&rows);
        assert_eq!(series.counts("go"), Some(vec![u64::MAX]));
        assert_eq!(series.period_totals()[&Period::new(2023, 1)], u64::MAX);
    }

    #[test]
    fn rows_without_period_are_ignored() {
        let rows = vec![ActivityRow {
            language: "go".into(),
            year: Some(2023),
            quarter: None,
            count: 4,
        }];
        assert!(QuarterlySeries::from_rows(&rows).is_empty());
    }

    #[test]
    fn shares_in_a_period_sum_to_one_hundred() {
        let rows = vec![
            row("rust", 2023, 1, 30),
            row("go", 2023, 1, 10),
            row("zig", 2023, 1, 60),
            row("rust", 2023, 2, 1),
            row("go", 2023, 2, 2),
        ];
        let shares = QuarterlySeries::from_rows(&rows).market_shares();
        assert!((shares.period_sum(Period::new(2023, 1)) - 100.0).abs() < 1e-9);
        assert!((shares.period_sum(Period::new(2023, 2)) - 100.0).abs() < 1e-9);
        let rust = shares.trace("rust").unwrap();
        assert!((rust[0].share_pct - 30.0).abs() < 1e-9);
    }
}
