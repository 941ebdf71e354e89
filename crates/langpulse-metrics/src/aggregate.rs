//! Composite per-language activity table.
//!
//! Outer-joins issue totals, pull request totals and repository counts on the
//! normalized language key and derives ratio metrics. Every ratio adds one to
//! its denominator so languages without issues or repositories still score.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::normalize::{ActivityRow, RepoRow};

/// Combined activity for one language.
///
/// # Examples
///
/// ```
/// use langpulse_metrics::aggregate::LanguageActivityRecord;
///
/// let record = LanguageActivityRecord::new("rust".into(), 9, 40, 4);
/// assert_eq!(record.development_velocity, 8.0);
/// assert_eq!(record.activity_ratio, 4.0);
/// assert_eq!(record.ecosystem_health, 8.4);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageActivityRecord {
    /// Normalized language key.
    pub language: String,
    /// Sum of issue counts.
    pub total_issues: u64,
    /// Sum of pull request counts.
    pub total_prs: u64,
    /// Repository count.
    pub num_repos: u64,
    /// `total_prs / (num_repos + 1)`.
    pub development_velocity: f64,
    /// `total_issues / (num_repos + 1)`.
    pub issue_density: f64,
    /// `total_prs / (total_issues + 1)`.
    pub activity_ratio: f64,
    /// `(2 * total_prs + num_repos) / (total_issues + 1)`.
    pub ecosystem_health: f64,
}

impl LanguageActivityRecord {
    /// Build a record and derive its ratios.
    pub fn new(language: String, total_issues: u64, total_prs: u64, num_repos: u64) -> Self {
        let issues = total_issues as f64;
        let prs = total_prs as f64;
        let repos = num_repos as f64;
        Self {
            language,
            total_issues,
            total_prs,
            num_repos,
            development_velocity: prs / (repos + 1.0),
            issue_density: issues / (repos + 1.0),
            activity_ratio: prs / (issues + 1.0),
            ecosystem_health: (prs * 2.0 + repos) / (issues + 1.0),
        }
    }
}

#[derive(Default)]
struct Totals {
    issues: u64,
    prs: u64,
    repos: u64,
}

/// Outer-join the three inputs into one record per language.
///
/// Records are ordered by language key. Repository rows repeating a
/// language are summed.
///
/// # Examples
///
/// ```
/// use langpulse_metrics::aggregate::build_activity_table;
/// use langpulse_metrics::normalize::{ActivityRow, RepoRow};
///
/// let issues = vec![ActivityRow { language: "go".into(), year: None, quarter: None, count: 3 }];
/// let repos = vec![RepoRow { language: "zig".into(), num_repos: 2 }];
/// let table = build_activity_table(&issues, &[], &repos);
/// assert_eq!(table.len(), 2);
/// assert_eq!(table[1].language, "zig");
/// assert_eq!(table[1].total_issues, 0);
/// ```
pub fn build_activity_table(
    issues: &[ActivityRow],
    prs: &[ActivityRow],
    repos: &[RepoRow],
) -> Vec<LanguageActivityRecord> {
    let mut totals: BTreeMap<&str, Totals> = BTreeMap::new();

    for row in issues {
        let t = totals.entry(&row.language).or_default();
        t.issues = t.issues.saturating_add(row.count);
    }
    for row in prs {
        let t = totals.entry(&row.language).or_default();
        t.prs = t.prs.saturating_add(row.count);
    }
    for row in repos {
        let t = totals.entry(&row.language).or_default();
        t.repos = t.repos.saturating_add(row.num_repos);
    }

    let records: Vec<LanguageActivityRecord> = totals
        .into_iter()
        .map(|(lang, t)| LanguageActivityRecord::new(lang.to_string(), t.issues, t.prs, t.repos))
        .collect();

    tracing::info!(languages = records.len(), "built composite activity table");
    records
}
