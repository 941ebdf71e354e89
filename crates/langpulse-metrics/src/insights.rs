//! Headline numbers: dashboard KPIs, result highlights and validation stats.

use serde::{Deserialize, Serialize};

use crate::aggregate::LanguageActivityRecord;
use crate::competition::CompetitionRecord;
use crate::momentum::MomentumRecord;
use crate::performance::PerformanceRecord;
use crate::stats::{mean, sample_std, saturating_total};

/// CV below which a language counts as highly stable.
const STABLE_CV: f64 = 50.0;

/// Dashboard totals over the composite activity table.
///
/// # Examples
///
/// ```
/// use langpulse_metrics::aggregate::LanguageActivityRecord;
/// use langpulse_metrics::insights::OverviewKpis;
///
/// let table = vec![
///     LanguageActivityRecord::new("go".into(), 9, 45, 2),
///     LanguageActivityRecord::new("zig".into(), 0, 5, 1),
/// ];
/// let kpis = OverviewKpis::from_activity(&table);
/// assert_eq!(kpis.languages_analyzed, 2);
/// assert_eq!(kpis.total_repositories, 3);
/// assert_eq!(kpis.development_efficiency_pct, 500.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewKpis {
    /// Languages in the composite table.
    pub languages_analyzed: usize,
    /// Sum of repository counts.
    pub total_repositories: u64,
    /// Sum of issue counts.
    pub total_issues: u64,
    /// Sum of pull request counts.
    pub total_prs: u64,
    /// `total_prs / (total_issues + 1) * 100`.
    pub development_efficiency_pct: f64,
}

impl OverviewKpis {
    /// Sum the composite table.
    pub fn from_activity(activity: &[LanguageActivityRecord]) -> Self {
        let total_repositories = saturating_total(activity.iter().map(|r| r.num_repos));
        let total_issues = saturating_total(activity.iter().map(|r| r.total_issues));
        let total_prs = saturating_total(activity.iter().map(|r| r.total_prs));
        Self {
            languages_analyzed: activity.len(),
            total_repositories,
            total_issues,
            total_prs,
            development_efficiency_pct: total_prs as f64 / (total_issues as f64 + 1.0) * 100.0,
        }
    }
}

/// Spread of momentum acceleration across languages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MomentumDistribution {
    /// Mean acceleration.
    pub mean: f64,
    /// Sample standard deviation, absent with a single language.
    pub std: Option<f64>,
    /// Languages accelerating faster than mean + std.
    pub significant: usize,
    /// Languages with a momentum record.
    pub total: usize,
}

/// Spread of the coefficient of variation across languages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceVariability {
    /// Mean coefficient of variation.
    pub mean_cv: f64,
    /// Languages with a CV below 50.
    pub highly_stable: usize,
}

/// Highlights and validation statistics for the closing section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insights {
    /// Languages with the highest acceleration.
    pub highest_momentum: Vec<String>,
    /// Cluster records with the largest share change; a language may repeat
    /// once per cluster.
    pub competitive_gainers: Vec<String>,
    /// Languages with the most pull requests.
    pub top_volume: Vec<String>,
    /// Absent without momentum records.
    pub momentum_distribution: Option<MomentumDistribution>,
    /// Absent without performance records.
    pub performance_variability: Option<PerformanceVariability>,
}

/// Summarize momentum stats, `None` when there are no records.
///
/// # Examples
///
/// ```
/// use langpulse_metrics::insights::momentum_distribution;
/// use langpulse_metrics::momentum::language_momentum;
///
/// let one = language_momentum("go", &[10, 20, 15, 50, 5]).unwrap();
/// let dist = momentum_distribution(&[one]).unwrap();
/// assert!(dist.std.is_none());
/// assert_eq!(dist.significant, 0);
/// ```
pub fn momentum_distribution(momentum: &[MomentumRecord]) -> Option<MomentumDistribution> {
    let values: Vec<f64> = momentum.iter().map(|r| r.momentum_acceleration).collect();
    let avg = mean(&values)?;
    let std = sample_std(&values);
    let significant = match std {
        Some(std) => values.iter().filter(|v| **v > avg + std).count(),
        None => 0,
    };
    Some(MomentumDistribution {
        mean: avg,
        std,
        significant,
        total: values.len(),
    })
}

/// Summarize performance CVs, `None` when there are no records.
pub fn performance_variability(performance: &[PerformanceRecord]) -> Option<PerformanceVariability> {
    let cvs: Vec<f64> = performance
        .iter()
        .map(|r| r.coefficient_of_variation)
        .collect();
    Some(PerformanceVariability {
        mean_cv: mean(&cvs)?,
        highly_stable: cvs.iter().filter(|cv| **cv < STABLE_CV).count(),
    })
}

/// Build the highlights, naming `top_n` languages per list.
///
/// `momentum` and `performance` are expected in their analyzer order
/// (acceleration and total descending).
pub fn build_insights(
    momentum: &[MomentumRecord],
    competition: &[CompetitionRecord],
    performance: &[PerformanceRecord],
    top_n: usize,
) -> Insights {
    let mut gainers: Vec<&CompetitionRecord> = competition.iter().collect();
    gainers.sort_by(|a, b| {
        b.share_change_pct
            .partial_cmp(&a.share_change_pct)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    Insights {
        highest_momentum: momentum
            .iter()
            .take(top_n)
            .map(|r| r.language.clone())
            .collect(),
        competitive_gainers: gainers
            .into_iter()
            .take(top_n)
            .map(|r| r.language.clone())
            .collect(),
        top_volume: performance
            .iter()
            .take(top_n)
            .map(|r| r.language.clone())
            .collect(),
        momentum_distribution: momentum_distribution(momentum),
        performance_variability: performance_variability(performance),
    }
}
