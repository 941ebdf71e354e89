//! Market share shifts between languages of the same cluster.
//!
//! Shares are taken against the total pull requests of all languages in each
//! quarter, so a language listed in several clusters gets one record per
//! cluster with the same share statistics.

use std::fmt;

use langpulse_core::ClusterConfig;
use serde::{Deserialize, Serialize};

use crate::series::{SharePoint, ShareSeries};
use crate::stats::{mean, sample_std};

/// Quarters of share history needed before a language is assessed.
pub const MIN_QUARTERS: usize = 3;

/// Quarters averaged at each end of the share trace.
const WINDOW: usize = 2;

/// Share-point change beyond which a language is gaining or losing.
const SHARE_CHANGE_THRESHOLD: f64 = 0.5;

/// Direction of a language's share within its cluster.
///
/// # Examples
///
/// ```
/// use langpulse_metrics::competition::CompetitiveStatus;
///
/// assert_eq!(CompetitiveStatus::from_share_change(0.6), CompetitiveStatus::Gaining);
/// assert_eq!(CompetitiveStatus::from_share_change(0.5), CompetitiveStatus::Stable);
/// assert_eq!(CompetitiveStatus::from_share_change(-0.6), CompetitiveStatus::Losing);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompetitiveStatus {
    /// Share rose by more than half a point.
    Gaining,
    /// Share moved by at most half a point.
    Stable,
    /// Share fell by more than half a point.
    Losing,
}

impl CompetitiveStatus {
    /// Classify a share-point change; both thresholds are strict.
    pub fn from_share_change(change: f64) -> Self {
        if change > SHARE_CHANGE_THRESHOLD {
            CompetitiveStatus::Gaining
        } else if change < -SHARE_CHANGE_THRESHOLD {
            CompetitiveStatus::Losing
        } else {
            CompetitiveStatus::Stable
        }
    }
}

impl fmt::Display for CompetitiveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompetitiveStatus::Gaining => write!(f, "Gaining"),
            CompetitiveStatus::Stable => write!(f, "Stable"),
            CompetitiveStatus::Losing => write!(f, "Losing"),
        }
    }
}

/// Share statistics of one language within one cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitionRecord {
    /// Normalized language key.
    pub language: String,
    /// Cluster display name.
    pub cluster: String,
    /// Mean share over all quarters.
    pub avg_market_share_pct: f64,
    /// Mean of the last two quarters minus mean of the first two.
    pub share_change_pct: f64,
    /// Share in the latest quarter.
    pub current_share_pct: f64,
    /// Highest quarterly share.
    pub peak_share_pct: f64,
    /// Sample standard deviation of the share.
    pub share_volatility: f64,
    /// Classification of `share_change_pct`.
    pub competitive_status: CompetitiveStatus,
}

/// A language's full share history, for plotting share evolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareTrace {
    /// Normalized language key.
    pub language: String,
    /// Names of every cluster listing the language.
    pub clusters: Vec<String>,
    /// Period-ordered shares.
    pub points: Vec<SharePoint>,
}

/// Assess one language's share trace, `None` below [`MIN_QUARTERS`].
///
/// # Examples
///
/// ```
/// use langpulse_core::Period;
/// use langpulse_metrics::competition::{language_competition, CompetitiveStatus};
/// use langpulse_metrics::series::SharePoint;
///
/// let trace: Vec<SharePoint> = [10.0, 12.0, 14.0]
///     .iter()
///     .enumerate()
///     .map(|(q, s)| SharePoint { period: Period::new(2023, q as u8 + 1), share_pct: *s })
///     .collect();
/// let record = language_competition("rust", "Systems Programming", &trace).unwrap();
/// assert_eq!(record.share_change_pct, 2.0);
/// assert_eq!(record.competitive_status, CompetitiveStatus::Gaining);
/// ```
pub fn language_competition(
    language: &str,
    cluster: &str,
    trace: &[SharePoint],
) -> Option<CompetitionRecord> {
    if trace.len() < MIN_QUARTERS {
        return None;
    }

    let shares: Vec<f64> = trace.iter().map(|p| p.share_pct).collect();
    let early = mean(&shares[..WINDOW])?;
    let recent = mean(&shares[shares.len() - WINDOW..])?;
    let share_change = recent - early;

    Some(CompetitionRecord {
        language: language.to_string(),
        cluster: cluster.to_string(),
        avg_market_share_pct: mean(&shares)?,
        share_change_pct: share_change,
        current_share_pct: *shares.last()?,
        peak_share_pct: shares.iter().copied().fold(f64::MIN, f64::max),
        share_volatility: sample_std(&shares).unwrap_or(0.0),
        competitive_status: CompetitiveStatus::from_share_change(share_change),
    })
}

/// Records for one cluster, in the cluster's member order.
pub fn analyze_cluster(cluster: &ClusterConfig, shares: &ShareSeries) -> Vec<CompetitionRecord> {
    cluster
        .languages
        .iter()
        .filter_map(|lang| {
            let trace = shares.trace(lang)?;
            language_competition(lang, &cluster.name, trace)
        })
        .collect()
}

/// Records for every cluster, cluster by cluster.
pub fn analyze_competition(
    clusters: &[ClusterConfig],
    shares: &ShareSeries,
) -> Vec<CompetitionRecord> {
    let records: Vec<CompetitionRecord> = clusters
        .iter()
        .flat_map(|cluster| analyze_cluster(cluster, shares))
        .collect();
    tracing::info!(
        clusters = clusters.len(),
        records = records.len(),
        "analyzed competitive clusters"
    );
    records
}

/// Share history of every clustered language that has data, in first-listed
/// order.
pub fn share_evolution(clusters: &[ClusterConfig], shares: &ShareSeries) -> Vec<ShareTrace> {
    let mut traces: Vec<ShareTrace> = Vec::new();
    for cluster in clusters {
        for lang in &cluster.languages {
            if let Some(existing) = traces.iter_mut().find(|t| &t.language == lang) {
                existing.clusters.push(cluster.name.clone());
                continue;
            }
            let Some(points) = shares.trace(lang) else {
                continue;
            };
            traces.push(ShareTrace {
                language: lang.clone(),
                clusters: vec![cluster.name.clone()],
                points: points.to_vec(),
            });
        }
    }
    traces
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::ActivityRow;
    use crate::series::QuarterlySeries;

    fn shares(rows: &[(&str, u8, u64)]) -> ShareSeries {
        let rows: Vec<ActivityRow> = rows
            .iter()
            .map(|(lang, quarter, count)| ActivityRow {
                language: lang.to_string(),
                year: Some(2023),
                quarter: Some(*quarter),
                count: *count,
            })
            .collect();
        QuarterlySeries::from_rows(&rows).market_shares()
    }

    fn cluster(name: &str, languages: &[&str]) -> ClusterConfig {
        ClusterConfig {
            name: name.into(),
            languages: languages.iter().map(|l| l.to_string()).collect(),
        }
    }

    fn sample() -> ShareSeries {
        shares(&[
            ("swift", 1, 20),
            ("swift", 2, 20),
            ("swift", 3, 40),
            ("kotlin", 1, 80),
            ("kotlin", 2, 80),
            ("kotlin", 3, 60),
        ])
    }

    #[test]
    fn overlapping_membership_yields_one_record_per_cluster() {
        let clusters = vec![
            cluster("Mobile Development", &["swift", "kotlin"]),
            cluster("Game Development", &["lua", "swift"]),
            cluster("Enterprise Software", &["swift"]),
        ];
        let records = analyze_competition(&clusters, &sample());
        let swift: Vec<_> = records.iter().filter(|r| r.language == "swift").collect();
        assert_eq!(swift.len(), 3);
        assert_eq!(swift[0].cluster, "Mobile Development");
        assert_eq!(swift[1].cluster, "Game Development");
        assert_eq!(swift[2].cluster, "Enterprise Software");
        assert_eq!(swift[0].share_change_pct, swift[2].share_change_pct);
    }

    #[test]
    fn share_statistics_follow_period_order() {
        let records = analyze_cluster(&cluster("Mobile", &["swift", "kotlin"]), &sample());
        let swift = &records[0];
        // shares 20, 20, 40
        assert!((swift.share_change_pct - 10.0).abs() < 1e-9);
        assert!((swift.current_share_pct - 40.0).abs() < 1e-9);
        assert!((swift.peak_share_pct - 40.0).abs() < 1e-9);
        assert_eq!(swift.competitive_status, CompetitiveStatus::Gaining);

        let kotlin = &records[1];
        assert_eq!(kotlin.competitive_status, CompetitiveStatus::Losing);
    }

    #[test]
    fn short_histories_and_absent_members_are_skipped() {
        let series = shares(&[("dart", 1, 5), ("dart", 2, 5)]);
        let records = analyze_cluster(&cluster("Mobile", &["dart", "flutter"]), &series);
        assert!(records.is_empty());
    }

    #[test]
    fn evolution_lists_each_language_once() {
        let clusters = vec![
            cluster("Mobile", &["swift", "kotlin"]),
            cluster("Enterprise", &["swift", "vb.net"]),
        ];
        let traces = share_evolution(&clusters, &sample());
        assert_eq!(traces.len(), 2);
        assert_eq!(traces[0].clusters, vec!["Mobile", "Enterprise"]);
        assert_eq!(traces[0].points.len(), 3);
    }
}
