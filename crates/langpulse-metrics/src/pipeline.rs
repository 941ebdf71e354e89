//! The full analysis, stage by stage.
//!
//! ```text
//! load -> normalize -> aggregate -> market leaders -> yearly growth
//!      -> quarterly series -> momentum -> competition -> performance -> insights
//! ```
//!
//! Each stage reads the previous stages' output by reference and returns a
//! fresh value; nothing is shared or mutated between stages.

use langpulse_core::{LangpulseConfig, LangpulseError, ISSUES_TABLE, PRS_TABLE, REPOS_TABLE};
use langpulse_source::DataSource;
use serde::Serialize;

use crate::aggregate::{build_activity_table, LanguageActivityRecord};
use crate::competition::{analyze_competition, share_evolution, CompetitionRecord, ShareTrace};
use crate::growth::{analyze_growth, GrowthReport};
use crate::insights::{build_insights, Insights, OverviewKpis};
use crate::market::{market_leaders, MarketShare};
use crate::momentum::{analyze_momentum, MomentumRecord};
use crate::normalize::{normalize_activity, normalize_repos, quarterly_rows, DropStats};
use crate::performance::{analyze_performance, PerformanceRecord};
use crate::series::{QuarterlyPrRecord, QuarterlySeries};

/// Rows read and dropped per input table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionSummary {
    /// Issue table counters.
    pub issues: DropStats,
    /// Pull request table counters.
    pub prs: DropStats,
    /// Repository table counters.
    pub repos: DropStats,
    /// Rows kept across all three tables.
    pub total_records: usize,
}

/// Everything one run produces.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    /// Ingestion counters.
    pub ingestion: IngestionSummary,
    /// Dashboard totals.
    pub overview: OverviewKpis,
    /// Composite per-language table.
    pub activity: Vec<LanguageActivityRecord>,
    /// Repository market share, by share descending.
    pub market_leaders: Vec<MarketShare>,
    /// Yearly issue growth.
    pub growth: GrowthReport,
    /// Quarterly pull request counts.
    pub quarterly_prs: Vec<QuarterlyPrRecord>,
    /// Momentum, by acceleration descending.
    pub momentum: Vec<MomentumRecord>,
    /// Cluster competition, cluster by cluster.
    pub competition: Vec<CompetitionRecord>,
    /// Share history of clustered languages.
    pub share_evolution: Vec<ShareTrace>,
    /// Performance profiles, by total descending.
    pub performance: Vec<PerformanceRecord>,
    /// Headlines and validation stats.
    pub insights: Insights,
}

/// Run every stage against `source`.
///
/// # Errors
///
/// Returns [`LangpulseError::Source`] when a table cannot be read and
/// [`LangpulseError::Schema`] when a required column is missing.
pub fn run_pipeline(
    source: &dyn DataSource,
    config: &LangpulseConfig,
) -> Result<AnalyticsReport, LangpulseError> {
    let issues_table = source.get_table(ISSUES_TABLE)?;
    let prs_table = source.get_table(PRS_TABLE)?;
    let repos_table = source.get_table(REPOS_TABLE)?;

    let issues = normalize_activity(&issues_table)?;
    let prs = normalize_activity(&prs_table)?;
    let repos = normalize_repos(&repos_table)?;
    let ingestion = IngestionSummary {
        issues: issues.dropped,
        prs: prs.dropped,
        repos: repos.dropped,
        total_records: issues.rows.len() + prs.rows.len() + repos.rows.len(),
    };

    let activity = build_activity_table(&issues.rows, &prs.rows, &repos.rows);
    let overview = OverviewKpis::from_activity(&activity);
    let leaders = market_leaders(source, REPOS_TABLE)?;
    let growth = analyze_growth(&issues.rows, config.analysis.growth_top_n);

    // zero-count quarters still count as observations
    let series = QuarterlySeries::from_rows(&quarterly_rows(&prs_table)?);
    let momentum = analyze_momentum(&series);

    let clusters = config.resolved_clusters();
    let shares = series.market_shares();
    let competition = analyze_competition(&clusters, &shares);
    let evolution = share_evolution(&clusters, &shares);

    let performance = analyze_performance(&series);
    let insights = build_insights(
        &momentum,
        &competition,
        &performance,
        config.analysis.insight_top_n,
    );

    tracing::info!(
        records = ingestion.total_records,
        languages = activity.len(),
        "analysis complete"
    );

    Ok(AnalyticsReport {
        ingestion,
        overview,
        activity,
        market_leaders: leaders,
        growth,
        quarterly_prs: series.records(),
        momentum,
        competition,
        share_evolution: evolution,
        performance,
        insights,
    })
}
