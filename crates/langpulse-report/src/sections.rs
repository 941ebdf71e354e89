use std::fmt;
use std::str::FromStr;

use langpulse_core::{title_case, LangpulseError};
use langpulse_metrics::insights::Insights;
use langpulse_metrics::market::{page, page_count};
use langpulse_metrics::normalize::DropStats;
use langpulse_metrics::AnalyticsReport;
use serde_json::{Map, Value};

use crate::grid::{Align, Grid};
use crate::numbers::{signed, signed_thousands, thousands, two};
use crate::{Block, RenderOptions};

/// A selectable part of the report.
///
/// # Examples
///
/// ```
/// use langpulse_report::Section;
///
/// assert_eq!("momentum".parse::<Section>().unwrap(), Section::Momentum);
/// assert_eq!(Section::ALL.len(), 7);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    /// KPIs, ingestion counters and the composite activity table.
    Overview,
    /// Repository market leaders.
    Market,
    /// Yearly issue growth leaders.
    Growth,
    /// Quarterly pull request momentum.
    Momentum,
    /// Share competition within clusters.
    Competition,
    /// Volume and stability profiles.
    Performance,
    /// Highlights and validation stats.
    Insights,
}

impl Section {
    /// Every section in report order.
    pub const ALL: [Section; 7] = [
        Section::Overview,
        Section::Market,
        Section::Growth,
        Section::Momentum,
        Section::Competition,
        Section::Performance,
        Section::Insights,
    ];
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Section::Overview => "overview",
            Section::Market => "market",
            Section::Growth => "growth",
            Section::Momentum => "momentum",
            Section::Competition => "competition",
            Section::Performance => "performance",
            Section::Insights => "insights",
        };
        f.write_str(name)
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Section::ALL
            .iter()
            .find(|section| section.to_string() == s.to_lowercase())
            .copied()
            .ok_or_else(|| format!("unknown section: {s}"))
    }
}

pub(crate) fn insert_json(
    json: &mut Map<String, Value>,
    report: &AnalyticsReport,
    section: Section,
) -> Result<(), LangpulseError> {
    match section {
        Section::Overview => {
            json.insert("ingestion".into(), serde_json::to_value(&report.ingestion)?);
            json.insert("overview".into(), serde_json::to_value(&report.overview)?);
            json.insert("activity".into(), serde_json::to_value(&report.activity)?);
        }
        Section::Market => {
            json.insert(
                "marketLeaders".into(),
                serde_json::to_value(&report.market_leaders)?,
            );
        }
        Section::Growth => {
            json.insert("growth".into(), serde_json::to_value(&report.growth)?);
        }
        Section::Momentum => {
            json.insert(
                "quarterlyPrs".into(),
                serde_json::to_value(&report.quarterly_prs)?,
            );
            json.insert("momentum".into(), serde_json::to_value(&report.momentum)?);
        }
        Section::Competition => {
            json.insert(
                "competition".into(),
                serde_json::to_value(&report.competition)?,
            );
            json.insert(
                "shareEvolution".into(),
                serde_json::to_value(&report.share_evolution)?,
            );
        }
        Section::Performance => {
            json.insert(
                "performance".into(),
                serde_json::to_value(&report.performance)?,
            );
        }
        Section::Insights => {
            json.insert("insights".into(), serde_json::to_value(&report.insights)?);
        }
    }
    Ok(())
}

pub(crate) fn blocks(report: &AnalyticsReport, options: &RenderOptions) -> Vec<Block> {
    let mut out = Vec::new();
    for section in &options.sections {
        match section {
            Section::Overview => overview(report, options.limit, &mut out),
            Section::Market => out.push(market(report, options.leaders_page_size)),
            Section::Growth => out.push(growth(report, options.limit)),
            Section::Momentum => out.push(momentum(report, options.limit)),
            Section::Competition => competition(report, options.limit, &mut out),
            Section::Performance => out.push(performance(report, options.limit)),
            Section::Insights => out.push(insights(&report.insights)),
        }
    }
    out
}

fn names(languages: &[String]) -> String {
    languages
        .iter()
        .map(|l| title_case(l))
        .collect::<Vec<_>>()
        .join(", ")
}

fn ingestion_line(stats: &DropStats) -> String {
    format!(
        "kept {} of {} rows ({} non-positive, {} unnamed)",
        thousands(stats.kept() as u64),
        thousands(stats.total as u64),
        stats.non_positive,
        stats.missing_language
    )
}

fn overview(report: &AnalyticsReport, limit: usize, out: &mut Vec<Block>) {
    let kpis = &report.overview;
    out.push(
        Block::new("Performance Indicators", 2)
            .note("Languages analyzed", thousands(kpis.languages_analyzed as u64))
            .note("Total repositories", thousands(kpis.total_repositories))
            .note("Issues tracked", thousands(kpis.total_issues))
            .note("Pull requests", thousands(kpis.total_prs))
            .note(
                "Development efficiency",
                format!("{:.1}% PR-to-issue ratio", kpis.development_efficiency_pct),
            ),
    );

    let ingestion = &report.ingestion;
    out.push(
        Block::new("Ingestion", 3)
            .note("Issues", ingestion_line(&ingestion.issues))
            .note("Pull requests", ingestion_line(&ingestion.prs))
            .note("Repositories", ingestion_line(&ingestion.repos))
            .note("Records", thousands(ingestion.total_records as u64)),
    );

    let mut rows: Vec<_> = report.activity.iter().collect();
    rows.sort_by(|a, b| b.total_prs.cmp(&a.total_prs));

    let mut grid = Grid::new(&[
        ("Language", Align::Left),
        ("Issues", Align::Right),
        ("PRs", Align::Right),
        ("Repos", Align::Right),
        ("Velocity", Align::Right),
        ("Density", Align::Right),
        ("Activity", Align::Right),
        ("Health", Align::Right),
    ]);
    for r in rows.into_iter().take(limit) {
        grid.push(vec![
            title_case(&r.language),
            thousands(r.total_issues),
            thousands(r.total_prs),
            thousands(r.num_repos),
            two(r.development_velocity),
            two(r.issue_density),
            two(r.activity_ratio),
            two(r.ecosystem_health),
        ]);
    }
    out.push(Block::new("Language Activity", 3).grid(grid, "No activity data."));
}

fn market(report: &AnalyticsReport, page_size: usize) -> Block {
    let leaders = &report.market_leaders;
    let shown = page(leaders, page_size, 1);

    let mut grid = Grid::new(&[
        ("Rank", Align::Right),
        ("Language", Align::Left),
        ("Repositories", Align::Right),
        ("Share %", Align::Right),
    ]);
    for (i, leader) in shown.iter().enumerate() {
        grid.push(vec![
            (i + 1).to_string(),
            title_case(&leader.language),
            thousands(leader.num_repos),
            two(leader.market_share_pct),
        ]);
    }

    let mut block = Block::new("Market Leaders", 2);
    if !leaders.is_empty() {
        block = block.note(
            "Page",
            format!(
                "1 of {} ({} languages)",
                page_count(leaders.len(), page_size),
                leaders.len()
            ),
        );
    }
    block.grid(grid, "No repository data.")
}

fn growth(report: &AnalyticsReport, limit: usize) -> Block {
    let growth = &report.growth;
    let mut block = Block::new("Yearly Issue Growth", 2);
    match growth.latest_year {
        Some(year) => {
            block = block
                .note("Latest year", year.to_string())
                .note("Leaders", growth.leaders.len().to_string());
        }
        None => {
            block = block.note("Latest year", "none (no language has two years of data)");
        }
    }

    let mut grid = Grid::new(&[
        ("Language", Align::Left),
        ("Issues", Align::Right),
        ("Previous", Align::Right),
        ("Growth %", Align::Right),
        ("Change", Align::Right),
        ("Rank", Align::Left),
    ]);
    for leader in growth.leaders.iter().take(limit) {
        grid.push(vec![
            title_case(&leader.language_normalized),
            thousands(leader.issues_count),
            thousands(leader.prev_year_issues),
            signed(leader.growth_rate_pct),
            signed_thousands(leader.absolute_change),
            leader.rank.to_string(),
        ]);
    }
    block.grid(grid, "No growth data.")
}

fn momentum(report: &AnalyticsReport, limit: usize) -> Block {
    let mut grid = Grid::new(&[
        ("Language", Align::Left),
        ("Acceleration", Align::Right),
        ("Consistency", Align::Right),
        ("Recent %", Align::Right),
        ("Early %", Align::Right),
        ("Total PRs", Align::Right),
        ("Peak/Current", Align::Right),
        ("Category", Align::Left),
    ]);
    for r in report.momentum.iter().take(limit) {
        grid.push(vec![
            title_case(&r.language),
            signed(r.momentum_acceleration),
            two(r.growth_consistency_score),
            signed(r.recent_avg_growth_pct),
            signed(r.early_avg_growth_pct),
            thousands(r.total_prs),
            two(r.peak_to_current_ratio),
            r.momentum_category.to_string(),
        ]);
    }
    Block::new("Development Momentum", 2)
        .note("Languages", report.momentum.len().to_string())
        .grid(grid, "No language has four quarters of pull request data.")
}

fn competition(report: &AnalyticsReport, limit: usize, out: &mut Vec<Block>) {
    out.push(
        Block::new("Cluster Competition", 2)
            .note("Records", report.competition.len().to_string())
            .note("Tracked languages", report.share_evolution.len().to_string()),
    );

    let mut clusters: Vec<&str> = Vec::new();
    for record in &report.competition {
        if !clusters.contains(&record.cluster.as_str()) {
            clusters.push(&record.cluster);
        }
    }

    for cluster in clusters {
        let mut grid = Grid::new(&[
            ("Language", Align::Left),
            ("Avg Share %", Align::Right),
            ("Change", Align::Right),
            ("Current %", Align::Right),
            ("Peak %", Align::Right),
            ("Volatility", Align::Right),
            ("Status", Align::Left),
        ]);
        for r in report
            .competition
            .iter()
            .filter(|r| r.cluster == cluster)
            .take(limit)
        {
            grid.push(vec![
                title_case(&r.language),
                two(r.avg_market_share_pct),
                signed(r.share_change_pct),
                two(r.current_share_pct),
                two(r.peak_share_pct),
                two(r.share_volatility),
                r.competitive_status.to_string(),
            ]);
        }
        out.push(Block::new(cluster, 3).grid(grid, "No members with enough data."));
    }
}

fn performance(report: &AnalyticsReport, limit: usize) -> Block {
    let mut grid = Grid::new(&[
        ("Language", Align::Left),
        ("Total PRs", Align::Right),
        ("Avg/Quarter", Align::Right),
        ("Peak", Align::Right),
        ("Min", Align::Right),
        ("CV %", Align::Right),
        ("Growth %", Align::Right),
        ("Size", Align::Left),
        ("Stability", Align::Left),
        ("Quarters", Align::Right),
    ]);
    for r in report.performance.iter().take(limit) {
        grid.push(vec![
            title_case(&r.language),
            thousands(r.total_prs),
            two(r.avg_quarterly_prs),
            thousands(r.peak_quarter_prs),
            thousands(r.min_quarter_prs),
            two(r.coefficient_of_variation),
            signed(r.overall_growth_pct),
            r.size_category.to_string(),
            r.stability_category.to_string(),
            r.quarters_active.to_string(),
        ]);
    }
    Block::new("Performance Clustering", 2).grid(grid, "No performance data.")
}

fn insights(insights: &Insights) -> Block {
    let momentum = if insights.highest_momentum.is_empty() {
        "Insufficient data".to_string()
    } else {
        names(&insights.highest_momentum)
    };
    let gainers = if insights.competitive_gainers.is_empty() {
        "No competitive data available".to_string()
    } else {
        names(&insights.competitive_gainers)
    };
    let volume = if insights.top_volume.is_empty() {
        "Insufficient data".to_string()
    } else {
        names(&insights.top_volume)
    };

    let mut block = Block::new("Results", 2)
        .note("Highest momentum languages", momentum)
        .note("Most competitive gainers", gainers)
        .note("Top volume languages", volume);

    if let Some(dist) = &insights.momentum_distribution {
        let std = dist.std.map_or_else(|| "n/a".to_string(), |s| format!("{s:.2}%"));
        block = block
            .note(
                "Momentum distribution",
                format!("Mean = {:.2}%, Std = {std}", dist.mean),
            )
            .note(
                "Significant acceleration",
                format!("{} out of {}", dist.significant, dist.total),
            );
    }
    if let Some(variability) = &insights.performance_variability {
        block = block.note(
            "Performance variability",
            format!(
                "Mean = {:.1}%, languages with high stability: {}",
                variability.mean_cv, variability.highly_stable
            ),
        );
    }
    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use langpulse_metrics::growth::{GrowthLeader, GrowthReport, LeaderRank};
    use langpulse_metrics::market::MarketShare;
    use langpulse_metrics::momentum::language_momentum;

    fn report() -> AnalyticsReport {
        AnalyticsReport {
            market_leaders: (0..12)
                .map(|i| MarketShare {
                    language: format!("lang{i}"),
                    num_repos: 10,
                    market_share_pct: 8.33,
                })
                .collect(),
            growth: GrowthReport {
                latest_year: Some(2023),
                trend: Vec::new(),
                leaders: vec![GrowthLeader {
                    language_normalized: "objective-c".into(),
                    issues_count: 1500,
                    prev_year_issues: 1000,
                    growth_rate_pct: 50.0,
                    absolute_change: 500,
                    rank: LeaderRank::Growth(1),
                }],
            },
            momentum: vec![language_momentum("go", &[10, 20, 15, 50, 5]).unwrap()],
            ..AnalyticsReport::default()
        }
    }

    #[test]
    fn section_names_round_trip() {
        for section in Section::ALL {
            assert_eq!(section.to_string().parse::<Section>(), Ok(section));
        }
        assert!("charts".parse::<Section>().is_err());
    }

    #[test]
    fn market_shows_first_page_only() {
        let block = market(&report(), 10);
        assert_eq!(block.grid.as_ref().map(Grid::len), Some(10));
        assert_eq!(block.notes[0].1, "1 of 2 (12 languages)");
    }

    #[test]
    fn growth_rows_carry_rank_labels() {
        let block = growth(&report(), 20);
        let md = block.grid.as_ref().map(Grid::to_markdown).unwrap_or_default();
        assert!(md.contains("Objective-C"));
        assert!(md.contains("+50.00"));
        assert!(md.contains("+500"));
        assert!(md.contains("Growth Rank: 1"));
    }

    #[test]
    fn momentum_rows_show_category() {
        let text = momentum(&report(), 20)
            .grid
            .as_ref()
            .map(Grid::to_text)
            .unwrap_or_default();
        assert!(text.contains("Go"));
        assert!(text.contains("+14.44"));
        assert!(text.contains("Accelerating"));
    }

    #[test]
    fn insights_fall_back_when_empty() {
        let block = insights(&Insights::default());
        assert_eq!(block.notes[1].1, "No competitive data available");
        assert_eq!(block.notes.len(), 3);
    }
}
