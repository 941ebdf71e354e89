use std::path::Path;

use langpulse_core::{ClusterConfig, LangpulseConfig, SourceConfig};
use langpulse_metrics::momentum::MomentumCategory;
use langpulse_metrics::run_pipeline;
use langpulse_source::SqliteSource;

fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn fixture(dir: &Path) -> SourceConfig {
    let issues = write(
        dir,
        "issues.csv",
        "name,year,quarter,count\n\
         Go,2022,1,100\n\
         Go,2023,1,150\n\
         Rust,2022,1,40\n\
         Rust,2023,1,120\n\
         Zig,2023,1,9\n\
         Cobol,2023,1,0\n",
    );
    let prs = write(
        dir,
        "prs.csv",
        "name,year,quarter,count\n\
         go,2022,1,10\n\
         go,2022,2,20\n\
         go,2022,3,15\n\
         go,2022,4,50\n\
         go,2023,1,5\n\
         swift,2022,1,40\n\
         swift,2022,2,40\n\
         swift,2022,3,40\n\
         swift,2022,4,40\n\
         swift,2023,1,40\n\
         elixir,2022,1,abc\n",
    );
    let repos = write(
        dir,
        "repos.csv",
        "language,num_repos\n\
         go,60\n\
         rust,30\n\
         swift,10\n\
         brainfuck,0\n",
    );
    SourceConfig {
        issues,
        prs,
        repos,
    }
}

fn config(sources: SourceConfig) -> LangpulseConfig {
    LangpulseConfig {
        sources,
        clusters: vec![
            ClusterConfig {
                name: "Mobile Development".into(),
                languages: vec!["swift".into(), "kotlin".into()],
            },
            ClusterConfig {
                name: "Systems Programming".into(),
                languages: vec!["go".into(), "rust".into(), "swift".into()],
            },
        ],
        ..LangpulseConfig::default()
    }
}

#[test]
fn full_run_over_csv_files() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(fixture(dir.path()));
    let source = SqliteSource::connect(&config.sources).unwrap();

    let report = run_pipeline(&source, &config).unwrap();

    assert_eq!(report.ingestion.issues.non_positive, 1);
    assert_eq!(report.ingestion.prs.non_positive, 1);
    assert_eq!(report.ingestion.repos.non_positive, 1);

    let languages: Vec<_> = report
        .activity
        .iter()
        .map(|r| r.language.as_str())
        .collect();
    assert_eq!(languages, vec!["go", "rust", "swift", "zig"]);
    assert_eq!(report.overview.total_repositories, 100);

    assert_eq!(report.market_leaders[0].language, "go");
    assert_eq!(report.market_leaders[0].market_share_pct, 60.0);

    assert_eq!(report.growth.latest_year, Some(2023));
    assert_eq!(report.growth.leaders[0].language_normalized, "rust");
    assert!(report
        .growth
        .trend
        .iter()
        .any(|r| r.language_normalized == "zig"));

    let go = report
        .momentum
        .iter()
        .find(|r| r.language == "go")
        .unwrap();
    assert_eq!(go.momentum_category, MomentumCategory::Accelerating);

    let swift: Vec<_> = report
        .competition
        .iter()
        .filter(|r| r.language == "swift")
        .collect();
    assert_eq!(swift.len(), 2);
    assert_eq!(report.share_evolution.len(), 2);

    assert_eq!(report.performance[0].language, "swift");
    assert_eq!(report.insights.top_volume, vec!["swift", "go"]);
}

#[test]
fn report_serializes_with_camel_case_keys() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(fixture(dir.path()));
    let source = SqliteSource::connect(&config.sources).unwrap();
    let report = run_pipeline(&source, &config).unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert!(json["marketLeaders"].is_array());
    assert_eq!(json["overview"]["languagesAnalyzed"], 4);
    assert!(json["growth"]["latestYear"].is_number());
}

#[test]
fn missing_count_column_fails_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let mut sources = fixture(dir.path());
    sources.issues = write(dir.path(), "bad.csv", "name,year,stars\ngo,2023,5\n");
    let config = config(sources);
    let source = SqliteSource::connect(&config.sources).unwrap();

    let err = run_pipeline(&source, &config).unwrap_err();
    assert!(err.to_string().contains("count"));
}

#[test]
fn trailing_zero_quarter_still_counts_as_an_observation() {
    let dir = tempfile::tempdir().unwrap();
    let mut sources = fixture(dir.path());
    sources.prs = write(
        dir.path(),
        "quiet.csv",
        "name,year,quarter,count\n\
         rust,2023,1,4\n\
         rust,2023,2,8\n\
         rust,2023,3,6\n\
         rust,2023,4,0\n",
    );
    let config = config(sources);
    let source = SqliteSource::connect(&config.sources).unwrap();
    let report = run_pipeline(&source, &config).unwrap();

    assert_eq!(report.ingestion.prs.non_positive, 1);
    let rust = report
        .activity
        .iter()
        .find(|r| r.language == "rust")
        .unwrap();
    assert_eq!(rust.total_prs, 18);

    let momentum = report
        .momentum
        .iter()
        .find(|r| r.language == "rust")
        .unwrap();
    assert_eq!(momentum.quarters, 4);
    assert_eq!(momentum.peak_to_current_ratio, 0.0);

    let performance = report
        .performance
        .iter()
        .find(|r| r.language == "rust")
        .unwrap();
    assert_eq!(performance.quarters_active, 4);
    assert_eq!(performance.min_quarter_prs, 0);
    assert_eq!(performance.overall_growth_pct, -100.0);

    let last = report
        .quarterly_prs
        .iter()
        .rev()
        .find(|r| r.language == "rust")
        .unwrap();
    assert_eq!(last.pr_count, 0);

    let competition = report
        .competition
        .iter()
        .find(|r| r.language == "rust")
        .unwrap();
    assert_eq!(competition.current_share_pct, 0.0);
}
