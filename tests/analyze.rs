use std::path::Path;
use std::process::{Command, Output};

fn write_inputs(dir: &Path) {
    std::fs::write(
        dir.join("issues.csv"),
        "name,year,quarter,count\n\
         python,2022,1,300\n\
         python,2023,1,360\n\
         rust,2022,1,50\n\
         rust,2023,1,100\n",
    )
    .unwrap();
    std::fs::write(
        dir.join("prs.csv"),
        "name,year,quarter,count\n\
         python,2022,1,100\n\
         python,2022,2,110\n\
         python,2022,3,120\n\
         python,2022,4,130\n\
         rust,2022,1,10\n\
         rust,2022,2,20\n\
         rust,2022,3,15\n\
         rust,2022,4,50\n",
    )
    .unwrap();
    std::fs::write(
        dir.join("repos.csv"),
        "language,num_repos\npython,75\nrust,25\n",
    )
    .unwrap();
}

fn langpulse(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_langpulse"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

#[test]
fn analyze_json_reports_every_section() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(dir.path());

    let output = langpulse(dir.path(), &["--format", "json", "analyze"]);
    assert!(
        output.status.success(),
        "analyze failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["overview"]["languagesAnalyzed"], 2);
    assert_eq!(json["marketLeaders"][0]["language"], "python");
    assert_eq!(json["marketLeaders"][0]["marketSharePct"], 75.0);
    assert_eq!(json["growth"]["latestYear"], 2023);
    assert_eq!(json["momentum"].as_array().map(Vec::len), Some(2));
    assert!(json["competition"].is_array());
    assert!(json["insights"]["topVolume"].is_array());
}

#[test]
fn analyze_single_section_as_text() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(dir.path());

    let output = langpulse(dir.path(), &["analyze", "--analysis", "market"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Market Leaders"));
    assert!(stdout.contains("Python"));
    assert!(stdout.contains("75.00"));
    assert!(!stdout.contains("Development Momentum"));
}

#[test]
fn each_analysis_selects_its_own_json_keys() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(dir.path());

    let cases = [
        ("overview", "overview"),
        ("market", "marketLeaders"),
        ("growth", "growth"),
        ("momentum", "momentum"),
        ("competition", "competition"),
        ("performance", "performance"),
        ("insights", "insights"),
    ];
    for (analysis, key) in cases {
        let output = langpulse(
            dir.path(),
            &["--format", "json", "analyze", "--analysis", analysis],
        );
        assert!(output.status.success(), "{analysis} failed");
        let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        let object = json.as_object().unwrap();
        assert!(object.contains_key(key), "{analysis} missing {key}");
        for (_, other) in cases.iter().filter(|(a, _)| *a != analysis) {
            assert!(!object.contains_key(*other), "{analysis} leaked {other}");
        }
    }
}

#[test]
fn source_flags_override_default_paths() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("data");
    std::fs::create_dir(&data).unwrap();
    write_inputs(&data);

    let issues = data.join("issues.csv");
    let prs = data.join("prs.csv");
    let repos = data.join("repos.csv");
    let output = langpulse(
        dir.path(),
        &[
            "--issues",
            issues.to_str().unwrap(),
            "--prs",
            prs.to_str().unwrap(),
            "--repos",
            repos.to_str().unwrap(),
            "--format",
            "markdown",
            "analyze",
            "--analysis",
            "growth",
        ],
    );
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("## Yearly Issue Growth"));
    assert!(stdout.contains("| Rust |"));
}

#[test]
fn missing_source_exits_non_zero() {
    let dir = tempfile::tempdir().unwrap();

    let output = langpulse(dir.path(), &["analyze"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("issues.csv"));
}

#[test]
fn query_runs_sql_over_inputs() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(dir.path());

    let output = langpulse(
        dir.path(),
        &[
            "--format",
            "json",
            "query",
            "SELECT language FROM repos_csv ORDER BY CAST(num_repos AS INTEGER) DESC",
        ],
    );
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json[0]["language"], "python");
    assert_eq!(json[1]["language"], "rust");
}

#[test]
fn invalid_query_fails() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(dir.path());

    let output = langpulse(dir.path(), &["query", "SELEC nothing"]);
    assert!(!output.status.success());
}

#[test]
fn clusters_lists_builtin_set() {
    let dir = tempfile::tempdir().unwrap();

    let output = langpulse(dir.path(), &["clusters"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Web Technologies"));
    assert!(stdout.contains("Object-Oriented Programming"));
}

#[test]
fn no_subcommand_prints_welcome() {
    let dir = tempfile::tempdir().unwrap();

    let output = langpulse(dir.path(), &["--color", "never"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("langpulse init"));
}
