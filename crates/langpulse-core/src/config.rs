use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::LangpulseError;

/// Table name under which the issue counts are registered.
pub const ISSUES_TABLE: &str = "issues_csv";
/// Table name under which the pull request counts are registered.
pub const PRS_TABLE: &str = "prs_csv";
/// Table name under which the repository counts are registered.
pub const REPOS_TABLE: &str = "repos_csv";

const BUILTIN_CLUSTERS: &str = include_str!("../clusters.toml");

/// Top-level configuration loaded from `.langpulse.toml`.
///
/// Supports layered resolution: CLI flags > local config > defaults.
///
/// # Examples
///
/// ```
/// use langpulse_core::LangpulseConfig;
///
/// let config = LangpulseConfig::default();
/// assert_eq!(config.analysis.growth_top_n, 100);
/// assert_eq!(config.resolved_clusters().len(), 12);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LangpulseConfig {
    /// CSV files backing the three data tables.
    #[serde(default)]
    pub sources: SourceConfig,
    /// Tunables for report sizes.
    #[serde(default)]
    pub analysis: AnalysisConfig,
    /// Named language clusters; empty means the built-in set.
    #[serde(default)]
    pub clusters: Vec<ClusterConfig>,
}

impl LangpulseConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`LangpulseError::Io`] if the file cannot be read, or
    /// [`LangpulseError::Toml`] if the content is not valid TOML.
    pub fn from_file(path: &Path) -> Result<Self, LangpulseError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`LangpulseError::Toml`] if parsing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use langpulse_core::LangpulseConfig;
    ///
    /// let toml = r#"
    /// [analysis]
    /// growth_top_n = 20
    /// "#;
    /// let config = LangpulseConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.analysis.growth_top_n, 20);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, LangpulseError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Clusters to analyze, with language names trimmed and lowercased.
    ///
    /// Falls back to the built-in clusters when none are configured. Duplicate
    /// members inside one cluster are collapsed; membership across clusters is
    /// left untouched.
    pub fn resolved_clusters(&self) -> Vec<ClusterConfig> {
        let clusters = if self.clusters.is_empty() {
            builtin_clusters()
        } else {
            self.clusters.clone()
        };

        clusters
            .into_iter()
            .map(|cluster| {
                let mut languages: Vec<String> = Vec::with_capacity(cluster.languages.len());
                for lang in &cluster.languages {
                    let key = lang.trim().to_lowercase();
                    if !key.is_empty() && !languages.contains(&key) {
                        languages.push(key);
                    }
                }
                ClusterConfig {
                    name: cluster.name,
                    languages,
                }
            })
            .collect()
    }
}

/// Locations of the three CSV inputs.
///
/// # Examples
///
/// ```
/// use langpulse_core::SourceConfig;
///
/// let sources = SourceConfig::default();
/// let tables = sources.tables();
/// assert_eq!(tables[0].0, "issues_csv");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Issue counts: `name, year, quarter, count`.
    #[serde(default = "default_issues_path")]
    pub issues: PathBuf,
    /// Pull request counts: `name, year, quarter, count`.
    #[serde(default = "default_prs_path")]
    pub prs: PathBuf,
    /// Repository counts: `language, num_repos`.
    #[serde(default = "default_repos_path")]
    pub repos: PathBuf,
}

impl SourceConfig {
    /// `(table name, csv path)` pairs in registration order.
    pub fn tables(&self) -> [(&'static str, &Path); 3] {
        [
            (ISSUES_TABLE, self.issues.as_path()),
            (PRS_TABLE, self.prs.as_path()),
            (REPOS_TABLE, self.repos.as_path()),
        ]
    }
}

fn default_issues_path() -> PathBuf {
    PathBuf::from("issues.csv")
}

fn default_prs_path() -> PathBuf {
    PathBuf::from("prs.csv")
}

fn default_repos_path() -> PathBuf {
    PathBuf::from("repos.csv")
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            issues: default_issues_path(),
            prs: default_prs_path(),
            repos: default_repos_path(),
        }
    }
}

/// Report sizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Languages kept per ranking in the yearly growth report (default: 100).
    #[serde(default = "default_growth_top_n")]
    pub growth_top_n: usize,
    /// Rows on one page of the market leaders table (default: 10).
    #[serde(default = "default_leaders_page_size")]
    pub leaders_page_size: usize,
    /// Languages named per headline insight (default: 3).
    #[serde(default = "default_insight_top_n")]
    pub insight_top_n: usize,
}

fn default_growth_top_n() -> usize {
    100
}

fn default_leaders_page_size() -> usize {
    10
}

fn default_insight_top_n() -> usize {
    3
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            growth_top_n: default_growth_top_n(),
            leaders_page_size: default_leaders_page_size(),
            insight_top_n: default_insight_top_n(),
        }
    }
}

/// A named, possibly overlapping group of languages.
///
/// # Examples
///
/// ```
/// use langpulse_core::ClusterConfig;
///
/// let cluster = ClusterConfig {
///     name: "Mobile Development".into(),
///     languages: vec!["swift".into(), "kotlin".into()],
/// };
/// assert!(cluster.contains("swift"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Display name of the cluster.
    pub name: String,
    /// Member language keys.
    #[serde(default)]
    pub languages: Vec<String>,
}

impl ClusterConfig {
    /// Whether `language` (already normalized) is a member.
    pub fn contains(&self, language: &str) -> bool {
        self.languages.iter().any(|l| l == language)
    }
}

#[derive(Deserialize)]
struct ClusterFile {
    #[serde(default)]
    clusters: Vec<ClusterConfig>,
}

/// The clusters shipped with langpulse.
pub fn builtin_clusters() -> Vec<ClusterConfig> {
    toml::from_str::<ClusterFile>(BUILTIN_CLUSTERS)
        .map(|file| file.clusters)
        .unwrap_or_default()
}

/// The built-in cluster definitions as TOML, for `langpulse init`.
pub fn builtin_clusters_toml() -> &'static str {
    BUILTIN_CLUSTERS
}
