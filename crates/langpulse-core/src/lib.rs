//! Core types, configuration, and error handling for langpulse.
//!
//! This crate provides the shared foundation used by all other langpulse crates:
//! - [`LangpulseError`]: unified error type using `thiserror`
//! - [`LangpulseConfig`]: configuration loaded from `.langpulse.toml`
//! - Shared types: [`Period`], [`OutputFormat`], [`title_case`]

mod config;
mod error;
mod types;

pub use config::{
    builtin_clusters, builtin_clusters_toml, AnalysisConfig, ClusterConfig, LangpulseConfig,
    SourceConfig, ISSUES_TABLE, PRS_TABLE, REPOS_TABLE,
};
pub use error::LangpulseError;
pub use types::{title_case, OutputFormat, Period};

/// A convenience `Result` type for langpulse operations.
pub type Result<T> = std::result::Result<T, LangpulseError>;
