use std::path::PathBuf;

/// Errors that can occur across the langpulse workspace.
///
/// Each variant wraps a specific error domain. Library crates use this type
/// directly; the binary crate reports it through `miette` at the boundary.
///
/// # Examples
///
/// ```
/// use langpulse_core::LangpulseError;
///
/// let err = LangpulseError::Config("unknown cluster".into());
/// assert!(err.to_string().contains("unknown cluster"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum LangpulseError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// The data source could not be opened or queried.
    #[error("data source error: {0}")]
    #[diagnostic(help("check the [sources] paths in .langpulse.toml or pass --issues/--prs/--repos"))]
    Source(String),

    /// A table is missing a column the pipeline needs.
    #[error("table '{table}' has no column named {column}")]
    #[diagnostic(help("expected a CSV header containing {column}"))]
    Schema {
        /// Table that was inspected.
        table: String,
        /// Column (or alternatives, `a|b`) that was looked up.
        column: String,
    },

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A required file was not found.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),
}
