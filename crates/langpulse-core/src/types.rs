use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A calendar quarter, ordered by year then quarter.
///
/// # Examples
///
/// ```
/// use langpulse_core::Period;
///
/// let q = Period::new(2023, 4);
/// assert_eq!(q.to_string(), "2023-Q4");
/// assert!(Period::new(2023, 4) < Period::new(2024, 1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    /// Calendar year.
    pub year: i32,
    /// Quarter within the year, 1–4.
    pub quarter: u8,
}

impl Period {
    /// Build a period from a year and a quarter number.
    pub fn new(year: i32, quarter: u8) -> Self {
        Self { year, quarter }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-Q{}", self.year, self.quarter)
    }
}

/// Output format for CLI subcommands.
///
/// Implements [`FromStr`] so it can be used directly with `clap` argument parsing.
///
/// # Examples
///
/// ```
/// use langpulse_core::OutputFormat;
///
/// let fmt: OutputFormat = "md".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Markdown);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Aligned plain-text tables.
    #[default]
    Text,
    /// Pretty-printed JSON with camelCase keys.
    Json,
    /// GitHub-flavored Markdown tables.
    Markdown,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

/// Capitalize the first letter of every word, lowercase the rest.
///
/// A "word" starts after any non-alphabetic character, so punctuation inside
/// language names starts a new word.
///
/// # Examples
///
/// ```
/// use langpulse_core::title_case;
///
/// assert_eq!(title_case("objective-c"), "Objective-C");
/// assert_eq!(title_case("c++"), "C++");
/// assert_eq!(title_case("unreal script"), "Unreal Script");
/// ```
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for ch in s.chars() {
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }
    out
}
