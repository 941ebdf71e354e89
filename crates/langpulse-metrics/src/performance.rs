//! Volume and stability profile of each language's quarterly pull requests.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::series::QuarterlySeries;
use crate::stats::{mean, sample_std, saturating_total};

/// Quarters needed before a language is profiled.
pub const MIN_QUARTERS: usize = 2;

/// Total pull request volume bucket.
///
/// # Examples
///
/// ```
/// use langpulse_metrics::performance::SizeCategory;
///
/// assert_eq!(SizeCategory::from_total(50_001), SizeCategory::High);
/// assert_eq!(SizeCategory::from_total(50_000), SizeCategory::Medium);
/// assert_eq!(SizeCategory::from_total(10_000), SizeCategory::Low);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SizeCategory {
    /// More than 50,000 pull requests.
    #[serde(rename = "High Volume")]
    High,
    /// More than 10,000 pull requests.
    #[serde(rename = "Medium Volume")]
    Medium,
    /// Everything else.
    #[serde(rename = "Low Volume")]
    Low,
}

impl SizeCategory {
    /// Bucket a total pull request count.
    pub fn from_total(total: u64) -> Self {
        if total > 50_000 {
            SizeCategory::High
        } else if total > 10_000 {
            SizeCategory::Medium
        } else {
            SizeCategory::Low
        }
    }
}

impl fmt::Display for SizeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeCategory::High => write!(f, "High Volume"),
            SizeCategory::Medium => write!(f, "Medium Volume"),
            SizeCategory::Low => write!(f, "Low Volume"),
        }
    }
}

/// Stability bucket from the coefficient of variation.
///
/// # Examples
///
/// ```
/// use langpulse_metrics::performance::StabilityCategory;
///
/// assert_eq!(StabilityCategory::from_cv(49.9), StabilityCategory::Stable);
/// assert_eq!(StabilityCategory::from_cv(50.0), StabilityCategory::Variable);
/// assert_eq!(StabilityCategory::from_cv(100.0), StabilityCategory::HighlyVariable);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StabilityCategory {
    /// CV below 50.
    Stable,
    /// CV below 100.
    Variable,
    /// CV of 100 or more.
    #[serde(rename = "Highly Variable")]
    HighlyVariable,
}

impl StabilityCategory {
    /// Bucket a coefficient of variation (percent).
    pub fn from_cv(cv: f64) -> Self {
        if cv < 50.0 {
            StabilityCategory::Stable
        } else if cv < 100.0 {
            StabilityCategory::Variable
        } else {
            StabilityCategory::HighlyVariable
        }
    }
}

impl fmt::Display for StabilityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StabilityCategory::Stable => write!(f, "Stable"),
            StabilityCategory::Variable => write!(f, "Variable"),
            StabilityCategory::HighlyVariable => write!(f, "Highly Variable"),
        }
    }
}

/// Performance profile of one language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceRecord {
    /// Normalized language key.
    pub language: String,
    /// Pull requests across all quarters.
    pub total_prs: u64,
    /// Mean pull requests per quarter.
    pub avg_quarterly_prs: f64,
    /// Busiest quarter.
    pub peak_quarter_prs: u64,
    /// Quietest quarter.
    pub min_quarter_prs: u64,
    /// `std / mean * 100`, 0 when the mean is 0.
    pub coefficient_of_variation: f64,
    /// `(last - first) / first * 100`, 0 when the first quarter is 0.
    pub overall_growth_pct: f64,
    /// Volume bucket.
    pub size_category: SizeCategory,
    /// Stability bucket.
    pub stability_category: StabilityCategory,
    /// Quarters observed.
    pub quarters_active: usize,
}

/// Profile one period-ordered series, `None` below [`MIN_QUARTERS`].
///
/// # Examples
///
/// ```
/// use langpulse_metrics::performance::{language_performance, StabilityCategory};
///
/// let record = language_performance("ruby", &[100, 100, 100]).unwrap();
/// assert_eq!(record.coefficient_of_variation, 0.0);
/// assert_eq!(record.stability_category, StabilityCategory::Stable);
/// assert!(language_performance("ruby", &[100]).is_none());
/// ```
pub fn language_performance(language: &str, counts: &[u64]) -> Option<PerformanceRecord> {
    if counts.len() < MIN_QUARTERS {
        return None;
    }

    let values: Vec<f64> = counts.iter().map(|c| *c as f64).collect();
    let total = saturating_total(counts.iter().copied());
    let avg = mean(&values)?;
    let std = sample_std(&values).unwrap_or(0.0);
    let coefficient_of_variation = if avg > 0.0 { std / avg * 100.0 } else { 0.0 };

    let first = *counts.first()? as f64;
    let last = *counts.last()? as f64;
    let overall_growth_pct = if first > 0.0 {
        (last - first) / first * 100.0
    } else {
        0.0
    };

    Some(PerformanceRecord {
        language: language.to_string(),
        total_prs: total,
        avg_quarterly_prs: avg,
        peak_quarter_prs: counts.iter().copied().max()?,
        min_quarter_prs: counts.iter().copied().min()?,
        coefficient_of_variation,
        overall_growth_pct,
        size_category: SizeCategory::from_total(total),
        stability_category: StabilityCategory::from_cv(coefficient_of_variation),
        quarters_active: counts.len(),
    })
}

/// Profiles for every language with enough quarters, by total descending.
pub fn analyze_performance(series: &QuarterlySeries) -> Vec<PerformanceRecord> {
    let mut records: Vec<PerformanceRecord> = series
        .iter_counts()
        .filter_map(|(lang, counts)| language_performance(lang, &counts))
        .collect();
    records.sort_by(|a, b| b.total_prs.cmp(&a.total_prs));
    tracing::info!(languages = records.len(), "profiled language performance");
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn growth_and_variation_are_computed() {
        let record = language_performance("go", &[100, 300]).unwrap();
        assert_eq!(record.total_prs, 400);
        assert_eq!(record.avg_quarterly_prs, 200.0);
        assert_eq!(record.overall_growth_pct, 200.0);
        assert_eq!(record.peak_quarter_prs, 300);
        assert_eq!(record.min_quarter_prs, 100);
        // std of [100, 300] is 141.42, so CV is 70.7
        assert!((record.coefficient_of_variation - 70.710).abs() < 1e-2);
        assert_eq!(record.stability_category, StabilityCategory::Variable);
        assert_eq!(record.size_category, SizeCategory::Low);
    }

    #[test]
    fn zero_first_quarter_gives_zero_growth() {
        let record = language_performance("new", &[0, 50, 80]).unwrap();
        assert_eq!(record.overall_growth_pct, 0.0);
    }

    #[test]
    fn huge_totals_saturate() {
        let record = language_performance("go", &[u64::MAX, u64::MAX]).unwrap();
        assert_eq!(record.total_prs, u64::MAX);
        assert_eq!(record.size_category, SizeCategory::High);
    }

    #[test]
    fn zero_mean_gives_zero_variation() {
        let record = language_performance("dead", &[0, 0]).unwrap();
        assert_eq!(record.coefficient_of_variation, 0.0);
        assert_eq!(record.stability_category, StabilityCategory::Stable);
    }

    #[test]
    fn categories_serialize_with_display_names() {
        let json = serde_json::to_string(&SizeCategory::High).unwrap();
        assert_eq!(json, "\"High Volume\"");
        let json = serde_json::to_string(&StabilityCategory::HighlyVariable).unwrap();
        assert_eq!(json, "\"Highly Variable\"");
    }
}
