//! Development momentum: is quarterly pull request growth speeding up?
//!
//! Compares the mean quarter-over-quarter growth of a language's last three
//! quarters with that of its first three.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::series::QuarterlySeries;
use crate::stats::{mean, sample_std, saturating_total};

/// Quarters needed before momentum is computed.
pub const MIN_QUARTERS: usize = 4;

/// Quarters averaged at each end of the series.
const WINDOW: usize = 3;

/// Acceleration above which a language is accelerating (below the negation,
/// decelerating).
const ACCELERATION_THRESHOLD: f64 = 5.0;

/// Momentum classification.
///
/// # Examples
///
/// ```
/// use langpulse_metrics::momentum::MomentumCategory;
///
/// assert_eq!(MomentumCategory::from_acceleration(5.01), MomentumCategory::Accelerating);
/// assert_eq!(MomentumCategory::from_acceleration(5.0), MomentumCategory::Stable);
/// assert_eq!(MomentumCategory::from_acceleration(-5.0), MomentumCategory::Stable);
/// assert_eq!(MomentumCategory::from_acceleration(-5.01), MomentumCategory::Decelerating);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MomentumCategory {
    /// Recent growth clearly above early growth.
    Accelerating,
    /// Within five points either way.
    Stable,
    /// Recent growth clearly below early growth.
    Decelerating,
}

impl MomentumCategory {
    /// Classify an acceleration value; both thresholds are strict.
    pub fn from_acceleration(acceleration: f64) -> Self {
        if acceleration > ACCELERATION_THRESHOLD {
            MomentumCategory::Accelerating
        } else if acceleration < -ACCELERATION_THRESHOLD {
            MomentumCategory::Decelerating
        } else {
            MomentumCategory::Stable
        }
    }
}

impl fmt::Display for MomentumCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MomentumCategory::Accelerating => write!(f, "Accelerating"),
            MomentumCategory::Stable => write!(f, "Stable"),
            MomentumCategory::Decelerating => write!(f, "Decelerating"),
        }
    }
}

/// Momentum of one language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MomentumRecord {
    /// Normalized language key.
    pub language: String,
    /// Recent-window mean QoQ% minus early-window mean QoQ%.
    pub momentum_acceleration: f64,
    /// `100 - min(100, std(QoQ%))`.
    pub growth_consistency_score: f64,
    /// Mean QoQ% over the last three quarters.
    pub recent_avg_growth_pct: f64,
    /// Mean QoQ% over the first three quarters.
    pub early_avg_growth_pct: f64,
    /// Pull requests across the whole series.
    pub total_prs: u64,
    /// Peak quarter divided by the latest quarter; 0 when the latest is 0.
    pub peak_to_current_ratio: f64,
    /// Classification of the acceleration.
    pub momentum_category: MomentumCategory,
    /// Quarters observed.
    pub quarters: usize,
}

/// Quarter-over-quarter percent changes; the first quarter is 0.
///
/// A change from a zero quarter is also reported as 0.
///
/// # Examples
///
/// ```
/// use langpulse_metrics::momentum::quarter_over_quarter_pct;
///
/// let pct = quarter_over_quarter_pct(&[10, 20, 15]);
/// assert_eq!(pct, vec![0.0, 100.0, -25.0]);
/// ```
pub fn quarter_over_quarter_pct(counts: &[u64]) -> Vec<f64> {
    let mut pct = Vec::with_capacity(counts.len());
    if counts.is_empty() {
        return pct;
    }
    pct.push(0.0);
    for pair in counts.windows(2) {
        let (prev, current) = (pair[0] as f64, pair[1] as f64);
        if prev > 0.0 {
            pct.push((current - prev) / prev * 100.0);
        } else {
            pct.push(0.0);
        }
    }
    pct
}

/// Momentum for one period-ordered series, `None` below [`MIN_QUARTERS`].
///
/// # Examples
///
/// ```
/// use langpulse_metrics::momentum::{language_momentum, MomentumCategory};
///
/// let record = language_momentum("go", &[10, 20, 15, 50, 5]).unwrap();
/// assert!((record.momentum_acceleration - 14.444).abs() < 1e-3);
/// assert_eq!(record.momentum_category, MomentumCategory::Accelerating);
/// assert!(language_momentum("go", &[1, 2, 3]).is_none());
/// ```
pub fn language_momentum(language: &str, counts: &[u64]) -> Option<MomentumRecord> {
    if counts.len() < MIN_QUARTERS {
        return None;
    }

    let qoq = quarter_over_quarter_pct(counts);
    let recent = mean(&qoq[qoq.len() - WINDOW..])?;
    let early = mean(&qoq[..WINDOW])?;
    let acceleration = recent - early;

    let volatility = sample_std(&qoq).unwrap_or(0.0);
    let consistency = 100.0 - volatility.min(100.0);

    let peak = counts.iter().copied().max().unwrap_or(0);
    let latest = counts.last().copied().unwrap_or(0);
    let peak_to_current_ratio = if latest > 0 {
        peak as f64 / latest as f64
    } else {
        0.0
    };

    Some(MomentumRecord {
        language: language.to_string(),
        momentum_acceleration: acceleration,
        growth_consistency_score: consistency,
        recent_avg_growth_pct: recent,
        early_avg_growth_pct: early,
        total_prs: saturating_total(counts.iter().copied()),
        peak_to_current_ratio,
        momentum_category: MomentumCategory::from_acceleration(acceleration),
        quarters: counts.len(),
    })
}

/// Momentum for every language with enough quarters, by acceleration descending.
pub fn analyze_momentum(series: &QuarterlySeries) -> Vec<MomentumRecord> {
    let mut records: Vec<MomentumRecord> = series
        .iter_counts()
        .filter_map(|(lang, counts)| language_momentum(lang, &counts))
        .collect();

    records.sort_by(|a, b| {
        b.momentum_acceleration
            .partial_cmp(&a.momentum_acceleration)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    tracing::info!(
        languages = records.len(),
        skipped = series.len() - records.len(),
        "computed momentum"
    );
    records
}
