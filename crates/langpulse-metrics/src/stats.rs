//! Small descriptive-statistics helpers shared by the analyzers.

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sum of counts, clamped at `u64::MAX`.
///
/// # Examples
///
/// ```
/// use langpulse_metrics::stats::saturating_total;
///
/// assert_eq!(saturating_total([3, 4]), 7);
/// assert_eq!(saturating_total([u64::MAX, 1]), u64::MAX);
/// ```
pub fn saturating_total(counts: impl IntoIterator<Item = u64>) -> u64 {
    counts.into_iter().fold(0, u64::saturating_add)
}

/// Sample standard deviation (n − 1 denominator), `None` below two values.
///
/// # Examples
///
/// ```
/// use langpulse_metrics::stats::sample_std;
///
/// let std = sample_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
/// assert!((std - 2.138).abs() < 1e-3);
/// assert!(sample_std(&[1.0]).is_none());
/// ```
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let avg = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - avg).powi(2)).sum();
    Some((sum_sq / (values.len() - 1) as f64).sqrt())
}

/// Descending "minimum" ranks: tied values share the lowest rank among them.
///
/// # Examples
///
/// ```
/// use langpulse_metrics::stats::min_ranks_desc;
///
/// assert_eq!(min_ranks_desc(&[50.0, 80.0, 50.0, 10.0]), vec![2, 1, 2, 4]);
/// ```
pub fn min_ranks_desc(values: &[f64]) -> Vec<u32> {
    values
        .iter()
        .map(|v| 1 + values.iter().filter(|other| *other > v).count() as u32)
        .collect()
}
