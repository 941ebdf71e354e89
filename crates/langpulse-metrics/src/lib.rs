//! Language activity analytics.
//!
//! Turns the raw issue, pull request and repository tables into typed rows
//! ([`normalize`]), joins them into one record per language ([`aggregate`]),
//! and derives growth, momentum, cluster competition and performance
//! profiles. [`pipeline::run_pipeline`] runs the whole chain.

pub mod aggregate;
pub mod competition;
pub mod growth;
pub mod insights;
pub mod market;
pub mod momentum;
pub mod normalize;
pub mod performance;
pub mod pipeline;
pub mod series;
pub mod stats;

pub use pipeline::{run_pipeline, AnalyticsReport, IngestionSummary};

#[cfg(test)]
mod property_tests {
    use crate::normalize::ActivityRow;
    use crate::series::QuarterlySeries;
    use langpulse_core::Period;
    use proptest::prelude::*;

    fn activity_rows() -> impl Strategy<Value = Vec<ActivityRow>> {
        prop::collection::vec(
            (0usize..6, 2020i32..2024, 1u8..=4, 1u64..100_000),
            1..60,
        )
        .prop_map(|rows| {
            rows.into_iter()
                .map(|(lang, year, quarter, count)| ActivityRow {
                    language: format!("lang{lang}"),
                    year: Some(year),
                    quarter: Some(quarter),
                    count,
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn quarterly_shares_sum_to_one_hundred(rows in activity_rows()) {
            let series = QuarterlySeries::from_rows(&rows);
            let shares = series.market_shares();
            for period in series.period_totals().keys() {
                let sum = shares.period_sum(*period);
                prop_assert!((sum - 100.0).abs() < 1e-6, "{period}: {sum}");
            }
        }

        #[test]
        fn quarterly_records_are_ordered(rows in activity_rows()) {
            let records = QuarterlySeries::from_rows(&rows).records();
            for pair in records.windows(2) {
                let a = (&pair[0].language, pair[0].period);
                let b = (&pair[1].language, pair[1].period);
                prop_assert!(a < b);
            }
        }

        #[test]
        fn periods_order_by_year_then_quarter(y1 in 2000i32..2030, q1 in 1u8..=4, y2 in 2000i32..2030, q2 in 1u8..=4) {
            let ordering = Period::new(y1, q1).cmp(&Period::new(y2, q2));
            prop_assert_eq!(ordering, (y1, q1).cmp(&(y2, q2)));
        }
    }
}
