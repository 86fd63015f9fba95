use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::models::Cohort;

/// One point on the retention chart's x-axis.
///
/// `rates` maps cohort date to retention rate and only holds cohorts that
/// were sampled on this exact day. Serializes flat:
/// `{"days":7,"2025-06-01":42.5}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetentionRow {
    pub days: u32,
    #[serde(flatten)]
    pub rates: BTreeMap<String, f64>,
}

/// Pivot cohorts into day-indexed rows over the union of sampled days.
///
/// Columns stay sparse: a cohort without a sample for a day has no entry in
/// that row. If a cohort repeats a day, its first sample is used.
pub fn retention_curve(cohorts: &[Cohort]) -> Vec<RetentionRow> {
    let days: BTreeSet<u32> = cohorts
        .iter()
        .flat_map(|cohort| cohort.retention_data.iter().map(|sample| sample.days))
        .collect();

    days.into_iter()
        .map(|day| {
            let rates = cohorts
                .iter()
                .filter_map(|cohort| {
                    cohort
                        .retention_data
                        .iter()
                        .find(|sample| sample.days == day)
                        .map(|sample| (cohort.cohort_date.clone(), sample.retention_rate))
                })
                .collect();
            RetentionRow { days: day, rates }
        })
        .collect()
}
