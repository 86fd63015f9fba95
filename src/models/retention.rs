use serde::{Deserialize, Serialize};

/// Retention measured `days` after a cohort's start.
///
/// `retention_rate` is computed upstream as a percentage and is carried
/// through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetentionSample {
    pub days: u32,
    pub retention_rate: f64,
    #[serde(default)]
    pub active_users: u64,
    #[serde(default)]
    pub total_users: u64,
}

/// Users who first engaged on `cohort_date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cohort {
    pub cohort_date: String,
    #[serde(default)]
    pub total_users: u64,
    #[serde(default)]
    pub retention_data: Vec<RetentionSample>,
}

/// Response of `GET /analytics/retention`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetentionResponse {
    #[serde(default)]
    pub cohorts: Vec<Cohort>,
    #[serde(default)]
    pub time_periods: Vec<u32>,
    #[serde(default)]
    pub total_cohorts: u64,
    #[serde(default)]
    pub average_retention: f64,
}
