use std::{collections::BTreeSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::{DateRange, ToQuery, push_joined};

/// Bucket width of a time series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl Timeframe {
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::Daily => "daily",
            Timeframe::Weekly => "weekly",
            Timeframe::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "daily" => Ok(Timeframe::Daily),
            "weekly" => Ok(Timeframe::Weekly),
            "monthly" => Ok(Timeframe::Monthly),
            other => Err(format!("unknown timeframe: {other}")),
        }
    }
}

/// Cohort grouping for retention analysis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum CohortPeriod {
    Daily,
    #[default]
    Weekly,
    Monthly,
}

impl CohortPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CohortPeriod::Daily => "daily",
            CohortPeriod::Weekly => "weekly",
            CohortPeriod::Monthly => "monthly",
        }
    }
}

/// Date range plus company filter (`/events/metrics`, `/metrics`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilterParams {
    pub range: DateRange,
    pub companies: BTreeSet<String>,
}

impl ToQuery for FilterParams {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(3);
        self.range.push_pairs(&mut pairs);
        push_joined(&mut pairs, "companies", &self.companies);
        pairs
    }
}

/// Parameters of `/trends` and `/trends/multi-company`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrendsParams {
    pub range: DateRange,
    pub companies: BTreeSet<String>,
    pub event_types: BTreeSet<String>,
    pub timeframe: Option<Timeframe>,
}

impl ToQuery for TrendsParams {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(5);
        if let Some(timeframe) = self.timeframe {
            pairs.push(("timeframe", timeframe.as_str().to_string()));
        }
        self.range.push_pairs(&mut pairs);
        push_joined(&mut pairs, "companies", &self.companies);
        push_joined(&mut pairs, "eventTypes", &self.event_types);
        pairs
    }
}

/// Parameters of the `/analytics/top-*` and `/analytics/active-users`
/// leaderboards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LeaderboardParams {
    pub range: DateRange,
    pub companies: BTreeSet<String>,
    pub limit: u32,
}

impl ToQuery for LeaderboardParams {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(4);
        self.range.push_pairs(&mut pairs);
        push_joined(&mut pairs, "companies", &self.companies);
        pairs.push(("limit", self.limit.to_string()));
        pairs
    }
}

/// Parameters of `/analytics/retention`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RetentionParams {
    pub range: DateRange,
    /// A single company; retention is not computed across a company set.
    pub company: Option<String>,
    pub cohort_period: Option<CohortPeriod>,
    pub min_cohort_size: Option<u32>,
}

impl ToQuery for RetentionParams {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(5);
        if let Some(company) = &self.company {
            pairs.push(("company", company.clone()));
        }
        self.range.push_pairs(&mut pairs);
        if let Some(period) = self.cohort_period {
            pairs.push(("cohortPeriod", period.as_str().to_string()));
        }
        if let Some(size) = self.min_cohort_size {
            pairs.push(("minCohortSize", size.to_string()));
        }
        pairs
    }
}
