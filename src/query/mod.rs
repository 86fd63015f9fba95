//! Canonical query parameters.
//!
//! Callers describe what they want with a partial [`QueryInput`]; the
//! [`QueryBuilder`] fills every gap from [`DefaultsConfig`] and produces a
//! fully-resolved parameter set. The same resolved value is used for the
//! wire request and for the cache key, so two inputs that mean the same
//! thing (e.g. companies listed in a different order) share one request.

mod endpoint;
mod params;

use std::collections::BTreeSet;

use chrono::NaiveDate;
pub use endpoint::Endpoint;
pub use params::*;
use serde::{Deserialize, Serialize};

use crate::config::DefaultsConfig;

/// Something that can be rendered as query-string pairs.
///
/// Pairs come out in a fixed order for a given value, and values are
/// already canonical (sorted, comma-joined).
pub trait ToQuery {
    fn query_pairs(&self) -> Vec<(&'static str, String)>;
}

impl ToQuery for () {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(rename = "startDate")]
    pub start: NaiveDate,
    #[serde(rename = "endDate")]
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    fn push_pairs(&self, pairs: &mut Vec<(&'static str, String)>) {
        pairs.push(("startDate", self.start.format("%Y-%m-%d").to_string()));
        pairs.push(("endDate", self.end.format("%Y-%m-%d").to_string()));
    }
}

/// Filter input as the user left it. Every field may be unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryInput {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub companies: Vec<String>,
    pub query: String,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// Fully-resolved parameters for `GET /events`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryParams {
    pub range: DateRange,
    /// Empty means "all companies".
    pub companies: BTreeSet<String>,
    /// Free text, carried verbatim.
    pub query: String,
    pub page: u32,
    pub page_size: u32,
}

impl ToQuery for QueryParams {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(6);
        if !self.query.is_empty() {
            pairs.push(("query", self.query.clone()));
        }
        self.range.push_pairs(&mut pairs);
        push_joined(&mut pairs, "companies", &self.companies);
        pairs.push(("page", self.page.to_string()));
        pairs.push(("pageSize", self.page_size.to_string()));
        pairs
    }
}

/// Resolves partial input against configured defaults. Never fails.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    defaults: DefaultsConfig,
}

impl QueryBuilder {
    pub fn new(defaults: &DefaultsConfig) -> Self {
        Self {
            defaults: defaults.clone(),
        }
    }

    pub fn defaults(&self) -> &DefaultsConfig {
        &self.defaults
    }

    /// Each missing bound falls back to its default independently.
    pub fn resolve_range(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> DateRange {
        DateRange::new(
            start.unwrap_or(self.defaults.start_date),
            end.unwrap_or(self.defaults.end_date),
        )
    }

    pub fn build(&self, input: &QueryInput) -> QueryParams {
        QueryParams {
            range: self.resolve_range(input.start_date, input.end_date),
            companies: canonical_set(&input.companies),
            query: input.query.clone(),
            page: input.page.unwrap_or(1).max(1),
            page_size: input.page_size.unwrap_or(self.defaults.page_size).max(1),
        }
    }

    pub fn filters(&self, input: &QueryInput) -> FilterParams {
        FilterParams {
            range: self.resolve_range(input.start_date, input.end_date),
            companies: canonical_set(&input.companies),
        }
    }

    pub fn trends(
        &self,
        input: &QueryInput,
        timeframe: Option<Timeframe>,
        event_types: &[String],
    ) -> TrendsParams {
        TrendsParams {
            range: self.resolve_range(input.start_date, input.end_date),
            companies: canonical_set(&input.companies),
            event_types: canonical_set(event_types),
            timeframe,
        }
    }

    pub fn leaderboard(&self, input: &QueryInput, limit: Option<u32>) -> LeaderboardParams {
        LeaderboardParams {
            range: self.resolve_range(input.start_date, input.end_date),
            companies: canonical_set(&input.companies),
            limit: limit.unwrap_or(self.defaults.limit).max(1),
        }
    }

    pub fn retention(
        &self,
        input: &QueryInput,
        company: Option<&str>,
        cohort_period: Option<CohortPeriod>,
        min_cohort_size: Option<u32>,
    ) -> RetentionParams {
        RetentionParams {
            range: self.resolve_range(input.start_date, input.end_date),
            company: company.filter(|c| !c.is_empty()).map(str::to_string),
            cohort_period,
            min_cohort_size: min_cohort_size.filter(|n| *n > 0),
        }
    }
}

/// Sorted, de-duplicated set of trimmed names with blanks removed.
fn canonical_set(values: &[String]) -> BTreeSet<String> {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

/// Comma-joins a non-empty set into one parameter; an empty set emits
/// nothing.
fn push_joined(pairs: &mut Vec<(&'static str, String)>, name: &'static str, set: &BTreeSet<String>) {
    if set.is_empty() {
        return;
    }
    let joined = set.iter().map(String::as_str).collect::<Vec<_>>().join(",");
    pairs.push((name, joined));
}
