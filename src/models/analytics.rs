use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Generic `{ data, total }` envelope used by the list endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub total: u64,
}

impl<T> Default for ListResponse<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            total: 0,
        }
    }
}

/// A company known to the backend (`GET /companies`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: String,
    pub name: String,
    pub event_count: u64,
}

/// Event type with its occurrence count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTypeCount {
    #[serde(rename = "type")]
    pub event_type: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: String,
    pub end: String,
}

/// Global summary (`GET /metrics`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsResponse {
    pub total_events: u64,
    pub active_companies: u64,
    #[serde(default)]
    pub top_event_types: Vec<EventTypeCount>,
    pub time_range: TimeRange,
}

/// Share of all events held by one event type (`GET /event-types`,
/// `GET /analytics/event-distribution`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDistribution {
    #[serde(rename = "type")]
    pub event_type: String,
    pub count: u64,
    pub percentage: f64,
    pub companies: u64,
}

/// Unfiltered company ranking (`GET /analytics/companies`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyAnalytics {
    pub company_id: String,
    pub name: String,
    pub event_count: u64,
    pub percentage: f64,
    pub last_activity: DateTime<Utc>,
}

/// Row of `GET /analytics/active-users`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserActivity {
    pub user: String,
    pub event_count: u64,
    pub companies: u64,
    #[serde(default)]
    pub company_names: Vec<String>,
    pub last_activity: DateTime<Utc>,
}

/// Row of `GET /analytics/top-endpoints`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointActivity {
    pub endpoint: String,
    pub event_count: u64,
    pub user_count: u64,
    pub company_count: u64,
    pub percentage: f64,
}

/// Row of `GET /analytics/top-companies`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyActivity {
    pub company_name: String,
    pub event_count: u64,
    pub user_count: u64,
    pub endpoint_count: u64,
    pub last_activity: DateTime<Utc>,
}
