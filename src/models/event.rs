use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single usage event as returned by `GET /events`.
///
/// Field names follow the backend's wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageEvent {
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub company_id: String,
    #[serde(rename = "companyName")]
    pub company_name: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub attribute: String,
    pub user: String,
    pub endpoint: String,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub original_timestamp: Option<DateTime<Utc>>,
    /// Numeric payload, absent for events that carry none.
    #[serde(default)]
    pub value: Option<f64>,
}

/// Pagination metadata for one page of events.
///
/// Construct with [`PaginationInfo::new`] so that the derived fields agree
/// with the page position and item count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_items: u64,
    pub page_size: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationInfo {
    pub fn new(current_page: u32, page_size: u32, total_items: u64) -> Self {
        let page_size = page_size.max(1);
        let total_pages = total_items.div_ceil(u64::from(page_size));
        let total_pages = u32::try_from(total_pages).unwrap_or(u32::MAX);

        Self {
            current_page,
            total_pages,
            total_items,
            page_size,
            has_next: current_page < total_pages,
            has_prev: current_page > 1,
        }
    }

    /// Pagination for a table that has not loaded anything yet.
    pub fn empty(current_page: u32, page_size: u32) -> Self {
        Self::new(current_page, page_size, 0)
    }
}

/// Response envelope of `GET /events`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub events: Vec<UsageEvent>,
    pub pagination: PaginationInfo,
}

/// Response of `GET /events/metrics`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMetrics {
    pub total_events: u64,
    pub unique_users: u64,
}
