//! Multi-series time-series reshaping for line, bar and pie charts.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;

use super::format::series_color;
use crate::models::TrendRow;

/// Parse a backend timestamp: RFC 3339, a naive date-time, or a bare
/// `YYYY-MM-DD` date (taken as midnight). Offsets are normalized to UTC.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, pattern) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Ascending by parsed timestamp, returned as a new vector.
///
/// Rows with a parseable timestamp come first, ordered by instant and then
/// by raw string. Rows that fail to parse follow, ordered by raw string.
/// The sort is stable, so rows with identical timestamps keep their input
/// order.
pub fn sort_chronologically(rows: &[TrendRow]) -> Vec<TrendRow> {
    let mut sorted = rows.to_vec();
    sorted.sort_by_cached_key(|row| {
        let parsed = parse_timestamp(&row.timestamp);
        (parsed.is_none(), parsed, row.timestamp.clone())
    });
    sorted
}

/// Total of one series across all rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesTotal {
    pub name: String,
    pub value: f64,
}

/// Sum every numeric series value per series key.
///
/// A key missing from a row contributes nothing for that row; non-numeric
/// values are skipped. When `filter` is non-empty, only keys in it are
/// emitted. Output follows the order in which keys first appear.
pub fn series_totals(rows: &[TrendRow], filter: &BTreeSet<String>) -> Vec<SeriesTotal> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<SeriesTotal> = Vec::new();

    for row in rows {
        for (key, value) in &row.series {
            if key == "timestamp" {
                continue;
            }
            let Some(n) = value.as_f64() else { continue };
            match index.get(key.as_str()) {
                Some(&i) => totals[i].value += n,
                None => {
                    index.insert(key.as_str(), totals.len());
                    totals.push(SeriesTotal {
                        name: key.clone(),
                        value: n,
                    });
                }
            }
        }
    }

    if !filter.is_empty() {
        totals.retain(|total| filter.contains(&total.name));
    }
    totals
}

/// A named series with its display colour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartSeries {
    pub name: String,
    pub color: &'static str,
}

/// Chart-ready view of a multi-company trend response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyChart {
    /// Rows sorted for the line/bar chart.
    pub rows: Vec<TrendRow>,
    /// Per-company totals for the pie chart.
    pub totals: Vec<SeriesTotal>,
    /// Series in `totals` order, coloured by position.
    pub series: Vec<ChartSeries>,
}

impl CompanyChart {
    pub fn build(rows: &[TrendRow], filter: &BTreeSet<String>) -> Self {
        let rows = sort_chronologically(rows);
        let totals = series_totals(&rows, filter);
        let series = totals
            .iter()
            .enumerate()
            .map(|(i, total)| ChartSeries {
                name: total.name.clone(),
                color: series_color(i),
            })
            .collect();

        Self {
            rows,
            totals,
            series,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
