use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One row of a multi-series time series.
///
/// Every key other than `timestamp` names a series (a company, for the
/// multi-company endpoint). Values are kept as raw JSON so rows carrying
/// non-numeric extras still deserialize.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrendRow {
    #[serde(default)]
    pub timestamp: String,
    #[serde(flatten)]
    pub series: Map<String, Value>,
}

impl TrendRow {
    pub fn new(timestamp: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            series: Map::new(),
        }
    }

    /// Builder-style helper to attach a series value.
    pub fn with(mut self, series: impl Into<String>, value: impl Into<Value>) -> Self {
        self.series.insert(series.into(), value.into());
        self
    }
}

/// Response of `GET /trends/multi-company`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiCompanyTrendsResponse {
    #[serde(default)]
    pub data: Vec<TrendRow>,
    #[serde(default)]
    pub timeframe: String,
    #[serde(default)]
    pub total_points: u64,
}

/// One point of `GET /trends`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesPoint {
    pub timestamp: String,
    pub value: i64,
    pub event_type: String,
}

/// Response of `GET /trends`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesResponse {
    #[serde(default)]
    pub data: Vec<TimeSeriesPoint>,
    #[serde(default)]
    pub timeframe: String,
    #[serde(default)]
    pub total_points: u64,
}
