//! Export of the visible event slice to CSV or JSON.
//!
//! [`encode`] turns an [`ExportBundle`] into an [`ExportArtifact`] (content,
//! MIME type, filename). [`export_to`] validates, encodes and hands the
//! artifact to an [`ExportSink`].

mod encoding;
mod filename;
mod sink;
mod status;

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
pub use encoding::{CSV_MIME_TYPE, JSON_MIME_TYPE, to_csv, to_json};
pub use filename::export_filename;
use serde::Serialize;
pub use sink::{DirectorySink, ExportSink};
pub use status::{ExportState, ExportStatus, SUCCESS_DISPLAY};
use thiserror::Error;
use tracing::{error, info};

use crate::models::UsageEvent;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No data to export")]
    EmptyDataset,

    #[error("Failed to export data: {0}")]
    Encode(String),

    #[error("Failed to export data: {0}")]
    Save(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => CSV_MIME_TYPE,
            ExportFormat::Json => JSON_MIME_TYPE,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(format!("unknown export format: {other}")),
        }
    }
}

/// Filters in effect when the export was taken.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub companies: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub query: String,
}

/// Rows plus the filters that produced them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportBundle {
    pub events: Vec<UsageEvent>,
    pub filters: ExportFilters,
}

impl ExportBundle {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// An encoded export ready to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub content: String,
    pub mime_type: &'static str,
    pub filename: String,
}

/// Encode `bundle`, refusing an empty one.
pub fn encode(
    bundle: &ExportBundle,
    format: ExportFormat,
    now: DateTime<Utc>,
) -> Result<ExportArtifact, ExportError> {
    if bundle.is_empty() {
        return Err(ExportError::EmptyDataset);
    }

    let content = match format {
        ExportFormat::Csv => to_csv(bundle)?,
        ExportFormat::Json => to_json(bundle, now)?,
    };

    Ok(ExportArtifact {
        content,
        mime_type: format.mime_type(),
        filename: export_filename(format, &bundle.filters, now),
    })
}

/// Encode `bundle` and save it through `sink`. `filename` overrides the
/// generated name. Returns the artifact that was saved.
pub async fn export_to(
    sink: &dyn ExportSink,
    bundle: &ExportBundle,
    format: ExportFormat,
    now: DateTime<Utc>,
    filename: Option<&str>,
) -> Result<ExportArtifact, ExportError> {
    let result = async {
        let mut artifact = encode(bundle, format, now)?;
        if let Some(custom) = filename.filter(|f| !f.is_empty()) {
            artifact.filename = custom.to_string();
        }
        sink.save(
            artifact.content.as_bytes(),
            &artifact.filename,
            artifact.mime_type,
        )
        .await?;
        Ok::<_, ExportError>(artifact)
    }
    .await;

    match &result {
        Ok(artifact) => info!(
            filename = %artifact.filename,
            format = %format,
            records = bundle.events.len(),
            "Export completed"
        ),
        Err(e) => error!(error = %e, format = %format, "Export failed"),
    }
    result
}

/// [`export_to`] with progress reported through `status`.
pub async fn export_with_status(
    status: &ExportStatus,
    sink: &dyn ExportSink,
    bundle: &ExportBundle,
    format: ExportFormat,
    now: DateTime<Utc>,
) -> Result<ExportArtifact, ExportError> {
    if bundle.is_empty() {
        status.fail("No data available to export");
        return Err(ExportError::EmptyDataset);
    }

    status.begin();
    let result = export_to(sink, bundle, format, now, None).await;
    match &result {
        Ok(_) => status.succeed(),
        Err(e) => status.fail(e.to_string()),
    }
    result
}

#[cfg(test)]
mod tests {
    use std::io;

    use async_trait::async_trait;
    use chrono::TimeZone;
    use parking_lot::Mutex;

    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        saved: Mutex<Vec<(String, String, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl ExportSink for RecordingSink {
        async fn save(&self, bytes: &[u8], filename: &str, mime_type: &str) -> io::Result<()> {
            if self.fail {
                return Err(io::Error::other("disk full"));
            }
            self.saved.lock().push((
                String::from_utf8_lossy(bytes).into_owned(),
                filename.to_string(),
                mime_type.to_string(),
            ));
            Ok(())
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 22, 14, 5, 9).unwrap()
    }

    fn sample_bundle() -> ExportBundle {
        ExportBundle {
            events: vec![UsageEvent {
                id: "e1".into(),
                created_at: now(),
                company_id: "c1".into(),
                company_name: "Acme".into(),
                event_type: "api_call".into(),
                content: String::new(),
                attribute: String::new(),
                user: "alice".into(),
                endpoint: "/things".into(),
                updated_at: None,
                original_timestamp: None,
                value: Some(2.0),
            }],
            filters: ExportFilters {
                companies: vec!["Acme".into()],
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_encode_refuses_empty_bundle() {
        let err = encode(&ExportBundle::default(), ExportFormat::Csv, now()).unwrap_err();
        assert!(matches!(err, ExportError::EmptyDataset));
    }

    #[test]
    fn test_encode_sets_mime_and_filename() {
        let artifact = encode(&sample_bundle(), ExportFormat::Json, now()).unwrap();
        assert_eq!(artifact.mime_type, "application/json;charset=utf-8;");
        assert_eq!(artifact.filename, "analytics-export-2025-07-22-14-05-09-Acme.json");
    }

    #[tokio::test]
    async fn test_export_to_custom_filename() {
        let sink = RecordingSink::default();
        let artifact = export_to(
            &sink,
            &sample_bundle(),
            ExportFormat::Csv,
            now(),
            Some("mine.csv"),
        )
        .await
        .unwrap();

        assert_eq!(artifact.filename, "mine.csv");
        let saved = sink.saved.lock();
        assert_eq!(saved[0].1, "mine.csv");
        assert_eq!(saved[0].2, "text/csv;charset=utf-8;");
        assert_eq!(saved[0].0.lines().count(), 2);
    }

    #[tokio::test]
    async fn test_sink_failure_is_wrapped() {
        let sink = RecordingSink {
            fail: true,
            ..Default::default()
        };
        let err = export_to(&sink, &sample_bundle(), ExportFormat::Csv, now(), None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to export data: disk full");
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_tracks_outcome() {
        let status = ExportStatus::default();
        let sink = RecordingSink::default();

        export_with_status(&status, &sink, &ExportBundle::default(), ExportFormat::Csv, now())
            .await
            .unwrap_err();
        assert_eq!(
            status.state(),
            ExportState::Error("No data available to export".into())
        );

        export_with_status(&status, &sink, &sample_bundle(), ExportFormat::Csv, now())
            .await
            .unwrap();
        assert_eq!(status.state(), ExportState::Success);
    }
}
