//! CSV and JSON encodings of an export bundle.

use chrono::{DateTime, SecondsFormat, Utc};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use serde::Serialize;

use super::{ExportBundle, ExportError, ExportFilters};
use crate::models::UsageEvent;

pub const CSV_MIME_TYPE: &str = "text/csv;charset=utf-8;";
pub const JSON_MIME_TYPE: &str = "application/json;charset=utf-8;";

const CSV_HEADERS: [&str; 11] = [
    "ID",
    "Created At",
    "Company Name",
    "Type",
    "Content",
    "Attribute",
    "User",
    "Endpoint",
    "Updated At",
    "Original Timestamp",
    "Value",
];

/// Encode events as CSV: a header line plus one line per event.
///
/// Every field is wrapped in double quotes and embedded quotes are written
/// as-is, so a field containing `"` produces a line that strict CSV readers
/// will misparse. No trailing newline. An empty bundle encodes to `""`.
///
/// A `Value` of zero is written as an empty field, the same as a missing one.
pub fn to_csv(bundle: &ExportBundle) -> Result<String, ExportError> {
    if bundle.events.is_empty() {
        return Ok(String::new());
    }

    let mut wtr = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(vec![]);

    wtr.write_record(CSV_HEADERS.iter().map(|h| quoted(h)))
        .map_err(|e| ExportError::Encode(e.to_string()))?;
    for event in &bundle.events {
        wtr.write_record(csv_fields(event).iter().map(|f| quoted(f)))
            .map_err(|e| ExportError::Encode(e.to_string()))?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| ExportError::Encode(e.to_string()))?;
    let mut content = String::from_utf8(bytes).map_err(|e| ExportError::Encode(e.to_string()))?;
    if content.ends_with('\n') {
        content.pop();
    }
    Ok(content)
}

fn quoted(field: &str) -> String {
    format!("\"{field}\"")
}

fn csv_fields(event: &UsageEvent) -> [String; 11] {
    [
        event.id.clone(),
        timestamp(&event.created_at),
        event.company_name.clone(),
        event.event_type.clone(),
        event.content.clone(),
        event.attribute.clone(),
        event.user.clone(),
        event.endpoint.clone(),
        event.updated_at.as_ref().map(timestamp).unwrap_or_default(),
        event
            .original_timestamp
            .as_ref()
            .map(timestamp)
            .unwrap_or_default(),
        event
            .value
            .filter(|v| *v != 0.0 && !v.is_nan())
            .map(|v| v.to_string())
            .unwrap_or_default(),
    ]
}

fn timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonMetadata<'a> {
    export_date: String,
    total_records: usize,
    filters: &'a ExportFilters,
}

#[derive(Serialize)]
struct JsonEnvelope<'a> {
    metadata: JsonMetadata<'a>,
    data: &'a [UsageEvent],
}

/// Encode events in a pretty-printed `{metadata, data}` envelope.
pub fn to_json(bundle: &ExportBundle, now: DateTime<Utc>) -> Result<String, ExportError> {
    let envelope = JsonEnvelope {
        metadata: JsonMetadata {
            export_date: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            total_records: bundle.events.len(),
            filters: &bundle.filters,
        },
        data: &bundle.events,
    };
    serde_json::to_string_pretty(&envelope).map_err(|e| ExportError::Encode(e.to_string()))
}
