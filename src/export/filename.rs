use chrono::{DateTime, Utc};

use super::{ExportFilters, ExportFormat};

/// `analytics-export-{date}-{time}[-{start}-to-{end}][-{company}|-{n}-companies].{ext}`
///
/// The range suffix needs both bounds. Output depends only on `now` and the
/// filters.
pub fn export_filename(format: ExportFormat, filters: &ExportFilters, now: DateTime<Utc>) -> String {
    let mut name = format!("analytics-export-{}", now.format("%Y-%m-%d-%H-%M-%S"));

    if let (Some(start), Some(end)) = (filters.start_date, filters.end_date) {
        name.push_str(&format!("-{start}-to-{end}"));
    }
    match filters.companies.as_slice() {
        [] => {}
        [only] => name.push_str(&format!("-{only}")),
        many => name.push_str(&format!("-{}-companies", many.len())),
    }

    format!("{name}.{}", format.extension())
}
