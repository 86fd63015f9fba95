//! Chart labels and series colours.

use super::timeseries::parse_timestamp;
use crate::query::Timeframe;

/// Series palette, assigned by index and wrapping after the last colour.
pub const SERIES_COLORS: [&str; 10] = [
    "#8884d8", "#82ca9d", "#ffc658", "#ff7300", "#ff0000", "#00ff00", "#0000ff", "#ffff00",
    "#ff00ff", "#00ffff",
];

pub fn series_color(index: usize) -> &'static str {
    SERIES_COLORS[index % SERIES_COLORS.len()]
}

/// Axis tick label: `Jun 01` for daily and weekly buckets, `Jun 2025` for
/// monthly ones. Input that does not parse is returned unchanged.
pub fn format_axis_date(raw: &str, timeframe: Timeframe) -> String {
    let Some(dt) = parse_timestamp(raw) else {
        return raw.to_string();
    };
    match timeframe {
        Timeframe::Monthly => dt.format("%b %Y").to_string(),
        Timeframe::Daily | Timeframe::Weekly => dt.format("%b %d").to_string(),
    }
}

/// Tooltip label, e.g. `Jun 01, 2025`. Input that does not parse is
/// returned unchanged.
pub fn format_tooltip_date(raw: &str) -> String {
    match parse_timestamp(raw) {
        Some(dt) => dt.format("%b %d, %Y").to_string(),
        None => raw.to_string(),
    }
}
