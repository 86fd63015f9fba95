//! Pure transforms from backend rows to chart-ready view models.
//!
//! Nothing here mutates its input; every function works on a copy.

mod format;
mod retention;
mod timeseries;

pub use format::{SERIES_COLORS, format_axis_date, format_tooltip_date, series_color};
pub use retention::{RetentionRow, retention_curve};
pub use timeseries::{
    ChartSeries, CompanyChart, SeriesTotal, parse_timestamp, series_totals, sort_chronologically,
};
