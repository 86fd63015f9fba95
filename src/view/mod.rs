//! Stateful view models over the fetch adapter.

mod dashboard;
mod explorer;
mod table;

pub use dashboard::{DashboardSnapshot, load_dashboard};
pub use explorer::EventExplorer;
pub use table::{EventTable, ExplorerFilters};
