//! View-model layer for a usage-events analytics dashboard.
//!
//! - [`query`] turns partial filter input into canonical request parameters.
//! - [`client`] fetches them with caching, de-duplication and retries.
//! - [`reshape`] turns backend rows into chart-ready series.
//! - [`view`] holds the paginated event table and the dashboard loader.
//! - [`export`] encodes the visible rows as CSV or JSON.

pub mod cache;
pub mod client;
pub mod config;
pub mod debounce;
pub mod export;
pub mod models;
#[cfg(feature = "cli")]
pub mod observability;
pub mod query;
pub mod reshape;
pub mod view;

#[cfg(test)]
mod tests;
