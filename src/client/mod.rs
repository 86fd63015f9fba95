//! Remote fetch adapter.
//!
//! [`Transport`] performs a single GET. [`QueryClient`] layers caching,
//! de-duplication of concurrent identical requests and retries on top, and
//! reports results as [`QueryState`]. [`AnalyticsService`] gives every
//! backend endpoint a typed method.

mod error;
mod query_client;
mod retry;
mod service;
mod state;
mod transport;

#[cfg(test)]
pub(crate) mod test_utils;

pub use error::{ClientError, FetchError};
pub use query_client::QueryClient;
pub use retry::with_retry;
pub use service::AnalyticsService;
pub use state::QueryState;
pub use transport::{HttpTransport, Transport};
