//! End-to-end tests against a mock analytics backend.

mod analytics_e2e;
