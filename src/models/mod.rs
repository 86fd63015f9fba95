//! Wire types of the analytics backend.

mod analytics;
mod event;
mod retention;
mod trends;

pub use analytics::*;
pub use event::*;
pub use retention::*;
pub use trends::*;
