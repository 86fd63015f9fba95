//! Query result cache.

mod keys;
mod memory;
mod traits;

pub use keys::QueryKey;
pub use memory::MemoryQueryCache;
pub use traits::{CachedQuery, QueryCache};
