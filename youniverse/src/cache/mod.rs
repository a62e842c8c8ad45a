//! Cache storage for profile lookups.

mod memory;
mod traits;

pub use memory::MemoryCache;
pub use traits::{CacheStorage, CacheStorageExt};

pub(crate) use traits::profile_key;
