// Cache module.
// Time-boxed cache for GitHub API responses over a pluggable key-value store.

pub mod clock;
pub mod keys;
pub mod service;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use keys::{commits_key, events_key, repos_key};
pub use service::{CacheEntry, CacheService, DEFAULT_TTL};
pub use store::{CacheStorage, FileStorage, MemoryStorage};
