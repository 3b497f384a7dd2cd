// In-memory caching for release verification results
// Keeps GitHub API calls down when the same repos keep showing up in searches

pub mod lru;

pub use lru::{Cached, LruCache, SharedVerifyCache};
