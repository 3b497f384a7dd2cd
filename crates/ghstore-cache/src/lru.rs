use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

/// Outcome of a cache lookup that actually found an entry.
///
/// A `NegativeHit` means we already checked this key and the answer was "no" -
/// that is a real, stored result, not the same thing as a missing key. Callers
/// that treat both as `None` end up re-fetching repos we already know have no
/// installer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cached<V> {
    Hit(V),
    NegativeHit,
}

struct Entry<V> {
    value: Option<V>,
    last_used: u64,
}

/// Capacity-bounded map evicting the least-recently-accessed entry.
///
/// Both `get` and `insert` count as an access. Recency is tracked with a
/// monotonic counter rather than a linked list - at a few hundred entries a
/// linear scan on eviction is cheaper than the bookkeeping it replaces.
///
/// The cache itself is not thread-safe; share it as a [`SharedVerifyCache`]
/// so every read and write goes through one critical section.
pub struct LruCache<K, V> {
    entries: HashMap<K, Entry<V>>,
    capacity: usize,
    clock: u64,
}

/// The process-wide shared form: one lock guarding both lookup and store.
pub type SharedVerifyCache<K, V> = Arc<Mutex<LruCache<K, V>>>;

impl<K, V> LruCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity: capacity.max(1),
            clock: 0,
        }
    }

    /// Convenience constructor for the shared, lock-guarded form.
    pub fn shared(capacity: usize) -> SharedVerifyCache<K, V> {
        Arc::new(Mutex::new(Self::new(capacity)))
    }

    /// Look up a key, refreshing its recency on hit.
    pub fn get(&mut self, key: &K) -> Option<Cached<V>> {
        self.clock += 1;
        let clock = self.clock;
        let entry = self.entries.get_mut(key)?;
        entry.last_used = clock;
        Some(match &entry.value {
            Some(v) => Cached::Hit(v.clone()),
            None => Cached::NegativeHit,
        })
    }

    /// Store a result. `None` records a confirmed negative ("checked, nothing
    /// there"), which later reads see as [`Cached::NegativeHit`].
    pub fn insert(&mut self, key: K, value: Option<V>) {
        self.clock += 1;
        let clock = self.clock;
        self.entries.insert(key, Entry { value, last_used: clock });

        while self.entries.len() > self.capacity {
            self.evict_least_recent();
        }
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn evict_least_recent(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_used)
            .map(|(key, _)| key.clone());

        if let Some(key) = oldest {
            self.entries.remove(&key);
            debug!("evicted least-recently-accessed cache entry");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_positive_values() {
        let mut cache: LruCache<String, u32> = LruCache::new(10);
        cache.insert("a".into(), Some(7));
        assert_eq!(cache.get(&"a".into()), Some(Cached::Hit(7)));
    }

    #[test]
    fn negative_marker_is_distinct_from_missing() {
        let mut cache: LruCache<String, u32> = LruCache::new(10);
        cache.insert("checked".into(), None);

        assert_eq!(cache.get(&"checked".into()), Some(Cached::NegativeHit));
        assert_eq!(cache.get(&"never-seen".into()), None);
    }

    #[test]
    fn insert_overwrites_existing_entry() {
        let mut cache: LruCache<String, u32> = LruCache::new(10);
        cache.insert("a".into(), Some(1));
        cache.insert("a".into(), Some(2));
        assert_eq!(cache.get(&"a".into()), Some(Cached::Hit(2)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn evicts_least_recently_accessed() {
        let mut cache: LruCache<String, u32> = LruCache::new(3);
        cache.insert("a".into(), Some(1));
        cache.insert("b".into(), Some(2));
        cache.insert("c".into(), Some(3));

        // Touch "a" so "b" becomes the coldest entry.
        assert!(cache.get(&"a".into()).is_some());
        cache.insert("d".into(), Some(4));

        assert_eq!(cache.get(&"b".into()), None);
        assert!(cache.get(&"a".into()).is_some());
        assert!(cache.get(&"c".into()).is_some());
        assert!(cache.get(&"d".into()).is_some());
    }

    #[test]
    fn overflow_past_capacity_drops_oldest_keys() {
        let mut cache: LruCache<u32, u32> = LruCache::new(500);
        for i in 0..501 {
            cache.insert(i, Some(i));
        }
        assert_eq!(cache.len(), 500);
        // Key 0 was the least recently accessed distinct key.
        assert_eq!(cache.get(&0), None);
        assert!(cache.get(&500).is_some());
    }

    #[test]
    fn zero_capacity_is_clamped_to_one() {
        let mut cache: LruCache<u32, u32> = LruCache::new(0);
        cache.insert(1, Some(1));
        assert!(cache.get(&1).is_some());
    }
}
