use std::hash::Hash;
use std::time::{Duration, Instant};

use dashmap::DashMap;

#[derive(Debug, Clone)]
struct Stamped<V> {
    inserted_at: Instant,
    value: V,
}

/// In-memory map whose entries expire `ttl` after insertion.
///
/// Expired entries are dropped lazily on lookup and when the map grows past
/// `max_entries`; when it is still over capacity after that, the oldest
/// entry is evicted.
#[derive(Debug)]
pub struct TtlCache<K, V>
where
    K: Eq + Hash,
{
    ttl: Duration,
    max_entries: usize,
    entries: DashMap<K, Stamped<V>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            ttl,
            max_entries: max_entries.max(1),
            entries: DashMap::new(),
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let (fresh, value) = self.entries.get(key).map(|entry| {
            (entry.inserted_at.elapsed() < self.ttl, entry.value.clone())
        })?;

        if fresh {
            Some(value)
        } else {
            self.entries.remove(key);
            None
        }
    }

    pub fn insert(&self, key: K, value: V) {
        self.entries.insert(
            key,
            Stamped {
                inserted_at: Instant::now(),
                value,
            },
        );

        if self.entries.len() > self.max_entries {
            self.purge_expired();
        }
        while self.entries.len() > self.max_entries {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|entry| entry.inserted_at)
                .map(|entry| entry.key().clone());
            match oldest {
                Some(key) => {
                    self.entries.remove(&key);
                }
                None => break,
            }
        }
    }

    fn purge_expired(&self) {
        let ttl = self.ttl;
        self.entries
            .retain(|_, entry| entry.inserted_at.elapsed() < ttl);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
