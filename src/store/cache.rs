//! Sharded concurrent map for the shared in-process caches.
//!
//! Each key hashes to one shard with its own `RwLock`, so writers for
//! different users rarely touch the same lock and never hold one across an
//! await point.

use std::collections::hash_map::RandomState;
use std::collections::HashMap;
use std::hash::{BuildHasher, Hash};
use std::sync::{PoisonError, RwLock};

const DEFAULT_SHARDS: usize = 16;

#[derive(Debug)]
pub struct ShardedCache<K, V> {
    shards: Vec<RwLock<HashMap<K, V>>>,
    hasher: RandomState,
}

impl<K, V> Default for ShardedCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> ShardedCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new() -> Self {
        Self::with_shards(DEFAULT_SHARDS)
    }

    pub fn with_shards(count: usize) -> Self {
        let count = count.max(1);
        Self {
            shards: (0..count).map(|_| RwLock::new(HashMap::new())).collect(),
            hasher: RandomState::new(),
        }
    }

    fn shard(&self, key: &K) -> &RwLock<HashMap<K, V>> {
        let index = (self.hasher.hash_one(key) as usize) % self.shards.len();
        &self.shards[index]
    }

    /// Insert or replace, returning the previous value
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        let mut shard = self
            .shard(&key)
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        shard.insert(key, value)
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let shard = self
            .shard(key)
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        shard.get(key).cloned()
    }

    pub fn contains_key(&self, key: &K) -> bool {
        let shard = self
            .shard(key)
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        shard.contains_key(key)
    }

    /// Snapshot of every value (shard by shard, not atomic across shards)
    pub fn values(&self) -> Vec<V> {
        let mut out = Vec::new();
        for shard in &self.shards {
            let shard = shard.read().unwrap_or_else(PoisonError::into_inner);
            out.extend(shard.values().cloned());
        }
        out
    }

    pub fn len(&self) -> usize {
        self.shards
            .iter()
            .map(|s| s.read().unwrap_or_else(PoisonError::into_inner).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_insert_get_replace() {
        let cache: ShardedCache<u32, String> = ShardedCache::new();
        assert!(cache.insert(1, "a".into()).is_none());
        assert_eq!(cache.insert(1, "b".into()), Some("a".to_string()));
        assert_eq!(cache.get(&1), Some("b".to_string()));
        assert!(cache.get(&2).is_none());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_single_shard_still_works() {
        let cache: ShardedCache<u32, u32> = ShardedCache::with_shards(0);
        for i in 0..10 {
            cache.insert(i, i * 2);
        }
        assert_eq!(cache.len(), 10);
        assert_eq!(cache.get(&7), Some(14));
    }

    #[tokio::test]
    async fn test_concurrent_writers_do_not_lose_entries() {
        let cache: Arc<ShardedCache<u32, u32>> = Arc::new(ShardedCache::new());
        let mut handles = Vec::new();

        for task in 0..8u32 {
            let cache = Arc::clone(&cache);
            handles.push(tokio::spawn(async move {
                for i in 0..250u32 {
                    cache.insert(task * 1000 + i, i);
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(cache.len(), 2000);
        assert_eq!(cache.values().len(), 2000);
    }
}
