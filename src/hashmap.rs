//! A separate-chaining hash map over opaque keys, generic on the hash builder.
//!
//! Buckets are plain `Vec<(K, V)>`s; the map never inspects key structure beyond hashing and
//! comparing it, so key types only need `Hash + Eq`. The default hasher is `rustc_hash::FxHasher`,
//! chosen for its speed on the short string keys this crate uses it for (header names/values,
//! cache paths); callers needing a different hash function can supply their own `BuildHasher`.

use rustc_hash::FxHasher;
use std::hash::{BuildHasher, BuildHasherDefault, Hash};

pub type FxBuildHasher = BuildHasherDefault<FxHasher>;

const DEFAULT_BUCKETS: usize = 16;
const MAX_LOAD_FACTOR: f64 = 0.75;

#[derive(Debug, Clone)]
pub struct ChainedMap<K, V, S = FxBuildHasher> {
    buckets: Vec<Vec<(K, V)>>,
    len: usize,
    hash_builder: S,
}

impl<K: Hash + Eq, V> ChainedMap<K, V, FxBuildHasher> {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUCKETS)
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self::with_hasher(cap, FxBuildHasher::default())
    }
}

impl<K: Hash + Eq, V> Default for ChainedMap<K, V, FxBuildHasher> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> ChainedMap<K, V, S> {
    pub fn with_hasher(cap: usize, hash_builder: S) -> Self {
        let cap = cap.max(1);
        Self {
            buckets: (0..cap).map(|_| Vec::new()).collect(),
            len: 0,
            hash_builder,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn bucket_index(&self, key: &K) -> usize {
        (self.hash_builder.hash_one(key) as usize) % self.buckets.len()
    }

    /// Inserts `key => value`, returning the previous value if `key` was already present
    /// (matching the codec's "later value replaces the earlier" rule for repeated headers).
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if self.len + 1 > (self.buckets.len() as f64 * MAX_LOAD_FACTOR) as usize {
            self.grow();
        }
        let idx = self.bucket_index(&key);
        let bucket = &mut self.buckets[idx];
        if let Some(slot) = bucket.iter_mut().find(|(k, _)| *k == key) {
            return Some(std::mem::replace(&mut slot.1, value));
        }
        bucket.push((key, value));
        self.len += 1;
        None
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        let idx = self.bucket_index(key);
        self.buckets[idx].iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let idx = self.bucket_index(key);
        self.buckets[idx]
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        let idx = self.bucket_index(key);
        let bucket = &mut self.buckets[idx];
        let pos = bucket.iter().position(|(k, _)| k == key)?;
        self.len -= 1;
        Some(bucket.swap_remove(pos).1)
    }

    /// Removes every entry for which `f` returns `false`.
    pub fn retain(&mut self, mut f: impl FnMut(&K, &mut V) -> bool) {
        for bucket in &mut self.buckets {
            let before = bucket.len();
            bucket.retain_mut(|(k, v)| f(k, v));
            self.len -= before - bucket.len();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.buckets.iter().flat_map(|b| b.iter().map(|(k, v)| (k, v)))
    }

    fn grow(&mut self) {
        let new_cap = self.buckets.len() * 2;
        let old_buckets = std::mem::replace(&mut self.buckets, (0..new_cap).map(|_| Vec::new()).collect());
        for bucket in old_buckets {
            for (k, v) in bucket {
                let idx = self.bucket_index(&k);
                self.buckets[idx].push((k, v));
            }
        }
    }
}
