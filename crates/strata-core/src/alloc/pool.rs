//! Type-keyed object pool for transient scratch collections.
//!
//! The runtime hands out maps and vectors for a single dispatch and takes them
//! back afterwards, so steady-state input handling does not allocate. The pool
//! is owned by whoever uses it; there is no global instance.

use std::any::{Any, TypeId, type_name};
use std::collections::VecDeque;
use std::hash::{BuildHasher, Hash};

use super::HashMap;
use crate::profiling::profile_function;

/// Values that can be cleared and handed out again.
pub trait Poolable: 'static {
    /// Returns the value to its empty state, keeping allocations.
    fn reset(&mut self);
}

impl<T: 'static> Poolable for Vec<T> {
    fn reset(&mut self) {
        self.clear();
    }
}

impl<T: 'static> Poolable for VecDeque<T> {
    fn reset(&mut self) {
        self.clear();
    }
}

impl<K: 'static, V: 'static, S: 'static> Poolable for std::collections::HashMap<K, V, S> {
    fn reset(&mut self) {
        self.clear();
    }
}

impl<K: 'static, V: 'static> Poolable for ahash::AHashMap<K, V> {
    fn reset(&mut self) {
        self.clear();
    }
}

impl<T: 'static, S: 'static> Poolable for std::collections::HashSet<T, S>
where
    T: Eq + Hash,
    S: BuildHasher,
{
    fn reset(&mut self) {
        self.clear();
    }
}

impl<T: 'static + Eq + Hash> Poolable for ahash::AHashSet<T> {
    fn reset(&mut self) {
        self.clear();
    }
}

struct Bucket {
    type_name: &'static str,
    items: Vec<Box<dyn Any>>,
    high_water: usize,
    created: usize,
}

impl Bucket {
    fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            items: Vec::new(),
            high_water: 0,
            created: 0,
        }
    }
}

/// Per-type counters reported by [`Pool::stats`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub type_name: &'static str,
    /// Items currently parked in the pool.
    pub available: usize,
    /// Largest number of items ever parked at once.
    pub high_water: usize,
    /// Items constructed because the pool was empty.
    pub created: usize,
}

/// A free-list of reusable values keyed by type.
#[derive(Default)]
pub struct Pool {
    buckets: HashMap<TypeId, Bucket>,
    limit: Option<usize>,
}

impl Pool {
    /// Creates an unbounded pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a pool that keeps at most `limit` items of each type.
    pub fn bounded(limit: usize) -> Self {
        Self {
            buckets: HashMap::new(),
            limit: Some(limit),
        }
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn set_limit(&mut self, limit: Option<usize>) {
        self.limit = limit;
        if let Some(limit) = limit {
            self.trim(limit);
        }
    }

    /// Takes a value from the pool, constructing a default one if empty.
    pub fn get<T: Poolable + Default>(&mut self) -> T {
        self.get_or_else(T::default)
    }

    /// Takes a value from the pool, constructing it with `create` if empty.
    pub fn get_or_else<T: Poolable>(&mut self, create: impl FnOnce() -> T) -> T {
        profile_function!();
        let bucket = self
            .buckets
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Bucket::new(type_name::<T>()));
        while let Some(item) = bucket.items.pop() {
            match item.downcast::<T>() {
                Ok(item) => return *item,
                Err(_) => {
                    tracing::warn!(pool = bucket.type_name, "discarding mistyped pool entry");
                }
            }
        }
        bucket.created += 1;
        create()
    }

    /// Resets `item` and parks it for reuse.
    ///
    /// Items beyond the configured limit are dropped.
    pub fn collect<T: Poolable>(&mut self, mut item: T) {
        item.reset();
        let bucket = self
            .buckets
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Bucket::new(type_name::<T>()));
        if self.limit.is_some_and(|limit| bucket.items.len() >= limit) {
            return;
        }
        bucket.items.push(Box::new(item));
        bucket.high_water = bucket.high_water.max(bucket.items.len());
    }

    /// Number of parked items of type `T`.
    pub fn available<T: 'static>(&self) -> usize {
        self.buckets
            .get(&TypeId::of::<T>())
            .map_or(0, |bucket| bucket.items.len())
    }

    /// Shrinks every bucket to at most `high_water` parked items.
    pub fn trim(&mut self, high_water: usize) {
        for bucket in self.buckets.values_mut() {
            if bucket.items.len() > high_water {
                tracing::trace!(
                    pool = bucket.type_name,
                    from = bucket.items.len(),
                    to = high_water,
                    "trimming pool"
                );
                bucket.items.truncate(high_water);
                bucket.items.shrink_to(high_water);
            }
        }
    }

    /// Drops every parked item.
    pub fn clear(&mut self) {
        self.buckets.clear();
    }

    pub fn stats(&self) -> Vec<PoolStats> {
        let mut stats: Vec<_> = self
            .buckets
            .values()
            .map(|bucket| PoolStats {
                type_name: bucket.type_name,
                available: bucket.items.len(),
                high_water: bucket.high_water,
                created: bucket.created,
            })
            .collect();
        stats.sort_by_key(|s| s.type_name);
        stats
    }
}

impl std::fmt::Debug for Pool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool")
            .field("limit", &self.limit)
            .field("stats", &self.stats())
            .finish()
    }
}
