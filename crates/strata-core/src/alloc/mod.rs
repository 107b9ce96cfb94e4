//! Optimized allocation and collection types for Strata.
//!
//! This module provides:
//! - Re-exports of optimized hash collections using AHash
//! - SparseSet data structure for generational indices
//! - A type-keyed object pool for transient scratch collections

pub mod pool;
pub mod sparse_set;

// Re-export optimized hash collections
pub use ahash::{AHashMap as HashMap, AHashSet as HashSet, RandomState};

pub use pool::{Pool, PoolStats, Poolable};
pub use sparse_set::{IndexSlot, SparseSet};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hashmap_ahash() {
        let mut map = HashMap::new();
        map.insert("ui_cancel", 1);
        assert_eq!(map.get("ui_cancel"), Some(&1));
    }

    #[test]
    fn test_hashset_ahash() {
        let mut set = HashSet::new();
        set.insert("ui_accept");
        assert!(set.contains("ui_accept"));
    }
}
