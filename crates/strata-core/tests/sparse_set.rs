//! SparseSet generational handle tests.
//!
//! Panels live in a SparseSet, so stale handles to destroyed panels must be
//! detected rather than resolve to a newer panel occupying the same slot.

use strata_core::alloc::sparse_set::{IndexSlot, SparseSet};

#[test]
fn test_push_and_get() {
    let mut set = SparseSet::new();

    let idx = set.push("title");
    let idx2 = set.push("settings");

    assert_eq!(*set.get(idx), "title");
    assert_eq!(*set.get(idx2), "settings");
}

#[test]
fn test_get_mut() {
    let mut set = SparseSet::new();

    let idx = set.push(42);
    *set.get_mut(idx) = 100;

    assert_eq!(*set.get(idx), 100);
}

#[test]
fn test_try_get_invalid_returns_none() {
    let set = SparseSet::<i32>::new();

    let invalid = IndexSlot::new(0, 999);
    assert_eq!(set.try_get(invalid), None);
}

#[test]
fn test_stale_handle_after_slot_reuse() {
    let mut set = SparseSet::new();

    let old = set.push(1);
    set.remove(old);
    let new = set.push(2);

    assert_eq!(old.index(), new.index());
    assert_eq!(set.try_get(old), None);
    assert_eq!(set.try_get_mut(old), None);
    assert!(!set.contains(old));
    assert_eq!(set.try_get(new), Some(&2));
}

#[test]
#[should_panic(expected = "use after free")]
fn test_remove_twice_panics() {
    let mut set = SparseSet::new();

    let idx = set.push(1);
    set.remove(idx);
    set.remove(idx);
}

#[test]
fn test_len_tracks_live_entries() {
    let mut set = SparseSet::new();
    assert!(set.is_empty());

    let slots: Vec<_> = (0..5).map(|i| set.push(i)).collect();
    assert_eq!(set.len(), 5);

    set.remove(slots[1]);
    set.remove(slots[2]);
    assert_eq!(set.len(), 3);

    set.push(9);
    assert_eq!(set.len(), 4);
}

#[test]
fn test_generation_increments_each_reuse() {
    let mut set = SparseSet::new();

    let mut idx = set.push(0);
    for expected in 1..4 {
        set.remove(idx);
        idx = set.push(expected);
        assert_eq!(idx.generation(), expected);
        assert_eq!(idx.index(), 0);
    }
}
