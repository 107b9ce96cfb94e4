//! Generational slot storage.
//!
//! Removing an element bumps its slot generation, so stale [`IndexSlot`]s are
//! detected instead of aliasing a newer element that reused the slot.

use std::num::NonZeroU64;

use crate::profiling::profile_function;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IndexSlot(NonZeroU64);

impl IndexSlot {
    pub fn new(generation: u32, idx: u32) -> Self {
        debug_assert!(idx < u32::MAX, "slot index out of range");
        // SAFETY: the low half stores `idx + 1`, which is never zero.
        Self(unsafe {
            NonZeroU64::new_unchecked(((generation as u64) << 32) | (idx as u64 + 1))
        })
    }

    pub fn generation(&self) -> u32 {
        (self.0.get() >> 32) as u32
    }

    pub fn index(&self) -> u32 {
        (self.0.get() & u32::MAX as u64) as u32 - 1
    }

    /// Raw packed value, useful as a stable key in logs.
    pub fn to_bits(&self) -> u64 {
        self.0.get()
    }
}

struct Entry<T> {
    generation: u32,
    data: Option<T>,
}

pub struct SparseSet<T> {
    vec: Vec<Entry<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T> SparseSet<T> {
    pub const fn new() -> Self {
        Self {
            vec: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    pub fn push(&mut self, data: T) -> IndexSlot {
        profile_function!();
        self.len += 1;
        if let Some(idx) = self.free.pop() {
            let entry = &mut self.vec[idx as usize];
            entry.data = Some(data);
            IndexSlot::new(entry.generation, idx)
        } else {
            let idx = self.vec.len() as u32;
            self.vec.push(Entry {
                generation: 0,
                data: Some(data),
            });
            IndexSlot::new(0, idx)
        }
    }

    /// Returns the element behind `idx`.
    ///
    /// # Panics
    /// Panics if the slot was freed (use after free).
    pub fn get(&self, idx: IndexSlot) -> &T {
        self.try_get(idx).expect("invalid generation, use after free!")
    }

    /// Mutable variant of [`SparseSet::get`].
    ///
    /// # Panics
    /// Panics if the slot was freed (use after free).
    pub fn get_mut(&mut self, idx: IndexSlot) -> &mut T {
        self.try_get_mut(idx)
            .expect("invalid generation, use after free!")
    }

    pub fn try_get(&self, idx: IndexSlot) -> Option<&T> {
        self.vec
            .get(idx.index() as usize)
            .filter(|entry| entry.generation == idx.generation())
            .and_then(|entry| entry.data.as_ref())
    }

    pub fn try_get_mut(&mut self, idx: IndexSlot) -> Option<&mut T> {
        self.vec
            .get_mut(idx.index() as usize)
            .filter(|entry| entry.generation == idx.generation())
            .and_then(|entry| entry.data.as_mut())
    }

    pub fn contains(&self, idx: IndexSlot) -> bool {
        self.try_get(idx).is_some()
    }

    /// Removes the element behind `idx`.
    ///
    /// # Panics
    /// Panics if the slot was already freed.
    pub fn remove(&mut self, idx: IndexSlot) -> T {
        self.try_remove(idx)
            .expect("invalid generation, use after free!")
    }

    pub fn try_remove(&mut self, idx: IndexSlot) -> Option<T> {
        profile_function!();
        let index = idx.index();
        let entry = self.vec.get_mut(index as usize)?;
        if entry.generation != idx.generation() {
            return None;
        }
        let data = entry.data.take()?;
        entry.generation = entry.generation.wrapping_add(1);
        self.free.push(index);
        self.len -= 1;
        Some(data)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.vec.iter().filter_map(|entry| entry.data.as_ref())
    }

    /// Iterates live elements together with their slots.
    pub fn iter_with_slots(&self) -> impl Iterator<Item = (IndexSlot, &T)> + '_ {
        self.vec.iter().enumerate().filter_map(|(idx, entry)| {
            entry
                .data
                .as_ref()
                .map(|data| (IndexSlot::new(entry.generation, idx as u32), data))
        })
    }

    /// Slots of every live element, in storage order.
    pub fn slots(&self) -> impl Iterator<Item = IndexSlot> + '_ {
        self.iter_with_slots().map(|(slot, _)| slot)
    }
}

impl<T> Default for SparseSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

static_assertions::assert_eq_size!(IndexSlot, Option<IndexSlot>);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparse_set_push() {
        let mut set = SparseSet::<u8>::new();
        let idx = set.push(15);
        assert_eq!(idx.generation(), 0);
        assert_eq!(idx.index(), 0);
        assert_eq!(*set.get(idx), 15);
        assert_eq!(set.len(), 1);
    }

    #[test]
    #[should_panic]
    fn test_sparse_set_uaf() {
        let mut set = SparseSet::<u8>::new();
        let _ = set.push(15);
        let idx = IndexSlot::new(1, 0);
        let _ = set.get(idx);
    }

    #[test]
    fn test_sparse_set_remove_bumps_generation() {
        let mut set = SparseSet::<u8>::new();
        let idx = set.push(15);
        assert_eq!(set.remove(idx), 15);
        let new_idx = set.push(45);
        assert_eq!(idx.index(), new_idx.index());
        assert_ne!(idx.generation(), new_idx.generation());
        assert!(set.try_get(idx).is_none());
        assert!(set.try_remove(idx).is_none());
    }

    #[test]
    fn test_sparse_set_iter_skips_freed() {
        let mut set = SparseSet::<u8>::new();
        let slots: Vec<_> = (0..10).map(|i| set.push(i)).collect();
        set.remove(slots[0]);
        set.remove(slots[3]);
        let values: Vec<_> = set.iter().copied().collect();
        assert_eq!(values, vec![1, 2, 4, 5, 6, 7, 8, 9]);
        assert_eq!(set.slots().count(), 8);
        assert!(set.iter_with_slots().all(|(slot, v)| set.get(slot) == v));
    }
}
