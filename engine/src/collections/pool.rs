// SPDX-FileCopyrightText: 2025 Jens Pitkänen <jens.pitkanen@helsinki.fi>
//
// SPDX-License-Identifier: GPL-3.0-or-later

use core::fmt::Debug;

use super::{BoundsError, DynVec};

enum Slot<T> {
    Occupied(T),
    Vacant,
}

/// Growable pool of `T` with stable slot indices.
///
/// Unlike [`DynVec`], erasing does not shift anything around: the slot is
/// simply marked vacant and its index is reused by a later
/// [`Pool::insert`]. Useful for collections where the identity of an element
/// matters more than its order, like the set of currently running workers.
pub struct Pool<T> {
    slots: DynVec<Slot<T>>,
    /// Indices of the vacant entries in `slots`, reused before `slots` grows.
    free_slots: DynVec<usize>,
    live_len: usize,
}

impl<T> Pool<T> {
    /// Creates a new empty pool.
    pub fn new() -> Pool<T> {
        Pool {
            slots: DynVec::new(),
            free_slots: DynVec::new(),
            live_len: 0,
        }
    }

    /// Stores the value in a vacant slot, or a new one if there are none, and
    /// returns the index of the slot.
    pub fn insert(&mut self, value: T) -> usize {
        self.live_len += 1;
        if let Some(slot) = self.free_slots.pop() {
            self.slots[slot] = Slot::Occupied(value);
            slot
        } else {
            self.slots.push(Slot::Occupied(value));
            self.slots.len() - 1
        }
    }

    /// Removes and returns the value in the slot. O(1), and the indices of the
    /// other values are unaffected.
    pub fn erase(&mut self, slot: usize) -> Result<T, BoundsError> {
        let len = self.slots.len();
        let entry = self
            .slots
            .get_mut(slot)
            .map_err(|_| BoundsError { index: slot, len })?;
        // Replacing a vacant slot with another vacant slot changes nothing.
        match core::mem::replace(entry, Slot::Vacant) {
            Slot::Occupied(value) => {
                self.free_slots.push(slot);
                self.live_len -= 1;
                Ok(value)
            }
            Slot::Vacant => Err(BoundsError { index: slot, len }),
        }
    }

    /// Returns the value in the slot, if the slot is occupied.
    pub fn get(&self, slot: usize) -> Result<&T, BoundsError> {
        match self.slots.get(slot) {
            Ok(Slot::Occupied(value)) => Ok(value),
            _ => Err(BoundsError {
                index: slot,
                len: self.slots.len(),
            }),
        }
    }

    /// Returns the value in the slot mutably, if the slot is occupied.
    pub fn get_mut(&mut self, slot: usize) -> Result<&mut T, BoundsError> {
        let len = self.slots.len();
        match self.slots.get_mut(slot) {
            Ok(Slot::Occupied(value)) => Ok(value),
            _ => Err(BoundsError { index: slot, len }),
        }
    }

    /// Returns the amount of values currently in the pool.
    pub fn len(&self) -> usize {
        self.live_len
    }

    /// Returns `true` if there are no values in the pool.
    pub fn is_empty(&self) -> bool {
        self.live_len == 0
    }

    /// Returns the amount of slots, occupied or not. Every valid slot index is
    /// less than this.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Drops every value in the pool. Slot indices start from zero again
    /// afterwards.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_slots.clear();
        self.live_len = 0;
    }

    /// Iterates over the occupied slots and their values, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, entry)| match entry {
                Slot::Occupied(value) => Some((slot, value)),
                Slot::Vacant => None,
            })
    }
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Pool::new()
    }
}

impl<T: Debug> Debug for Pool<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::collections::{BoundsError, Pool};

    #[test]
    fn erase_keeps_other_slots_in_place() {
        let mut pool = Pool::new();
        let a = pool.insert("worker a");
        let b = pool.insert("worker b");
        let c = pool.insert("worker c");

        assert_eq!(Ok("worker b"), pool.erase(b));
        assert_eq!(2, pool.len());
        assert_eq!(3, pool.slot_count());
        assert_eq!(Ok(&"worker a"), pool.get(a));
        assert_eq!(Ok(&"worker c"), pool.get(c));
        assert_eq!(
            Err(BoundsError { index: b, len: 3 }),
            pool.get(b),
            "an erased slot should not be readable",
        );
    }

    #[test]
    fn vacant_slots_are_reused() {
        let mut pool = Pool::new();
        for i in 0..4 {
            pool.insert(i);
        }
        pool.erase(1).unwrap();
        pool.erase(2).unwrap();

        let reused_first = pool.insert(20);
        let reused_second = pool.insert(10);
        assert!([1, 2].contains(&reused_first));
        assert!([1, 2].contains(&reused_second));
        assert_ne!(reused_first, reused_second);
        assert_eq!(4, pool.slot_count(), "the pool shouldn't grow while it has vacant slots");
        assert_eq!(4, pool.len());

        let mut values: Vec<i32> = pool.iter().map(|(_, value)| *value).collect();
        values.sort();
        assert_eq!(vec![0, 3, 10, 20], values);
    }

    #[test]
    fn erasing_twice_is_an_error() {
        let mut pool = Pool::new();
        let slot = pool.insert(String::from("placeholder"));
        assert!(pool.erase(slot).is_ok());
        assert_eq!(Err(BoundsError { index: slot, len: 1 }), pool.erase(slot));
        assert_eq!(Err(BoundsError { index: 5, len: 1 }), pool.erase(5));
        assert!(pool.is_empty());
    }
}
