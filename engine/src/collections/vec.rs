// SPDX-FileCopyrightText: 2025 Jens Pitkänen <jens.pitkanen@helsinki.fi>
//
// SPDX-License-Identifier: GPL-3.0-or-later

use core::{
    fmt::Debug,
    mem::{self, needs_drop, transmute, MaybeUninit},
    ops::{Deref, DerefMut},
    ptr,
};

use bytemuck::Pod;

use super::BoundsError;

/// The factor by which the capacity of a [`DynVec`] is multiplied when a push
/// doesn't fit.
const GROWTH_FACTOR: usize = 2;

/// A contiguous growable array type.
///
/// The elements are owned by the array: erasing, clearing or dropping the
/// array drops the affected elements, so anything an element owns is released
/// along with it. Index-based access is O(1), and [`DynVec::erase`] is O(n)
/// since it keeps the order of the remaining elements. See
/// [`Pool`](super::Pool) for O(1) removal when order doesn't matter.
///
/// The capacity grows geometrically, doubling whenever a push doesn't fit.
pub struct DynVec<T> {
    uninit_slice: Box<[MaybeUninit<T>]>,
    initialized_len: usize,
}

impl<T> DynVec<T> {
    /// Creates a new empty [`DynVec`]. Does not allocate until the first push.
    pub fn new() -> DynVec<T> {
        DynVec::with_capacity(0)
    }

    /// Creates a new empty [`DynVec`] with room for `capacity` elements before
    /// it needs to grow.
    pub fn with_capacity(capacity: usize) -> DynVec<T> {
        DynVec {
            uninit_slice: Box::<[T]>::new_uninit_slice(capacity),
            initialized_len: 0,
        }
    }

    /// Creates a new [`DynVec`] holding the given values, with exactly enough
    /// capacity for them if the iterator reports its length accurately.
    pub fn from_values(values: impl IntoIterator<Item = T>) -> DynVec<T> {
        values.into_iter().collect()
    }

    /// Returns the amount of elements in the array.
    pub fn len(&self) -> usize {
        self.initialized_len
    }

    /// Returns `true` if the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.initialized_len == 0
    }

    /// Returns the amount of elements the array can hold without growing.
    pub fn capacity(&self) -> usize {
        self.uninit_slice.len()
    }

    /// Appends the value to the back of the array, growing the backing memory
    /// first if the array is full.
    pub fn push(&mut self, value: T) {
        if self.initialized_len == self.uninit_slice.len() {
            let new_capacity = self
                .capacity()
                .checked_mul(GROWTH_FACTOR)
                .expect("DynVec capacity should not overflow a usize")
                .max(1);
            self.reallocate(new_capacity);
        }

        // The slot at `initialized_len` is uninitialized (everything from
        // there onwards always is), so writing over it does not leak anything.
        self.uninit_slice[self.initialized_len].write(value);
        self.initialized_len += 1;
    }

    /// If non-empty, returns the final element and shortens the array by one.
    pub fn pop(&mut self) -> Option<T> {
        if self.initialized_len == 0 {
            return None;
        }
        let i = self.initialized_len - 1;

        // Safety: since i < initialized_len, the MaybeUninit at that index is
        // definitely initialized. Double-reads (thus double-drops) are avoided
        // by decrementing initialized_len right after.
        let value = unsafe { self.uninit_slice[i].assume_init_read() };
        self.initialized_len -= 1;

        Some(value)
    }

    /// Returns a reference to the element at `index`.
    pub fn get(&self, index: usize) -> Result<&T, BoundsError> {
        let len = self.initialized_len;
        self.as_slice().get(index).ok_or(BoundsError { index, len })
    }

    /// Returns a mutable reference to the element at `index`.
    pub fn get_mut(&mut self, index: usize) -> Result<&mut T, BoundsError> {
        let len = self.initialized_len;
        self.as_mut_slice()
            .get_mut(index)
            .ok_or(BoundsError { index, len })
    }

    /// Removes and returns the element at `index`, shifting every element
    /// after it down by one.
    ///
    /// The array is not modified if `index` is out of range.
    pub fn erase(&mut self, index: usize) -> Result<T, BoundsError> {
        let len = self.initialized_len;
        if index >= len {
            return Err(BoundsError { index, len });
        }

        // Safety: index < initialized_len, so this slot is initialized. The
        // slot is overwritten by the shift below (or left past the new length
        // if it was the last one), so it won't be read again.
        let value = unsafe { self.uninit_slice[index].assume_init_read() };

        // Safety: both ranges are within the slice, and the source range is
        // the initialized tail after `index`. `ptr::copy` allows the ranges to
        // overlap.
        unsafe {
            let base = self.uninit_slice.as_mut_ptr();
            ptr::copy(base.add(index + 1), base.add(index), len - index - 1);
        }
        self.initialized_len = len - 1;

        Ok(value)
    }

    /// Empties out the array, dropping the currently contained values. The
    /// backing memory is kept.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Shortens the array to be the given length if it's currently longer. Any
    /// values past the new length are dropped.
    pub fn truncate(&mut self, new_len: usize) {
        if new_len >= self.initialized_len {
            return;
        }

        let old_len = self.initialized_len;
        // Shorten first, so that a panicking drop can't cause a double drop.
        self.initialized_len = new_len;

        if needs_drop::<T>() {
            for initialized_value in &mut self.uninit_slice[new_len..old_len] {
                // Safety: these were all below the old `initialized_len`, so
                // they're initialized, and they're now past the new one, so
                // they won't be read again.
                unsafe { initialized_value.assume_init_drop() };
            }
        }
    }

    /// Grows the backing memory to fit at least `capacity` elements in total.
    /// Does nothing if there's already enough room. The length is unchanged.
    pub fn reserve(&mut self, capacity: usize) {
        if capacity > self.capacity() {
            self.reallocate(capacity);
        }
    }

    /// Shrinks the backing memory to fit exactly the current elements.
    pub fn shrink_to_fit(&mut self) {
        if self.capacity() > self.initialized_len {
            self.reallocate(self.initialized_len);
        }
    }

    /// Returns the initialized part of the array as a slice.
    pub fn as_slice(&self) -> &[T] {
        self
    }

    /// Returns the initialized part of the array as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self
    }

    fn reallocate(&mut self, capacity: usize) {
        debug_assert!(capacity >= self.initialized_len);
        let mut new_slice = Box::<[T]>::new_uninit_slice(capacity);

        // Safety: the new slice has room for at least `initialized_len`
        // elements, the two allocations can't overlap, and the first
        // `initialized_len` elements of the old slice are initialized. After
        // this copy, the values are owned by the new slice: the old one is a
        // slice of MaybeUninits, which never drops its contents.
        unsafe {
            ptr::copy_nonoverlapping(
                self.uninit_slice.as_ptr(),
                new_slice.as_mut_ptr(),
                self.initialized_len,
            );
        }

        self.uninit_slice = new_slice;
    }
}

impl<T: Pod> DynVec<T> {
    /// Returns the elements as raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.as_slice())
    }
}

impl<T> Default for DynVec<T> {
    fn default() -> Self {
        DynVec::new()
    }
}

impl<T> Drop for DynVec<T> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T> Deref for DynVec<T> {
    type Target = [T];

    fn deref<'a>(&'a self) -> &'a Self::Target {
        let initialized_slice = &self.uninit_slice[..self.initialized_len];
        // Safety: `MaybeUninit<T>` is identical to `T` except that it might be
        // uninitialized, and all values up to `self.initialized_len` are
        // initialized.
        unsafe { transmute::<&'a [MaybeUninit<T>], &'a [T]>(initialized_slice) }
    }
}

impl<T> DerefMut for DynVec<T> {
    fn deref_mut<'a>(&'a mut self) -> &'a mut Self::Target {
        let initialized_slice = &mut self.uninit_slice[..self.initialized_len];
        // Safety: `MaybeUninit<T>` is identical to `T` except that it might be
        // uninitialized, and all values up to `self.initialized_len` are
        // initialized.
        unsafe { transmute::<&'a mut [MaybeUninit<T>], &'a mut [T]>(initialized_slice) }
    }
}

impl<T: Debug> Debug for DynVec<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl<T: Clone> Clone for DynVec<T> {
    fn clone(&self) -> Self {
        self.iter().cloned().collect()
    }
}

impl<T: PartialEq> PartialEq for DynVec<T> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq> Eq for DynVec<T> {}

impl<T> FromIterator<T> for DynVec<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut vec = DynVec::new();
        vec.extend(iter);
        vec
    }
}

impl<T> Extend<T> for DynVec<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let (lower_bound, _) = iter.size_hint();
        self.reserve(self.initialized_len.saturating_add(lower_bound));
        for value in iter {
            self.push(value);
        }
    }
}

impl<'a, T> IntoIterator for &'a DynVec<T> {
    type Item = &'a T;
    type IntoIter = core::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut DynVec<T> {
    type Item = &'a mut T;
    type IntoIter = core::slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T> IntoIterator for DynVec<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(mut self) -> Self::IntoIter {
        let end = self.initialized_len;
        // The values are moved over to the iterator, so `self` must not drop
        // them anymore.
        self.initialized_len = 0;
        let uninit_slice = mem::replace(&mut self.uninit_slice, Box::<[T]>::new_uninit_slice(0));
        IntoIter {
            uninit_slice,
            front: 0,
            end,
        }
    }
}

/// Owning iterator over the elements of a [`DynVec`].
pub struct IntoIter<T> {
    /// Invariant: the elements in `front..end` are initialized, the rest are
    /// not (or have been moved out already).
    uninit_slice: Box<[MaybeUninit<T>]>,
    front: usize,
    end: usize,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.front == self.end {
            return None;
        }
        // Safety: front < end, so the slot is initialized, and `front` is
        // bumped right after so it's never read again.
        let value = unsafe { self.uninit_slice[self.front].assume_init_read() };
        self.front += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.front;
        (remaining, Some(remaining))
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> Drop for IntoIter<T> {
    fn drop(&mut self) {
        if needs_drop::<T>() {
            for initialized_value in &mut self.uninit_slice[self.front..self.end] {
                // Safety: everything in `front..end` is initialized and not yet
                // moved out.
                unsafe { initialized_value.assume_init_drop() };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use core::sync::atomic::{AtomicI32, Ordering};

    use bytemuck::{Pod, Zeroable};

    use crate::collections::{BoundsError, DynVec};

    #[test]
    fn does_not_leak() {
        const COUNT: usize = 100;
        static ELEMENT_COUNT: AtomicI32 = AtomicI32::new(0);

        #[derive(Debug)]
        struct Element {
            _name: String,
        }
        impl Element {
            pub fn create_and_count() -> Element {
                ELEMENT_COUNT.fetch_add(1, Ordering::Relaxed);
                Element {
                    _name: String::from("player_idle"),
                }
            }
        }
        impl Drop for Element {
            fn drop(&mut self) {
                ELEMENT_COUNT.fetch_add(-1, Ordering::Relaxed);
            }
        }

        let mut vec: DynVec<Element> = DynVec::new();

        // Fill once, growing along the way:
        for _ in 0..COUNT / 2 {
            vec.push(Element::create_and_count());
        }
        assert_eq!(COUNT as i32 / 2, ELEMENT_COUNT.load(Ordering::Relaxed));

        // Erase drops exactly the erased element once the caller lets go of it:
        drop(vec.erase(3).unwrap());
        assert_eq!(COUNT as i32 / 2 - 1, ELEMENT_COUNT.load(Ordering::Relaxed));

        // Clear:
        vec.clear();
        assert_eq!(0, ELEMENT_COUNT.load(Ordering::Relaxed));

        // Refill, then consume half through the owning iterator:
        for _ in 0..COUNT {
            vec.push(Element::create_and_count());
        }
        assert_eq!(COUNT as i32, ELEMENT_COUNT.load(Ordering::Relaxed));
        let mut iter = vec.into_iter();
        for _ in 0..COUNT / 2 {
            drop(iter.next());
        }
        assert_eq!(COUNT as i32 / 2, ELEMENT_COUNT.load(Ordering::Relaxed));

        // Drop:
        drop(iter);
        assert_eq!(0, ELEMENT_COUNT.load(Ordering::Relaxed));
    }

    #[test]
    fn length_and_capacity_track_pushes() {
        let mut vec = DynVec::with_capacity(3);
        for n in 0..1000u32 {
            vec.push(n);
            assert_eq!(n as usize + 1, vec.len());
            assert!(vec.capacity() >= vec.len(), "capacity fell below length");
        }
        // 3 -> 6 -> 12 -> ... -> 1536
        assert_eq!(1536, vec.capacity());
    }

    #[test]
    fn erase_shifts_the_tail_down() {
        let mut vec = DynVec::from_values([10, 11, 12, 13, 14]);
        assert_eq!(Ok(12), vec.erase(2));
        assert_eq!(4, vec.len());
        assert_eq!(&[10, 11, 13, 14], vec.as_slice());
        assert_eq!(Ok(&13), vec.get(2));

        assert_eq!(Ok(14), vec.erase(3));
        assert_eq!(Ok(10), vec.erase(0));
        assert_eq!(&[11, 13], vec.as_slice());
    }

    #[test]
    fn out_of_range_access_is_an_error() {
        let mut vec = DynVec::from_values(["menu", "game"]);
        assert_eq!(Err(BoundsError { index: 2, len: 2 }), vec.get(2));
        assert_eq!(Err(BoundsError { index: 7, len: 2 }), vec.erase(7));
        assert!(vec.get_mut(usize::MAX).is_err());
        assert_eq!(
            &["menu", "game"],
            vec.as_slice(),
            "a failed erase should not touch the array",
        );

        let mut empty = DynVec::<u8>::new();
        assert_eq!(Err(BoundsError { index: 0, len: 0 }), empty.erase(0));
    }

    #[test]
    fn pushed_bytes_come_back_unchanged() {
        #[derive(Clone, Copy, Debug, PartialEq)]
        #[repr(C)]
        struct Particle {
            x: f32,
            y: f32,
            lifetime: u32,
        }
        // Safety: repr(C) struct of 4-byte fields, no padding, any bit pattern
        // is a valid value.
        unsafe impl Zeroable for Particle {}
        // Safety: see above.
        unsafe impl Pod for Particle {}

        let mut vec = DynVec::new();
        for i in 0..9 {
            let particle = Particle {
                x: i as f32 * 0.5,
                y: -1.25,
                lifetime: 0xDEAD_0000 + i,
            };
            vec.push(particle);
            let stored = vec.get(vec.len() - 1).unwrap();
            assert_eq!(bytemuck::bytes_of(&particle), bytemuck::bytes_of(stored));
        }
        assert_eq!(9 * size_of::<Particle>(), vec.as_bytes().len());
    }

    #[test]
    fn reserve_and_shrink_keep_the_elements() {
        let mut vec = DynVec::from_values([1u16, 2, 3]);
        vec.reserve(64);
        assert_eq!(64, vec.capacity());
        assert_eq!(3, vec.len());

        vec.reserve(8);
        assert_eq!(64, vec.capacity(), "reserve should never shrink");

        vec.shrink_to_fit();
        assert_eq!(3, vec.capacity());
        assert_eq!(&[1, 2, 3], vec.as_slice());

        vec.clear();
        assert_eq!(3, vec.capacity(), "clear should keep the backing memory");
        assert!(vec.is_empty());
    }
}
