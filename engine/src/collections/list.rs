// SPDX-FileCopyrightText: 2025 Jens Pitkänen <jens.pitkanen@helsinki.fi>
//
// SPDX-License-Identifier: GPL-3.0-or-later

use core::fmt::Debug;

use super::{BoundsError, Pool};

struct Node<T> {
    value: T,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Doubly linked sequence of `T`.
///
/// The nodes live in a [`Pool`], and link to each other by slot index, so
/// pushing and popping at either end is O(1) and never moves other values.
/// Positional access walks from whichever end is closer.
pub struct List<T> {
    nodes: Pool<Node<T>>,
    head: Option<usize>,
    tail: Option<usize>,
}

impl<T> List<T> {
    /// Creates a new empty list.
    pub fn new() -> List<T> {
        List {
            nodes: Pool::new(),
            head: None,
            tail: None,
        }
    }

    /// Returns the amount of values in the list.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the list has no values.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Appends the value to the back of the list.
    pub fn push_back(&mut self, value: T) {
        let slot = self.nodes.insert(Node {
            value,
            prev: self.tail,
            next: None,
        });
        match self.tail {
            Some(tail) => self.node_mut(tail).next = Some(slot),
            None => self.head = Some(slot),
        }
        self.tail = Some(slot);
    }

    /// Prepends the value to the front of the list.
    pub fn push_front(&mut self, value: T) {
        let slot = self.nodes.insert(Node {
            value,
            prev: None,
            next: self.head,
        });
        match self.head {
            Some(head) => self.node_mut(head).prev = Some(slot),
            None => self.tail = Some(slot),
        }
        self.head = Some(slot);
    }

    /// Removes and returns the first value, if any.
    pub fn pop_front(&mut self) -> Option<T> {
        let head = self.head?;
        Some(self.unlink(head))
    }

    /// Removes and returns the last value, if any.
    pub fn pop_back(&mut self) -> Option<T> {
        let tail = self.tail?;
        Some(self.unlink(tail))
    }

    /// Returns the value at the position `index` from the front.
    pub fn get(&self, index: usize) -> Result<&T, BoundsError> {
        let slot = self.slot_at(index)?;
        Ok(&self.node(slot).value)
    }

    /// Returns the value at the position `index` from the front, mutably.
    pub fn get_mut(&mut self, index: usize) -> Result<&mut T, BoundsError> {
        let slot = self.slot_at(index)?;
        Ok(&mut self.node_mut(slot).value)
    }

    /// Removes and returns the value at the position `index` from the front.
    pub fn erase(&mut self, index: usize) -> Result<T, BoundsError> {
        let slot = self.slot_at(index)?;
        Ok(self.unlink(slot))
    }

    /// Drops every value in the list.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.head = None;
        self.tail = None;
    }

    /// Iterates over the values from front to back.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            next: self.head,
        }
    }

    fn slot_at(&self, index: usize) -> Result<usize, BoundsError> {
        let len = self.len();
        if index >= len {
            return Err(BoundsError { index, len });
        }

        let found = if index < len / 2 {
            let mut slot = self.head;
            for _ in 0..index {
                slot = slot.and_then(|slot| self.node(slot).next);
            }
            slot
        } else {
            let mut slot = self.tail;
            for _ in index + 1..len {
                slot = slot.and_then(|slot| self.node(slot).prev);
            }
            slot
        };

        found.ok_or(BoundsError { index, len })
    }

    fn unlink(&mut self, slot: usize) -> T {
        let node = self
            .nodes
            .erase(slot)
            .expect("list links should only point at occupied nodes");
        match node.prev {
            Some(prev) => self.node_mut(prev).next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => self.node_mut(next).prev = node.prev,
            None => self.tail = node.prev,
        }
        node.value
    }

    fn node(&self, slot: usize) -> &Node<T> {
        self.nodes
            .get(slot)
            .expect("list links should only point at occupied nodes")
    }

    fn node_mut(&mut self, slot: usize) -> &mut Node<T> {
        self.nodes
            .get_mut(slot)
            .expect("list links should only point at occupied nodes")
    }
}

impl<T> Default for List<T> {
    fn default() -> Self {
        List::new()
    }
}

impl<T: Debug> Debug for List<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> FromIterator<T> for List<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = List::new();
        for value in iter {
            list.push_back(value);
        }
        list
    }
}

impl<'a, T> IntoIterator for &'a List<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Front-to-back iterator over a [`List`].
pub struct Iter<'a, T> {
    list: &'a List<T>,
    next: Option<usize>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let node = self.list.node(self.next?);
        self.next = node.next;
        Some(&node.value)
    }
}
