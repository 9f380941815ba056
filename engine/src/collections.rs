// SPDX-FileCopyrightText: 2025 Jens Pitkänen <jens.pitkanen@helsinki.fi>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Owning generic containers used throughout the engine.
//!
//! - [`DynVec`]: contiguous growable array, order-preserving erase.
//! - [`Pool`]: slot storage with stable indices and O(1) erase.
//! - [`List`]: doubly linked sequence built on top of a [`Pool`].
//!
//! Out-of-range accesses are reported as [`BoundsError`]s instead of touching
//! memory they shouldn't. Code that treats such an access as a bug can simply
//! `expect` on the result to get a panic with the diagnostic.

mod list;
mod pool;
mod vec;

pub use list::List;
pub use pool::Pool;
pub use vec::DynVec;

use thiserror::Error;

/// An index was used with a container that does not have a live element at
/// that index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("index {index} is out of range for a container of length {len}")]
pub struct BoundsError {
    /// The offending index.
    pub index: usize,
    /// The length (or slot count, for [`Pool`]) of the container at the time
    /// of the access.
    pub len: usize,
}
