// SPDX-FileCopyrightText: 2025 Jens Pitkänen <jens.pitkanen@helsinki.fi>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Threading utilities: a counting [`Semaphore`] and a [`ThreadManager`]
//! which runs background work on a bounded amount of OS threads.

mod semaphore;
mod thread_manager;

use std::any::Any;

pub use semaphore::Semaphore;
pub use thread_manager::ThreadManager;

/// Returns the message of a panic payload caught with
/// [`std::panic::catch_unwind`] or [`std::thread::JoinHandle::join`], if it
/// was a string like the ones `panic!` creates.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "<non-string panic payload>"
    }
}
