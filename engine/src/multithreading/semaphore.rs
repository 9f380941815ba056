// SPDX-FileCopyrightText: 2025 Jens Pitkänen <jens.pitkanen@helsinki.fi>
//
// SPDX-License-Identifier: GPL-3.0-or-later

use parking_lot::{Condvar, Mutex};

/// Counting semaphore for efficiently waiting on other threads.
///
/// Waiting threads sleep on a condition variable instead of spinning, and
/// each [`Semaphore::increment`] wakes up at most one of them.
#[derive(Debug, Default)]
pub struct Semaphore {
    count: Mutex<usize>,
    available: Condvar,
}

impl Semaphore {
    /// Creates a semaphore with the given initial count.
    pub fn new(count: usize) -> Semaphore {
        Semaphore {
            count: Mutex::new(count),
            available: Condvar::new(),
        }
    }

    /// Increments the semaphore's count, waking up one waiting thread if
    /// there are any.
    pub fn increment(&self) {
        let mut count = self.count.lock();
        *count += 1;
        drop(count);
        self.available.notify_one();
    }

    /// Waits until the count is positive, and then decrements the semaphore's
    /// count.
    pub fn decrement(&self) {
        let mut count = self.count.lock();
        while *count == 0 {
            self.available.wait(&mut count);
        }
        *count -= 1;
    }

    /// Decrements the count if it's positive, without waiting. Returns `true`
    /// if the count was decremented.
    pub fn try_decrement(&self) -> bool {
        let mut count = self.count.lock();
        if *count > 0 {
            *count -= 1;
            true
        } else {
            false
        }
    }

    /// Returns the current count. Only a snapshot, other threads may change
    /// it right after.
    pub fn count(&self) -> usize {
        *self.count.lock()
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
        thread,
        time::Duration,
    };

    use super::Semaphore;

    #[test]
    fn counts_up_and_down() {
        let semaphore = Semaphore::new(2);
        assert!(semaphore.try_decrement());
        assert!(semaphore.try_decrement());
        assert!(!semaphore.try_decrement(), "count should be zero after two decrements");
        semaphore.increment();
        assert_eq!(1, semaphore.count());
        semaphore.decrement();
        assert_eq!(0, semaphore.count());
    }

    #[test]
    fn decrement_waits_for_increment() {
        let semaphore = Arc::new(Semaphore::new(0));
        let woken = Arc::new(AtomicUsize::new(0));

        let waiter = {
            let semaphore = semaphore.clone();
            let woken = woken.clone();
            thread::spawn(move || {
                semaphore.decrement();
                woken.fetch_add(1, Ordering::SeqCst);
            })
        };

        thread::sleep(Duration::from_millis(50));
        assert_eq!(0, woken.load(Ordering::SeqCst), "decrement should block at zero");
        semaphore.increment();
        waiter.join().unwrap();
        assert_eq!(1, woken.load(Ordering::SeqCst));
        assert_eq!(0, semaphore.count());
    }
}
