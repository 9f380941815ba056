// SPDX-FileCopyrightText: 2025 Jens Pitkänen <jens.pitkanen@helsinki.fi>
//
// SPDX-License-Identifier: GPL-3.0-or-later

use std::{
    any::Any,
    io,
    panic::{self, AssertUnwindSafe},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
};

use tracing::{debug, error};

use crate::collections::{DynVec, Pool};

use super::{panic_message, Semaphore};

/// What a worker thread hands back when it's joined.
struct WorkerOutcome {
    /// The data the worker was started with, dropped when the worker is
    /// reaped.
    data: Box<dyn Any + Send>,
    panic: Option<Box<dyn Any + Send>>,
}

struct Worker {
    name: String,
    handle: JoinHandle<WorkerOutcome>,
    finished: Arc<AtomicBool>,
}

/// Runs functions on background threads, with at most `limit` of them
/// running at a time.
///
/// Each function gets its own OS thread along with data which is moved into
/// the thread. Finished threads are only joined (and their data dropped) by
/// [`ThreadManager::update`], which should be called regularly, e.g. once per
/// frame. [`ThreadManager::add_new_thread`] calls it too, and blocks while the
/// manager is at its limit.
///
/// Panics in the functions are caught and logged, they don't propagate to the
/// thread owning the manager.
pub struct ThreadManager {
    workers: Pool<Worker>,
    limit: usize,
    /// Incremented by each worker right after it has set its finished flag.
    /// Each reaped worker takes its increment back out, so the count stays
    /// at most the amount of unreaped workers.
    completions: Arc<Semaphore>,
    /// Increments taken by waiting for a completion, which haven't been
    /// matched with a reaped worker yet.
    pending_completions: usize,
    spawned_count: usize,
    panicked_count: usize,
}

impl ThreadManager {
    /// Creates a new thread manager which runs at most `limit` threads at a
    /// time. Returns `None` if `limit` is 0, as such a manager could never run
    /// anything.
    pub fn new(limit: usize) -> Option<ThreadManager> {
        if limit == 0 {
            return None;
        }
        Some(ThreadManager {
            workers: Pool::new(),
            limit,
            completions: Arc::new(Semaphore::new(0)),
            pending_completions: 0,
            spawned_count: 0,
            panicked_count: 0,
        })
    }

    /// Starts a new thread which runs `func` with `data`. The data is owned by
    /// the thread until it's reaped by [`ThreadManager::update`].
    ///
    /// If the manager is already running `limit` threads, this blocks until
    /// one of them finishes. Returns the slot of the new thread, or the error
    /// from the OS if the thread could not be spawned.
    pub fn add_new_thread<T, F>(&mut self, data: T, func: F) -> io::Result<usize>
    where
        T: Send + 'static,
        F: FnOnce(&mut T) + Send + 'static,
    {
        self.update();
        while self.workers.len() >= self.limit {
            self.wait_for_completion();
        }

        let name = format!("worker-{}", self.spawned_count);
        let finished = Arc::new(AtomicBool::new(false));
        let handle = {
            let finished = finished.clone();
            let completions = self.completions.clone();
            thread::Builder::new().name(name.clone()).spawn(move || {
                let mut data = data;
                let result = panic::catch_unwind(AssertUnwindSafe(|| func(&mut data)));
                // The flag must be set before the increment, so that whoever
                // gets woken up by the increment sees this worker as finished.
                finished.store(true, Ordering::Release);
                completions.increment();
                WorkerOutcome {
                    data: Box::new(data),
                    panic: result.err(),
                }
            })?
        };

        self.spawned_count += 1;
        debug!("spawned thread {name}");
        Ok(self.workers.insert(Worker {
            name,
            handle,
            finished,
        }))
    }

    /// Joins every thread which has finished running its function, and drops
    /// the data they were started with. Returns the amount of threads joined.
    pub fn update(&mut self) -> usize {
        let finished_slots: DynVec<usize> = self
            .workers
            .iter()
            .filter(|(_, worker)| worker.finished.load(Ordering::Acquire))
            .map(|(slot, _)| slot)
            .collect();

        for &slot in &finished_slots {
            let worker = self
                .workers
                .erase(slot)
                .expect("slots from the worker pool's iterator should be occupied");
            self.reap(worker);

            // A joined worker has always incremented, so its increment is
            // either pending or still in the semaphore.
            if self.pending_completions > 0 {
                self.pending_completions -= 1;
            } else {
                let taken = self.completions.try_decrement();
                debug_assert!(taken, "reaped workers should have signaled their completion");
            }
        }

        finished_slots.len()
    }

    /// Blocks until every thread has finished, and joins them.
    pub fn join_all(&mut self) {
        self.update();
        while !self.workers.is_empty() {
            self.wait_for_completion();
        }
    }

    /// Returns the amount of threads which have not been joined yet.
    pub fn thread_count(&self) -> usize {
        self.workers.len()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Returns the amount of joined threads whose function panicked.
    pub fn panicked_count(&self) -> usize {
        self.panicked_count
    }

    fn wait_for_completion(&mut self) {
        self.completions.decrement();
        self.pending_completions += 1;
        self.update();
    }

    fn reap(&mut self, worker: Worker) {
        let Worker { name, handle, .. } = worker;
        let panic = match handle.join() {
            Ok(WorkerOutcome { data, panic }) => {
                drop(data);
                panic
            }
            Err(panic) => Some(panic),
        };

        if let Some(panic) = panic {
            self.panicked_count += 1;
            error!("thread {name} panicked: {}", panic_message(&*panic));
        } else {
            debug!("joined thread {name}");
        }
    }
}

impl Drop for ThreadManager {
    fn drop(&mut self) {
        self.join_all();
    }
}
