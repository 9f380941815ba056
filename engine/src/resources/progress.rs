// SPDX-FileCopyrightText: 2025 Jens Pitkänen <jens.pitkanen@helsinki.fi>
//
// SPDX-License-Identifier: GPL-3.0-or-later

use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crossbeam_utils::CachePadded;

/// Shared progress counter for a loading operation, for showing a loading
/// bar.
///
/// Workers call [`LoadProgress::advance`] after each file, and any thread can
/// read [`LoadProgress::fraction`] at any time. The fraction is advisory while
/// loading is in progress, and exactly 1.0 once [`LoadProgress::finish`] has
/// been called.
#[derive(Debug, Default)]
pub struct LoadProgress {
    // Bumped by every worker, so it gets its own cache line.
    completed: CachePadded<AtomicUsize>,
    total: AtomicUsize,
    finished: AtomicBool,
}

impl LoadProgress {
    pub fn new() -> LoadProgress {
        LoadProgress::default()
    }

    /// Starts tracking a new operation consisting of `total` steps.
    pub fn begin(&self, total: usize) {
        self.finished.store(false, Ordering::Release);
        self.completed.store(0, Ordering::Release);
        self.total.store(total, Ordering::Release);
    }

    /// Marks one step as completed.
    pub fn advance(&self) {
        self.completed.fetch_add(1, Ordering::AcqRel);
    }

    /// Marks the whole operation as completed, regardless of the step count.
    pub fn finish(&self) {
        self.finished.store(true, Ordering::Release);
    }

    /// Goes back to the initial state, where nothing has begun.
    pub fn reset(&self) {
        self.begin(0);
    }

    /// Returns how far along the operation is, between 0.0 and 1.0.
    pub fn fraction(&self) -> f32 {
        if self.is_finished() {
            return 1.0;
        }
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (self.completed() as f32 / total as f32).min(1.0)
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Acquire)
    }

    pub fn total(&self) -> usize {
        self.total.load(Ordering::Acquire)
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::LoadProgress;

    #[test]
    fn fraction_follows_the_steps() {
        let progress = LoadProgress::new();
        assert_eq!(0.0, progress.fraction(), "nothing has begun yet");

        progress.begin(4);
        progress.advance();
        assert_eq!(0.25, progress.fraction());
        progress.advance();
        progress.advance();
        progress.advance();
        assert_eq!(1.0, progress.fraction());
        assert!(!progress.is_finished());

        progress.finish();
        assert_eq!(1.0, progress.fraction());

        progress.reset();
        assert_eq!(0.0, progress.fraction());
        assert_eq!(0, progress.completed());
    }

    #[test]
    fn finishing_early_reads_as_complete() {
        let progress = LoadProgress::new();
        progress.begin(10);
        progress.advance();
        progress.finish();
        assert_eq!(1.0, progress.fraction());
        assert_eq!(1, progress.completed());
        assert_eq!(10, progress.total());
    }
}
