// SPDX-FileCopyrightText: 2025 Jens Pitkänen <jens.pitkanen@helsinki.fi>
//
// SPDX-License-Identifier: GPL-3.0-or-later

use core::{fmt::Display, ops::Range};
use std::{
    panic::{self, AssertUnwindSafe},
    path::{Path, PathBuf},
};

use crossbeam_utils::thread;
use thiserror::Error;
use tracing::{debug, error, info, trace};

use crate::{
    collections::{DynVec, List},
    fs::{self, FileEntry},
    multithreading::panic_message,
    string::StrBuf,
};

use super::{AssetCategory, LoadProgress};

/// The default maximum amount of threads used to load a single directory.
pub const MAX_THREADS: usize = 10;

/// How a directory load went, ignoring failures of individual files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneStatus {
    /// Every matching file was passed to the load function.
    Loaded,
    /// The directory does not exist. Not an error, scenes don't need to have
    /// every category of assets.
    MissingDirectory,
    /// The directory exists, but has no files with the right extension.
    NoMatchingFiles,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureReason {
    #[error("{0}")]
    Error(String),
    #[error("panicked: {0}")]
    Panicked(String),
}

/// A file which the load function failed to load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLoadFailure {
    pub path: PathBuf,
    pub reason: FailureReason,
}

/// The results of [`SceneLoader::load_scene`] or
/// [`SceneLoader::load_directory`].
#[derive(Debug)]
pub struct SceneLoadReport {
    pub directory: PathBuf,
    pub status: SceneStatus,
    /// The amount of threads the files were split between.
    pub worker_count: usize,
    /// The amount of files which were loaded successfully.
    pub loaded: usize,
    pub failures: DynVec<FileLoadFailure>,
}

impl SceneLoadReport {
    fn without_files(directory: PathBuf, status: SceneStatus) -> SceneLoadReport {
        SceneLoadReport {
            directory,
            status,
            worker_count: 0,
            loaded: 0,
            failures: DynVec::new(),
        }
    }

    /// Returns the amount of files passed to the load function.
    pub fn file_count(&self) -> usize {
        self.loaded + self.failures.len()
    }

    /// Returns `true` if no file failed to load.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Loads the asset files of scenes in parallel.
///
/// The files of a directory are split into contiguous blocks, one for each
/// thread, and each thread calls the load function for every file in its
/// block. Loading a directory blocks until every file has been processed.
#[derive(Debug, Clone)]
pub struct SceneLoader {
    resource_root: PathBuf,
    max_threads: usize,
}

impl SceneLoader {
    /// Creates a loader for the scenes in `resource_root`, using at most
    /// `max_threads` threads per directory. A `max_threads` of 0 is treated
    /// as 1.
    pub fn new(resource_root: impl Into<PathBuf>, max_threads: usize) -> SceneLoader {
        SceneLoader {
            resource_root: resource_root.into(),
            max_threads: max_threads.max(1),
        }
    }

    pub fn resource_root(&self) -> &Path {
        &self.resource_root
    }

    pub fn max_threads(&self) -> usize {
        self.max_threads
    }

    /// Returns the directory containing the given category of assets of the
    /// scene, i.e. `<resource_root>/<scene>/<folder>`.
    pub fn category_directory(&self, scene: &str, category: AssetCategory) -> PathBuf {
        // The root isn't necessarily UTF-8, so only the scene-relative part
        // is composed as a string.
        let mut relative_path = StrBuf::new(scene);
        relative_path.push_path_component(category.folder());
        self.resource_root.join(relative_path.as_str())
    }

    /// Calls `load_file` for every asset file of the category in the scene's
    /// directory. See [`SceneLoader::load_directory`].
    pub fn load_scene<E, F>(
        &self,
        scene: &str,
        category: AssetCategory,
        progress: &LoadProgress,
        load_file: F,
    ) -> SceneLoadReport
    where
        E: Display,
        F: Fn(&FileEntry) -> Result<(), E> + Sync,
    {
        let directory = self.category_directory(scene, category);
        self.load_directory(&directory, category.extension(), progress, load_file)
    }

    /// Calls `load_file` exactly once for every file with the extension in
    /// `directory` and its subdirectories, spread over up to `max_threads`
    /// threads.
    ///
    /// Errors and panics from `load_file` are collected into the report, and
    /// don't stop the other files from loading. `progress` is advanced after
    /// every file, and is finished when this returns, even if there was
    /// nothing to load.
    pub fn load_directory<E, F>(
        &self,
        directory: &Path,
        extension: &str,
        progress: &LoadProgress,
        load_file: F,
    ) -> SceneLoadReport
    where
        E: Display,
        F: Fn(&FileEntry) -> Result<(), E> + Sync,
    {
        progress.reset();

        if !fs::is_directory(directory) {
            info!("{} does not exist, skipping", directory.display());
            progress.finish();
            return SceneLoadReport::without_files(directory.to_path_buf(), SceneStatus::MissingDirectory);
        }

        let files = fs::search_files(directory, extension);
        if files.is_empty() {
            info!("no .{extension} files in {}", directory.display());
            progress.finish();
            return SceneLoadReport::without_files(directory.to_path_buf(), SceneStatus::NoMatchingFiles);
        }

        let blocks = partition(files.len(), self.max_threads);
        info!(
            "loading {} .{extension} files from {} on {} threads",
            files.len(),
            directory.display(),
            blocks.len(),
        );
        progress.begin(files.len());

        let files = files.as_slice();
        let load_file = &load_file;
        let scope_result = thread::scope(|scope| {
            let mut workers = List::new();
            for block in &blocks {
                let block = block.clone();
                workers.push_back(scope.spawn(move |_| load_block(&files[block], load_file, progress)));
            }

            let mut loaded = 0;
            let mut failures = DynVec::new();
            while let Some(worker) = workers.pop_front() {
                match worker.join() {
                    Ok(outcome) => {
                        loaded += outcome.loaded;
                        failures.extend(outcome.failures);
                    }
                    Err(panic) => {
                        let message = panic_message(&*panic).to_string();
                        error!("a loading thread for {} panicked: {message}", directory.display());
                        failures.push(FileLoadFailure {
                            path: directory.to_path_buf(),
                            reason: FailureReason::Panicked(message),
                        });
                    }
                }
            }
            (loaded, failures)
        });

        // Every thread was joined inside the scope, so the scope can't have
        // unjoined panics to report.
        let (loaded, failures) = scope_result.unwrap_or_else(|_| (0, DynVec::new()));
        progress.finish();

        if failures.is_empty() {
            info!("loaded {loaded} files from {}", directory.display());
        } else {
            error!(
                "loaded {loaded} files from {}, {} failed",
                directory.display(),
                failures.len(),
            );
        }

        SceneLoadReport {
            directory: directory.to_path_buf(),
            status: SceneStatus::Loaded,
            worker_count: blocks.len(),
            loaded,
            failures,
        }
    }
}

/// Splits `file_count` files into `min(file_count, max_threads)` contiguous
/// blocks of equal length, except for the last block, which also gets the
/// remainder.
pub fn partition(file_count: usize, max_threads: usize) -> DynVec<Range<usize>> {
    let worker_count = file_count.min(max_threads);
    let mut blocks = DynVec::with_capacity(worker_count);
    if worker_count == 0 {
        return blocks;
    }

    let block_len = file_count / worker_count;
    for i in 0..worker_count {
        let start = i * block_len;
        let end = if i + 1 == worker_count {
            file_count
        } else {
            start + block_len
        };
        blocks.push(start..end);
    }
    blocks
}

struct BlockOutcome {
    loaded: usize,
    failures: DynVec<FileLoadFailure>,
}

fn load_block<E, F>(files: &[FileEntry], load_file: &F, progress: &LoadProgress) -> BlockOutcome
where
    E: Display,
    F: Fn(&FileEntry) -> Result<(), E>,
{
    let mut outcome = BlockOutcome {
        loaded: 0,
        failures: DynVec::new(),
    };

    for file in files {
        trace!("loading {}", file.path.display());
        let reason = match panic::catch_unwind(AssertUnwindSafe(|| load_file(file))) {
            Ok(Ok(())) => None,
            Ok(Err(err)) => Some(FailureReason::Error(err.to_string())),
            Err(panic) => Some(FailureReason::Panicked(panic_message(&*panic).to_string())),
        };

        match reason {
            None => outcome.loaded += 1,
            Some(reason) => {
                error!("failed to load {}: {reason}", file.path.display());
                outcome.failures.push(FileLoadFailure {
                    path: file.path.clone(),
                    reason,
                });
            }
        }
        progress.advance();
    }

    debug!("finished a block of {} files", files.len());
    outcome
}
