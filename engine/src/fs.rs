// SPDX-FileCopyrightText: 2025 Jens Pitkänen <jens.pitkanen@helsinki.fi>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Directory scanning and path queries for finding asset files on disk.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use arrayvec::ArrayString;
use tracing::{debug, warn};

use crate::collections::{DynVec, List};

/// The maximum length of a [`FileEntry::name`] in bytes.
pub const MAX_NAME_LENGTH: usize = 255;

/// A file found by [`search_files`]: its full path, and its name, which is
/// the lowercased file stem (file name without the extension).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub name: ArrayString<MAX_NAME_LENGTH>,
    pub path: PathBuf,
}

impl FileEntry {
    /// Creates an entry for the path. Returns `None` if the path doesn't have
    /// a UTF-8 stem, or if the stem is longer than [`MAX_NAME_LENGTH`].
    pub fn new(path: PathBuf) -> Option<FileEntry> {
        let mut name = ArrayString::from(stem(&path)?).ok()?;
        name.make_ascii_lowercase();
        Some(FileEntry { name, path })
    }
}

/// Returns the extension of the path, without the dot.
pub fn extension(path: &Path) -> Option<&str> {
    path.extension()?.to_str()
}

/// Returns the file name of the path without the extension.
pub fn stem(path: &Path) -> Option<&str> {
    path.file_stem()?.to_str()
}

/// Returns the file name of the path, extension included.
pub fn file_name(path: &Path) -> Option<&str> {
    path.file_name()?.to_str()
}

/// Returns the path without its final component. Returns `None` for roots and
/// single-component relative paths.
pub fn parent(path: &Path) -> Option<&Path> {
    path.parent().filter(|parent| !parent.as_os_str().is_empty())
}

pub fn exists(path: &Path) -> bool {
    path.exists()
}

pub fn is_file(path: &Path) -> bool {
    path.is_file()
}

pub fn is_directory(path: &Path) -> bool {
    path.is_dir()
}

/// Creates a new directory. The parent directory must already exist.
pub fn create_directory(path: &Path) -> io::Result<()> {
    fs::create_dir(path)
}

/// Removes the file, or the directory along with everything in it.
pub fn remove(path: &Path) -> io::Result<()> {
    if fs::symlink_metadata(path)?.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

/// Lists the files directly inside `dir`, without descending into
/// subdirectories. An unreadable or missing directory results in an empty
/// list.
pub fn list_files(dir: &Path) -> DynVec<PathBuf> {
    let mut files = DynVec::new();
    let mut subdirectories = DynVec::new();
    scan_directory(dir, &mut files, &mut subdirectories);
    files
}

/// Lists every file inside `root` and its subdirectories, depth-first, in
/// directory enumeration order. Directories are traversed but not included.
///
/// Directories that can't be read are skipped, so the result contains
/// whatever could be found. A missing `root` results in an empty list.
///
/// Symbolic links to files are included, symbolic links to directories are
/// not followed.
pub fn recursive_list_files(root: &Path) -> DynVec<PathBuf> {
    let mut files = DynVec::new();
    let mut subdirectories = DynVec::new();
    let mut pending = List::new();
    pending.push_back(root.to_path_buf());

    while let Some(dir) = pending.pop_back() {
        scan_directory(&dir, &mut files, &mut subdirectories);
        // Reversed, so that the first subdirectory is popped next.
        while let Some(subdirectory) = subdirectories.pop() {
            pending.push_back(subdirectory);
        }
    }

    files
}

/// Recursively lists the files inside `root` with the given extension
/// (compared case-insensitively, without the dot).
pub fn search_files(root: &Path, extension_filter: &str) -> DynVec<FileEntry> {
    let mut entries = DynVec::new();
    for path in recursive_list_files(root) {
        let matches = extension(&path).is_some_and(|ext| ext.eq_ignore_ascii_case(extension_filter));
        if !matches {
            continue;
        }
        match FileEntry::new(path) {
            Some(entry) => entries.push(entry),
            None => warn!("skipping a file without a usable name (non-UTF-8 or over {MAX_NAME_LENGTH} bytes)"),
        }
    }
    entries
}

fn scan_directory(dir: &Path, files: &mut DynVec<PathBuf>, subdirectories: &mut DynVec<PathBuf>) {
    let read_dir = match fs::read_dir(dir) {
        Ok(read_dir) => read_dir,
        Err(err) => {
            debug!("could not open directory {}: {err}", dir.display());
            return;
        }
    };

    for entry in read_dir {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                debug!("could not read an entry of {}: {err}", dir.display());
                continue;
            }
        };
        let Ok(file_type) = entry.file_type() else {
            continue;
        };

        let path = entry.path();
        if file_type.is_dir() {
            subdirectories.push(path);
        } else if file_type.is_file() || (file_type.is_symlink() && path.is_file()) {
            files.push(path);
        }
    }
}
