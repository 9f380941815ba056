// SPDX-FileCopyrightText: 2025 Jens Pitkänen <jens.pitkanen@helsinki.fi>
//
// SPDX-License-Identifier: GPL-3.0-or-later

use core::{fmt, ptr, str};
use std::path::Path;

use crate::collections::{BoundsError, DynVec};

/// Growable UTF-8 string buffer, used for composing asset paths and names.
///
/// All the editing operations take byte indices, which need to be on
/// character boundaries. The contents are always valid UTF-8.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct StrBuf {
    bytes: DynVec<u8>,
}

impl StrBuf {
    /// Creates a new buffer containing a copy of `contents`.
    pub fn new(contents: &str) -> StrBuf {
        let mut buf = StrBuf {
            bytes: DynVec::with_capacity(contents.len()),
        };
        buf.append(contents);
        buf
    }

    /// Returns the length of the contents in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_str(&self) -> &str {
        // Safety: the bytes start out as a copy of a str, and every mutation
        // only splices in other strs at character boundaries (checked with
        // `str::is_char_boundary`) or removes whole character ranges, so the
        // contents are always valid UTF-8.
        unsafe { str::from_utf8_unchecked(&self.bytes) }
    }

    /// Appends `s` to the end.
    pub fn append(&mut self, s: &str) {
        self.bytes.extend(s.bytes());
    }

    /// Appends `component` after a `/`, unless the buffer is empty or already
    /// ends in a path separator.
    pub fn push_path_component(&mut self, component: &str) {
        if !self.is_empty() && !self.as_str().ends_with(['/', '\\']) {
            self.append("/");
        }
        self.append(component);
    }

    /// Inserts `s` so that it starts at `index`.
    pub fn insert(&mut self, s: &str, index: usize) -> Result<(), BoundsError> {
        self.check_boundary(index)?;

        // Append, then rotate the appended bytes into place in front of the
        // old tail.
        self.bytes.extend(s.bytes());
        self.bytes[index..].rotate_right(s.len());
        Ok(())
    }

    /// Replaces the whole contents with `s`.
    pub fn replace(&mut self, s: &str) {
        self.bytes.clear();
        self.append(s);
    }

    /// Removes `len` bytes starting from `index`.
    pub fn remove(&mut self, index: usize, len: usize) -> Result<(), BoundsError> {
        let end = index.checked_add(len).ok_or(BoundsError {
            index,
            len: self.len(),
        })?;
        self.check_boundary(index)?;
        self.check_boundary(end)?;

        let bytes = self.bytes.as_mut_slice();
        let total = bytes.len();
        // Safety: `index <= end <= total` (checked above), so both ranges are
        // inside the slice. u8 is Copy, so overlapping copies are fine.
        unsafe {
            let base = bytes.as_mut_ptr();
            ptr::copy(base.add(end), base.add(index), total - end);
        }
        self.bytes.truncate(total - len);
        Ok(())
    }

    /// Converts the contents to ASCII lowercase in place.
    pub fn make_ascii_lowercase(&mut self) {
        self.bytes.make_ascii_lowercase();
    }

    fn check_boundary(&self, index: usize) -> Result<(), BoundsError> {
        if self.as_str().is_char_boundary(index) {
            Ok(())
        } else {
            Err(BoundsError {
                index,
                len: self.len(),
            })
        }
    }
}

impl From<&str> for StrBuf {
    fn from(s: &str) -> Self {
        StrBuf::new(s)
    }
}

impl AsRef<str> for StrBuf {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl AsRef<Path> for StrBuf {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl fmt::Display for StrBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for StrBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::StrBuf;
    use crate::collections::BoundsError;

    #[test]
    fn composes_asset_paths() {
        let mut path = StrBuf::new("resources");
        path.push_path_component("Menu");
        path.push_path_component("Textures");
        assert_eq!("resources/Menu/Textures", path.as_str());

        let mut path = StrBuf::new("resources/");
        path.push_path_component("ALL");
        assert_eq!("resources/ALL", path.as_str());

        let mut path = StrBuf::default();
        path.push_path_component("Fonts");
        assert_eq!("Fonts", path.as_str());
    }

    #[test]
    fn insert_and_remove() {
        let mut name = StrBuf::new("player_idle");
        name.insert("_blue", 6).unwrap();
        assert_eq!("player_blue_idle", name.as_str());
        name.insert("big_", 0).unwrap();
        name.insert(".png", name.len()).unwrap();
        assert_eq!("big_player_blue_idle.png", name.as_str());

        name.remove(0, 4).unwrap();
        name.remove(6, 5).unwrap();
        assert_eq!("player_idle.png", name.as_str());
        name.remove(11, 4).unwrap();
        assert_eq!("player_idle", name.as_str());

        name.replace("Boss");
        name.make_ascii_lowercase();
        assert_eq!("boss", name.to_string());
    }

    #[test]
    fn rejects_indices_that_split_characters() {
        let mut name = StrBuf::new("épée");
        assert_eq!(Err(BoundsError { index: 1, len: 6 }), name.insert("x", 1));
        assert_eq!(Err(BoundsError { index: 7, len: 6 }), name.insert("x", 7));
        assert!(name.remove(0, 1).is_err());
        assert!(name.remove(3, 10).is_err());
        assert_eq!("épée", name.as_str(), "failed edits should leave the contents alone");

        name.remove(0, 2).unwrap();
        assert_eq!("pée", name.as_str());
    }
}
