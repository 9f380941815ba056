// SPDX-FileCopyrightText: 2025 Jens Pitkänen <jens.pitkanen@helsinki.fi>
//
// SPDX-License-Identifier: GPL-3.0-or-later

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use engine::resources::MAX_THREADS;
use serde::{Deserialize, Serialize};

/// The settings file, used to avoid repeating the same command line
/// arguments on every invocation.
///
/// Has enum variants for breaking changes in the format of the settings file,
/// but [`read`] always returns the newest version's settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "settings_file_version", rename_all = "snake_case")]
pub enum SettingsFile {
    V1(Settings),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// The directory containing the `ALL` directory and the scene
    /// directories.
    pub resource_root: PathBuf,
    /// Maximum amount of threads used to load a single asset folder.
    pub max_threads: usize,
    /// How often the loading progress is reported while a scene loads.
    pub poll_interval_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            resource_root: PathBuf::from("resources"),
            max_threads: MAX_THREADS,
            poll_interval_ms: 50,
        }
    }
}

pub fn read(settings: &Path) -> anyhow::Result<Settings> {
    let settings = if settings.exists() {
        let settings = fs::read_to_string(settings).context("Failed to open the settings file")?;
        serde_json::from_str(&settings).context("Failed to parse the settings file")?
    } else {
        SettingsFile::V1(Settings::default())
    };

    // NOTE: When there's new versions of SettingsFile, convert to the newest
    // here.
    let SettingsFile::V1(settings) = settings;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf};

    use tempfile::TempDir;

    use super::{read, Settings, SettingsFile};

    #[test]
    fn missing_file_means_defaults() {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let settings = read(&temp_dir.path().join("scene-tool.json")).unwrap();
        assert_eq!(Settings::default(), settings);
    }

    #[test]
    fn reads_versioned_settings() {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let path = temp_dir.path().join("scene-tool.json");
        fs::write(
            &path,
            r#"{ "settings_file_version": "v1", "resource_root": "game/res", "max_threads": 4 }"#,
        )
        .unwrap();

        let settings = read(&path).unwrap();
        assert_eq!(PathBuf::from("game/res"), settings.resource_root);
        assert_eq!(4, settings.max_threads);
        assert_eq!(
            Settings::default().poll_interval_ms,
            settings.poll_interval_ms,
            "missing fields should get their default values",
        );
    }

    #[test]
    fn unknown_versions_are_rejected() {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let path = temp_dir.path().join("scene-tool.json");
        fs::write(&path, r#"{ "settings_file_version": "v9" }"#).unwrap();
        assert!(read(&path).is_err());
    }

    #[test]
    fn written_files_are_tagged() {
        let json = serde_json::to_value(SettingsFile::V1(Settings::default())).unwrap();
        assert_eq!("v1", json["settings_file_version"]);
        assert_eq!(50, json["poll_interval_ms"]);
        assert!(json.get("background_threads").is_none(), "scenes are loaded one at a time");
    }

    #[test]
    fn obsolete_fields_are_ignored() {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let path = temp_dir.path().join("scene-tool.json");
        fs::write(
            &path,
            r#"{ "settings_file_version": "v1", "background_threads": 8, "poll_interval_ms": 10 }"#,
        )
        .unwrap();
        assert_eq!(10, read(&path).unwrap().poll_interval_ms);
    }
}
