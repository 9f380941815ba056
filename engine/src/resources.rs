// SPDX-FileCopyrightText: 2025 Jens Pitkänen <jens.pitkanen@helsinki.fi>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Loading game assets from the resource directory.
//!
//! The resource directory is laid out as `<root>/<scene>/<folder>/*.<ext>`,
//! where the folder and extension depend on the [`AssetCategory`]. Assets in
//! the `ALL` scene are global: they're loaded once and stay loaded, while
//! other scenes' assets are swapped out whenever a new scene is loaded.

mod manager;
mod progress;
mod registry;
mod scene_loader;

use enum_map::Enum;

pub use manager::{
    AssetLoader, BytesLoader, GlobalLoadReport, ResourceConfig, ResourceManager, SceneReport,
};
pub use progress::LoadProgress;
pub use registry::{AssetStore, NamedAsset, PLACEHOLDER_NAME};
pub use scene_loader::{
    partition, FailureReason, FileLoadFailure, SceneLoadReport, SceneLoader, SceneStatus,
    MAX_THREADS,
};

/// The name of the scene whose assets are loaded globally.
pub const GLOBAL_SCENE: &str = "ALL";

/// The kinds of assets a scene can have. Each has its own folder inside the
/// scene's directory, and its own file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum)]
pub enum AssetCategory {
    Textures,
    Fonts,
    Sounds,
    Musics,
    Movies,
}

impl AssetCategory {
    /// Every category, in the order scenes load them.
    pub const ALL: [AssetCategory; 5] = [
        AssetCategory::Textures,
        AssetCategory::Fonts,
        AssetCategory::Sounds,
        AssetCategory::Musics,
        AssetCategory::Movies,
    ];

    /// The name of the folder containing this category's files.
    pub const fn folder(self) -> &'static str {
        match self {
            AssetCategory::Textures => "Textures",
            AssetCategory::Fonts => "Fonts",
            AssetCategory::Sounds => "Sounds",
            AssetCategory::Musics => "Musics",
            AssetCategory::Movies => "Movies",
        }
    }

    /// The file extension of this category's files, without the dot.
    pub const fn extension(self) -> &'static str {
        match self {
            AssetCategory::Textures => "png",
            AssetCategory::Fonts => "ttf",
            AssetCategory::Sounds => "wav",
            AssetCategory::Musics => "ogg",
            AssetCategory::Movies => "mp4",
        }
    }
}
