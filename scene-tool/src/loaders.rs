// SPDX-FileCopyrightText: 2025 Jens Pitkänen <jens.pitkanen@helsinki.fi>
//
// SPDX-License-Identifier: GPL-3.0-or-later

use std::fs;

use anyhow::Context;
use engine::{
    fs::FileEntry,
    resources::{AssetCategory, AssetLoader},
};
use tracing::trace;

#[derive(Debug)]
pub enum LoadedAsset {
    Texture { width: u32, height: u32, bytes: Vec<u8> },
    Data(Vec<u8>),
}

impl LoadedAsset {
    pub fn byte_len(&self) -> usize {
        match self {
            LoadedAsset::Texture { bytes, .. } | LoadedAsset::Data(bytes) => bytes.len(),
        }
    }
}

/// Reads asset files from disk. Textures are decoded to make sure they're
/// valid images, other files are just read into memory.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileAssetLoader;

impl AssetLoader for FileAssetLoader {
    type Asset = LoadedAsset;
    type Error = anyhow::Error;

    fn load(&self, category: AssetCategory, file: &FileEntry) -> anyhow::Result<LoadedAsset> {
        let bytes = fs::read(&file.path).context("Failed to open the asset file")?;

        let asset = match category {
            AssetCategory::Textures => {
                let image = image::load_from_memory(&bytes)
                    .context("Failed to read texture file as an image (unsupported format?)")?;
                LoadedAsset::Texture {
                    width: image.width(),
                    height: image.height(),
                    bytes,
                }
            }
            AssetCategory::Fonts
            | AssetCategory::Sounds
            | AssetCategory::Musics
            | AssetCategory::Movies => LoadedAsset::Data(bytes),
        };

        trace!("read {} bytes from {}", asset.byte_len(), file.path.display());
        Ok(asset)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use engine::{
        fs::FileEntry,
        resources::{AssetCategory, AssetLoader},
    };
    use image::RgbaImage;
    use tempfile::TempDir;

    use super::{FileAssetLoader, LoadedAsset};

    #[test]
    fn textures_are_decoded() {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let path = temp_dir.path().join("Hero.png");
        RgbaImage::new(3, 2).save(&path).unwrap();

        let entry = FileEntry::new(path).unwrap();
        assert_eq!("hero", entry.name.as_str());
        match FileAssetLoader.load(AssetCategory::Textures, &entry).unwrap() {
            LoadedAsset::Texture { width, height, .. } => assert_eq!((3, 2), (width, height)),
            other => panic!("expected a texture, got {other:?}"),
        }
    }

    #[test]
    fn broken_textures_are_errors() {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let path = temp_dir.path().join("broken.png");
        fs::write(&path, b"definitely not a png").unwrap();

        let entry = FileEntry::new(path).unwrap();
        assert!(FileAssetLoader.load(AssetCategory::Textures, &entry).is_err());
    }

    #[test]
    fn other_assets_are_read_as_is() {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let path = temp_dir.path().join("jump.wav");
        fs::write(&path, b"RIFF").unwrap();

        let entry = FileEntry::new(path).unwrap();
        let asset = FileAssetLoader.load(AssetCategory::Sounds, &entry).unwrap();
        assert_eq!(4, asset.byte_len());
        assert!(matches!(asset, LoadedAsset::Data(_)));
    }
}
