// SPDX-FileCopyrightText: 2025 Jens Pitkänen <jens.pitkanen@helsinki.fi>
//
// SPDX-License-Identifier: GPL-3.0-or-later

use core::fmt::Display;
use std::{io, path::PathBuf, sync::Arc};

use enum_map::EnumMap;
use parking_lot::Mutex;
use tracing::info;

use crate::fs::FileEntry;

use super::{
    AssetCategory, AssetStore, LoadProgress, SceneLoadReport, SceneLoader, GLOBAL_SCENE,
    MAX_THREADS,
};

/// Turns asset files into loaded assets. Called from multiple loading threads
/// at once.
pub trait AssetLoader: Send + Sync {
    type Asset: Send + Sync;
    type Error: Display;

    fn load(&self, category: AssetCategory, file: &FileEntry) -> Result<Self::Asset, Self::Error>;
}

/// An [`AssetLoader`] which just reads the files into memory.
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesLoader;

impl AssetLoader for BytesLoader {
    type Asset = Vec<u8>;
    type Error = io::Error;

    fn load(&self, _category: AssetCategory, file: &FileEntry) -> Result<Vec<u8>, io::Error> {
        std::fs::read(&file.path)
    }
}

#[derive(Debug, Clone)]
pub struct ResourceConfig {
    /// The directory containing the scene directories.
    pub resource_root: PathBuf,
    /// The maximum amount of threads used to load each asset directory.
    pub max_threads: usize,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        ResourceConfig {
            resource_root: PathBuf::from("resources"),
            max_threads: MAX_THREADS,
        }
    }
}

/// The results of loading every category of a scene.
#[derive(Debug)]
pub struct SceneReport {
    pub scene: String,
    pub categories: EnumMap<AssetCategory, SceneLoadReport>,
}

/// The results of [`ResourceManager::load_global`], which loads the
/// [`GLOBAL_SCENE`].
pub type GlobalLoadReport = SceneReport;

impl SceneReport {
    /// Returns the amount of files loaded successfully, across all categories.
    pub fn loaded(&self) -> usize {
        self.categories.values().map(|report| report.loaded).sum()
    }

    /// Returns the amount of files which failed to load, across all
    /// categories.
    pub fn failure_count(&self) -> usize {
        self.categories.values().map(|report| report.failures.len()).sum()
    }

    pub fn is_success(&self) -> bool {
        self.failure_count() == 0
    }
}

/// Owns the loaded assets of every category, and loads and unloads scenes.
///
/// Global assets (from the [`GLOBAL_SCENE`]) are loaded once with
/// [`ResourceManager::load_global`]. Loading a scene replaces the previous
/// scene's assets. Lookups, progress queries and loads can all happen from
/// different threads, but loads are serialized.
pub struct ResourceManager<L: AssetLoader> {
    loader: L,
    scene_loader: SceneLoader,
    stores: EnumMap<AssetCategory, AssetStore<L::Asset>>,
    progress: EnumMap<AssetCategory, LoadProgress>,
    /// Held for the duration of each load.
    current_scene: Mutex<Option<String>>,
}

impl<L: AssetLoader> ResourceManager<L> {
    pub fn new(config: ResourceConfig, loader: L) -> ResourceManager<L> {
        ResourceManager {
            loader,
            scene_loader: SceneLoader::new(config.resource_root, config.max_threads),
            stores: EnumMap::default(),
            progress: EnumMap::default(),
            current_scene: Mutex::new(None),
        }
    }

    /// Loads the assets of the [`GLOBAL_SCENE`], which stay loaded until the
    /// manager is dropped. Missing category folders are skipped.
    pub fn load_global(&self) -> GlobalLoadReport {
        let _current_scene = self.current_scene.lock();
        self.load_categories(GLOBAL_SCENE, true)
    }

    /// Unloads the current scene's assets, and loads the assets of the given
    /// scene, one category at a time. Blocks until every file has been
    /// loaded, or until the previous load finishes if another thread is
    /// loading a scene.
    pub fn load_scene(&self, scene: &str) -> SceneReport {
        let mut current_scene = self.current_scene.lock();
        self.clear_scene_assets();
        let report = self.load_categories(scene, false);
        *current_scene = Some(scene.to_string());
        report
    }

    /// Drops the current scene's assets. Global assets stay loaded.
    pub fn unload_scene(&self) {
        let mut current_scene = self.current_scene.lock();
        if let Some(scene) = current_scene.take() {
            info!("unloading scene {scene}");
        }
        self.clear_scene_assets();
    }

    /// Returns the name of the last scene loaded with
    /// [`ResourceManager::load_scene`], unless it's been unloaded since.
    /// Blocks while a scene is loading.
    pub fn current_scene(&self) -> Option<String> {
        self.current_scene.lock().clone()
    }

    /// Returns the asset with the name, or the category's placeholder if it
    /// doesn't exist.
    pub fn get(&self, category: AssetCategory, name: &str) -> Option<Arc<L::Asset>> {
        self.stores[category].get(name)
    }

    pub fn progress(&self, category: AssetCategory) -> &LoadProgress {
        &self.progress[category]
    }

    /// Returns the average progress of all the categories, between 0.0 and
    /// 1.0. Suitable for a loading bar while another thread loads a scene.
    pub fn loading_value(&self) -> f32 {
        let sum: f32 = self.progress.values().map(LoadProgress::fraction).sum();
        sum / AssetCategory::ALL.len() as f32
    }

    pub fn store(&self, category: AssetCategory) -> &AssetStore<L::Asset> {
        &self.stores[category]
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn scene_loader(&self) -> &SceneLoader {
        &self.scene_loader
    }

    fn clear_scene_assets(&self) {
        for (store, progress) in self.stores.values().zip(self.progress.values()) {
            store.clear_scene();
            progress.reset();
        }
    }

    fn load_categories(&self, scene: &str, global: bool) -> SceneReport {
        info!("loading scene {scene}");
        let categories = EnumMap::from_fn(|category: AssetCategory| {
            let store = &self.stores[category];
            let loader = &self.loader;
            self.scene_loader
                .load_scene(scene, category, &self.progress[category], |file| {
                    let asset = loader.load(category, file)?;
                    if global {
                        store.insert_global(file.name, asset);
                    } else {
                        store.insert_scene(file.name, asset);
                    }
                    Ok::<(), L::Error>(())
                })
        });

        let report = SceneReport {
            scene: scene.to_string(),
            categories,
        };
        info!(
            "finished loading scene {scene}: {} files loaded, {} failed",
            report.loaded(),
            report.failure_count(),
        );
        report
    }
}
