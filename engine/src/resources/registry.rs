// SPDX-FileCopyrightText: 2025 Jens Pitkänen <jens.pitkanen@helsinki.fi>
//
// SPDX-License-Identifier: GPL-3.0-or-later

use core::cmp::Ordering;
use std::sync::Arc;

use arrayvec::ArrayString;
use parking_lot::RwLock;
use tracing::{debug, error, warn};

use crate::{collections::DynVec, fs::MAX_NAME_LENGTH};

/// Assets with this name are not stored in the lists, but are returned by
/// [`AssetStore::get`] when the requested asset doesn't exist.
pub const PLACEHOLDER_NAME: &str = "placeholder";

/// Wrapper for assets with their unique name. Implement equality and comparison
/// operators purely based on the name, as assets with a specific name should be
/// unique within a store.
#[derive(Debug)]
pub struct NamedAsset<T> {
    pub name: ArrayString<MAX_NAME_LENGTH>,
    pub asset: Arc<T>,
}

impl<T> Clone for NamedAsset<T> {
    fn clone(&self) -> Self {
        NamedAsset {
            name: self.name,
            asset: self.asset.clone(),
        }
    }
}

impl<T> PartialEq for NamedAsset<T> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

// The equality operator just checks the name, and ArrayString is Eq.
impl<T> Eq for NamedAsset<T> {}

impl<T> PartialOrd for NamedAsset<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for NamedAsset<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

/// The loaded assets of one category: the global ones which stay loaded, the
/// ones of the current scene, and the placeholder.
///
/// Everything goes through `&self`, so loading threads can insert assets
/// while others look them up. Names are compared case-insensitively.
pub struct AssetStore<T> {
    global: RwLock<DynVec<NamedAsset<T>>>,
    scene: RwLock<DynVec<NamedAsset<T>>>,
    placeholder: RwLock<Option<Arc<T>>>,
}

impl<T> AssetStore<T> {
    pub fn new() -> AssetStore<T> {
        AssetStore {
            global: RwLock::new(DynVec::new()),
            scene: RwLock::new(DynVec::new()),
            placeholder: RwLock::new(None),
        }
    }

    /// Adds an asset which stays loaded when scenes change. An asset named
    /// [`PLACEHOLDER_NAME`] becomes the placeholder instead.
    pub fn insert_global(&self, name: ArrayString<MAX_NAME_LENGTH>, asset: T) {
        self.insert(&self.global, name, asset);
    }

    /// Adds an asset which is dropped by [`AssetStore::clear_scene`]. An asset
    /// named [`PLACEHOLDER_NAME`] becomes the placeholder instead.
    pub fn insert_scene(&self, name: ArrayString<MAX_NAME_LENGTH>, asset: T) {
        self.insert(&self.scene, name, asset);
    }

    /// Returns the asset with the given name, looking in the global assets
    /// first and the scene's assets second. If neither has it, returns the
    /// placeholder, if there is one.
    pub fn get(&self, name: &str) -> Option<Arc<T>> {
        if let Some(asset) = find(&self.global.read(), name) {
            return Some(asset);
        }
        if let Some(asset) = find(&self.scene.read(), name) {
            return Some(asset);
        }

        if let Some(placeholder) = &*self.placeholder.read() {
            warn!("asset {name:?} not found, using the placeholder");
            Some(placeholder.clone())
        } else {
            error!("asset {name:?} not found, and there's no placeholder");
            None
        }
    }

    /// Drops the scene's assets. The global assets and the placeholder are
    /// kept. Assets which are still referenced elsewhere stay alive until
    /// those references are dropped.
    pub fn clear_scene(&self) {
        self.scene.write().clear();
    }

    pub fn global_len(&self) -> usize {
        self.global.read().len()
    }

    pub fn scene_len(&self) -> usize {
        self.scene.read().len()
    }

    pub fn has_placeholder(&self) -> bool {
        self.placeholder.read().is_some()
    }

    /// Returns the names of the global and scene assets, sorted.
    pub fn names(&self) -> DynVec<ArrayString<MAX_NAME_LENGTH>> {
        let mut names: DynVec<ArrayString<MAX_NAME_LENGTH>> =
            self.global.read().iter().map(|named| named.name).collect();
        names.extend(self.scene.read().iter().map(|named| named.name));
        names.sort();
        names
    }

    fn insert(&self, list: &RwLock<DynVec<NamedAsset<T>>>, name: ArrayString<MAX_NAME_LENGTH>, asset: T) {
        let asset = Arc::new(asset);
        if name.eq_ignore_ascii_case(PLACEHOLDER_NAME) {
            *self.placeholder.write() = Some(asset);
            return;
        }

        let mut list = list.write();
        if let Some(existing) = list.iter_mut().find(|named| named.name.eq_ignore_ascii_case(&name)) {
            debug!("replacing asset {name:?}");
            existing.asset = asset;
        } else {
            list.push(NamedAsset { name, asset });
        }
    }
}

impl<T> Default for AssetStore<T> {
    fn default() -> Self {
        AssetStore::new()
    }
}

fn find<T>(list: &[NamedAsset<T>], name: &str) -> Option<Arc<T>> {
    list.iter()
        .find(|named| named.name.eq_ignore_ascii_case(name))
        .map(|named| named.asset.clone())
}

#[cfg(test)]
mod tests {
    use arrayvec::ArrayString;

    use super::AssetStore;

    fn name(s: &str) -> ArrayString<255> {
        ArrayString::from(s).unwrap()
    }

    #[test]
    fn global_assets_shadow_scene_assets() {
        let store = AssetStore::new();
        store.insert_scene(name("logo"), "scene logo");
        store.insert_global(name("logo"), "global logo");
        store.insert_scene(name("hero"), "hero");

        assert_eq!(Some("global logo"), store.get("logo").as_deref().copied());
        assert_eq!(Some("hero"), store.get("HERO").as_deref().copied());
        assert_eq!(1, store.global_len());
        assert_eq!(2, store.scene_len());
    }

    #[test]
    fn missing_assets_fall_back_to_the_placeholder() {
        let store = AssetStore::new();
        store.insert_scene(name("hero"), 1);
        assert_eq!(None, store.get("villain"), "there's no placeholder yet");

        store.insert_global(name("placeholder"), 0);
        assert!(store.has_placeholder());
        assert_eq!(0, store.global_len(), "the placeholder isn't a regular asset");
        assert_eq!(Some(0), store.get("villain").as_deref().copied());
        assert_eq!(Some(1), store.get("hero").as_deref().copied());
    }

    #[test]
    fn clearing_the_scene_keeps_globals() {
        let store = AssetStore::new();
        store.insert_global(name("font"), 'f');
        store.insert_scene(name("level_music"), 'm');
        store.insert_scene(name("level_music"), 'n');
        assert_eq!(1, store.scene_len(), "same name should replace the asset");
        store.insert_scene(name("alarm"), 'a');
        assert_eq!(vec!["alarm", "font", "level_music"], store.names().iter().map(|n| n.as_str()).collect::<Vec<_>>());

        store.clear_scene();
        assert_eq!(0, store.scene_len());
        assert_eq!(Some('f'), store.get("font").as_deref().copied());
        assert_eq!(None, store.get("level_music"));
    }
}
