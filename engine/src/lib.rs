// SPDX-FileCopyrightText: 2025 Jens Pitkänen <jens.pitkanen@helsinki.fi>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Core of a 2D arcade game engine: containers, asset discovery, background
//! threads, and loading scenes' assets in parallel.
//!
//! Rendering, input and audio playback live outside this crate. They consume
//! the assets loaded by [`resources::ResourceManager`].

pub mod collections;
pub mod fs;
pub mod multithreading;
pub mod resources;
pub mod string;
