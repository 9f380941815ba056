// SPDX-FileCopyrightText: 2025 Jens Pitkänen <jens.pitkanen@helsinki.fi>
//
// SPDX-License-Identifier: GPL-3.0-or-later

mod cli;
mod loaders;
mod settings;

use std::{
    sync::{mpsc, Arc},
    thread,
    time::Duration,
};

use anyhow::Context;
use engine::{
    multithreading::ThreadManager,
    resources::{AssetCategory, ResourceConfig, ResourceManager, SceneReport, SceneStatus},
};
use loaders::{FileAssetLoader, LoadedAsset};
use tracing::{debug, error, info};

fn main() -> anyhow::Result<()> {
    let options = cli::options().run();
    tracing_subscriber::fmt()
        .with_max_level(options.verbosity_level)
        .init();

    let mut settings = settings::read(&options.settings_path)?;
    if let Some(resource_root) = options.resource_root {
        settings.resource_root = resource_root;
    }
    if let Some(max_threads) = options.max_threads {
        settings.max_threads = max_threads;
    }
    anyhow::ensure!(
        settings.resource_root.is_dir(),
        "Resource directory {} does not exist",
        settings.resource_root.display(),
    );

    let config = ResourceConfig {
        resource_root: settings.resource_root.clone(),
        max_threads: settings.max_threads,
    };
    let resources = Arc::new(ResourceManager::new(config, FileAssetLoader));

    let global = resources.load_global();
    print_report(&global);
    let mut failure_count = global.failure_count();

    // Scene loads replace each other's assets, so they run one at a time,
    // with this thread reporting the progress.
    let mut threads = ThreadManager::new(1).context("Failed to create the background thread manager")?;
    let poll_interval = Duration::from_millis(settings.poll_interval_ms);

    for scene in &options.scenes {
        let (report_tx, report_rx) = mpsc::channel();
        threads
            .add_new_thread(
                (resources.clone(), scene.clone(), report_tx),
                |(resources, scene, report_tx)| {
                    let report = resources.load_scene(scene);
                    // The receiver is only dropped after this thread is reaped.
                    let _ = report_tx.send(report);
                },
            )
            .context("Failed to spawn a thread for loading the scene")?;

        while threads.thread_count() > 0 {
            info!("Loading {scene}: {:3.0}%", resources.loading_value() * 100.0);
            thread::sleep(poll_interval);
            threads.update();
        }

        match report_rx.try_recv() {
            Ok(report) => {
                print_report(&report);
                log_textures(&resources);
                failure_count += report.failure_count();
            }
            Err(_) => {
                error!("Loading scene {scene} panicked");
                failure_count += 1;
            }
        }
    }

    anyhow::ensure!(failure_count == 0, "{failure_count} assets failed to load");
    Ok(())
}

fn print_report(report: &SceneReport) {
    for (category, category_report) in &report.categories {
        let folder = category.folder();
        match category_report.status {
            SceneStatus::Loaded => println!(
                "{}/{folder}: {} loaded, {} failed ({} threads)",
                report.scene,
                category_report.loaded,
                category_report.failures.len(),
                category_report.worker_count,
            ),
            SceneStatus::NoMatchingFiles => {
                println!("{}/{folder}: no .{} files", report.scene, category.extension());
            }
            SceneStatus::MissingDirectory => {
                debug!("{}/{folder}: no such folder", report.scene);
            }
        }

        for failure in &category_report.failures {
            println!("  {}: {}", failure.path.display(), failure.reason);
        }
    }
}

fn log_textures(resources: &ResourceManager<FileAssetLoader>) {
    let textures = resources.store(AssetCategory::Textures);
    for name in &textures.names() {
        if let Some(texture) = textures.get(name) {
            if let LoadedAsset::Texture { width, height, .. } = &*texture {
                debug!("Texture {name}: {width}x{height}");
            }
        }
    }
}
