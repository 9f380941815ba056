// SPDX-FileCopyrightText: 2025 Jens Pitkänen <jens.pitkanen@helsinki.fi>
//
// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::PathBuf;

use bpaf::{batteries::verbose_by_slice, construct, long, positional, OptionParser, Parser};
use tracing::level_filters::LevelFilter;

#[derive(Debug, Clone)]
pub struct Options {
    pub verbosity_level: LevelFilter,
    pub settings_path: PathBuf,
    pub resource_root: Option<PathBuf>,
    pub max_threads: Option<usize>,
    pub scenes: Vec<String>,
}

pub fn options() -> OptionParser<Options> {
    let verbosity_level = verbose_by_slice(
        3,
        [
            LevelFilter::OFF,
            LevelFilter::ERROR,
            LevelFilter::WARN,
            LevelFilter::INFO,
            LevelFilter::DEBUG,
            LevelFilter::TRACE,
        ],
    );

    let settings_path = long("settings")
        .help("Selects the settings file to read")
        .argument("FILE")
        .complete_shell(bpaf::ShellComp::File { mask: Some("*.json") })
        .fallback(PathBuf::from("scene-tool.json"));

    let resource_root = long("resources")
        .help("Selects the resource directory, overriding the settings file")
        .argument("DIR")
        .complete_shell(bpaf::ShellComp::Dir { mask: None })
        .optional();

    let max_threads = long("threads")
        .help("Maximum amount of threads used per asset folder, overriding the settings file")
        .argument("N")
        .optional();

    let scenes = positional("SCENE")
        .help("Scenes to load after the global assets, in order")
        .many();

    construct!(Options {
        verbosity_level,
        settings_path,
        resource_root,
        max_threads,
        scenes,
    })
    .to_options()
    .descr("Loads the assets of scenes from a resource directory and reports what failed")
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use tracing::level_filters::LevelFilter;

    use super::options;

    #[test]
    fn check_bpaf_invariants() {
        options().check_invariants(true);
    }

    #[test]
    fn parses_scenes_and_overrides() {
        let parsed = options()
            .run_inner(&["-v", "--resources", "game/resources", "--threads", "4", "Menu", "Level1"])
            .unwrap();
        assert_eq!(LevelFilter::DEBUG, parsed.verbosity_level);
        assert_eq!(Some(PathBuf::from("game/resources")), parsed.resource_root);
        assert_eq!(Some(4), parsed.max_threads);
        assert_eq!(vec!["Menu", "Level1"], parsed.scenes);
        assert_eq!(PathBuf::from("scene-tool.json"), parsed.settings_path);
    }
}
