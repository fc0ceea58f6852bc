//! Configuration file discovery.
//!
//! Discovers `.sift.toml` files by walking up the directory tree from a starting point,
//! then appending the global `~/.sift.toml` if present.

use std::path::{Path, PathBuf};

use directories::BaseDirs;

use crate::parse::is_root_config;

/// The configuration filename.
pub const CONFIG_FILENAME: &str = ".sift.toml";

/// Discovers all configuration files relevant to the given directory.
///
/// Returns paths in precedence order: closest to `cwd` first, global (`~/.sift.toml`) last.
/// Discovery stops early at a config file that sets `root = true`, in which case the global
/// config is not consulted either.
pub fn discover_config_files(cwd: &Path) -> Vec<PathBuf> {
    let mut configs = Vec::new();

    for dir in cwd.ancestors() {
        let candidate = dir.join(CONFIG_FILENAME);
        if !candidate.is_file() {
            continue;
        }
        let stop = is_root_config(&candidate);
        configs.push(candidate);
        if stop {
            return configs;
        }
    }

    if let Some(global) = global_config_path().filter(|p| p.is_file())
        && !configs.contains(&global)
    {
        configs.push(global);
    }
    configs
}

/// Returns the path to the global configuration file (`~/.sift.toml`).
///
/// Returns `None` if the home directory cannot be determined.
pub fn global_config_path() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.home_dir().join(CONFIG_FILENAME))
}

/// Checks if a path is the global configuration file.
pub fn is_global_config(path: &Path) -> bool {
    global_config_path().is_some_and(|global| path == global)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestDir;

    #[test]
    fn test_discovers_config_in_cwd() {
        let dir = TestDir::new();
        let config = dir.create_config("");

        let found = discover_config_files(dir.path());
        assert_eq!(found.first(), Some(&config));
    }

    #[test]
    fn test_walks_up_to_parents() {
        let dir = TestDir::new();
        let outer = dir.create_config("");
        let inner = dir.create_config("nested/deeper");

        let found = discover_config_files(&dir.path().join("nested/deeper"));
        let inner_pos = found.iter().position(|p| p == &inner).unwrap();
        let outer_pos = found.iter().position(|p| p == &outer).unwrap();
        assert!(inner_pos < outer_pos, "closest config must come first");
    }

    #[test]
    fn test_root_config_stops_discovery() {
        let dir = TestDir::new();
        dir.create_config("");
        let root = dir.create_root_config("project");

        let found = discover_config_files(&dir.path().join("project"));
        assert_eq!(found, vec![root]);
    }
}
