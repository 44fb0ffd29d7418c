use std::fs;
use std::path::{Path, PathBuf};

use super::BddsniffConfig;
use crate::errors::{Error, Result};

pub const CONFIG_FILE_NAME: &str = ".bddsniff.toml";

const MAX_TRAVERSAL_DEPTH: usize = 10;

/// Parses configuration from TOML text.
pub fn parse_config(contents: &str) -> Result<BddsniffConfig> {
    toml::from_str::<BddsniffConfig>(contents)
        .map_err(|e| Error::configuration(format!("Failed to parse {CONFIG_FILE_NAME}: {e}")))
}

/// Reads and parses an explicitly requested config file. Unlike the ancestor
/// search, a missing file is an error here.
pub fn load_config_file(path: &Path) -> Result<BddsniffConfig> {
    let contents = fs::read_to_string(path).map_err(|e| {
        Error::file_system("Failed to read config file", path, e)
    })?;
    let config = parse_config(&contents)?;
    log::debug!("Loaded config from {}", path.display());
    Ok(config)
}

fn try_load_config_from_path(config_path: &Path) -> Option<BddsniffConfig> {
    let contents = match fs::read_to_string(config_path) {
        Ok(contents) => contents,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                log::warn!(
                    "Failed to read config file {}: {}",
                    config_path.display(),
                    e
                );
            }
            return None;
        }
    };

    match parse_config(&contents) {
        Ok(config) => {
            log::debug!("Loaded config from {}", config_path.display());
            Some(config)
        }
        Err(e) => {
            log::warn!("{}. Using defaults.", e);
            None
        }
    }
}

/// `start` and its parents, nearest first, at most `max_depth` of them.
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

/// Searches `start` and its ancestors for a config file.
pub fn load_config_from(start: PathBuf) -> BddsniffConfig {
    directory_ancestors(start, MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find_map(|path| try_load_config_from_path(&path))
        .unwrap_or_else(|| {
            log::debug!(
                "No config found after checking {} directories. Using default config.",
                MAX_TRAVERSAL_DEPTH
            );
            BddsniffConfig::default()
        })
}

/// Searches the working directory and its ancestors for a config file.
pub fn load_config() -> BddsniffConfig {
    match std::env::current_dir() {
        Ok(current) => load_config_from(current),
        Err(e) => {
            log::warn!(
                "Failed to get current directory: {}. Using default config.",
                e
            );
            BddsniffConfig::default()
        }
    }
}
