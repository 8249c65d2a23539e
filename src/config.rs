//! Store configuration derived from CLI arguments

use std::path::PathBuf;

use directories::ProjectDirs;
use thiserror::Error;

use crate::cli::{Backend, Cli};

/// Error types for resolving the store configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No --store was given and the platform has no user cache directory
    #[error("Could not determine a cache directory; pass --store <PATH>")]
    NoCacheDirectory,
}

/// Where and how the feed cache is stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub backend: Backend,
    pub path: PathBuf,
}

impl StoreConfig {
    /// Creates a StoreConfig from parsed CLI arguments.
    ///
    /// Uses `--store` when given, otherwise a backend-specific file in the
    /// XDG cache directory (`~/.cache/feedcache/` on Linux).
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let path = match &cli.store {
            Some(path) => path.clone(),
            None => default_cache_dir()
                .ok_or(ConfigError::NoCacheDirectory)?
                .join(default_file_name(cli.backend)),
        };

        Ok(StoreConfig {
            backend: cli.backend,
            path,
        })
    }
}

/// Returns the per-user cache directory for this tool, if the platform has one
pub fn default_cache_dir() -> Option<PathBuf> {
    let project_dirs = ProjectDirs::from("", "", "feedcache")?;
    Some(project_dirs.cache_dir().to_path_buf())
}

fn default_file_name(backend: Backend) -> &'static str {
    match backend {
        Backend::File => "feed.json",
        Backend::Sqlite => "feed.sqlite",
    }
}
