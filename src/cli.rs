//! Command-line interface parsing for the feed cache CLI
//!
//! This module handles parsing of CLI arguments using clap: the global store
//! options and one subcommand per cache operation.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use url::Url;

/// Feed cache - inspect and maintain the locally cached feed
#[derive(Parser, Debug)]
#[command(name = "feedcache")]
#[command(about = "Load, save and validate a locally cached feed")]
#[command(version)]
pub struct Cli {
    /// Path of the cache store (defaults to the user cache directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub store: Option<PathBuf>,

    /// Which store backend to use
    #[arg(long, global = true, value_enum, default_value_t = Backend::File)]
    pub backend: Backend,

    /// Log filter used when RUST_LOG is not set (e.g. "debug", "feedcache=trace")
    #[arg(long, global = true, value_name = "FILTER", default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Cache operations
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the cached feed as JSON (empty if missing or expired)
    Load,
    /// Delete the cache if it is expired or unreadable
    Validate,
    /// Cache the items from a JSON file in the remote feed format
    ///
    /// The file must look like {"items": [{"id", "description", "location", "image"}]}.
    Save {
        /// File holding the feed payload
        file: PathBuf,
    },
    /// Fetch the feed from a URL and cache it on success
    Fetch {
        /// Feed endpoint
        url: Url,
    },
    /// Delete the cached feed
    Clear,
}

/// Store backend selection
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// A single JSON document
    #[default]
    File,
    /// A SQLite database
    Sqlite,
}
