//! Configuration for logcask
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

/// Configuration for a log-backed store
#[derive(Debug, Clone)]
pub struct Config {
    /// Path of the single append-only log file.
    pub path: PathBuf,

    /// Create an empty log when `path` does not exist. When false, opening a
    /// missing log fails with an I/O `NotFound` error.
    pub create_if_missing: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./logcask.db"),
            create_if_missing: true,
        }
    }
}

impl Config {
    /// Default config pointing at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the log file path
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.path = path.into();
        self
    }

    /// Whether a missing log file should be created
    pub fn create_if_missing(mut self, create: bool) -> Self {
        self.config.create_if_missing = create;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
