//! Configuration builder
//!
//! Merges configuration from files and CLI arguments.

use crate::config::{Config, ConfigFile};
use crate::error::ConfigError;
use std::path::PathBuf;

/// Builder for merging configuration sources
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Load configuration from a file
    ///
    /// An explicitly given path must load; default locations are best-effort.
    pub fn with_file(mut self, path: Option<&str>) -> Result<Self, ConfigError> {
        let file_config = match path {
            Some(path) => Some(ConfigFile::load(path)?),
            None => ConfigFile::load_default(),
        };

        if let Some(cfg) = file_config {
            self.config = cfg;
        }

        Ok(self)
    }

    /// Override with CLI verbose flag
    pub fn with_verbose(mut self, verbose: Option<bool>) -> Self {
        if let Some(v) = verbose {
            self.config.general.verbose = v;
        }
        self
    }

    /// Override with CLI dry-run flag
    pub fn with_dry_run(mut self, dry_run: Option<bool>) -> Self {
        if let Some(d) = dry_run {
            self.config.general.dry_run = d;
        }
        self
    }

    /// Override the host device directory
    pub fn with_device_dir(mut self, dir: Option<PathBuf>) -> Self {
        if let Some(d) = dir {
            self.config.host.device_dir = d;
        }
        self
    }

    /// Override the host library search path (replaces the configured list)
    pub fn with_library_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        if !dirs.is_empty() {
            self.config.host.library_dirs = dirs;
        }
        self
    }

    /// Build and validate the final configuration
    pub fn build(self) -> Result<Config, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = ConfigBuilder::new().build().unwrap();
        assert!(!config.general.verbose);
        assert!(!config.general.dry_run);
    }

    #[test]
    fn test_builder_overrides() {
        let config = ConfigBuilder::new()
            .with_verbose(Some(true))
            .with_dry_run(Some(true))
            .with_device_dir(Some(PathBuf::from("/tmp/dev")))
            .with_library_dirs(vec![PathBuf::from("/tmp/lib")])
            .build()
            .unwrap();

        assert!(config.general.verbose);
        assert!(config.general.dry_run);
        assert_eq!(config.host.device_dir, PathBuf::from("/tmp/dev"));
        assert_eq!(config.host.library_dirs, vec![PathBuf::from("/tmp/lib")]);
    }

    #[test]
    fn test_empty_library_dirs_keep_config() {
        let config = ConfigBuilder::new().with_library_dirs(vec![]).build().unwrap();
        assert_eq!(config.host.library_dirs.len(), 3);
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let result = ConfigBuilder::new().with_file(Some("/nonexistent/gpuexpose.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }
}
