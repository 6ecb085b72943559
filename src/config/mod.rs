//! Configuration system
//!
//! Handles TOML config file parsing and CLI argument merging.

pub mod builder;
pub mod file;

pub use builder::ConfigBuilder;
pub use file::ConfigFile;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Driver libraries that must all be present for GPU support
pub const REQUIRED_LIBRARIES: [&str; 6] = [
    "libcuda.so",
    "libnvcuvid.so",
    "libnvidia-compiler.so",
    "libnvidia-encode.so",
    "libnvidia-ml.so",
    "libnvidia-fatbinaryloader.so",
];

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,
    /// Host-side inventory paths
    pub host: HostConfig,
    /// In-container exposure paths
    pub container: ContainerConfig,
    /// Selector sources
    pub selector: SelectorConfig,
}

impl Config {
    /// Check values that would make the exposure paths meaningless
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.container.library_dir.is_absolute() {
            return Err(ConfigError::InvalidValue {
                key: "container.library_dir".to_string(),
                message: "must be an absolute path".to_string(),
            });
        }
        if !self.container.device_dir.is_absolute() {
            return Err(ConfigError::InvalidValue {
                key: "container.device_dir".to_string(),
                message: "must be an absolute path".to_string(),
            });
        }
        if self.host.required_libraries.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "host.required_libraries".to_string(),
                message: "must list at least one library".to_string(),
            });
        }
        if self.selector.env_var.is_empty() || self.selector.env_var.contains('=') {
            return Err(ConfigError::InvalidValue {
                key: "selector.env_var".to_string(),
                message: format!("not a valid variable name: {:?}", self.selector.env_var),
            });
        }
        Ok(())
    }
}

/// General configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable verbose logging
    pub verbose: bool,
    /// Dry run mode
    pub dry_run: bool,
}

/// Host inventory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Directory holding the `nvidia<N>` device nodes
    pub device_dir: PathBuf,
    /// Directories searched, in order, for the driver libraries
    pub library_dirs: Vec<PathBuf>,
    /// Library file names that must all be located
    pub required_libraries: Vec<String>,
    /// Shared control nodes bound alongside selected GPUs
    pub control_nodes: Vec<String>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            device_dir: PathBuf::from("/dev"),
            library_dirs: vec![
                PathBuf::from("/usr/lib64"),
                PathBuf::from("/usr/lib/x86_64-linux-gnu"),
                PathBuf::from("/usr/lib"),
            ],
            required_libraries: REQUIRED_LIBRARIES.iter().map(|s| s.to_string()).collect(),
            control_nodes: vec![
                "nvidiactl".to_string(),
                "nvidia-uvm".to_string(),
                "nvidia-uvm-tools".to_string(),
            ],
        }
    }
}

/// In-container path configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// Device directory inside the container
    pub device_dir: PathBuf,
    /// Fixed mount point for the driver library directory
    pub library_dir: PathBuf,
    /// `LD_LIBRARY_PATH` the container process starts with; `library_dir`
    /// is prepended to it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ld_library_path: Option<String>,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            device_dir: PathBuf::from("/dev"),
            library_dir: PathBuf::from("/gpu-support/nvidia/lib64"),
            ld_library_path: None,
        }
    }
}

/// Selector source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Environment variable carrying the GPU selector
    pub env_var: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            env_var: "CUDA_VISIBLE_DEVICES".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.host.device_dir, PathBuf::from("/dev"));
        assert_eq!(config.host.required_libraries.len(), 6);
        assert_eq!(
            config.container.library_dir,
            PathBuf::from("/gpu-support/nvidia/lib64")
        );
        assert_eq!(config.selector.env_var, "CUDA_VISIBLE_DEVICES");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [host]
            device_dir = "/tmp/fake-dev"
            "#,
        )
        .unwrap();
        assert_eq!(config.host.device_dir, PathBuf::from("/tmp/fake-dev"));
        assert_eq!(config.host.control_nodes.len(), 3);
        assert_eq!(config.selector.env_var, "CUDA_VISIBLE_DEVICES");
    }

    #[test]
    fn test_validate_relative_library_dir() {
        let mut config = Config::default();
        config.container.library_dir = PathBuf::from("gpu-support");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { key, .. }) if key == "container.library_dir"
        ));
    }

    #[test]
    fn test_validate_env_var() {
        let mut config = Config::default();
        config.selector.env_var = String::new();
        assert!(config.validate().is_err());
    }
}
