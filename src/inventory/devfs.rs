//! Device-filesystem backed host inventory
//!
//! Scans the host device directory for `nvidia<N>` nodes and locates the
//! required driver libraries in the configured library directories.

use crate::config::HostConfig;
use crate::error::InventoryError;
use crate::inventory::traits::{parse_device_node_name, HostGpu, HostInventory};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Inventory snapshot taken from the host filesystem
///
/// A snapshot is taken once per launch and never refreshed.
#[derive(Debug, Clone)]
pub struct DevfsInventory {
    gpus: BTreeMap<u32, HostGpu>,
    control_nodes: Vec<PathBuf>,
    libraries: Vec<PathBuf>,
    missing_libraries: Vec<String>,
}

impl DevfsInventory {
    /// Scan the host according to `config`
    pub fn scan(config: &HostConfig) -> Result<Self, InventoryError> {
        let nodes = scan_device_nodes(&config.device_dir)?;

        let mut libraries = Vec::with_capacity(config.required_libraries.len());
        let mut missing_libraries = Vec::new();
        for name in &config.required_libraries {
            match locate_library(name, &config.library_dirs) {
                Some(path) => libraries.push(path),
                None => missing_libraries.push(name.clone()),
            }
        }

        // Without the full library set no GPU is usable
        let gpus = if missing_libraries.is_empty() {
            nodes
                .into_iter()
                .map(|(index, path)| (index, HostGpu::new(index, path)))
                .collect()
        } else {
            if !nodes.is_empty() {
                log::warn!(
                    "Found {} GPU device node(s) but driver libraries are missing: {}",
                    nodes.len(),
                    missing_libraries.join(", ")
                );
            }
            BTreeMap::new()
        };

        let control_nodes = config
            .control_nodes
            .iter()
            .map(|name| config.device_dir.join(name))
            .filter(|path| path.exists())
            .collect();

        log::debug!(
            "Host inventory: GPUs {:?}, {} driver libraries located",
            gpus.keys().collect::<Vec<_>>(),
            libraries.len()
        );

        Ok(Self {
            gpus,
            control_nodes,
            libraries,
            missing_libraries,
        })
    }

    /// Required libraries that could not be located
    pub fn missing_libraries(&self) -> &[String] {
        &self.missing_libraries
    }
}

impl HostInventory for DevfsInventory {
    fn gpu(&self, index: u32) -> Option<&HostGpu> {
        self.gpus.get(&index)
    }

    fn all_indices(&self) -> Vec<u32> {
        self.gpus.keys().copied().collect()
    }

    fn control_nodes(&self) -> &[PathBuf] {
        &self.control_nodes
    }

    fn driver_libraries(&self) -> &[PathBuf] {
        &self.libraries
    }
}

fn scan_device_nodes(dir: &Path) -> Result<BTreeMap<u32, PathBuf>, InventoryError> {
    let entries = std::fs::read_dir(dir).map_err(|source| InventoryError::DeviceDirUnreadable {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut nodes = BTreeMap::new();
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(index) = name.to_str().and_then(parse_device_node_name) else {
            continue;
        };
        nodes.insert(index, entry.path());
    }
    Ok(nodes)
}

fn locate_library(name: &str, dirs: &[PathBuf]) -> Option<PathBuf> {
    dirs.iter().map(|dir| dir.join(name)).find(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::REQUIRED_LIBRARIES;
    use std::fs;

    struct Host {
        root: tempfile::TempDir,
        config: HostConfig,
    }

    fn host(nodes: &[&str], libs: &[&str]) -> Host {
        let root = tempfile::tempdir().unwrap();
        let dev = root.path().join("dev");
        let lib = root.path().join("lib64");
        fs::create_dir_all(&dev).unwrap();
        fs::create_dir_all(&lib).unwrap();
        for node in nodes {
            fs::write(dev.join(node), b"").unwrap();
        }
        for l in libs {
            fs::write(lib.join(l), b"\x7fELF").unwrap();
        }
        let config = HostConfig {
            device_dir: dev,
            library_dirs: vec![root.path().join("missing"), lib],
            ..HostConfig::default()
        };
        Host { root, config }
    }

    #[test]
    fn test_scan_finds_gpus_and_libraries() {
        let h = host(&["nvidia1", "nvidia0", "nvidiactl", "null"], &REQUIRED_LIBRARIES);
        let inv = DevfsInventory::scan(&h.config).unwrap();

        assert_eq!(inv.all_indices(), vec![0, 1]);
        assert!(inv.exists(0));
        assert!(inv.exists(1));
        assert!(!inv.exists(2));
        assert_eq!(inv.driver_libraries().len(), REQUIRED_LIBRARIES.len());
        assert_eq!(inv.control_nodes().len(), 1);
        assert!(inv.control_nodes()[0].ends_with("nvidiactl"));
        assert_eq!(
            inv.gpu(1).unwrap().device_path,
            h.config.device_dir.join("nvidia1")
        );
    }

    #[test]
    fn test_zero_padded_node_is_ignored() {
        let h = host(&["nvidia01", "nvidia1"], &REQUIRED_LIBRARIES);
        let inv = DevfsInventory::scan(&h.config).unwrap();

        assert_eq!(inv.all_indices(), vec![1]);
        assert_eq!(
            inv.gpu(1).unwrap().device_path,
            h.config.device_dir.join("nvidia1")
        );
    }

    #[test]
    fn test_missing_library_hides_gpus() {
        let h = host(&["nvidia0"], &REQUIRED_LIBRARIES[..5]);
        let inv = DevfsInventory::scan(&h.config).unwrap();

        assert!(inv.all_indices().is_empty());
        assert!(!inv.exists(0));
        assert_eq!(inv.missing_libraries(), &["libnvidia-fatbinaryloader.so"]);
    }

    #[test]
    fn test_first_library_dir_wins() {
        let mut h = host(&["nvidia0"], &REQUIRED_LIBRARIES);
        let override_dir = h.root.path().join("override");
        fs::create_dir_all(&override_dir).unwrap();
        fs::write(override_dir.join("libcuda.so"), b"").unwrap();
        h.config.library_dirs.insert(0, override_dir.clone());

        let inv = DevfsInventory::scan(&h.config).unwrap();
        assert_eq!(inv.driver_libraries()[0], override_dir.join("libcuda.so"));
    }

    #[test]
    fn test_unreadable_device_dir() {
        let config = HostConfig {
            device_dir: PathBuf::from("/nonexistent/dev"),
            ..HostConfig::default()
        };
        assert!(matches!(
            DevfsInventory::scan(&config),
            Err(InventoryError::DeviceDirUnreadable { .. })
        ));
    }
}
