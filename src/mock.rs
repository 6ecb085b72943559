//! Mock implementations for testing
//!
//! Provides an in-memory host inventory and a recording backend so the
//! resolver and executor can be tested without a device filesystem or
//! mount privileges.

use crate::config::REQUIRED_LIBRARIES;
use crate::inventory::{device_node_name, HostGpu, HostInventory};
use crate::namespace::ExposureBackend;

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

/// In-memory host inventory
#[derive(Debug, Clone)]
pub struct MockInventory {
    gpus: BTreeMap<u32, HostGpu>,
    control_nodes: Vec<PathBuf>,
    libraries: Vec<PathBuf>,
}

impl MockInventory {
    /// Create an inventory with GPUs `0..count` and the full library set
    pub fn new(count: u32) -> Self {
        Self::with_gpus(0..count)
    }

    /// Create an inventory with the given GPU indices
    pub fn with_gpus<I: IntoIterator<Item = u32>>(indices: I) -> Self {
        let library_names: Vec<String> = REQUIRED_LIBRARIES.iter().map(|s| s.to_string()).collect();
        let gpus = indices
            .into_iter()
            .map(|idx| {
                let path = PathBuf::from("/dev").join(device_node_name(idx));
                (idx, HostGpu::new(idx, path))
            })
            .collect();

        Self {
            gpus,
            control_nodes: vec![],
            libraries: library_names
                .iter()
                .map(|name| PathBuf::from("/usr/lib64").join(name))
                .collect(),
        }
    }

    /// Builder: add shared control nodes under `/dev`
    pub fn with_control_nodes(mut self, names: &[&str]) -> Self {
        self.control_nodes = names.iter().map(|n| PathBuf::from("/dev").join(n)).collect();
        self
    }
}

impl HostInventory for MockInventory {
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

/// Backend that records operations without touching the filesystem
///
/// Can be told to fail on a target with a given file name.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    fail_on: Option<String>,
    applied: Vec<PathBuf>,
    revoked: Vec<PathBuf>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: fail any operation whose target file name is `name`
    pub fn fail_on(mut self, name: impl Into<String>) -> Self {
        self.fail_on = Some(name.into());
        self
    }

    /// Targets successfully applied, in order
    pub fn applied(&self) -> &[PathBuf] {
        &self.applied
    }

    /// Targets revoked, in order
    pub fn revoked(&self) -> &[PathBuf] {
        &self.revoked
    }

    fn record(&mut self, target: &Path) -> io::Result<()> {
        let name = target.file_name().map(|n| n.to_string_lossy());
        if self.fail_on.as_deref().is_some_and(|f| name.as_deref() == Some(f)) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("injected failure for {}", target.display()),
            ));
        }
        self.applied.push(target.to_path_buf());
        Ok(())
    }
}

impl ExposureBackend for RecordingBackend {
    fn bind_device(&mut self, _host: &Path, target: &Path) -> io::Result<()> {
        self.record(target)
    }

    fn expose_library(&mut self, _host: &Path, target: &Path) -> io::Result<()> {
        self.record(target)
    }

    fn revoke(&mut self, target: &Path) -> io::Result<()> {
        self.revoked.push(target.to_path_buf());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_inventory() {
        let inv = MockInventory::new(2);
        assert_eq!(inv.all_indices(), vec![0, 1]);
        assert!(inv.exists(1));
        assert!(!inv.exists(2));
        assert_eq!(inv.gpu_count(), 2);
        assert_eq!(inv.driver_libraries().len(), REQUIRED_LIBRARIES.len());
        assert_eq!(inv.gpu(1).unwrap().device_path, PathBuf::from("/dev/nvidia1"));
    }

    #[test]
    fn test_mock_inventory_sparse() {
        let inv = MockInventory::with_gpus([3, 1]);
        assert_eq!(inv.all_indices(), vec![1, 3]);
        assert!(!inv.exists(0));
    }

    #[test]
    fn test_recording_backend_failure() {
        let mut backend = RecordingBackend::new().fail_on("nvidia1");
        assert!(backend
            .bind_device(Path::new("/dev/nvidia0"), Path::new("/r/dev/nvidia0"))
            .is_ok());
        assert!(backend
            .bind_device(Path::new("/dev/nvidia1"), Path::new("/r/dev/nvidia1"))
            .is_err());
        assert_eq!(backend.applied(), &[PathBuf::from("/r/dev/nvidia0")]);
    }
}
