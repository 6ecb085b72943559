//! Trait definitions for the host GPU inventory
//!
//! The resolver takes the inventory as an explicit read-only snapshot so it
//! can be exercised without a real device filesystem.

use serde::Serialize;
use std::path::PathBuf;

/// Device node name for a GPU index (`nvidia<N>`)
pub fn device_node_name(index: u32) -> String {
    format!("nvidia{}", index)
}

/// Parse a device node name of the form `nvidia<N>`
///
/// Shared nodes like `nvidiactl` or `nvidia-uvm` do not match, and neither
/// do zero-padded names like `nvidia01`: the kernel never creates them, so
/// only the canonical spelling maps to an index.
pub fn parse_device_node_name(name: &str) -> Option<u32> {
    let digits = name.strip_prefix("nvidia")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }
    digits.parse().ok()
}

/// A GPU present on the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostGpu {
    /// GPU index (the `N` in `nvidia<N>`)
    pub index: u32,
    /// Host path of the device node
    pub device_path: PathBuf,
}

impl HostGpu {
    pub fn new(index: u32, device_path: PathBuf) -> Self {
        Self { index, device_path }
    }

    /// Device node name, e.g. `nvidia0`
    pub fn node_name(&self) -> String {
        device_node_name(self.index)
    }
}

/// Read-only snapshot of the host GPU inventory
///
/// Implementations must be safe to query from concurrent launches.
pub trait HostInventory: Send + Sync {
    /// Look up a GPU by index
    fn gpu(&self, index: u32) -> Option<&HostGpu>;

    /// All GPU indices present on the host, ascending
    fn all_indices(&self) -> Vec<u32>;

    /// Host paths of the shared control nodes that exist
    fn control_nodes(&self) -> &[PathBuf];

    /// Host paths of the located driver libraries, in required-list order
    fn driver_libraries(&self) -> &[PathBuf];

    /// Whether a GPU with this index is present (node and full library set)
    fn exists(&self, index: u32) -> bool {
        self.gpu(index).is_some()
    }

    /// Number of GPUs present
    fn gpu_count(&self) -> usize {
        self.all_indices().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_node_name() {
        assert_eq!(device_node_name(0), "nvidia0");
        assert_eq!(device_node_name(12), "nvidia12");
    }

    #[test]
    fn test_parse_device_node_name() {
        assert_eq!(parse_device_node_name("nvidia0"), Some(0));
        assert_eq!(parse_device_node_name("nvidia15"), Some(15));
        assert_eq!(parse_device_node_name("nvidiactl"), None);
        assert_eq!(parse_device_node_name("nvidia-uvm"), None);
        assert_eq!(parse_device_node_name("nvidia"), None);
        assert_eq!(parse_device_node_name("nvme0"), None);
    }

    #[test]
    fn test_parse_device_node_name_rejects_zero_padding() {
        assert_eq!(parse_device_node_name("nvidia01"), None);
        assert_eq!(parse_device_node_name("nvidia00"), None);
        assert_eq!(parse_device_node_name("nvidia10"), Some(10));
    }

    #[test]
    fn test_host_gpu_node_name() {
        let gpu = HostGpu::new(3, PathBuf::from("/dev/nvidia3"));
        assert_eq!(gpu.node_name(), "nvidia3");
    }
}
