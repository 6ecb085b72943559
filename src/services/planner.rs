//! Exposure planning
//!
//! Turns the effective selector and a host inventory snapshot into an
//! [`ExposurePlan`]. Indices missing on the host are dropped without error,
//! selector order is kept, and the driver libraries are exposed as a single
//! unit whenever at least one GPU survives the filter.

use crate::config::ContainerConfig;
use crate::domain::{DeviceBinding, EffectiveSelection, ExposurePlan, GpuSelector, LibraryExposure};
use crate::inventory::HostInventory;

use std::path::PathBuf;

/// Builds exposure plans for one container layout
#[derive(Debug, Clone)]
pub struct ExposurePlanner {
    container_device_dir: PathBuf,
    container_library_dir: PathBuf,
}

impl ExposurePlanner {
    /// Create a planner targeting the given in-container paths
    pub fn new(container: &ContainerConfig) -> Self {
        Self {
            container_device_dir: container.device_dir.clone(),
            container_library_dir: container.library_dir.clone(),
        }
    }

    /// Filter the selector against the inventory
    pub fn select<I: HostInventory + ?Sized>(
        &self,
        selector: &GpuSelector,
        inventory: &I,
    ) -> EffectiveSelection {
        let filtered = selector
            .indices()
            .iter()
            .copied()
            .filter(|&idx| {
                let present = inventory.exists(idx);
                if !present {
                    log::debug!("GPU {} not present on host, dropping", idx);
                }
                present
            })
            .collect();

        EffectiveSelection::from_filtered(filtered)
    }

    /// Build the plan for `selector`
    pub fn plan<I: HostInventory + ?Sized>(
        &self,
        selector: &GpuSelector,
        inventory: &I,
    ) -> ExposurePlan {
        let selection = self.select(selector, inventory);
        if selection.is_empty() {
            return ExposurePlan::empty();
        }

        let devices = selection
            .indices()
            .iter()
            .filter_map(|&idx| inventory.gpu(idx))
            .map(|gpu| {
                let name = gpu.node_name();
                DeviceBinding {
                    container_path: self.container_device_dir.join(&name),
                    host_path: gpu.device_path.clone(),
                    name,
                }
            })
            .collect();

        let control_nodes = inventory
            .control_nodes()
            .iter()
            .filter_map(|host_path| {
                let name = host_path.file_name()?.to_string_lossy().into_owned();
                Some(DeviceBinding {
                    container_path: self.container_device_dir.join(&name),
                    host_path: host_path.clone(),
                    name,
                })
            })
            .collect();

        let libraries = LibraryExposure {
            host_files: inventory.driver_libraries().to_vec(),
            container_dir: self.container_library_dir.clone(),
        };

        ExposurePlan {
            selection,
            devices,
            control_nodes,
            libraries: Some(libraries),
        }
    }
}

impl Default for ExposurePlanner {
    fn default() -> Self {
        Self::new(&ContainerConfig::default())
    }
}
