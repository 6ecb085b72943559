//! Exposure plan domain types
//!
//! The planner produces an [`ExposurePlan`]; the executor only consumes it.

use crate::domain::selector::join_indices;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Precedence-resolved selection, filtered against the host inventory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "indices", rename_all = "lowercase")]
pub enum EffectiveSelection {
    /// No GPUs are visible
    NoGpus,
    /// Non-empty ordered list of GPU indices present on the host
    Gpus(Vec<u32>),
}

impl EffectiveSelection {
    /// Build from an already filtered index list; empty becomes `NoGpus`
    pub fn from_filtered(indices: Vec<u32>) -> Self {
        if indices.is_empty() {
            EffectiveSelection::NoGpus
        } else {
            EffectiveSelection::Gpus(indices)
        }
    }

    pub fn indices(&self) -> &[u32] {
        match self {
            EffectiveSelection::NoGpus => &[],
            EffectiveSelection::Gpus(indices) => indices,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, EffectiveSelection::NoGpus)
    }
}

impl fmt::Display for EffectiveSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EffectiveSelection::NoGpus => write!(f, "no GPUs"),
            EffectiveSelection::Gpus(indices) => write!(f, "GPUs {}", join_indices(indices)),
        }
    }
}

/// A single device node to bind into the container
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceBinding {
    /// Node name, e.g. `nvidia0` or `nvidiactl`
    pub name: String,
    /// Path on the host
    pub host_path: PathBuf,
    /// Path inside the container (absolute, relative to the container root)
    pub container_path: PathBuf,
}

/// Driver library directory to expose inside the container
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LibraryExposure {
    /// Located host library files, in required-list order
    pub host_files: Vec<PathBuf>,
    /// Fixed in-container directory
    pub container_dir: PathBuf,
}

impl LibraryExposure {
    /// File names that will appear in the container directory
    pub fn file_names(&self) -> Vec<String> {
        self.host_files
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect()
    }
}

/// Concrete exposure decision for one container launch
///
/// `libraries` is `Some` exactly when `devices` is non-empty, and control
/// nodes follow the same rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExposurePlan {
    pub selection: EffectiveSelection,
    /// Per-GPU nodes, in selection order
    pub devices: Vec<DeviceBinding>,
    /// Shared driver control nodes (`nvidiactl`, `nvidia-uvm`, ...)
    pub control_nodes: Vec<DeviceBinding>,
    pub libraries: Option<LibraryExposure>,
}

impl ExposurePlan {
    /// Plan that exposes nothing
    pub fn empty() -> Self {
        Self {
            selection: EffectiveSelection::NoGpus,
            devices: vec![],
            control_nodes: vec![],
            libraries: None,
        }
    }

    pub fn libraries_exposed(&self) -> bool {
        self.libraries.is_some()
    }

    /// Names of the per-GPU device nodes, in order
    pub fn device_names(&self) -> Vec<&str> {
        self.devices.iter().map(|d| d.name.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty() && self.libraries.is_none()
    }

    /// Environment additions for the container process.
    ///
    /// `visible_var` receives the filtered index list, so the container sees
    /// the same variable the selector was read from. `existing_ld_path` is the
    /// container's own `LD_LIBRARY_PATH`, if any; the library directory is
    /// prepended to it.
    pub fn environment(
        &self,
        visible_var: &str,
        existing_ld_path: Option<&str>,
    ) -> Vec<(String, String)> {
        let Some(libs) = &self.libraries else {
            return vec![];
        };

        let lib_dir = libs.container_dir.display().to_string();
        let ld_path = match existing_ld_path {
            Some(existing) if !existing.is_empty() => format!("{}:{}", lib_dir, existing),
            _ => lib_dir,
        };

        vec![
            (visible_var.to_string(), join_indices(self.selection.indices())),
            ("LD_LIBRARY_PATH".to_string(), ld_path),
        ]
    }
}

impl fmt::Display for ExposurePlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (devices: [{}], libraries: {})",
            self.selection,
            self.device_names().join(", "),
            if self.libraries_exposed() { "exposed" } else { "absent" }
        )
    }
}
