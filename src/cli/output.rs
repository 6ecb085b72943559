//! Output formatting utilities
//!
//! Provides table and JSON output formatting for CLI commands.

use crate::cli::args::OutputFormat;
use crate::config::Config;
use crate::domain::ExposurePlan;
use crate::inventory::HostInventory;
use crate::services::AppliedExposure;
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;

/// Format and print output based on the selected format
pub fn print_output<T: Serialize + TableDisplay>(data: &T, format: OutputFormat) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match format {
        OutputFormat::Table => {
            writeln!(handle, "{}", data.to_table())?;
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(data).unwrap_or_else(|_| "{}".to_string());
            writeln!(handle, "{}", json)?;
        }
        OutputFormat::Compact => {
            writeln!(handle, "{}", data.to_compact())?;
        }
    }

    Ok(())
}

/// Trait for types that can be displayed as a table
pub trait TableDisplay {
    /// Format as a table string
    fn to_table(&self) -> String;

    /// Format as a compact single line
    fn to_compact(&self) -> String {
        self.to_table().trim_end().replace('\n', " | ")
    }
}

/// Host inventory entry for display
#[derive(Debug, Clone, Serialize)]
pub struct InventoryEntry {
    pub index: u32,
    pub device: PathBuf,
}

/// Host inventory for display
#[derive(Debug, Clone, Serialize)]
pub struct InventoryReport {
    pub gpus: Vec<InventoryEntry>,
    pub control_nodes: Vec<PathBuf>,
    pub libraries: Vec<PathBuf>,
    pub missing_libraries: Vec<String>,
}

impl InventoryReport {
    /// Snapshot an inventory for display
    pub fn new<I: HostInventory + ?Sized>(inventory: &I, missing_libraries: &[String]) -> Self {
        let gpus = inventory
            .all_indices()
            .into_iter()
            .filter_map(|idx| inventory.gpu(idx))
            .map(|gpu| InventoryEntry {
                index: gpu.index,
                device: gpu.device_path.clone(),
            })
            .collect();

        Self {
            gpus,
            control_nodes: inventory.control_nodes().to_vec(),
            libraries: inventory.driver_libraries().to_vec(),
            missing_libraries: missing_libraries.to_vec(),
        }
    }
}

impl TableDisplay for InventoryReport {
    fn to_table(&self) -> String {
        let mut output = format!("GPUs Found: {}\n", self.gpus.len());
        for gpu in &self.gpus {
            output.push_str(&format!("  [{}] {}\n", gpu.index, gpu.device.display()));
        }

        output.push_str(&format!("Control Nodes: {}\n", self.control_nodes.len()));
        for node in &self.control_nodes {
            output.push_str(&format!("  {}\n", node.display()));
        }

        output.push_str(&format!("Driver Libraries: {}\n", self.libraries.len()));
        for lib in &self.libraries {
            output.push_str(&format!("  {}\n", lib.display()));
        }
        for name in &self.missing_libraries {
            output.push_str(&format!("  {} (missing)\n", name));
        }

        output
    }

    fn to_compact(&self) -> String {
        let gpus = self
            .gpus
            .iter()
            .map(|g| g.index.to_string())
            .collect::<Vec<_>>()
            .join(",");
        format!(
            "gpus={} libraries={}/{}",
            gpus,
            self.libraries.len(),
            self.libraries.len() + self.missing_libraries.len()
        )
    }
}

/// Resolved plan for display
#[derive(Debug, Clone, Serialize)]
pub struct PlanReport {
    pub plan: ExposurePlan,
    pub environment: Vec<(String, String)>,
}

impl PlanReport {
    /// Pair a plan with the container environment it implies under `config`
    pub fn new(plan: ExposurePlan, config: &Config) -> Self {
        let environment = plan.environment(
            &config.selector.env_var,
            config.container.ld_library_path.as_deref(),
        );
        Self { plan, environment }
    }
}

impl TableDisplay for PlanReport {
    fn to_table(&self) -> String {
        let mut output = format!("Selection: {}\n", self.plan.selection);

        output.push_str("Devices:\n");
        for d in self.plan.devices.iter().chain(&self.plan.control_nodes) {
            output.push_str(&format!(
                "  {} -> {}\n",
                d.host_path.display(),
                d.container_path.display()
            ));
        }

        match &self.plan.libraries {
            Some(libs) => {
                output.push_str(&format!("Libraries: {}\n", libs.container_dir.display()));
                for f in &libs.host_files {
                    output.push_str(&format!("  {}\n", f.display()));
                }
            }
            None => output.push_str("Libraries: not exposed\n"),
        }

        for (key, value) in &self.environment {
            output.push_str(&format!("{}={}\n", key, value));
        }

        output
    }

    fn to_compact(&self) -> String {
        format!(
            "devices={} libraries={}",
            self.plan.device_names().join(","),
            if self.plan.libraries_exposed() { "yes" } else { "no" }
        )
    }
}

/// Applied exposure for display
#[derive(Debug, Clone, Serialize)]
pub struct ApplyReport {
    #[serde(flatten)]
    pub plan: PlanReport,
    pub applied: AppliedExposure,
}

impl TableDisplay for ApplyReport {
    fn to_table(&self) -> String {
        let mut output = self.plan.to_table();
        let verb = if self.applied.dry_run { "Would apply" } else { "Applied" };
        output.push_str(&format!(
            "{}: {} device(s), {} librar{}\n",
            verb,
            self.applied.devices.len(),
            self.applied.libraries.len(),
            if self.applied.libraries.len() == 1 { "y" } else { "ies" }
        ));
        output
    }

    fn to_compact(&self) -> String {
        self.plan.to_compact()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GpuSelector;
    use crate::mock::MockInventory;
    use crate::services::ExposurePlanner;

    fn plan(indices: &[u32]) -> ExposurePlan {
        let inventory = MockInventory::new(2);
        let selector = GpuSelector::from_indices(indices.iter().copied());
        ExposurePlanner::default().plan(&selector, &inventory)
    }

    fn report(indices: &[u32]) -> PlanReport {
        PlanReport::new(plan(indices), &Config::default())
    }

    #[test]
    fn test_plan_report_table() {
        let output = report(&[1, 0]).to_table();
        assert!(output.contains("Selection: GPUs 1,0"));
        assert!(output.contains("/dev/nvidia1 -> /dev/nvidia1"));
        assert!(output.contains("Libraries: /gpu-support/nvidia/lib64"));
        assert!(output.contains("CUDA_VISIBLE_DEVICES=1,0"));
    }

    #[test]
    fn test_plan_report_compact() {
        assert_eq!(report(&[0, 1]).to_compact(), "devices=nvidia0,nvidia1 libraries=yes");
        assert_eq!(report(&[]).to_compact(), "devices= libraries=no");
    }

    #[test]
    fn test_empty_plan_report() {
        let output = report(&[]).to_table();
        assert!(output.contains("Libraries: not exposed"));
        assert!(!output.contains("LD_LIBRARY_PATH"));
    }

    #[test]
    fn test_plan_report_follows_config() {
        let mut config = Config::default();
        config.selector.env_var = "NVIDIA_VISIBLE_DEVICES".to_string();
        config.container.ld_library_path = Some("/opt/app/lib".to_string());

        let output = PlanReport::new(plan(&[0]), &config).to_table();
        assert!(output.contains("NVIDIA_VISIBLE_DEVICES=0"));
        assert!(!output.contains("CUDA_VISIBLE_DEVICES"));
        assert!(output.contains("LD_LIBRARY_PATH=/gpu-support/nvidia/lib64:/opt/app/lib"));
    }

    #[test]
    fn test_inventory_report() {
        let inventory = MockInventory::new(2).with_control_nodes(&["nvidiactl"]);
        let report = InventoryReport::new(&inventory, &[]);
        assert_eq!(report.gpus.len(), 2);
        assert!(report.to_table().contains("GPUs Found: 2"));
        assert_eq!(report.to_compact(), "gpus=0,1 libraries=6/6");
    }

    #[test]
    fn test_apply_report_json() {
        let apply = ApplyReport {
            plan: report(&[0]),
            applied: AppliedExposure::default(),
        };
        let json = serde_json::to_value(&apply).unwrap();
        assert!(json.get("plan").is_some());
        assert!(json.get("applied").is_some());
        assert!(json.get("environment").is_some());
    }
}
