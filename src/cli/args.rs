//! CLI argument definitions using clap derive
//!
//! Defines all command-line arguments and subcommands.

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

/// GPU visibility resolver for container launches
///
/// Decides which NVIDIA device nodes and driver libraries a container sees.
#[derive(Parser, Debug)]
#[command(name = "gpuexpose")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "GPUEXPOSE_CONFIG")]
    pub config: Option<String>,

    /// Host device directory holding nvidia<N> nodes
    #[arg(long, global = true)]
    pub device_dir: Option<PathBuf>,

    /// Host directory searched for driver libraries (repeatable)
    #[arg(long = "library-dir", global = true)]
    pub library_dirs: Vec<PathBuf>,

    /// Dry run mode - don't actually apply changes
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve and print the exposure plan for a launch
    Plan(PlanArgs),

    /// Resolve and apply the exposure plan to a container root
    Apply(ApplyArgs),

    /// Show the host GPU inventory
    Inventory,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments for the plan command
#[derive(Parser, Debug)]
pub struct PlanArgs {
    /// GPUs to expose, comma-separated indices (e.g. 0,1)
    ///
    /// Taken verbatim; malformed values expose no GPUs. The selection
    /// environment variable, when set, overrides this flag.
    #[arg(long, value_name = "LIST")]
    pub gpu: Option<String>,
}

/// Arguments for the apply command
#[derive(Parser, Debug)]
pub struct ApplyArgs {
    /// Container root directory
    #[arg(long, value_name = "DIR")]
    pub rootfs: PathBuf,

    /// GPUs to expose, comma-separated indices (e.g. 0,1)
    #[arg(long, value_name = "LIST")]
    pub gpu: Option<String>,

    /// How host files are made visible
    #[arg(long, value_enum, default_value = "bind")]
    pub mode: ExposureMode,
}

/// Exposure backend selection
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExposureMode {
    /// Bind-mount device nodes and libraries (requires privileges)
    #[default]
    Bind,
    /// Copy libraries and create device markers (unprivileged staging)
    Copy,
}

/// Output format
#[derive(ValueEnum, Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format for machine parsing
    Json,
    /// Compact single-line format
    Compact,
}

/// Generate shell completions and print to stdout
pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_inventory() {
        let args = Cli::try_parse_from(["gpuexpose", "inventory"]).unwrap();
        assert!(matches!(args.command, Commands::Inventory));
    }

    #[test]
    fn test_cli_parse_verbose() {
        let args = Cli::try_parse_from(["gpuexpose", "-v", "inventory"]).unwrap();
        assert!(args.verbose);
    }

    #[test]
    fn test_cli_plan_gpu_is_raw_string() {
        let args = Cli::try_parse_from(["gpuexpose", "plan", "--gpu", "NoDevFiles"]).unwrap();
        if let Commands::Plan(plan) = args.command {
            assert_eq!(plan.gpu.as_deref(), Some("NoDevFiles"));
        } else {
            panic!("Expected Plan command");
        }
    }

    #[test]
    fn test_cli_plan_gpu_empty_and_absent() {
        let args = Cli::try_parse_from(["gpuexpose", "plan", "--gpu="]).unwrap();
        if let Commands::Plan(plan) = args.command {
            assert_eq!(plan.gpu.as_deref(), Some(""));
        } else {
            panic!("Expected Plan command");
        }

        let args = Cli::try_parse_from(["gpuexpose", "plan"]).unwrap();
        if let Commands::Plan(plan) = args.command {
            assert!(plan.gpu.is_none());
        } else {
            panic!("Expected Plan command");
        }
    }

    #[test]
    fn test_cli_parse_apply() {
        let args = Cli::try_parse_from([
            "gpuexpose",
            "--dry-run",
            "apply",
            "--rootfs",
            "/var/run/containers/c1",
            "--gpu",
            "1,0",
            "--mode",
            "copy",
        ])
        .unwrap();

        assert!(args.dry_run);
        if let Commands::Apply(apply) = args.command {
            assert_eq!(apply.rootfs, PathBuf::from("/var/run/containers/c1"));
            assert_eq!(apply.gpu.as_deref(), Some("1,0"));
            assert_eq!(apply.mode, ExposureMode::Copy);
        } else {
            panic!("Expected Apply command");
        }
    }

    #[test]
    fn test_cli_apply_requires_rootfs() {
        assert!(Cli::try_parse_from(["gpuexpose", "apply", "--gpu", "0"]).is_err());
    }

    #[test]
    fn test_cli_library_dirs_repeatable() {
        let args = Cli::try_parse_from([
            "gpuexpose",
            "--library-dir",
            "/a",
            "--library-dir",
            "/b",
            "inventory",
        ])
        .unwrap();
        assert_eq!(args.library_dirs, vec![PathBuf::from("/a"), PathBuf::from("/b")]);
    }
}
