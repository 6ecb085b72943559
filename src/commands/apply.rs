//! Apply command implementation
//!
//! Resolves the exposure plan and applies it below a container root.

use crate::cli::args::{ApplyArgs, ExposureMode, OutputFormat};
use crate::cli::output::{print_output, ApplyReport, PlanReport};
use crate::config::Config;
use crate::domain::ExposurePlan;
use crate::error::Result;
use crate::inventory::DevfsInventory;
use crate::namespace::{ExposureBackend, StagingBackend};
use crate::services::{plan_launch, AppliedExposure, ExposureExecutor};

/// Execute the apply command
pub fn run_apply(args: &ApplyArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let inventory = DevfsInventory::scan(&config.host)?;
    let plan = plan_launch(config, args.gpu.as_deref(), &inventory);
    let dry_run = config.general.dry_run;

    let applied = match args.mode {
        ExposureMode::Copy => execute(StagingBackend::new(), args, &plan, dry_run)?,
        ExposureMode::Bind => execute(bind_backend()?, args, &plan, dry_run)?,
    };

    let report = ApplyReport {
        plan: PlanReport::new(plan, config),
        applied,
    };
    print_output(&report, format)?;

    Ok(())
}

fn execute<B: ExposureBackend>(
    backend: B,
    args: &ApplyArgs,
    plan: &ExposurePlan,
    dry_run: bool,
) -> Result<AppliedExposure> {
    let mut executor = ExposureExecutor::new(backend, &args.rootfs, dry_run);
    Ok(executor.apply(plan)?)
}

#[cfg(target_os = "linux")]
fn bind_backend() -> Result<crate::namespace::BindMountBackend> {
    Ok(crate::namespace::BindMountBackend::new())
}

#[cfg(not(target_os = "linux"))]
fn bind_backend() -> Result<StagingBackend> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "bind mode is only supported on Linux; use --mode copy",
    )
    .into())
}
