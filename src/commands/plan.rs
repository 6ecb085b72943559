//! Plan command implementation
//!
//! Resolves the exposure plan for a launch without touching anything.

use crate::cli::args::{OutputFormat, PlanArgs};
use crate::cli::output::{print_output, PlanReport};
use crate::config::Config;
use crate::error::Result;
use crate::inventory::DevfsInventory;
use crate::services::plan_launch;

/// Execute the plan command
pub fn run_plan(args: &PlanArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let inventory = DevfsInventory::scan(&config.host)?;
    let plan = plan_launch(config, args.gpu.as_deref(), &inventory);

    print_output(&PlanReport::new(plan, config), format)?;

    Ok(())
}
