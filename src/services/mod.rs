//! Service layer for GPU visibility resolution
//!
//! Services encapsulate the resolution pipeline: selector precedence,
//! exposure planning against the host inventory, and plan execution.

pub mod executor;
pub mod planner;
pub mod resolver;

pub use executor::{AppliedExposure, ExposureExecutor};
pub use planner::ExposurePlanner;
pub use resolver::{resolve, resolve_raw, SelectorResolver};

use crate::config::Config;
use crate::domain::ExposurePlan;
use crate::inventory::HostInventory;

/// Resolve the exposure plan for one launch from the current environment
pub fn plan_launch<I: HostInventory + ?Sized>(
    config: &Config,
    cmdline: Option<&str>,
    inventory: &I,
) -> ExposurePlan {
    let resolver = SelectorResolver::new(config.selector.env_var.as_str());
    let selector = resolver.resolve_from_env(cmdline);
    let plan = ExposurePlanner::new(&config.container).plan(&selector, inventory);
    log::info!("GPU exposure: {}", plan);
    plan
}
