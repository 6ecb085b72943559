//! Inventory command implementation
//!
//! Shows the GPU device nodes and driver libraries found on the host.

use crate::cli::args::OutputFormat;
use crate::cli::output::{print_output, InventoryReport};
use crate::config::Config;
use crate::error::Result;
use crate::inventory::DevfsInventory;

/// Execute the inventory command
pub fn run_inventory(config: &Config, format: OutputFormat) -> Result<()> {
    let inventory = DevfsInventory::scan(&config.host)?;
    let report = InventoryReport::new(&inventory, inventory.missing_libraries());

    print_output(&report, format)?;

    Ok(())
}
