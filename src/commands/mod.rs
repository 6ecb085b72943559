//! Command handlers
//!
//! Each command handler orchestrates the execution of a CLI command.

pub mod apply;
pub mod inventory;
pub mod plan;

pub use apply::run_apply;
pub use inventory::run_inventory;
pub use plan::run_plan;
