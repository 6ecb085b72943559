//! Host GPU inventory
//!
//! Trait-based view of the host's GPU device nodes and driver libraries,
//! so the resolver can be tested against an in-memory inventory.

pub mod devfs;
pub mod traits;

pub use devfs::DevfsInventory;
pub use traits::{device_node_name, parse_device_node_name, HostGpu, HostInventory};
