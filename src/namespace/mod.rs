//! Container namespace backends
//!
//! Backends perform the actual exposure of host files under a container
//! root. Isolation between containers is the launch substrate's job.

#[cfg(target_os = "linux")]
pub mod bind;
pub mod staging;
pub mod traits;

#[cfg(target_os = "linux")]
pub use bind::BindMountBackend;
pub use staging::StagingBackend;
pub use traits::{in_rootfs, symlink_below, ExposureBackend};
