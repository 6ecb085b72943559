//! Domain models for gpuexpose
//!
//! Selector parsing and the exposure plan types. Nothing here touches the
//! host; all values are computed fresh per container launch.

pub mod plan;
pub mod selector;

pub use plan::{DeviceBinding, EffectiveSelection, ExposurePlan, LibraryExposure};
pub use selector::{GpuSelector, SelectorSource};
