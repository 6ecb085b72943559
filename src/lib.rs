//! gpuexpose - GPU visibility resolver for container launches
//!
//! Decides which host NVIDIA device nodes and driver libraries a container
//! sees, and exposes them under the container root.
//!
//! # Modules
//!
//! - [`cli`]: Command-line interface definitions
//! - [`commands`]: Command handlers
//! - [`config`]: Configuration system
//! - [`domain`]: Selector and exposure plan types
//! - [`error`]: Error types
//! - [`inventory`]: Host GPU inventory
//! - [`namespace`]: Backends exposing host files in a container root
//! - [`services`]: Precedence resolution, planning and execution

pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod error;
pub mod inventory;
pub mod namespace;
pub mod services;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use error::{AppError, Result};
