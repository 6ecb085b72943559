//! Exposure execution
//!
//! Applies an [`ExposurePlan`] under a container root through an
//! [`ExposureBackend`]. Every applied step is journaled; on the first failure
//! the journal is unwound in reverse so the container is left with nothing
//! exposed rather than a partial plan.

use crate::domain::{DeviceBinding, ExposurePlan};
use crate::error::ExposureError;
use crate::namespace::{in_rootfs, symlink_below, ExposureBackend};

use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// What was exposed for one launch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AppliedExposure {
    /// Device targets below the container root, in bind order
    pub devices: Vec<PathBuf>,
    /// Library targets below the container root
    pub libraries: Vec<PathBuf>,
    /// Nothing was touched
    pub dry_run: bool,
}

#[derive(Debug)]
enum Step {
    Dir(PathBuf),
    Device(PathBuf),
    Library(PathBuf),
}

/// Applies exposure plans to one container root
pub struct ExposureExecutor<B: ExposureBackend> {
    backend: B,
    rootfs: PathBuf,
    dry_run: bool,
}

impl<B: ExposureBackend> ExposureExecutor<B> {
    /// Create a new executor
    pub fn new(backend: B, rootfs: impl Into<PathBuf>, dry_run: bool) -> Self {
        Self {
            backend,
            rootfs: rootfs.into(),
            dry_run,
        }
    }

    /// Check if in dry-run mode
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Apply `plan`; on error nothing from this plan remains exposed
    pub fn apply(&mut self, plan: &ExposurePlan) -> Result<AppliedExposure, ExposureError> {
        if !self.rootfs.is_dir() {
            return Err(ExposureError::InvalidRootfs(self.rootfs.clone()));
        }

        if self.dry_run {
            return Ok(self.describe(plan));
        }

        let mut journal = Vec::new();
        match self.apply_steps(plan, &mut journal) {
            Ok(()) => Ok(summarize(&journal)),
            Err(e) => {
                log::warn!("Exposure failed, rolling back {} step(s): {}", journal.len(), e);
                self.rollback(journal);
                Err(e)
            }
        }
    }

    fn describe(&self, plan: &ExposurePlan) -> AppliedExposure {
        let mut applied = AppliedExposure {
            dry_run: true,
            ..AppliedExposure::default()
        };

        for binding in plan.devices.iter().chain(&plan.control_nodes) {
            let target = in_rootfs(&self.rootfs, &binding.container_path);
            log::info!(
                "DRY RUN: Would bind {} at {}",
                binding.host_path.display(),
                target.display()
            );
            applied.devices.push(target);
        }

        if let Some(libs) = &plan.libraries {
            let dir = in_rootfs(&self.rootfs, &libs.container_dir);
            log::info!(
                "DRY RUN: Would expose {} driver libraries in {}",
                libs.host_files.len(),
                dir.display()
            );
            applied.libraries = libs.file_names().iter().map(|n| dir.join(n)).collect();
        }

        applied
    }

    fn apply_steps(
        &mut self,
        plan: &ExposurePlan,
        journal: &mut Vec<Step>,
    ) -> Result<(), ExposureError> {
        for binding in plan.devices.iter().chain(&plan.control_nodes) {
            self.bind(binding, journal)?;
        }

        let Some(libs) = &plan.libraries else {
            return Ok(());
        };

        let dir = in_rootfs(&self.rootfs, &libs.container_dir);
        let dir_error = |source| ExposureError::LibraryMount {
            target: dir.clone(),
            source,
        };
        self.guard(&dir, dir_error)?;
        create_dirs(&dir, journal).map_err(dir_error)?;

        for host in &libs.host_files {
            let Some(name) = host.file_name() else {
                continue;
            };
            let target = dir.join(name);
            self.guard(&target, |source| ExposureError::LibraryMount {
                target: target.clone(),
                source,
            })?;
            self.backend
                .expose_library(host, &target)
                .map_err(|source| ExposureError::LibraryMount {
                    target: target.clone(),
                    source,
                })?;
            journal.push(Step::Library(target));
        }

        log::debug!(
            "Exposed {} driver libraries in {}",
            libs.host_files.len(),
            dir.display()
        );
        Ok(())
    }

    fn bind(
        &mut self,
        binding: &DeviceBinding,
        journal: &mut Vec<Step>,
    ) -> Result<(), ExposureError> {
        let target = in_rootfs(&self.rootfs, &binding.container_path);
        let to_error = |source| ExposureError::DeviceBind {
            host: binding.host_path.clone(),
            target: target.clone(),
            source,
        };

        self.guard(&target, to_error)?;
        if let Some(parent) = target.parent() {
            create_dirs(parent, journal).map_err(to_error)?;
        }
        self.backend
            .bind_device(&binding.host_path, &target)
            .map_err(to_error)?;

        log::debug!("Bound {} at {}", binding.name, target.display());
        journal.push(Step::Device(target));
        Ok(())
    }

    /// Refuse `target` if it or any directory above it inside the root is a
    /// symlink; the image controls those entries
    fn guard(
        &self,
        target: &Path,
        to_error: impl FnOnce(io::Error) -> ExposureError,
    ) -> Result<(), ExposureError> {
        match symlink_below(&self.rootfs, target) {
            Ok(None) => Ok(()),
            Ok(Some(link)) => Err(ExposureError::SymlinkInRootfs(link)),
            Err(e) => Err(to_error(e)),
        }
    }

    fn rollback(&mut self, journal: Vec<Step>) {
        for step in journal.into_iter().rev() {
            let result = match &step {
                Step::Device(target) | Step::Library(target) => self.backend.revoke(target),
                Step::Dir(dir) => fs::remove_dir(dir),
            };
            if let Err(e) = result {
                log::error!("Rollback of {:?} failed: {}", step, e);
            }
        }
    }
}

/// Create `dir` and any missing parents, journaling each created level
fn create_dirs(dir: &Path, journal: &mut Vec<Step>) -> io::Result<()> {
    let mut missing = Vec::new();
    let mut cursor = Some(dir);
    while let Some(path) = cursor {
        if fs::symlink_metadata(path).is_ok() {
            break;
        }
        missing.push(path.to_path_buf());
        cursor = path.parent();
    }

    for path in missing.into_iter().rev() {
        fs::create_dir(&path)?;
        journal.push(Step::Dir(path));
    }
    Ok(())
}

fn summarize(journal: &[Step]) -> AppliedExposure {
    let mut applied = AppliedExposure::default();
    for step in journal {
        match step {
            Step::Device(target) => applied.devices.push(target.clone()),
            Step::Library(target) => applied.libraries.push(target.clone()),
            Step::Dir(_) => {}
        }
    }
    applied
}
