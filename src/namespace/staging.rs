//! Unprivileged staging backend
//!
//! Mirrors an exposure into a plain directory tree: device nodes become empty
//! marker files and libraries are copied. Used to prepare image trees and to
//! test the executor without mount privileges.

use crate::namespace::traits::ExposureBackend;

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;

/// Backend that copies instead of mounting
#[derive(Debug, Default)]
pub struct StagingBackend;

impl StagingBackend {
    pub fn new() -> Self {
        Self
    }
}

impl ExposureBackend for StagingBackend {
    fn bind_device(&mut self, host: &Path, target: &Path) -> io::Result<()> {
        // Never clobber an entry shipped with the image
        OpenOptions::new().write(true).create_new(true).open(target)?;
        log::debug!("Staged device marker {} for {}", target.display(), host.display());
        Ok(())
    }

    fn expose_library(&mut self, host: &Path, target: &Path) -> io::Result<()> {
        // create_new refuses any existing entry, dangling symlinks included
        let mut src = File::open(host)?;
        let mut dst = OpenOptions::new().write(true).create_new(true).open(target)?;
        let copied = io::copy(&mut src, &mut dst).and_then(|_| {
            dst.set_permissions(src.metadata()?.permissions())
        });
        if let Err(e) = copied {
            let _ = fs::remove_file(target);
            return Err(e);
        }
        log::debug!("Copied {} to {}", host.display(), target.display());
        Ok(())
    }

    fn revoke(&mut self, target: &Path) -> io::Result<()> {
        fs::remove_file(target)
    }
}
