//! Bind-mount backend
//!
//! Exposes host device nodes and driver libraries with `mount(2)` bind
//! mounts. Requires `CAP_SYS_ADMIN` in the mount namespace of the container.

use crate::namespace::traits::ExposureBackend;

use std::collections::HashSet;
use std::ffi::CString;
use std::fs::{self, OpenOptions};
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

/// Backend that bind-mounts host files into the container root
///
/// Libraries are mounted read-only; device nodes keep host permissions.
#[derive(Debug)]
pub struct BindMountBackend {
    /// Mount points created by this backend, removed again on revoke
    created: HashSet<PathBuf>,
}

impl BindMountBackend {
    pub fn new() -> Self {
        Self {
            created: HashSet::new(),
        }
    }

    fn bind(&mut self, host: &Path, target: &Path, read_only: bool) -> io::Result<()> {
        // The mount point must exist; remember if we made it
        let created = match OpenOptions::new().write(true).create_new(true).open(target) {
            Ok(_) => true,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => false,
            Err(e) => return Err(e),
        };
        // mount(2) follows symlinks; an image entry must not redirect the bind
        if !created && fs::symlink_metadata(target)?.file_type().is_symlink() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} is a symlink", target.display()),
            ));
        }

        if let Err(e) = mount_bind(host, target, read_only) {
            if created {
                let _ = fs::remove_file(target);
            }
            return Err(e);
        }
        if created {
            self.created.insert(target.to_path_buf());
        }
        Ok(())
    }
}

impl Default for BindMountBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ExposureBackend for BindMountBackend {
    fn bind_device(&mut self, host: &Path, target: &Path) -> io::Result<()> {
        self.bind(host, target, false)?;
        log::debug!("Bind-mounted {} at {}", host.display(), target.display());
        Ok(())
    }

    fn expose_library(&mut self, host: &Path, target: &Path) -> io::Result<()> {
        self.bind(host, target, true)?;
        log::debug!("Bind-mounted {} at {}", host.display(), target.display());
        Ok(())
    }

    fn revoke(&mut self, target: &Path) -> io::Result<()> {
        let dst = to_cstring(target)?;
        // SAFETY: dst is a valid NUL-terminated path
        let rc = unsafe { libc::umount2(dst.as_ptr(), libc::MNT_DETACH) };
        if rc != 0 {
            let err = io::Error::last_os_error();
            // EINVAL: not a mount point, nothing left to detach
            if err.raw_os_error() != Some(libc::EINVAL) {
                return Err(err);
            }
        }
        if self.created.remove(target) {
            fs::remove_file(target)?;
        }
        Ok(())
    }
}

fn to_cstring(path: &Path) -> io::Result<CString> {
    Ok(CString::new(path.as_os_str().as_bytes())?)
}

fn mount_bind(host: &Path, target: &Path, read_only: bool) -> io::Result<()> {
    let src = to_cstring(host)?;
    let dst = to_cstring(target)?;

    // SAFETY: all pointers are valid NUL-terminated strings or null
    let rc = unsafe {
        libc::mount(
            src.as_ptr(),
            dst.as_ptr(),
            std::ptr::null(),
            libc::MS_BIND,
            std::ptr::null(),
        )
    };
    if rc != 0 {
        return Err(io::Error::last_os_error());
    }

    if read_only {
        // MS_RDONLY is ignored on the initial bind and needs a remount
        // SAFETY: same as above
        let rc = unsafe {
            libc::mount(
                std::ptr::null(),
                dst.as_ptr(),
                std::ptr::null(),
                libc::MS_BIND | libc::MS_REMOUNT | libc::MS_RDONLY,
                std::ptr::null(),
            )
        };
        if rc != 0 {
            let err = io::Error::last_os_error();
            // SAFETY: same as above
            unsafe { libc::umount2(dst.as_ptr(), libc::MNT_DETACH) };
            return Err(err);
        }
    }

    Ok(())
}
