//! Trait definitions for container namespace operations
//!
//! The executor drives one of these backends; it never decides what to
//! expose, only how.

use std::io;
use std::path::{Component, Path, PathBuf};

/// Operations that make host files visible inside a container root
pub trait ExposureBackend {
    /// Make the host device node `host` visible at `target`
    fn bind_device(&mut self, host: &Path, target: &Path) -> io::Result<()>;

    /// Make the host library file `host` visible at `target`
    fn expose_library(&mut self, host: &Path, target: &Path) -> io::Result<()>;

    /// Undo a previous `bind_device` or `expose_library` at `target`
    fn revoke(&mut self, target: &Path) -> io::Result<()>;
}

impl<B: ExposureBackend + ?Sized> ExposureBackend for &mut B {
    fn bind_device(&mut self, host: &Path, target: &Path) -> io::Result<()> {
        (**self).bind_device(host, target)
    }

    fn expose_library(&mut self, host: &Path, target: &Path) -> io::Result<()> {
        (**self).expose_library(host, target)
    }

    fn revoke(&mut self, target: &Path) -> io::Result<()> {
        (**self).revoke(target)
    }
}

/// Map an absolute in-container path below the container root
pub fn in_rootfs(rootfs: &Path, container_path: &Path) -> PathBuf {
    let relative = container_path
        .strip_prefix("/")
        .unwrap_or(container_path);
    rootfs.join(relative)
}

/// First entry at or above `path` and below `rootfs` that is a symlink
///
/// The walk stops at the first component that does not exist yet. A `..`
/// component is rejected with `InvalidInput`.
pub fn symlink_below(rootfs: &Path, path: &Path) -> io::Result<Option<PathBuf>> {
    let relative = path.strip_prefix(rootfs).unwrap_or(path);
    let mut cursor = rootfs.to_path_buf();
    for component in relative.components() {
        match component {
            Component::Normal(part) => cursor.push(part),
            Component::CurDir | Component::RootDir => continue,
            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("{} leaves the container root", path.display()),
                ))
            }
        }
        match std::fs::symlink_metadata(&cursor) {
            Ok(meta) if meta.file_type().is_symlink() => return Ok(Some(cursor)),
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::symlink;

    #[test]
    fn test_in_rootfs() {
        assert_eq!(
            in_rootfs(Path::new("/var/run/c1"), Path::new("/dev/nvidia0")),
            PathBuf::from("/var/run/c1/dev/nvidia0")
        );
        assert_eq!(
            in_rootfs(Path::new("/var/run/c1"), Path::new("gpu-support")),
            PathBuf::from("/var/run/c1/gpu-support")
        );
    }

    #[test]
    fn test_symlink_below_plain_tree() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("dev")).unwrap();

        let target = root.path().join("dev/nvidia0");
        assert_eq!(symlink_below(root.path(), &target).unwrap(), None);
    }

    #[test]
    fn test_symlink_below_finds_directory_link() {
        let root = tempfile::tempdir().unwrap();
        let outside = tempfile::tempdir().unwrap();
        symlink(outside.path(), root.path().join("dev")).unwrap();

        let target = root.path().join("dev/nvidia0");
        assert_eq!(
            symlink_below(root.path(), &target).unwrap(),
            Some(root.path().join("dev"))
        );
    }

    #[test]
    fn test_symlink_below_finds_dangling_leaf() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("lib")).unwrap();
        symlink("/nonexistent/libcuda.so", root.path().join("lib/libcuda.so")).unwrap();

        let target = root.path().join("lib/libcuda.so");
        assert_eq!(symlink_below(root.path(), &target).unwrap(), Some(target));
    }

    #[test]
    fn test_symlink_below_rejects_parent_dir() {
        let root = tempfile::tempdir().unwrap();
        let target = root.path().join("dev/../../etc/passwd");
        let err = symlink_below(root.path(), &target).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
