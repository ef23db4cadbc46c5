//! Lexical path helpers.
//!
//! Joining never consults the filesystem and performs no containment check:
//! `..` can climb above the served root.

use nix::libc;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Appends `name` to `base`, cleaning the result lexically.
///
/// An absolute `name` is appended rather than replacing `base`, `.` is
/// dropped and `..` removes the previous component (never past `/`).
pub fn join(base: &Path, name: &str) -> PathBuf {
    let mut joined = base.to_path_buf();
    for component in Path::new(name).components() {
        match component {
            Component::Normal(part) => joined.push(part),
            Component::ParentDir => {
                joined.pop();
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }
    if joined.as_os_str().is_empty() {
        joined.push(".");
    }
    joined
}

/// Removes a file or an empty directory.
///
/// When both unlink and rmdir fail, rmdir's error wins unless it is
/// `ENOTDIR`, which means the path was not a directory and unlink's error is
/// the meaningful one.
pub fn remove(path: &Path) -> io::Result<()> {
    let unlink_err = match std::fs::remove_file(path) {
        Ok(()) => return Ok(()),
        Err(e) => e,
    };
    match std::fs::remove_dir(path) {
        Ok(()) => Ok(()),
        Err(e) if e.raw_os_error() == Some(libc::ENOTDIR) => Err(unlink_err),
        Err(e) => Err(e),
    }
}
