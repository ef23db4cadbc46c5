//! Extended-attribute syscalls on a path, without following a final symlink.
//!
//! Passing an empty buffer to [`list`] or [`get`] queries the size the value
//! needs instead of copying it.

use nix::libc;
use std::ffi::CString;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

/// `setxattr` flag: fail if the attribute exists.
pub const XATTR_CREATE: u32 = 1;
/// `setxattr` flag: fail if the attribute does not exist.
pub const XATTR_REPLACE: u32 = 2;

fn path_cstring(path: &Path) -> io::Result<CString> {
    Ok(CString::new(path.as_os_str().as_bytes())?)
}

fn buffer_parts(buf: &mut [u8]) -> (*mut libc::c_void, usize) {
    if buf.is_empty() {
        (std::ptr::null_mut(), 0)
    } else {
        (buf.as_mut_ptr().cast(), buf.len())
    }
}

fn check_size(ret: libc::ssize_t) -> io::Result<usize> {
    if ret < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(ret as usize)
}

/// Copies the NUL-separated attribute name list into `buf`.
pub fn list(path: &Path, buf: &mut [u8]) -> io::Result<usize> {
    let path = path_cstring(path)?;
    let (ptr, len) = buffer_parts(buf);

    // SAFETY: `path` is a NUL-terminated CString that outlives the call.
    // `ptr` is either null with `len == 0` (size query) or points at `len`
    // writable bytes borrowed from `buf`.
    #[cfg(target_os = "linux")]
    let ret = unsafe { libc::llistxattr(path.as_ptr(), ptr.cast(), len) };
    // SAFETY: as above.
    #[cfg(target_os = "macos")]
    let ret = unsafe { libc::listxattr(path.as_ptr(), ptr.cast(), len, libc::XATTR_NOFOLLOW) };

    check_size(ret)
}

/// Copies the value of attribute `name` into `buf`.
pub fn get(path: &Path, name: &str, buf: &mut [u8]) -> io::Result<usize> {
    let path = path_cstring(path)?;
    let name = CString::new(name)?;
    let (ptr, len) = buffer_parts(buf);

    // SAFETY: `path` and `name` are NUL-terminated CStrings that outlive the
    // call. `ptr` is either null with `len == 0` (size query) or points at
    // `len` writable bytes borrowed from `buf`.
    #[cfg(target_os = "linux")]
    let ret = unsafe { libc::lgetxattr(path.as_ptr(), name.as_ptr(), ptr, len) };
    // SAFETY: as above.
    #[cfg(target_os = "macos")]
    let ret = unsafe {
        libc::getxattr(
            path.as_ptr(),
            name.as_ptr(),
            ptr,
            len,
            0,
            libc::XATTR_NOFOLLOW,
        )
    };

    check_size(ret)
}

/// Sets attribute `name` to `value`. `flags` uses the Linux numbering.
pub fn set(path: &Path, name: &str, value: &[u8], flags: u32) -> io::Result<()> {
    let path = path_cstring(path)?;
    let name = CString::new(name)?;

    // SAFETY: `path` and `name` are NUL-terminated CStrings that outlive the
    // call. The value pointer and length come from the `value` slice, which
    // the kernel only reads.
    #[cfg(target_os = "linux")]
    let ret = unsafe {
        libc::lsetxattr(
            path.as_ptr(),
            name.as_ptr(),
            value.as_ptr().cast(),
            value.len(),
            flags as libc::c_int,
        )
    };
    #[cfg(target_os = "macos")]
    let ret = {
        let mut options = libc::XATTR_NOFOLLOW;
        if flags & XATTR_CREATE != 0 {
            options |= libc::XATTR_CREATE;
        }
        if flags & XATTR_REPLACE != 0 {
            options |= libc::XATTR_REPLACE;
        }
        // SAFETY: as for the Linux call above.
        unsafe {
            libc::setxattr(
                path.as_ptr(),
                name.as_ptr(),
                value.as_ptr().cast(),
                value.len(),
                0,
                options,
            )
        }
    };

    if ret != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// Whether the filesystem under `dir` accepts user attributes.
///
/// Writes and removes a scratch file in `dir`.
pub fn supported(dir: &Path) -> bool {
    let scratch = dir.join(".xattr-check");
    if std::fs::write(&scratch, "").is_err() {
        return false;
    }
    let ok = set(&scratch, "user.check", b"1", 0).is_ok();
    let _ = std::fs::remove_file(&scratch);
    ok
}
