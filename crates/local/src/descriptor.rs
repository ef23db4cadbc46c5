//! Open descriptors and translation of 9P2000.L open flags.

use nix::libc;
use p9share_core::{FileMode, OpenFlags};
use std::fs::{File, Metadata, OpenOptions};
use std::io::{self, Write};
use std::os::unix::fs::{FileExt, OpenOptionsExt};
use std::path::Path;

/// Why a positioned write did not happen.
#[derive(Debug, thiserror::Error)]
pub enum WriteAtError {
    /// Positioned writes are refused on descriptors opened for append.
    #[error("positioned write on a descriptor opened with O_APPEND")]
    AppendOnly,

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// An open host file together with the mode it was opened in.
#[derive(Debug)]
pub struct Descriptor {
    file: File,
    flags: OpenFlags,
    append: bool,
}

/// Protocol open bits and the host flags they stand for.
///
/// Access mode, `APPEND` and `CREATE` are handled separately. `ASYNC` is
/// dropped: open(2) ignores it. `LARGEFILE` is implied on 64-bit hosts.
const HOST_FLAGS: &[(u32, libc::c_int)] = &[
    (OpenFlags::EXCLUSIVE, libc::O_EXCL),
    (OpenFlags::NOCTTY, libc::O_NOCTTY),
    (OpenFlags::TRUNCATE, libc::O_TRUNC),
    (OpenFlags::NONBLOCK, libc::O_NONBLOCK),
    (OpenFlags::DSYNC, libc::O_DSYNC),
    (OpenFlags::DIRECTORY, libc::O_DIRECTORY),
    (OpenFlags::NOFOLLOW, libc::O_NOFOLLOW),
    (OpenFlags::CLOEXEC, libc::O_CLOEXEC),
    (OpenFlags::SYNC, libc::O_SYNC),
    #[cfg(target_os = "linux")]
    (OpenFlags::DIRECT, libc::O_DIRECT),
    #[cfg(target_os = "linux")]
    (OpenFlags::NOATIME, libc::O_NOATIME),
];

impl Descriptor {
    /// Opens an existing path. Directories are opened with `O_DIRECTORY`.
    ///
    /// `CREATE` and `EXCLUSIVE` are ignored; creation goes through
    /// [`Descriptor::create`].
    pub fn open(path: &Path, flags: OpenFlags, is_dir: bool) -> io::Result<Self> {
        let mut custom = host_flags(flags) & !libc::O_EXCL;
        if is_dir {
            custom |= libc::O_DIRECTORY;
        }
        let file = options_for(flags).custom_flags(custom).open(path)?;
        Ok(Self::new(file, flags))
    }

    /// Opens `path` with `O_CREAT`, creating it with `permissions` if absent.
    ///
    /// `O_CREAT` and `O_TRUNC` go through the raw flags so read-only and
    /// append-mode creates behave like open(2) instead of being rejected by
    /// `OpenOptions`.
    pub fn create(path: &Path, flags: OpenFlags, permissions: FileMode) -> io::Result<Self> {
        let file = options_for(flags)
            .custom_flags(host_flags(flags) | libc::O_CREAT)
            .mode(permissions.permissions())
            .open(path)?;
        Ok(Self::new(file, flags))
    }

    fn new(file: File, flags: OpenFlags) -> Self {
        Self {
            file,
            flags,
            append: appends(flags),
        }
    }

    pub fn flags(&self) -> OpenFlags {
        self.flags
    }

    pub fn metadata(&self) -> io::Result<Metadata> {
        self.file.metadata()
    }

    pub fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        self.file.read_at(buf, offset)
    }

    pub fn write_at(&self, data: &[u8], offset: u64) -> Result<usize, WriteAtError> {
        if self.append {
            return Err(WriteAtError::AppendOnly);
        }
        Ok(self.file.write_at(data, offset)?)
    }

    /// Unpositioned write; lands at the end of file in append mode.
    pub fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.file.write(data)
    }

    pub fn sync(&self) -> io::Result<()> {
        self.file.sync_all()
    }

    pub fn set_len(&self, size: u64) -> io::Result<()> {
        self.file.set_len(size)
    }
}

/// `O_APPEND` only matters on a descriptor that can write.
fn appends(flags: OpenFlags) -> bool {
    flags.writable() && flags.append()
}

/// Translates every protocol bit other than the access mode, `APPEND` and
/// `CREATE` to the host's open(2) flags.
fn host_flags(flags: OpenFlags) -> libc::c_int {
    HOST_FLAGS
        .iter()
        .filter(|(bit, _)| flags.has(*bit))
        .fold(0, |acc, (_, host)| acc | host)
}

/// Access mode and append. Truncation is left to the raw flags, since
/// `OpenOptions` refuses it without write access or together with append.
fn options_for(flags: OpenFlags) -> OpenOptions {
    let append = appends(flags);
    let mut options = OpenOptions::new();
    options
        .read(flags.readable())
        .write(flags.writable() && !append)
        .append(append);
    options
}
