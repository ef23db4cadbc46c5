//! The local handle: one host path, an optional open descriptor and at most
//! one staged extended-attribute operation.

use std::any::Any;
use std::ffi::OsStr;
use std::fs::{self, Metadata};
use std::io;
use std::os::unix::fs::{DirBuilderExt, PermissionsExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use nix::libc;
use nix::sys::stat::{UtimensatFlags, utimensat};
use nix::sys::time::TimeSpec;
use p9share_core::{
    Attr, AttrMask, BoxedFile, Dirent, Error, File, FileMode, FsStat, Gid, OpenFlags, Qid,
    Result, SetAttr, SetAttrMask, Uid,
};

use crate::config::{ServeConfig, verbose};
use crate::descriptor::{Descriptor, WriteAtError};
use crate::{path, xattr};

/// Suggested I/O unit returned by open and create. Zero lets the client
/// derive it from the negotiated message size.
const IOUNIT: u32 = 0;

/// Extended-attribute transfer staged for the next `read_at` / `write_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingXattr {
    /// Staged by `xattr_walk`. An empty `name` lists attribute names.
    Walk { name: String, size: u64 },
    /// Staged by `xattr_create`.
    Create { name: String, size: u64, flags: u32 },
}

#[derive(Debug)]
pub struct LocalFile {
    config: Arc<ServeConfig>,
    path: PathBuf,
    descriptor: Option<Descriptor>,
    pending: Option<PendingXattr>,
}

impl LocalFile {
    pub(crate) fn new(config: Arc<ServeConfig>, path: PathBuf) -> Self {
        Self {
            config,
            path,
            descriptor: None,
            pending: None,
        }
    }

    /// A fresh handle on `path` sharing this handle's configuration.
    fn handle_at(&self, path: PathBuf) -> Self {
        Self::new(Arc::clone(&self.config), path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.descriptor.is_some()
    }

    pub fn pending(&self) -> Option<&PendingXattr> {
        self.pending.as_ref()
    }

    /// Stats the descriptor if one is open, otherwise lstats the path.
    fn info(&self) -> io::Result<(Qid, Metadata)> {
        let metadata = match &self.descriptor {
            Some(descriptor) => descriptor.metadata()?,
            None => fs::symlink_metadata(&self.path)?,
        };
        Ok((Qid::from_metadata(&metadata), metadata))
    }

    fn read_data(&self, buf: &mut [u8], offset: u64) -> Result<usize> {
        let descriptor = self.descriptor.as_ref().ok_or(Error::NoDescriptor)?;
        Ok(descriptor.read_at(buf, offset)?)
    }

    fn write_data(&mut self, data: &[u8], offset: u64) -> Result<usize> {
        let descriptor = self.descriptor.as_mut().ok_or(Error::NoDescriptor)?;
        match descriptor.write_at(data, offset) {
            Ok(n) => Ok(n),
            Err(WriteAtError::AppendOnly) => {
                verbose!(
                    self.config,
                    "write_at({}) on append-only descriptor, appending",
                    offset
                );
                Ok(descriptor.write(data)?)
            }
            Err(WriteAtError::Io(e)) => Err(e.into()),
        }
    }

    fn truncate(&self, size: u64) -> io::Result<()> {
        match &self.descriptor {
            Some(descriptor) if descriptor.flags().writable() => descriptor.set_len(size),
            _ => fs::OpenOptions::new()
                .write(true)
                .open(&self.path)?
                .set_len(size),
        }
    }
}

fn local(file: &dyn File) -> Option<&LocalFile> {
    file.as_any().downcast_ref::<LocalFile>()
}

/// Time argument for utimensat: the given time, "now", or left alone.
fn timestamp(
    valid: SetAttrMask,
    change: u32,
    explicit: u32,
    sec: u64,
    nsec: u64,
) -> Result<TimeSpec> {
    if !valid.has(change) {
        return Ok(TimeSpec::new(0, libc::UTIME_OMIT));
    }
    if !valid.has(explicit) {
        return Ok(TimeSpec::new(0, libc::UTIME_NOW));
    }
    let sec = libc::time_t::try_from(sec)
        .map_err(|_| Error::InvalidArgument("timestamp seconds out of range"))?;
    let nsec = libc::c_long::try_from(nsec)
        .map_err(|_| Error::InvalidArgument("timestamp nanoseconds out of range"))?;
    Ok(TimeSpec::new(sec, nsec))
}

/// Directory entry for `name` at position `index`, or `None` when the entry
/// cannot be stat'd.
fn dirent_at(dir: &Path, index: usize, name: &OsStr) -> Option<Dirent> {
    let entry_path = dir.join(name);
    let metadata = match fs::symlink_metadata(&entry_path) {
        Ok(m) => m,
        Err(e) => {
            tracing::trace!("readdir: skipping {}: {}", entry_path.display(), e);
            return None;
        }
    };
    let qid = Qid::from_metadata(&metadata);
    Some(Dirent {
        qid,
        offset: index as u64 + 1,
        typ: qid.typ,
        name: name.to_string_lossy().into_owned(),
    })
}

impl File for LocalFile {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn walk(&self, names: &[&str]) -> Result<(Vec<Qid>, BoxedFile)> {
        if names.is_empty() {
            let file = self.handle_at(self.path.clone());
            let (qid, _) = file.info()?;
            verbose!(self.config, "walk to {}: {:?}", file.path.display(), qid);
            return Ok((vec![qid], Box::new(file)));
        }

        verbose!(self.config, "walk {:?} from {}", names, self.path.display());
        let mut qids = Vec::with_capacity(names.len());
        let mut last = self.path.clone();
        for name in names {
            let next = path::join(&last, name);
            let metadata = match fs::symlink_metadata(&next) {
                Ok(m) => m,
                Err(e) => {
                    verbose!(self.config, "walk to {} failed: {}", next.display(), e);
                    return Err(e.into());
                }
            };
            qids.push(Qid::from_metadata(&metadata));
            last = next;
        }
        Ok((qids, Box::new(self.handle_at(last))))
    }

    fn get_attr(&self, _mask: AttrMask) -> Result<(Qid, AttrMask, Attr)> {
        let (qid, metadata) = self.info()?;
        Ok((qid, AttrMask::BASIC, Attr::from_metadata(&metadata)))
    }

    fn set_attr(&mut self, valid: SetAttrMask, attr: &SetAttr) -> Result<()> {
        verbose!(
            self.config,
            "set_attr({}, {:#x})",
            self.path.display(),
            valid.0
        );

        if valid.has(SetAttrMask::SIZE) {
            self.truncate(attr.size)?;
        }

        if valid.has(SetAttrMask::MODE) {
            let permissions = fs::Permissions::from_mode(FileMode(attr.mode).permissions());
            fs::set_permissions(&self.path, permissions)?;
        }

        if valid.has(SetAttrMask::UID) || valid.has(SetAttrMask::GID) {
            let uid = valid.has(SetAttrMask::UID).then_some(attr.uid);
            let gid = valid.has(SetAttrMask::GID).then_some(attr.gid);
            std::os::unix::fs::lchown(&self.path, uid, gid)?;
        }

        if valid.has(SetAttrMask::ATIME) || valid.has(SetAttrMask::MTIME) {
            let atime = timestamp(
                valid,
                SetAttrMask::ATIME,
                SetAttrMask::ATIME_SET,
                attr.atime_sec,
                attr.atime_nsec,
            )?;
            let mtime = timestamp(
                valid,
                SetAttrMask::MTIME,
                SetAttrMask::MTIME_SET,
                attr.mtime_sec,
                attr.mtime_nsec,
            )?;
            utimensat(
                None,
                &self.path,
                &atime,
                &mtime,
                UtimensatFlags::NoFollowSymlink,
            )
            .map_err(io::Error::from)?;
        }

        Ok(())
    }

    fn xattr_walk(&self, name: &str) -> Result<(BoxedFile, u64)> {
        let size = if name.is_empty() {
            xattr::list(&self.path, &mut [])?
        } else {
            xattr::get(&self.path, name, &mut [])?
        };
        let size = size as u64;

        let mut file = self.handle_at(self.path.clone());
        file.pending = Some(PendingXattr::Walk {
            name: name.to_string(),
            size,
        });
        Ok((Box::new(file), size))
    }

    fn xattr_create(&mut self, name: &str, size: u64, flags: u32) -> Result<()> {
        self.pending = Some(PendingXattr::Create {
            name: name.to_string(),
            size,
            flags,
        });
        Ok(())
    }

    fn open(&mut self, mode: OpenFlags) -> Result<(Qid, u32)> {
        let (qid, metadata) = self.info()?;
        let descriptor = Descriptor::open(&self.path, mode, metadata.is_dir())?;
        verbose!(
            self.config,
            "open({}, {:#o}): {:?}",
            self.path.display(),
            mode.0,
            qid
        );
        self.descriptor = Some(descriptor);
        Ok((qid, IOUNIT))
    }

    fn create(
        &mut self,
        name: &str,
        mode: OpenFlags,
        permissions: FileMode,
        _uid: Uid,
        _gid: Gid,
    ) -> Result<(BoxedFile, Qid, u32)> {
        let child_path = path::join(&self.path, name);
        let descriptor = Descriptor::create(&child_path, mode, permissions)?;

        let mut child = self.handle_at(child_path);
        child.descriptor = Some(descriptor);
        match child.info() {
            Ok((qid, _)) => Ok((Box::new(child), qid, IOUNIT)),
            Err(e) => {
                drop(child);
                Err(e.into())
            }
        }
    }

    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> Result<usize> {
        if self.pending.is_none() {
            return self.read_data(buf, offset);
        }
        let name = match &self.pending {
            Some(PendingXattr::Walk { name, .. }) => name,
            _ => {
                return Err(Error::InvalidArgument(
                    "read while an extended attribute write is staged",
                ));
            }
        };
        if offset != 0 {
            return Err(Error::InvalidArgument(
                "extended attribute read at non-zero offset",
            ));
        }
        if buf.is_empty() {
            return Ok(0);
        }

        let n = if name.is_empty() {
            xattr::list(&self.path, buf)?
        } else {
            xattr::get(&self.path, name, buf)?
        };
        self.pending = None;
        Ok(n)
    }

    fn write_at(&mut self, data: &[u8], offset: u64) -> Result<usize> {
        if self.pending.is_none() {
            return self.write_data(data, offset);
        }
        let (name, size, flags) = match &self.pending {
            Some(PendingXattr::Create { name, size, flags }) => (name, *size, *flags),
            _ => {
                return Err(Error::InvalidArgument(
                    "write while an extended attribute read is staged",
                ));
            }
        };
        if offset != 0 {
            return Err(Error::InvalidArgument(
                "extended attribute write at non-zero offset",
            ));
        }

        xattr::set(&self.path, name, data, flags)?;
        self.pending = None;
        // The client already sent the length in xattr_create.
        usize::try_from(size).map_err(|_| Error::InvalidArgument("extended attribute too large"))
    }

    fn fsync(&self) -> Result<()> {
        let descriptor = self.descriptor.as_ref().ok_or(Error::NoDescriptor)?;
        Ok(descriptor.sync()?)
    }

    fn close(&mut self) -> Result<()> {
        self.descriptor = None;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        Ok(())
    }

    /// Creates a directory. The returned QID is always zero; clients must
    /// walk to the new directory to learn its identity.
    fn mkdir(&self, name: &str, permissions: FileMode, _uid: Uid, _gid: Gid) -> Result<Qid> {
        fs::DirBuilder::new()
            .mode(permissions.permissions())
            .create(path::join(&self.path, name))?;
        Ok(Qid::default())
    }

    /// Creates a symlink. Like `mkdir`, the returned QID is always zero.
    fn symlink(&self, target: &str, name: &str, _uid: Uid, _gid: Gid) -> Result<Qid> {
        std::os::unix::fs::symlink(target, path::join(&self.path, name))?;
        Ok(Qid::default())
    }

    fn link(&self, target: &dyn File, name: &str) -> Result<()> {
        let Some(target) = local(target) else {
            tracing::error!(
                "link into {}: target is not a local handle",
                self.path.display()
            );
            return Err(Error::NotSupported);
        };
        fs::hard_link(&target.path, path::join(&self.path, name))?;
        Ok(())
    }

    fn mknod(
        &self,
        _name: &str,
        _mode: FileMode,
        _major: u32,
        _minor: u32,
        _uid: Uid,
        _gid: Gid,
    ) -> Result<Qid> {
        verbose!(self.config, "mknod: not implemented");
        Err(Error::NotSupported)
    }

    fn readdir(&self, offset: u64, _count: u32) -> Result<Vec<Dirent>> {
        let mut names: Vec<_> = fs::read_dir(&self.path)?
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry.file_name()),
                Err(e) => {
                    tracing::trace!("readdir: skipping entry of {}: {}", self.path.display(), e);
                    None
                }
            })
            .collect();
        names.sort();

        let skip = usize::try_from(offset).unwrap_or(usize::MAX);
        Ok(names
            .iter()
            .enumerate()
            .skip(skip)
            .filter_map(|(index, name)| dirent_at(&self.path, index, name))
            .collect())
    }

    fn readlink(&self) -> Result<String> {
        let target = fs::read_link(&self.path)?;
        Ok(target.to_string_lossy().into_owned())
    }

    fn renamed(&mut self, parent: &dyn File, new_name: &str) {
        match local(parent) {
            Some(parent) => self.path = path::join(&parent.path, new_name),
            None => tracing::error!(
                "renamed: new parent of {} is not a local handle",
                self.path.display()
            ),
        }
    }

    fn rename(&self, _directory: &dyn File, _name: &str) -> Result<()> {
        verbose!(self.config, "rename: not implemented");
        Err(Error::NotSupported)
    }

    /// Renames `old_name` in this directory to `new_name` in `new_dir`.
    ///
    /// Neither path is checked to stay inside the served root.
    fn rename_at(&self, old_name: &str, new_dir: &dyn File, new_name: &str) -> Result<()> {
        let Some(new_dir) = local(new_dir) else {
            tracing::error!(
                "rename_at from {}: new directory is not a local handle",
                self.path.display()
            );
            return Err(Error::UnexpectedHandle {
                operation: "rename_at",
            });
        };
        let old_path = path::join(&self.path, old_name);
        let new_path = path::join(&new_dir.path, new_name);
        verbose!(
            self.config,
            "rename_at({} -> {})",
            old_path.display(),
            new_path.display()
        );
        fs::rename(&old_path, &new_path)?;
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        let result = path::remove(&self.path);
        verbose!(self.config, "remove({}): {:?}", self.path.display(), result);
        Ok(result?)
    }

    /// Removes `name` from this directory. `flags` are ignored: the entry is
    /// removed whether it is a file or an empty directory.
    fn unlink_at(&self, name: &str, flags: u32) -> Result<()> {
        let target = path::join(&self.path, name);
        let result = path::remove(&target);
        verbose!(
            self.config,
            "unlink_at({}, {:#x}): {:?}",
            target.display(),
            flags,
            result
        );
        Ok(result?)
    }

    fn statfs(&self) -> Result<FsStat> {
        verbose!(self.config, "statfs: not implemented");
        Err(Error::NotSupported)
    }
}
