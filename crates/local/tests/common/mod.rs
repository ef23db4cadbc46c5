//! Fixtures shared by the integration tests.

#![allow(dead_code)]

use p9share_core::{
    Attacher, Attr, AttrMask, BoxedFile, Dirent, Error, File, FileMode, FsStat, Gid, OpenFlags,
    Qid, Result, SetAttr, SetAttrMask, Uid,
};
use p9share_local::{LocalAttacher, ServeConfig};
use std::any::Any;
use tempfile::TempDir;

/// A served temp directory and the root handle attached to it.
pub fn attach() -> (TempDir, BoxedFile) {
    let tmp = TempDir::new().unwrap();
    let attacher = LocalAttacher::new(ServeConfig::new(tmp.path()).with_verbose(true)).unwrap();
    let root = attacher.attach().unwrap();
    (tmp, root)
}

pub fn walk(root: &dyn File, names: &[&str]) -> BoxedFile {
    let (_, file) = root.walk(names).unwrap();
    file
}

/// A handle from some other backend; local handles must refuse it as a peer.
pub struct ForeignFile;

impl File for ForeignFile {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn walk(&self, _names: &[&str]) -> Result<(Vec<Qid>, BoxedFile)> {
        Err(Error::NotSupported)
    }

    fn get_attr(&self, _mask: AttrMask) -> Result<(Qid, AttrMask, Attr)> {
        Err(Error::NotSupported)
    }

    fn set_attr(&mut self, _valid: SetAttrMask, _attr: &SetAttr) -> Result<()> {
        Err(Error::NotSupported)
    }

    fn xattr_walk(&self, _name: &str) -> Result<(BoxedFile, u64)> {
        Err(Error::NotSupported)
    }

    fn xattr_create(&mut self, _name: &str, _size: u64, _flags: u32) -> Result<()> {
        Err(Error::NotSupported)
    }

    fn open(&mut self, _mode: OpenFlags) -> Result<(Qid, u32)> {
        Err(Error::NotSupported)
    }

    fn create(
        &mut self,
        _name: &str,
        _mode: OpenFlags,
        _permissions: FileMode,
        _uid: Uid,
        _gid: Gid,
    ) -> Result<(BoxedFile, Qid, u32)> {
        Err(Error::NotSupported)
    }

    fn read_at(&mut self, _buf: &mut [u8], _offset: u64) -> Result<usize> {
        Err(Error::NotSupported)
    }

    fn write_at(&mut self, _data: &[u8], _offset: u64) -> Result<usize> {
        Err(Error::NotSupported)
    }

    fn fsync(&self) -> Result<()> {
        Err(Error::NotSupported)
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        Ok(())
    }

    fn mkdir(&self, _name: &str, _permissions: FileMode, _uid: Uid, _gid: Gid) -> Result<Qid> {
        Err(Error::NotSupported)
    }

    fn symlink(&self, _target: &str, _name: &str, _uid: Uid, _gid: Gid) -> Result<Qid> {
        Err(Error::NotSupported)
    }

    fn link(&self, _target: &dyn File, _name: &str) -> Result<()> {
        Err(Error::NotSupported)
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
        Err(Error::NotSupported)
    }

    fn readdir(&self, _offset: u64, _count: u32) -> Result<Vec<Dirent>> {
        Err(Error::NotSupported)
    }

    fn readlink(&self) -> Result<String> {
        Err(Error::NotSupported)
    }

    fn renamed(&mut self, _parent: &dyn File, _new_name: &str) {}

    fn rename(&self, _directory: &dyn File, _name: &str) -> Result<()> {
        Err(Error::NotSupported)
    }

    fn rename_at(&self, _old_name: &str, _new_dir: &dyn File, _new_name: &str) -> Result<()> {
        Err(Error::NotSupported)
    }

    fn remove(&self) -> Result<()> {
        Err(Error::NotSupported)
    }

    fn unlink_at(&self, _name: &str, _flags: u32) -> Result<()> {
        Err(Error::NotSupported)
    }

    fn statfs(&self) -> Result<FsStat> {
        Err(Error::NotSupported)
    }
}
