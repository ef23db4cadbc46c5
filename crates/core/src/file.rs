use crate::error::Result;
use crate::types::{
    Attr, AttrMask, Dirent, FileMode, FsStat, Gid, OpenFlags, Qid, SetAttr, SetAttrMask, Uid,
};
use std::any::Any;

/// A boxed handle, as stored in the protocol engine's fid table.
pub type BoxedFile = Box<dyn File>;

/// Produces the root handle of an attach point.
pub trait Attacher: Send + Sync {
    fn attach(&self) -> Result<BoxedFile>;
}

/// Operations the protocol engine performs on a handle bound to one path.
///
/// The engine serializes calls on the same handle; methods that change
/// handle state take `&mut self`. Operations that take a second handle
/// (`link`, `rename`, `rename_at`, `renamed`) only accept handles of the
/// implementing type and reject anything else.
pub trait File: Any + Send {
    /// Access to the concrete type, for operations that pair two handles.
    fn as_any(&self) -> &dyn Any;

    /// Resolves `names` one component at a time from this handle's path.
    ///
    /// An empty list re-stats this path and returns a fresh handle on it.
    fn walk(&self, names: &[&str]) -> Result<(Vec<Qid>, BoxedFile)>;

    fn get_attr(&self, mask: AttrMask) -> Result<(Qid, AttrMask, Attr)>;

    /// `walk` followed by `get_attr` on the resulting handle.
    fn walk_get_attr(&self, names: &[&str]) -> Result<(Vec<Qid>, BoxedFile, AttrMask, Attr)> {
        let (qids, file) = self.walk(names)?;
        let (_, valid, attr) = file.get_attr(AttrMask::BASIC)?;
        Ok((qids, file, valid, attr))
    }

    fn set_attr(&mut self, valid: SetAttrMask, attr: &SetAttr) -> Result<()>;

    /// Prepares an extended-attribute read; an empty `name` lists all names.
    ///
    /// Returns a new handle on the same path and the size of the value.
    fn xattr_walk(&self, name: &str) -> Result<(BoxedFile, u64)>;

    /// Stages an extended-attribute write performed by the next `write_at`.
    fn xattr_create(&mut self, name: &str, size: u64, flags: u32) -> Result<()>;

    /// Opens the file, returning its QID and the suggested I/O unit.
    fn open(&mut self, mode: OpenFlags) -> Result<(Qid, u32)>;

    fn create(
        &mut self,
        name: &str,
        mode: OpenFlags,
        permissions: FileMode,
        uid: Uid,
        gid: Gid,
    ) -> Result<(BoxedFile, Qid, u32)>;

    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> Result<usize>;

    fn write_at(&mut self, data: &[u8], offset: u64) -> Result<usize>;

    fn fsync(&self) -> Result<()>;

    fn close(&mut self) -> Result<()>;

    fn flush(&self) -> Result<()>;

    fn mkdir(&self, name: &str, permissions: FileMode, uid: Uid, gid: Gid) -> Result<Qid>;

    fn symlink(&self, target: &str, name: &str, uid: Uid, gid: Gid) -> Result<Qid>;

    fn link(&self, target: &dyn File, name: &str) -> Result<()>;

    fn mknod(
        &self,
        name: &str,
        mode: FileMode,
        major: u32,
        minor: u32,
        uid: Uid,
        gid: Gid,
    ) -> Result<Qid>;

    fn readdir(&self, offset: u64, count: u32) -> Result<Vec<Dirent>>;

    fn readlink(&self) -> Result<String>;

    /// Notification that this file now lives at `new_name` under `parent`.
    fn renamed(&mut self, parent: &dyn File, new_name: &str);

    fn rename(&self, directory: &dyn File, name: &str) -> Result<()>;

    fn rename_at(&self, old_name: &str, new_dir: &dyn File, new_name: &str) -> Result<()>;

    fn remove(&self) -> Result<()>;

    fn unlink_at(&self, name: &str, flags: u32) -> Result<()>;

    fn statfs(&self) -> Result<FsStat>;
}
