mod attr;
mod dirent;
mod mode;
mod qid;

pub use attr::{Attr, AttrMask, FsStat, SetAttr, SetAttrMask};
pub use dirent::Dirent;
pub use mode::{FileMode, Gid, OpenFlags, Uid};
pub use qid::{Qid, QidType};
