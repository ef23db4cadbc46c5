//! Core types for the p9share 9P2000.L filesystem backend.
//!
//! The protocol engine talks to backends through the [`Attacher`] and
//! [`File`] traits; everything it needs to build replies (QIDs, attributes,
//! directory entries) is defined here so backends and engines share one
//! vocabulary.

pub mod error;
pub mod file;
pub mod shared;
pub mod types;

pub use error::{Error, Result};
pub use file::{Attacher, BoxedFile, File};
pub use shared::SharedFile;
pub use types::{
    Attr, AttrMask, Dirent, FileMode, FsStat, Gid, OpenFlags, Qid, QidType, SetAttr, SetAttrMask,
    Uid,
};
