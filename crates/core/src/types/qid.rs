use serde::{Deserialize, Serialize};
use std::fs::Metadata;
use std::os::unix::fs::{FileTypeExt, MetadataExt};

/// Type bits carried in a QID.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QidType(pub u8);

impl QidType {
    pub const DIR: Self = Self(0x80);
    pub const APPEND: Self = Self(0x40);
    pub const EXCLUSIVE: Self = Self(0x20);
    pub const MOUNT: Self = Self(0x10);
    pub const AUTH: Self = Self(0x08);
    pub const TEMPORARY: Self = Self(0x04);
    pub const SYMLINK: Self = Self(0x02);
    pub const LINK: Self = Self(0x01);
    pub const REGULAR: Self = Self(0x00);

    /// Derives the QID type from a file type.
    ///
    /// Sockets, FIFOs and character devices are reported as append-only
    /// streams; block devices are reported as regular files.
    pub fn from_file_type(file_type: std::fs::FileType) -> Self {
        if file_type.is_dir() {
            Self::DIR
        } else if file_type.is_symlink() {
            Self::SYMLINK
        } else if file_type.is_socket() || file_type.is_fifo() || file_type.is_char_device() {
            Self::APPEND
        } else {
            Self::REGULAR
        }
    }
}

/// Identity of a file as seen by the client.
///
/// `path` is the host inode number, so two handles on the same inode always
/// compare equal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Qid {
    pub typ: QidType,
    pub version: u32,
    pub path: u64,
}

impl Qid {
    pub fn from_metadata(metadata: &Metadata) -> Self {
        Self {
            typ: QidType::from_file_type(metadata.file_type()),
            version: 0,
            path: metadata.ino(),
        }
    }

    pub fn is_dir(&self) -> bool {
        self.typ == QidType::DIR
    }
}
