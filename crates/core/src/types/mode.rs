use serde::{Deserialize, Serialize};

/// 9P2000.L open flags as sent in `Tlopen` and `Tlcreate`.
///
/// The values use the Linux generic open(2) numbering regardless of the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpenFlags(pub u32);

impl OpenFlags {
    pub const READ_ONLY: Self = Self(0);
    pub const WRITE_ONLY: Self = Self(1);
    pub const READ_WRITE: Self = Self(2);
    pub const MODE_MASK: u32 = 3;
    pub const CREATE: u32 = 0o100;
    pub const EXCLUSIVE: u32 = 0o200;
    pub const NOCTTY: u32 = 0o400;
    pub const TRUNCATE: u32 = 0o1000;
    pub const APPEND: u32 = 0o2000;
    pub const NONBLOCK: u32 = 0o4000;
    pub const DSYNC: u32 = 0o10000;
    pub const ASYNC: u32 = 0o20000;
    pub const DIRECT: u32 = 0o40000;
    pub const LARGEFILE: u32 = 0o100000;
    pub const DIRECTORY: u32 = 0o200000;
    pub const NOFOLLOW: u32 = 0o400000;
    pub const NOATIME: u32 = 0o1000000;
    pub const CLOEXEC: u32 = 0o2000000;
    pub const SYNC: u32 = 0o4000000;

    pub fn access_mode(self) -> Self {
        Self(self.0 & Self::MODE_MASK)
    }

    pub fn readable(self) -> bool {
        let mode = self.access_mode();
        mode == Self::READ_ONLY || mode == Self::READ_WRITE
    }

    pub fn writable(self) -> bool {
        let mode = self.access_mode();
        mode == Self::WRITE_ONLY || mode == Self::READ_WRITE
    }

    pub fn truncate(self) -> bool {
        self.0 & Self::TRUNCATE != 0
    }

    pub fn append(self) -> bool {
        self.0 & Self::APPEND != 0
    }

    pub fn has(self, bit: u32) -> bool {
        self.0 & bit != 0
    }

    pub fn with(self, bits: u32) -> Self {
        Self(self.0 | bits)
    }
}

/// File mode: permission bits plus the file type bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileMode(pub u32);

impl FileMode {
    pub const PERMISSIONS_MASK: u32 = 0o7777;

    pub fn permissions(self) -> u32 {
        self.0 & Self::PERMISSIONS_MASK
    }
}

impl From<u32> for FileMode {
    fn from(mode: u32) -> Self {
        Self(mode)
    }
}

/// Owner hint supplied by the client on create calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uid(pub u32);

/// Group hint supplied by the client on create calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Gid(pub u32);

impl Uid {
    pub const NONE: Self = Self(u32::MAX);
}

impl Gid {
    pub const NONE: Self = Self(u32::MAX);
}
