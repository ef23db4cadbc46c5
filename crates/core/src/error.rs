use nix::libc;

/// Errors returned by file handle operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("operation not supported")]
    NotSupported,

    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("no open descriptor")]
    NoDescriptor,

    #[error("unexpected handle type passed to {operation}")]
    UnexpectedHandle { operation: &'static str },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Linux errno reported to the client in an `Rlerror`.
    pub fn errno(&self) -> i32 {
        match self {
            Self::NotSupported => libc::ENOSYS,
            Self::InvalidArgument(_) => libc::EINVAL,
            Self::NoDescriptor => libc::EBADF,
            Self::UnexpectedHandle { .. } => libc::EINVAL,
            Self::InvalidConfig(_) => libc::EINVAL,
            Self::Internal(_) => libc::EIO,
            Self::Io(e) => e.raw_os_error().unwrap_or(libc::EIO),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
