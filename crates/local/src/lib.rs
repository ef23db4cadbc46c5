//! 9P2000.L backend that serves a directory of the local filesystem.
//!
//! [`LocalAttacher`] hands out a [`LocalFile`] bound to the configured root;
//! every walk, create or extended-attribute walk produces a new handle bound
//! to a host path. Handles translate protocol operations directly into
//! system calls and cache nothing.
//!
//! Paths are joined lexically and never checked against the root, so a
//! client can walk `..` out of the served tree.

pub mod attacher;
pub mod config;
pub mod descriptor;
pub mod file;
pub mod path;
pub mod xattr;

pub use attacher::LocalAttacher;
pub use config::ServeConfig;
pub use file::{LocalFile, PendingXattr};
