use p9share_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration shared by every handle of one attach point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServeConfig {
    /// Directory handed out by `attach`.
    pub root: PathBuf,
    /// Emit per-operation debug events.
    #[serde(default)]
    pub verbose: bool,
}

impl ServeConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            verbose: false,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let metadata = std::fs::metadata(&self.root).map_err(|e| {
            Error::InvalidConfig(format!("root {} is not accessible: {e}", self.root.display()))
        })?;
        if !metadata.is_dir() {
            return Err(Error::InvalidConfig(format!(
                "root {} is not a directory",
                self.root.display()
            )));
        }
        Ok(())
    }
}

/// Logs a debug event when the config's verbose switch is on.
macro_rules! verbose {
    ($config:expr, $($arg:tt)+) => {
        if $config.verbose {
            tracing::debug!($($arg)+);
        }
    };
}

pub(crate) use verbose;
