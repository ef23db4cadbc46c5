use std::sync::Arc;

use p9share_core::{Attacher, BoxedFile, Result};

use crate::config::{ServeConfig, verbose};
use crate::file::LocalFile;

/// Attach point serving the directory named in a [`ServeConfig`].
#[derive(Debug, Clone)]
pub struct LocalAttacher {
    config: Arc<ServeConfig>,
}

impl LocalAttacher {
    pub fn new(config: ServeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &ServeConfig {
        &self.config
    }
}

impl Attacher for LocalAttacher {
    fn attach(&self) -> Result<BoxedFile> {
        verbose!(self.config, "attach {}", self.config.root.display());
        Ok(Box::new(LocalFile::new(
            Arc::clone(&self.config),
            self.config.root.clone(),
        )))
    }
}
