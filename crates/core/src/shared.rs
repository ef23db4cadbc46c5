//! Blocking-offload adapter for async protocol engines.
//!
//! Every handle operation is a blocking system call. `SharedFile` runs each
//! one on tokio's blocking pool and serializes calls on the same handle with
//! a mutex, so an engine can drive many handles from one runtime thread.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{Error, Result};
use crate::file::{BoxedFile, File};

type Slot = Mutex<BoxedFile>;

#[derive(Clone)]
pub struct SharedFile {
    inner: Arc<Slot>,
}

impl SharedFile {
    pub fn new(file: BoxedFile) -> Self {
        Self {
            inner: Arc::new(Mutex::new(file)),
        }
    }

    /// Runs `op` with exclusive access to the handle.
    pub async fn call<R, F>(&self, op: F) -> Result<R>
    where
        F: FnOnce(&mut dyn File) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        offload(move || {
            let mut file = lock(&inner)?;
            op(&mut **file)
        })
        .await
    }

    /// Runs `op` with this handle and `peer`, for `link` and the rename family.
    ///
    /// Both handles are locked in address order. A handle paired with itself
    /// is locked once and passed twice.
    pub async fn call_with_peer<R, F>(&self, peer: &SharedFile, op: F) -> Result<R>
    where
        F: FnOnce(&dyn File, &dyn File) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let this = Arc::clone(&self.inner);
        let peer = Arc::clone(&peer.inner);
        offload(move || {
            if Arc::ptr_eq(&this, &peer) {
                let file = lock(&this)?;
                return op(&**file, &**file);
            }
            let (this, peer) = lock_pair(&this, &peer)?;
            op(&**this, &**peer)
        })
        .await
    }

    /// Forwards a rename notification with `parent` as the new directory.
    pub async fn renamed(&self, parent: &SharedFile, new_name: impl Into<String>) -> Result<()> {
        if Arc::ptr_eq(&self.inner, &parent.inner) {
            return Err(Error::InvalidArgument("handle cannot be its own parent"));
        }
        let this = Arc::clone(&self.inner);
        let parent = Arc::clone(&parent.inner);
        let new_name = new_name.into();
        offload(move || {
            let (mut this, parent) = lock_pair(&this, &parent)?;
            this.renamed(&**parent, &new_name);
            Ok(())
        })
        .await
    }
}

async fn offload<R, F>(op: F) -> Result<R>
where
    F: FnOnce() -> Result<R> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(op).await.map_err(|e| {
        tracing::warn!("blocking file operation failed to complete: {}", e);
        Error::Internal(format!("blocking task failed: {e}"))
    })?
}

fn lock(slot: &Slot) -> Result<MutexGuard<'_, BoxedFile>> {
    slot.lock()
        .map_err(|_| Error::Internal("handle lock poisoned".to_string()))
}

fn lock_pair<'a>(
    this: &'a Slot,
    other: &'a Slot,
) -> Result<(MutexGuard<'a, BoxedFile>, MutexGuard<'a, BoxedFile>)> {
    if std::ptr::from_ref(this) < std::ptr::from_ref(other) {
        let first = lock(this)?;
        let second = lock(other)?;
        Ok((first, second))
    } else {
        let second = lock(other)?;
        let first = lock(this)?;
        Ok((first, second))
    }
}
