use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub root: PathBuf,
    /// Serializes load-modify-save cycles on the YAML files under `.grow/`.
    store: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            store: Arc::new(Mutex::new(())),
        }
    }

    /// Hold the returned guard across any handler that writes to the store.
    pub async fn lock_store(&self) -> MutexGuard<'_, ()> {
        self.store.lock().await
    }
}
