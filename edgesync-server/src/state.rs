//! Application State
//!
//! Shared by every HTTP handler. The sync loop holds its own handle to the same store.

use std::sync::Arc;

use edgesync_core::RecordStore;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

pub struct AppStateInner {
    pub store: Arc<dyn RecordStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { inner: Arc::new(AppStateInner { store }) }
    }

    pub fn store(&self) -> &dyn RecordStore {
        self.inner.store.as_ref()
    }
}
