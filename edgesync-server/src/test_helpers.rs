//! Test helpers for edgesync-server unit tests.

use std::sync::Arc;

use tempfile::TempDir;

use edgesync_core::SqliteRecordStore;

use crate::state::AppState;

/// Create an `AppState` over a freshly migrated SQLite file.
///
/// Returns `(AppState, TempDir)`; keep `TempDir` alive for the test duration.
pub async fn test_app_state() -> (AppState, TempDir) {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let store = SqliteRecordStore::open(temp_dir.path().join("edgesync.db"));
    store.migrate().await.expect("failed to migrate test database");
    (AppState::new(Arc::new(store)), temp_dir)
}
