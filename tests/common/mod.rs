#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use budget_ledger::{core::LedgerStore, storage::JsonStorage};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// A fresh directory that outlives the calling test.
pub fn temp_dir() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    path
}

pub fn open_store(path: &Path) -> LedgerStore {
    LedgerStore::open(Box::new(JsonStorage::new(path))).expect("open json store")
}

/// A store backed by `data.json` in its own temp directory.
pub fn setup_store() -> (LedgerStore, PathBuf) {
    let path = temp_dir().join("data.json");
    (open_store(&path), path)
}
