#![allow(dead_code)]

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{TempDir, tempdir};

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }

    /// Base directory holding one subdirectory per store extract.
    pub fn stores_base(&self) -> PathBuf {
        let base = self.temp_dir.path().join("stores");
        fs::create_dir_all(&base).expect("create stores base");
        base
    }

    /// Creates (if needed) and returns the extract directory for one store.
    pub fn store_dir(&self, store_id: &str) -> PathBuf {
        let dir = self.stores_base().join(store_id);
        fs::create_dir_all(&dir).expect("create store dir");
        dir
    }

    /// Writes one extract table file into a store's directory.
    pub fn write_store_table(&self, store_id: &str, file_name: &str, contents: &str) -> PathBuf {
        let path = self.store_dir(store_id).join(file_name);
        let mut file = File::create(&path).expect("create store table");
        file.write_all(contents.as_bytes())
            .expect("write store table contents");
        path
    }
}
