//! Temporary statistic definition directories.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary directory of `*.sql` statistic documents.
///
/// The directory is removed when this value is dropped.
pub struct StatsDir {
    dir: TempDir,
}

impl StatsDir {
    /// Create an empty stats directory.
    pub fn empty() -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp stats dir");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `<name>.sql` with the given content, replacing any existing file.
    pub fn write(&self, name: &str, sql: &str) -> PathBuf {
        let path = self.dir.path().join(format!("{}.sql", name));
        fs::write(&path, sql).expect("failed to write stats document");
        path
    }

    /// Write a file with an arbitrary name (for non-`.sql` files).
    pub fn write_raw(&self, file_name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(file_name);
        fs::write(&path, content).expect("failed to write file");
        path
    }

    /// Remove `<name>.sql`.
    pub fn remove(&self, name: &str) {
        fs::remove_file(self.dir.path().join(format!("{}.sql", name)))
            .expect("failed to remove stats document");
    }
}

/// Create a stats directory holding one `.sql` document per `(name, sql)` pair.
///
/// # Example
///
/// ```
/// use test_utils::write_stats_dir;
///
/// let dir = write_stats_dir(&[("school_count", "SELECT 1")]);
/// assert!(dir.path().join("school_count.sql").exists());
/// ```
pub fn write_stats_dir(docs: &[(&str, &str)]) -> StatsDir {
    let dir = StatsDir::empty();
    for (name, sql) in docs {
        dir.write(name, sql);
    }
    dir
}
