//! Engine configuration.
//!
//! Provides [`StoreConfig`] with defaults for the data directory and the
//! durability mode. The configuration is constructed programmatically by
//! the embedding process.

use std::path::PathBuf;

/// Configuration for a [`BlockStore`](crate::engine::BlockStore) backed by
/// RocksDB.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Root directory for all persistent data.
    pub data_dir: PathBuf,
    /// Flush memtables after every mutation. Slower, but guarantees the
    /// write has reached the filesystem before the call returns.
    pub flush_each_put: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("strata");

        Self {
            data_dir,
            flush_each_put: false,
        }
    }
}

impl StoreConfig {
    /// Configuration rooted at an explicit directory.
    pub fn at(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Path to the RocksDB block store directory.
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("blockstore")
    }
}
