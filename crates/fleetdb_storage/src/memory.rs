//! In-memory snapshot backend for testing.

use crate::backend::SnapshotBackend;
use crate::error::StorageResult;
use parking_lot::RwLock;

/// An in-memory snapshot backend.
///
/// Suitable for unit tests and for round-tripping a registry without
/// touching the file system.
///
/// # Example
///
/// ```rust
/// use fleetdb_storage::{MemoryBackend, SnapshotBackend};
///
/// let mut backend = MemoryBackend::new();
/// assert!(!backend.exists());
/// backend.replace(b"id,name\n").unwrap();
/// assert_eq!(backend.read().unwrap().unwrap(), b"id,name\n");
/// ```
#[derive(Debug, Default)]
pub struct MemoryBackend {
    data: RwLock<Option<Vec<u8>>>,
}

impl MemoryBackend {
    /// Creates a new backend with no snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend holding `data` as its snapshot.
    #[must_use]
    pub fn with_data(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: RwLock::new(Some(data.into())),
        }
    }

    /// Returns the snapshot as text, for assertions.
    #[must_use]
    pub fn contents(&self) -> Option<String> {
        self.data
            .read()
            .as_ref()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

impl SnapshotBackend for MemoryBackend {
    fn read(&self) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.data.read().clone())
    }

    fn replace(&mut self, data: &[u8]) -> StorageResult<()> {
        *self.data.write() = Some(data.to_vec());
        Ok(())
    }

    fn exists(&self) -> bool {
        self.data.read().is_some()
    }
}
