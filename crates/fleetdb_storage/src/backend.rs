//! Snapshot backend trait definition.

use crate::error::StorageResult;

/// Where a snapshot lives.
///
/// Backends are **opaque byte stores** holding one snapshot each. They do
/// not interpret the bytes; the CSV layout is owned by [`Snapshot`].
///
/// # Invariants
///
/// - `read` returns exactly the bytes of the last successful `replace`
/// - `replace` is all-or-nothing: a failed replace leaves the previous
///   snapshot readable
/// - Backends must be `Send + Sync` for concurrent access
///
/// # Implementors
///
/// - [`super::MemoryBackend`] - For testing
/// - [`super::FileBackend`] - For snapshots on disk
///
/// [`Snapshot`]: super::Snapshot
pub trait SnapshotBackend: Send + Sync {
    /// Reads the whole snapshot, or `None` if none was ever written.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot exists but cannot be read.
    fn read(&self) -> StorageResult<Option<Vec<u8>>>;

    /// Replaces the snapshot with `data`.
    ///
    /// # Errors
    ///
    /// Returns an error if the data cannot be made durable.
    fn replace(&mut self, data: &[u8]) -> StorageResult<()>;

    /// Returns true if a snapshot has been written.
    fn exists(&self) -> bool;
}
