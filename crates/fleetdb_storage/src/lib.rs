//! # FleetDB Storage
//!
//! CSV snapshot persistence for FleetDB registries.
//!
//! A snapshot is one CSV file with a fixed header and one row per active
//! driver. The registry itself stays purely in memory; this crate only
//! moves its contents in and out.
//!
//! ## Design Principles
//!
//! - Backends are opaque byte stores holding one snapshot each
//! - The CSV layout is owned by [`Snapshot`] and [`read_csv`]/[`write_csv`]
//! - Every loaded row goes through [`Registry::add`], so persisted data is
//!   validated exactly like live mutations
//!
//! ## Available Backends
//!
//! - [`MemoryBackend`] - For testing
//! - [`FileBackend`] - Atomic whole-file replacement on disk
//!
//! ## Example
//!
//! ```rust
//! use fleetdb_core::Registry;
//! use fleetdb_storage::{read_csv, LoadOptions};
//!
//! let csv = "ID,Name,Rating,X,Y,TotalRides\n1,Nguyen Van An,4.7,3.2,8.1,42\n";
//! let registry = Registry::new();
//! let report = read_csv(csv.as_bytes(), &registry, LoadOptions::strict())?;
//! assert_eq!(report.loaded, 1);
//! # Ok::<(), fleetdb_storage::StorageError>(())
//! ```
//!
//! [`Registry::add`]: fleetdb_core::Registry::add

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod format;
mod memory;
mod snapshot;

pub use backend::SnapshotBackend;
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use format::{SnapshotFormat, HEADER, LEGACY_HEADER};
pub use memory::MemoryBackend;
pub use snapshot::{read_csv, write_csv, LoadOptions, LoadReport, SkippedRow, Snapshot};
