//! # FleetDB Core
//!
//! In-memory driver registry and spatial matching engine.
//!
//! This crate provides:
//! - A slot store with an `id -> slot` primary index and soft deletes
//! - Name prefix and substring indexes (tries over lowercased names)
//! - A uniform spatial grid for radius and k-nearest queries
//! - Bounded-heap selection for top-K by rating and best-in-radius
//! - A single mutation path that keeps every index consistent
//!
//! ## Quick Start
//!
//! ```rust
//! use fleetdb_core::{DriverRecord, DriverUpdate, DriverId, Location, Registry, RegistryConfig};
//!
//! let registry = Registry::with_config(RegistryConfig::new().cell_size(2.0))?;
//! registry.add(DriverRecord::new(7, "Tran Van Binh", Location::new(1.0, 1.0)))?;
//!
//! assert_eq!(registry.find_by_prefix("tran").len(), 1);
//! assert_eq!(registry.find_by_substring("van bi").len(), 1);
//!
//! registry.update(DriverId::new(7), DriverUpdate::new().location(Location::new(5.0, 5.0)))?;
//! assert!(registry.within_radius(Location::new(1.0, 1.0), 1.0).is_empty());
//!
//! registry.delete(DriverId::new(7))?;
//! assert!(registry.find(DriverId::new(7)).is_none());
//! # Ok::<(), fleetdb_core::CoreError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod compaction;
mod config;
mod driver;
mod error;
pub mod index;
mod index_set;
pub mod query;
mod registry;
mod stats;
mod types;
mod verify;

pub use compaction::CompactionResult;
pub use config::{ReaddPolicy, RegistryConfig};
pub use driver::{DriverRecord, DriverUpdate, DEFAULT_RATING, MAX_RATING};
pub use error::{CoreError, CoreResult};
pub use index_set::IndexSet;
pub use query::{BoundedHeap, Neighbor, RatingOrder, ScoredNeighbor};
pub use registry::Registry;
pub use stats::{RegistryStats, RegistrySummary, StatsSnapshot};
pub use types::{CellKey, DriverId, Location, Slot};
pub use verify::{Violation, ViolationKind};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
