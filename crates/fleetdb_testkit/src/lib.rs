//! # FleetDB Testkit
//!
//! Test utilities for FleetDB.
//!
//! This crate provides:
//! - Registry fixtures and snapshot-file helpers
//! - Property-based test generators using proptest
//! - A model-checking harness that mirrors the registry in a plain map
//! - Stress testing utilities
//!
//! ## Usage
//!
//! ```rust
//! use fleetdb_testkit::prelude::*;
//!
//! with_registry(|registry| {
//!     for record in scenarios::sample_drivers() {
//!         registry.add(record).unwrap();
//!     }
//!     assert_eq!(registry.find_by_prefix("tran").len(), 2);
//! });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod integration;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::integration::*;
    pub use crate::stress::*;
}

pub use fixtures::*;
pub use generators::*;
pub use integration::*;
pub use stress::*;
