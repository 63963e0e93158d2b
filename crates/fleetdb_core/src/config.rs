//! Registry configuration.

use crate::error::{CoreError, CoreResult};

/// What happens when a caller re-adds the id of a deleted driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReaddPolicy {
    /// Reuse the tombstoned slot: the new record replaces the old one
    /// and is indexed again.
    #[default]
    Revive,
    /// Reject the id permanently with [`CoreError::IdRetired`].
    Retire,
}

/// Configuration for a driver registry.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Side length of a spatial grid cell.
    pub cell_size: f64,

    /// Policy for ids that belonged to deleted drivers.
    pub readd_policy: ReaddPolicy,

    /// Maximum number of rings a k-nearest search may expand.
    ///
    /// `None` searches until the result is exact. With a cap the result
    /// may miss closer drivers that lie beyond the last searched ring.
    pub max_ring: Option<u32>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            cell_size: 1.0,
            readd_policy: ReaddPolicy::Revive,
            max_ring: None,
        }
    }
}

impl RegistryConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the grid cell size.
    #[must_use]
    pub const fn cell_size(mut self, size: f64) -> Self {
        self.cell_size = size;
        self
    }

    /// Sets the re-add policy.
    #[must_use]
    pub const fn readd_policy(mut self, policy: ReaddPolicy) -> Self {
        self.readd_policy = policy;
        self
    }

    /// Caps k-nearest ring expansion.
    #[must_use]
    pub const fn max_ring(mut self, rings: u32) -> Self {
        self.max_ring = Some(rings);
        self
    }

    /// Checks that the configuration can be used to build a registry.
    pub fn validate(&self) -> CoreResult<()> {
        if !self.cell_size.is_finite() || self.cell_size <= 0.0 {
            return Err(CoreError::invalid_config(format!(
                "cell_size must be finite and positive, got {}",
                self.cell_size
            )));
        }
        Ok(())
    }
}
