//! Property-based test generators using proptest.
//!
//! Provides strategies for generating drivers and mutation sequences.
//! Ids and name parts are drawn from small pools so that sequences hit
//! duplicates, shared prefixes and shared cells often.

use fleetdb_core::{DriverId, DriverRecord, Location};
use proptest::prelude::*;

const NAME_PARTS: &[&str] = &[
    "Nguyen", "Tran", "Le", "Van", "Thi", "An", "Anh", "Lan", "Lam", "Hai", "Minh", "Binh", "Duc",
    "Tuan",
];

/// Strategy for ids from a pool of `pool` values starting at 1.
pub fn driver_id_strategy(pool: u64) -> impl Strategy<Value = DriverId> {
    (1..=pool.max(1)).prop_map(DriverId::new)
}

/// Strategy for names of one to four parts from a small pool.
pub fn name_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(NAME_PARTS), 1..=4).prop_map(|parts| parts.join(" "))
}

/// Strategy for arbitrary non-blank names, accented letters included.
pub fn unicode_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-zÀ-ÖØ-öø-žẠ-ỹ][A-Za-zÀ-ÖØ-öø-žẠ-ỹ ,.'-]{0,30}")
        .expect("Invalid regex")
}

/// Strategy for locations in `[-extent, extent]²`.
pub fn location_strategy(extent: f64) -> impl Strategy<Value = Location> {
    (-extent..=extent, -extent..=extent).prop_map(|(x, y)| Location::new(x, y))
}

/// Strategy for locations on a 0.5 lattice, to force exact distance ties.
pub fn lattice_location_strategy(half_steps: i32) -> impl Strategy<Value = Location> {
    (-half_steps..=half_steps, -half_steps..=half_steps)
        .prop_map(|(x, y)| Location::new(f64::from(x) * 0.5, f64::from(y) * 0.5))
}

/// Strategy for valid ratings, with repeats likely.
pub fn rating_strategy() -> impl Strategy<Value = f64> {
    prop_oneof![
        (0u32..=10).prop_map(|r| f64::from(r) / 2.0),
        0.0..=5.0f64,
    ]
}

/// Strategy for customer star ratings.
pub fn stars_strategy() -> impl Strategy<Value = u32> {
    1u32..=5
}

/// Strategy for valid drivers.
pub fn driver_strategy(id_pool: u64, extent: f64) -> impl Strategy<Value = DriverRecord> {
    (
        driver_id_strategy(id_pool),
        name_strategy(),
        location_strategy(extent),
        rating_strategy(),
        0u64..500,
    )
        .prop_map(|(id, name, location, rating, rides)| {
            DriverRecord::new(id.as_u64(), name, location)
                .with_rating(rating)
                .with_total_rides(rides)
        })
}

/// A registry mutation.
#[derive(Debug, Clone)]
pub enum DriverOperation {
    /// Add a driver
    Add {
        /// The new driver
        record: DriverRecord,
    },
    /// Delete a driver
    Delete {
        /// Driver ID
        id: DriverId,
    },
    /// Change a driver's name
    Rename {
        /// Driver ID
        id: DriverId,
        /// New name
        name: String,
    },
    /// Move a driver
    Relocate {
        /// Driver ID
        id: DriverId,
        /// New location
        location: Location,
    },
    /// Record a customer rating
    Rate {
        /// Driver ID
        id: DriverId,
        /// Stars given
        stars: u32,
    },
    /// Record a completed ride
    Ride {
        /// Driver ID
        id: DriverId,
    },
    /// Compact the store
    Compact,
}

/// Strategy for operations on ids `1..=id_pool` within `[-extent, extent]²`.
pub fn operation_strategy(id_pool: u64, extent: f64) -> impl Strategy<Value = DriverOperation> {
    prop_oneof![
        4 => driver_strategy(id_pool, extent).prop_map(|record| DriverOperation::Add { record }),
        2 => driver_id_strategy(id_pool).prop_map(|id| DriverOperation::Delete { id }),
        1 => (driver_id_strategy(id_pool), name_strategy())
            .prop_map(|(id, name)| DriverOperation::Rename { id, name }),
        2 => (driver_id_strategy(id_pool), location_strategy(extent))
            .prop_map(|(id, location)| DriverOperation::Relocate { id, location }),
        1 => (driver_id_strategy(id_pool), stars_strategy())
            .prop_map(|(id, stars)| DriverOperation::Rate { id, stars }),
        1 => driver_id_strategy(id_pool).prop_map(|id| DriverOperation::Ride { id }),
        1 => Just(DriverOperation::Compact),
    ]
}

/// Strategy for generating a sequence of operations.
pub fn operation_sequence_strategy(
    min_ops: usize,
    max_ops: usize,
) -> impl Strategy<Value = Vec<DriverOperation>> {
    prop::collection::vec(operation_strategy(24, 20.0), min_ops..max_ops)
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Creates a configuration for thorough tests.
    #[must_use]
    pub fn thorough() -> Self {
        Self {
            cases: 1024,
            max_shrink_iters: 10000,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #![proptest_config(PropTestConfig::quick().to_proptest_config())]

        #[test]
        fn generated_drivers_are_valid(record in driver_strategy(16, 100.0)) {
            prop_assert!(record.validate().is_ok());
            prop_assert!((1..=16).contains(&record.id().as_u64()));
        }

        #[test]
        fn unicode_names_are_not_blank(name in unicode_name_strategy()) {
            prop_assert!(!name.trim().is_empty());
        }

        #[test]
        fn lattice_points_are_half_steps(location in lattice_location_strategy(8)) {
            prop_assert_eq!((location.x * 2.0).fract(), 0.0);
            prop_assert!(location.x.abs() <= 4.0 && location.y.abs() <= 4.0);
        }

        #[test]
        fn sequences_respect_bounds(ops in operation_sequence_strategy(5, 20)) {
            prop_assert!(ops.len() >= 5 && ops.len() < 20);
        }
    }

    #[test]
    fn config_presets() {
        assert_eq!(PropTestConfig::default().cases, 256);
        assert!(PropTestConfig::quick().cases < PropTestConfig::thorough().cases);
        assert_eq!(PropTestConfig::thorough().to_proptest_config().max_shrink_iters, 10000);
    }
}
