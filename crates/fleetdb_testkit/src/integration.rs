//! Model-checking harness.
//!
//! [`ModelHarness`] applies every operation both to a [`Registry`] and to
//! a plain map, asserts that both accept or reject it alike, and answers
//! queries by brute force over the map for comparison.

use crate::generators::DriverOperation;
use fleetdb_core::index::fold_name;
use fleetdb_core::{
    DriverId, DriverRecord, DriverUpdate, Location, ReaddPolicy, Registry, RegistryConfig,
};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Expected state of one driver.
#[derive(Debug, Clone, PartialEq)]
struct ModelDriver {
    name: String,
    location: Location,
    rating: f64,
    total_rides: u64,
    rating_sum: u64,
    rating_count: u32,
}

impl From<&DriverRecord> for ModelDriver {
    fn from(record: &DriverRecord) -> Self {
        Self {
            name: record.name().to_string(),
            location: record.location(),
            rating: record.rating(),
            total_rides: record.total_rides(),
            rating_sum: record.rating_sum(),
            rating_count: record.rating_count(),
        }
    }
}

/// A registry paired with a brute-force model of its contents.
pub struct ModelHarness {
    /// The registry under test.
    pub registry: Registry,
    model: BTreeMap<DriverId, ModelDriver>,
    retired: HashSet<DriverId>,
    retire_on_delete: bool,
}

impl ModelHarness {
    /// Creates a harness around a default registry.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Creates a harness around a registry built from `config`.
    pub fn with_config(config: RegistryConfig) -> Self {
        let retire_on_delete = config.readd_policy == ReaddPolicy::Retire;
        Self {
            registry: Registry::with_config(config).expect("Invalid registry config"),
            model: BTreeMap::new(),
            retired: HashSet::new(),
            retire_on_delete,
        }
    }

    /// Applies `op` to both sides and asserts they agree on success.
    pub fn apply(&mut self, op: &DriverOperation) {
        match op {
            DriverOperation::Add { record } => {
                let id = record.id();
                let expected = !self.model.contains_key(&id) && !self.retired.contains(&id);
                let result = self.registry.add(record.clone());
                assert_eq!(result.is_ok(), expected, "add {id}: {result:?}");
                if expected {
                    self.model.insert(id, ModelDriver::from(record));
                }
            }
            DriverOperation::Delete { id } => {
                let result = self.registry.delete(*id);
                let expected = self.model.remove(id).is_some();
                assert_eq!(result.is_ok(), expected, "delete {id}: {result:?}");
                if expected && self.retire_on_delete {
                    self.retired.insert(*id);
                }
            }
            DriverOperation::Rename { id, name } => {
                let result = self
                    .registry
                    .update(*id, DriverUpdate::new().name(name.clone()));
                let driver = self.model.get_mut(id);
                assert_eq!(result.is_ok(), driver.is_some(), "rename {id}: {result:?}");
                if let Some(driver) = driver {
                    driver.name.clone_from(name);
                }
            }
            DriverOperation::Relocate { id, location } => {
                let result = self
                    .registry
                    .update(*id, DriverUpdate::new().location(*location));
                let driver = self.model.get_mut(id);
                assert_eq!(result.is_ok(), driver.is_some(), "relocate {id}: {result:?}");
                if let Some(driver) = driver {
                    driver.location = *location;
                }
            }
            DriverOperation::Rate { id, stars } => {
                let result = self.registry.add_rating(*id, *stars);
                let driver = self.model.get_mut(id);
                assert_eq!(result.is_ok(), driver.is_some(), "rate {id}: {result:?}");
                if let Some(driver) = driver {
                    driver.rating_sum += u64::from(*stars);
                    driver.rating_count += 1;
                    driver.rating = driver.rating_sum as f64 / f64::from(driver.rating_count);
                }
            }
            DriverOperation::Ride { id } => {
                let result = self.registry.increment_rides(*id);
                let driver = self.model.get_mut(id);
                assert_eq!(result.is_ok(), driver.is_some(), "ride {id}: {result:?}");
                if let Some(driver) = driver {
                    driver.total_rides += 1;
                }
            }
            DriverOperation::Compact => {
                let result = self.registry.compact();
                assert_eq!(result.output_slots, self.model.len());
            }
        }
    }

    /// Applies every operation in order.
    pub fn apply_all<'a>(&mut self, ops: impl IntoIterator<Item = &'a DriverOperation>) {
        for op in ops {
            self.apply(op);
        }
    }

    /// Verifies every tracked driver and the registry's own invariants.
    pub fn verify_all(&self) {
        assert_eq!(self.registry.count(), self.model.len(), "active count");
        for (id, expected) in &self.model {
            let record = self
                .registry
                .find(*id)
                .unwrap_or_else(|| panic!("driver {id} missing"));
            assert_eq!(&ModelDriver::from(&record), expected, "driver {id}");
        }
        let violations = self.registry.verify();
        assert!(violations.is_empty(), "violations: {violations:?}");
    }

    /// Compares name, radius, k-nearest and rating queries with brute force.
    pub fn check_queries(&self, center: Location, radius: f64, k: usize, text: &str) {
        let folded = fold_name(text);
        let matching = |pred: &dyn Fn(&str) -> bool| -> BTreeSet<DriverId> {
            if text.is_empty() {
                return BTreeSet::new();
            }
            self.model
                .iter()
                .filter(|(_, d)| pred(&fold_name(&d.name)))
                .map(|(id, _)| *id)
                .collect()
        };
        let as_set = |records: Vec<DriverRecord>| -> BTreeSet<DriverId> {
            records.iter().map(DriverRecord::id).collect()
        };

        assert_eq!(
            as_set(self.registry.find_by_prefix(text)),
            matching(&|name: &str| name.starts_with(folded.as_str())),
            "prefix {text:?}"
        );
        assert_eq!(
            as_set(self.registry.find_by_substring(text)),
            matching(&|name: &str| name.contains(folded.as_str())),
            "substring {text:?}"
        );

        let by_distance = self.by_distance(center);
        let within: Vec<DriverId> = by_distance
            .iter()
            .take_while(|(_, d)| *d <= radius)
            .map(|(id, _)| *id)
            .collect();
        let actual: Vec<DriverId> = self
            .registry
            .within_radius(center, radius)
            .iter()
            .map(|n| n.driver.id())
            .collect();
        assert_eq!(actual, within, "radius {radius} around {center}");

        let nearest: Vec<DriverId> = by_distance.iter().take(k).map(|(id, _)| *id).collect();
        let actual: Vec<DriverId> = self
            .registry
            .k_nearest(center, k)
            .iter()
            .map(|n| n.driver.id())
            .collect();
        assert_eq!(actual, nearest, "{k} nearest to {center}");

        let mut by_rating: Vec<(&DriverId, &ModelDriver)> = self.model.iter().collect();
        by_rating.sort_by(|a, b| b.1.rating.total_cmp(&a.1.rating).then(a.0.cmp(b.0)));
        let top: Vec<DriverId> = by_rating.iter().take(k).map(|(id, _)| **id).collect();
        let actual: Vec<DriverId> = self
            .registry
            .top_k_by_rating(k, true)
            .iter()
            .map(DriverRecord::id)
            .collect();
        assert_eq!(actual, top, "top {k} by rating");
    }

    /// Tracked drivers ordered by distance, then rating descending, then id.
    fn by_distance(&self, center: Location) -> Vec<(DriverId, f64)> {
        let mut rows: Vec<(DriverId, f64, f64)> = self
            .model
            .iter()
            .map(|(id, d)| (*id, center.distance_to(&d.location), d.rating))
            .collect();
        rows.sort_by(|a, b| {
            a.1.total_cmp(&b.1)
                .then(b.2.total_cmp(&a.2))
                .then(a.0.cmp(&b.0))
        });
        rows.into_iter().map(|(id, d, _)| (id, d)).collect()
    }

    /// Returns the count of tracked drivers.
    pub fn tracked_count(&self) -> usize {
        self.model.len()
    }
}

impl Default for ModelHarness {
    fn default() -> Self {
        Self::new()
    }
}
