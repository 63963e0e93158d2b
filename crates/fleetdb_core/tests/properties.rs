//! Property tests comparing indexed queries with brute-force scans.

use fleetdb_core::{DriverId, DriverRecord, DriverUpdate, Location, Registry, RegistryConfig};
use ordered_float::OrderedFloat;
use proptest::prelude::*;
use std::cmp::Reverse;

fn location() -> impl Strategy<Value = Location> {
    (-50.0..50.0f64, -50.0..50.0f64).prop_map(|(x, y)| Location::new(x, y))
}

fn drivers(max: usize) -> impl Strategy<Value = Vec<(Location, f64)>> {
    prop::collection::vec((location(), 0.0..=5.0f64), 0..max)
}

fn registry(cell_size: f64, drivers: &[(Location, f64)]) -> Registry {
    let registry = Registry::with_config(RegistryConfig::new().cell_size(cell_size)).unwrap();
    for (i, (location, rating)) in drivers.iter().enumerate() {
        registry
            .add(
                DriverRecord::new(i as u64, format!("driver {i}"), *location)
                    .with_rating(*rating),
            )
            .unwrap();
    }
    registry
}

/// Ids sorted by (distance, rating desc, id), the order every proximity
/// query reports.
fn brute_force_by_distance(registry: &Registry, center: Location) -> Vec<(f64, DriverId)> {
    let mut all: Vec<_> = registry
        .all()
        .into_iter()
        .map(|d| {
            let distance = d.location().distance_to(&center);
            (
                (OrderedFloat(distance), Reverse(OrderedFloat(d.rating())), d.id()),
                distance,
            )
        })
        .collect();
    all.sort_by(|a, b| a.0.cmp(&b.0));
    all.into_iter().map(|(key, distance)| (distance, key.2)).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn radius_matches_brute_force(
        drivers in drivers(60),
        cell_size in 0.25..20.0f64,
        center in location(),
        radius in 0.0..40.0f64,
    ) {
        let registry = registry(cell_size, &drivers);
        let expected: Vec<_> = brute_force_by_distance(&registry, center)
            .into_iter()
            .filter(|(d, _)| *d <= radius)
            .map(|(_, id)| id)
            .collect();
        let actual: Vec<_> = registry
            .within_radius(center, radius)
            .into_iter()
            .map(|n| n.driver.id())
            .collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn knn_matches_brute_force(
        drivers in drivers(60),
        cell_size in 0.25..20.0f64,
        center in location(),
        k in 0usize..15,
    ) {
        let registry = registry(cell_size, &drivers);
        let expected: Vec<_> = brute_force_by_distance(&registry, center)
            .into_iter()
            .take(k)
            .map(|(_, id)| id)
            .collect();
        let actual: Vec<_> = registry
            .k_nearest(center, k)
            .into_iter()
            .map(|n| n.driver.id())
            .collect();
        prop_assert_eq!(actual.len(), k.min(drivers.len()));
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn top_k_matches_sort(drivers in drivers(60), k in 0usize..20, highest in any::<bool>()) {
        let registry = registry(1.0, &drivers);
        let mut all = registry.all();
        if highest {
            all.sort_by_key(|d| (Reverse(OrderedFloat(d.rating())), d.id()));
        } else {
            all.sort_by_key(|d| (OrderedFloat(d.rating()), d.id()));
        }
        all.truncate(k);
        prop_assert_eq!(registry.top_k_by_rating(k, highest), all);
    }

    #[test]
    fn indexes_stay_consistent_under_churn(
        drivers in drivers(40),
        moves in prop::collection::vec((0u64..40, location()), 0..30),
        deletes in prop::collection::vec(0u64..40, 0..20),
    ) {
        let registry = registry(3.0, &drivers);
        for (id, to) in moves {
            let _ = registry.update(DriverId::new(id), DriverUpdate::new().location(to));
        }
        for id in &deletes {
            let _ = registry.delete(DriverId::new(*id));
        }
        prop_assert!(registry.verify().is_empty());

        for id in deletes {
            prop_assert!(registry.find(DriverId::new(id)).is_none());
        }

        let before = registry.all();
        registry.compact();
        prop_assert_eq!(registry.all(), before);
        prop_assert!(registry.verify().is_empty());
        prop_assert_eq!(registry.summary().tombstoned, 0);
    }
}
