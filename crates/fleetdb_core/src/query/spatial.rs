//! Proximity queries over the spatial grid.

use crate::driver::{DriverRecord, DriverStore};
use crate::index::SpatialGrid;
use crate::query::BoundedHeap;
use crate::types::{DriverId, Location, Slot};
use ordered_float::OrderedFloat;
use std::cmp::Reverse;
use tracing::warn;

/// Weight of proximity in the balanced score.
const DISTANCE_WEIGHT: f64 = 0.6;
/// Weight of rating in the balanced score.
const RATING_WEIGHT: f64 = 0.4;

/// A driver returned by a proximity query.
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    /// Snapshot of the driver at query time.
    pub driver: DriverRecord,
    /// Euclidean distance from the query point.
    pub distance: f64,
}

/// A driver picked by the balanced distance/rating score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredNeighbor {
    /// Snapshot of the driver at query time.
    pub driver: DriverRecord,
    /// Euclidean distance from the query point.
    pub distance: f64,
    /// Balanced score in `[0, 1]`, higher is better.
    pub score: f64,
}

/// Distance ascending, then rating descending, then id ascending.
type ProximityKey = (OrderedFloat<f64>, Reverse<OrderedFloat<f64>>, DriverId);

fn proximity_key(distance: f64, record: &DriverRecord) -> ProximityKey {
    (
        OrderedFloat(distance),
        Reverse(OrderedFloat(record.rating())),
        record.id(),
    )
}

fn usable(center: Location, radius: f64) -> bool {
    center.is_finite() && radius >= 0.0
}

/// Every active driver within `radius` of `center`, nearest first.
///
/// Negative or NaN radii and non-finite centers match nothing.
pub(crate) fn within_radius(
    store: &DriverStore,
    grid: &SpatialGrid,
    center: Location,
    radius: f64,
) -> Vec<Neighbor> {
    if !usable(center, radius) {
        return Vec::new();
    }

    let mut hits: Vec<(ProximityKey, Slot)> = grid
        .candidates_within(center, radius)
        .into_iter()
        .filter_map(|slot| {
            let record = store.get(slot);
            let distance = record.location().distance_to(&center);
            (distance <= radius).then(|| (proximity_key(distance, record), slot))
        })
        .collect();
    hits.sort_unstable_by(|a, b| a.0.cmp(&b.0));

    hits.into_iter()
        .map(|(key, slot)| Neighbor {
            driver: store.get(slot).clone(),
            distance: key.0 .0,
        })
        .collect()
}

/// The `k` active drivers closest to `center`, nearest first.
///
/// Searches rings of cells outward from the center cell. After ring `s`
/// the search stops once `k` candidates are held and the k-th is strictly
/// closer than the nearest edge of the searched block, since every cell
/// not yet visited lies beyond that edge. It also stops past the occupied
/// extent of the grid. Once a ring would enumerate more cells than are
/// occupied, the remaining occupied cells are scanned directly.
///
/// With `max_ring` set, rings beyond the cap are never searched and the
/// result may be approximate.
pub(crate) fn k_nearest(
    store: &DriverStore,
    grid: &SpatialGrid,
    center: Location,
    k: usize,
    max_ring: Option<u32>,
) -> Vec<Neighbor> {
    let (neighbors, capped) = ring_search(store, grid, center, k, max_ring);
    if capped {
        warn!(
            max_ring,
            found = neighbors.len(),
            "k-nearest stopped at ring cap, result may be approximate"
        );
    }
    neighbors
}

/// Runs the ring search. The flag is set when occupied cells beyond
/// `max_ring` were left unsearched.
fn ring_search(
    store: &DriverStore,
    grid: &SpatialGrid,
    center: Location,
    k: usize,
    max_ring: Option<u32>,
) -> (Vec<Neighbor>, bool) {
    let k = k.min(store.active_count());
    if k == 0 || !center.is_finite() {
        return (Vec::new(), false);
    }
    let origin = grid.cell_key(center);
    let Some(outermost) = grid.outermost_ring(origin) else {
        return (Vec::new(), false);
    };
    let occupied = grid.occupied_cells() as u64;
    let last_ring = max_ring.map_or(u64::MAX, u64::from);

    let mut heap = BoundedHeap::new(k);
    let mut capped = false;
    let mut ring = 0u64;
    while ring <= outermost {
        if ring > last_ring {
            capped = true;
            break;
        }

        if ring > 0 && ring.saturating_mul(8) >= occupied {
            for (key, slots) in grid.cells() {
                let distance = key.ring_distance(&origin);
                if (ring..=last_ring).contains(&distance) {
                    offer_all(&mut heap, store, center, slots);
                }
            }
            capped = outermost > last_ring;
            break;
        }

        for key in SpatialGrid::ring_cells(origin, ring) {
            offer_all(&mut heap, store, center, grid.slots_in(key));
        }

        if heap.is_full() {
            let margin = grid.block_margin(center, origin, ring);
            if heap.worst_key().is_some_and(|key| key.0 .0 < margin) {
                break;
            }
        }
        ring += 1;
    }

    let neighbors = heap
        .into_sorted_vec()
        .into_iter()
        .map(|(key, slot)| Neighbor {
            driver: store.get(slot).clone(),
            distance: key.0 .0,
        })
        .collect();
    (neighbors, capped)
}

fn offer_all(
    heap: &mut BoundedHeap<ProximityKey, Slot>,
    store: &DriverStore,
    center: Location,
    slots: &[Slot],
) {
    for slot in slots {
        let record = store.get(*slot);
        let distance = record.location().distance_to(&center);
        heap.push(proximity_key(distance, record), *slot);
    }
}

/// Highest-rated driver within `radius`. Among equal ratings the one
/// listed first by [`within_radius`] wins.
pub(crate) fn top_rated_within_radius(
    store: &DriverStore,
    grid: &SpatialGrid,
    center: Location,
    radius: f64,
) -> Option<Neighbor> {
    within_radius(store, grid, center, radius)
        .into_iter()
        .reduce(|best, next| {
            if next.driver.rating() > best.driver.rating() {
                next
            } else {
                best
            }
        })
}

/// Driver within `radius` with the best blend of proximity and rating:
///
/// `0.6 * (max_dist - d) / max_dist + 0.4 * rating / 5`
///
/// where `max_dist` is the largest candidate distance, or 1 when every
/// candidate sits on the center.
pub(crate) fn best_balanced_within_radius(
    store: &DriverStore,
    grid: &SpatialGrid,
    center: Location,
    radius: f64,
) -> Option<ScoredNeighbor> {
    let candidates = within_radius(store, grid, center, radius);
    let farthest = candidates.last().map_or(0.0, |n| n.distance);
    let max_dist = if farthest > 0.0 { farthest } else { 1.0 };

    candidates
        .into_iter()
        .map(|n| {
            let proximity = (max_dist - n.distance) / max_dist;
            let quality = n.driver.rating() / crate::driver::MAX_RATING;
            ScoredNeighbor {
                score: DISTANCE_WEIGHT * proximity + RATING_WEIGHT * quality,
                driver: n.driver,
                distance: n.distance,
            }
        })
        .reduce(|best, next| if next.score > best.score { next } else { best })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        store: DriverStore,
        grid: SpatialGrid,
    }

    impl Fixture {
        fn new(cell_size: f64, drivers: &[(u64, f64, f64, f64)]) -> Self {
            let mut store = DriverStore::new();
            let mut grid = SpatialGrid::new(cell_size);
            for &(id, x, y, rating) in drivers {
                let location = Location::new(x, y);
                let slot = store.push(
                    DriverRecord::new(id, format!("d{id}"), location).with_rating(rating),
                );
                grid.insert(slot, location);
            }
            Self { store, grid }
        }

        fn radius(&self, x: f64, y: f64, r: f64) -> Vec<Neighbor> {
            within_radius(&self.store, &self.grid, Location::new(x, y), r)
        }

        fn knn(&self, x: f64, y: f64, k: usize) -> Vec<u64> {
            k_nearest(&self.store, &self.grid, Location::new(x, y), k, None)
                .iter()
                .map(|n| n.driver.id().as_u64())
                .collect()
        }
    }

    fn ids(found: &[Neighbor]) -> Vec<u64> {
        found.iter().map(|n| n.driver.id().as_u64()).collect()
    }

    #[test]
    fn radius_sorted_by_distance() {
        let f = Fixture::new(
            2.0,
            &[(1, 0.0, 0.0, 4.0), (2, 1.0, 1.0, 4.0), (3, 3.0, 3.0, 4.0)],
        );
        let found = f.radius(0.0, 0.0, 2.0);
        assert_eq!(ids(&found), vec![1, 2]);
        assert_eq!(found[0].distance, 0.0);
        assert!((found[1].distance - std::f64::consts::SQRT_2).abs() < 1e-12);
    }

    #[test]
    fn radius_ties_break_on_rating_then_id() {
        let f = Fixture::new(
            1.0,
            &[
                (4, 1.0, 0.0, 4.0),
                (2, 0.0, 1.0, 4.0),
                (3, -1.0, 0.0, 4.5),
            ],
        );
        assert_eq!(ids(&f.radius(0.0, 0.0, 1.0)), vec![3, 2, 4]);
    }

    #[test]
    fn radius_edge_cases() {
        let f = Fixture::new(1.0, &[(1, 2.0, 2.0, 4.0), (2, 2.5, 2.0, 4.0)]);
        assert_eq!(ids(&f.radius(2.0, 2.0, 0.0)), vec![1]);
        assert!(f.radius(2.0, 2.0, -1.0).is_empty());
        assert!(f.radius(2.0, 2.0, f64::NAN).is_empty());
        assert!(f.radius(f64::NAN, 2.0, 1.0).is_empty());
        assert_eq!(f.radius(0.0, 0.0, f64::INFINITY).len(), 2);
    }

    #[test]
    fn knn_orders_by_distance() {
        let f = Fixture::new(
            1.0,
            &[
                (1, 0.0, 0.0, 4.0),
                (2, 5.0, 5.0, 4.0),
                (3, 1.5, 0.0, 4.0),
                (4, -0.5, -0.5, 4.0),
            ],
        );
        assert_eq!(f.knn(0.0, 0.0, 2), vec![1, 4]);
        assert_eq!(f.knn(0.0, 0.0, 10), vec![1, 4, 3, 2]);
        assert_eq!(f.knn(6.0, 6.0, 1), vec![2]);
        assert!(f.knn(0.0, 0.0, 0).is_empty());
    }

    #[test]
    fn knn_finds_far_drivers_across_empty_rings() {
        let f = Fixture::new(0.5, &[(1, 40.0, -30.0, 4.0), (2, -60.0, 10.0, 4.0)]);
        assert_eq!(f.knn(0.0, 0.0, 1), vec![1]);
        assert_eq!(f.knn(0.0, 0.0, 2), vec![1, 2]);
    }

    #[test]
    fn knn_keeps_expanding_until_the_block_margin_is_safe() {
        // 1 sits in ring 1 but deep in a corner; 3 sits in ring 2 and is
        // closer. The far drivers keep perimeter enumeration cheaper than
        // a full scan.
        let mut drivers = vec![(1, 1.95, 1.95, 4.0), (3, 0.5, -1.05, 4.0)];
        for i in 0..30u32 {
            drivers.push((100 + u64::from(i), 100.0 + 2.0 * f64::from(i), 100.0, 4.0));
        }
        let f = Fixture::new(1.0, &drivers);

        assert_eq!(f.knn(0.5, 0.5, 1), vec![3]);
        assert_eq!(f.knn(0.5, 0.5, 2), vec![3, 1]);
    }

    #[test]
    fn knn_ring_cap_can_miss_drivers() {
        let f = Fixture::new(1.0, &[(1, 0.5, 0.5, 4.0), (2, 9.5, 0.5, 4.0), (3, 0.5, 8.5, 4.0)]);
        let (capped, hit_cap) =
            ring_search(&f.store, &f.grid, Location::new(0.5, 0.5), 2, Some(1));
        assert_eq!(capped.len(), 1);
        assert!(hit_cap);

        let exact = k_nearest(&f.store, &f.grid, Location::new(0.5, 0.5), 2, None);
        assert_eq!(exact.len(), 2);
        assert_eq!(exact[1].driver.id(), DriverId::new(3));
    }

    #[test]
    fn knn_ring_cap_flags_only_unsearched_cells() {
        let f = Fixture::new(
            1.0,
            &[(1, 0.5, 0.5, 4.0), (2, 1.5, 0.5, 4.0), (3, 30.5, 0.5, 4.0)],
        );
        let center = Location::new(0.5, 0.5);

        // Ring-by-ring path: ring 2 passes the cap before the scan kicks in.
        let crowd: Vec<_> = (0..40u64)
            .map(|i| (100 + i, (i % 5) as f64 + 0.5, (i / 5) as f64 + 10.5, 3.0))
            .collect();
        let far = Fixture::new(1.0, &crowd);
        let (found, hit_cap) = ring_search(&far.store, &far.grid, center, 3, Some(1));
        assert!(found.is_empty());
        assert!(hit_cap);

        // Direct-scan path with the cap beyond every occupied ring.
        let (found, hit_cap) = ring_search(&f.store, &f.grid, center, 3, Some(40));
        assert_eq!(found.len(), 3);
        assert!(!hit_cap);

        // Direct-scan path that drops the far driver.
        let (found, hit_cap) = ring_search(&f.store, &f.grid, center, 3, Some(5));
        assert_eq!(found.len(), 2);
        assert!(hit_cap);

        // Exact searches never report the cap.
        let (_, hit_cap) = ring_search(&f.store, &f.grid, center, 3, None);
        assert!(!hit_cap);
    }

    #[test]
    fn top_rated_keeps_first_on_ties() {
        let f = Fixture::new(
            1.0,
            &[(1, 0.0, 0.0, 4.0), (2, 1.0, 0.0, 4.9), (3, 0.0, 1.5, 4.9)],
        );
        let best = top_rated_within_radius(&f.store, &f.grid, Location::new(0.0, 0.0), 2.0);
        assert_eq!(best.unwrap().driver.id(), DriverId::new(2));

        assert!(top_rated_within_radius(&f.store, &f.grid, Location::new(50.0, 0.0), 1.0).is_none());
    }

    #[test]
    fn balanced_trades_distance_for_rating() {
        let f = Fixture::new(1.0, &[(1, 0.0, 0.0, 3.0), (2, 2.0, 0.0, 5.0)]);
        let best = best_balanced_within_radius(&f.store, &f.grid, Location::new(0.0, 0.0), 3.0)
            .unwrap();
        // 1: 0.6 + 0.24 = 0.84, 2: 0.0 + 0.4 = 0.4
        assert_eq!(best.driver.id(), DriverId::new(1));
        assert!((best.score - 0.84).abs() < 1e-12);
    }

    #[test]
    fn balanced_with_all_candidates_on_center() {
        let f = Fixture::new(1.0, &[(1, 1.0, 1.0, 4.0), (2, 1.0, 1.0, 4.5)]);
        let best = best_balanced_within_radius(&f.store, &f.grid, Location::new(1.0, 1.0), 0.0)
            .unwrap();
        assert_eq!(best.driver.id(), DriverId::new(2));
        assert!((best.score - (0.6 + 0.4 * 0.9)).abs() < 1e-12);
    }
}
