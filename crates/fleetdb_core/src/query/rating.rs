//! Top-K selection by rating.

use crate::driver::{DriverRecord, DriverStore};
use crate::query::BoundedHeap;
use ordered_float::OrderedFloat;
use std::cmp::Reverse;

/// Which end of the rating scale a top-K query selects from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RatingOrder {
    /// Highest ratings first.
    #[default]
    Highest,
    /// Lowest ratings first.
    Lowest,
}

impl RatingOrder {
    /// `Highest` when `highest` is true, else `Lowest`.
    pub fn from_highest(highest: bool) -> Self {
        if highest {
            Self::Highest
        } else {
            Self::Lowest
        }
    }
}

/// The `k` active drivers at the `order` end of the rating scale.
///
/// Ties on rating go to the smaller id, so the result equals sorting by
/// `(rating, id)` in the requested direction and taking `k`.
pub(crate) fn top_k(store: &DriverStore, k: usize, order: RatingOrder) -> Vec<DriverRecord> {
    let k = k.min(store.active_count());
    if k == 0 {
        return Vec::new();
    }
    match order {
        RatingOrder::Highest => select(store, k, |r| (Reverse(OrderedFloat(r.rating())), r.id())),
        RatingOrder::Lowest => select(store, k, |r| (OrderedFloat(r.rating()), r.id())),
    }
}

fn select<K: Ord>(
    store: &DriverStore,
    k: usize,
    key: impl Fn(&DriverRecord) -> K,
) -> Vec<DriverRecord> {
    let mut heap = BoundedHeap::new(k);
    for (_, record) in store.iter_active() {
        heap.push(key(record), record);
    }
    heap.into_sorted_vec()
        .into_iter()
        .map(|(_, record)| record.clone())
        .collect()
}
