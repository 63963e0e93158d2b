//! Nearby command implementation.

use super::{print_drivers, BestBy, CommandResult, DriverView, Session};
use fleetdb_core::{Location, Registry};
use std::path::Path;

/// A spatial query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Query {
    /// Every driver within the radius.
    Radius(f64),
    /// The k nearest drivers.
    Nearest(usize),
    /// The single best driver within the radius.
    Best {
        /// Search radius.
        radius: f64,
        /// Selection rule.
        by: BestBy,
    },
}

impl Query {
    /// Runs the query against `registry`, nearest first.
    pub fn execute(&self, registry: &Registry, center: Location) -> Vec<DriverView> {
        match *self {
            Self::Radius(radius) => registry
                .within_radius(center, radius)
                .iter()
                .map(|n| DriverView::from(&n.driver).with_distance(n.distance))
                .collect(),
            Self::Nearest(k) => registry
                .k_nearest(center, k)
                .iter()
                .map(|n| DriverView::from(&n.driver).with_distance(n.distance))
                .collect(),
            Self::Best {
                radius,
                by: BestBy::Rated,
            } => registry
                .top_rated_within_radius(center, radius)
                .map(|n| DriverView::from(&n.driver).with_distance(n.distance))
                .into_iter()
                .collect(),
            Self::Best {
                radius,
                by: BestBy::Balanced,
            } => registry
                .best_balanced_within_radius(center, radius)
                .map(|n| {
                    DriverView::from(&n.driver)
                        .with_distance(n.distance)
                        .with_score(n.score)
                })
                .into_iter()
                .collect(),
        }
    }
}

/// Runs the nearby command.
pub fn run(path: &Path, session: &Session, (x, y): (f64, f64), query: &Query) -> CommandResult {
    let center = Location::new(x, y);
    if !center.is_finite() {
        return Err(format!("Query point {center} is not finite").into());
    }

    let loaded = session.load(path)?;
    let views = query.execute(&loaded.registry, center);
    print_drivers(session.format, &views)
}
