//! Search command implementation.

use super::{print_drivers, CommandResult, DriverView, Session};
use fleetdb_core::{DriverRecord, Registry};
use std::path::Path;

/// A name query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Names starting with the text.
    Prefix(String),
    /// Names containing the text.
    Contains(String),
}

impl Query {
    /// Runs the query against `registry`.
    pub fn execute(&self, registry: &Registry) -> Vec<DriverRecord> {
        match self {
            Self::Prefix(prefix) => registry.find_by_prefix(prefix),
            Self::Contains(fragment) => registry.find_by_substring(fragment),
        }
    }
}

/// Runs the search command.
pub fn run(path: &Path, session: &Session, query: &Query) -> CommandResult {
    let loaded = session.load(path)?;
    let views: Vec<DriverView> = query
        .execute(&loaded.registry)
        .iter()
        .map(DriverView::from)
        .collect();
    print_drivers(session.format, &views)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetdb_core::Location;

    #[test]
    fn prefix_and_contains_differ() {
        let registry = Registry::new();
        for (id, name) in [(1, "Ngo Thanh Lam"), (2, "Lam Quoc Hung")] {
            registry
                .add(DriverRecord::new(id, name, Location::new(0.0, 0.0)))
                .unwrap();
        }

        let prefix = Query::Prefix("lam".into()).execute(&registry);
        assert_eq!(prefix.len(), 1);
        assert_eq!(prefix[0].name(), "Lam Quoc Hung");

        let contains = Query::Contains("lam".into()).execute(&registry);
        assert_eq!(contains.len(), 2);
    }
}
