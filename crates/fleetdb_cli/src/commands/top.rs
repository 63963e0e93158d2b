//! Top command implementation.

use super::{print_drivers, CommandResult, DriverView, Session};
use std::path::Path;

/// Runs the top command.
pub fn run(path: &Path, session: &Session, k: usize, highest: bool) -> CommandResult {
    let loaded = session.load(path)?;
    let views: Vec<DriverView> = loaded
        .registry
        .top_k_by_rating(k, highest)
        .iter()
        .map(DriverView::from)
        .collect();
    print_drivers(session.format, &views)
}
