//! Driver records and the slot store.

mod record;
mod store;

pub(crate) use record::{validate_rating, validate_stars};
pub use record::{DriverRecord, DriverUpdate, DEFAULT_RATING, MAX_RATING};
pub(crate) use store::DriverStore;
