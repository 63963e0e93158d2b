//! Read-only queries composed over the store and the spatial grid.
//!
//! - [`BoundedHeap`]: generic k-smallest selection, shared by every
//!   bounded query
//! - [`rating`]: top-K by rating in either direction
//! - [`spatial`]: radius, k-nearest and best-in-radius queries

mod heap;
pub(crate) mod rating;
pub(crate) mod spatial;

pub use heap::BoundedHeap;
pub use rating::RatingOrder;
pub use spatial::{Neighbor, ScoredNeighbor};
