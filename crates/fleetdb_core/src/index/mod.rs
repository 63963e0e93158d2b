//! Secondary indexes over the driver store.
//!
//! Every index refers to drivers by id or slot, never by reference, so
//! the store can be mutated while the indexes are updated in step.
//!
//! # Index Types
//!
//! - [`NamePrefixIndex`]: trie over full lowercased names
//! - [`NameSubstringIndex`]: trie over every suffix of every lowercased name
//! - [`SpatialGrid`]: uniform square-cell grid over locations

mod grid;
mod prefix;
mod substring;
mod traits;
mod trie;

pub use grid::SpatialGrid;
pub use prefix::NamePrefixIndex;
pub use substring::NameSubstringIndex;
pub use traits::{fold_name, NameIndex};
