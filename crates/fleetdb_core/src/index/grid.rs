//! Uniform spatial grid.

use crate::types::{CellKey, Location, Slot};
use std::collections::HashMap;

/// Inclusive rectangle of cell keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CellRange {
    pub(crate) min: CellKey,
    pub(crate) max: CellKey,
}

impl CellRange {
    fn contains(&self, key: CellKey) -> bool {
        (self.min.col..=self.max.col).contains(&key.col)
            && (self.min.row..=self.max.row).contains(&key.row)
    }

    /// Number of cells in the rectangle.
    fn area(&self) -> u128 {
        let cols = (i128::from(self.max.col) - i128::from(self.min.col) + 1).max(0);
        let rows = (i128::from(self.max.row) - i128::from(self.min.row) + 1).max(0);
        cols.unsigned_abs().saturating_mul(rows.unsigned_abs())
    }

    fn expand(&mut self, key: CellKey) {
        self.min.col = self.min.col.min(key.col);
        self.min.row = self.min.row.min(key.row);
        self.max.col = self.max.col.max(key.col);
        self.max.row = self.max.row.max(key.row);
    }
}

/// Square-cell grid mapping `cell -> slots`.
///
/// Only occupied cells are stored. The grid also tracks the bounding
/// rectangle of every cell ever occupied since the last [`clear`], which
/// bounds how far a ring search has to expand. Removals do not shrink it.
///
/// [`clear`]: SpatialGrid::clear
#[derive(Debug)]
pub struct SpatialGrid {
    cell_size: f64,
    cells: HashMap<CellKey, Vec<Slot>>,
    extent: Option<CellRange>,
    entries: usize,
}

impl SpatialGrid {
    /// Creates an empty grid. `cell_size` must be finite and positive.
    pub fn new(cell_size: f64) -> Self {
        debug_assert!(cell_size.is_finite() && cell_size > 0.0);
        Self {
            cell_size,
            cells: HashMap::new(),
            extent: None,
            entries: 0,
        }
    }

    /// Side length of a cell.
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Cell containing `location`.
    ///
    /// Coordinates beyond the `i64` range saturate into the outermost cells.
    pub fn cell_key(&self, location: Location) -> CellKey {
        CellKey::new(
            (location.x / self.cell_size).floor() as i64,
            (location.y / self.cell_size).floor() as i64,
        )
    }

    /// Adds `slot` to the cell containing `location`.
    pub fn insert(&mut self, slot: Slot, location: Location) {
        let key = self.cell_key(location);
        self.cells.entry(key).or_default().push(slot);
        self.entries += 1;
        match &mut self.extent {
            Some(extent) => extent.expand(key),
            None => self.extent = Some(CellRange { min: key, max: key }),
        }
    }

    /// Removes `slot` from the cell containing `location`, dropping the
    /// cell once it is empty.
    pub fn remove(&mut self, slot: Slot, location: Location) -> bool {
        let key = self.cell_key(location);
        let Some(bucket) = self.cells.get_mut(&key) else {
            return false;
        };
        let Some(pos) = bucket.iter().position(|s| *s == slot) else {
            return false;
        };
        bucket.swap_remove(pos);
        if bucket.is_empty() {
            self.cells.remove(&key);
        }
        self.entries -= 1;
        true
    }

    /// Returns true if `slot` is filed under the cell for `location`.
    pub fn contains(&self, slot: Slot, location: Location) -> bool {
        self.cells
            .get(&self.cell_key(location))
            .is_some_and(|bucket| bucket.contains(&slot))
    }

    /// Slots in a single cell.
    pub fn slots_in(&self, key: CellKey) -> &[Slot] {
        self.cells.get(&key).map_or(&[], Vec::as_slice)
    }

    /// Number of non-empty cells.
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    /// Number of slots filed across all cells.
    pub fn entry_count(&self) -> usize {
        self.entries
    }

    /// Returns true if no slot is filed.
    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    /// Iterates occupied cells in no particular order.
    pub fn cells(&self) -> impl Iterator<Item = (CellKey, &[Slot])> {
        self.cells.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    /// Drops every cell and resets the extent.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.extent = None;
        self.entries = 0;
    }

    /// Broad phase of a radius query.
    ///
    /// Returns every slot in the cells that intersect the square of side
    /// `2 * radius` centered on `center`, i.e. at most `s = ⌈radius /
    /// cell_size⌉` rings around the center cell. When that block holds more
    /// cells than are occupied, the occupied cells are scanned and filtered
    /// by key range instead. Callers filter by exact distance.
    pub fn candidates_within(&self, center: Location, radius: f64) -> Vec<Slot> {
        let block = CellRange {
            min: self.cell_key(Location::new(center.x - radius, center.y - radius)),
            max: self.cell_key(Location::new(center.x + radius, center.y + radius)),
        };

        let mut out = Vec::new();
        if block.area() > self.cells.len() as u128 {
            for (key, bucket) in &self.cells {
                if block.contains(*key) {
                    out.extend_from_slice(bucket);
                }
            }
        } else {
            for col in block.min.col..=block.max.col {
                for row in block.min.row..=block.max.row {
                    out.extend_from_slice(self.slots_in(CellKey::new(col, row)));
                }
            }
        }
        out
    }

    /// Cells at exactly Chebyshev distance `ring` from `origin`.
    ///
    /// Ring 0 is the origin itself; ring `s > 0` has `8s` cells. Cells whose
    /// coordinates fall outside the `i64` range are skipped.
    pub(crate) fn ring_cells(origin: CellKey, ring: u64) -> impl Iterator<Item = CellKey> {
        let (cx, cy, s) = (
            i128::from(origin.col),
            i128::from(origin.row),
            i128::from(ring),
        );
        let horizontal = (cx - s..=cx + s).flat_map(move |col| {
            let bottom = (col, cy - s);
            let top = (col, cy + s);
            std::iter::once(bottom).chain((s > 0).then_some(top))
        });
        let vertical = (cy - s + 1..cy + s).flat_map(move |row| {
            let left = (cx - s, row);
            let right = (cx + s, row);
            std::iter::once(left).chain((s > 0).then_some(right))
        });
        horizontal.chain(vertical).filter_map(|(col, row)| {
            Some(CellKey::new(
                i64::try_from(col).ok()?,
                i64::try_from(row).ok()?,
            ))
        })
    }

    /// Smallest ring around `origin` beyond which no cell has ever been
    /// occupied, or `None` for an empty grid.
    pub(crate) fn outermost_ring(&self, origin: CellKey) -> Option<u64> {
        let extent = self.extent?;
        let corners = [extent.min, extent.max];
        corners
            .iter()
            .flat_map(|c| [origin.col.abs_diff(c.col), origin.row.abs_diff(c.row)])
            .max()
    }

    /// Distance from `point` to the nearest edge of the block of cells
    /// within `ring` rings of `origin`.
    ///
    /// Every location outside that block is at least this far away.
    pub(crate) fn block_margin(&self, point: Location, origin: CellKey, ring: u64) -> f64 {
        let s = ring as f64;
        let cs = self.cell_size;
        let left = (origin.col as f64 - s) * cs;
        let right = (origin.col as f64 + s + 1.0) * cs;
        let bottom = (origin.row as f64 - s) * cs;
        let top = (origin.row as f64 + s + 1.0) * cs;
        (point.x - left)
            .min(right - point.x)
            .min(point.y - bottom)
            .min(top - point.y)
            .max(0.0)
    }
}
