//! Mosaicking of adjacent or overlapping grids.

use tracing::debug;

use crate::error::{GridError, Result};
use crate::grid::{cell_count, ElevationGrid};

/// Relative difference below which two cell sizes are considered equal.
const CELL_SIZE_TOLERANCE: f64 = 1e-9;

/// Merge grids sharing a cell size into one grid covering their union.
///
/// Cells are composited in input order; a later grid's value replaces an
/// earlier one wherever the later grid has data. Cells no input covers stay
/// no-data. Afterwards a single hole-filling pass runs (see
/// [`ElevationGrid::fill_holes`]).
///
/// # Errors
///
/// - [`GridError::EmptyMerge`] if `grids` is empty
/// - [`GridError::CellSizeMismatch`] if the cell sizes differ
///
/// # Example
///
/// ```
/// use asctools::{merge, ElevationGrid};
///
/// let west = ElevationGrid::from_values(0.0, 0.0, 1.0, vec![vec![Some(1.0)]])?;
/// let east = ElevationGrid::from_values(1.0, 0.0, 1.0, vec![vec![Some(2.0)]])?;
///
/// let merged = merge(&[west, east])?;
/// assert_eq!(merged.row(0), &[Some(1.0), Some(2.0)]);
/// # Ok::<(), asctools::GridError>(())
/// ```
pub fn merge(grids: &[ElevationGrid]) -> Result<ElevationGrid> {
    let first = grids.first().ok_or(GridError::EmptyMerge)?;
    let cell_size = first.cell_size();

    for grid in grids {
        let found = grid.cell_size();
        if (found - cell_size).abs() > cell_size * CELL_SIZE_TOLERANCE {
            return Err(GridError::CellSizeMismatch {
                expected: cell_size,
                found,
            });
        }
    }

    let bounds = grids
        .iter()
        .skip(1)
        .fold(first.bounds(), |acc, grid| acc.union(&grid.bounds()));
    let num_cols = cell_count(bounds.width(), cell_size);
    let num_rows = cell_count(bounds.height(), cell_size);
    debug!(
        inputs = grids.len(),
        num_rows,
        num_cols,
        min_x = bounds.min_x,
        min_y = bounds.min_y,
        "merging grids"
    );

    let mut merged = ElevationGrid::new(bounds.min_x, bounds.min_y, num_cols, num_rows, cell_size);
    for grid in grids {
        for row in 0..grid.num_rows() {
            for (col, value) in grid.row(row).iter().enumerate() {
                if value.is_some() {
                    let (x, y) = grid.sample_point(row, col);
                    merged.set_elevation(x, y, *value);
                }
            }
        }
    }

    let filled = merged.fill_holes();
    debug!(filled, "filled holes after merge");
    merged.recompute_extrema();

    Ok(merged)
}

impl ElevationGrid {
    /// Fill isolated no-data cells from their cardinal neighbours.
    ///
    /// Each interior no-data cell takes the value of the first neighbour with
    /// data, checked in the order row above in storage (`row - 1`), row below
    /// (`row + 1`), column to the left, column to the right. Neighbours are
    /// read from the grid as it was before the pass, so fills never chain.
    /// Cells on the outer border are left alone.
    ///
    /// Returns the number of cells filled.
    pub fn fill_holes(&mut self) -> usize {
        let (rows, cols) = (self.num_rows(), self.num_cols());
        if rows < 3 || cols < 3 {
            return 0;
        }

        let mut fills = Vec::new();
        for row in 1..rows - 1 {
            for col in 1..cols - 1 {
                if self.value(row, col).is_some() {
                    continue;
                }
                let neighbour = self
                    .value(row - 1, col)
                    .or_else(|| self.value(row + 1, col))
                    .or_else(|| self.value(row, col - 1))
                    .or_else(|| self.value(row, col + 1));
                if let Some(value) = neighbour {
                    fills.push((row, col, value));
                }
            }
        }

        for &(row, col, value) in &fills {
            self.set_value(row, col, Some(value));
        }
        fills.len()
    }
}
