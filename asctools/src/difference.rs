//! Cell-by-cell difference of two grids.

use tracing::debug;

use crate::error::{GridError, Result};
use crate::grid::ElevationGrid;

impl ElevationGrid {
    /// Subtract `other` from `self`.
    ///
    /// The result covers `self`'s bounds. Each cell holds `self - other`,
    /// with `other` sampled at the same world coordinate. Cells where either
    /// grid has no data, including cells `other` does not cover, are no-data.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::CellSizeMismatch`] if the grids have different cell sizes.
    pub fn subtract(&self, other: &ElevationGrid) -> Result<Self> {
        if (self.cell_size() - other.cell_size()).abs() > self.cell_size() * 1e-9 {
            return Err(GridError::CellSizeMismatch {
                expected: self.cell_size(),
                found: other.cell_size(),
            });
        }

        let (rows, cols) = (self.num_rows(), self.num_cols());
        let mut result = ElevationGrid::with_bounds(self.bounds(), cols, rows, self.cell_size());
        for row in 0..rows {
            for col in 0..cols {
                let (x, y) = self.sample_point(row, col);
                let difference = self
                    .value(row, col)
                    .zip(other.get_elevation(x, y))
                    .map(|(a, b)| a - b);
                result.set_value(row, col, difference);
            }
        }
        result.recompute_extrema();
        debug!(valid = result.valid_count(), "subtracted grids");

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subtract_overlapping() {
        let a = ElevationGrid::from_values(
            0.0,
            0.0,
            1.0,
            vec![vec![Some(10.0), Some(20.0), None]],
        )
        .unwrap();
        let b =
            ElevationGrid::from_values(1.0, 0.0, 1.0, vec![vec![Some(5.0), Some(1.0)]]).unwrap();

        let diff = a.subtract(&b).unwrap();
        // Column 0 is outside `b`, column 2 has no data in `a`.
        assert_eq!(diff.row(0), &[None, Some(15.0), None]);
        assert_eq!(diff.min_elevation(), Some(15.0));
    }

    #[test]
    fn test_subtract_self_is_zero() {
        let a = ElevationGrid::from_values(0.0, 0.0, 0.5, vec![vec![Some(3.25); 4]; 3]).unwrap();
        let diff = a.subtract(&a).unwrap();

        assert!(diff.rows().flatten().all(|v| *v == Some(0.0)));
    }

    #[test]
    fn test_subtract_cell_size_mismatch() {
        let a = ElevationGrid::new(0.0, 0.0, 2, 2, 1.0);
        let b = ElevationGrid::new(0.0, 0.0, 2, 2, 0.5);

        assert!(matches!(
            a.subtract(&b),
            Err(GridError::CellSizeMismatch { .. })
        ));
    }
}
