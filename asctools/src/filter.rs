//! Numeric filters: median denoising and block-average downscaling.

use tracing::debug;

use crate::error::{GridError, Result};
use crate::grid::{Bounds, ElevationGrid};

/// Median of a set of values, averaging the two middle values for an even
/// count. Sorts `values` in place. Returns `None` for an empty slice.
pub(crate) fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_unstable_by(f64::total_cmp);

    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

impl ElevationGrid {
    /// Apply a square median filter of side `window_size`.
    ///
    /// The window is clipped at the grid edges. No-data neighbours are left
    /// out of the median; a cell whose window holds no data at all stays
    /// no-data.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidWindowSize`] unless `window_size` is odd and at least 3.
    pub fn denoise(&self, window_size: usize) -> Result<Self> {
        if window_size < 3 || window_size % 2 == 0 {
            return Err(GridError::InvalidWindowSize { size: window_size });
        }
        debug!(window_size, "denoising grid");

        let half = window_size / 2;
        let (rows, cols) = (self.num_rows(), self.num_cols());
        let mut result = ElevationGrid::with_bounds(self.bounds(), cols, rows, self.cell_size());
        let mut neighbours = Vec::with_capacity(window_size.min(rows) * window_size.min(cols));

        for row in 0..rows {
            let row_range = row.saturating_sub(half)..row.saturating_add(half + 1).min(rows);
            for col in 0..cols {
                let col_range = col.saturating_sub(half)..col.saturating_add(half + 1).min(cols);

                neighbours.clear();
                for r in row_range.clone() {
                    neighbours.extend(self.row(r)[col_range.clone()].iter().flatten());
                }
                result.set_value(row, col, median(&mut neighbours));
            }
        }
        result.recompute_extrema();

        Ok(result)
    }

    /// Shrink the grid by an integer factor, averaging each `factor × factor`
    /// block of source cells.
    ///
    /// No-data cells are left out of each average; a block without any data
    /// becomes no-data. Rows or columns that do not fill a whole block along
    /// the north or east edge are dropped.
    ///
    /// # Errors
    ///
    /// - [`GridError::InvalidFactor`] if `factor <= 1`
    /// - [`GridError::FactorTooLarge`] if the result would have no rows or columns
    pub fn downscale(&self, factor: usize) -> Result<Self> {
        if factor <= 1 {
            return Err(GridError::InvalidFactor { factor });
        }

        let rows = self.num_rows() / factor;
        let cols = self.num_cols() / factor;
        if rows == 0 || cols == 0 {
            return Err(GridError::FactorTooLarge {
                factor,
                rows: self.num_rows(),
                cols: self.num_cols(),
            });
        }
        debug!(factor, rows, cols, "downscaling grid");

        let bounds = self.bounds();
        let cell_size = self.cell_size() * factor as f64;
        let mut result = ElevationGrid::with_bounds(
            Bounds::new(
                bounds.min_x,
                bounds.min_y,
                bounds.min_x + cols as f64 * cell_size,
                bounds.min_y + rows as f64 * cell_size,
            ),
            cols,
            rows,
            cell_size,
        );

        for row in 0..rows {
            for col in 0..cols {
                let (sum, count) = (row * factor..(row + 1) * factor)
                    .flat_map(|r| self.row(r)[col * factor..(col + 1) * factor].iter().flatten())
                    .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
                let mean = (count > 0).then(|| sum / count as f64);
                result.set_value(row, col, mean);
            }
        }
        result.recompute_extrema();

        Ok(result)
    }
}
