//! In-memory elevation grid and its world-coordinate mapping.
//!
//! This module provides [`ElevationGrid`], a rectangular raster of elevation
//! samples with a uniform square cell size, and [`Bounds`], the world-space
//! rectangle it covers.
//!
//! # Orientation
//!
//! Row 0 is the **south** edge (minimum Y) and column 0 is the west edge
//! (minimum X). Formats that store rows north to south (such as ASC) flip
//! the row order when reading and writing.
//!
//! # No-data cells
//!
//! Cells without a measurement are stored as `None`. Writers emit
//! [`NODATA_VALUE`] for them.

use crate::error::{GridError, Result};

/// Sentinel written to files for cells without data.
pub const NODATA_VALUE: f64 = -9999.0;

/// Fraction of a cell added to sample points so that floating-point rounding
/// never drops a sample into the preceding cell.
const SAMPLE_NUDGE: f64 = 1e-6;

/// Relative tolerance used when turning a world-space extent into a cell count.
const EXTENT_TOLERANCE: f64 = 1e-9;

/// A world-space axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Western boundary.
    pub min_x: f64,
    /// Southern boundary.
    pub min_y: f64,
    /// Eastern boundary (exclusive).
    pub max_x: f64,
    /// Northern boundary (exclusive).
    pub max_y: f64,
}

impl Bounds {
    /// Create a new bounding box.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Extent along X.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Extent along Y.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Center point `(x, y)`.
    pub fn center(&self) -> (f64, f64) {
        (
            self.min_x + self.width() / 2.0,
            self.min_y + self.height() / 2.0,
        )
    }

    /// Check whether a point lies inside the half-open rectangle
    /// `[min_x, max_x) × [min_y, max_y)`.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x < self.max_x && y >= self.min_y && y < self.max_y
    }

    /// Smallest rectangle covering both `self` and `other`.
    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }
}

/// Number of whole cells that fit in `extent`.
///
/// Quotients within a relative tolerance of the next integer are rounded up,
/// so `0.3 / 0.1` counts as 3 cells rather than 2.
pub(crate) fn cell_count(extent: f64, cell_size: f64) -> usize {
    let cells = extent / cell_size;
    if !cells.is_finite() || cells <= 0.0 {
        return 0;
    }
    (cells + cells.max(1.0) * EXTENT_TOLERANCE).floor() as usize
}

/// A rectangular grid of elevation samples.
///
/// # Example
///
/// ```
/// use asctools::ElevationGrid;
///
/// let mut grid = ElevationGrid::new(100.0, 200.0, 4, 3, 0.5);
/// grid.set_elevation(100.2, 200.7, Some(12.5));
///
/// assert_eq!(grid.get_elevation(100.4, 200.9), Some(12.5));
/// assert_eq!(grid.get_elevation(99.0, 200.0), None); // outside
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ElevationGrid {
    bounds: Bounds,
    cell_size: f64,
    num_rows: usize,
    num_cols: usize,
    /// Row-major samples, south row first.
    data: Vec<Option<f64>>,
    min_elevation: Option<f64>,
    max_elevation: Option<f64>,
}

impl ElevationGrid {
    /// Create a grid with every cell set to no-data.
    ///
    /// The bounding box is derived from the lower-left corner and the
    /// dimensions, so `max_x - min_x == num_cols * cell_size`.
    ///
    /// # Panics
    ///
    /// Panics if `num_rows * num_cols` overflows `usize`.
    pub fn new(min_x: f64, min_y: f64, num_cols: usize, num_rows: usize, cell_size: f64) -> Self {
        debug_assert!(cell_size > 0.0, "cell size must be positive");
        let bounds = Bounds::new(
            min_x,
            min_y,
            min_x + num_cols as f64 * cell_size,
            min_y + num_rows as f64 * cell_size,
        );
        Self::with_bounds(bounds, num_cols, num_rows, cell_size)
    }

    /// Create a no-data grid over explicit bounds.
    pub(crate) fn with_bounds(
        bounds: Bounds,
        num_cols: usize,
        num_rows: usize,
        cell_size: f64,
    ) -> Self {
        Self {
            bounds,
            cell_size,
            num_rows,
            num_cols,
            data: vec![None; num_rows * num_cols],
            min_elevation: None,
            max_elevation: None,
        }
    }

    /// Build a grid from raw values positioned by their center point.
    ///
    /// This is the entry point used by file readers. The bounding box is
    /// `center ± size / 2`. Every value equal to `nodata` becomes a no-data
    /// cell. `rows` must already be ordered south to north.
    ///
    /// # Errors
    ///
    /// Returns an error if the cell size is not positive, or if `rows` does
    /// not contain exactly `num_rows` rows of `num_cols` values.
    pub fn from_center(
        num_cols: usize,
        num_rows: usize,
        cell_size: f64,
        center_x: f64,
        center_y: f64,
        nodata: f64,
        rows: Vec<Vec<f64>>,
    ) -> Result<Self> {
        let width = num_cols as f64 * cell_size;
        let height = num_rows as f64 * cell_size;
        Self::from_corner(
            num_cols,
            num_rows,
            cell_size,
            center_x - width / 2.0,
            center_y - height / 2.0,
            nodata,
            rows,
        )
    }

    /// Build a grid from raw values positioned by their lower-left corner.
    ///
    /// Same contract as [`ElevationGrid::from_center`].
    pub fn from_corner(
        num_cols: usize,
        num_rows: usize,
        cell_size: f64,
        min_x: f64,
        min_y: f64,
        nodata: f64,
        rows: Vec<Vec<f64>>,
    ) -> Result<Self> {
        validate_cell_size(cell_size)?;
        if num_rows.checked_mul(num_cols).is_none() {
            return Err(GridError::GridTooLarge {
                rows: num_rows,
                cols: num_cols,
            });
        }
        if rows.len() != num_rows {
            return Err(GridError::UnexpectedEof { row: rows.len() });
        }

        let mut grid = Self::new(min_x, min_y, num_cols, num_rows, cell_size);
        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != num_cols {
                return Err(GridError::ColumnCount {
                    row,
                    expected: num_cols,
                    found: values.len(),
                });
            }
            let start = row * num_cols;
            for (slot, value) in grid.data[start..start + num_cols].iter_mut().zip(values) {
                *slot = (!is_nodata(value, nodata)).then_some(value);
            }
        }
        grid.recompute_extrema();
        Ok(grid)
    }

    /// Build a grid from optional values with its lower-left corner at
    /// `(min_x, min_y)`. Rows are ordered south to north.
    ///
    /// # Errors
    ///
    /// Returns an error if the rows are ragged or the cell size is not positive.
    pub fn from_values(
        min_x: f64,
        min_y: f64,
        cell_size: f64,
        rows: Vec<Vec<Option<f64>>>,
    ) -> Result<Self> {
        validate_cell_size(cell_size)?;
        let num_rows = rows.len();
        let num_cols = rows.first().map_or(0, Vec::len);

        let mut data = Vec::with_capacity(num_rows * num_cols);
        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != num_cols {
                return Err(GridError::ColumnCount {
                    row,
                    expected: num_cols,
                    found: values.len(),
                });
            }
            data.extend(values);
        }

        let mut grid = Self::new(min_x, min_y, num_cols, num_rows, cell_size);
        grid.data = data;
        grid.recompute_extrema();
        Ok(grid)
    }

    /// Returns the number of rows.
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Returns the number of columns.
    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    /// Returns the world-space edge length of one cell.
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Returns the world-space bounding box.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Returns the world-space width.
    pub fn width(&self) -> f64 {
        self.num_cols as f64 * self.cell_size
    }

    /// Returns the world-space height.
    pub fn height(&self) -> f64 {
        self.num_rows as f64 * self.cell_size
    }

    /// Returns the center of the bounding box.
    pub fn center(&self) -> (f64, f64) {
        (
            self.bounds.min_x + self.width() / 2.0,
            self.bounds.min_y + self.height() / 2.0,
        )
    }

    /// Lowest elevation among cells with data, or `None` if every cell is no-data.
    pub fn min_elevation(&self) -> Option<f64> {
        self.min_elevation
    }

    /// Highest elevation among cells with data, or `None` if every cell is no-data.
    pub fn max_elevation(&self) -> Option<f64> {
        self.max_elevation
    }

    /// Number of cells holding data.
    pub fn valid_count(&self) -> usize {
        self.data.iter().filter(|v| v.is_some()).count()
    }

    /// Map a world coordinate to its owning `(row, col)`.
    ///
    /// Returns `None` when the point is outside the half-open bounding box.
    pub fn cell_index(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        if !self.bounds.contains(x, y) {
            return None;
        }
        let row = ((y - self.bounds.min_y) / self.cell_size).floor() as usize;
        let col = ((x - self.bounds.min_x) / self.cell_size).floor() as usize;
        (row < self.num_rows && col < self.num_cols).then_some((row, col))
    }

    /// World coordinate of the lower-left corner of a cell.
    pub fn cell_origin(&self, row: usize, col: usize) -> (f64, f64) {
        (
            self.bounds.min_x + col as f64 * self.cell_size,
            self.bounds.min_y + row as f64 * self.cell_size,
        )
    }

    /// A point just inside the lower-left corner of a cell, safe to feed
    /// back through [`ElevationGrid::cell_index`] on any grid sharing this
    /// cell size.
    pub(crate) fn sample_point(&self, row: usize, col: usize) -> (f64, f64) {
        (
            self.bounds.min_x + (col as f64 + SAMPLE_NUDGE) * self.cell_size,
            self.bounds.min_y + (row as f64 + SAMPLE_NUDGE) * self.cell_size,
        )
    }

    /// Elevation at a world coordinate.
    ///
    /// Out-of-bounds coordinates and no-data cells both return `None`; reads
    /// never fail.
    pub fn get_elevation(&self, x: f64, y: f64) -> Option<f64> {
        self.cell_index(x, y).and_then(|(row, col)| self.value(row, col))
    }

    /// Store an elevation at a world coordinate.
    ///
    /// Out-of-bounds coordinates are silently ignored. Storing a value widens
    /// the cached elevation range but never narrows it.
    pub fn set_elevation(&mut self, x: f64, y: f64, value: Option<f64>) {
        if let Some((row, col)) = self.cell_index(x, y) {
            self.set_value(row, col, value);
        }
    }

    /// Elevation at a cell index, or `None` for no-data or out-of-range indices.
    pub fn value(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.num_rows && col < self.num_cols {
            self.data[row * self.num_cols + col]
        } else {
            None
        }
    }

    /// Store an elevation at a cell index. Out-of-range indices are ignored.
    pub fn set_value(&mut self, row: usize, col: usize, value: Option<f64>) {
        if row >= self.num_rows || col >= self.num_cols {
            return;
        }
        self.data[row * self.num_cols + col] = value;
        if let Some(v) = value {
            self.min_elevation = Some(self.min_elevation.map_or(v, |m| m.min(v)));
            self.max_elevation = Some(self.max_elevation.map_or(v, |m| m.max(v)));
        }
    }

    /// One row of samples, west to east. Panics if `index >= num_rows`.
    pub fn row(&self, index: usize) -> &[Option<f64>] {
        let start = index * self.num_cols;
        &self.data[start..start + self.num_cols]
    }

    /// Iterate over rows from south to north. Use `.rev()` for north to south.
    pub fn rows(&self) -> impl DoubleEndedIterator<Item = &[Option<f64>]> + '_ {
        (0..self.num_rows).map(move |index| self.row(index))
    }

    /// Recompute the cached elevation range from every cell.
    pub(crate) fn recompute_extrema(&mut self) {
        let (min, max) = self
            .data
            .iter()
            .flatten()
            .fold((None, None), |(min, max): (Option<f64>, Option<f64>), &v| {
                (
                    Some(min.map_or(v, |m| m.min(v))),
                    Some(max.map_or(v, |m| m.max(v))),
                )
            });
        self.min_elevation = min;
        self.max_elevation = max;
    }
}

/// Whether `value` matches the sentinel, treating a NaN sentinel as matching NaN.
fn is_nodata(value: f64, nodata: f64) -> bool {
    value == nodata || (nodata.is_nan() && value.is_nan())
}

pub(crate) fn validate_cell_size(cell_size: f64) -> Result<()> {
    if cell_size.is_finite() && cell_size > 0.0 {
        Ok(())
    } else {
        Err(GridError::InvalidCellSize { cell_size })
    }
}
