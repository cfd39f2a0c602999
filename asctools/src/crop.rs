//! Cropping and tiling.
//!
//! Crops copy cells through the world-coordinate mapping of the source grid,
//! so the output stays aligned with the source's own cell boundaries.

use tracing::debug;

use crate::error::{GridError, Result};
use crate::grid::{cell_count, ElevationGrid};

/// Fraction of a cell by which a crop edge may overshoot the grid and still
/// be clamped instead of rejected.
const EDGE_TOLERANCE: f64 = 1e-9;

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a > b {
        (b, a)
    } else {
        (a, b)
    }
}

impl ElevationGrid {
    /// Crop to a world-space rectangle.
    ///
    /// Start and end are swapped per axis when given in reverse order. The
    /// end coordinate may equal the grid's max bound.
    ///
    /// # Errors
    ///
    /// - [`GridError::CropOutOfRange`] if the rectangle leaves the grid or a
    ///   coordinate is not finite
    /// - [`GridError::EmptyRegion`] if it covers less than one whole cell
    pub fn crop(&self, start_x: f64, start_y: f64, end_x: f64, end_y: f64) -> Result<Self> {
        let (start_x, end_x) = ordered(start_x, end_x);
        let (start_y, end_y) = ordered(start_y, end_y);
        debug!(start_x, start_y, end_x, end_y, "cropping grid");

        let bounds = self.bounds();
        let tolerance = self.cell_size() * EDGE_TOLERANCE;
        let finite = [start_x, start_y, end_x, end_y].iter().all(|v| v.is_finite());
        if !finite
            || start_x < bounds.min_x - tolerance
            || start_y < bounds.min_y - tolerance
            || end_x > bounds.max_x + tolerance
            || end_y > bounds.max_y + tolerance
        {
            return Err(GridError::CropOutOfRange {
                start_x,
                start_y,
                end_x,
                end_y,
                min_x: bounds.min_x,
                min_y: bounds.min_y,
                max_x: bounds.max_x,
                max_y: bounds.max_y,
            });
        }

        let start_x = start_x.max(bounds.min_x);
        let start_y = start_y.max(bounds.min_y);
        let width = end_x.min(bounds.max_x) - start_x;
        let height = end_y.min(bounds.max_y) - start_y;

        let num_cols = cell_count(width, self.cell_size());
        let num_rows = cell_count(height, self.cell_size());
        if num_cols == 0 || num_rows == 0 {
            return Err(GridError::EmptyRegion { width, height });
        }

        let mut result = ElevationGrid::new(start_x, start_y, num_cols, num_rows, self.cell_size());
        for row in 0..num_rows {
            for col in 0..num_cols {
                let (x, y) = result.sample_point(row, col);
                result.set_value(row, col, self.get_elevation(x, y));
            }
        }
        result.recompute_extrema();

        Ok(result)
    }

    /// Crop using fractions of the grid's width and height.
    ///
    /// `(0, 0)` is the south-west corner and `(1, 1)` the north-east corner.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidRelativeCrop`] if any coordinate is outside
    /// `[0, 1]` or the rectangle is degenerate, plus any error from [`ElevationGrid::crop`].
    pub fn crop_relative(
        &self,
        start_x: f64,
        start_y: f64,
        end_x: f64,
        end_y: f64,
    ) -> Result<Self> {
        let (start_x, end_x) = ordered(start_x, end_x);
        let (start_y, end_y) = ordered(start_y, end_y);

        let unit = 0.0..=1.0;
        if !(unit.contains(&start_x)
            && unit.contains(&start_y)
            && unit.contains(&end_x)
            && unit.contains(&end_y))
            || start_x >= end_x
            || start_y >= end_y
        {
            return Err(GridError::InvalidRelativeCrop {
                start_x,
                start_y,
                end_x,
                end_y,
            });
        }

        let bounds = self.bounds();
        let (width, height) = (self.width(), self.height());
        self.crop(
            bounds.min_x + start_x * width,
            bounds.min_y + start_y * height,
            bounds.min_x + end_x * width,
            bounds.min_y + end_y * height,
        )
    }

    /// Split into a `rows × cols` layout of tiles.
    ///
    /// Tiles are indexed `[row][col]` with row 0 along the south edge. With
    /// `uniform` set, tiles are square with side `min(width / cols, height / rows)`
    /// and the strip left over along the north or east edge is discarded.
    /// Tiles too small to hold a whole cell are `None`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidTileCount`] if `rows` or `cols` is zero.
    pub fn split(
        &self,
        rows: usize,
        cols: usize,
        uniform: bool,
    ) -> Result<Vec<Vec<Option<ElevationGrid>>>> {
        if rows == 0 || cols == 0 {
            return Err(GridError::InvalidTileCount { rows, cols });
        }

        let mut tile_width = self.width() / cols as f64;
        let mut tile_height = self.height() / rows as f64;
        if uniform {
            let side = tile_width.min(tile_height);
            tile_width = side;
            tile_height = side;
        }
        let usable_width = tile_width * cols as f64;
        let usable_height = tile_height * rows as f64;
        debug!(rows, cols, tile_width, tile_height, uniform, "splitting grid");

        let bounds = self.bounds();
        let mut tiles = Vec::with_capacity(rows);
        for row in 0..rows {
            let mut tile_row = Vec::with_capacity(cols);
            for col in 0..cols {
                let start_x = col as f64 * tile_width;
                let start_y = row as f64 * tile_height;
                let end_x = (start_x + tile_width).min(usable_width);
                let end_y = (start_y + tile_height).min(usable_height);

                let tile = match self.crop(
                    bounds.min_x + start_x,
                    bounds.min_y + start_y,
                    bounds.min_x + end_x,
                    bounds.min_y + end_y,
                ) {
                    Ok(tile) => Some(tile),
                    Err(GridError::EmptyRegion { .. }) => None,
                    Err(err) => return Err(err),
                };
                tile_row.push(tile);
            }
            tiles.push(tile_row);
        }

        Ok(tiles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Grid whose cell (row, col) holds `row * 100 + col`.
    fn ramp(cols: usize, rows: usize) -> ElevationGrid {
        let values = (0..rows)
            .map(|r| (0..cols).map(|c| Some((r * 100 + c) as f64)).collect())
            .collect();
        ElevationGrid::from_values(0.0, 0.0, 1.0, values).unwrap()
    }

    #[test]
    fn test_crop_copies_cells() {
        let grid = ramp(6, 5);
        let cropped = grid.crop(1.0, 2.0, 4.0, 4.0).unwrap();

        assert_eq!(cropped.num_cols(), 3);
        assert_eq!(cropped.num_rows(), 2);
        assert_eq!(cropped.value(0, 0), Some(201.0));
        assert_eq!(cropped.value(1, 2), Some(303.0));
        assert_eq!(cropped.min_elevation(), Some(201.0));
        assert_eq!(cropped.max_elevation(), Some(303.0));
        assert_relative_eq!(cropped.bounds().max_x, 4.0);
    }

    #[test]
    fn test_crop_swaps_reversed_coordinates() {
        let grid = ramp(6, 5);
        let forward = grid.crop(1.0, 1.0, 3.0, 4.0).unwrap();
        let reversed = grid.crop(3.0, 4.0, 1.0, 1.0).unwrap();

        assert_eq!(forward, reversed);
    }

    #[test]
    fn test_crop_full_extent() {
        let grid = ramp(4, 3);
        let cropped = grid.crop(0.0, 0.0, 4.0, 3.0).unwrap();

        assert_eq!(cropped, grid);
    }

    #[test]
    fn test_crop_snaps_to_source_cells() {
        let grid = ramp(6, 1);
        // Starts inside column 1, so every output cell copies the source
        // cell holding its lower-left corner.
        let cropped = grid.crop(1.5, 0.0, 4.5, 1.0).unwrap();

        assert_eq!(cropped.num_cols(), 3);
        assert_eq!(cropped.row(0), &[Some(1.0), Some(2.0), Some(3.0)]);
    }

    #[test]
    fn test_crop_errors() {
        let grid = ramp(4, 4);

        assert!(matches!(
            grid.crop(-1.0, 0.0, 2.0, 2.0),
            Err(GridError::CropOutOfRange { .. })
        ));
        assert!(matches!(
            grid.crop(0.0, 0.0, 2.0, 4.5),
            Err(GridError::CropOutOfRange { .. })
        ));
        assert!(matches!(
            grid.crop(1.0, 1.0, 1.0, 3.0),
            Err(GridError::EmptyRegion { .. })
        ));
        assert!(matches!(
            grid.crop(1.0, 1.0, 1.5, 3.0),
            Err(GridError::EmptyRegion { .. })
        ));
    }

    #[test]
    fn test_crop_keeps_nodata() {
        let grid = ElevationGrid::from_values(
            0.0,
            0.0,
            1.0,
            vec![vec![Some(1.0), None], vec![Some(2.0), Some(3.0)]],
        )
        .unwrap();
        let cropped = grid.crop(1.0, 0.0, 2.0, 2.0).unwrap();

        assert_eq!(cropped.value(0, 0), None);
        assert_eq!(cropped.value(1, 0), Some(3.0));
        assert_eq!(cropped.min_elevation(), Some(3.0));
    }

    #[test]
    fn test_crop_relative() {
        let grid = ramp(4, 4);
        let relative = grid.crop_relative(0.5, 0.0, 1.0, 0.5).unwrap();
        let absolute = grid.crop(2.0, 0.0, 4.0, 2.0).unwrap();

        assert_eq!(relative, absolute);
        assert_eq!(grid.crop_relative(1.0, 1.0, 0.0, 0.0).unwrap(), grid);
    }

    #[test]
    fn test_crop_relative_validation() {
        let grid = ramp(4, 4);

        assert!(matches!(
            grid.crop_relative(-0.1, 0.0, 0.5, 0.5),
            Err(GridError::InvalidRelativeCrop { .. })
        ));
        assert!(matches!(
            grid.crop_relative(0.0, 0.0, 1.5, 0.5),
            Err(GridError::InvalidRelativeCrop { .. })
        ));
        assert!(matches!(
            grid.crop_relative(0.5, 0.0, 0.5, 1.0),
            Err(GridError::InvalidRelativeCrop { .. })
        ));
    }

    #[test]
    fn test_split_even() {
        let grid = ramp(4, 4);
        let tiles = grid.split(2, 2, false).unwrap();

        assert_eq!(tiles.len(), 2);
        assert!(tiles.iter().all(|row| row.len() == 2));

        let north_east = tiles[1][1].as_ref().unwrap();
        assert_eq!(north_east.num_rows(), 2);
        assert_eq!(north_east.num_cols(), 2);
        assert_eq!(north_east.value(0, 0), Some(202.0));
        assert_relative_eq!(north_east.bounds().min_x, 2.0);
        assert_relative_eq!(north_east.bounds().min_y, 2.0);
    }

    #[test]
    fn test_split_uniform_discards_remainder() {
        let grid = ramp(6, 4);
        let tiles = grid.split(2, 2, true).unwrap();

        for tile in tiles.iter().flatten() {
            let tile = tile.as_ref().unwrap();
            assert_eq!(tile.num_cols(), 2);
            assert_eq!(tile.num_rows(), 2);
        }
        let last = tiles[1][1].as_ref().unwrap();
        assert_relative_eq!(last.bounds().max_x, 4.0);
    }

    #[test]
    fn test_split_tiles_smaller_than_a_cell_are_absent() {
        let grid = ramp(3, 3);
        let tiles = grid.split(1, 4, false).unwrap();

        assert_eq!(tiles[0].len(), 4);
        assert!(tiles[0].iter().all(Option::is_none));
    }

    #[test]
    fn test_split_invalid_layout() {
        let grid = ramp(3, 3);
        assert!(matches!(
            grid.split(0, 2, false),
            Err(GridError::InvalidTileCount { rows: 0, cols: 2 })
        ));
    }

    #[test]
    fn test_crop_rejects_non_finite_coordinates() {
        let grid = ramp(4, 4);

        for (start_x, end_y) in [(f64::NAN, 2.0), (0.0, f64::INFINITY), (f64::NEG_INFINITY, 2.0)] {
            assert!(matches!(
                grid.crop(start_x, 0.0, 2.0, end_y),
                Err(GridError::CropOutOfRange { .. })
            ));
        }
    }
}
