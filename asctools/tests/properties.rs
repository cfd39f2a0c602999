//! Behavioural properties of the grid engine, exercised through the public API.

use std::io::Cursor;

use approx::assert_relative_eq;
use asctools::{merge, read_asc, write_asc, ElevationGrid, GridError};
use tempfile::TempDir;

/// Grid with a smooth, non-uniform surface and no voids.
fn terrain(cols: usize, rows: usize, min_x: f64, min_y: f64) -> ElevationGrid {
    let values = (0..rows)
        .map(|r| {
            (0..cols)
                .map(|c| Some(100.0 + r as f64 * 2.5 - c as f64 * 0.75))
                .collect()
        })
        .collect();
    ElevationGrid::from_values(min_x, min_y, 1.0, values).unwrap()
}

fn uniform(cols: usize, rows: usize, min_x: f64, min_y: f64, value: f64) -> ElevationGrid {
    ElevationGrid::from_values(min_x, min_y, 1.0, vec![vec![Some(value); cols]; rows]).unwrap()
}

#[test]
fn test_asc_round_trip() {
    let text = "ncols 4
nrows 3
xllcenter 502.0
yllcenter 1001.5
cellsize 1.0
NODATA_value -9999
12.5 13 14.25 -9999
11 12 13 14
10 10.5 11 11.125
";
    let grid = read_asc(Cursor::new(text)).unwrap();
    let mut buffer = Vec::new();
    write_asc(&grid, &mut buffer).unwrap();
    let reread = read_asc(Cursor::new(buffer)).unwrap();

    assert_eq!(reread.num_rows(), grid.num_rows());
    assert_eq!(reread.num_cols(), grid.num_cols());
    assert_eq!(reread.cell_size(), grid.cell_size());
    assert!(reread.rows().eq(grid.rows()));
    assert_relative_eq!(reread.bounds().min_x, 500.0);
    assert_relative_eq!(reread.bounds().min_y, 1000.0);
}

#[test]
fn test_crop_is_idempotent() {
    let grid = terrain(10, 8, 0.0, 0.0);
    let once = grid.crop(2.0, 1.0, 7.0, 6.0).unwrap();
    let twice = once.crop(2.0, 1.0, 7.0, 6.0).unwrap();

    assert_eq!(twice, once);
}

#[test]
fn test_crop_reversed_matches_ordered() {
    let grid = terrain(6, 6, 0.0, 0.0);
    assert_eq!(
        grid.crop(5.0, 1.0, 1.0, 4.0).unwrap(),
        grid.crop(1.0, 1.0, 5.0, 4.0).unwrap()
    );
}

#[test]
fn test_merge_single_grid_is_identity() {
    let grid = terrain(5, 4, 10.0, 20.0);
    let merged = merge(std::slice::from_ref(&grid)).unwrap();

    assert_eq!(merged, grid);
}

#[test]
fn test_merge_with_itself_is_identity() {
    let grid = terrain(5, 4, 0.0, 0.0);
    let merged = merge(&[grid.clone(), grid.clone()]).unwrap();

    assert_eq!(merged, grid);
}

#[test]
fn test_merge_later_grid_wins() {
    let a = uniform(4, 4, 0.0, 0.0, 1.0);
    let b = uniform(4, 4, 2.0, 2.0, 2.0);

    let merged = merge(&[a.clone(), b.clone()]).unwrap();
    assert_eq!(merged.get_elevation(3.5, 3.5), Some(2.0));

    let merged = merge(&[b, a]).unwrap();
    assert_eq!(merged.get_elevation(3.5, 3.5), Some(1.0));
}

#[test]
fn test_merge_fills_isolated_hole() {
    let mut grid = uniform(4, 4, 0.0, 0.0, 10.0);
    grid.set_value(2, 2, None);
    assert_eq!(grid.value(2, 2), None);

    let merged = merge(&[grid]).unwrap();
    assert_eq!(merged.value(2, 2), Some(10.0));
    assert_eq!(merged.valid_count(), 16);
}

#[test]
fn test_merge_rejects_mixed_resolutions() {
    let a = uniform(2, 2, 0.0, 0.0, 1.0);
    let b = ElevationGrid::from_values(2.0, 0.0, 0.5, vec![vec![Some(1.0); 4]; 4]).unwrap();

    assert!(matches!(
        merge(&[a, b]),
        Err(GridError::CellSizeMismatch { .. })
    ));
}

#[test]
fn test_denoise_uniform_grid_unchanged() {
    let grid = uniform(9, 7, 0.0, 0.0, 42.0);
    for window in [3, 5, 9, 11] {
        assert_eq!(grid.denoise(window).unwrap(), grid);
    }
}

#[test]
fn test_downscale_exact_block_means() {
    let factor = 3;
    let k = 2;
    let grid = terrain(factor * k, factor * k, 0.0, 0.0);
    let small = grid.downscale(factor).unwrap();

    assert_eq!(small.num_rows(), k);
    assert_eq!(small.num_cols(), k);
    assert_relative_eq!(small.cell_size(), 3.0);

    for row in 0..k {
        for col in 0..k {
            let mut sum = 0.0;
            for r in row * factor..(row + 1) * factor {
                for c in col * factor..(col + 1) * factor {
                    sum += grid.value(r, c).unwrap();
                }
            }
            let expected = sum / (factor * factor) as f64;
            assert_relative_eq!(small.value(row, col).unwrap(), expected, epsilon = 1e-9);
        }
    }

    assert!(matches!(
        grid.downscale(1),
        Err(GridError::InvalidFactor { .. })
    ));
}

#[test]
fn test_split_write_read_merge_restores_grid() {
    let grid = terrain(8, 6, 300.0, 700.0);
    let tiles = grid.split(2, 2, false).unwrap();
    let dir = TempDir::new().unwrap();

    let mut paths = Vec::new();
    for (row, tile_row) in tiles.iter().enumerate() {
        for (col, tile) in tile_row.iter().enumerate() {
            let path = dir.path().join(format!("tile_{}_{}.asc", row, col));
            tile.as_ref().unwrap().write_to_file(&path).unwrap();
            paths.push(path);
        }
    }

    let loaded: Vec<_> = paths
        .iter()
        .map(|path| ElevationGrid::from_file(path).unwrap())
        .collect();
    let merged = merge(&loaded).unwrap();

    assert_eq!(merged.num_rows(), grid.num_rows());
    assert_eq!(merged.num_cols(), grid.num_cols());
    assert!(merged.rows().eq(grid.rows()));
    assert_eq!(merged.min_elevation(), grid.min_elevation());
    assert_eq!(merged.max_elevation(), grid.max_elevation());
}
