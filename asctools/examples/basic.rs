//! Basic example demonstrating asctools library usage.
//!
//! Run with: cargo run --example basic -- /path/to/grid.asc

use asctools::{merge, ElevationGrid, GridError};
use std::env;

fn main() -> Result<(), GridError> {
    let path = env::args().nth(1).unwrap_or_else(|| {
        eprintln!("Usage: cargo run --example basic -- /path/to/grid.asc");
        std::process::exit(1);
    });

    let grid = ElevationGrid::from_file(&path)?;
    let bounds = grid.bounds();
    println!("{}: {}x{} cells", path, grid.num_cols(), grid.num_rows());
    println!(
        "  Bounds: ({}, {}) - ({}, {})",
        bounds.min_x, bounds.min_y, bounds.max_x, bounds.max_y
    );

    let (x, y) = grid.center();
    match grid.get_elevation(x, y) {
        Some(elevation) => println!("  Elevation at centre: {}", elevation),
        None => println!("  No data at centre"),
    }

    // Split into quadrants, smooth each one and stitch them back together.
    let tiles: Vec<ElevationGrid> = grid
        .split(2, 2, false)?
        .into_iter()
        .flatten()
        .flatten()
        .map(|tile| tile.denoise(3))
        .collect::<Result<_, GridError>>()?;
    let smoothed = merge(&tiles)?;

    println!("\nAfter denoising:");
    println!("  Min elevation: {:?}", smoothed.min_elevation());
    println!("  Max elevation: {:?}", smoothed.max_elevation());

    if grid.num_cols() >= 4 && grid.num_rows() >= 4 {
        let coarse = smoothed.downscale(2)?;
        println!(
            "  Downscaled: {}x{} cells of size {}",
            coarse.num_cols(),
            coarse.num_rows(),
            coarse.cell_size()
        );
    }

    Ok(())
}
