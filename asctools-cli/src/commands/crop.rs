use anyhow::{Context, Result};
use std::path::PathBuf;

use super::{read_grid, write_grid};

/// Crop to `[start_x, start_y, end_x, end_y]`. Unset coordinates default to
/// the grid's full extent.
pub fn run(
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    relative: bool,
    [start_x, start_y, end_x, end_y]: [Option<f64>; 4],
) -> Result<()> {
    let grid = read_grid(input.as_deref())?;

    let cropped = if relative {
        grid.crop_relative(
            start_x.unwrap_or(0.0),
            start_y.unwrap_or(0.0),
            end_x.unwrap_or(1.0),
            end_y.unwrap_or(1.0),
        )
    } else {
        let bounds = grid.bounds();
        grid.crop(
            start_x.unwrap_or(bounds.min_x),
            start_y.unwrap_or(bounds.min_y),
            end_x.unwrap_or(bounds.max_x),
            end_y.unwrap_or(bounds.max_y),
        )
    }
    .context("Failed to crop grid")?;

    write_grid(&cropped, output)
}
