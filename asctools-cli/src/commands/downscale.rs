use anyhow::{Context, Result};
use std::path::PathBuf;

use super::{read_grid, write_grid};

pub fn run(input: Option<PathBuf>, output: Option<PathBuf>, factor: usize) -> Result<()> {
    let grid = read_grid(input.as_deref())?;
    let reduced = grid.downscale(factor).context("Failed to downscale grid")?;

    tracing::info!(
        cols = reduced.num_cols(),
        rows = reduced.num_rows(),
        cell_size = reduced.cell_size(),
        "downscaled"
    );
    write_grid(&reduced, output)
}
