use anyhow::{Context, Result};
use std::path::PathBuf;

use super::{read_grid, write_grid};

pub fn run(input: Option<PathBuf>, output: Option<PathBuf>, window: usize) -> Result<()> {
    let grid = read_grid(input.as_deref())?;
    let filtered = grid.denoise(window).context("Failed to denoise grid")?;
    write_grid(&filtered, output)
}
