use anyhow::{Context, Result};
use std::path::PathBuf;

use super::{read_grid, write_grid};

pub fn run(input1: PathBuf, input2: PathBuf, output: Option<PathBuf>) -> Result<()> {
    let a = read_grid(Some(input1.as_path()))?;
    let b = read_grid(Some(input2.as_path()))?;

    let difference = a.subtract(&b).context("Failed to subtract grids")?;
    write_grid(&difference, output)
}
