use anyhow::{Context, Result};
use asctools::{write_stl, StlOptions};
use std::io::Write;
use std::path::PathBuf;

use super::{create_output, read_grid};

pub fn run(
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    scale: f64,
    floor: Option<f64>,
    floor_margin: f64,
) -> Result<()> {
    let grid = read_grid(input.as_deref())?;

    let mut options = StlOptions::default().scale(scale).floor_margin(floor_margin);
    if let Some(floor) = floor {
        options = options.floor(floor);
    }

    let mut writer = create_output(output.as_deref())?;
    write_stl(&grid, &options, &mut writer).context("Failed to write STL")?;
    writer.flush()?;
    Ok(())
}
