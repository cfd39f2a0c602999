use anyhow::{Context, Result};
use asctools::render::{write_difference_png, write_png, PngOptions};
use std::io::Write;
use std::path::PathBuf;

use super::{create_output, read_grid};

pub fn run(
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    absolute_elevation: bool,
    scale: f64,
) -> Result<()> {
    let grid = read_grid(input.as_deref())?;
    let options = PngOptions::default()
        .absolute(absolute_elevation)
        .scale(scale);

    let mut writer = create_output(output.as_deref())?;
    write_png(&grid, &options, &mut writer).context("Failed to render PNG")?;
    writer.flush()?;
    Ok(())
}

pub fn run_diff(
    input1: PathBuf,
    input2: PathBuf,
    output: Option<PathBuf>,
    diff_pow: f64,
    skip_elevation: bool,
    scale: f64,
) -> Result<()> {
    let a = read_grid(Some(input1.as_path()))?;
    let b = read_grid(Some(input2.as_path()))?;

    let mut writer = create_output(output.as_deref())?;
    write_difference_png(&a, &b, diff_pow, skip_elevation, scale, &mut writer)
        .context("Failed to render difference")?;
    writer.flush()?;
    Ok(())
}
