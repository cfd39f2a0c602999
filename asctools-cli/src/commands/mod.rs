pub mod crop;
pub mod denoise;
pub mod downscale;
pub mod info;
pub mod merge;
pub mod png;
pub mod split;
pub mod stl;
pub mod subtract;

use anyhow::{Context, Result};
use asctools::{read_asc, write_asc, ElevationGrid};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Read a grid from `input`, or from stdin when no path is given.
pub fn read_grid(input: Option<&Path>) -> Result<ElevationGrid> {
    match input {
        Some(path) => ElevationGrid::from_file(path)
            .with_context(|| format!("Failed to read grid from {}", path.display())),
        None => read_asc(std::io::stdin().lock()).context("Failed to read grid from stdin"),
    }
}

/// Open `output` for writing, or stdout when no path is given.
pub fn create_output(output: Option<&Path>) -> Result<Box<dyn Write>> {
    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(std::io::stdout().lock()))),
    }
}

/// Write a grid as ASC to `output`, or stdout when no path is given.
pub fn write_grid(grid: &ElevationGrid, output: Option<PathBuf>) -> Result<()> {
    let mut writer = create_output(output.as_deref())?;
    write_asc(grid, &mut writer).context("Failed to write grid")?;
    writer.flush()?;

    if let Some(path) = output {
        eprintln!("Output written to: {}", path.display());
    }
    Ok(())
}
