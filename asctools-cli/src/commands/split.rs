use anyhow::{Context, Result};
use std::path::PathBuf;

use super::read_grid;

pub fn run(
    input: Option<PathBuf>,
    output_dir: PathBuf,
    rows: usize,
    cols: usize,
    uniform: bool,
    prefix: &str,
) -> Result<()> {
    let grid = read_grid(input.as_deref())?;
    let tiles = grid
        .split(rows, cols, uniform)
        .context("Failed to split grid")?;

    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let mut written = 0;
    for (row, tile_row) in tiles.iter().enumerate() {
        for (col, tile) in tile_row.iter().enumerate() {
            let Some(tile) = tile else {
                tracing::warn!(row, col, "tile smaller than one cell, skipped");
                continue;
            };

            let path = output_dir.join(format!("{}_{}_{}.asc", prefix, row, col));
            tile.write_to_file(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!(
                "Created tile: {} ({}x{})",
                path.display(),
                tile.num_cols(),
                tile.num_rows()
            );
            written += 1;
        }
    }

    println!();
    println!("Split into {} tiles ({} rows x {} cols)", written, rows, cols);
    Ok(())
}
