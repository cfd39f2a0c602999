use anyhow::Result;
use asctools::ElevationGrid;
use serde::Serialize;
use std::path::PathBuf;

use super::read_grid;

#[derive(Serialize)]
struct GridInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_size: Option<u64>,
    ncols: usize,
    nrows: usize,
    cell_size: f64,
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
    min_elevation: Option<f64>,
    max_elevation: Option<f64>,
    valid_cells: usize,
    nodata_cells: usize,
}

impl GridInfo {
    fn new(grid: &ElevationGrid, path: Option<PathBuf>) -> Self {
        let file_size = path
            .as_ref()
            .and_then(|p| std::fs::metadata(p).ok())
            .map(|m| m.len());
        let bounds = grid.bounds();
        let valid_cells = grid.valid_count();

        Self {
            path,
            file_size,
            ncols: grid.num_cols(),
            nrows: grid.num_rows(),
            cell_size: grid.cell_size(),
            min_x: bounds.min_x,
            min_y: bounds.min_y,
            max_x: bounds.max_x,
            max_y: bounds.max_y,
            min_elevation: grid.min_elevation(),
            max_elevation: grid.max_elevation(),
            valid_cells,
            nodata_cells: grid.num_cols() * grid.num_rows() - valid_cells,
        }
    }
}

pub fn run(input: Option<PathBuf>, json: bool) -> Result<()> {
    let grid = read_grid(input.as_deref())?;
    let info = GridInfo::new(&grid, input);

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    if let Some(path) = &info.path {
        println!("Grid: {}", path.display());
    }
    if let Some(size) = info.file_size {
        let cells = (info.ncols * info.nrows).max(1) as f64;
        println!(
            "File size: {} ({:.1} bytes per cell)",
            format_size(size),
            size as f64 / cells
        );
    }
    println!();
    println!(
        "Size: {}x{} cells ({} x {} units)",
        info.ncols,
        info.nrows,
        grid.width(),
        grid.height()
    );
    println!("Cell size: {}", info.cell_size);
    println!(
        "Bounds: ({}, {}) - ({}, {})",
        info.min_x, info.min_y, info.max_x, info.max_y
    );
    println!();

    match (info.min_elevation, info.max_elevation) {
        (Some(min), Some(max)) => {
            println!("Min elevation: {}", min);
            println!("Max elevation: {}", max);
        }
        _ => println!("No elevation data"),
    }

    if info.nodata_cells > 0 {
        let total = (info.ncols * info.nrows) as f64;
        let pct = info.nodata_cells as f64 / total * 100.0;
        println!("No-data cells: {} ({:.1}%)", info.nodata_cells, pct);
    }

    Ok(())
}

/// Human-readable file size in binary units.
fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 3] = ["KB", "MB", "GB"];

    let mut size = bytes as f64;
    let mut unit = None;
    for next in UNITS {
        if size < 1024.0 {
            break;
        }
        size /= 1024.0;
        unit = Some(next);
    }
    match unit {
        Some(unit) => format!("{:.2} {}", size, unit),
        None => format!("{} bytes", bytes),
    }
}
