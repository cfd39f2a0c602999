use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};

use asctools::ElevationGrid;

use super::write_grid;

pub fn run(input_dir: PathBuf, output: Option<PathBuf>) -> Result<()> {
    let paths = find_grids(&input_dir)?;
    if paths.is_empty() {
        bail!("No .asc files found in {}", input_dir.display());
    }

    let pb = ProgressBar::new(paths.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
            )?
            .progress_chars("#>-"),
    );

    let mut grids = Vec::with_capacity(paths.len());
    for path in &paths {
        pb.set_message(file_name(path));
        match ElevationGrid::from_file(path) {
            Ok(grid) => grids.push(grid),
            Err(err) => {
                pb.suspend(|| tracing::warn!(path = %path.display(), %err, "skipping file"));
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    if grids.is_empty() {
        bail!("None of the files in {} could be read", input_dir.display());
    }

    let merged = asctools::merge(&grids).context("Failed to merge grids")?;
    eprintln!(
        "Merged {} of {} files into a {}x{} grid",
        grids.len(),
        paths.len(),
        merged.num_cols(),
        merged.num_rows()
    );

    write_grid(&merged, output)
}

/// `.asc` files directly inside `dir`, sorted by name.
fn find_grids(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let is_asc = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("asc"));
        if is_asc && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
