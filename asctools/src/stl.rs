//! Binary STL export for 3D printing.
//!
//! The grid becomes a closed solid: a terrain surface through the cell
//! centres, vertical walls around the outline and a flat base at the floor
//! elevation. No-data cells drop to the floor.

use std::io::Write;

use tracing::debug;

use crate::error::{GridError, Result};
use crate::grid::ElevationGrid;

type Vertex = [f32; 3];
type Triangle = [Vertex; 3];

/// Options for [`write_stl`].
#[derive(Debug, Clone, Copy)]
pub struct StlOptions {
    /// Multiplier applied to every coordinate.
    pub scale: f64,
    /// Elevation of the base. Defaults to the lowest elevation minus `floor_margin`.
    pub floor: Option<f64>,
    /// Distance between the lowest elevation and the base when `floor` is unset.
    pub floor_margin: f64,
}

impl Default for StlOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            floor: None,
            floor_margin: 0.0,
        }
    }
}

impl StlOptions {
    /// Set the coordinate multiplier.
    pub fn scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Fix the base elevation.
    pub fn floor(mut self, floor: f64) -> Self {
        self.floor = Some(floor);
        self
    }

    /// Set the margin below the lowest elevation.
    pub fn floor_margin(mut self, margin: f64) -> Self {
        self.floor_margin = margin;
        self
    }
}

fn face_normal(a: Vertex, b: Vertex, c: Vertex) -> Vertex {
    let u = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
    let v = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
    let n = [
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ];
    let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
    if len > 0.0 {
        [n[0] / len, n[1] / len, n[2] / len]
    } else {
        [0.0, 0.0, 0.0]
    }
}

/// Build the triangles of the solid. X/Y are relative to the grid's
/// south-west corner and Z to the floor.
fn build_solid(grid: &ElevationGrid, floor: f64, scale: f64) -> Vec<Triangle> {
    let (rows, cols) = (grid.num_rows(), grid.num_cols());
    let cell = grid.cell_size();

    let top = |row: usize, col: usize| -> Vertex {
        let z = grid.value(row, col).unwrap_or(floor) - floor;
        [
            ((col as f64 + 0.5) * cell * scale) as f32,
            ((row as f64 + 0.5) * cell * scale) as f32,
            (z * scale) as f32,
        ]
    };
    let base = |row: usize, col: usize| -> Vertex {
        let [x, y, _] = top(row, col);
        [x, y, 0.0]
    };

    let mut triangles = Vec::with_capacity(4 * rows * cols);
    for row in 0..rows - 1 {
        for col in 0..cols - 1 {
            let (a, b, c, d) = (
                (row, col),
                (row, col + 1),
                (row + 1, col + 1),
                (row + 1, col),
            );
            // Counter-clockwise seen from above for the surface, clockwise for the base.
            triangles.push([top(a.0, a.1), top(b.0, b.1), top(c.0, c.1)]);
            triangles.push([top(a.0, a.1), top(c.0, c.1), top(d.0, d.1)]);
            triangles.push([base(a.0, a.1), base(c.0, c.1), base(b.0, b.1)]);
            triangles.push([base(a.0, a.1), base(d.0, d.1), base(c.0, c.1)]);
        }
    }

    // Walk the outline counter-clockwise so each wall faces outwards.
    let outline = (0..cols)
        .map(|col| (0, col))
        .chain((1..rows).map(|row| (row, cols - 1)))
        .chain((0..cols - 1).rev().map(|col| (rows - 1, col)))
        .chain((0..rows - 1).rev().map(|row| (row, 0)))
        .collect::<Vec<_>>();
    for pair in outline.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        triangles.push([base(a.0, a.1), base(b.0, b.1), top(b.0, b.1)]);
        triangles.push([base(a.0, a.1), top(b.0, b.1), top(a.0, a.1)]);
    }

    triangles
}

/// Write the grid as a binary STL solid.
///
/// # Errors
///
/// - [`GridError::InvalidScale`] if `scale` is not positive
/// - [`GridError::EmptyRegion`] if the grid has fewer than 2 rows or columns
pub fn write_stl<W: Write>(
    grid: &ElevationGrid,
    options: &StlOptions,
    mut writer: W,
) -> Result<()> {
    let scale = options.scale;
    if !(scale.is_finite() && scale > 0.0) {
        return Err(GridError::InvalidScale { scale });
    }
    if grid.num_rows() < 2 || grid.num_cols() < 2 {
        return Err(GridError::EmptyRegion {
            width: grid.width(),
            height: grid.height(),
        });
    }

    let floor = options
        .floor
        .unwrap_or_else(|| grid.min_elevation().unwrap_or(0.0) - options.floor_margin);
    let triangles = build_solid(grid, floor, scale);
    debug!(triangles = triangles.len(), floor, scale, "writing STL");

    let mut header = [0u8; 80];
    let tag = b"asctools binary stl";
    header[..tag.len()].copy_from_slice(tag);
    writer.write_all(&header)?;
    writer.write_all(&(triangles.len() as u32).to_le_bytes())?;

    for [a, b, c] in &triangles {
        for vertex in [face_normal(*a, *b, *c), *a, *b, *c] {
            for component in vertex {
                writer.write_all(&component.to_le_bytes())?;
            }
        }
        writer.write_all(&0u16.to_le_bytes())?;
    }
    writer.flush()?;

    Ok(())
}
