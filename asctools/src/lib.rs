//! # asctools - Elevation Grid Toolkit
//!
//! Library for manipulating raster elevation grids stored in the ArcGIS
//! ASCII (`.asc`) format.
//!
//! ## Features
//!
//! - **Crop** by world coordinates or by fractions of the extent
//! - **Split** into a layout of tiles, optionally square
//! - **Merge** adjacent or overlapping tiles, repairing single-cell holes
//! - **Denoise** with a median filter that ignores no-data cells
//! - **Downscale** by block averaging
//! - **Render** to 16-bit grayscale or raw-elevation PNG (`render` feature)
//!   and to binary STL
//!
//! ## Quick Start
//!
//! ```ignore
//! use asctools::{merge, ElevationGrid};
//!
//! let west = ElevationGrid::from_file("tiles/west.asc")?;
//! let east = ElevationGrid::from_file("tiles/east.asc")?;
//!
//! let merged = merge(&[west, east])?;
//! let smooth = merged.denoise(3)?.downscale(2)?;
//! smooth.write_to_file("merged.asc")?;
//! ```
//!
//! ## Coordinates
//!
//! Every grid covers the half-open rectangle `[min_x, max_x) × [min_y, max_y)`
//! divided into square cells. Row 0 is the south edge. Reading outside the
//! rectangle returns `None` and writing outside it does nothing, so
//! algorithms can sweep a larger region without bounds checks.
//!
//! ## No-data
//!
//! Missing samples are `None`. In files they are written as
//! [`NODATA_VALUE`] (`-9999`).

pub mod asc;
mod crop;
mod difference;
pub mod error;
mod filter;
pub mod grid;
pub mod merge;
#[cfg(feature = "render")]
pub mod render;
pub mod stl;

// Re-export main types at crate root for convenience
pub use asc::{read_asc, write_asc};
pub use error::{GridError, Result};
pub use grid::{Bounds, ElevationGrid, NODATA_VALUE};
pub use merge::merge;
pub use stl::{write_stl, StlOptions};

#[cfg(feature = "render")]
pub use render::{write_png, PngOptions};
