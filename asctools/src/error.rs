//! Error types for the asctools library.

use thiserror::Error;

/// Errors that can occur when reading, transforming or writing elevation grids.
#[derive(Error, Debug)]
pub enum GridError {
    /// IO error when reading or writing files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A mandatory header key was never seen.
    #[error("Missing header key: {key}")]
    MissingHeader { key: &'static str },

    /// A header line could not be understood.
    #[error("Invalid header at line {line}: {content}")]
    InvalidHeader { line: usize, content: String },

    /// A number in the file could not be parsed.
    #[error("Invalid value at line {line}: {value:?}")]
    InvalidValue { line: usize, value: String },

    /// The data section ended before all rows were read.
    #[error("Unexpected end of file at row {row}")]
    UnexpectedEof { row: usize },

    /// A data row did not contain `ncols` values.
    #[error("Wrong number of columns at row {row}: expected {expected}, found {found}")]
    ColumnCount {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// The cell count does not fit in memory addressing.
    #[error("Grid of {rows}x{cols} cells is too large")]
    GridTooLarge { rows: usize, cols: usize },

    /// Cell size must be a positive, finite number.
    #[error("Invalid cell size: {cell_size}")]
    InvalidCellSize { cell_size: f64 },

    /// Median filter window must be odd and at least 3.
    #[error("Window size must be an odd number greater than or equal to 3 (got {size})")]
    InvalidWindowSize { size: usize },

    /// Downscale factor must be greater than 1.
    #[error("Downscale factor must be greater than 1 (got {factor})")]
    InvalidFactor { factor: usize },

    /// Downscale factor leaves no rows or columns.
    #[error("Downscale factor {factor} is too large for a {rows}x{cols} grid")]
    FactorTooLarge {
        factor: usize,
        rows: usize,
        cols: usize,
    },

    /// Crop rectangle reaches outside the grid.
    #[error(
        "Crop rectangle ({start_x}, {start_y})-({end_x}, {end_y}) is outside grid bounds \
         ({min_x}, {min_y})-({max_x}, {max_y})"
    )]
    CropOutOfRange {
        start_x: f64,
        start_y: f64,
        end_x: f64,
        end_y: f64,
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
    },

    /// Region has zero area or covers less than one cell.
    #[error("Region {width}x{height} does not cover a whole cell")]
    EmptyRegion { width: f64, height: f64 },

    /// Relative crop coordinates must lie in [0, 1] with start < end.
    #[error("Invalid relative coordinates ({start_x}, {start_y})-({end_x}, {end_y})")]
    InvalidRelativeCrop {
        start_x: f64,
        start_y: f64,
        end_x: f64,
        end_y: f64,
    },

    /// Split requested zero rows or columns.
    #[error("Invalid tile layout: {rows} rows x {cols} cols")]
    InvalidTileCount { rows: usize, cols: usize },

    /// Grids with different resolutions cannot be combined.
    #[error("Incompatible cell sizes: expected {expected}, found {found}")]
    CellSizeMismatch { expected: f64, found: f64 },

    /// Merge was called with no grids.
    #[error("No grids to merge")]
    EmptyMerge,

    /// Output scale must be positive.
    #[error("Scale must be greater than 0 (got {scale})")]
    InvalidScale { scale: f64 },

    /// Difference emphasis exponent must be positive.
    #[error("Exponent must be greater than 0 (got {exponent})")]
    InvalidExponent { exponent: f64 },

    /// PNG encoding failed.
    #[cfg(feature = "render")]
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Result type alias using [`GridError`].
pub type Result<T> = std::result::Result<T, GridError>;
