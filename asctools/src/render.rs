//! PNG rendering of elevation grids.
//!
//! Requires the `render` feature.
//!
//! Images are north-up: pixel row 0 is the grid's north edge and pixel
//! column 0 its west edge. One pixel per cell before scaling.

use std::io::Write;

use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageBuffer, Luma, Rgba, RgbaImage};
use tracing::debug;

use crate::error::{GridError, Result};
use crate::grid::ElevationGrid;

/// 16-bit grayscale image buffer.
pub type Gray16Image = ImageBuffer<Luma<u16>, Vec<u16>>;

/// Options for [`write_png`].
#[derive(Debug, Clone, Copy)]
pub struct PngOptions {
    /// Output pixels per cell along each axis (nearest-neighbour resampling).
    pub scale: f64,
    /// Encode raw elevations instead of a normalized grayscale.
    pub absolute: bool,
}

impl Default for PngOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            absolute: false,
        }
    }
}

impl PngOptions {
    /// Set the output scale.
    pub fn scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Select raw elevation encoding.
    pub fn absolute(mut self, absolute: bool) -> Self {
        self.absolute = absolute;
        self
    }
}

/// Position of a cell in a north-up image.
fn pixel(grid: &ElevationGrid, row: usize, col: usize) -> (u32, u32) {
    (col as u32, (grid.num_rows() - 1 - row) as u32)
}

/// Elevation mapped to `[0, 1]` over the grid's elevation range.
fn normalize(value: f64, min: f64, max: f64) -> f64 {
    let range = max - min;
    if range > 0.0 {
        ((value - min) / range).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Render elevations as 16-bit grayscale, lowest elevation black and
/// highest white. No-data cells are black.
pub fn render_grayscale(grid: &ElevationGrid) -> Gray16Image {
    let mut img = Gray16Image::new(grid.num_cols() as u32, grid.num_rows() as u32);
    let (Some(min), Some(max)) = (grid.min_elevation(), grid.max_elevation()) else {
        return img;
    };

    for (row, values) in grid.rows().enumerate() {
        for (col, value) in values.iter().enumerate() {
            if let Some(v) = value {
                let (x, y) = pixel(grid, row, col);
                let gray = (normalize(*v, min, max) * u16::MAX as f64) as u16;
                img.put_pixel(x, y, Luma([gray]));
            }
        }
    }
    img
}

/// Render raw elevations into RGBA channels.
///
/// Red holds the high byte and green the low byte of `floor(elevation)`,
/// blue the fractional part scaled to 0-255. No-data cells are fully
/// transparent.
pub fn render_absolute(grid: &ElevationGrid) -> RgbaImage {
    let mut img = RgbaImage::new(grid.num_cols() as u32, grid.num_rows() as u32);

    for (row, values) in grid.rows().enumerate() {
        for (col, value) in values.iter().enumerate() {
            let (x, y) = pixel(grid, row, col);
            let color = match value {
                Some(v) => {
                    let whole = v.floor();
                    let int = whole as i64;
                    Rgba([
                        ((int >> 8) & 0xFF) as u8,
                        (int & 0xFF) as u8,
                        ((v - whole) * 255.0) as u8,
                        255,
                    ])
                }
                None => Rgba([0, 0, 0, 0]),
            };
            img.put_pixel(x, y, color);
        }
    }
    img
}

/// Render the difference `a - b` over `a`'s extent.
///
/// Raised cells are tinted red and lowered cells blue, with intensity
/// `(|d| / max|d|)^exponent`. Unless `skip_elevation` is set the tint is
/// blended over `a`'s grayscale elevation; otherwise over black. Cells
/// without data in either grid are transparent.
///
/// # Errors
///
/// Returns an error if the cell sizes differ or `exponent` is not positive.
pub fn render_difference(
    a: &ElevationGrid,
    b: &ElevationGrid,
    exponent: f64,
    skip_elevation: bool,
) -> Result<RgbaImage> {
    if !(exponent.is_finite() && exponent > 0.0) {
        return Err(GridError::InvalidExponent { exponent });
    }

    let diff = a.subtract(b)?;
    let max_abs = diff
        .min_elevation()
        .zip(diff.max_elevation())
        .map_or(0.0, |(min, max)| min.abs().max(max.abs()));
    let (min, max) = a
        .min_elevation()
        .zip(a.max_elevation())
        .unwrap_or((0.0, 0.0));
    debug!(max_abs, exponent, skip_elevation, "rendering difference");

    let mut img = RgbaImage::new(a.num_cols() as u32, a.num_rows() as u32);
    for (row, values) in diff.rows().enumerate() {
        for (col, d) in values.iter().enumerate() {
            let Some(d) = d else {
                continue;
            };
            let base = match (skip_elevation, a.value(row, col)) {
                (false, Some(v)) => normalize(v, min, max) * 255.0,
                _ => 0.0,
            };
            let intensity = if max_abs > 0.0 {
                (d.abs() / max_abs).powf(exponent)
            } else {
                0.0
            };

            let dim = (base * (1.0 - intensity)) as u8;
            let tint = (base * (1.0 - intensity) + 255.0 * intensity) as u8;
            let color = if *d >= 0.0 {
                Rgba([tint, dim, dim, 255])
            } else {
                Rgba([dim, dim, tint, 255])
            };
            let (x, y) = pixel(a, row, col);
            img.put_pixel(x, y, color);
        }
    }
    Ok(img)
}

/// Resize with nearest-neighbour sampling and encode as PNG.
///
/// # Errors
///
/// Returns [`GridError::InvalidScale`] if `scale` is not positive or would
/// produce an empty image.
pub fn encode_png<W: Write>(image: DynamicImage, scale: f64, writer: W) -> Result<()> {
    if !(scale.is_finite() && scale > 0.0) {
        return Err(GridError::InvalidScale { scale });
    }

    let image = if scale == 1.0 {
        image
    } else {
        let (width, height) = image.dimensions();
        let new_width = (width as f64 * scale) as u32;
        let new_height = (height as f64 * scale) as u32;
        if new_width == 0 || new_height == 0 {
            return Err(GridError::InvalidScale { scale });
        }
        debug!(new_width, new_height, "scaling image");
        image.resize_exact(new_width, new_height, FilterType::Nearest)
    };

    image.write_with_encoder(PngEncoder::new(writer))?;
    Ok(())
}

/// Render a grid and write it as PNG.
pub fn write_png<W: Write>(grid: &ElevationGrid, options: &PngOptions, writer: W) -> Result<()> {
    let image = if options.absolute {
        DynamicImage::ImageRgba8(render_absolute(grid))
    } else {
        DynamicImage::ImageLuma16(render_grayscale(grid))
    };
    encode_png(image, options.scale, writer)
}

/// Render the difference `a - b` and write it as PNG.
///
/// See [`render_difference`] for the coloring.
pub fn write_difference_png<W: Write>(
    a: &ElevationGrid,
    b: &ElevationGrid,
    exponent: f64,
    skip_elevation: bool,
    scale: f64,
    writer: W,
) -> Result<()> {
    let image = render_difference(a, b, exponent, skip_elevation)?;
    encode_png(DynamicImage::ImageRgba8(image), scale, writer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: Vec<Vec<Option<f64>>>) -> ElevationGrid {
        ElevationGrid::from_values(0.0, 0.0, 1.0, rows).unwrap()
    }

    #[test]
    fn test_grayscale_is_north_up() {
        let g = grid(vec![vec![Some(0.0), None], vec![Some(10.0), Some(5.0)]]);
        let img = render_grayscale(&g);

        assert_eq!(img.dimensions(), (2, 2));
        // Grid row 1 (north) is pixel row 0.
        assert_eq!(img.get_pixel(0, 0).0, [u16::MAX]);
        assert_eq!(img.get_pixel(1, 0).0, [u16::MAX / 2]);
        assert_eq!(img.get_pixel(0, 1).0, [0]);
        // No data renders black.
        assert_eq!(img.get_pixel(1, 1).0, [0]);
    }

    #[test]
    fn test_grayscale_flat_grid() {
        let img = render_grayscale(&grid(vec![vec![Some(3.0); 2]]));
        assert!(img.pixels().all(|p| p.0 == [0]));
    }

    #[test]
    fn test_absolute_encoding() {
        let g = grid(vec![vec![Some(258.5), None]]);
        let img = render_absolute(&g);

        assert_eq!(img.get_pixel(0, 0).0, [1, 2, 127, 255]);
        assert_eq!(img.get_pixel(1, 0).0, [0, 0, 0, 0]);
    }

    #[test]
    fn test_difference_colors() {
        let a = grid(vec![vec![Some(10.0), Some(10.0), Some(10.0), None]]);
        let b = grid(vec![vec![Some(6.0), Some(12.0), Some(10.0), Some(1.0)]]);
        let img = render_difference(&a, &b, 1.0, true).unwrap();

        assert_eq!(img.get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert_eq!(img.get_pixel(1, 0).0, [0, 0, 127, 255]);
        assert_eq!(img.get_pixel(2, 0).0, [0, 0, 0, 255]);
        assert_eq!(img.get_pixel(3, 0).0, [0, 0, 0, 0]);

        assert!(matches!(
            render_difference(&a, &b, 0.0, true),
            Err(GridError::InvalidExponent { .. })
        ));
    }

    #[test]
    fn test_write_difference_png() {
        let a = grid(vec![vec![Some(4.0), Some(2.0)]]);
        let b = grid(vec![vec![Some(1.0), Some(2.0)]]);
        let mut buffer = Vec::new();
        write_difference_png(&a, &b, 2.0, false, 2.0, &mut buffer).unwrap();

        let decoded = image::load_from_memory(&buffer).unwrap();
        assert_eq!(decoded.dimensions(), (4, 2));
        assert_eq!(decoded.color(), image::ColorType::Rgba8);
    }

    #[test]
    fn test_write_png_scaled() {
        let g = grid(vec![vec![Some(1.0), Some(2.0)], vec![Some(3.0), Some(4.0)]]);
        let mut buffer = Vec::new();
        write_png(&g, &PngOptions::default().scale(3.0), &mut buffer).unwrap();

        let decoded = image::load_from_memory(&buffer).unwrap();
        assert_eq!(decoded.dimensions(), (6, 6));
        assert_eq!(decoded.color(), image::ColorType::L16);
    }

    #[test]
    fn test_write_png_invalid_scale() {
        let g = grid(vec![vec![Some(1.0)]]);
        for scale in [0.0, -2.0, 0.5] {
            let result = write_png(&g, &PngOptions::default().scale(scale), Vec::<u8>::new());
            assert!(matches!(result, Err(GridError::InvalidScale { .. })));
        }
    }
}
