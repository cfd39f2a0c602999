//! ArcGIS ASCII grid (`.asc`) reading and writing.
//!
//! # Format
//!
//! A short header of `key value` lines followed by one line of
//! whitespace-separated values per row, **north row first**:
//!
//! ```text
//! ncols        4
//! nrows        2
//! xllcenter    102.0
//! yllcenter    201.0
//! cellsize     1.0
//! NODATA_value -9999
//! 1 2 3 4
//! 5 6 -9999 8
//! ```
//!
//! `xllcenter`/`yllcenter` give the center of the whole grid;
//! `xllcorner`/`yllcorner` give its lower-left corner. Keys are
//! case-insensitive and `NODATA_value` may be omitted (default `-9999`).

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use tracing::debug;

use crate::error::{GridError, Result};
use crate::grid::{ElevationGrid, NODATA_VALUE};

/// Where the header places the grid.
#[derive(Debug, Clone, Copy)]
enum Anchor {
    Center,
    Corner,
}

#[derive(Debug, Default)]
struct Header {
    ncols: Option<usize>,
    nrows: Option<usize>,
    cellsize: Option<f64>,
    x: Option<(Anchor, f64)>,
    y: Option<(Anchor, f64)>,
    nodata: Option<f64>,
}

impl Header {
    /// Apply one header line. Returns `false` if the line is not a header line.
    fn apply(&mut self, line_number: usize, line: &str) -> Result<bool> {
        let mut parts = line.split_whitespace();
        let Some(key) = parts.next() else {
            return Ok(false);
        };
        // Rows may open with `nan` or `inf`, which parse as numbers.
        if !key.starts_with(|c: char| c.is_ascii_alphabetic()) || key.parse::<f64>().is_ok() {
            return Ok(false);
        }
        let invalid_header = || GridError::InvalidHeader {
            line: line_number,
            content: line.to_string(),
        };
        let (Some(value), None) = (parts.next(), parts.next()) else {
            return Err(invalid_header());
        };

        let invalid_value = || GridError::InvalidValue {
            line: line_number,
            value: value.to_string(),
        };
        let number = || value.parse::<f64>().map_err(|_| invalid_value());
        let count = || value.parse::<usize>().map_err(|_| invalid_value());

        match key.to_ascii_lowercase().as_str() {
            "ncols" => self.ncols = Some(count()?),
            "nrows" => self.nrows = Some(count()?),
            "cellsize" => self.cellsize = Some(number()?),
            "xllcenter" => self.x = Some((Anchor::Center, number()?)),
            "yllcenter" => self.y = Some((Anchor::Center, number()?)),
            "xllcorner" => self.x = Some((Anchor::Corner, number()?)),
            "yllcorner" => self.y = Some((Anchor::Corner, number()?)),
            "nodata_value" => self.nodata = Some(number()?),
            _ => return Err(invalid_header()),
        }
        Ok(true)
    }
}

fn parse_row(line_number: usize, line: &str, row: usize, ncols: usize) -> Result<Vec<f64>> {
    let values = line
        .split_whitespace()
        .map(|token| {
            token.parse::<f64>().map_err(|_| GridError::InvalidValue {
                line: line_number,
                value: token.to_string(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    if values.len() != ncols {
        return Err(GridError::ColumnCount {
            row,
            expected: ncols,
            found: values.len(),
        });
    }
    Ok(values)
}

/// Read an ASC grid.
///
/// Rows are flipped into south-to-north order and cells equal to the file's
/// `NODATA_value` become no-data.
///
/// # Errors
///
/// Returns an error carrying the line or row number if the header is
/// incomplete or unknown, a value is not a number, a row has the wrong
/// number of values, or the file ends early.
pub fn read_asc<R: BufRead>(reader: R) -> Result<ElevationGrid> {
    let mut lines = reader.lines().enumerate().map(|(i, line)| (i + 1, line));
    let mut header = Header::default();
    let mut pending = None;

    for (line_number, line) in lines.by_ref() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        if !header.apply(line_number, &line)? {
            pending = Some((line_number, line));
            break;
        }
    }

    let ncols = header.ncols.ok_or(GridError::MissingHeader { key: "ncols" })?;
    let nrows = header.nrows.ok_or(GridError::MissingHeader { key: "nrows" })?;
    let cell_size = header
        .cellsize
        .ok_or(GridError::MissingHeader { key: "cellsize" })?;
    let (x_anchor, x) = header
        .x
        .ok_or(GridError::MissingHeader { key: "xllcenter" })?;
    let (y_anchor, y) = header
        .y
        .ok_or(GridError::MissingHeader { key: "yllcenter" })?;
    let nodata = header.nodata.unwrap_or(NODATA_VALUE);

    if nrows.checked_mul(ncols).is_none() {
        return Err(GridError::GridTooLarge {
            rows: nrows,
            cols: ncols,
        });
    }

    // Rows are only counted once read; the header may overstate them.
    let mut rows = Vec::new();
    let mut data_lines = pending.into_iter().map(Ok).chain(
        lines
            .map(|(n, line)| line.map(|l| (n, l)))
            .filter(|line| !matches!(line, Ok((_, l)) if l.trim().is_empty())),
    );
    for row in 0..nrows {
        let Some(next) = data_lines.next() else {
            return Err(GridError::UnexpectedEof { row });
        };
        let (line_number, line) = next?;
        rows.push(parse_row(line_number, &line, row, ncols)?);
    }
    rows.reverse();
    debug!(ncols, nrows, cell_size, "parsed ASC grid");

    let width = ncols as f64 * cell_size;
    let height = nrows as f64 * cell_size;
    let min_x = match x_anchor {
        Anchor::Center => x - width / 2.0,
        Anchor::Corner => x,
    };
    let min_y = match y_anchor {
        Anchor::Center => y - height / 2.0,
        Anchor::Corner => y,
    };
    ElevationGrid::from_corner(ncols, nrows, cell_size, min_x, min_y, nodata, rows)
}

/// Write an ASC grid with a center-anchored header, north row first.
///
/// No-data cells are written as [`NODATA_VALUE`].
pub fn write_asc<W: Write>(grid: &ElevationGrid, mut writer: W) -> Result<()> {
    let (center_x, center_y) = grid.center();
    writeln!(writer, "ncols {}", grid.num_cols())?;
    writeln!(writer, "nrows {}", grid.num_rows())?;
    writeln!(writer, "xllcenter {}", center_x)?;
    writeln!(writer, "yllcenter {}", center_y)?;
    writeln!(writer, "cellsize {}", grid.cell_size())?;
    writeln!(writer, "NODATA_value {}", NODATA_VALUE)?;

    let mut line = String::new();
    for row in grid.rows().rev() {
        line.clear();
        for (i, value) in row.iter().enumerate() {
            if i > 0 {
                line.push(' ');
            }
            line.push_str(&value.unwrap_or(NODATA_VALUE).to_string());
        }
        writeln!(writer, "{}", line)?;
    }
    writer.flush()?;

    Ok(())
}

impl ElevationGrid {
    /// Load a grid from an `.asc` file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        read_asc(BufReader::new(file))
    }

    /// Save the grid to an `.asc` file, replacing any existing file.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        write_asc(self, BufWriter::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Cursor;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = "ncols 3
nrows 2
xllcenter 101.5
yllcenter 51.0
cellsize 1.0
NODATA_value -32768
1 2 3
4 -32768 6
";

    #[test]
    fn test_read_flips_rows() {
        let grid = read_asc(Cursor::new(SAMPLE)).unwrap();

        assert_eq!(grid.num_cols(), 3);
        assert_eq!(grid.num_rows(), 2);
        // Last line in the file is the south row.
        assert_eq!(grid.row(0), &[Some(4.0), None, Some(6.0)]);
        assert_eq!(grid.row(1), &[Some(1.0), Some(2.0), Some(3.0)]);
        assert_relative_eq!(grid.bounds().min_x, 100.0);
        assert_relative_eq!(grid.bounds().min_y, 50.0);
        assert_eq!(grid.min_elevation(), Some(1.0));
        assert_eq!(grid.max_elevation(), Some(6.0));
    }

    #[test]
    fn test_read_corner_header_without_nodata() {
        let text = "NCOLS 2\nNROWS 1\nXLLCORNER 10\nYLLCORNER 20\nCELLSIZE 2\n-9999 7.5\n";
        let grid = read_asc(Cursor::new(text)).unwrap();

        assert_relative_eq!(grid.bounds().min_x, 10.0);
        assert_relative_eq!(grid.bounds().max_x, 14.0);
        assert_eq!(grid.row(0), &[None, Some(7.5)]);
    }

    #[test]
    fn test_round_trip() {
        let grid = read_asc(Cursor::new(SAMPLE)).unwrap();
        let mut buffer = Vec::new();
        write_asc(&grid, &mut buffer).unwrap();

        let text = String::from_utf8(buffer.clone()).unwrap();
        assert!(text.contains("xllcenter 101.5"));
        assert!(text.ends_with("1 2 3\n4 -9999 6\n"));

        let reread = read_asc(Cursor::new(buffer)).unwrap();
        assert_eq!(reread, grid);
    }

    #[test]
    fn test_file_round_trip() {
        let grid = read_asc(Cursor::new(SAMPLE)).unwrap();
        let file = NamedTempFile::new().unwrap();

        grid.write_to_file(file.path()).unwrap();
        let reread = ElevationGrid::from_file(file.path()).unwrap();
        assert_eq!(reread, grid);
    }

    #[test]
    fn test_wrong_column_count() {
        let text = SAMPLE.replace("4 -32768 6", "4 5");
        let err = read_asc(Cursor::new(text)).unwrap_err();

        assert!(matches!(
            err,
            GridError::ColumnCount {
                row: 1,
                expected: 3,
                found: 2
            }
        ));
    }

    #[test]
    fn test_truncated_data() {
        let text = SAMPLE.replace("4 -32768 6\n", "");
        let err = read_asc(Cursor::new(text)).unwrap_err();

        assert!(matches!(err, GridError::UnexpectedEof { row: 1 }));
    }

    #[test]
    fn test_invalid_value_reports_line() {
        let text = SAMPLE.replace("1 2 3", "1 x 3");
        let err = read_asc(Cursor::new(text)).unwrap_err();

        assert!(matches!(err, GridError::InvalidValue { line: 7, .. }));
    }

    #[test]
    fn test_header_errors() {
        let text = SAMPLE.replace("cellsize 1.0\n", "");
        let err = read_asc(Cursor::new(text)).unwrap_err();
        assert!(matches!(err, GridError::MissingHeader { key: "cellsize" }));

        let text = SAMPLE.replace("cellsize 1.0", "resolution 1.0");
        let err = read_asc(Cursor::new(text)).unwrap_err();
        assert!(matches!(err, GridError::InvalidHeader { line: 5, .. }));

        let text = SAMPLE.replace("cellsize 1.0", "cellsize -1.0");
        let err = read_asc(Cursor::new(text)).unwrap_err();
        assert!(matches!(err, GridError::InvalidCellSize { .. }));

        let text = SAMPLE.replace("nrows 2", "nrows");
        let err = read_asc(Cursor::new(text)).unwrap_err();
        assert!(matches!(err, GridError::InvalidHeader { line: 2, .. }));
    }

    #[test]
    fn test_overstated_row_count() {
        let text = "ncols 3\nnrows 9999999999999999\nxllcorner 0\nyllcorner 0\ncellsize 1\n1 2 3\n";
        let err = read_asc(Cursor::new(text)).unwrap_err();
        assert!(matches!(err, GridError::UnexpectedEof { row: 1 }));

        let text = format!(
            "ncols 3\nnrows {}\nxllcorner 0\nyllcorner 0\ncellsize 1\n1 2 3\n",
            usize::MAX
        );
        let err = read_asc(Cursor::new(text)).unwrap_err();
        assert!(matches!(err, GridError::GridTooLarge { cols: 3, .. }));
    }

    #[test]
    fn test_nan_nodata_value() {
        let text = "ncols 2
nrows 1
xllcorner 0
yllcorner 0
cellsize 1
NODATA_value nan
NaN 4
";
        let grid = read_asc(Cursor::new(text)).unwrap();

        assert_eq!(grid.row(0), &[None, Some(4.0)]);
        assert_eq!(grid.min_elevation(), Some(4.0));
    }
}
