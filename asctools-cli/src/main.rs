use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

/// Elevation grid (.asc) toolkit
#[derive(Parser)]
#[command(name = "asctools")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log transform details to standard error
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Input {
    /// Input .asc file (default: stdin)
    #[arg(short, long)]
    input: Option<PathBuf>,
}

#[derive(Args)]
struct Output {
    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Crop a grid to a rectangle
    Crop {
        #[command(flatten)]
        input: Input,

        #[command(flatten)]
        output: Output,

        /// Interpret coordinates as fractions (0-1) of the grid extent
        #[arg(short, long)]
        relative: bool,

        /// Start X (default: west edge)
        #[arg(long, allow_negative_numbers = true)]
        start_x: Option<f64>,

        /// Start Y (default: south edge)
        #[arg(long, allow_negative_numbers = true)]
        start_y: Option<f64>,

        /// End X (default: east edge)
        #[arg(long, allow_negative_numbers = true)]
        end_x: Option<f64>,

        /// End Y (default: north edge)
        #[arg(long, allow_negative_numbers = true)]
        end_y: Option<f64>,
    },

    /// Split a grid into tiles written as <prefix>_<row>_<col>.asc
    Split {
        #[command(flatten)]
        input: Input,

        /// Directory to write the tiles to
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        /// Number of tile rows
        #[arg(long, default_value = "2")]
        rows: usize,

        /// Number of tile columns
        #[arg(long, default_value = "2")]
        cols: usize,

        /// Make all tiles square, discarding the leftover strip
        #[arg(short, long)]
        uniform: bool,

        /// Prefix for tile filenames
        #[arg(long, default_value = "tile")]
        prefix: String,
    },

    /// Merge every .asc file in a directory into one grid
    Merge {
        /// Directory containing the tiles
        #[arg(long)]
        input_dir: PathBuf,

        #[command(flatten)]
        output: Output,
    },

    /// Remove spikes with a median filter
    Denoise {
        #[command(flatten)]
        input: Input,

        #[command(flatten)]
        output: Output,

        /// Filter window size (odd, at least 3)
        #[arg(short, long, default_value = "3")]
        window: usize,
    },

    /// Reduce resolution by averaging blocks of cells
    Downscale {
        #[command(flatten)]
        input: Input,

        #[command(flatten)]
        output: Output,

        /// Block size (greater than 1)
        #[arg(short, long)]
        factor: usize,
    },

    /// Subtract one grid from another, cell by cell
    Subtract {
        /// Grid to subtract from
        #[arg(long)]
        input1: PathBuf,

        /// Grid to subtract
        #[arg(long)]
        input2: PathBuf,

        #[command(flatten)]
        output: Output,
    },

    /// Render a grid as PNG
    #[command(name = "asc2png")]
    Asc2Png {
        #[command(flatten)]
        input: Input,

        #[command(flatten)]
        output: Output,

        /// Encode raw elevations in the RGB channels instead of grayscale
        #[arg(short, long)]
        absolute_elevation: bool,

        /// Pixels per cell
        #[arg(short, long, default_value = "1.0")]
        scale: f64,
    },

    /// Render the difference between two grids as PNG
    #[command(name = "diffasc2png")]
    DiffAsc2Png {
        /// Newer grid
        #[arg(long)]
        input1: PathBuf,

        /// Older grid
        #[arg(long)]
        input2: PathBuf,

        #[command(flatten)]
        output: Output,

        /// Exponent applied to the normalized difference
        #[arg(long, default_value = "1.0")]
        diff_pow: f64,

        /// Color differences over black instead of the elevation
        #[arg(long)]
        skip_elevation: bool,

        /// Pixels per cell
        #[arg(short, long, default_value = "1.0")]
        scale: f64,
    },

    /// Export a grid as a binary STL solid
    #[command(name = "asc2stl")]
    Asc2Stl {
        #[command(flatten)]
        input: Input,

        #[command(flatten)]
        output: Output,

        /// Multiplier applied to every coordinate
        #[arg(short, long, default_value = "1.0")]
        scale: f64,

        /// Base elevation (default: lowest elevation minus the margin)
        #[arg(long, allow_negative_numbers = true)]
        floor: Option<f64>,

        /// Distance between the lowest elevation and the base
        #[arg(long, default_value = "0.0", conflicts_with = "floor")]
        floor_margin: f64,
    },

    /// Display information about a grid
    Info {
        #[command(flatten)]
        input: Input,

        /// Output result as JSON
        #[arg(short, long)]
        json: bool,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "asctools=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env("ASCTOOLS_LOG").unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Crop {
            input,
            output,
            relative,
            start_x,
            start_y,
            end_x,
            end_y,
        } => commands::crop::run(
            input.input,
            output.output,
            relative,
            [start_x, start_y, end_x, end_y],
        ),
        Commands::Split {
            input,
            output_dir,
            rows,
            cols,
            uniform,
            prefix,
        } => commands::split::run(input.input, output_dir, rows, cols, uniform, &prefix),
        Commands::Merge { input_dir, output } => commands::merge::run(input_dir, output.output),
        Commands::Denoise {
            input,
            output,
            window,
        } => commands::denoise::run(input.input, output.output, window),
        Commands::Downscale {
            input,
            output,
            factor,
        } => commands::downscale::run(input.input, output.output, factor),
        Commands::Subtract {
            input1,
            input2,
            output,
        } => commands::subtract::run(input1, input2, output.output),
        Commands::Asc2Png {
            input,
            output,
            absolute_elevation,
            scale,
        } => commands::png::run(input.input, output.output, absolute_elevation, scale),
        Commands::DiffAsc2Png {
            input1,
            input2,
            output,
            diff_pow,
            skip_elevation,
            scale,
        } => commands::png::run_diff(
            input1,
            input2,
            output.output,
            diff_pow,
            skip_elevation,
            scale,
        ),
        Commands::Asc2Stl {
            input,
            output,
            scale,
            floor,
            floor_margin,
        } => commands::stl::run(input.input, output.output, scale, floor, floor_margin),
        Commands::Info { input, json } => commands::info::run(input.input, json),
    }
}
