//! Command-line inspector for CF NetCDF classic files.
//!
//! Reads a whole file into memory and prints header, axis, bounds,
//! statistics and grid information as JSON on stdout. Logs go to stderr.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bytes::Bytes;
use cf_grid::{
    Axis, AxisBounds, CfDataset, DimensionFilter, GridBBox, GridCell, GridConfig, RasterLayout,
};
use clap::{Parser, Subcommand};
use netcdf_parser::NetCdfReader;
use serde::Serialize;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "cf-inspect")]
#[command(about = "Inspect NetCDF classic files with CF conventions")]
struct Args {
    /// NetCDF file to read
    file: PathBuf,

    /// YAML file with grid configuration (default: CFGRID_* environment)
    #[arg(long, env = "CFGRID_CONFIG")]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decoded header as JSON
    Header,
    /// Plain-text summary of dimensions, attributes and variables
    Summary,
    /// Variables bound to the X, Y and T axes
    Axes,
    /// Cell bounds of X and Y and their bounding box
    Bbox,
    /// Statistics of a variable
    Stats {
        #[arg(short, long)]
        variable: String,
    },
    /// X/Y plane of a variable
    Extract {
        #[arg(short, long)]
        variable: String,
        /// Non-spatial dimension selection, e.g. `time=6`
        #[arg(short, long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, f64)>,
    },
    /// Value of the cell containing a point
    Lookup {
        #[arg(short, long)]
        variable: String,
        #[arg(long, allow_hyphen_values = true)]
        x: f64,
        #[arg(long, allow_hyphen_values = true)]
        y: f64,
        #[arg(short, long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, f64)>,
    },
    /// Renderer-ready cells with pixel corners
    Cells {
        #[arg(short, long)]
        variable: String,
        #[arg(short, long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, f64)>,
    },
}

/// Parse a `dimension=value` filter argument.
fn parse_filter(arg: &str) -> std::result::Result<(String, f64), String> {
    let (name, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected dimension=value, got '{}'", arg))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing dimension name in '{}'", arg));
    }
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid value for {}: {}", name, e))?;
    Ok((name.to_string(), value))
}

fn load_config(path: Option<&Path>) -> Result<GridConfig> {
    let config: GridConfig = match path {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_yaml::from_str(&contents)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => GridConfig::from_env(),
    };
    config.validate().map_err(anyhow::Error::msg)?;
    Ok(config)
}

fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

#[derive(Serialize)]
struct BboxReport {
    x: AxisBounds,
    y: AxisBounds,
    bbox: GridBBox,
}

#[derive(Serialize)]
struct LookupReport {
    variable: String,
    x: f64,
    y: f64,
    value: Option<f64>,
}

#[derive(Serialize)]
struct PixelCell {
    #[serde(flatten)]
    cell: GridCell,
    pixels: [(i64, i64); 4],
}

#[derive(Serialize)]
struct CellsReport {
    layout: RasterLayout,
    cells: Vec<PixelCell>,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(args: Args) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let bytes = Bytes::from(
        std::fs::read(&args.file).with_context(|| format!("reading {}", args.file.display()))?,
    );
    debug!(path = %args.file.display(), size = bytes.len(), "Read file");

    match args.command {
        Command::Header => {
            let reader = NetCdfReader::with_options(bytes, config.reader_options())?;
            print_json(reader.header())
        }
        Command::Summary => {
            let reader = NetCdfReader::with_options(bytes, config.reader_options())?;
            print!("{}", reader);
            Ok(())
        }
        Command::Axes => {
            let dataset = CfDataset::with_config(bytes, config)?;
            print_json(dataset.axes())
        }
        Command::Bbox => {
            let mut dataset = CfDataset::with_config(bytes, config)?;
            let report = BboxReport {
                x: dataset.bounds(Axis::X)?.as_ref().clone(),
                y: dataset.bounds(Axis::Y)?.as_ref().clone(),
                bbox: *dataset.bbox()?,
            };
            print_json(&report)
        }
        Command::Stats { variable } => {
            let mut dataset = CfDataset::with_config(bytes, config)?;
            print_json(&*dataset.stats(&variable)?)
        }
        Command::Extract { variable, filters } => {
            let dataset = CfDataset::with_config(bytes, config)?;
            let filter: DimensionFilter = filters.into_iter().collect();
            print_json(&dataset.extract(&variable, &filter)?)
        }
        Command::Lookup {
            variable,
            x,
            y,
            filters,
        } => {
            let mut dataset = CfDataset::with_config(bytes, config)?;
            let filter: DimensionFilter = filters.into_iter().collect();
            let value = dataset.cell_value(&variable, &filter, x, y)?;
            print_json(&LookupReport {
                variable,
                x,
                y,
                value,
            })
        }
        Command::Cells { variable, filters } => {
            let mut dataset = CfDataset::with_config(bytes, config)?;
            let filter: DimensionFilter = filters.into_iter().collect();
            let cells = dataset.cells(&variable, &filter, None)?;
            let layout = dataset.raster_layout(None)?;
            let cells = cells
                .into_iter()
                .map(|cell| PixelCell {
                    pixels: layout.to_pixels(&cell.surface),
                    cell,
                })
                .collect();
            print_json(&CellsReport { layout, cells })
        }
    }
}

fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level, args.log_json)?;

    info!(file = %args.file.display(), command = ?args.command, "Starting cf-inspect");
    run(args)
}
