use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Generate depth and slope profiles along a route.
#[derive(Parser, Debug, Clone)]
pub struct Cli {
    /// Route GeoJSON; line features are joined in file order.
    #[arg(short, long)]
    pub route: PathBuf,

    /// Route coordinates are planar meters, not longitude/latitude.
    #[arg(long, default_value_t = false)]
    pub planar: bool,

    /// Raster to sample (.asc or .hgt). May be repeated; the finest
    /// resolution wins where rasters overlap.
    #[arg(long = "raster")]
    pub rasters: Vec<PathBuf>,

    /// Memory-map HGT rasters instead of reading them into memory.
    #[arg(long, default_value_t = false)]
    pub memmap: bool,

    /// Contour GeoJSON. May be repeated, each paired with a
    /// --value-field; all sets are merged.
    #[arg(long = "contours", conflicts_with = "rasters")]
    pub contours: Vec<PathBuf>,

    /// Feature property holding a contour's value.
    #[arg(long = "value-field")]
    pub value_fields: Vec<String>,

    /// Minimum distance between stations, in meters.
    #[arg(short, long, default_value_t = 50.0)]
    pub min_step: f64,

    /// Cap on the number of stations.
    #[arg(long, default_value_t = 50_000)]
    pub max_samples: usize,

    /// Only warn when over --max-samples instead of raising the step.
    #[arg(long, default_value_t = false)]
    pub no_auto_limit: bool,

    /// Step by this many source pixels instead of a fixed interval.
    #[arg(short, long)]
    pub adaptive: Option<f64>,

    /// Flip the sign of along-route slopes.
    #[arg(long, default_value_t = false)]
    pub invert: bool,

    /// Side-slope transect half width in meters; 0 skips side slopes.
    #[arg(short, long, default_value_t = 200.0)]
    pub side_width: f64,

    /// Use spherical distances for geodetic routes.
    #[arg(long, default_value_t = false)]
    pub haversine: bool,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Print per-station values and slopes as JSON.
    Json,

    /// Plot to terminal.
    Plot,

    /// Print profile statistics and warnings.
    Summary,
}
