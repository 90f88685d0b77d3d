use std::path::PathBuf;

use admcentroid::{LayerPolicy, NullRowPolicy, Provider, SchemaPolicy};

/// Boundary centroid tables and front-end city literals
#[derive(clap::Parser, Debug)]
#[command(name = "admcentroid", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Download sub-district boundaries and write a centroid CSV
    Centroids(CentroidsArgs),

    /// Turn a centroid CSV into a typed TypeScript array literal
    Convert(ConvertArgs),
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
pub enum Method {
    Geoboundaries,
    Gadm,
}

impl From<Method> for Provider {
    fn from(method: Method) -> Self {
        match method {
            Method::Geoboundaries => Provider::GeoBoundaries,
            Method::Gadm => Provider::Gadm,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
pub enum NullRows {
    Keep,
    Drop,
    Fail,
}

impl From<NullRows> for NullRowPolicy {
    fn from(rows: NullRows) -> Self {
        match rows {
            NullRows::Keep => NullRowPolicy::Keep,
            NullRows::Drop => NullRowPolicy::Drop,
            NullRows::Fail => NullRowPolicy::Fail,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct CentroidsArgs {
    /// Boundary provider
    #[arg(short, long, value_enum, default_value_t = Method::Geoboundaries)]
    pub method: Method,

    /// Output CSV file
    #[arg(short, long, default_value = "india_taluka_centroids.csv", value_hint = clap::ValueHint::FilePath)]
    pub out: PathBuf,

    /// Directory for downloaded archives, defaults to "."
    #[arg(long, default_value = ".", value_hint = clap::ValueHint::DirPath)]
    pub work_dir: PathBuf,

    /// Rows with a missing region name
    #[arg(long, value_enum, default_value_t = NullRows::Keep)]
    pub null_rows: NullRows,

    /// Fail instead of filling "nan" when a region column cannot be found
    #[arg(long)]
    pub strict_schema: bool,

    /// Fall back to the last archive layer when no name matches the admin depth
    #[arg(long)]
    pub best_effort_layer: bool,
}

impl CentroidsArgs {
    pub fn schema_policy(&self) -> SchemaPolicy {
        if self.strict_schema { SchemaPolicy::Strict } else { SchemaPolicy::Degrade }
    }

    pub fn layer_policy(&self) -> LayerPolicy {
        if self.best_effort_layer { LayerPolicy::BestEffort } else { LayerPolicy::Strict }
    }
}

#[derive(clap::Args, Debug)]
pub struct ConvertArgs {
    /// Input centroid CSV
    #[arg(short, long, default_value = "india_taluka_centroids_gadm.csv", value_hint = clap::ValueHint::FilePath)]
    pub input: PathBuf,

    /// Output TypeScript file
    #[arg(short, long, default_value = "cities_comprehensive.ts", value_hint = clap::ValueHint::FilePath)]
    pub output: PathBuf,

    /// JSON name table replacing the built-in Hindi one
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub names: Option<PathBuf>,

    /// Name of the exported array
    #[arg(long, default_value = "cities")]
    pub export_name: String,

    /// Rows with a missing region name
    #[arg(long, value_enum, default_value_t = NullRows::Drop)]
    pub null_rows: NullRows,
}
